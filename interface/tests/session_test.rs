mod common;

use ale_interface::{Action, Cartridge, Error, Session};
use ale_machines::cartridge::CartridgeError;
use ale_machines::games::TALLY_ROM;
use ale_machines::games::tally::{RAM_LIVES, RAM_PLAYER_X};
use common::{deterministic_session, run, tally_cartridge, tally_session};

// =================================================================
// Loading
// =================================================================

#[test]
fn test_load_from_path_identifies_game() {
    let dir = std::env::temp_dir().join(format!("ale-session-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("my_copy.bin");
    std::fs::write(&path, TALLY_ROM).unwrap();

    let mut session = Session::new();
    session.load(&path).unwrap();
    assert_eq!(session.game_name().unwrap(), "tally");
    assert_eq!(session.cartridge().unwrap().name(), "my_copy");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_file_is_invalid_cartridge() {
    let mut session = Session::new();
    let err = session.load("/nonexistent/tally.bin").unwrap_err();
    assert!(matches!(err, Error::InvalidCartridge(CartridgeError::Io(_))));
    assert!(!session.is_loaded());
}

#[test]
fn test_unknown_image_is_invalid_cartridge() {
    let mut session = Session::new();
    let cartridge = Cartridge::from_bytes("mystery", vec![0xEA; 0x800]).unwrap();
    assert!(matches!(
        session.load_cartridge(cartridge),
        Err(Error::InvalidCartridge(CartridgeError::Unrecognized { .. }))
    ));
}

#[test]
fn test_load_zeroes_counters_and_empties_save_slot() {
    let mut session = deterministic_session();
    run(&mut session, &[Action::Noop; 5]);
    session.save_in_place().unwrap();

    session.load_cartridge(tally_cartridge()).unwrap();
    assert_eq!(session.frame_number(), 0);
    assert_eq!(session.episode_frame_number(), 0);
    assert!(matches!(session.load_in_place(), Err(Error::NothingSaved)));
}

// =================================================================
// Configuration
// =================================================================

#[test]
fn test_query_defaults_and_written_values() {
    let mut session = Session::new();
    assert_eq!(session.query::<i32>("frame_skip").unwrap(), 1);
    assert_eq!(session.query::<f32>("repeat_action_probability").unwrap(), 0.25);

    session.configure("custom_key", "hello");
    assert_eq!(session.query::<String>("custom_key").unwrap(), "hello");
    assert!(matches!(
        session.query::<bool>("custom_key"),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        session.query::<i32>("never_set"),
        Err(Error::NotFound(key)) if key == "never_set"
    ));
}

#[test]
fn test_bad_config_fails_load() {
    for (key, value) in [
        ("frame_skip", 0.0f32),
        ("repeat_action_probability", 1.5),
        ("repeat_action_probability", -0.1),
    ] {
        let mut session = Session::new();
        session.configure(key, value);
        assert!(
            session.load_cartridge(tally_cartridge()).is_err(),
            "{key} = {value} should be rejected"
        );
    }

    let mut session = Session::new();
    session.configure("max_num_frames_per_episode", -1);
    assert!(matches!(
        session.load_cartridge(tally_cartridge()),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_unavailable_mode_fails_load() {
    let mut session = Session::new();
    session.configure("mode", 7);
    assert!(matches!(
        session.load_cartridge(tally_cartridge()),
        Err(Error::InvalidMode(7))
    ));
    session.configure("mode", 0);
    session.configure("difficulty", 9);
    assert!(matches!(
        session.load_cartridge(tally_cartridge()),
        Err(Error::InvalidDifficulty(9))
    ));
}

// =================================================================
// Control
// =================================================================

#[test]
fn test_fire_scores_one_point_per_frame() {
    let mut session = deterministic_session();
    assert_eq!(run(&mut session, &[Action::Fire; 3]), vec![1, 1, 1]);
    assert_eq!(run(&mut session, &[Action::Noop; 2]), vec![0, 0]);
}

#[test]
fn test_mode_and_difficulty_from_config() {
    let mut session = Session::new();
    session.configure("repeat_action_probability", 0.0f32);
    session.configure("mode", 1);
    session.configure("difficulty", 1);
    session.load_cartridge(tally_cartridge()).unwrap();

    assert_eq!(session.mode().unwrap(), 1);
    assert_eq!(session.lives().unwrap(), 3);
    assert_eq!(session.step(Action::Fire).unwrap(), 2);
}

#[test]
fn test_mode_change_applies_at_reset() {
    let mut session = deterministic_session();
    session.set_mode(1).unwrap();
    session.set_difficulty(1).unwrap();
    assert_eq!(session.mode().unwrap(), 1);
    assert_eq!(session.lives().unwrap(), 5);

    session.reset().unwrap();
    assert_eq!(session.lives().unwrap(), 3);
    assert_eq!(session.step(Action::Fire).unwrap(), 2);
}

#[test]
fn test_invalid_selection_is_rejected_without_effect() {
    let mut session = deterministic_session();
    assert!(matches!(session.set_mode(2), Err(Error::InvalidMode(2))));
    assert!(matches!(
        session.set_difficulty(4),
        Err(Error::InvalidDifficulty(4))
    ));
    assert_eq!(session.mode().unwrap(), 0);
    assert_eq!(session.difficulty().unwrap(), 0);
}

#[test]
fn test_movement_and_lives() {
    let mut session = deterministic_session();
    let x = session.ram().unwrap()[RAM_PLAYER_X];
    run(&mut session, &[Action::Right; 4]);
    assert_eq!(session.ram().unwrap()[RAM_PLAYER_X], x + 4);

    run(&mut session, &[Action::Down; 2]);
    assert_eq!(session.lives().unwrap(), 3);
    assert_eq!(session.ram().unwrap()[RAM_LIVES], 3);
}

#[test]
fn test_episode_ends_when_lives_run_out() {
    let mut session = deterministic_session();
    for _ in 0..4 {
        session.step(Action::Down).unwrap();
        assert!(!session.is_terminal().unwrap());
    }
    session.step(Action::Down).unwrap();
    assert_eq!(session.lives().unwrap(), 0);
    assert!(session.is_terminal().unwrap());
    assert!(session.game_over().unwrap());

    // The console keeps running; the game just ignores input.
    assert_eq!(session.step(Action::Fire).unwrap(), 0);

    session.reset().unwrap();
    assert!(!session.game_over().unwrap());
    assert_eq!(session.lives().unwrap(), 5);
}

#[test]
fn test_truncation_after_frame_limit() {
    let mut session = Session::new();
    session.configure("max_num_frames_per_episode", 10);
    session.load_cartridge(tally_cartridge()).unwrap();

    run(&mut session, &[Action::Noop; 9]);
    assert!(!session.is_truncated().unwrap());
    session.step(Action::Noop).unwrap();
    assert!(session.is_truncated().unwrap());
    assert!(!session.is_terminal().unwrap());
    assert!(session.game_over().unwrap());

    session.reset().unwrap();
    assert!(!session.is_truncated().unwrap());
}

#[test]
fn test_fully_sticky_actions_never_change() {
    let mut session = Session::new();
    session.configure("repeat_action_probability", 1.0f32);
    session.load_cartridge(tally_cartridge()).unwrap();
    // The last applied action after reset is NOOP, so FIRE never lands.
    assert_eq!(run(&mut session, &[Action::Fire; 10]), vec![0; 10]);
}

// =================================================================
// Counters
// =================================================================

#[test]
fn test_counters_advance_per_step_and_episode_resets() {
    let mut session = deterministic_session();
    for expected in 1..=7 {
        session.step(Action::Noop).unwrap();
        assert_eq!(session.frame_number(), expected);
        assert_eq!(session.episode_frame_number(), expected);
    }
    session.reset().unwrap();
    assert_eq!(session.frame_number(), 7);
    assert_eq!(session.episode_frame_number(), 0);

    session.step(Action::Noop).unwrap();
    assert_eq!(session.frame_number(), 8);
    assert_eq!(session.episode_frame_number(), 1);
}

#[test]
fn test_failed_step_does_not_count() {
    let mut session = deterministic_session();
    assert!(session.step_code(99).is_err());
    assert_eq!(session.frame_number(), 0);
}

#[test]
fn test_frame_skip_counts_every_frame() {
    let mut session = tally_session(&[("frame_skip", 4)]);
    session.step(Action::Noop).unwrap();
    assert_eq!(session.frame_number(), 4);
    assert_eq!(session.episode_frame_number(), 4);
}

// =================================================================
// Action validation
// =================================================================

#[test]
fn test_step_code_rejects_everything_outside_legal_set() {
    let mut session = deterministic_session();
    for code in [-1, 18, 19, 255, i32::MIN, i32::MAX] {
        assert!(matches!(
            session.step_code(code),
            Err(Error::IllegalAction(c)) if c == code
        ));
    }
}

#[test]
fn test_every_legal_action_steps() {
    let mut session = deterministic_session();
    let legal = session.legal_actions().unwrap().to_vec();
    assert_eq!(legal.len(), 18);
    for action in legal {
        session.step_code(action.code()).unwrap();
        session.step(action).unwrap();
    }
}

#[test]
fn test_minimal_set_is_subset_in_game_order() {
    let session = deterministic_session();
    let minimal = session.minimal_actions().unwrap();
    assert_eq!(
        minimal,
        &[
            Action::Noop,
            Action::Fire,
            Action::Right,
            Action::Left,
            Action::Down
        ]
    );
    let legal = session.legal_actions().unwrap();
    assert!(minimal.iter().all(|a| legal.contains(a)));
    assert_eq!(session.available_modes().unwrap(), &[0, 1]);
    assert_eq!(session.available_difficulties().unwrap(), &[0, 1]);
}

// =================================================================
// Threads
// =================================================================

#[test]
fn test_independent_sessions_on_threads() {
    let handles: Vec<_> = (0..3)
        .map(|seed| {
            std::thread::spawn(move || {
                let mut session = tally_session(&[("random_seed", seed)]);
                run(&mut session, &[Action::Fire; 20]).iter().sum::<i32>()
            })
        })
        .collect();
    for handle in handles {
        let total = handle.join().unwrap();
        assert!((1..=20).contains(&total));
    }
}
