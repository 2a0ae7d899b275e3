//! The learning-environment session: one cartridge, one console, one episode
//! at a time.
//!
//! A [`Session`] owns the emulated console exclusively. Callers drive it with
//! [`Session::step`] and observe it through the screen/RAM accessors; they
//! never get at the machine itself. Every fallible operation validates its
//! inputs before touching live state, so an `Err` leaves the session exactly
//! as it was.

use std::path::Path;

use ale_core::core::machine::Machine;
use ale_machines::action::Action;
use ale_machines::cartridge::Cartridge;
use ale_machines::registry::{self, GameEntry};
use ale_machines::settings::{Difficulty, Mode, Progress};
use ale_machines::vcs::{
    INPUT_P0_DIFFICULTY_A, INPUT_P0_DOWN, INPUT_P0_FIRE, INPUT_P0_LEFT, INPUT_P0_RIGHT,
    INPUT_P0_UP, INPUT_P1_DIFFICULTY_A, INPUT_RESET, INPUT_SELECT, VcsSystem,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigType, ConfigValue, EnvConfig, Settings};
use crate::error::{Error, Result};
use crate::observation::{self, ScreenView};
use crate::registry::ActionRegistry;
use crate::snapshot::{SessionState, Snapshot, SnapshotKind};

/// No-op frames emulated right after power-on, before any switch is touched.
const NOOP_FRAMES_AFTER_RESET: u32 = 60;
/// Frames the RESET switch is held to start a game.
const RESET_HOLD_FRAMES: u32 = 4;

/// A learning-environment session.
#[derive(Default)]
pub struct Session {
    settings: Settings,
    game: Option<Game>,
    frame_number: u64,
    episode_frame_number: u64,
    saved: Option<Snapshot>,
}

/// Everything that exists only while a cartridge is loaded.
struct Game {
    cartridge: Cartridge,
    entry: &'static GameEntry,
    registry: ActionRegistry,
    machine: Box<dyn Machine>,
    env: EnvConfig,
    rng: ChaCha8Rng,
    mode: Mode,
    difficulty: Difficulty,
    last_action: Action,
    /// Score at the end of the previous frame; rewards are deltas against it.
    score: i32,
}

impl Game {
    fn progress(&self) -> Progress {
        self.entry.settings.evaluate(self.machine.ram())
    }

    /// Latch `action` on the P0 joystick and run one frame.
    fn frame(&mut self, action: Action) {
        let stick = action.stick();
        let machine = &mut self.machine;
        machine.set_input(INPUT_P0_UP, stick.up);
        machine.set_input(INPUT_P0_DOWN, stick.down);
        machine.set_input(INPUT_P0_LEFT, stick.left);
        machine.set_input(INPUT_P0_RIGHT, stick.right);
        machine.set_input(INPUT_P0_FIRE, action.fire());
        machine.run_frame();
    }

    fn press_switch(&mut self, button: u8, frames: u32) {
        self.machine.set_input(button, true);
        for _ in 0..frames {
            self.frame(Action::Noop);
        }
        self.machine.set_input(button, false);
    }

    /// Power-cycle the console and bring the cartridge to the start of an
    /// episode in the selected mode and difficulty.
    fn reset(&mut self) {
        self.machine.reset();
        for _ in 0..NOOP_FRAMES_AFTER_RESET {
            self.frame(Action::Noop);
        }

        self.machine
            .set_input(INPUT_P0_DIFFICULTY_A, self.difficulty & 0b01 != 0);
        self.machine
            .set_input(INPUT_P1_DIFFICULTY_A, self.difficulty & 0b10 != 0);

        for _ in 0..self.entry.settings.mode_select_presses(self.mode) {
            self.press_switch(INPUT_SELECT, 1);
            self.frame(Action::Noop);
        }
        self.press_switch(INPUT_RESET, RESET_HOLD_FRAMES);

        for &action in self.entry.settings.starting_actions() {
            self.frame(action);
        }

        self.last_action = Action::Noop;
        self.score = self.progress().score;
    }

    /// Emulate one frame with sticky actions and return its reward.
    fn act(&mut self, action: Action) -> i32 {
        if self.rng.r#gen::<f32>() >= self.env.repeat_action_probability {
            self.last_action = action;
        }
        self.frame(self.last_action);

        let score = self.progress().score;
        let reward = score - self.score;
        self.score = score;
        reward
    }
}

impl Session {
    /// An unconfigured session with no cartridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session starting from `settings`.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Store a setting. Unknown keys are accepted; emulation parameters are
    /// read at the next `load`.
    pub fn configure(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.settings.set(key, value);
    }

    pub fn query<T: ConfigType>(&self, key: &str) -> Result<T> {
        self.settings.get(key)
    }

    pub fn query_value(&self, key: &str) -> Result<ConfigValue> {
        self.settings.value(key)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Load a cartridge image (raw or zipped) from disk.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let cartridge = Cartridge::from_path(path)?;
        self.load_cartridge(cartridge)
    }

    /// Replace the live state with a fresh episode of `cartridge`.
    ///
    /// Both frame counters return to zero and the in-place save slot is
    /// emptied. On error the previous cartridge, if any, stays loaded.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) -> Result<()> {
        let env = self.settings.resolve()?;
        let entry = registry::identify(&cartridge)?;
        let registry = ActionRegistry::for_game(entry)?;
        let mode = match env.mode {
            Some(mode) => registry.check_mode(mode)?,
            None => entry.settings.default_mode(),
        };
        let difficulty = match env.difficulty {
            Some(difficulty) => registry.check_difficulty(difficulty)?,
            None => entry.settings.default_difficulty(),
        };

        let mut game = Game {
            machine: Box::new(VcsSystem::new(&cartridge)),
            rng: ChaCha8Rng::seed_from_u64(env.seed),
            cartridge,
            entry,
            registry,
            env,
            mode,
            difficulty,
            last_action: Action::Noop,
            score: 0,
        };
        game.reset();

        log::info!(
            "loaded {} (crc32 0x{:08X}): mode {mode}, difficulty {difficulty}, {} minimal actions",
            entry.name,
            game.cartridge.crc32(),
            game.registry.minimal_actions().len()
        );
        self.game = Some(game);
        self.frame_number = 0;
        self.episode_frame_number = 0;
        self.saved = None;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.game.is_some()
    }

    pub fn cartridge(&self) -> Result<&Cartridge> {
        Ok(&self.loaded()?.cartridge)
    }

    /// Registered name of the loaded game.
    pub fn game_name(&self) -> Result<&'static str> {
        Ok(self.loaded()?.entry.name)
    }

    fn loaded(&self) -> Result<&Game> {
        self.game.as_ref().ok_or(Error::NoCartridgeLoaded)
    }

    fn loaded_mut(&mut self) -> Result<&mut Game> {
        self.game.as_mut().ok_or(Error::NoCartridgeLoaded)
    }

    // ---------------------------------------------------------------------
    // Control
    // ---------------------------------------------------------------------

    /// Apply `action` for `frame_skip` frames and return the summed reward.
    pub fn step(&mut self, action: Action) -> Result<i32> {
        let game = self.game.as_mut().ok_or(Error::NoCartridgeLoaded)?;
        let action = game.registry.check_action(action.code())?;

        let mut reward = 0;
        for _ in 0..game.env.frame_skip {
            reward += game.act(action);
            self.frame_number += 1;
            self.episode_frame_number += 1;
        }
        Ok(reward)
    }

    /// [`Session::step`] with a raw action code.
    pub fn step_code(&mut self, code: i32) -> Result<i32> {
        let action = self.loaded()?.registry.check_action(code)?;
        self.step(action)
    }

    /// Start a new episode. Configuration and the frame counter are kept.
    pub fn reset(&mut self) -> Result<()> {
        let game = self.loaded_mut()?;
        game.reset();
        log::info!(
            "reset {}: mode {}, difficulty {}",
            game.entry.name,
            game.mode,
            game.difficulty
        );
        self.episode_frame_number = 0;
        Ok(())
    }

    /// The cartridge reports the episode as over.
    pub fn is_terminal(&self) -> Result<bool> {
        Ok(self.loaded()?.progress().terminal)
    }

    /// The episode hit `max_num_frames_per_episode`.
    pub fn is_truncated(&self) -> Result<bool> {
        let max = self.loaded()?.env.max_num_frames_per_episode;
        Ok(max > 0 && self.episode_frame_number >= max)
    }

    pub fn game_over(&self) -> Result<bool> {
        Ok(self.is_terminal()? || self.is_truncated()?)
    }

    pub fn lives(&self) -> Result<i32> {
        Ok(self.loaded()?.progress().lives)
    }

    /// Frames emulated through `step` since the last `load`.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Frames emulated through `step` since the last `load` or `reset`.
    pub fn episode_frame_number(&self) -> u64 {
        self.episode_frame_number
    }

    // ---------------------------------------------------------------------
    // Actions, modes and difficulties
    // ---------------------------------------------------------------------

    pub fn legal_actions(&self) -> Result<&[Action]> {
        Ok(self.loaded()?.registry.legal_actions())
    }

    pub fn minimal_actions(&self) -> Result<&[Action]> {
        Ok(self.loaded()?.registry.minimal_actions())
    }

    pub fn available_modes(&self) -> Result<&[Mode]> {
        Ok(self.loaded()?.registry.available_modes())
    }

    pub fn available_difficulties(&self) -> Result<&[Difficulty]> {
        Ok(self.loaded()?.registry.available_difficulties())
    }

    /// Select a mode for the next `reset`.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        let game = self.loaded_mut()?;
        game.mode = game.registry.check_mode(mode)?;
        Ok(())
    }

    /// Select a difficulty for the next `reset`.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        let game = self.loaded_mut()?;
        game.difficulty = game.registry.check_difficulty(difficulty)?;
        Ok(())
    }

    pub fn mode(&self) -> Result<Mode> {
        Ok(self.loaded()?.mode)
    }

    pub fn difficulty(&self) -> Result<Difficulty> {
        Ok(self.loaded()?.difficulty)
    }

    // ---------------------------------------------------------------------
    // Observation
    // ---------------------------------------------------------------------

    /// Screen size as (width, height).
    pub fn screen_dimensions(&self) -> Result<(usize, usize)> {
        let (width, height) = self.loaded()?.machine.display_size();
        Ok((width as usize, height as usize))
    }

    pub fn screen(&self) -> Result<ScreenView<'_>> {
        let (width, height) = self.screen_dimensions()?;
        Ok(ScreenView::new(
            width,
            height,
            self.loaded()?.machine.frame_buffer(),
        ))
    }

    pub fn screen_indexed(&self, out: &mut [u8]) -> Result<usize> {
        self.screen()?.indexed_into(out)
    }

    pub fn screen_rgb(&self, out: &mut [u8]) -> Result<usize> {
        self.screen()?.rgb_into(out)
    }

    pub fn screen_grayscale(&self, out: &mut [u8]) -> Result<usize> {
        self.screen()?.grayscale_into(out)
    }

    pub fn save_screen_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.screen()?.save_png(path)
    }

    pub fn ram(&self) -> Result<&[u8]> {
        Ok(self.loaded()?.machine.ram())
    }

    pub fn ram_into(&self, out: &mut [u8]) -> Result<usize> {
        observation::copy_into(self.ram()?, out)
    }

    pub fn ram_size(&self) -> Result<usize> {
        Ok(self.ram()?.len())
    }

    // ---------------------------------------------------------------------
    // Snapshots
    // ---------------------------------------------------------------------

    /// Capture console state and episode bookkeeping.
    pub fn clone_state(&self) -> Result<Snapshot> {
        self.capture(SnapshotKind::Game)
    }

    /// Capture everything, including the sticky-action random stream.
    pub fn clone_system_state(&self) -> Result<Snapshot> {
        self.capture(SnapshotKind::System)
    }

    /// Restore a [`SnapshotKind::Game`] snapshot. The random stream carries on
    /// from where it is now.
    pub fn restore_state(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.restore(snapshot, SnapshotKind::Game)
    }

    pub fn restore_system_state(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.restore(snapshot, SnapshotKind::System)
    }

    /// Keep a full-system snapshot in the session's single save slot.
    pub fn save_in_place(&mut self) -> Result<()> {
        let snapshot = self.clone_system_state()?;
        self.saved = Some(snapshot);
        Ok(())
    }

    /// Restore the save slot. The slot keeps its content.
    pub fn load_in_place(&mut self) -> Result<()> {
        self.loaded()?;
        let snapshot = self.saved.clone().ok_or(Error::NothingSaved)?;
        self.restore(&snapshot, SnapshotKind::System)
    }

    fn capture(&self, kind: SnapshotKind) -> Result<Snapshot> {
        let game = self.loaded()?;
        let state = SessionState {
            machine: game.machine.save_state()?,
            episode_frame_number: self.episode_frame_number,
            mode: game.mode,
            difficulty: game.difficulty,
            last_action: game.last_action,
            score: game.score,
            rng: (kind == SnapshotKind::System).then(|| game.rng.clone()),
        };
        Snapshot::capture(game.cartridge.crc32(), &state)
    }

    fn restore(&mut self, snapshot: &Snapshot, expected: SnapshotKind) -> Result<()> {
        let game = self.game.as_mut().ok_or(Error::NoCartridgeLoaded)?;
        if snapshot.kind() != expected {
            return Err(Error::SnapshotKindMismatch {
                expected,
                found: snapshot.kind(),
            });
        }
        if snapshot.cartridge_crc32() != game.cartridge.crc32() {
            return Err(Error::IncompatibleCartridge {
                expected: game.cartridge.crc32(),
                found: snapshot.cartridge_crc32(),
            });
        }
        let state = snapshot.state()?;
        let mode = game.registry.check_mode(state.mode)?;
        let difficulty = game.registry.check_difficulty(state.difficulty)?;

        // Last fallible step; nothing has been modified yet.
        game.machine.load_state(&state.machine)?;

        game.mode = mode;
        game.difficulty = difficulty;
        game.last_action = state.last_action;
        game.score = state.score;
        if let Some(rng) = state.rng {
            game.rng = rng;
        }
        self.episode_frame_number = state.episode_frame_number;
        log::debug!("restored {expected} snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ale_machines::games::TALLY_ROM;

    fn tally() -> Cartridge {
        Cartridge::from_bytes("tally", TALLY_ROM.to_vec()).unwrap()
    }

    #[test]
    fn session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Session>();
    }

    #[test]
    fn everything_fails_before_load() {
        let mut session = Session::new();
        assert!(matches!(session.step(Action::Noop), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.reset(), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.screen_dimensions(), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.ram(), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.minimal_actions(), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.clone_state(), Err(Error::NoCartridgeLoaded)));
        assert!(matches!(session.load_in_place(), Err(Error::NoCartridgeLoaded)));
        assert_eq!(session.frame_number(), 0);
    }

    #[test]
    fn reset_starts_the_game() {
        let mut session = Session::new();
        session.load_cartridge(tally()).unwrap();
        assert_eq!(session.lives().unwrap(), 5);
        assert!(!session.is_terminal().unwrap());
        assert_eq!(session.frame_number(), 0);
        assert_eq!(session.episode_frame_number(), 0);
    }

    #[test]
    fn frame_skip_multiplies_frames_and_reward() {
        let mut session = Session::new();
        session.configure("frame_skip", 3);
        session.configure("repeat_action_probability", 0.0f32);
        session.load_cartridge(tally()).unwrap();

        assert_eq!(session.step(Action::Fire).unwrap(), 3);
        assert_eq!(session.frame_number(), 3);
        assert_eq!(session.episode_frame_number(), 3);
    }

    #[test]
    fn failed_load_keeps_previous_cartridge() {
        let mut session = Session::new();
        session.load_cartridge(tally()).unwrap();
        session.step(Action::Fire).unwrap();

        session.configure("frame_skip", 0);
        assert!(matches!(
            session.load_cartridge(tally()),
            Err(Error::InvalidConfig(_))
        ));
        assert!(session.is_loaded());
        assert_eq!(session.frame_number(), 1);
    }
}
