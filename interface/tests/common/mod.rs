#![allow(dead_code)]

use ale_interface::{Action, Cartridge, Session};
use ale_machines::games::TALLY_ROM;

pub fn tally_cartridge() -> Cartridge {
    Cartridge::from_bytes("tally", TALLY_ROM.to_vec()).unwrap()
}

/// A session with Tally loaded under `settings` (key, value) pairs.
pub fn tally_session(settings: &[(&str, i32)]) -> Session {
    let mut session = Session::new();
    for &(key, value) in settings {
        session.configure(key, value);
    }
    session.load_cartridge(tally_cartridge()).unwrap();
    session
}

/// Tally with sticky actions switched off.
pub fn deterministic_session() -> Session {
    let mut session = Session::new();
    session.configure("repeat_action_probability", 0.0f32);
    session.load_cartridge(tally_cartridge()).unwrap();
    session
}

pub fn screen(session: &Session) -> Vec<u8> {
    session.screen().unwrap().as_slice().to_vec()
}

/// Step through `actions`, collecting the rewards.
pub fn run(session: &mut Session, actions: &[Action]) -> Vec<i32> {
    actions.iter().map(|&a| session.step(a).unwrap()).collect()
}
