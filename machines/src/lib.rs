pub mod action;
pub mod cartridge;
pub mod games;
pub mod registry;
pub mod settings;
pub mod vcs;

pub use action::{ALL_ACTIONS, Action};
pub use cartridge::{Cartridge, CartridgeError};
pub use registry::GameEntry;
pub use settings::{Difficulty, GameSettings, Mode, Progress};
pub use vcs::VcsSystem;
