//! Reinforcement-learning environment over the emulated console.
//!
//! A [`Session`] loads one cartridge and exposes the episode loop (`step`,
//! `reset`, terminal checks), the observation surface (screen and RAM), the
//! action/mode registry and state snapshots. Configuration goes through a
//! typed key/value store and every failure is reported as an [`Error`].
//!
//! ```no_run
//! use ale_interface::{Action, Session};
//!
//! let mut session = Session::new();
//! session.configure("random_seed", 7);
//! session.load("roms/tally.bin")?;
//! while !session.game_over()? {
//!     let reward = session.step(Action::Fire)?;
//!     println!("reward {reward}");
//! }
//! # Ok::<(), ale_interface::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod observation;
pub mod registry;
pub mod session;
pub mod snapshot;

pub use ale_machines::action::Action;
pub use ale_machines::cartridge::Cartridge;
pub use ale_machines::settings::{Difficulty, Mode};
pub use config::{ConfigType, ConfigValue, Settings, ValueKind};
pub use error::{Error, Result};
pub use logger::{LoggerMode, logger_mode, set_logger_mode};
pub use observation::ScreenView;
pub use registry::ActionRegistry;
pub use session::Session;
pub use snapshot::{Snapshot, SnapshotHandle, SnapshotKind, SnapshotPool};
