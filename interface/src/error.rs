//! Error taxonomy for the session layer.

use std::collections::TryReserveError;

use ale_core::core::machine::StateError;
use ale_machines::cartridge::CartridgeError;
use thiserror::Error;

use crate::config::ValueKind;
use crate::snapshot::SnapshotKind;

/// Every caller-visible failure of a session operation. A call that returns
/// one of these has left the session exactly as it was.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no cartridge loaded")]
    NoCartridgeLoaded,

    #[error("invalid cartridge: {0}")]
    InvalidCartridge(#[from] CartridgeError),

    #[error("action {0} is not in the legal action set")]
    IllegalAction(i32),

    #[error("mode {0} is not available for this cartridge")]
    InvalidMode(u32),

    #[error("difficulty {0} is not available for this cartridge")]
    InvalidDifficulty(u32),

    #[error("setting `{key}` holds a {found} value, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("setting `{0}` is not set and has no default")]
    NotFound(String),

    #[error("buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("expected a {expected} snapshot, got a {found} snapshot")]
    SnapshotKindMismatch {
        expected: SnapshotKind,
        found: SnapshotKind,
    },

    #[error(
        "snapshot belongs to cartridge CRC32 0x{found:08X}, loaded cartridge is 0x{expected:08X}"
    )]
    IncompatibleCartridge { expected: u32, found: u32 },

    #[error("snapshot used after release")]
    UseAfterRelease,

    #[error("no in-place save to load")]
    NothingSaved,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration syntax: {0}")]
    ConfigSyntax(#[from] toml::de::Error),

    #[error("machine state: {0}")]
    State(#[from] StateError),

    #[error("PNG encoding: {0}")]
    Image(#[from] png::EncodingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Allocation failure. Not part of the recoverable taxonomy above.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, Error>;
