//! Immutable, self-describing captures of a session's live state.
//!
//! Encoded layout (little endian):
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 4    | magic `ALES`                           |
//! | 4      | 2    | format version                         |
//! | 6      | 1    | kind (0 game, 1 system)                |
//! | 7      | 1    | reserved, zero                         |
//! | 8      | 4    | CRC-32 of the cartridge image          |
//! | 12     | 4    | payload length                         |
//! | 16     | n    | payload (postcard)                     |
//! | 16 + n | 4    | CRC-32 of every preceding byte         |
//!
//! A [`Snapshot`] always holds a complete encoding, so `encode` is a copy and
//! two snapshots are equal exactly when their encodings are.

mod pool;

pub use pool::{SnapshotHandle, SnapshotPool};

use std::fmt;
use std::sync::Arc;

use ale_core::core::machine::StateError;
use ale_machines::action::Action;
use ale_machines::settings::{Difficulty, Mode};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAGIC: [u8; 4] = *b"ALES";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 16;
const TRAILER_LEN: usize = 4;

/// What a snapshot captures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    /// Console state and episode bookkeeping. Restoring keeps the session's
    /// own random stream.
    Game,
    /// Everything in [`SnapshotKind::Game`] plus the sticky-action RNG.
    System,
}

impl SnapshotKind {
    fn code(self) -> u8 {
        match self {
            SnapshotKind::Game => 0,
            SnapshotKind::System => 1,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SnapshotKind::Game),
            1 => Some(SnapshotKind::System),
            _ => None,
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Game => f.write_str("game"),
            SnapshotKind::System => f.write_str("system"),
        }
    }
}

/// Session-level state carried in the payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct SessionState {
    pub machine: Vec<u8>,
    pub episode_frame_number: u64,
    pub mode: Mode,
    pub difficulty: Difficulty,
    pub last_action: Action,
    pub score: i32,
    pub rng: Option<ChaCha8Rng>,
}

impl SessionState {
    fn kind(&self) -> SnapshotKind {
        if self.rng.is_some() {
            SnapshotKind::System
        } else {
            SnapshotKind::Game
        }
    }
}

/// A captured session state. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Snapshot {
    kind: SnapshotKind,
    cartridge_crc32: u32,
    bytes: Arc<[u8]>,
}

impl Snapshot {
    pub(crate) fn capture(cartridge_crc32: u32, state: &SessionState) -> Result<Self> {
        let kind = state.kind();
        let payload =
            postcard::to_allocvec(state).map_err(|e| StateError::Encode(e.to_string()))?;
        let payload_len = u32::try_from(payload.len())
            .map_err(|_| StateError::Encode(format!("payload of {} bytes", payload.len())))?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(HEADER_LEN + payload.len() + TRAILER_LEN)?;
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.push(kind.code());
        bytes.push(0);
        bytes.extend_from_slice(&cartridge_crc32.to_le_bytes());
        bytes.extend_from_slice(&payload_len.to_le_bytes());
        bytes.extend_from_slice(&payload);
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_le_bytes());

        log::debug!("captured {kind} snapshot, {} bytes", bytes.len());
        Ok(Self {
            kind,
            cartridge_crc32,
            bytes: bytes.into(),
        })
    }

    /// Parse an encoding produced by [`Snapshot::encode`].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let malformed = |msg: String| Error::MalformedSnapshot(msg);

        if data.len() < HEADER_LEN + TRAILER_LEN {
            return Err(malformed(format!("{} bytes is shorter than a header", data.len())));
        }
        if data[0..4] != MAGIC {
            return Err(malformed("bad magic".into()));
        }
        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != FORMAT_VERSION {
            return Err(malformed(format!("unsupported format version {version}")));
        }
        let kind = SnapshotKind::from_code(data[6])
            .ok_or_else(|| malformed(format!("unknown snapshot kind {}", data[6])))?;
        if data[7] != 0 {
            return Err(malformed("reserved byte is not zero".into()));
        }
        let cartridge_crc32 = read_u32(data, 8);
        let payload_len = read_u32(data, 12) as usize;
        if HEADER_LEN + payload_len + TRAILER_LEN != data.len() {
            return Err(malformed(format!(
                "payload length {payload_len} does not match {} total bytes",
                data.len()
            )));
        }
        let body_end = HEADER_LEN + payload_len;
        if crc32fast::hash(&data[..body_end]) != read_u32(data, body_end) {
            return Err(malformed("checksum mismatch".into()));
        }

        let state = parse_payload(&data[HEADER_LEN..body_end])?;
        if state.kind() != kind {
            return Err(malformed(format!("header says {kind}, payload disagrees")));
        }

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(data.len())?;
        bytes.extend_from_slice(data);
        log::debug!("decoded {kind} snapshot, {} bytes", data.len());
        Ok(Self {
            kind,
            cartridge_crc32,
            bytes: bytes.into(),
        })
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// CRC-32 of the cartridge the state was captured under.
    pub fn cartridge_crc32(&self) -> u32 {
        self.cartridge_crc32
    }

    /// Exact number of bytes [`Snapshot::encode`] writes.
    pub fn encoded_len(&self) -> usize {
        self.bytes.len()
    }

    /// Write the encoding to the front of `out`. Fails without writing when
    /// `out` is shorter than [`Snapshot::encoded_len`].
    pub fn encode(&self, out: &mut [u8]) -> Result<usize> {
        let needed = self.bytes.len();
        if out.len() < needed {
            return Err(Error::BufferTooSmall {
                needed,
                available: out.len(),
            });
        }
        out[..needed].copy_from_slice(&self.bytes);
        Ok(needed)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// End this handle's lifetime. The shared buffer is freed with the last
    /// clone.
    pub fn release(self) {
        log::debug!("released {} snapshot", self.kind);
    }

    pub(crate) fn state(&self) -> Result<SessionState> {
        parse_payload(&self.bytes[HEADER_LEN..self.bytes.len() - TRAILER_LEN])
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("kind", &self.kind)
            .field("cartridge_crc32", &format_args!("0x{:08X}", self.cartridge_crc32))
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn parse_payload(payload: &[u8]) -> Result<SessionState> {
    let (state, rest) = postcard::take_from_bytes::<SessionState>(payload)
        .map_err(|e| Error::MalformedSnapshot(format!("payload: {e}")))?;
    if !rest.is_empty() {
        return Err(Error::MalformedSnapshot(format!(
            "{} trailing payload bytes",
            rest.len()
        )));
    }
    Ok(state)
}
