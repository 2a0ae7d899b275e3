//! Game registry for cartridge identification.
//!
//! Each supported game self-registers via [`inventory::submit!`] with a
//! [`GameEntry`] holding its name, known image checksums and rules. Sessions
//! look the loaded cartridge up at runtime without any central list.

use crate::cartridge::{Cartridge, CartridgeError};
use crate::settings::GameSettings;

/// Describes a supported game.
pub struct GameEntry {
    /// Short name, also matched against the cartridge file stem (e.g., "tally").
    pub name: &'static str,
    /// One-line description for listings.
    pub description: &'static str,
    /// CRC-32 of every known good image.
    pub crc32: &'static [u32],
    /// Scoring and action rules.
    pub settings: &'static dyn GameSettings,
    /// Image bundled with the crate, if redistributable.
    pub bundled: Option<&'static [u8]>,
}

impl GameEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        crc32: &'static [u32],
        settings: &'static dyn GameSettings,
    ) -> Self {
        Self {
            name,
            description,
            crc32,
            settings,
            bundled: None,
        }
    }

    pub const fn with_bundled_image(mut self, image: &'static [u8]) -> Self {
        self.bundled = Some(image);
        self
    }

    /// The bundled image as a cartridge, if the game ships one.
    pub fn bundled_cartridge(&self) -> Option<Cartridge> {
        self.bundled
            .and_then(|rom| Cartridge::from_bytes(self.name, rom).ok())
    }
}

inventory::collect!(GameEntry);

/// Return all registered games, sorted by name.
pub fn all() -> Vec<&'static GameEntry> {
    let mut entries: Vec<_> = inventory::iter::<GameEntry>.into_iter().collect();
    entries.sort_by_key(|e| e.name);
    entries
}

/// Look up a game by name.
pub fn find(name: &str) -> Option<&'static GameEntry> {
    inventory::iter::<GameEntry>
        .into_iter()
        .find(|e| e.name == name)
}

/// Identify a cartridge: by image checksum first, then by name.
pub fn identify(cartridge: &Cartridge) -> Result<&'static GameEntry, CartridgeError> {
    let by_crc = inventory::iter::<GameEntry>
        .into_iter()
        .find(|e| e.crc32.contains(&cartridge.crc32()));
    by_crc
        .or_else(|| find(cartridge.name()))
        .ok_or_else(|| CartridgeError::Unrecognized {
            name: cartridge.name().to_string(),
            crc32: cartridge.crc32(),
        })
}
