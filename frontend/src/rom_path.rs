//! Cartridge resolution for the command line.
//!
//! `ale run <rom>` accepts either a file (raw image or `.zip`) or the name of
//! a registered game that ships its own image, e.g. `ale run tally`.

use std::path::Path;

use ale_interface::Cartridge;
use ale_machines::registry;

use crate::error::CliError;

/// Resolution order:
/// 1. An existing file at `rom` is loaded from disk.
/// 2. Otherwise `rom` is looked up as a game name with a bundled image.
pub fn resolve(rom: &str) -> Result<Cartridge, CliError> {
    let path = Path::new(rom);
    if path.exists() {
        return Cartridge::from_path(path).map_err(|e| ale_interface::Error::from(e).into());
    }

    registry::find(&rom.to_ascii_lowercase())
        .and_then(|entry| entry.bundled_cartridge())
        .ok_or_else(|| CliError::UnknownCartridge(rom.to_string()))
}
