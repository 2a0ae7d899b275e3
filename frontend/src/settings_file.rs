//! Optional TOML file with session settings.
//!
//! ```toml
//! random_seed = 7
//! frame_skip = 4
//! repeat_action_probability = 0.25
//! ```

use std::path::{Path, PathBuf};

use ale_interface::Settings;

use crate::error::CliError;

/// `<config dir>/ale/config.toml`, e.g. `~/.config/ale/config.toml` on Linux.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ale").join("config.toml"))
}

/// Read `explicit`, or the default file when it exists. No file means empty
/// settings; an explicit path that can't be read is an error.
pub fn load(explicit: Option<&Path>) -> Result<Settings, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path().filter(|p| p.is_file()) {
            Some(path) => path,
            None => return Ok(Settings::new()),
        },
    };

    let text = std::fs::read_to_string(&path).map_err(CliError::file(&path))?;
    let settings = Settings::from_toml_str(&text)?;
    tracing::info!("read {} settings from {}", settings.iter().count(), path.display());
    Ok(settings)
}
