//! Typed key/value configuration.
//!
//! Values keep the type they were written with; reading a key back with a
//! different type is an error rather than a conversion. A few keys have
//! defaults so that a fresh session can load a cartridge without any setup.

use std::collections::BTreeMap;
use std::fmt;

use ale_machines::settings::{Difficulty, Mode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Well-known keys
// ---------------------------------------------------------------------------
pub const RANDOM_SEED: &str = "random_seed";
pub const FRAME_SKIP: &str = "frame_skip";
pub const REPEAT_ACTION_PROBABILITY: &str = "repeat_action_probability";
pub const MAX_NUM_FRAMES_PER_EPISODE: &str = "max_num_frames_per_episode";
/// Optional: mode selected at load.
pub const MODE: &str = "mode";
/// Optional: difficulty selected at load.
pub const DIFFICULTY: &str = "difficulty";

const KNOWN_KEYS: [&str; 6] = [
    RANDOM_SEED,
    FRAME_SKIP,
    REPEAT_ACTION_PROBABILITY,
    MAX_NUM_FRAMES_PER_EPISODE,
    MODE,
    DIFFICULTY,
];

/// Default for a key, if it has one.
pub fn default_value(key: &str) -> Option<ConfigValue> {
    match key {
        RANDOM_SEED => Some(ConfigValue::Int(0)),
        FRAME_SKIP => Some(ConfigValue::Int(1)),
        REPEAT_ACTION_PROBABILITY => Some(ConfigValue::Float(0.25)),
        MAX_NUM_FRAMES_PER_EPISODE => Some(ConfigValue::Int(0)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A configuration value. Deserializes from a bare TOML scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
}

/// The type tag of a [`ConfigValue`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Int,
    Bool,
    Float,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Str => "string",
            ValueKind::Int => "int",
            ValueKind::Bool => "bool",
            ValueKind::Float => "float",
        })
    }
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Str(_) => ValueKind::Str,
            ConfigValue::Int(_) => ValueKind::Int,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Float(_) => ValueKind::Float,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => f.write_str(s),
            ConfigValue::Int(i) => write!(f, "{i}"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Str(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Str(value.to_string())
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<f32> for ConfigValue {
    fn from(value: f32) -> Self {
        ConfigValue::Float(value)
    }
}

/// Native types a configuration value can be read back as.
pub trait ConfigType: Sized {
    const KIND: ValueKind;

    fn from_value(value: &ConfigValue) -> Option<Self>;
}

impl ConfigType for String {
    const KIND: ValueKind = ValueKind::Str;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl ConfigType for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl ConfigType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl ConfigType for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(x) => Some(*x),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The configuration store. Keys are free-form; last write wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    entries: BTreeMap<String, ConfigValue>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat TOML table of scalars, e.g. `frame_skip = 4`.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// The stored value, or the key's default.
    pub fn value(&self, key: &str) -> Result<ConfigValue> {
        self.entries
            .get(key)
            .cloned()
            .or_else(|| default_value(key))
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    /// Typed read. Fails with `TypeMismatch` if the key holds another type.
    pub fn get<T: ConfigType>(&self, key: &str) -> Result<T> {
        let value = self.value(key)?;
        T::from_value(&value).ok_or_else(|| Error::TypeMismatch {
            key: key.to_string(),
            expected: T::KIND,
            found: value.kind(),
        })
    }

    /// True if the key was written explicitly (defaults don't count).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check the keys that shape emulation and resolve them to native types.
    pub(crate) fn resolve(&self) -> Result<EnvConfig> {
        for key in self.entries.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                log::warn!("ignoring unknown setting `{key}`");
            }
        }

        let invalid = |e: Error| Error::InvalidConfig(e.to_string());
        let seed = self.get::<i32>(RANDOM_SEED).map_err(invalid)?;
        let frame_skip = self.get::<i32>(FRAME_SKIP).map_err(invalid)?;
        let repeat = self.get::<f32>(REPEAT_ACTION_PROBABILITY).map_err(invalid)?;
        let max_frames = self.get::<i32>(MAX_NUM_FRAMES_PER_EPISODE).map_err(invalid)?;

        if frame_skip < 1 {
            return Err(Error::InvalidConfig(format!(
                "{FRAME_SKIP} must be at least 1, got {frame_skip}"
            )));
        }
        if !(0.0..=1.0).contains(&repeat) {
            return Err(Error::InvalidConfig(format!(
                "{REPEAT_ACTION_PROBABILITY} must be within [0, 1], got {repeat}"
            )));
        }
        if max_frames < 0 {
            return Err(Error::InvalidConfig(format!(
                "{MAX_NUM_FRAMES_PER_EPISODE} must not be negative, got {max_frames}"
            )));
        }

        Ok(EnvConfig {
            // Negative seeds are valid; reinterpret the bits.
            seed: u64::from(seed as u32),
            frame_skip: frame_skip as u32,
            repeat_action_probability: repeat,
            max_num_frames_per_episode: max_frames as u64,
            mode: self.optional_selector(MODE)?,
            difficulty: self.optional_selector(DIFFICULTY)?,
        })
    }

    fn optional_selector(&self, key: &str) -> Result<Option<u32>> {
        if !self.contains(key) {
            return Ok(None);
        }
        let value = self
            .get::<i32>(key)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        u32::try_from(value)
            .map(Some)
            .map_err(|_| Error::InvalidConfig(format!("{key} must not be negative, got {value}")))
    }
}

/// Emulation parameters fixed at cartridge load.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub seed: u64,
    pub frame_skip: u32,
    pub repeat_action_probability: f32,
    pub max_num_frames_per_episode: u64,
    pub mode: Option<Mode>,
    pub difficulty: Option<Difficulty>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_until_overwritten() {
        let mut settings = Settings::new();
        assert_eq!(settings.get::<i32>(FRAME_SKIP).unwrap(), 1);
        assert_eq!(settings.get::<f32>(REPEAT_ACTION_PROBABILITY).unwrap(), 0.25);
        assert!(!settings.contains(FRAME_SKIP));

        settings.set(FRAME_SKIP, 4);
        settings.set(FRAME_SKIP, 5);
        assert_eq!(settings.get::<i32>(FRAME_SKIP).unwrap(), 5);
    }

    #[test]
    fn wrong_type_is_a_mismatch_not_a_coercion() {
        let mut settings = Settings::new();
        settings.set(RANDOM_SEED, "42");
        match settings.get::<i32>(RANDOM_SEED) {
            Err(Error::TypeMismatch {
                key,
                expected,
                found,
            }) => {
                assert_eq!(key, RANDOM_SEED);
                assert_eq!(expected, ValueKind::Int);
                assert_eq!(found, ValueKind::Str);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn unknown_key_is_stored_but_unset_key_is_not_found() {
        let mut settings = Settings::new();
        settings.set("display_screen", true);
        assert!(settings.get::<bool>("display_screen").unwrap());
        assert!(matches!(settings.get::<bool>("sound"), Err(Error::NotFound(k)) if k == "sound"));
    }

    #[test]
    fn toml_scalars_keep_their_type() {
        let settings = Settings::from_toml_str(
            "random_seed = 7\nrepeat_action_probability = 0.0\nrecord_dir = \"out\"\ncolor_averaging = false\n",
        )
        .unwrap();
        assert_eq!(settings.value(RANDOM_SEED).unwrap(), ConfigValue::Int(7));
        assert_eq!(
            settings.value(REPEAT_ACTION_PROBABILITY).unwrap(),
            ConfigValue::Float(0.0)
        );
        assert_eq!(settings.get::<String>("record_dir").unwrap(), "out");
        assert!(!settings.get::<bool>("color_averaging").unwrap());
    }

    #[test]
    fn toml_syntax_error_is_reported() {
        assert!(matches!(
            Settings::from_toml_str("frame_skip = = 3"),
            Err(Error::ConfigSyntax(_))
        ));
    }

    #[test]
    fn resolve_validates_ranges() {
        let mut settings = Settings::new();
        settings.set(FRAME_SKIP, 0);
        assert!(matches!(settings.resolve(), Err(Error::InvalidConfig(_))));

        let mut settings = Settings::new();
        settings.set(REPEAT_ACTION_PROBABILITY, 1.5f32);
        assert!(matches!(settings.resolve(), Err(Error::InvalidConfig(_))));

        let mut settings = Settings::new();
        settings.set(FRAME_SKIP, 1.0f32);
        assert!(matches!(settings.resolve(), Err(Error::InvalidConfig(_))));

        let mut settings = Settings::new();
        settings.set(MODE, -1);
        assert!(matches!(settings.resolve(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn resolve_reads_defaults_and_selectors() {
        let mut settings = Settings::new();
        settings.set(RANDOM_SEED, -1);
        settings.set(DIFFICULTY, 1);
        let config = settings.resolve().unwrap();
        assert_eq!(config.seed, 0xFFFF_FFFF);
        assert_eq!(config.frame_skip, 1);
        assert_eq!(config.max_num_frames_per_episode, 0);
        assert_eq!(config.mode, None);
        assert_eq!(config.difficulty, Some(1));
    }
}
