//! Action/Mode registry for the loaded cartridge.

use ale_machines::action::{ALL_ACTIONS, Action};
use ale_machines::cartridge::CartridgeError;
use ale_machines::registry::GameEntry;
use ale_machines::settings::{Difficulty, Mode};

use crate::error::{Error, Result};

/// Action, mode and difficulty sets of one cartridge, fixed at load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRegistry {
    legal: Vec<Action>,
    minimal: Vec<Action>,
    modes: Vec<Mode>,
    difficulties: Vec<Difficulty>,
}

impl ActionRegistry {
    /// Build the sets for `game`. The minimal set keeps the game's order and
    /// drops anything outside the legal set; an empty result is an error.
    pub fn for_game(game: &GameEntry) -> std::result::Result<Self, CartridgeError> {
        let legal = ALL_ACTIONS.to_vec();
        let minimal: Vec<Action> = game
            .settings
            .minimal_actions()
            .iter()
            .copied()
            .filter(|a| legal.contains(a))
            .collect();
        if minimal.is_empty() {
            return Err(CartridgeError::NoMinimalActions(game.name));
        }

        let mut modes = game.settings.available_modes().to_vec();
        if modes.is_empty() {
            modes.push(0);
        }
        let mut difficulties = game.settings.available_difficulties().to_vec();
        if difficulties.is_empty() {
            difficulties.push(0);
        }

        Ok(Self {
            legal,
            minimal,
            modes,
            difficulties,
        })
    }

    pub fn legal_actions(&self) -> &[Action] {
        &self.legal
    }

    pub fn minimal_actions(&self) -> &[Action] {
        &self.minimal
    }

    pub fn available_modes(&self) -> &[Mode] {
        &self.modes
    }

    pub fn available_difficulties(&self) -> &[Difficulty] {
        &self.difficulties
    }

    /// Map an action code onto a legal action.
    pub fn check_action(&self, code: i32) -> Result<Action> {
        Action::from_code(code)
            .filter(|a| self.legal.contains(a))
            .ok_or(Error::IllegalAction(code))
    }

    pub fn check_mode(&self, mode: Mode) -> Result<Mode> {
        if self.modes.contains(&mode) {
            Ok(mode)
        } else {
            Err(Error::InvalidMode(mode))
        }
    }

    pub fn check_difficulty(&self, difficulty: Difficulty) -> Result<Difficulty> {
        if self.difficulties.contains(&difficulty) {
            Ok(difficulty)
        } else {
            Err(Error::InvalidDifficulty(difficulty))
        }
    }
}
