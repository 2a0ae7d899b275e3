//! Per-game rules: how to read score and lives out of RAM, which actions
//! matter, and which modes/difficulties the cartridge offers.

use crate::action::Action;

/// Game mode number as understood by the cartridge.
pub type Mode = u32;
/// Difficulty switch setting as understood by the cartridge.
pub type Difficulty = u32;

/// Game state extracted from RAM after a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub score: i32,
    pub lives: i32,
    pub terminal: bool,
}

/// Rules for one cartridge. Implementations are stateless: everything they
/// report is derived from the RAM slice they are handed.
pub trait GameSettings: Send + Sync {
    /// Read score, lives and the end-of-episode condition from RAM.
    fn evaluate(&self, ram: &[u8]) -> Progress;

    /// Actions that have a distinct effect in this game, in preference order.
    fn minimal_actions(&self) -> &'static [Action];

    fn available_modes(&self) -> &'static [Mode] {
        &[0]
    }

    fn default_mode(&self) -> Mode {
        self.available_modes().first().copied().unwrap_or(0)
    }

    /// Difficulty `d` sets the left switch to A when bit 0 is set and the
    /// right switch to A when bit 1 is set.
    fn available_difficulties(&self) -> &'static [Difficulty] {
        &[0]
    }

    fn default_difficulty(&self) -> Difficulty {
        self.available_difficulties().first().copied().unwrap_or(0)
    }

    /// Actions pressed once each after the console reset, e.g. to leave a
    /// title screen.
    fn starting_actions(&self) -> &'static [Action] {
        &[]
    }

    /// Number of SELECT presses that take a freshly reset console to `mode`.
    fn mode_select_presses(&self, mode: Mode) -> u32 {
        let _ = mode;
        0
    }
}

/// Decode a score stored as packed BCD, low byte holding units and tens.
pub fn decimal_score(lo: u8, hi: u8) -> i32 {
    let digits = |b: u8| i32::from(b >> 4) * 10 + i32::from(b & 0x0F);
    digits(hi) * 100 + digits(lo)
}
