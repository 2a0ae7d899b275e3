//! Tally: a small homebrew cartridge bundled for tests and demos.
//!
//! The player slides a block along the bottom of the screen and scores by
//! pressing fire. DOWN costs a life; the episode ends with no lives left.
//!
//! | Mode | Points per fire |   | Difficulty | Lives |
//! |------|-----------------|---|------------|-------|
//! | 0    | 1               |   | 0 (B)      | 5     |
//! | 1    | 2               |   | 1 (A)      | 3     |
//!
//! SELECT toggles the mode, RESET starts a new game. The screen shows the
//! score (low byte) and lives as bars along the top and the background hue
//! follows the mode.

use crate::action::Action;
use crate::registry::GameEntry;
use crate::settings::{Difficulty, GameSettings, Mode, Progress, decimal_score};

// ---------------------------------------------------------------------------
// RAM layout (offsets into the 128-byte RIOT RAM at $80)
// ---------------------------------------------------------------------------
pub const RAM_SCORE_LO: usize = 0x00; // packed BCD
pub const RAM_LIVES: usize = 0x01;
pub const RAM_PLAYER_X: usize = 0x02;
pub const RAM_MODE: usize = 0x03;
pub const RAM_SCORE_HI: usize = 0x06; // packed BCD

/// CRC-32 of [`TALLY_ROM`].
pub const TALLY_CRC32: u32 = 0xF08F7E40;

/// Program code, assembled at $F800.
#[rustfmt::skip]
const PROGRAM: &[u8] = &[
    // reset:
    0x78,                 // SEI
    0xD8,                 // CLD
    0xA2, 0xFF,           // LDX #$FF
    0x9A,                 // TXS
    0xA9, 0x00,           // LDA #$00
    0xA2, 0x7F,           // LDX #$7F
    // clear:
    0x95, 0x80,           // STA $80,X
    0xCA,                 // DEX
    0x10, 0xFB,           // BPL clear
    // frame:
    0xAD, 0x82, 0x02,     // LDA SWCHB
    0xA8,                 // TAY
    0x29, 0x01,           // AND #$01
    0xD0, 0x03,           // BNE noreset
    0x20, 0xA3, 0xF8,     // JSR newgame
    // noreset:
    0x98,                 // TYA
    0x49, 0xFF,           // EOR #$FF
    0x25, 0x84,           // AND PREV_SWCHB
    0x29, 0x02,           // AND #$02
    0xF0, 0x06,           // BEQ noselect
    0xA5, 0x83,           // LDA MODE
    0x49, 0x01,           // EOR #$01
    0x85, 0x83,           // STA MODE
    // noselect:
    0x84, 0x84,           // STY PREV_SWCHB
    0xA5, 0x81,           // LDA LIVES
    0xF0, 0x2D,           // BEQ draw
    0xAD, 0x80, 0x02,     // LDA SWCHA
    0xA8,                 // TAY
    0x29, 0x80,           // AND #$80
    0xD0, 0x02,           // BNE noright
    0xE6, 0x82,           // INC PLAYER_X
    // noright:
    0x98,                 // TYA
    0x29, 0x40,           // AND #$40
    0xD0, 0x02,           // BNE noleft
    0xC6, 0x82,           // DEC PLAYER_X
    // noleft:
    0x98,                 // TYA
    0x29, 0x20,           // AND #$20
    0xD0, 0x02,           // BNE nodown
    0xC6, 0x81,           // DEC LIVES
    // nodown:
    0x24, 0x0C,           // BIT INPT4
    0x30, 0x11,           // BMI draw
    0xF8,                 // SED
    0x18,                 // CLC
    0xA5, 0x83,           // LDA MODE
    0x69, 0x01,           // ADC #$01
    0x65, 0x80,           // ADC SCORE_LO
    0x85, 0x80,           // STA SCORE_LO
    0xA5, 0x86,           // LDA SCORE_HI
    0x69, 0x00,           // ADC #$00
    0x85, 0x86,           // STA SCORE_HI
    0xD8,                 // CLD
    // draw:
    0xA5, 0x82,           // LDA PLAYER_X
    0x85, 0x08,           // STA RECTX
    0xA9, 0xB4,           // LDA #180
    0x85, 0x09,           // STA RECTY
    0xA9, 0x08,           // LDA #8
    0x85, 0x0A,           // STA RECTW
    0x85, 0x0B,           // STA RECTH
    0xA9, 0x1E,           // LDA #$1E
    0x85, 0x0C,           // STA RECTC
    0x85, 0x0D,           // STA RECTGO
    0xA9, 0x00,           // LDA #0
    0x85, 0x08,           // STA RECTX
    0x85, 0x09,           // STA RECTY
    0xA5, 0x80,           // LDA SCORE_LO
    0x85, 0x0A,           // STA RECTW
    0xA9, 0x04,           // LDA #4
    0x85, 0x0B,           // STA RECTH
    0xA9, 0x0E,           // LDA #$0E
    0x85, 0x0C,           // STA RECTC
    0x85, 0x0D,           // STA RECTGO
    0xA9, 0x08,           // LDA #8
    0x85, 0x09,           // STA RECTY
    0xA5, 0x81,           // LDA LIVES
    0x0A,                 // ASL
    0x0A,                 // ASL
    0x0A,                 // ASL
    0x85, 0x0A,           // STA RECTW
    0xA9, 0x44,           // LDA #$44
    0x85, 0x0C,           // STA RECTC
    0x85, 0x0D,           // STA RECTGO
    0xA5, 0x83,           // LDA MODE
    0x0A,                 // ASL
    0x0A,                 // ASL
    0x0A,                 // ASL
    0x0A,                 // ASL
    0x09, 0x02,           // ORA #$02
    0x85, 0x01,           // STA COLUBK
    0x85, 0x00,           // STA VSYNC
    0x4C, 0x0E, 0xF8,     // JMP frame
    // newgame:
    0xA9, 0x00,           // LDA #0
    0x85, 0x80,           // STA SCORE_LO
    0x85, 0x86,           // STA SCORE_HI
    0xA9, 0x4C,           // LDA #76
    0x85, 0x82,           // STA PLAYER_X
    0xA9, 0x05,           // LDA #5
    0x2C, 0x82, 0x02,     // BIT SWCHB
    0x50, 0x02,           // BVC lives_set
    0xA9, 0x03,           // LDA #3
    // lives_set:
    0x85, 0x81,           // STA LIVES
    0x60,                 // RTS
];

/// 2 KiB image: program, $FF fill, then NMI/RESET/IRQ vectors all at $F800.
pub const TALLY_ROM: [u8; 0x800] = {
    let mut rom = [0xFF; 0x800];
    let mut i = 0;
    while i < PROGRAM.len() {
        rom[i] = PROGRAM[i];
        i += 1;
    }
    let mut v = 0x7FA;
    while v < 0x800 {
        rom[v] = 0x00;
        rom[v + 1] = 0xF8;
        v += 2;
    }
    rom
};

pub struct TallySettings;

impl GameSettings for TallySettings {
    fn evaluate(&self, ram: &[u8]) -> Progress {
        let lives = ram[RAM_LIVES];
        Progress {
            score: decimal_score(ram[RAM_SCORE_LO], ram[RAM_SCORE_HI]),
            lives: i32::from(lives),
            terminal: lives == 0,
        }
    }

    fn minimal_actions(&self) -> &'static [Action] {
        &[
            Action::Noop,
            Action::Fire,
            Action::Right,
            Action::Left,
            Action::Down,
        ]
    }

    fn available_modes(&self) -> &'static [Mode] {
        &[0, 1]
    }

    fn available_difficulties(&self) -> &'static [Difficulty] {
        &[0, 1]
    }

    fn mode_select_presses(&self, mode: Mode) -> u32 {
        mode
    }
}

inventory::submit! {
    GameEntry::new(
        "tally",
        "Score by pressing fire; DOWN costs a life",
        &[TALLY_CRC32],
        &TallySettings,
    )
    .with_bundled_image(&TALLY_ROM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_checksum_matches_registry() {
        assert_eq!(crc32fast::hash(&TALLY_ROM), TALLY_CRC32);
    }

    #[test]
    fn vectors_point_at_program_start() {
        assert_eq!(&TALLY_ROM[0x7FC..0x7FE], &[0x00, 0xF8]);
        assert_eq!(TALLY_ROM[0], 0x78); // SEI
    }

    #[test]
    fn evaluate_reads_bcd_score_and_lives() {
        let mut ram = [0u8; 128];
        ram[RAM_SCORE_LO] = 0x42;
        ram[RAM_SCORE_HI] = 0x01;
        ram[RAM_LIVES] = 2;
        let progress = TallySettings.evaluate(&ram);
        assert_eq!(progress.score, 142);
        assert_eq!(progress.lives, 2);
        assert!(!progress.terminal);

        ram[RAM_LIVES] = 0;
        assert!(TallySettings.evaluate(&ram).terminal);
    }
}
