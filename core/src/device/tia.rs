use serde::{Deserialize, Serialize};

use crate::core::StateError;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 210;
const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Television interface chip, reduced to a frame-buffer blitter.
///
/// Instead of racing the beam, programs describe each frame as a list of
/// filled rectangles in palette indices. The chip keeps two buffers: writes
/// draw into the back buffer, and `VSYNC` publishes it.
///
/// Write registers (offset = `addr & 0x3F`):
///
/// | Offset | Name   | Effect                                          |
/// |--------|--------|-------------------------------------------------|
/// | $00    | VSYNC  | back → front, back cleared to COLUBK, frame end |
/// | $01    | COLUBK | background colour used by the next clear        |
/// | $08    | RECTX  | rectangle left edge                             |
/// | $09    | RECTY  | rectangle top edge                              |
/// | $0A    | RECTW  | rectangle width                                 |
/// | $0B    | RECTH  | rectangle height                                |
/// | $0C    | RECTC  | rectangle colour                                |
/// | $0D    | RECTGO | fill the rectangle, clipped to the screen       |
///
/// Read registers (offset = `addr & 0x0F`): $0C INPT4 and $0D INPT5 report
/// the P0/P1 fire buttons in bit 7, active low. Everything else reads 0.
pub struct Tia {
    front: Vec<u8>,
    back: Vec<u8>,
    colubk: u8,
    rect: [u8; 5], // x, y, w, h, colour
    fire: [bool; 2],
    vsync: bool,
}

/// Serialized form of [`Tia`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiaState {
    pub front: Vec<u8>,
    pub back: Vec<u8>,
    pub colubk: u8,
    pub rect: [u8; 5],
    pub fire: [bool; 2],
}

impl Default for Tia {
    fn default() -> Self {
        Self::new()
    }
}

impl Tia {
    pub fn new() -> Self {
        Self {
            front: vec![0; SCREEN_PIXELS],
            back: vec![0; SCREEN_PIXELS],
            colubk: 0,
            rect: [0; 5],
            fire: [false; 2],
            vsync: false,
        }
    }

    pub fn read(&self, offset: u8) -> u8 {
        match offset & 0x0F {
            0x0C => Self::fire_bit(self.fire[0]),
            0x0D => Self::fire_bit(self.fire[1]),
            _ => 0,
        }
    }

    fn fire_bit(pressed: bool) -> u8 {
        if pressed { 0x00 } else { 0x80 }
    }

    pub fn write(&mut self, offset: u8, data: u8) {
        match offset & 0x3F {
            0x00 => {
                self.front.copy_from_slice(&self.back);
                self.back.fill(self.colubk);
                self.vsync = true;
            }
            0x01 => self.colubk = data,
            reg @ 0x08..=0x0C => self.rect[(reg - 0x08) as usize] = data,
            0x0D => self.fill_rect(),
            _ => {}
        }
    }

    fn fill_rect(&mut self) {
        let [x, y, w, h, colour] = self.rect;
        let x0 = (x as usize).min(SCREEN_WIDTH);
        let x1 = (x as usize + w as usize).min(SCREEN_WIDTH);
        let y0 = (y as usize).min(SCREEN_HEIGHT);
        let y1 = (y as usize + h as usize).min(SCREEN_HEIGHT);
        for row in y0..y1 {
            let start = row * SCREEN_WIDTH;
            self.back[start + x0..start + x1].fill(colour);
        }
    }

    /// Latch a fire button (0 = P0, 1 = P1).
    pub fn set_fire(&mut self, player: usize, pressed: bool) {
        if let Some(slot) = self.fire.get_mut(player) {
            *slot = pressed;
        }
    }

    /// Returns true once per VSYNC write.
    pub fn take_vsync(&mut self) -> bool {
        std::mem::take(&mut self.vsync)
    }

    /// The last published frame.
    pub fn frame(&self) -> &[u8] {
        &self.front
    }

    pub fn snapshot(&self) -> TiaState {
        TiaState {
            front: self.front.clone(),
            back: self.back.clone(),
            colubk: self.colubk,
            rect: self.rect,
            fire: self.fire,
        }
    }

    pub fn validate(state: &TiaState) -> Result<(), StateError> {
        for (field, buf) in [("tia.front", &state.front), ("tia.back", &state.back)] {
            if buf.len() != SCREEN_PIXELS {
                return Err(StateError::SizeMismatch {
                    field,
                    expected: SCREEN_PIXELS,
                    actual: buf.len(),
                });
            }
        }
        Ok(())
    }

    /// Restore from a state that has passed [`Tia::validate`].
    pub fn restore(&mut self, state: &TiaState) {
        self.front.copy_from_slice(&state.front);
        self.back.copy_from_slice(&state.back);
        self.colubk = state.colubk;
        self.rect = state.rect;
        self.fire = state.fire;
        self.vsync = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_clipped_to_screen() {
        let mut tia = Tia::new();
        for (reg, value) in [(0x08, 150), (0x09, 205), (0x0A, 40), (0x0B, 40), (0x0C, 0x1E)] {
            tia.write(reg, value);
        }
        tia.write(0x0D, 0);
        tia.write(0x00, 0);

        let frame = tia.frame();
        assert_eq!(frame[205 * SCREEN_WIDTH + 150], 0x1E);
        assert_eq!(frame[SCREEN_PIXELS - 1], 0x1E);
        assert_eq!(frame[205 * SCREEN_WIDTH + 149], 0);
        assert_eq!(frame[204 * SCREEN_WIDTH + 159], 0);
    }

    #[test]
    fn vsync_publishes_then_clears_to_background() {
        let mut tia = Tia::new();
        tia.write(0x01, 0x42);
        tia.write(0x00, 0);
        assert!(tia.take_vsync());
        assert!(!tia.take_vsync());
        assert!(tia.frame().iter().all(|&p| p == 0));

        tia.write(0x00, 0);
        assert!(tia.frame().iter().all(|&p| p == 0x42));
    }

    #[test]
    fn fire_buttons_are_active_low() {
        let mut tia = Tia::new();
        assert_eq!(tia.read(0x0C), 0x80);
        tia.set_fire(0, true);
        assert_eq!(tia.read(0x0C), 0x00);
        assert_eq!(tia.read(0x0D), 0x80);
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let mut state = Tia::new().snapshot();
        state.back.pop();
        assert!(matches!(
            Tia::validate(&state),
            Err(StateError::SizeMismatch { field: "tia.back", .. })
        ));
    }
}
