use serde::{Deserialize, Serialize};

use crate::core::{Component, StateError};

pub const RAM_SIZE: usize = 128;

/// Interval timer prescalers selected by address bits 1:0 on a timer write.
const TIMER_INTERVALS: [u16; 4] = [1, 8, 64, 1024];

/// 6532 RAM-I/O-Timer.
///
/// Holds the console's 128 bytes of work RAM, the two switch ports and the
/// interval timer. Both ports are wired as inputs: board logic drives the
/// pins and CPU writes to the data/direction registers are ignored.
///
/// I/O registers (`addr & 0x07`, A9 set):
///
/// | Offset | Read                 |
/// |--------|----------------------|
/// | 0      | SWCHA (joysticks)    |
/// | 2      | SWCHB (console)      |
/// | 4, 6   | INTIM (timer value)  |
/// | 5, 7   | TIMINT (bit 7 = underflow since last read) |
///
/// Writes with `addr & 0x14 == 0x14` load the timer and select the interval
/// from `addr & 0x03`.
pub struct Riot {
    ram: [u8; RAM_SIZE],
    port_a: u8, // External pins, active low
    port_b: u8,

    timer: u8,
    interval: u16,
    prescaler: u16,
    underflow: bool,
}

/// Serialized form of [`Riot`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiotState {
    pub ram: Vec<u8>,
    pub port_a: u8,
    pub port_b: u8,
    pub timer: u8,
    pub interval: u16,
    pub prescaler: u16,
    pub underflow: bool,
}

impl Default for Riot {
    fn default() -> Self {
        Self::new()
    }
}

impl Riot {
    /// Power-on state: RAM cleared, all pins released, timer at the
    /// 1024-cycle interval.
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            port_a: 0xFF,
            port_b: 0xFF,
            timer: 0,
            interval: 1024,
            prescaler: 1024,
            underflow: false,
        }
    }

    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn read_ram(&self, addr: u16) -> u8 {
        self.ram[addr as usize & (RAM_SIZE - 1)]
    }

    pub fn write_ram(&mut self, addr: u16, data: u8) {
        self.ram[addr as usize & (RAM_SIZE - 1)] = data;
    }

    /// Read an I/O register. Reading TIMINT clears the underflow flag.
    pub fn read(&mut self, addr: u16) -> u8 {
        match addr & 0x07 {
            0 => self.port_a,
            2 => self.port_b,
            4 | 6 => self.timer,
            5 | 7 => {
                let flags = if self.underflow { 0x80 } else { 0x00 };
                self.underflow = false;
                flags
            }
            _ => 0,
        }
    }

    /// Side-effect-free register read for debuggers.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr & 0x07 {
            0 => self.port_a,
            2 => self.port_b,
            4 | 6 => self.timer,
            5 | 7 => (self.underflow as u8) << 7,
            _ => 0,
        }
    }

    pub fn write(&mut self, addr: u16, data: u8) {
        if addr & 0x14 == 0x14 {
            self.interval = TIMER_INTERVALS[(addr & 0x03) as usize];
            self.prescaler = self.interval;
            self.timer = data;
            self.underflow = false;
        }
    }

    /// Drive the SWCHA pins (joysticks).
    pub fn set_port_a(&mut self, pins: u8) {
        self.port_a = pins;
    }

    /// Drive the SWCHB pins (console switches).
    pub fn set_port_b(&mut self, pins: u8) {
        self.port_b = pins;
    }

    pub fn port_a(&self) -> u8 {
        self.port_a
    }

    pub fn port_b(&self) -> u8 {
        self.port_b
    }

    pub fn snapshot(&self) -> RiotState {
        RiotState {
            ram: self.ram.to_vec(),
            port_a: self.port_a,
            port_b: self.port_b,
            timer: self.timer,
            interval: self.interval,
            prescaler: self.prescaler,
            underflow: self.underflow,
        }
    }

    pub fn validate(state: &RiotState) -> Result<(), StateError> {
        if state.ram.len() != RAM_SIZE {
            return Err(StateError::SizeMismatch {
                field: "riot.ram",
                expected: RAM_SIZE,
                actual: state.ram.len(),
            });
        }
        if !TIMER_INTERVALS.contains(&state.interval) || state.prescaler == 0 {
            return Err(StateError::Decode(format!(
                "timer interval {} / prescaler {} out of range",
                state.interval, state.prescaler
            )));
        }
        Ok(())
    }

    /// Restore from a state that has passed [`Riot::validate`].
    pub fn restore(&mut self, state: &RiotState) {
        self.ram.copy_from_slice(&state.ram);
        self.port_a = state.port_a;
        self.port_b = state.port_b;
        self.timer = state.timer;
        self.interval = state.interval;
        self.prescaler = state.prescaler;
        self.underflow = state.underflow;
    }
}

impl Component for Riot {
    /// One CPU cycle. Returns true when the timer wraps past zero.
    fn tick(&mut self) -> bool {
        self.prescaler -= 1;
        if self.prescaler > 0 {
            return false;
        }
        let wrapped = self.timer == 0;
        self.timer = self.timer.wrapping_sub(1);
        if wrapped {
            // After underflow the timer free-runs at one count per cycle.
            self.underflow = true;
            self.interval = 1;
        }
        self.prescaler = self.interval;
        wrapped
    }
}
