//! NMOS 6502, stepped one instruction at a time.
//!
//! The console only needs instruction-accurate timing: `step()` executes a
//! whole instruction against the bus and reports how many cycles it took, and
//! the board advances its chips by that amount. Undocumented opcodes jam the
//! CPU, as they do on real silicon; a jammed CPU stays halted until reset.

mod alu;
pub mod decode;
mod execute;

use crate::core::{Bus, BusMaster};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, M6502State},
};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum StatusFlag {
    C = 0x01, // Carry
    Z = 0x02, // Zero
    I = 0x04, // Interrupt Disable
    D = 0x08, // Decimal
    B = 0x10, // Break
    U = 0x20, // Unused (always 1)
    V = 0x40, // Overflow
    N = 0x80, // Negative
}

/// Cycles reported for a step taken while jammed. The board keeps its clock
/// running so a frame still ends on its cycle budget.
pub const JAM_CYCLES: u32 = 2;

pub struct M6502 {
    // Registers
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub pc: u16,
    pub sp: u8,
    pub p: u8,

    // Internal state
    pub(crate) jammed: bool,
    pub(crate) cycles: u64,
}

impl Default for M6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6502 {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            p: 0x24, // I=1, U=1
            jammed: false,
            cycles: 0,
        }
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, set: bool) {
        if set {
            self.p |= flag as u8;
        } else {
            self.p &= !(flag as u8);
        }
    }

    #[inline]
    pub fn flag(&self, flag: StatusFlag) -> bool {
        self.p & (flag as u8) != 0
    }

    /// Total cycles executed since power-on.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Load PC from the reset vector at $FFFC/$FFFD.
    pub fn reset_from_vector<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.reset();
        let lo = bus.read(master, 0xFFFC) as u16;
        let hi = bus.read(master, 0xFFFD) as u16;
        self.pc = (hi << 8) | lo;
    }

    /// Execute one instruction. Returns the number of cycles it consumed.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        if self.jammed || bus.is_halted_for(master) {
            self.cycles += JAM_CYCLES as u64;
            return JAM_CYCLES;
        }

        let opcode = self.fetch(bus, master);
        let cycles = match decode::decode(opcode) {
            Some(instruction) => self.execute(bus, master, instruction),
            None => {
                // Stay parked on the offending opcode.
                self.pc = self.pc.wrapping_sub(1);
                self.jammed = true;
                JAM_CYCLES
            }
        };
        self.cycles += cycles as u64;
        cycles
    }

    // ---- Bus helpers ----

    #[inline]
    pub(crate) fn fetch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let byte = bus.read(master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    pub(crate) fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let lo = self.fetch(bus, master) as u16;
        let hi = self.fetch(bus, master) as u16;
        (hi << 8) | lo
    }

    pub(crate) fn push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        data: u8,
    ) {
        bus.write(master, 0x0100 | self.sp as u16, data);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        bus.read(master, 0x0100 | self.sp as u16)
    }
}

impl Cpu for M6502 {
    fn reset(&mut self) {
        *self = Self::new();
    }

    fn is_sleeping(&self) -> bool {
        self.jammed
    }
}

impl CpuStateTrait for M6502 {
    type Snapshot = M6502State;

    fn snapshot(&self) -> M6502State {
        M6502State {
            a: self.a,
            x: self.x,
            y: self.y,
            pc: self.pc,
            sp: self.sp,
            p: self.p,
            jammed: self.jammed,
            cycles: self.cycles,
        }
    }

    fn restore(&mut self, state: &M6502State) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.pc = state.pc;
        self.sp = state.sp;
        self.p = state.p;
        self.jammed = state.jammed;
        self.cycles = state.cycles;
    }
}
