//! CPU state snapshot types and traits

use serde::{Deserialize, Serialize};

/// Trait for CPU types that can provide and accept state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: &Self::Snapshot);
}

/// M6502 CPU state snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M6502State {
    pub a: u8,       // Accumulator
    pub x: u8,       // X index register
    pub y: u8,       // Y index register
    pub pc: u16,     // Program counter
    pub sp: u8,      // Stack pointer (0x01xx page)
    pub p: u8,       // Status register (flags)
    pub jammed: bool, // Halted on an undefined opcode
    pub cycles: u64, // Total cycles executed since power-on
}
