/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Return registers to their power-on values. The caller loads the
    /// program counter from the board's reset vector.
    fn reset(&mut self);

    /// Query if CPU is halted internally (jammed on an undefined opcode)
    fn is_sleeping(&self) -> bool;
}

pub mod state;
pub use state::{CpuStateTrait, M6502State};

pub mod m6502;
pub use m6502::M6502;
