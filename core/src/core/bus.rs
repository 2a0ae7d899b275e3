/// Identifies who is accessing the bus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusMaster {
    Cpu(usize), // CPU 0 is the only master on this console
    Debug,      // Host-side inspection; must not trigger register side effects
}

/// Generic bus interface between a CPU and the board it is wired into.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for the 6502 family
    type Data; // u8

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Check if the bus is halted for this master (RDY held low).
    /// Returns true if the master must pause before the next bus cycle.
    fn is_halted_for(&self, _master: BusMaster) -> bool {
        false
    }
}
