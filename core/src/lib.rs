pub mod core;
pub mod cpu;
pub mod device;
pub mod palette;

pub mod prelude {
    pub use crate::core::machine::{InputButton, Machine, StateError};
    pub use crate::core::{Bus, BusMaster, Component};
    pub use crate::cpu::{Cpu, CpuStateTrait};
}
