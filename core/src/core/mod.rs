pub mod bus;
pub mod component;
pub mod machine;

pub use bus::{Bus, BusMaster};
pub use component::Component;
pub use machine::{InputButton, Machine, StateError};
