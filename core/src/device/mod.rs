pub mod riot;
pub mod tia;

pub use riot::{Riot, RiotState};
pub use tia::{Tia, TiaState};
