pub mod tally;

pub use tally::{TALLY_ROM, TallySettings};
