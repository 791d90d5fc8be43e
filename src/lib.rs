pub mod config;
pub mod lines;
pub mod logging;
pub mod protocol;

pub use protocol::{AggregatedState, CommandEncoder, GeneralOverrides, GeneralState};
