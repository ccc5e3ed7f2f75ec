pub mod cash_flow;
pub mod error;
pub mod parcels;
pub mod simulator;
pub mod time_value;
pub mod types;

#[cfg(feature = "sweep")]
pub mod sweep;

pub use error::SimulationError;
pub use types::*;

/// Standard result type for all land-monetization operations
pub type SimResult<T> = Result<T, SimulationError>;
