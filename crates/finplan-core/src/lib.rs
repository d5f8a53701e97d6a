pub mod config;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "loans")]
pub mod loans;

#[cfg(feature = "growth")]
pub mod growth;

#[cfg(feature = "tax")]
pub mod tax;

pub use config::PlannerConfig;
pub use error::FinPlanError;
pub use types::*;

/// Standard result type for all finplan operations
pub type FinPlanResult<T> = Result<T, FinPlanError>;
