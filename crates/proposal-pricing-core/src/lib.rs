pub mod error;
pub mod types;

#[cfg(feature = "tax")]
pub mod tax;

#[cfg(feature = "costs")]
pub mod costs;

#[cfg(feature = "budget")]
pub mod budget;

#[cfg(feature = "forecast")]
pub mod forecast;

#[cfg(feature = "insights")]
pub mod insights;

pub use error::PricingError;
pub use types::*;

/// Standard result type for all proposal-pricing operations
pub type PricingResult<T> = Result<T, PricingError>;
