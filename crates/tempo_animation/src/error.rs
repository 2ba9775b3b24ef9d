//! Configuration error types

use thiserror::Error;

/// Rejected animation configuration
///
/// Advancing a timeline never fails; these errors only come from validating a
/// property batch before it is applied.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric property was NaN or infinite
    #[error("Property `{property}` must be finite, got {value}")]
    NonFinite { property: &'static str, value: f64 },

    /// Duration must be strictly positive
    #[error("Duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    /// Speed multiplier must not run time backwards
    #[error("Speed must not be negative, got {0}")]
    NegativeSpeed(f64),

    /// A repeat count of zero never plays
    #[error("Repeat count must be at least 1")]
    ZeroRepeat,
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
