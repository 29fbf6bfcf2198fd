//! Error types for chainsim.
//!
//! All fallible operations return `Result<T, SimError>` instead of panicking.
//! Parameter problems are raised before any simulation work starts; numeric
//! blow-ups are terminal and never clamped.

use thiserror::Error;

/// Result type alias for chainsim operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all chainsim operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Parameter Errors =====
    /// A parameter is outside its admissible domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name (e.g. `rate_constants.k1`).
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    // ===== Jidoka Violations =====
    /// Population or concentration became NaN or infinite.
    #[error("Jidoka: non-finite value {value} at {location}")]
    NumericOverflow {
        /// Where the value was observed (e.g. `population[12]`).
        location: String,
        /// The offending value.
        value: f64,
    },

    // ===== Configuration Errors =====
    /// Configuration document is malformed beyond individual parameters.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<validator::ValidationErrors> for SimError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::InvalidParameter {
            name: "schema".to_string(),
            reason: errors.to_string(),
        }
    }
}

impl SimError {
    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a numeric-overflow error.
    #[must_use]
    pub fn overflow(location: impl Into<String>, value: f64) -> Self {
        Self::NumericOverflow {
            location: location.into(),
            value,
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error rejects a parameter.
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Check if this error is a numeric blow-up (requires immediate stop).
    #[must_use]
    pub const fn is_numeric_overflow(&self) -> bool {
        matches!(self, Self::NumericOverflow { .. })
    }
}
