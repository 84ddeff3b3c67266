//! # Payment Error Types
//!
//! Typed error handling for the gcash-cart checkout engine.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data (empty cart, zero quantity, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment creation failed or the gateway returned incomplete data
    #[error("Gateway error [{provider}]: {message}")]
    Gateway { provider: String, message: String },

    /// A single request to the gateway failed (network, non-2xx status)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No confirmation within the polling budget
    #[error("Payment not confirmed after {waited_secs} seconds")]
    Timeout { waited_secs: u64 },

    /// The buyer stopped the confirmation loop
    #[error("Payment confirmation cancelled by user")]
    UserCancelled,

    /// A newer confirmation session replaced this one
    #[error("Payment confirmation superseded by a newer session")]
    Superseded,

    /// The return URL carried an unusable resumption token
    #[error("Invalid resumption token: {0}")]
    InvalidResumeToken(String),

    /// Cart snapshot could not be saved or loaded
    #[error("Cart store error: {0}")]
    CartStore(String),
}

impl PaymentError {
    /// Returns true if this error is transient for the confirmation loop
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Transport(_) | PaymentError::Serialization(_)
        )
    }

    /// Shorthand for a gateway error from a named provider
    pub fn gateway(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::Gateway {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
