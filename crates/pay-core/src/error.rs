//! # Payment Error Types
//!
//! Typed error handling for the item-checkout payment flow.
//! All fallible operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider or endpoint
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Session-creation endpoint answered with a non-2xx status
    #[error("Endpoint returned HTTP {status}: {message}")]
    EndpointStatus { status: u16, message: String },

    /// A checkout session is already being created for this page
    #[error("A checkout session is already being created")]
    CheckoutInFlight,

    /// Redirect to the hosted checkout page failed
    #[error("Redirect failed: {0}")]
    RedirectFailed(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Returns true if this error is transient on the provider side.
    ///
    /// Nothing in the checkout flow retries automatically; this only
    /// informs logging and the message shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::NetworkError(_) | PaymentError::ProviderError { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::ProviderError { .. } => 502,
            PaymentError::NetworkError(_) => 503,
            PaymentError::EndpointStatus { status, .. } => *status,
            PaymentError::CheckoutInFlight => 409,
            PaymentError::RedirectFailed(_) => 502,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
