//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Stripe API error
    #[error("Stripe error: {0}")]
    Stripe(String),

    /// Request rejected before reaching Stripe
    #[error("Invalid checkout request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PaymentError {
    /// Get user-friendly message
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Stripe(_) => "Failed to create checkout session",
            Self::InvalidRequest(_) => "That plan is not available for purchase.",
            Self::Config(_) => "Payments are not available right now.",
        }
    }
}
