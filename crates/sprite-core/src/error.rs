//! Error Types

use thiserror::Error;

use crate::forms::FormErrors;

/// Result type alias for site operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Site error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Form input rejected by its schema
    #[error("Validation failed: {0}")]
    Validation(FormErrors),

    /// Auth provider rejected the request (message comes from the provider)
    #[error("Auth error: {0}")]
    Auth(String),

    /// Auth provider could not be reached
    #[error("Auth provider unavailable: {0}")]
    AuthUnavailable(String),

    /// No signed-in user for an action that needs one
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Data store rejected the request (message comes from the store)
    #[error("Store error: {0}")]
    Store(String),

    /// Price identifier not present in the catalog
    #[error("Unknown price: {0}")]
    UnknownPrice(String),

    /// Price identifier exists but belongs to the other purchase mode
    #[error("Price {price_id} cannot be bought in {mode} mode")]
    ModeMismatch { price_id: String, mode: String },

    /// Pricing table violates its invariants
    #[error("Invalid catalog: {0}")]
    Catalog(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// Message reported by the external provider, when there is one
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::Auth(msg) | Self::Store(msg) => Some(msg.as_str()),
            Self::Validation(errors) => errors.first_message(),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(msg) | Self::Store(msg) => msg.clone(),
            Self::Validation(errors) => errors
                .first_message()
                .unwrap_or("Please check the form and try again.")
                .to_string(),
            Self::AuthUnavailable(_) => {
                "The sign-in service is currently unavailable. Please try again.".into()
            }
            Self::NotAuthenticated => "Please sign in to continue.".into(),
            Self::UnknownPrice(_) | Self::ModeMismatch { .. } => {
                "That plan is not available for purchase.".into()
            }
            _ => "Something went wrong".into(),
        }
    }
}
