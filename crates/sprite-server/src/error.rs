//! API Errors

use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use serde::Serialize;
use sprite_core::{CoreError, FormErrors};
use sprite_payments::PaymentError;
use thiserror::Error;

/// Error body of every failed API call
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,

    /// Per-field messages for rejected forms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FormErrors>,
}

/// What a handler returns on failure
pub type ApiFailure = (StatusCode, Json<ErrorResponse>);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Provider rejected a signup (message comes from the provider)
    #[error("Signup rejected: {0}")]
    SignupRejected(String),

    #[error("Payments not configured")]
    PaymentsDisabled,

    /// Body missing, not JSON, or missing fields
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) => match e {
                CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::Auth(_) | CoreError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                CoreError::AuthUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::UnknownPrice(_) | CoreError::ModeMismatch { .. } => {
                    StatusCode::BAD_REQUEST
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Payment(PaymentError::InvalidRequest(_))
            | Self::SignupRejected(_)
            | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::PaymentsDisabled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Core(e) => match e {
                CoreError::Validation(_) => "VALIDATION_ERROR",
                CoreError::Auth(_) => "AUTH_ERROR",
                CoreError::AuthUnavailable(_) => "AUTH_UNAVAILABLE",
                CoreError::NotAuthenticated => "NOT_AUTHENTICATED",
                CoreError::UnknownPrice(_) => "UNKNOWN_PRICE",
                CoreError::ModeMismatch { .. } => "MODE_MISMATCH",
                CoreError::Store(_) => "STORE_ERROR",
                _ => "INTERNAL_ERROR",
            },
            Self::Payment(_) => "CHECKOUT_ERROR",
            Self::SignupRejected(_) => "SIGNUP_ERROR",
            Self::PaymentsDisabled => "PAYMENTS_DISABLED",
            Self::InvalidBody(_) => "INVALID_REQUEST",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Core(e) => e.user_message(),
            Self::Payment(e) => e.user_message().into(),
            Self::SignupRejected(msg) => msg.clone(),
            Self::PaymentsDisabled => "Payments are not available right now.".into(),
            Self::InvalidBody(detail) => detail.clone(),
        }
    }
}

impl From<ApiError> for ApiFailure {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        } else {
            tracing::debug!(error = %err, "Request rejected");
        }

        let fields = match &err {
            ApiError::Core(CoreError::Validation(errors)) => Some(errors.clone()),
            _ => None,
        };

        (
            status,
            Json(ErrorResponse {
                error: err.message(),
                code: err.code().into(),
                fields,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unknown = ApiError::from(CoreError::UnknownPrice("price_x".into()));
        assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown.code(), "UNKNOWN_PRICE");

        let denied = ApiError::from(CoreError::Auth("Invalid login credentials".into()));
        let (status, Json(body)) = ApiFailure::from(denied);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body.error, "Invalid login credentials");

        assert_eq!(
            ApiError::PaymentsDisabled.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(PaymentError::Stripe("card_declined".into())).status(),
            StatusCode::BAD_GATEWAY
        );

        let (status, Json(body)) = ApiFailure::from(ApiError::InvalidBody(
            "missing field `priceId`".into(),
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_REQUEST");
        assert_eq!(body.error, "missing field `priceId`");
    }
}
