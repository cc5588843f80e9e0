//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
};
use serde::{Deserialize, Serialize};

use sprite_core::{
    AuthSession, AuthUser, CoreError, CurrentAccount, CurrentPlan, LoginForm, PricingPageView,
    PurchaseMode, SignUpOutcome, SignupForm, SubscriptionRecord,
};
use sprite_payments::CheckoutRequest;

use crate::error::{ApiError, ApiFailure};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub auth_backend: String,
    pub payments_configured: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub price_id: String,
    #[serde(default)]
    pub mode: Option<PurchaseMode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    #[serde(flatten)]
    pub account: CurrentAccount,
    pub subscription: Option<SubscriptionRecord>,
    pub plan: CurrentPlan,
}

// ============================================================================
// Helpers
// ============================================================================

/// Access token from `Authorization: Bearer <token>`
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Signed-in user and their token, or 401
async fn require_user<'a>(
    state: &AppState,
    headers: &'a HeaderMap,
) -> Result<(AuthUser, &'a str), ApiError> {
    let token = bearer_token(headers).ok_or(CoreError::NotAuthenticated)?;
    let user = state
        .accounts
        .current_user(Some(token))
        .await?
        .ok_or(CoreError::NotAuthenticated)?;
    Ok((user, token))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        auth_backend: state.accounts.auth_backend().to_string(),
        payments_configured: state.checkout.is_some(),
    })
}

/// Pricing page data for the visitor
pub async fn pricing(State(state): State<AppState>, headers: HeaderMap) -> Json<PricingPageView> {
    let user = match state.accounts.current_user(bearer_token(&headers)).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Could not resolve visitor, showing public pricing");
            None
        }
    };

    let view = match (user, bearer_token(&headers)) {
        (Some(user), Some(token)) => {
            let subscription = state.accounts.current_subscription(&user, token).await;
            PricingPageView::build(
                &state.catalog,
                true,
                subscription.as_ref().map(|s| s.price_id.as_deref()),
            )
        }
        _ => PricingPageView::build(&state.catalog, false, None),
    };

    Json(view)
}

/// Create a hosted checkout session for a tier price or a credit pack
pub async fn create_checkout_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CheckoutBody>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiFailure> {
    let (user, _) = require_user(&state, &headers).await?;
    let Json(body) = body.map_err(ApiError::from)?;

    let mode = body.mode.unwrap_or_default();
    let purchase = state
        .catalog
        .purchase_for(&body.price_id, mode)
        .map_err(ApiError::from)?;

    let checkout = state.checkout.as_ref().ok_or(ApiError::PaymentsDisabled)?;

    let request = CheckoutRequest {
        price_id: body.price_id.clone(),
        mode,
        customer_email: user.email.clone(),
        user_id: user.id.clone(),
        success_url: state.config.checkout_success_url(),
        cancel_url: state.config.checkout_cancel_url(),
        metadata: HashMap::from([("purchase".to_string(), purchase.label())]),
    };

    let session = checkout
        .create_checkout_session(&request)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(
        user_id = %user.id,
        price_id = %body.price_id,
        mode = mode.as_str(),
        session_id = %session.id,
        "Checkout session created"
    );

    Ok(Json(CheckoutResponse {
        url: session.checkout_url,
        session_id: session.id,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    form: Result<Json<LoginForm>, JsonRejection>,
) -> Result<Json<AuthSession>, ApiFailure> {
    let Json(form) = form.map_err(ApiError::from)?;
    let session = state.accounts.login(&form).await.map_err(ApiError::from)?;
    Ok(Json(session))
}

pub async fn signup(
    State(state): State<AppState>,
    form: Result<Json<SignupForm>, JsonRejection>,
) -> Result<Json<SignUpOutcome>, ApiFailure> {
    let Json(form) = form.map_err(ApiError::from)?;
    let outcome = state.accounts.signup(&form).await.map_err(|e| match e {
        CoreError::Auth(message) => ApiError::SignupRejected(message),
        other => ApiError::from(other),
    })?;
    Ok(Json(outcome))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiFailure> {
    let token = bearer_token(&headers).ok_or(ApiError::from(CoreError::NotAuthenticated))?;
    state.accounts.logout(token).await.map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Signed-in user, their `users` row and current plan
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountResponse>, ApiFailure> {
    let token = bearer_token(&headers).ok_or(ApiError::from(CoreError::NotAuthenticated))?;
    let account = state
        .accounts
        .current_account(token)
        .await
        .map_err(ApiError::from)?
        .ok_or(ApiError::from(CoreError::NotAuthenticated))?;

    let subscription = state
        .accounts
        .current_subscription(&account.user, token)
        .await;
    let plan = subscription
        .as_ref()
        .map(|s| CurrentPlan::resolve(&state.catalog, s.price_id.as_deref()))
        .unwrap_or_default();

    Ok(Json(AccountResponse {
        account,
        subscription,
        plan,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
