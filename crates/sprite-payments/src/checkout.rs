//! Stripe Checkout Integration
//!
//! Hosted checkout: the site creates a session for a configured price and
//! redirects the browser to the URL Stripe returns.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems,
};

use sprite_core::PurchaseMode;

use crate::error::{PaymentError, Result};

/// Request to create a checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Stripe price to buy
    pub price_id: String,

    /// Subscription for tiers, payment for credit packs
    pub mode: PurchaseMode,

    /// Prefills the checkout form
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Site user id, echoed back by Stripe as the client reference
    pub user_id: String,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if checkout is cancelled
    pub cancel_url: String,

    /// Extra metadata stored on the session
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Result of creating a checkout session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Stripe session ID
    pub id: String,

    /// URL to redirect user to
    pub checkout_url: String,
}

/// Payment processor capable of hosted checkout (Strategy pattern)
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;

    /// Provider name
    fn name(&self) -> &str;
}

const fn stripe_mode(mode: PurchaseMode) -> CheckoutSessionMode {
    match mode {
        PurchaseMode::Subscription => CheckoutSessionMode::Subscription,
        PurchaseMode::Payment => CheckoutSessionMode::Payment,
    }
}

/// Stripe client wrapper
pub struct StripeCheckout {
    client: Client,
}

impl StripeCheckout {
    /// Create a new Stripe client
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from `STRIPE_SECRET_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret_key = lookup("STRIPE_SECRET_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;

        if !secret_key.starts_with("sk_") && !secret_key.starts_with("rk_") {
            return Err(PaymentError::Config(
                "STRIPE_SECRET_KEY is not a secret or restricted key".into(),
            ));
        }

        Ok(Self::new(&secret_key))
    }

    /// Get the underlying Stripe client
    pub const fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl CheckoutProvider for StripeCheckout {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        if request.price_id.is_empty() {
            return Err(PaymentError::InvalidRequest("price id is empty".into()));
        }

        let mut metadata = request.metadata.clone();
        metadata.insert("user_id".to_string(), request.user_id.clone());
        metadata.insert("price_id".to_string(), request.price_id.clone());

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(stripe_mode(request.mode));
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.client_reference_id = Some(&request.user_id);
        params.customer_email = request.customer_email.as_deref();
        params.allow_promotion_codes = Some(true);
        params.metadata = Some(metadata);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            price: Some(request.price_id.clone()),
            quantity: Some(1),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| PaymentError::Stripe(e.to_string()))?;

        let checkout_url = session
            .url
            .ok_or_else(|| PaymentError::Stripe("No checkout URL returned".into()))?;

        tracing::info!(
            session_id = %session.id,
            price_id = %request.price_id,
            mode = request.mode.as_str(),
            user_id = %request.user_id,
            "Created checkout session"
        );

        Ok(CheckoutSession {
            id: session.id.to_string(),
            checkout_url,
        })
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_mapping() {
        assert_eq!(
            stripe_mode(PurchaseMode::Subscription),
            CheckoutSessionMode::Subscription
        );
        assert_eq!(stripe_mode(PurchaseMode::Payment), CheckoutSessionMode::Payment);
    }

    #[test]
    fn test_from_lookup_requires_secret_key() {
        assert!(matches!(
            StripeCheckout::from_lookup(|_| None),
            Err(PaymentError::Config(_))
        ));
        assert!(StripeCheckout::from_lookup(|_| Some("pk_test_publishable".into())).is_err());
        assert!(StripeCheckout::from_lookup(|_| Some("sk_test_123".into())).is_ok());
    }
}
