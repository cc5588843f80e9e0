//! Mock Checkout Provider
//!
//! For tests and local runs without Stripe keys. Records every request and
//! hands back a fake hosted-checkout URL.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::checkout::{CheckoutProvider, CheckoutRequest, CheckoutSession};
use crate::error::{PaymentError, Result};

/// Mock checkout provider
pub struct MockCheckoutProvider {
    base_url: String,
    requests: Mutex<Vec<CheckoutRequest>>,
    failure: Option<String>,
    counter: AtomicU64,
}

impl Default for MockCheckoutProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCheckoutProvider {
    pub fn new() -> Self {
        Self {
            base_url: "https://checkout.example.test/pay".into(),
            requests: Mutex::new(Vec::new()),
            failure: None,
            counter: AtomicU64::new(1),
        }
    }

    /// A provider whose every call fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Requests received so far
    pub async fn requests(&self) -> Vec<CheckoutRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutProvider for MockCheckoutProvider {
    async fn create_checkout_session(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        self.requests.lock().await.push(request.clone());

        if let Some(message) = &self.failure {
            return Err(PaymentError::Stripe(message.clone()));
        }

        let id = format!("cs_test_{}", self.counter.fetch_add(1, Ordering::Relaxed));
        Ok(CheckoutSession {
            checkout_url: format!("{}/{}", self.base_url, id),
            id,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_core::PurchaseMode;

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            price_id: "price_pack_1000".into(),
            mode: PurchaseMode::Payment,
            customer_email: Some("ada@example.com".into()),
            user_id: "user-1".into(),
            success_url: "http://localhost:3000/dashboard".into(),
            cancel_url: "http://localhost:3000/pricing".into(),
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let provider = MockCheckoutProvider::new();
        let session = provider.create_checkout_session(&request()).await.unwrap();

        assert!(session.checkout_url.ends_with(&session.id));
        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].mode, PurchaseMode::Payment);
    }

    #[tokio::test]
    async fn test_failing_mock() {
        let provider = MockCheckoutProvider::failing("card_declined");
        let err = provider.create_checkout_session(&request()).await.unwrap_err();
        assert!(matches!(err, PaymentError::Stripe(_)));
        assert_eq!(provider.requests().await.len(), 1);
    }
}
