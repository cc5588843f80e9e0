//! # sprite-payments
//!
//! Checkout for the sprite sheet site: subscriptions to a pricing tier and
//! one-time credit packs, both sold through Stripe's hosted checkout page.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Site       │────▶│  Stripe Hosted  │────▶│  Site       │
//! │  (pricing)  │     │  Checkout Page  │     │ (dashboard) │
//! └─────────────┘     └─────────────────┘     └─────────────┘
//! ```
//!
//! Subscription lifecycle after checkout (renewals, cancellations, webhooks)
//! stays with Stripe and the hosted backend.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprite_payments::{CheckoutProvider, CheckoutRequest, StripeCheckout};
//! use sprite_core::PurchaseMode;
//!
//! let stripe = StripeCheckout::new("sk_test_xxx");
//!
//! let session = stripe.create_checkout_session(&CheckoutRequest {
//!     price_id: "price_123".into(),
//!     mode: PurchaseMode::Subscription,
//!     customer_email: Some("user@example.com".into()),
//!     user_id: "user-id".into(),
//!     success_url: "https://yoursite.com/dashboard".into(),
//!     cancel_url: "https://yoursite.com/pricing".into(),
//!     metadata: Default::default(),
//! }).await?;
//!
//! // Redirect user to: session.checkout_url
//! ```

mod checkout;
mod error;
mod mock;

pub use checkout::{CheckoutProvider, CheckoutRequest, CheckoutSession, StripeCheckout};
pub use error::{PaymentError, Result};
pub use mock::MockCheckoutProvider;
