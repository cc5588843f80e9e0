//! # sprite-core
//!
//! Domain layer of the AI Sprite Sheet Generator site: the pricing catalog and
//! its price-id resolver, the pricing page view logic, form schemas, and the
//! provider traits the site talks to its hosted auth and data backends through.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       AccountService                          │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │  │ Form schemas │──▶│ AuthProvider │──▶│ UserStore        │   │
//! │  │  (validate)  │   │  (Strategy)  │   │ SubscriptionStore│   │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────┐     ┌──────────────────────────────┐
//! │   PricingCatalog     │────▶│ PricingPageView / actions    │
//! │ tiers, packs, index  │     │ (what each card should show) │
//! └──────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! Hosted implementations of the provider traits live in `sprite-runtime`;
//! the in-memory ones in [`memory`] serve development and tests.

pub mod account;
pub mod error;
pub mod forms;
pub mod memory;
pub mod notice;
pub mod pricing;
pub mod view;

pub use account::{
    AccountService, AuthProvider, AuthSession, AuthUser, CurrentAccount, SignUpOutcome,
    SubscriptionRecord, SubscriptionStatus, SubscriptionStore, UserProfile, UserStore,
};
pub use error::{CoreError, Result};
pub use forms::{FormErrors, LoginForm, SignupForm};
pub use memory::{MemoryAuthProvider, MemoryDataStore};
pub use notice::{Notice, NoticeKind};
pub use pricing::{
    BillingInterval, CreditPack, PriceIds, PriceLookup, PricingCatalog, PricingTier, Purchase,
    PurchaseMode, TierId,
};
pub use view::{
    CreditPackAction, CurrentPlan, PricingPageView, SessionState, TierAction, format_price,
    tier_price_label,
};
