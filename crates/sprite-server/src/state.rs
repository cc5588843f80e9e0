//! Application State

use std::sync::Arc;

use sprite_core::{AccountService, PricingCatalog};
use sprite_payments::CheckoutProvider;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Tiers, credit packs and the price id index
    pub catalog: Arc<PricingCatalog>,

    /// Auth provider plus the backend tables
    pub accounts: AccountService,

    /// Checkout provider (optional - None if not configured)
    pub checkout: Option<Arc<dyn CheckoutProvider>>,

    pub config: Arc<ServerConfig>,
}
