//! Sprite sheet site HTTP server
//!
//! Axum server for the pricing data, auth endpoints and Stripe checkout,
//! plus the compiled Leptos front-end as static files.

mod app;
mod config;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sprite_core::{AccountService, MemoryAuthProvider, MemoryDataStore, PricingCatalog};
use sprite_payments::{CheckoutProvider, StripeCheckout};
use sprite_runtime::SupabaseClient;

use crate::config::ServerConfig;
use crate::state::AppState;

fn account_service() -> AccountService {
    match SupabaseClient::from_env() {
        Ok(client) => {
            tracing::info!("✓ Supabase configured at {}", client.config().url);
            let client = Arc::new(client);
            AccountService::new(client.clone(), client.clone(), client)
        }
        Err(e) => {
            tracing::warn!("⚠ Supabase not configured ({e}) - using in-memory accounts");
            tracing::warn!("  Set SUPABASE_URL and SUPABASE_ANON_KEY in .env");
            let store = Arc::new(MemoryDataStore::new());
            AccountService::new(Arc::new(MemoryAuthProvider::new()), store.clone(), store)
        }
    }
}

fn checkout_provider() -> Option<Arc<dyn CheckoutProvider>> {
    match StripeCheckout::from_env() {
        Ok(stripe) => {
            tracing::info!("✓ Stripe configured");
            Some(Arc::new(stripe))
        }
        Err(e) => {
            tracing::warn!("⚠ Stripe not configured ({e}) - payments disabled");
            tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();

    // Pricing table
    let catalog = PricingCatalog::from_env()?;
    tracing::info!(
        "Loaded {} tiers and {} credit packs",
        catalog.tiers().len(),
        catalog.credit_packs().len()
    );
    for slot in catalog.missing_price_ids() {
        tracing::warn!("  No Stripe price for {slot}");
    }

    let state = AppState {
        catalog: Arc::new(catalog),
        accounts: account_service(),
        checkout: checkout_provider(),
        config: Arc::new(config.clone()),
    };

    let app = app::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 sprite server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                      - Health check");
    tracing::info!("  GET  /api/pricing                 - Pricing page data");
    tracing::info!("  POST /api/create-checkout-session - Create Stripe checkout");
    tracing::info!("  POST /api/auth/login              - Sign in");
    tracing::info!("  POST /api/auth/signup             - Create account");
    tracing::info!("  POST /api/auth/logout             - Sign out");
    tracing::info!("  GET  /api/auth/user               - Current user");
    tracing::info!("  Static files from {}", config.static_dir.display());
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
