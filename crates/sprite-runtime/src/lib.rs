//! # sprite-runtime
//!
//! Hosted backend integrations for the sprite sheet site.
//!
//! ## Providers
//!
//! - **Supabase** (default): GoTrue auth and PostgREST access to the `users`
//!   and `subscriptions` tables
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprite_runtime::supabase::SupabaseClient;
//!
//! let supabase = Arc::new(SupabaseClient::from_env()?);
//! let accounts = AccountService::new(supabase.clone(), supabase.clone(), supabase);
//! ```

#[cfg(feature = "supabase")]
pub mod supabase;

#[cfg(feature = "supabase")]
pub use supabase::{SupabaseClient, SupabaseConfig};

// Re-export core types for convenience
pub use sprite_core::{
    AccountService, AuthProvider, CoreError, Result, SubscriptionStore, UserStore,
};
