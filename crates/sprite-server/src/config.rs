//! Server Configuration

use std::path::PathBuf;

/// Listener and URL settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// `BIND_ADDR`
    pub bind_addr: String,

    /// `SITE_URL`, base of the checkout return URLs
    pub site_url: String,

    /// `STATIC_DIR`, the compiled front-end
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            bind_addr: get("BIND_ADDR", "0.0.0.0:3000"),
            site_url: get("SITE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            static_dir: PathBuf::from(get("STATIC_DIR", "static")),
        }
    }

    /// Where Stripe sends the browser after a completed checkout
    pub fn checkout_success_url(&self) -> String {
        format!("{}/dashboard?checkout=success", self.site_url)
    }

    /// Where Stripe sends the browser when checkout is abandoned
    pub fn checkout_cancel_url(&self) -> String {
        format!("{}/pricing?checkout=canceled", self.site_url)
    }
}
