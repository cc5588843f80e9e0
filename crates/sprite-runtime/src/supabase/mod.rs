//! Supabase Provider
//!
//! One HTTP client for both halves of the hosted backend: GoTrue (`/auth/v1`)
//! implements [`AuthProvider`](sprite_core::AuthProvider), PostgREST
//! (`/rest/v1`) implements [`UserStore`](sprite_core::UserStore) and
//! [`SubscriptionStore`](sprite_core::SubscriptionStore).

mod auth;
mod rest;

use std::time::Duration;

use serde::Deserialize;
use sprite_core::{CoreError, Result};

/// Supabase configuration
#[derive(Clone, Debug)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,

    /// Public anon key, sent as `apikey` on every request
    pub anon_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout_secs: 15,
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CoreError::Config(format!("{key} not set")))
        };

        let mut config = Self::new(get("SUPABASE_URL")?, get("SUPABASE_ANON_KEY")?);
        if let Some(secs) = lookup("SUPABASE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

/// Supabase auth + data client
pub struct SupabaseClient {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub const fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url, table)
    }

    /// Request carrying the anon key and the caller's token (anon key when
    /// there is no session, which makes the request run as `anon`)
    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        access_token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let bearer = access_token.unwrap_or(&self.config.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }
}

/// Error bodies of GoTrue and PostgREST; which field is set depends on the
/// endpoint and server version
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Most specific human-readable message in an error response body
fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .filter(|m| !m.trim().is_empty())
}

/// Turn a non-success response into the message to surface
async fn failure_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_message(&body).unwrap_or_else(|| format!("Request failed with status {status}"))
}
