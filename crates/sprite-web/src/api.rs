//! API Client
//!
//! Calls the sprite server on the page's own origin. The access token lives
//! in `localStorage` and is sent as a bearer token.

use serde::{Deserialize, de::DeserializeOwned};
use sprite_core::{
    AuthSession, AuthUser, CurrentPlan, LoginForm, PricingPageView, PurchaseMode, SignUpOutcome,
    SignupForm, SubscriptionRecord, UserProfile,
};

const TOKEN_KEY: &str = "sprite.access_token";

/// Signed-in user as returned by `GET /api/auth/user`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Account {
    pub user: AuthUser,
    pub profile: Option<UserProfile>,
    pub subscription: Option<SubscriptionRecord>,
    pub plan: CurrentPlan,
}

impl Account {
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .map(|p| p.display_name().to_string())
            .or_else(|| self.user.full_name.clone())
            .or_else(|| self.user.email.clone())
            .unwrap_or_else(|| "there".into())
    }
}

/// A failed call; `message` is the server's `error` field when it sent one
#[derive(Clone, Debug)]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: Option<String>,
}

impl ApiError {
    fn network(e: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: Some(e.to_string()),
        }
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutBody {
    url: String,
}

fn window() -> Option<web_sys::Window> {
    web_sys::window()
}

fn url(path: &str) -> String {
    let origin = window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

fn storage() -> Option<web_sys::Storage> {
    window()?.local_storage().ok()?
}

pub fn access_token() -> Option<String> {
    storage()?
        .get_item(TOKEN_KEY)
        .ok()?
        .filter(|t| !t.is_empty())
}

pub fn set_access_token(token: Option<&str>) {
    let Some(storage) = storage() else {
        leptos::logging::warn!("localStorage unavailable, session will not persist");
        return;
    };
    let written = match token {
        Some(token) => storage.set_item(TOKEN_KEY, token),
        None => storage.remove_item(TOKEN_KEY),
    };
    if let Err(e) = written {
        leptos::logging::warn!("could not update stored session: {e:?}");
    }
}

/// Send the request with the stored token and decode a JSON answer
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let request = match access_token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    };

    let response = request.send().await.map_err(|e| ApiError::network(&e))?;
    let status = response.status();

    if status.is_success() {
        response.json().await.map_err(|e| ApiError::network(&e))
    } else {
        let body: Option<ErrorBody> = response.json().await.ok();
        Err(ApiError {
            status: Some(status.as_u16()),
            message: body.and_then(|b| b.error),
        })
    }
}

pub async fn fetch_pricing() -> Result<PricingPageView, ApiError> {
    send(reqwest::Client::new().get(url("/api/pricing"))).await
}

/// Create a checkout session and return the hosted checkout URL
pub async fn create_checkout(price_id: &str, mode: PurchaseMode) -> Result<String, ApiError> {
    let body = serde_json::json!({ "priceId": price_id, "mode": mode });
    let checkout: CheckoutBody = send(
        reqwest::Client::new()
            .post(url("/api/create-checkout-session"))
            .json(&body),
    )
    .await?;
    Ok(checkout.url)
}

pub async fn login(form: &LoginForm) -> Result<AuthSession, ApiError> {
    let session: AuthSession =
        send(reqwest::Client::new().post(url("/api/auth/login")).json(form)).await?;
    set_access_token(Some(&session.access_token));
    Ok(session)
}

pub async fn signup(form: &SignupForm) -> Result<SignUpOutcome, ApiError> {
    let outcome: SignUpOutcome =
        send(reqwest::Client::new().post(url("/api/auth/signup")).json(form)).await?;
    if let Some(session) = &outcome.session {
        set_access_token(Some(&session.access_token));
    }
    Ok(outcome)
}

pub async fn logout() {
    if let Some(token) = access_token() {
        // The local session ends either way
        let _ = reqwest::Client::new()
            .post(url("/api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await;
    }
    set_access_token(None);
}

/// The signed-in account, `None` when there is no valid session
pub async fn current_account() -> Result<Option<Account>, ApiError> {
    if access_token().is_none() {
        return Ok(None);
    }

    match send(reqwest::Client::new().get(url("/api/auth/user"))).await {
        Ok(account) => Ok(Some(account)),
        Err(e) if e.is_unauthorized() => {
            set_access_token(None);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
