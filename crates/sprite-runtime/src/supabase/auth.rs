//! GoTrue auth endpoints

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use sprite_core::{AuthProvider, AuthSession, AuthUser, CoreError, Result, SignUpOutcome};

use super::{SupabaseClient, failure_message};

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<GoTrueUser> for AuthUser {
    fn from(user: GoTrueUser) -> Self {
        Self {
            id: user.id,
            email: user.email.filter(|e| !e.is_empty()),
            full_name: user.user_metadata.and_then(|m| m.full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoTrueSession {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    user: GoTrueUser,
}

impl From<GoTrueSession> for AuthSession {
    fn from(session: GoTrueSession) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            user: session.user.into(),
        }
    }
}

/// `/signup` answers with a session when confirmation is off, and with the
/// bare user when a confirmation email was sent
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(GoTrueSession),
    User(GoTrueUser),
}

impl From<SignUpResponse> for SignUpOutcome {
    fn from(response: SignUpResponse) -> Self {
        match response {
            SignUpResponse::Session(session) => {
                let session = AuthSession::from(session);
                Self {
                    user: Some(session.user.clone()),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => Self {
                user: Some(user.into()),
                session: None,
            },
        }
    }
}

fn unavailable(e: &reqwest::Error) -> CoreError {
    CoreError::AuthUnavailable(e.to_string())
}

async fn rejected(response: reqwest::Response) -> CoreError {
    let server_error = response.status().is_server_error();
    let message = failure_message(response).await;
    if server_error {
        CoreError::AuthUnavailable(message)
    } else {
        CoreError::Auth(message)
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .request(Method::POST, self.auth_url("token?grant_type=password"), None)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let session: GoTrueSession = response.json().await.map_err(|e| unavailable(&e))?;
        Ok(session.into())
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome> {
        let response = self
            .request(Method::POST, self.auth_url("signup"), None)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        if !response.status().is_success() {
            return Err(rejected(response).await);
        }

        let body: SignUpResponse = response.json().await.map_err(|e| unavailable(&e))?;
        Ok(body.into())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let response = self
            .request(Method::GET, self.auth_url("user"), Some(access_token))
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: GoTrueUser = response.json().await.map_err(|e| unavailable(&e))?;
                Ok(Some(user.into()))
            }
            _ => Err(rejected(response).await),
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .request(Method::POST, self.auth_url("logout"), Some(access_token))
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        // An expired session is already signed out
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(()),
            _ => Err(rejected(response).await),
        }
    }

    fn name(&self) -> &str {
        "supabase"
    }
}
