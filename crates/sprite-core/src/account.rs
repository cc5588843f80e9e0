//! Accounts
//!
//! Provider traits for the hosted auth service and the backend tables, and
//! the [`AccountService`] that runs the login / signup / logout flows on top
//! of them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::forms::{LoginForm, SignupForm};

/// Identity as reported by the auth provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// A signed-in session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Result of a sign-up.
///
/// `session` is `None` when the provider requires email confirmation first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpOutcome {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

/// Row of the `users` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Name to greet the user with
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }

    /// Up to two initials for the avatar fallback
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Stripe subscription status, as mirrored into the `subscriptions` table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Unpaid,
    Paused,
}

impl SubscriptionStatus {
    /// Statuses that count as the user's current plan
    pub const CURRENT: [Self; 2] = [Self::Trialing, Self::Active];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trialing => "trialing",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::PastDue => "past_due",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
        }
    }

    pub const fn is_current(self) -> bool {
        matches!(self, Self::Trialing | Self::Active)
    }
}

/// Row of the `subscriptions` table joined with its price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: String,
    pub user_id: String,
    pub status: SubscriptionStatus,
    /// Stripe price id of the subscribed price, when the join found one
    pub price_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

/// Hosted authentication service (Strategy pattern)
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Email/password sign-in
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Create an account; `full_name` is stored as user metadata
    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome>;

    /// User owning `access_token`, or `None` if the token is not valid
    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>>;

    /// Revoke the session owning `access_token`
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Provider name
    fn name(&self) -> &str;
}

/// Access to the `users` table
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a row; `access_token` is the caller's session, if any
    async fn insert_user(&self, profile: &UserProfile, access_token: Option<&str>) -> Result<()>;

    async fn get_user(&self, user_id: &str, access_token: &str) -> Result<Option<UserProfile>>;
}

/// Access to the `subscriptions` table
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// The user's trialing or active subscription, if any
    async fn current_subscription(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Option<SubscriptionRecord>>;
}

/// Signed-in user with the `users` row, when one exists
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub user: AuthUser,
    pub profile: Option<UserProfile>,
}

/// Login, signup and logout flows
#[derive(Clone)]
pub struct AccountService {
    auth: Arc<dyn AuthProvider>,
    users: Arc<dyn UserStore>,
    subscriptions: Arc<dyn SubscriptionStore>,
}

impl AccountService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        users: Arc<dyn UserStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
    ) -> Self {
        Self {
            auth,
            users,
            subscriptions,
        }
    }

    pub fn auth_backend(&self) -> &str {
        self.auth.name()
    }

    /// Validate and sign in
    pub async fn login(&self, form: &LoginForm) -> Result<AuthSession> {
        form.validate().map_err(CoreError::Validation)?;

        let session = self.auth.sign_in(&form.email, &form.password).await?;
        tracing::info!(user_id = %session.user.id, "User signed in");
        Ok(session)
    }

    /// Validate, create the account, then its `users` row
    pub async fn signup(&self, form: &SignupForm) -> Result<SignUpOutcome> {
        form.validate().map_err(CoreError::Validation)?;

        let outcome = self
            .auth
            .sign_up(&form.email, &form.password, &form.full_name)
            .await?;

        if let Some(user) = &outcome.user {
            let profile = UserProfile {
                id: user.id.clone(),
                email: form.email.clone(),
                full_name: Some(form.full_name.clone()),
                avatar_url: None,
            };
            let token = outcome.session.as_ref().map(|s| s.access_token.as_str());

            self.users.insert_user(&profile, token).await.inspect_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to create user row");
            })?;

            tracing::info!(
                user_id = %user.id,
                confirmed = outcome.session.is_some(),
                "Account created"
            );
        }

        Ok(outcome)
    }

    pub async fn logout(&self, access_token: &str) -> Result<()> {
        self.auth.sign_out(access_token).await
    }

    /// Resolve a bearer token to its user; `None` when signed out
    pub async fn current_user(&self, access_token: Option<&str>) -> Result<Option<AuthUser>> {
        match access_token.filter(|t| !t.is_empty()) {
            Some(token) => self.auth.get_user(token).await,
            None => Ok(None),
        }
    }

    /// User plus `users` row
    pub async fn current_account(&self, access_token: &str) -> Result<Option<CurrentAccount>> {
        let Some(user) = self.auth.get_user(access_token).await? else {
            return Ok(None);
        };

        let profile = match self.users.get_user(&user.id, access_token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load user row");
                None
            }
        };

        Ok(Some(CurrentAccount { user, profile }))
    }

    /// The user's current subscription; lookup failures count as none
    pub async fn current_subscription(
        &self,
        user: &AuthUser,
        access_token: &str,
    ) -> Option<SubscriptionRecord> {
        match self
            .subscriptions
            .current_subscription(&user.id, access_token)
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to load subscription");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryAuthProvider, MemoryDataStore};

    fn service() -> (AccountService, Arc<MemoryDataStore>) {
        let store = Arc::new(MemoryDataStore::new());
        let service = AccountService::new(
            Arc::new(MemoryAuthProvider::new()),
            store.clone(),
            store.clone(),
        );
        (service, store)
    }

    fn signup_form() -> SignupForm {
        SignupForm {
            email: "ada@example.com".into(),
            password: "correct-horse".into(),
            full_name: "Ada Lovelace".into(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_user_row() {
        let (service, store) = service();

        let outcome = service.signup(&signup_form()).await.unwrap();
        let session = outcome.session.unwrap();

        let account = service.current_account(&session.access_token).await.unwrap().unwrap();
        let profile = account.profile.unwrap();
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.full_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_signup_rejects_invalid_form() {
        let (service, store) = service();
        let mut form = signup_form();
        form.email = "not-an-email".into();

        let err = service.signup(&form).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn test_signup_surfaces_store_failure() {
        let (service, store) = service();
        store.fail_inserts("new row violates row-level security policy");

        let err = service.signup(&signup_form()).await.unwrap_err();
        assert_eq!(
            err.provider_message(),
            Some("new row violates row-level security policy")
        );
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (service, _) = service();
        service.signup(&signup_form()).await.unwrap();

        let bad = LoginForm {
            email: "ada@example.com".into(),
            password: "wrong-password".into(),
        };
        let err = service.login(&bad).await.unwrap_err();
        assert_eq!(err.provider_message(), Some("Invalid login credentials"));

        let good = LoginForm {
            email: "ada@example.com".into(),
            password: "correct-horse".into(),
        };
        let session = service.login(&good).await.unwrap();
        assert!(
            service
                .current_user(Some(&session.access_token))
                .await
                .unwrap()
                .is_some()
        );

        service.logout(&session.access_token).await.unwrap();
        assert!(
            service
                .current_user(Some(&session.access_token))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_current_user_without_token() {
        let (service, _) = service();
        assert!(service.current_user(None).await.unwrap().is_none());
        assert!(service.current_user(Some("")).await.unwrap().is_none());
    }

    #[test]
    fn test_profile_display() {
        let profile = UserProfile {
            id: "u1".into(),
            email: "ada@example.com".into(),
            full_name: Some("ada lovelace".into()),
            avatar_url: None,
        };
        assert_eq!(profile.display_name(), "ada lovelace");
        assert_eq!(profile.initials(), "AL");

        let anonymous = UserProfile {
            full_name: None,
            ..profile
        };
        assert_eq!(anonymous.display_name(), "ada@example.com");
    }

    #[test]
    fn test_subscription_status() {
        assert!(SubscriptionStatus::Trialing.is_current());
        assert!(!SubscriptionStatus::PastDue.is_current());
        let status: SubscriptionStatus = serde_json::from_str("\"incomplete_expired\"").unwrap();
        assert_eq!(status, SubscriptionStatus::IncompleteExpired);
    }
}
