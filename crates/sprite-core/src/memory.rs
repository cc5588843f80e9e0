//! In-memory providers (for development and tests)
//!
//! Stand-ins for the hosted auth service and backend tables so the site can
//! run without credentials. Passwords are kept as given; never use these
//! against real users.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::account::{
    AuthProvider, AuthSession, AuthUser, SignUpOutcome, SubscriptionRecord, SubscriptionStore,
    UserProfile, UserStore,
};
use crate::error::{CoreError, Result};

fn poisoned<T>(_: T) -> CoreError {
    CoreError::Store("in-memory store lock poisoned".into())
}

struct Account {
    user: AuthUser,
    password: String,
}

/// In-memory auth provider
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, String>>,
    next_id: AtomicU64,
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn open_session(&self, user: &AuthUser) -> Result<AuthSession> {
        let token = format!("dev-token-{}", self.next());
        self.sessions
            .write()
            .map_err(poisoned)?
            .insert(token.clone(), user.id.clone());

        Ok(AuthSession {
            access_token: token,
            refresh_token: None,
            expires_in: Some(3600),
            user: user.clone(),
        })
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let user = {
            let accounts = self.accounts.read().map_err(poisoned)?;
            match accounts.get(&email.to_lowercase()) {
                Some(account) if account.password == password => account.user.clone(),
                _ => return Err(CoreError::Auth("Invalid login credentials".into())),
            }
        };

        self.open_session(&user)
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<SignUpOutcome> {
        let key = email.to_lowercase();
        let user = {
            let mut accounts = self.accounts.write().map_err(poisoned)?;
            if accounts.contains_key(&key) {
                return Err(CoreError::Auth("User already registered".into()));
            }

            let user = AuthUser {
                id: format!("user-{}", self.next()),
                email: Some(email.to_string()),
                full_name: Some(full_name.to_string()),
            };
            accounts.insert(
                key,
                Account {
                    user: user.clone(),
                    password: password.to_string(),
                },
            );
            user
        };

        let session = self.open_session(&user)?;
        Ok(SignUpOutcome {
            user: Some(user),
            session: Some(session),
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let Some(user_id) = self
            .sessions
            .read()
            .map_err(poisoned)?
            .get(access_token)
            .cloned()
        else {
            return Ok(None);
        };

        let accounts = self.accounts.read().map_err(poisoned)?;
        Ok(accounts
            .values()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.sessions.write().map_err(poisoned)?.remove(access_token);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// In-memory `users` and `subscriptions` tables
#[derive(Default)]
pub struct MemoryDataStore {
    users: RwLock<HashMap<String, UserProfile>>,
    subscriptions: RwLock<Vec<SubscriptionRecord>>,
    insert_failure: RwLock<Option<String>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscription row
    pub fn add_subscription(&self, record: SubscriptionRecord) -> Result<()> {
        self.subscriptions.write().map_err(poisoned)?.push(record);
        Ok(())
    }

    /// Make every following `insert_user` fail with `message`
    pub fn fail_inserts(&self, message: &str) {
        if let Ok(mut failure) = self.insert_failure.write() {
            *failure = Some(message.to_string());
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }
}

#[async_trait]
impl UserStore for MemoryDataStore {
    async fn insert_user(&self, profile: &UserProfile, _access_token: Option<&str>) -> Result<()> {
        if let Some(message) = self.insert_failure.read().map_err(poisoned)?.clone() {
            return Err(CoreError::Store(message));
        }

        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(&profile.id) {
            return Err(CoreError::Store(
                "duplicate key value violates unique constraint \"users_pkey\"".into(),
            ));
        }
        users.insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn get_user(&self, user_id: &str, _access_token: &str) -> Result<Option<UserProfile>> {
        Ok(self.users.read().map_err(poisoned)?.get(user_id).cloned())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryDataStore {
    async fn current_subscription(
        &self,
        user_id: &str,
        _access_token: &str,
    ) -> Result<Option<SubscriptionRecord>> {
        let subscriptions = self.subscriptions.read().map_err(poisoned)?;
        Ok(subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.status.is_current())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SubscriptionStatus;

    fn record(id: &str, status: SubscriptionStatus) -> SubscriptionRecord {
        SubscriptionRecord {
            id: id.into(),
            user_id: "user-1".into(),
            status,
            price_id: Some("price_indie_m".into()),
            product_name: Some("Indie".into()),
            current_period_end: None,
        }
    }

    #[tokio::test]
    async fn test_only_current_subscriptions_are_returned() {
        let store = MemoryDataStore::new();
        store.add_subscription(record("sub_old", SubscriptionStatus::Canceled)).unwrap();
        assert!(store.current_subscription("user-1", "t").await.unwrap().is_none());

        store.add_subscription(record("sub_new", SubscriptionStatus::Trialing)).unwrap();
        let current = store.current_subscription("user-1", "t").await.unwrap().unwrap();
        assert_eq!(current.id, "sub_new");
        assert!(store.current_subscription("user-2", "t").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_signup_is_rejected() {
        let auth = MemoryAuthProvider::new();
        auth.sign_up("ada@example.com", "secret", "Ada").await.unwrap();

        let err = auth.sign_up("ADA@example.com", "secret", "Ada").await.unwrap_err();
        assert_eq!(err.provider_message(), Some("User already registered"));
    }

    #[tokio::test]
    async fn test_sign_in_is_case_insensitive_on_email() {
        let auth = MemoryAuthProvider::new();
        auth.sign_up("Ada@Example.com", "secret", "Ada").await.unwrap();

        let session = auth.sign_in("ada@example.com", "secret").await.unwrap();
        let user = auth.get_user(&session.access_token).await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("Ada@Example.com"));
    }
}
