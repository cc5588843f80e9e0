//! PostgREST access to the `users` and `subscriptions` tables

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use sprite_core::{
    CoreError, Result, SubscriptionRecord, SubscriptionStatus, SubscriptionStore, UserProfile,
    UserStore,
};

use super::{SupabaseClient, failure_message};

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    id: String,
    #[serde(default)]
    products: Option<ProductRow>,
}

/// `subscriptions` row with its embedded `prices(id, products(*))`
#[derive(Debug, Deserialize)]
struct SubscriptionRow {
    id: String,
    user_id: String,
    status: SubscriptionStatus,
    #[serde(default)]
    price_id: Option<String>,
    #[serde(default)]
    current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    prices: Option<PriceRow>,
}

impl From<SubscriptionRow> for SubscriptionRecord {
    fn from(row: SubscriptionRow) -> Self {
        let (joined_price, product_name) = match row.prices {
            Some(price) => (Some(price.id), price.products.and_then(|p| p.name)),
            None => (None, None),
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            status: row.status,
            price_id: joined_price.or(row.price_id),
            product_name,
            current_period_end: row.current_period_end,
        }
    }
}

fn store_error(e: &reqwest::Error) -> CoreError {
    CoreError::Store(e.to_string())
}

fn current_status_filter() -> String {
    let statuses: Vec<&str> = SubscriptionStatus::CURRENT
        .iter()
        .map(|s| s.as_str())
        .collect();
    format!("in.({})", statuses.join(","))
}

#[async_trait]
impl UserStore for SupabaseClient {
    async fn insert_user(&self, profile: &UserProfile, access_token: Option<&str>) -> Result<()> {
        let response = self
            .request(Method::POST, self.rest_url("users"), access_token)
            .header("Prefer", "return=minimal")
            .json(&[profile])
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        if !response.status().is_success() {
            return Err(CoreError::Store(failure_message(response).await));
        }

        tracing::debug!(user_id = %profile.id, "Inserted users row");
        Ok(())
    }

    async fn get_user(&self, user_id: &str, access_token: &str) -> Result<Option<UserProfile>> {
        let id = format!("eq.{user_id}");
        let response = self
            .request(Method::GET, self.rest_url("users"), Some(access_token))
            .query(&[("select", "*"), ("id", id.as_str())])
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        if !response.status().is_success() {
            return Err(CoreError::Store(failure_message(response).await));
        }

        let rows: Vec<UserProfile> = response.json().await.map_err(|e| store_error(&e))?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl SubscriptionStore for SupabaseClient {
    async fn current_subscription(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Option<SubscriptionRecord>> {
        let user = format!("eq.{user_id}");
        let status = current_status_filter();
        let response = self
            .request(Method::GET, self.rest_url("subscriptions"), Some(access_token))
            .query(&[
                ("select", "*,prices(id,products(*))"),
                ("user_id", user.as_str()),
                ("status", status.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| store_error(&e))?;

        if !response.status().is_success() {
            return Err(CoreError::Store(failure_message(response).await));
        }

        let rows: Vec<SubscriptionRow> = response.json().await.map_err(|e| store_error(&e))?;
        Ok(rows.into_iter().next().map(SubscriptionRecord::from))
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::supabase::SupabaseConfig;

    fn client(server: &mockito::ServerGuard) -> SupabaseClient {
        SupabaseClient::new(SupabaseConfig::new(server.url(), "anon-key")).unwrap()
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "4d3c".into(),
            email: "ada@example.com".into(),
            full_name: Some("Ada Lovelace".into()),
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/users")
            .match_header("prefer", "return=minimal")
            .match_header("authorization", "Bearer jwt-abc")
            .match_body(Matcher::Json(json!([{
                "id": "4d3c",
                "email": "ada@example.com",
                "full_name": "Ada Lovelace"
            }])))
            .with_status(201)
            .create_async()
            .await;

        client(&server)
            .insert_user(&profile(), Some("jwt-abc"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_insert_user_without_session_uses_anon_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/users")
            .match_header("authorization", "Bearer anon-key")
            .with_status(403)
            .with_body(
                r#"{"code":"42501","message":"new row violates row-level security policy for table \"users\""}"#,
            )
            .create_async()
            .await;

        let err = client(&server)
            .insert_user(&profile(), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.provider_message(),
            Some("new row violates row-level security policy for table \"users\"")
        );
    }

    #[tokio::test]
    async fn test_get_user_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/users")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.4d3c".into()))
            .with_status(200)
            .with_body(r#"[{"id":"4d3c","email":"ada@example.com","full_name":"Ada Lovelace"}]"#)
            .create_async()
            .await;
        server
            .mock("GET", "/rest/v1/users")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.none".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client(&server);
        assert_eq!(client.get_user("4d3c", "jwt").await.unwrap(), Some(profile()));
        assert_eq!(client.get_user("none", "jwt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_current_subscription_joins_price() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/subscriptions")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*,prices(id,products(*))".into()),
                Matcher::UrlEncoded("user_id".into(), "eq.4d3c".into()),
                Matcher::UrlEncoded("status".into(), "in.(trialing,active)".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{
                    "id": "sub_1",
                    "user_id": "4d3c",
                    "status": "active",
                    "current_period_end": "2026-11-01T00:00:00Z",
                    "prices": { "id": "price_indie_yearly", "products": { "name": "Indie" } }
                }]"#,
            )
            .create_async()
            .await;

        let record = client(&server)
            .current_subscription("4d3c", "jwt")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.price_id.as_deref(), Some("price_indie_yearly"));
        assert_eq!(record.product_name.as_deref(), Some("Indie"));
        assert_eq!(record.status, SubscriptionStatus::Active);
        assert!(record.current_period_end.is_some());
    }

    #[tokio::test]
    async fn test_no_current_subscription() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/subscriptions")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        assert!(
            client(&server)
                .current_subscription("4d3c", "jwt")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_row_without_join_keeps_price_column() {
        let row: SubscriptionRow = serde_json::from_value(json!({
            "id": "sub_2",
            "user_id": "u",
            "status": "trialing",
            "price_id": "price_basic_monthly",
            "prices": null
        }))
        .unwrap();
        let record = SubscriptionRecord::from(row);
        assert_eq!(record.price_id.as_deref(), Some("price_basic_monthly"));
        assert_eq!(record.product_name, None);
    }
}
