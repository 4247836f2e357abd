//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use f1tv_api::{F1TvClient, config::Settings};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test helper functions
pub mod helpers {
    use super::*;

    /// Settings pointing every endpoint at the mock server
    pub fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.client.base_url = server.uri();
        settings.client.image_base_url = format!("{}/image", server.uri());
        settings.client.jwks_url = format!("{}/jwks.json", server.uri());
        settings.network.request_timeout = 5;
        settings
    }

    /// Client against the mock server
    pub fn client_for(
        server: &MockServer,
        credential: Option<&str>,
        auto_refresh: bool,
    ) -> F1TvClient {
        let mut builder = F1TvClient::builder()
            .settings(settings_for(server))
            .auto_refresh(auto_refresh);
        if let Some(credential) = credential {
            builder = builder.credential(credential);
        }
        builder.build().unwrap()
    }
}

/// Test data factory
pub struct MockData;

impl MockData {
    /// Unsigned token carrying the given claims
    pub fn token(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT","kid":"k1"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.c2lnbmF0dXJl", header, payload)
    }

    /// Subscriber token scoped to `home_country`
    pub fn subscriber_token(subscriber_id: &str, home_country: &str) -> String {
        Self::token(&json!({
            "SubscriberId": subscriber_id,
            "SubscriptionStatus": "active",
            "SessionId": "session-1",
            "ExternalAuthorizationsContextData": home_country,
            "exp": 4102444800i64,
            "iat": 1700000000i64
        }))
    }

    /// Standard envelope around `result`
    pub fn envelope(result: Value) -> Value {
        json!({
            "resultCode": "OK",
            "message": "OK",
            "errorDescription": "",
            "resultObj": result,
            "systemTime": 1700000000000i64
        })
    }

    pub fn entitlement(token: &str) -> Value {
        Self::envelope(json!({ "entitlementToken": token }))
    }

    pub fn location(entitlement: &str, group_id: i64) -> Value {
        Self::envelope(json!({
            "userLocation": [{
                "detectedCountryIsoCode": "NL",
                "registeredCountryIsoCode": "NL",
                "groupId": group_id,
                "entitlement": entitlement
            }],
            "countries": []
        }))
    }

    /// Configuration without the envelope
    pub fn config() -> Value {
        json!({
            "appIsoCode": "NL",
            "env": "production",
            "version": "7",
            "supportedLanguages": ["ENG", "NLD"],
            "featureFlags": { "pip": true }
        })
    }

    pub fn video(container_ids: &[i64]) -> Value {
        let containers: Vec<Value> = container_ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "contentId": id,
                    "layout": "CONTENT_DETAILS",
                    "metadata": { "title": format!("Item {}", id) }
                })
            })
            .collect();
        Self::envelope(json!({ "total": containers.len(), "containers": containers }))
    }

    pub fn search(total: i64) -> Value {
        Self::envelope(json!({ "total": total, "containers": [] }))
    }
}

/// Mock server factory
pub struct MockServerFactory;

impl MockServerFactory {
    /// Create new mock server
    pub async fn new() -> MockServer {
        MockServer::start().await
    }

    /// Anonymous location and configuration
    pub async fn setup_anonymous(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/1.0/A/ENG/WEB_DASH/ALL/USER/LOCATION"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(MockData::location("ANONYMOUS", 1)),
            )
            .mount(server)
            .await;

        Self::setup_config(server).await;
    }

    /// Configuration snapshot
    pub async fn setup_config(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(MockData::config()))
            .mount(server)
            .await;
    }
}

/// Test utilities
pub struct TestUtils;

impl TestUtils {
    /// Initialize test logging
    pub fn init_logger() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .try_init();
    }

    /// Wait for async condition
    pub async fn wait_for_condition<F, Fut>(
        condition: F,
        timeout: std::time::Duration,
    ) -> anyhow::Result<()>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        use tokio::time::{sleep, timeout as tokio_timeout};

        tokio_timeout(timeout, async {
            loop {
                if condition().await {
                    return Ok(());
                }
                sleep(std::time::Duration::from_millis(20)).await;
            }
        })
        .await
        .map_err(|_| anyhow::anyhow!("Wait condition timeout"))?
    }
}
