//! HTTP transport abstraction
//!
//! The client never talks to reqwest directly: every request goes through
//! a [`Transport`], so tests and embedders can substitute their own
//! dispatcher. [`ReqwestTransport`] is the default implementation.

use crate::{Result, config::Settings};
use reqwest::{Client, Method, Proxy};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A single outbound request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: String,
    /// Absolute URL
    pub url: String,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Set HTTP method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add header only when a value is present
    pub fn with_optional_header(self, key: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.with_header(key, value),
            None => self,
        }
    }

    /// Set request body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and raw body of a completed request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, invalid UTF-8 replaced
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Fail with [`crate::Error::Upstream`] unless the status is 2xx
    pub fn error_for_status(self, operation: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(crate::Error::upstream(operation, self.status, &self.text()))
        }
    }
}

/// Performs HTTP requests on behalf of the client
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform the request and return status and body
    ///
    /// Non-2xx statuses are not errors at this level.
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default transport backed by a reqwest [`Client`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    /// Base HTTP client
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with timeouts and proxy taken from the settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut client_builder = Client::builder()
            .connect_timeout(settings.network.connect_timeout())
            .timeout(settings.network.request_timeout());

        if let Some(proxy_url) = settings.get_proxy_url() {
            let proxy = Proxy::all(&proxy_url).map_err(|e| {
                crate::Error::config("proxy", &format!("Invalid proxy URL {}: {}", proxy_url, e))
            })?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build()?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the configured HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|_| {
            crate::Error::transport(format!("Unsupported HTTP method: {}", request.method))
        })?;

        let mut builder = self.client.request(method, &request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        tracing::trace!(url = %request.url, status, bytes = body.len(), "HTTP response");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::get("https://example.invalid/x")
            .with_header("ascendontoken", "abc")
            .with_optional_header("entitlementtoken", None)
            .with_method("POST")
            .with_body("{}");

        assert_eq!(request.method, "POST");
        assert_eq!(request.header("AscendonToken"), Some("abc"));
        assert!(request.header("entitlementtoken").is_none());
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[test]
    fn test_response_status_handling() {
        let ok = HttpResponse::new(204, Vec::new());
        assert!(ok.is_success());

        let not_found = HttpResponse::new(404, r#"{"error":"not found"}"#);
        let err = not_found.error_for_status("get video content").unwrap_err();
        match err {
            crate::Error::Upstream { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, r#"{"error":"not found"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transport_creation_with_proxy() {
        let mut settings = Settings::default();
        settings.network.https_proxy = Some("http://proxy:8080".to_string());
        assert!(ReqwestTransport::new(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_reqwest_transport_roundtrip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("x-test", "1"))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .mount(&mock_server)
            .await;

        let transport = ReqwestTransport::new(&Settings::default()).unwrap();
        let response = transport
            .perform(
                HttpRequest::get(format!("{}/ping", mock_server.uri())).with_header("x-test", "1"),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 418);
        assert_eq!(response.text(), "teapot");
        assert!(!response.is_success());
    }
}
