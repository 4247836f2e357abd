//! Response type definitions
//!
//! Every JSON endpoint wraps its payload in [`ApiResult`]. Payloads type the
//! fields the client relies on and keep the rest in an `extra` map so no
//! server data is lost on the way through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Standard response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResult<T> {
    /// Service result code ("OK" on success)
    #[serde(default)]
    pub result_code: String,
    /// Service message
    #[serde(default)]
    pub message: String,
    /// Error description, empty on success
    #[serde(default)]
    pub error_description: String,
    /// The payload
    pub result_obj: T,
    /// Server time in milliseconds since the Unix epoch
    #[serde(default)]
    pub system_time: i64,
}

impl<T> ApiResult<T> {
    /// Unwrap the payload
    pub fn into_result(self) -> T {
        self.result_obj
    }
}

/// Payload of the entitlement endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementResult {
    /// Token granting content access
    pub entitlement_token: String,
}

/// A user location entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    /// Country detected from the client address
    #[serde(default)]
    pub detected_country_iso_code: String,
    /// Country registered on the account
    #[serde(default)]
    pub registered_country_iso_code: String,
    /// Detected country, alpha-3
    #[serde(default)]
    pub detected_country_iso_code_alpha3: String,
    /// Registered country, alpha-3
    #[serde(default)]
    pub registered_country_iso_code_alpha3: String,
    /// Catalog group
    pub group_id: i64,
    /// Entitlement tier (ANONYMOUS, REG, PRO, ...)
    pub entitlement: String,
}

/// Payload of the location endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResult {
    /// Ordered location entries, the first is the active context
    #[serde(default)]
    pub user_location: Vec<UserLocation>,
    /// Country metadata
    #[serde(default)]
    pub countries: Vec<Value>,
}

impl LocationResult {
    /// The active location context
    pub fn current(&self) -> Option<&UserLocation> {
        self.user_location.first()
    }
}

/// Fallback location advertised by the configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDefaults {
    /// Default catalog group
    #[serde(default)]
    pub group_id: i64,
    /// Default entitlement tier
    #[serde(default)]
    pub entitlement: String,
    /// Default country
    #[serde(default)]
    pub user_country: String,
}

/// Client configuration snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Application country code
    #[serde(default)]
    pub app_iso_code: String,
    /// Deployment environment name
    #[serde(default)]
    pub env: String,
    /// Languages the service offers
    #[serde(default)]
    pub supported_languages: Vec<String>,
    /// Suggested request timeout in milliseconds
    #[serde(default)]
    pub request_timeout: u64,
    /// Fallback location
    #[serde(default)]
    pub location_defaults: LocationDefaults,
    /// Configuration version
    #[serde(default)]
    pub version: String,
    /// Remaining feature flags and endpoint parameters
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of the content play endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentPlayResult {
    /// Entitlement token echoed back by the service
    #[serde(default)]
    pub entitlement_token: String,
    /// Manifest URL
    pub url: String,
    /// DASH, DASHWV or HLS
    #[serde(default)]
    pub stream_type: String,
    /// DRM scheme when encrypted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm_type: Option<String>,
    /// License acquisition URL
    #[serde(rename = "laURL", default, skip_serializing_if = "Option::is_none")]
    pub la_url: Option<String>,
    /// DRM token for the license server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drm_token: Option<String>,
    /// Channel being played
    #[serde(default)]
    pub channel_id: i64,
    /// Everything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One content record returned by the video endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVideoContainer {
    /// Content identifier
    #[serde(default)]
    pub content_id: i64,
    /// Record identifier
    #[serde(default)]
    pub id: i64,
    /// Display layout
    #[serde(default)]
    pub layout: String,
    /// Descriptive metadata
    #[serde(default)]
    pub metadata: Value,
    /// Per-platform stream variants
    #[serde(default)]
    pub platform_variants: Vec<Value>,
    /// Everything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentVideoContainer {
    /// Title from the metadata block, if present
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// Payload of the content video endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentVideoResult {
    /// Total number of records
    #[serde(default)]
    pub total: i64,
    /// Matching records
    #[serde(default)]
    pub containers: Vec<ContentVideoContainer>,
    /// Everything else
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of the live-now endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveNowResult {
    /// Per-device polling switches
    #[serde(default)]
    pub polling_enabled: Map<String, Value>,
    /// Lower polling bound in seconds
    #[serde(default)]
    pub polling_lower: u64,
    /// Upper polling bound in seconds
    #[serde(default)]
    pub polling_upper: u64,
    /// Events currently live
    #[serde(default)]
    pub items: Vec<Value>,
}

/// Payload of the VOD search endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVodResult {
    /// Total number of records
    #[serde(default)]
    pub total: i64,
    /// Collection name
    #[serde(default)]
    pub collection_name: String,
    /// Total hits for the query
    #[serde(default)]
    pub search_result_total: i64,
    /// Matching records
    #[serde(default)]
    pub containers: Vec<Value>,
}
