//! Internal data structures
//!
//! Session-level types: wire codes for language and platform, the login
//! status path flag, decoded subscription token claims and the
//! first-of-many selection wrapper.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Content language, used verbatim as a URL path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    /// English
    #[default]
    #[serde(rename = "ENG")]
    English,
    /// Dutch
    #[serde(rename = "NLD")]
    Dutch,
    /// Portuguese
    #[serde(rename = "POR")]
    Portuguese,
    /// Spanish
    #[serde(rename = "SPA")]
    Spanish,
    /// German
    #[serde(rename = "DEU")]
    German,
    /// French
    #[serde(rename = "FRA")]
    French,
}

impl Language {
    /// All supported languages
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Dutch,
        Language::Portuguese,
        Language::Spanish,
        Language::German,
        Language::French,
    ];

    /// Wire code of the language
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "ENG",
            Language::Dutch => "NLD",
            Language::Portuguese => "POR",
            Language::Spanish => "SPA",
            Language::German => "DEU",
            Language::French => "FRA",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                crate::Error::config("language", &format!("Unsupported language code: {}", s))
            })
    }
}

/// Playback platform, used verbatim as a URL path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    /// Desktop browser, DASH streams
    #[default]
    WebDash,
    /// Desktop browser, HLS streams
    WebHls,
    /// Phone, DASH streams
    MobileDash,
    /// Phone, HLS streams
    MobileHls,
    /// Tablet, DASH streams
    TabletDash,
    /// Tablet, HLS streams
    TabletHls,
    /// TV / set-top box, DASH streams
    BigScreenDash,
    /// TV / set-top box, HLS streams
    BigScreenHls,
}

impl Platform {
    /// All supported platforms
    pub const ALL: [Platform; 8] = [
        Platform::WebDash,
        Platform::WebHls,
        Platform::MobileDash,
        Platform::MobileHls,
        Platform::TabletDash,
        Platform::TabletHls,
        Platform::BigScreenDash,
        Platform::BigScreenHls,
    ];

    /// Wire code of the platform
    pub fn code(&self) -> &'static str {
        match self {
            Platform::WebDash => "WEB_DASH",
            Platform::WebHls => "WEB_HLS",
            Platform::MobileDash => "MOBILE_DASH",
            Platform::MobileHls => "MOBILE_HLS",
            Platform::TabletDash => "TABLET_DASH",
            Platform::TabletHls => "TABLET_HLS",
            Platform::BigScreenDash => "BIG_SCREEN_DASH",
            Platform::BigScreenHls => "BIG_SCREEN_HLS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Platform {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_");
        Platform::ALL
            .into_iter()
            .find(|platform| platform.code().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| {
                crate::Error::config("platform", &format!("Unsupported platform code: {}", s))
            })
    }
}

/// Whether the session is anonymous or registered
///
/// Derived from credential presence, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    /// No subscription token set
    Anonymous,
    /// A subscription token is set
    Registered,
}

impl LoginStatus {
    /// Derive the status from an optional credential
    pub fn from_credential<T>(credential: Option<T>) -> Self {
        match credential {
            Some(_) => LoginStatus::Registered,
            None => LoginStatus::Anonymous,
        }
    }

    /// Single-letter path flag
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginStatus::Anonymous => "A",
            LoginStatus::Registered => "R",
        }
    }
}

impl fmt::Display for LoginStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Country-scoped entitlement entry inside the token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntitlement {
    /// Country code the entitlement applies to
    pub country: String,
    /// Entitlement tier
    pub ent: String,
}

/// Claims carried by the subscription (ascendon) token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCredential {
    /// Location context used to scope location lookups
    #[serde(rename = "ExternalAuthorizationsContextData", default)]
    pub external_authorizations_context_data: String,
    /// Subscription status (e.g. "active")
    #[serde(rename = "SubscriptionStatus", default)]
    pub subscription_status: String,
    /// Subscriber identity
    #[serde(rename = "SubscriberId")]
    pub subscriber_id: String,
    /// First name on the account
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    /// Last name on the account
    #[serde(rename = "LastName", default)]
    pub last_name: String,
    /// Per-country entitlement tiers
    #[serde(default)]
    pub ents: Vec<CountryEntitlement>,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch
    #[serde(default)]
    pub iat: i64,
    /// Session identifier
    #[serde(rename = "SessionId", default)]
    pub session_id: String,
    /// Subscribed product name
    #[serde(rename = "SubscribedProduct", default)]
    pub subscribed_product: String,
    /// Token identifier
    #[serde(default)]
    pub jti: String,
}

impl DecodedCredential {
    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Issue time as a timestamp
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_none_or(|exp| Utc::now() > exp)
    }

    /// Location context string, if the token carries one
    pub fn home_country(&self) -> Option<&str> {
        let context = self.external_authorizations_context_data.trim();
        (!context.is_empty()).then_some(context)
    }
}

/// First item of a server list, with a count of the candidates dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selected<T> {
    /// The chosen item
    pub item: T,
    /// How many further candidates were discarded
    pub discarded: usize,
}

impl<T> Selected<T> {
    /// Pick the first element of `items`, `None` when empty
    pub fn first_of(items: Vec<T>) -> Option<Self> {
        let discarded = items.len().saturating_sub(1);
        items
            .into_iter()
            .next()
            .map(|item| Self { item, discarded })
    }

    /// Whether the server returned more than one candidate
    pub fn is_ambiguous(&self) -> bool {
        self.discarded > 0
    }

    /// Unwrap the chosen item
    pub fn into_inner(self) -> T {
        self.item
    }
}
