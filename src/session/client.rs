//! # F1TV session client
//!
//! [`F1TvClient`] owns the subscription credential and everything derived
//! from it. Setting a credential runs the refresh chain
//! decode → entitlement → location → configuration in the background, each
//! step starting after the previous one settles. Actions read the cached
//! state synchronously, check their preconditions and issue exactly one
//! request.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use f1tv_api::session::F1TvClient;
//! use f1tv_api::types::SearchVodParams;
//!
//! # tokio_test::block_on(async {
//! let client = F1TvClient::builder().build()?;
//! client.when_location_ready().await;
//!
//! let results = client
//!     .search_vod(&SearchVodParams::new().with_year("2024"))
//!     .await?;
//! println!("{} results", results.total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```
//!
//! ## Failure reporting
//!
//! Direct `refresh_*` calls return their errors. The background chain has no
//! caller to return to, so it publishes failures as [`ClientEvent`]s and logs
//! them at `warn` level.

use crate::{
    Result,
    config::Settings,
    session::{
        credential::decode_credential,
        endpoint::{Endpoints, PathContext},
        state::StateSlot,
        transport::{HttpRequest, ReqwestTransport, Transport},
        verify,
    },
    types::{
        ApiResult, Config, ContentPlayResult, ContentVideoContainer, ContentVideoResult,
        DecodedCredential, EntitlementResult, Language, LiveNowResult, LocationResult,
        LoginStatus, PictureOptions, Platform, SearchVodParams, SearchVodResult, Selected,
        UserLocation,
    },
    utils::default_user_agent,
};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use url::Url;

/// Capacity of the event channel; slow receivers observe `Lagged`
const EVENT_CAPACITY: usize = 64;

/// State change notifications
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Credential replaced or cleared
    CredentialUpdated,
    /// A credential was rejected
    CredentialError(Arc<crate::Error>),
    /// New entitlement token stored
    EntitlementUpdated,
    /// Background entitlement refresh failed
    EntitlementError(Arc<crate::Error>),
    /// New location stored
    LocationUpdated,
    /// Background location refresh failed
    LocationError(Arc<crate::Error>),
    /// New configuration stored
    ConfigUpdated,
    /// Background configuration refresh failed
    ConfigError(Arc<crate::Error>),
    /// Location and configuration are both available, emitted once
    Ready,
}

/// Credential and claims are replaced together under one lock
#[derive(Debug, Default)]
struct CredentialState {
    token: Option<String>,
    claims: Option<DecodedCredential>,
    /// Bumped on every replacement so in-flight entitlement fetches for an
    /// older credential can be recognised
    generation: u64,
}

#[derive(Debug)]
struct ClientInner {
    language: Language,
    platform: Platform,
    wait_for_config: bool,
    auto_refresh: bool,
    user_agent: String,
    jwks_url: String,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    credential: RwLock<CredentialState>,
    entitlement: StateSlot<String>,
    location: StateSlot<LocationResult>,
    config: StateSlot<Config>,
    events: broadcast::Sender<ClientEvent>,
    ready_emitted: AtomicBool,
}

/// Session client, cheap to clone
#[derive(Debug, Clone)]
pub struct F1TvClient {
    inner: Arc<ClientInner>,
}

/// Builder for [`F1TvClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    settings: Settings,
    credential: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    auto_refresh: bool,
}

impl ClientBuilder {
    /// Builder with default settings and background refresh enabled
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            credential: None,
            transport: None,
            auto_refresh: true,
        }
    }

    /// Replace all settings
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Initial subscription credential
    ///
    /// Takes precedence over `client.ascendon` in the settings.
    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Content language
    pub fn language(mut self, language: Language) -> Self {
        self.settings.client.language = language;
        self
    }

    /// Playback platform
    pub fn platform(mut self, platform: Platform) -> Self {
        self.settings.client.platform = platform;
        self
    }

    /// Service origin
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.client.base_url = base_url.into();
        self
    }

    /// Image resizer endpoint
    pub fn image_base_url(mut self, image_base_url: impl Into<String>) -> Self {
        self.settings.client.image_base_url = image_base_url.into();
        self
    }

    /// Key set used by [`F1TvClient::verify_credential`]
    pub fn jwks_url(mut self, jwks_url: impl Into<String>) -> Self {
        self.settings.client.jwks_url = jwks_url.into();
        self
    }

    /// Override the identification header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.client.user_agent = Some(user_agent.into());
        self
    }

    /// Whether [`F1TvClient::when_ready`] also waits for configuration
    pub fn wait_for_config(mut self, wait_for_config: bool) -> Self {
        self.settings.client.wait_for_config = wait_for_config;
        self
    }

    /// Inject the HTTP transport
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Inject a shared HTTP transport
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Run the refresh chain in the background on construction and on
    /// every credential change
    pub fn auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    /// Build the client
    ///
    /// A malformed credential fails with [`crate::Error::InvalidCredential`].
    pub fn build(self) -> Result<F1TvClient> {
        let settings = self.settings;

        let token = normalize_credential(
            self.credential
                .as_deref()
                .or(settings.client.ascendon.as_deref()),
        );
        let claims = token.as_deref().map(decode_credential).transpose()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&settings)?),
        };

        let endpoints = Endpoints::new(&settings.client.base_url, &settings.client.image_base_url)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let client = F1TvClient {
            inner: Arc::new(ClientInner {
                language: settings.client.language,
                platform: settings.client.platform,
                wait_for_config: settings.client.wait_for_config,
                auto_refresh: self.auto_refresh,
                user_agent: settings
                    .client
                    .user_agent
                    .clone()
                    .unwrap_or_else(default_user_agent),
                jwks_url: settings.client.jwks_url.clone(),
                endpoints,
                transport,
                credential: RwLock::new(CredentialState {
                    token,
                    claims,
                    generation: 0,
                }),
                entitlement: StateSlot::new(),
                location: StateSlot::new(),
                config: StateSlot::new(),
                events,
                ready_emitted: AtomicBool::new(false),
            }),
        };

        debug!(
            login_status = %client.login_status(),
            language = %client.inner.language,
            platform = %client.inner.platform,
            "F1TV client created"
        );

        if client.inner.auto_refresh {
            client.spawn_refresh();
        }

        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_credential(credential: Option<&str>) -> Option<String> {
    credential
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl F1TvClient {
    /// Start building a client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client with default settings, anonymous, refreshing in the background
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    // Credential holder

    /// Current credential
    pub fn credential(&self) -> Option<String> {
        self.inner.credential.read().token.clone()
    }

    /// Claims of the current credential
    pub fn decoded_credential(&self) -> Option<DecodedCredential> {
        self.inner.credential.read().claims.clone()
    }

    /// `A` without a credential, `R` with one
    pub fn login_status(&self) -> LoginStatus {
        LoginStatus::from_credential(self.inner.credential.read().token.as_ref())
    }

    /// Replace or clear the credential
    ///
    /// Entitlement is cleared before this returns. A malformed credential is
    /// rejected with [`crate::Error::InvalidCredential`] and leaves the client
    /// anonymous. With auto refresh on, the refresh chain then runs in the
    /// background.
    pub fn set_credential(&self, credential: Option<&str>) -> Result<()> {
        let token = normalize_credential(credential);

        let claims = match token.as_deref().map(decode_credential).transpose() {
            Ok(claims) => claims,
            Err(err) => {
                self.replace_credential(None, None);
                warn!(error = %err, "Rejected malformed credential");

                let reason = match &err {
                    crate::Error::InvalidCredential { reason } => reason.clone(),
                    other => other.to_string(),
                };
                self.emit(ClientEvent::CredentialError(Arc::new(err)));
                return Err(crate::Error::invalid_credential(reason));
            }
        };

        info!(registered = token.is_some(), "Credential updated");
        self.replace_credential(token, claims);
        self.emit(ClientEvent::CredentialUpdated);

        if self.inner.auto_refresh {
            self.spawn_refresh();
        }

        Ok(())
    }

    fn replace_credential(&self, token: Option<String>, claims: Option<DecodedCredential>) {
        let mut state = self.inner.credential.write();
        state.token = token;
        state.claims = claims;
        state.generation = state.generation.wrapping_add(1);
        self.inner.entitlement.clear();
    }

    /// Verify the current credential's signature against the issuer's keys
    pub async fn verify_credential(&self) -> Result<DecodedCredential> {
        let token = self.credential().ok_or_else(|| {
            crate::Error::precondition("ascendon token", "ascendon token is not set, unable to verify")
        })?;

        verify::verify_credential(
            self.inner.transport.as_ref(),
            &self.inner.jwks_url,
            &self.inner.user_agent,
            &token,
        )
        .await
    }

    // Dependent state

    /// Current entitlement token
    pub fn entitlement(&self) -> Option<String> {
        self.inner.entitlement.get()
    }

    /// Current location
    pub fn location(&self) -> Option<LocationResult> {
        self.inner.location.get()
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Option<Config> {
        self.inner.config.get()
    }

    /// Observe entitlement changes
    pub fn watch_entitlement(&self) -> watch::Receiver<Option<String>> {
        self.inner.entitlement.subscribe()
    }

    /// Observe location changes
    pub fn watch_location(&self) -> watch::Receiver<Option<LocationResult>> {
        self.inner.location.subscribe()
    }

    /// Observe configuration changes
    pub fn watch_config(&self) -> watch::Receiver<Option<Config>> {
        self.inner.config.subscribe()
    }

    /// Subscribe to state change notifications
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// Session language
    pub fn language(&self) -> Language {
        self.inner.language
    }

    /// Session platform
    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// Fetch a new entitlement token for the current credential
    ///
    /// Fails without any request when no credential is set. A result that
    /// arrives after the credential was replaced is returned but not stored.
    pub async fn refresh_entitlement(&self) -> Result<String> {
        let (token, generation) = {
            let state = self.inner.credential.read();
            (state.token.clone(), state.generation)
        };
        let token = token.ok_or_else(|| {
            crate::Error::precondition("ascendon token", "ascendon token is not set")
        })?;

        let url = self.api_url("2.0", None, "ALL/USER/ENTITLEMENT", &[], &[])?;
        let request = self.request(&url).with_header("ascendontoken", token);
        let result: ApiResult<EntitlementResult> = self.get_json(request, "get entitlement").await?;
        let entitlement = result.into_result().entitlement_token;

        {
            let state = self.inner.credential.read();
            if state.generation != generation {
                debug!("Discarding entitlement fetched for a replaced credential");
                return Ok(entitlement);
            }
            self.inner.entitlement.set(entitlement.clone());
        }

        info!("Entitlement token refreshed");
        self.emit(ClientEvent::EntitlementUpdated);
        Ok(entitlement)
    }

    /// Fetch the location for the current session
    ///
    /// Scoped by the credential's location context and the entitlement when
    /// they are present.
    pub async fn refresh_location(&self) -> Result<LocationResult> {
        let home_country = self
            .decoded_credential()
            .and_then(|claims| claims.home_country().map(str::to_string));
        let entitlement = self.entitlement();

        let query: Vec<(&str, &str)> = home_country
            .as_deref()
            .map(|country| ("homeCountry", country))
            .into_iter()
            .collect();

        let url = self.api_url("1.0", None, "ALL/USER/LOCATION", &[], &query)?;
        let request = self
            .request(&url)
            .with_optional_header("entitlementtoken", entitlement.as_deref());
        let result: ApiResult<LocationResult> = self.get_json(request, "get location").await?;
        let location = result.into_result();

        self.inner.location.set(location.clone());
        info!(
            entries = location.user_location.len(),
            "Location refreshed"
        );
        self.emit(ClientEvent::LocationUpdated);
        self.check_ready();

        Ok(location)
    }

    /// Fetch the configuration snapshot
    pub async fn refresh_config(&self) -> Result<Config> {
        let url = self.inner.endpoints.config()?;
        let body: Value = self.get_json(self.request(&url), "get config").await?;

        let body = match body {
            Value::Object(mut map) => match map.remove("resultObj") {
                Some(result) => result,
                None => Value::Object(map),
            },
            other => other,
        };
        let config: Config = serde_json::from_value(body)?;

        self.inner.config.set(config.clone());
        info!(version = %config.version, "Configuration refreshed");
        self.emit(ClientEvent::ConfigUpdated);
        self.check_ready();

        Ok(config)
    }

    /// Run the refresh chain once: entitlement (when a credential is set),
    /// then location, then configuration
    ///
    /// Each failure is published as an event and does not stop later steps.
    pub async fn refresh_all(&self) {
        if self.credential().is_some()
            && let Err(err) = self.refresh_entitlement().await
        {
            warn!(error = %err, "Entitlement refresh failed");
            self.emit(ClientEvent::EntitlementError(Arc::new(err)));
        }

        if let Err(err) = self.refresh_location().await {
            warn!(error = %err, "Location refresh failed");
            self.emit(ClientEvent::LocationError(Arc::new(err)));
        }

        if let Err(err) = self.refresh_config().await {
            warn!(error = %err, "Configuration refresh failed");
            self.emit(ClientEvent::ConfigError(Arc::new(err)));
        }
    }

    fn spawn_refresh(&self) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let client = self.clone();
                handle.spawn(async move { client.refresh_all().await });
            }
            Err(_) => warn!("No async runtime available, background refresh skipped"),
        }
    }

    // Readiness

    /// Whether location has been fetched
    pub fn is_location_ready(&self) -> bool {
        self.inner.location.is_set()
    }

    /// Whether location, and configuration unless disabled, have been fetched
    pub fn is_ready(&self) -> bool {
        self.is_location_ready() && (!self.inner.wait_for_config || self.inner.config.is_set())
    }

    /// Wait for the first successful location fetch
    ///
    /// Resolves immediately once location is known. Pends forever if it never
    /// is; wrap in `tokio::time::timeout` for a bound.
    pub async fn when_location_ready(&self) {
        self.inner.location.wait().await;
    }

    /// Wait for location and, unless disabled, configuration
    pub async fn when_ready(&self) {
        if self.inner.wait_for_config {
            tokio::join!(self.inner.location.wait(), self.inner.config.wait());
        } else {
            self.inner.location.wait().await;
        }
    }

    fn check_ready(&self) {
        if self.is_ready() && !self.inner.ready_emitted.swap(true, Ordering::SeqCst) {
            debug!("Client ready");
            self.emit(ClientEvent::Ready);
        }
    }

    // Actions

    /// Playback URL for a content item
    ///
    /// Requires both credential and entitlement. `platform` overrides the
    /// session platform for this request only.
    pub async fn content_play(
        &self,
        content_id: u64,
        channel_id: Option<u64>,
        platform: Option<Platform>,
    ) -> Result<ContentPlayResult> {
        let (Some(token), Some(entitlement)) = (self.credential(), self.entitlement()) else {
            return Err(crate::Error::precondition(
                "ascendon token or entitlement token",
                "ascendon token or entitlement token is not set, unable to play content",
            ));
        };

        let content_id = content_id.to_string();
        let channel_id = channel_id.map(|id| id.to_string());
        let mut query = vec![("contentId", content_id.as_str())];
        if let Some(channel_id) = channel_id.as_deref() {
            query.push(("channelId", channel_id));
        }

        let url = self.api_url("2.0", platform, "ALL/CONTENT/PLAY", &[], &query)?;
        let request = self
            .request(&url)
            .with_header("ascendontoken", token)
            .with_header("entitlementtoken", entitlement);
        let result: ApiResult<ContentPlayResult> = self.get_json(request, "play content").await?;

        Ok(result.into_result())
    }

    /// Detail of a content item
    ///
    /// The server answers with a list of containers; the first is selected
    /// and the number discarded is reported on the result.
    pub async fn content_video(&self, content_id: u64) -> Result<Selected<ContentVideoContainer>> {
        let location = self.current_user_location()?;
        let entitlement = self.entitlement();
        if entitlement.is_none() {
            warn!(content_id, "Entitlement token is not set");
        }

        let content_id_segment = content_id.to_string();
        let group_id = location.group_id.to_string();
        let url = self.api_url(
            "4.0",
            None,
            "ALL/CONTENT/VIDEO",
            &[&content_id_segment, &location.entitlement, &group_id],
            &[],
        )?;
        let request = self
            .request(&url)
            .with_optional_header("entitlementtoken", entitlement.as_deref());
        let result: ApiResult<ContentVideoResult> =
            self.get_json(request, "get video content").await?;

        let selected = Selected::first_of(result.into_result().containers)
            .ok_or_else(|| crate::Error::empty_result("containers"))?;

        if selected.is_ambiguous() {
            warn!(
                content_id,
                discarded = selected.discarded,
                "Multiple containers found, returning the first one"
            );
        }

        Ok(selected)
    }

    /// Events currently live
    pub async fn live_now(&self) -> Result<LiveNowResult> {
        let location = self.current_user_location()?;

        let group_id = location.group_id.to_string();
        let url = self.api_url(
            "1.0",
            None,
            "ALL/EVENTS/LIVENOW",
            &[&location.entitlement, &group_id],
            &[],
        )?;
        let result: ApiResult<LiveNowResult> =
            self.get_json(self.request(&url), "get live now").await?;

        Ok(result.into_result())
    }

    /// Search the on-demand catalog
    pub async fn search_vod(&self, params: &SearchVodParams) -> Result<SearchVodResult> {
        let location = self.current_user_location()?;

        let pairs = params.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(key, value)| (*key, value.as_str())).collect();

        let group_id = location.group_id.to_string();
        let url = self.api_url(
            "2.0",
            None,
            "ALL/PAGE/SEARCH/VOD",
            &[&location.entitlement, &group_id],
            &query,
        )?;
        let result: ApiResult<SearchVodResult> =
            self.get_json(self.request(&url), "search VOD").await?;

        Ok(result.into_result())
    }

    /// Resized image bytes
    pub async fn picture(
        &self,
        slug: &str,
        width: u32,
        height: u32,
        options: &PictureOptions,
    ) -> Result<Vec<u8>> {
        let url = self.inner.endpoints.picture(slug, width, height, options)?;
        debug!(%url, "Fetching picture");

        let response = self
            .inner
            .transport
            .perform(self.request(&url))
            .await?
            .error_for_status("get picture")?;

        Ok(response.body)
    }

    // Request plumbing

    fn current_user_location(&self) -> Result<UserLocation> {
        self.inner
            .location
            .get()
            .and_then(|location| location.user_location.into_iter().next())
            .ok_or_else(|| crate::Error::precondition("location", "location is not set"))
    }

    fn api_url(
        &self,
        version: &str,
        platform: Option<Platform>,
        command: &str,
        extra: &[&str],
        query: &[(&str, &str)],
    ) -> Result<Url> {
        let context = PathContext {
            login_status: self.login_status(),
            language: self.inner.language,
            platform: platform.unwrap_or(self.inner.platform),
        };
        let url = self.inner.endpoints.api(version, context, command, extra, query)?;
        debug!(%url, "Built request URL");
        Ok(url)
    }

    fn request(&self, url: &Url) -> HttpRequest {
        HttpRequest::get(url.as_str()).with_header("User-Agent", self.inner.user_agent.as_str())
    }

    async fn get_json<T: DeserializeOwned>(&self, request: HttpRequest, operation: &str) -> Result<T> {
        self.inner
            .transport
            .perform(request)
            .await?
            .error_for_status(operation)?
            .json()
    }

    fn emit(&self, event: ClientEvent) {
        // No receivers is not an error
        let _ = self.inner.events.send(event);
    }
}
