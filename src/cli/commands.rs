//! Command execution for the `f1tv` binary
//!
//! Each command prints its result as pretty JSON on stdout. Errors are
//! printed to stderr and exit with status 1.

use crate::{
    F1TvClient, Settings,
    config::ConfigLoader,
    error::{format_error, format_error_for_logging},
    session::decode_credential,
    types::{Language, PictureOptions, Platform, SearchVodParams},
    utils::version::get_detailed_version,
};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{debug, info};

use super::logging::init_logging;

/// Options shared by every command
#[derive(Debug, Default)]
pub struct GlobalArgs {
    pub config: Option<String>,
    pub ascendon: Option<String>,
    pub language: Option<Language>,
    pub platform: Option<Platform>,
    pub timeout: Option<u64>,
    pub verbose: bool,
}

/// The command to run
#[derive(Debug)]
pub enum CommandKind {
    /// Fetch the location for the session
    Location,
    /// Fetch the configuration snapshot
    Config,
    /// List live events
    LiveNow,
    /// Search the on-demand catalog
    Search(SearchVodParams),
    /// Detail of a content item
    Video { content_id: u64 },
    /// Playback URL of a content item
    Play {
        content_id: u64,
        channel_id: Option<u64>,
        platform: Option<Platform>,
    },
    /// Download a resized image
    Picture {
        slug: String,
        width: u32,
        height: u32,
        options: PictureOptions,
        output: PathBuf,
    },
    /// Print the claims of the credential
    Decode,
    /// Verify the credential signature
    Verify,
}

impl CommandKind {
    fn needs_location(&self) -> bool {
        matches!(
            self,
            CommandKind::Location
                | CommandKind::LiveNow
                | CommandKind::Search(_)
                | CommandKind::Video { .. }
        )
    }
}

/// Run a command with the given arguments
pub async fn run_command(global: GlobalArgs, command: CommandKind) -> anyhow::Result<()> {
    let settings = load_settings(&global);
    init_logging(&settings.logging);

    debug!(version = %get_detailed_version(), ?command, "Running command");

    match execute(&settings, command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            debug!(error = %format_error_for_logging(&e), "Command failed");
            eprintln!("Error: {}", format_error(&e));
            std::process::exit(1);
        }
    }
}

/// Load configuration and apply command line overrides
///
/// Precedence:
/// 1. Command line arguments
/// 2. Environment variables
/// 3. Configuration file (from --config, F1TV_CONFIG or default location)
/// 4. Default values
pub fn load_settings(global: &GlobalArgs) -> Settings {
    let config_path = match &global.config {
        Some(config) => Some(PathBuf::from(config)),
        None => ConfigLoader::get_config_path(),
    };

    let mut settings = ConfigLoader::new()
        .load(config_path.as_deref())
        .unwrap_or_else(|e| {
            // Logging is not initialized yet
            eprintln!(
                "Warning: Failed to load configuration: {}. Using defaults.",
                e
            );
            Settings::default()
        });

    if let Some(ascendon) = &global.ascendon {
        settings.client.ascendon = Some(ascendon.clone());
    }
    if let Some(language) = global.language {
        settings.client.language = language;
    }
    if let Some(platform) = global.platform {
        settings.client.platform = platform;
    }
    if let Some(timeout) = global.timeout {
        settings.network.request_timeout = timeout;
    }
    if global.verbose {
        settings.logging.verbose = true;
    }

    settings
}

/// Execute a command and return its JSON output
pub async fn execute(settings: &Settings, command: CommandKind) -> crate::Result<Value> {
    if let CommandKind::Decode = command {
        let token = settings.client.ascendon.as_deref().ok_or_else(|| {
            crate::Error::precondition("ascendon token", "ascendon token is not set, nothing to decode")
        })?;
        return Ok(serde_json::to_value(decode_credential(token)?)?);
    }

    let client = F1TvClient::builder()
        .settings(settings.clone())
        .auto_refresh(false)
        .build()?;

    if command.needs_location() {
        prepare_session(&client, settings).await?;
    } else if matches!(command, CommandKind::Play { .. }) && client.credential().is_some() {
        client.refresh_entitlement().await?;
    }

    let output = match command {
        CommandKind::Location => serde_json::to_value(client.location())?,
        CommandKind::Config => serde_json::to_value(client.refresh_config().await?)?,
        CommandKind::LiveNow => serde_json::to_value(client.live_now().await?)?,
        CommandKind::Search(params) => serde_json::to_value(client.search_vod(&params).await?)?,
        CommandKind::Video { content_id } => {
            let selected = client.content_video(content_id).await?;
            if selected.is_ambiguous() {
                eprintln!(
                    "Warning: {} additional containers were discarded",
                    selected.discarded
                );
            }
            serde_json::to_value(selected.into_inner())?
        }
        CommandKind::Play {
            content_id,
            channel_id,
            platform,
        } => serde_json::to_value(client.content_play(content_id, channel_id, platform).await?)?,
        CommandKind::Picture {
            slug,
            width,
            height,
            options,
            output,
        } => {
            let bytes = client.picture(&slug, width, height, &options).await?;
            tokio::fs::write(&output, &bytes).await?;
            info!(path = %output.display(), bytes = bytes.len(), "Picture saved");
            json!({ "path": output.display().to_string(), "bytes": bytes.len() })
        }
        CommandKind::Verify => serde_json::to_value(client.verify_credential().await?)?,
        CommandKind::Decode => Value::Null,
    };

    Ok(output)
}

/// Fetch entitlement (when a credential is set) then location, and wait for
/// location readiness, bounded by the request timeout
async fn prepare_session(client: &F1TvClient, settings: &Settings) -> crate::Result<()> {
    let timeout = settings.network.request_timeout();

    let bootstrap = async {
        if client.credential().is_some()
            && let Err(e) = client.refresh_entitlement().await
        {
            tracing::warn!(error = %e, "Continuing without entitlement");
        }
        client.refresh_location().await?;
        client.when_location_ready().await;
        Ok::<(), crate::Error>(())
    };

    tokio::time::timeout(timeout, bootstrap).await.map_err(|_| {
        crate::Error::transport(format!(
            "Timed out after {}s waiting for location",
            timeout.as_secs()
        ))
    })?
}
