//! Command line client for the F1TV API
//!
//! # Usage
//!
//! ## Anonymous catalog access
//! ```bash
//! f1tv location
//! f1tv live-now
//! f1tv search --year 2024 --max-results 5
//! ```
//!
//! ## Subscriber access
//! ```bash
//! f1tv --ascendon "$TOKEN" play 1000005001 --channel-id 1011
//! F1TV_ASCENDON="$TOKEN" f1tv decode
//! ```
//!
//! ## Help and Version
//! ```bash
//! f1tv --version
//! f1tv --help
//! f1tv search --help
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use f1tv_api::{
    cli::commands::{CommandKind, GlobalArgs, run_command},
    types::{Language, PictureOptions, Platform, SearchVodParams, SortOrder},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "f1tv")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// Subscription (ascendon) token
    #[arg(long, global = true, value_name = "TOKEN")]
    ascendon: Option<String>,

    /// Content language (ENG, NLD, POR, SPA, DEU, FRA)
    #[arg(short, long, global = true, value_name = "CODE")]
    language: Option<Language>,

    /// Playback platform (WEB_DASH, WEB_HLS, ...)
    #[arg(short, long, global = true, value_name = "CODE")]
    platform: Option<Platform>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the location resolved for this session
    Location,

    /// Show the service configuration snapshot
    Config,

    /// List events that are live now
    LiveNow,

    /// Search the on-demand catalog
    Search {
        /// Season filter
        #[arg(long)]
        season: Option<String>,

        /// Year filter
        #[arg(long)]
        year: Option<String>,

        /// Meeting key filter
        #[arg(long)]
        meeting_key: Option<String>,

        /// Maximum number of results
        #[arg(long)]
        max_results: Option<u32>,

        /// Sort field
        #[arg(long)]
        order_by: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        sort_order: Option<SortOrder>,
    },

    /// Show the detail of a content item
    Video {
        /// Content identifier
        content_id: u64,
    },

    /// Get the playback URL of a content item
    Play {
        /// Content identifier
        content_id: u64,

        /// Channel identifier
        #[arg(long)]
        channel_id: Option<u64>,

        /// Platform for this request only
        #[arg(long, value_name = "CODE")]
        stream_platform: Option<Platform>,
    },

    /// Download a resized image
    Picture {
        /// Image slug
        slug: String,

        /// Width in pixels
        #[arg(long)]
        width: u32,

        /// Height in pixels
        #[arg(long)]
        height: u32,

        /// Request high quality
        #[arg(long)]
        high_quality: bool,

        /// Request landscape orientation
        #[arg(long)]
        landscape: bool,

        /// Allow a fallback image
        #[arg(long)]
        fallback: bool,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the claims of the subscription token
    Decode,

    /// Verify the subscription token signature
    Verify,
}

impl From<Commands> for CommandKind {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Location => CommandKind::Location,
            Commands::Config => CommandKind::Config,
            Commands::LiveNow => CommandKind::LiveNow,
            Commands::Search {
                season,
                year,
                meeting_key,
                max_results,
                order_by,
                sort_order,
            } => CommandKind::Search(SearchVodParams {
                season,
                year,
                meeting_key,
                max_results: max_results.map(|n| n.to_string()),
                order_by,
                sort_order,
                ..SearchVodParams::default()
            }),
            Commands::Video { content_id } => CommandKind::Video { content_id },
            Commands::Play {
                content_id,
                channel_id,
                stream_platform,
            } => CommandKind::Play {
                content_id,
                channel_id,
                platform: stream_platform,
            },
            Commands::Picture {
                slug,
                width,
                height,
                high_quality,
                landscape,
                fallback,
                output,
            } => CommandKind::Picture {
                slug,
                width,
                height,
                options: PictureOptions::new()
                    .with_high_quality(high_quality)
                    .with_landscape(landscape)
                    .with_fallback(fallback),
                output,
            },
            Commands::Decode => CommandKind::Decode,
            Commands::Verify => CommandKind::Verify,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let global = GlobalArgs {
        config: cli.config,
        ascendon: cli.ascendon,
        language: cli.language,
        platform: cli.platform,
        timeout: cli.timeout,
        verbose: cli.verbose,
    };

    run_command(global, cli.command.into()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_search_subcommand() {
        let cli = Cli::parse_from([
            "f1tv",
            "search",
            "--year",
            "2024",
            "--max-results",
            "5",
            "--sort-order",
            "desc",
        ]);

        match CommandKind::from(cli.command) {
            CommandKind::Search(params) => {
                assert_eq!(params.year.as_deref(), Some("2024"));
                assert_eq!(params.max_results.as_deref(), Some("5"));
                assert_eq!(params.sort_order, Some(SortOrder::Desc));
                assert!(params.season.is_none());
            }
            other => panic!("Expected search command, got {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["f1tv", "location", "--language", "deu", "--verbose"]);

        assert!(matches!(cli.command, Commands::Location));
        assert_eq!(cli.language, Some(Language::German));
        assert!(cli.verbose);
    }

    #[test]
    fn test_play_subcommand() {
        let cli = Cli::parse_from([
            "f1tv",
            "--ascendon",
            "token",
            "play",
            "1000005001",
            "--channel-id",
            "1011",
            "--stream-platform",
            "big-screen-hls",
        ]);

        assert_eq!(cli.ascendon.as_deref(), Some("token"));
        match CommandKind::from(cli.command) {
            CommandKind::Play {
                content_id,
                channel_id,
                platform,
            } => {
                assert_eq!(content_id, 1000005001);
                assert_eq!(channel_id, Some(1011));
                assert_eq!(platform, Some(Platform::BigScreenHls));
            }
            other => panic!("Expected play command, got {other:?}"),
        }
    }

    #[test]
    fn test_picture_requires_output() {
        let result = Cli::try_parse_from(["f1tv", "picture", "slug", "--width", "10", "--height", "10"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_language_rejected() {
        let result = Cli::try_parse_from(["f1tv", "--language", "XX", "config"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["f1tv"]).is_err());
    }
}
