//! F1TV API client - Rust Implementation
//!
//! An unofficial client for the F1TV streaming service's REST API. It manages
//! the subscription (ascendon) token, derives the entitlement token from it,
//! discovers the caller's location and exposes typed content operations.
//!
//! # Features
//!
//! - **Session State**: credential, entitlement, location and configuration
//!   refreshed in a fixed order whenever the credential changes
//! - **Readiness**: await the first location (and configuration) fetch
//! - **Typed Actions**: play, video detail, live now, VOD search, pictures
//! - **Injected Transport**: swap the HTTP layer for tests or embedding
//! - **Command Line**: the `f1tv` binary wraps every action
//!
//! # Usage
//!
//! ```bash
//! f1tv search --year 2024 --max-results 5
//! F1TV_ASCENDON=<token> f1tv play 1000005001 --channel-id 1011
//! ```
//!
//! # Examples
//!
//! ```rust
//! use f1tv_api::{F1TvClient, types::LoginStatus};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = F1TvClient::builder().auto_refresh(false).build()?;
//! assert_eq!(client.login_status(), LoginStatus::Anonymous);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use session::{ClientBuilder, ClientEvent, F1TvClient, Transport};
pub use types::{DecodedCredential, Language, LoginStatus, Platform};
