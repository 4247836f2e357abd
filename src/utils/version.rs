//! Version information utilities
//!
//! Provides version information and the client identification string
//! attached to every outbound request.

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Repository URL from Cargo.toml
pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Get the current library version
pub fn get_version() -> &'static str {
    VERSION
}

/// Get detailed version information including git commit
pub fn get_detailed_version() -> String {
    let version = get_version();
    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let build_date = option_env!("BUILD_DATE").unwrap_or("unknown");

    format!("{} ({}@{})", version, git_hash, build_date)
}

/// Default `User-Agent`: `name/version (repository)`
pub fn default_user_agent() -> String {
    format!("{}/{} ({})", NAME, VERSION, REPOSITORY)
}
