//! Configuration management for the F1TV client
//!
//! This module handles loading and managing configuration settings
//! for both the library and the command line front end.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{ClientSettings, LoggingSettings, NetworkSettings, Settings};
