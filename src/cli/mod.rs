//! Command line front end
//!
//! `main.rs` parses arguments with clap and hands them to
//! [`commands::run_command`].

pub mod commands;
pub mod logging;
