//! # mlog-cli
//!
//! Minimal host runtime for the message logger: argument parsing, config loading,
//! and the line-delimited JSON event dispatcher.

pub mod cli;
pub mod runner;

pub use cli::{load_config, render_record, show_message, Cli, Commands};
pub use runner::{dispatch_lines, RunSummary};
