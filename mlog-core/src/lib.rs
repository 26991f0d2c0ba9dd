//! # mlog-core
//!
//! Core types and traits for the message logger: the inbound [`MessageEvent`] contract,
//! the JSON-backed [`InboundMessage`], the [`Plugin`] lifecycle trait, and tracing initialization.
//! Knows nothing about storage; used by message-logger and mlog-cli.

pub mod error;
pub mod event;
pub mod logger;
pub mod plugin;

pub use error::{CoreError, Result};
pub use event::{InboundMessage, MessageEvent, PlatformMeta, Sender};
pub use logger::{init_tracing, LogFormat, DEFAULT_LOG_FILTER};
pub use plugin::Plugin;
