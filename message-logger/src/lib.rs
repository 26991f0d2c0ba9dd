//! # message-logger
//!
//! [`MessageLogger`] plugin: persists one row per inbound message event through a pooled
//! database connection. Configured with [`LoggerConfig`]; failures surface as [`LoggerError`].

mod config;
mod error;
mod message_logger;

#[cfg(test)]
mod test;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use message_logger::MessageLogger;
