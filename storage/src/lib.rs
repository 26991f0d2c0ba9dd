//! Storage crate: message persistence over a pooled SQL connection.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – MessageRecord, SenderInfo
//! - [`dialect`] – SqlDialect (MySQL / SQLite DDL and column lists)
//! - [`db_pool`] – DbPoolManager, PoolSettings
//! - [`message_repo`] – MessageRepository

mod db_pool;
mod dialect;
mod error;
mod message_repo;
mod models;


pub use db_pool::{DbPoolManager, PoolSettings};
pub use dialect::SqlDialect;
pub use error::StorageError;
pub use message_repo::MessageRepository;
pub use models::{MessageRecord, SenderInfo};
