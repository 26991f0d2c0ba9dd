//! CLI parser and config loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use message_logger::LoggerConfig;
use storage::{MessageRecord, MessageRepository};

#[derive(Parser, Debug)]
#[command(name = "mlog")]
#[command(about = "Message logger: persist chat message events to MySQL", long_about = None)]
#[command(version)]
pub struct Cli {
    /// JSON config file (host, port, username, password, database, ...). Env vars are used when absent.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Read line-delimited JSON message events (file or stdin) and store each one.
    Run {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Print one stored message.
    Show { message_id: String },
    /// Print the most recent messages of a session.
    Recent {
        #[arg(short, long)]
        session: String,
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// Print the number of stored messages.
    Count,
}

/// Load LoggerConfig from the JSON file if given, otherwise from environment.
pub fn load_config(path: Option<&Path>) -> Result<LoggerConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Read config file {}", path.display()))?;
            LoggerConfig::from_json(&raw)?
        }
        None => LoggerConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

/// Pretty JSON for a stored row, with the serialized columns expanded back into objects.
pub fn render_record(record: &MessageRecord) -> Result<String> {
    let view = serde_json::json!({
        "message_id": record.message_id,
        "platform_type": record.platform_type,
        "self_id": record.self_id,
        "session_id": record.session_id,
        "group_id": record.group_id,
        "sender": record.sender_info()?,
        "message_str": record.message_str,
        "raw_message": record.raw_message_value()?,
        "timestamp": record.timestamp,
    });
    Ok(serde_json::to_string_pretty(&view)?)
}

/// Rendered record for `show`; an unknown id is an error so the command exits non-zero.
pub async fn show_message(repo: &MessageRepository, message_id: &str) -> Result<String> {
    match repo.get_message_by_id(message_id).await? {
        Some(record) => render_record(&record),
        None => anyhow::bail!("Message {} not found", message_id),
    }
}
