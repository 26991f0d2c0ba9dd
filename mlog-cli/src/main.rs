//! mlog CLI: run the message logger over line-delimited JSON events, or query stored messages.
//! Config from a JSON file (--config) or env; LOG_FILE sets the log path, LOG_FORMAT=json switches to JSON lines.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use message_logger::MessageLogger;
use mlog_cli::{dispatch_lines, load_config, render_record, show_message, Cli, Commands};
use mlog_core::{LogFormat, Plugin};
use storage::MessageRepository;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_file = std::env::var("LOG_FILE").unwrap_or_else(|_| "logs/mlog.log".to_string());
    let log_format: LogFormat = std::env::var("LOG_FORMAT")
        .unwrap_or_default()
        .parse()
        .map_err(anyhow::Error::msg)?;
    mlog_core::init_tracing(&log_file, log_format)?;

    let config = load_config(cli.config.as_deref())?;
    let logger = Arc::new(MessageLogger::new(config));
    logger
        .initialize()
        .await
        .context("Initialize message logger")?;

    let result = match cli.command {
        Commands::Run { input } => {
            let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Open input {}", path.display()))?;
                    Box::new(BufReader::new(file))
                }
                None => Box::new(BufReader::new(tokio::io::stdin())),
            };
            handle_run(logger.clone(), reader).await
        }
        Commands::Show { message_id } => {
            with_repository(&logger, |repo| async move { handle_show(&repo, &message_id).await })
                .await
        }
        Commands::Recent { session, limit } => {
            with_repository(&logger, |repo| async move {
                handle_recent(&repo, &session, limit).await
            })
            .await
        }
        Commands::Count => {
            with_repository(&logger, |repo| async move {
                println!("{}", repo.count_messages().await?);
                Ok(())
            })
            .await
        }
    };

    logger.terminate().await.context("Terminate message logger")?;
    result
}

/// Dispatches events until input ends or Ctrl-C; events already started are still awaited.
async fn handle_run(
    logger: Arc<MessageLogger>,
    reader: Box<dyn AsyncBufRead + Unpin + Send>,
) -> Result<()> {
    let max_in_flight = logger.config().max_connections as usize;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available: run until EOF.
            std::future::pending::<()>().await;
        }
    };

    let summary = dispatch_lines(logger, reader, max_in_flight, shutdown).await?;
    if summary.interrupted {
        warn!("Interrupted, input not fully read");
    }
    println!(
        "Received: {}, Logged: {}, Failed: {}, Skipped: {}",
        summary.received, summary.logged, summary.failed, summary.skipped
    );
    Ok(())
}

async fn with_repository<F, Fut>(logger: &MessageLogger, f: F) -> Result<()>
where
    F: FnOnce(MessageRepository) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let repo = logger
        .repository()
        .await
        .context("Message logger is not ready")?;
    f(repo).await
}

async fn handle_show(repo: &MessageRepository, message_id: &str) -> Result<()> {
    println!("{}", show_message(repo, message_id).await?);
    Ok(())
}

async fn handle_recent(repo: &MessageRepository, session_id: &str, limit: i64) -> Result<()> {
    let records = repo.get_recent_messages_by_session(session_id, limit).await?;
    if records.is_empty() {
        println!("No messages for session {}", session_id);
        return Ok(());
    }
    for record in &records {
        println!("{}", render_record(record)?);
    }
    Ok(())
}
