//! Event dispatcher: parses line-delimited JSON events and hands each to the plugin as its own task.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use mlog_core::{InboundMessage, Plugin};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, instrument, warn};

/// Outcome counts of one dispatch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-blank input lines.
    pub received: usize,
    pub logged: usize,
    pub failed: usize,
    /// Lines that did not parse as a valid event.
    pub skipped: usize,
    /// Reading stopped on the shutdown signal rather than EOF.
    pub interrupted: bool,
}

impl RunSummary {
    fn record(&mut self, joined: std::result::Result<bool, JoinError>) {
        match joined {
            Ok(true) => self.logged += 1,
            Ok(false) => self.failed += 1,
            Err(e) => {
                error!(error = %e, "Event task panicked or was cancelled");
                self.failed += 1;
            }
        }
    }
}

/// Reads events until EOF or until `shutdown` resolves. Each event is handled in a spawned task
/// so inserts overlap, with at most `max_in_flight` tasks running (normally the pool's
/// `max_connections`). Reading pauses while the limit is reached.
///
/// Tasks already started are always awaited, also after shutdown. Per-event failures are logged
/// and counted, never fatal to the run.
#[instrument(skip(plugin, reader, shutdown), fields(plugin = %plugin.name()))]
pub async fn dispatch_lines<P, R, S>(
    plugin: Arc<P>,
    reader: R,
    max_in_flight: usize,
    shutdown: S,
) -> Result<RunSummary>
where
    P: Plugin + 'static,
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    let max_in_flight = max_in_flight.max(1);
    let mut summary = RunSummary::default();
    let mut tasks = JoinSet::new();
    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown => {
                warn!(in_flight = tasks.len(), "Shutdown requested, draining in-flight events");
                summary.interrupted = true;
                break;
            }
            next = lines.next_line() => next,
        };

        let Some(line) = next? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.received += 1;

        let event = match InboundMessage::from_json(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, line = summary.received, "Skipping malformed event");
                summary.skipped += 1;
                continue;
            }
        };

        if tasks.len() >= max_in_flight {
            if let Some(joined) = tasks.join_next().await {
                summary.record(joined);
            }
        }

        let plugin = plugin.clone();
        tasks.spawn(async move {
            match plugin.handle(&event).await {
                Ok(()) => true,
                Err(e) => {
                    error!(
                        error = %e,
                        message_id = %event.message_id,
                        "Plugin failed to handle event"
                    );
                    false
                }
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        summary.record(joined);
    }

    info!(
        received = summary.received,
        logged = summary.logged,
        failed = summary.failed,
        skipped = summary.skipped,
        interrupted = summary.interrupted,
        "Dispatch finished"
    );
    Ok(summary)
}
