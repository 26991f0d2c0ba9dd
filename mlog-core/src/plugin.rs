//! Plugin lifecycle as seen by the host runtime.

use async_trait::async_trait;

use crate::event::MessageEvent;

/// A passive event consumer: initialized once, fed every message event, terminated on shutdown.
///
/// Methods take `&self` so one instance can be shared (`Arc`) across concurrently running
/// `handle` tasks. `Error` lets hosts branch on the failure kind.
#[async_trait]
pub trait Plugin: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Registered plugin name.
    fn name(&self) -> &str;

    /// Acquires resources. A failure leaves the plugin unusable; the host decides whether to disable it.
    async fn initialize(&self) -> Result<(), Self::Error>;

    /// Processes one message event.
    async fn handle(&self, event: &dyn MessageEvent) -> Result<(), Self::Error>;

    /// Releases resources. Must be safe to call when `initialize` never succeeded.
    async fn terminate(&self) -> Result<(), Self::Error>;
}
