use async_trait::async_trait;

use folio_core::event::AnalyticsEvent;

pub mod log;

pub use log::LogEventSink;

/// Destination for tagged analytics events.
///
/// The server ships with [`LogEventSink`] only: events are written to the
/// operational log and never persisted. Tests inject capturing sinks through
/// [`crate::state::AppState::sink`].
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    async fn record(&self, event: &AnalyticsEvent) -> anyhow::Result<()>;
}
