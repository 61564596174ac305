use async_trait::async_trait;
use tracing::info;

use folio_core::event::AnalyticsEvent;

use super::EventSink;

/// [`EventSink`] that serializes each event into a structured log line.
pub struct LogEventSink;

#[async_trait]
impl EventSink for LogEventSink {
    async fn record(&self, event: &AnalyticsEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(event)?;
        info!(
            target: "folio::analytics",
            event_type = %event.event_type,
            payload = %payload,
            "Analytics event received"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::event::Attribution;

    #[tokio::test]
    async fn log_sink_accepts_events() {
        let event = AnalyticsEvent {
            timestamp: "2026-10-19T00:00:00.000Z".to_string(),
            event_type: "page_view".to_string(),
            event_label: None,
            path: "/".to_string(),
            referrer: None,
            user_agent: None,
            client_identifier: "unknown".to_string(),
            attribution: Attribution::default(),
        };
        assert!(LogEventSink.record(&event).await.is_ok());
    }
}
