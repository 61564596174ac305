use std::sync::Arc;

use folio_core::{config::Config, site::SiteContent};

use crate::{
    provider::{CompletionProvider, GroqProvider, ProviderError},
    sink::{EventSink, LogEventSink},
};

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Everything here is immutable after startup; handlers only read.
pub struct AppState {
    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Portfolio content feeding the system prompt and `/api/site`.
    pub site: Arc<SiteContent>,

    /// Completion backend for `/api/chat`. Defaults to [`GroqProvider`].
    pub provider: Arc<dyn CompletionProvider>,

    /// Destination for tagged analytics events. Defaults to [`LogEventSink`].
    pub sink: Arc<dyn EventSink>,
}

impl AppState {
    /// Construct the production state: Groq provider, log-only event sink.
    pub fn new(config: Config, site: SiteContent) -> Result<Self, ProviderError> {
        let provider = GroqProvider::new(&config.llm)?;
        Ok(Self {
            config: Arc::new(config),
            site: Arc::new(site),
            provider: Arc::new(provider),
            sink: Arc::new(LogEventSink),
        })
    }
}
