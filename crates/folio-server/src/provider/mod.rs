use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::Serialize;
use thiserror::Error;

use folio_core::chat::ChatMessage;

pub mod groq;

pub use groq::GroqProvider;

/// Incremental text chunks of one completion, in arrival order.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Everything a provider needs for one streamed completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed stream frame: {0}")]
    Frame(#[from] serde_json::Error),

    #[error("provider error: {0}")]
    Upstream(String),
}

/// A streaming language-model backend.
///
/// Stored as `Arc<dyn CompletionProvider>` in [`crate::state::AppState`];
/// [`GroqProvider`] is the production implementation. Errors are not retried:
/// a failure before the first chunk is returned directly, a failure mid-stream
/// is yielded as the stream's last item.
#[async_trait]
pub trait CompletionProvider: Send + Sync + 'static {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<TokenStream, ProviderError>;
}
