use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use folio_core::{
    chat::{normalize_messages, RawInboundMessage},
    prompt::build_system_prompt,
};

use crate::{
    error::AppError,
    provider::{CompletionProvider, CompletionRequest},
    state::AppState,
};

/// Header announcing the UI message stream protocol to the chat widget.
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<RawInboundMessage>,
}

/// `POST /api/chat`: stream an assistant reply for a conversation.
///
/// ## Request
/// `{ "messages": [...] }` where each message is either `{role, content}` or
/// `{role, parts: [{type, text}]}`. Messages without text are dropped before
/// the provider call.
///
/// ## Response
/// `text/event-stream` of UI message frames:
/// `start`, `text-start`, one `text-delta` per provider chunk, `text-end`,
/// `finish`, then `[DONE]`. A provider failure emits a single `error` frame
/// and ends the stream there.
#[tracing::instrument(skip_all)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    info!(
        received = request.messages.len(),
        has_api_key = state.config.llm.api_key.is_some(),
        "Chat request"
    );

    let messages = normalize_messages(request.messages);
    debug!(normalized = messages.len(), "Normalized chat messages");

    let completion = CompletionRequest {
        model: state.config.llm.model.clone(),
        system: build_system_prompt(&state.site),
        messages,
    };
    let message_id = format!("msg_{}", uuid::Uuid::new_v4().simple());
    let stream = ui_message_stream(Arc::clone(&state.provider), completion, message_id);

    Ok((
        [
            (HeaderName::from_static(UI_MESSAGE_STREAM_HEADER), "v1"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Sse::new(stream).keep_alive(KeepAlive::default()),
    ))
}

fn frame(value: Value) -> Event {
    Event::default().data(value.to_string())
}

/// Translate provider chunks into UI message stream frames.
fn ui_message_stream(
    provider: Arc<dyn CompletionProvider>,
    request: CompletionRequest,
    id: String,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static {
    async_stream::stream! {
        yield Ok(frame(json!({ "type": "start" })));

        let mut tokens = match provider.stream_completion(request).await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!(error = %e, "Completion request failed");
                yield Ok(frame(json!({ "type": "error", "errorText": e.to_string() })));
                return;
            }
        };

        yield Ok(frame(json!({ "type": "text-start", "id": id })));
        while let Some(chunk) = tokens.next().await {
            match chunk {
                Ok(delta) => {
                    yield Ok(frame(json!({ "type": "text-delta", "id": id, "delta": delta })));
                }
                Err(e) => {
                    error!(error = %e, "Completion stream failed");
                    yield Ok(frame(json!({ "type": "error", "errorText": e.to_string() })));
                    return;
                }
            }
        }
        yield Ok(frame(json!({ "type": "text-end", "id": id })));
        yield Ok(frame(json!({ "type": "finish" })));
        yield Ok(Event::default().data("[DONE]"));
    }
}
