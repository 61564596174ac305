use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use folio_core::config::LlmConfig;

use super::{CompletionProvider, CompletionRequest, ProviderError, TokenStream};

const CONNECT_TIMEOUT_SECONDS: u64 = 10;
/// Longest line accepted from the provider before the stream is abandoned.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Groq's OpenAI-compatible chat completions API, streamed over SSE.
pub struct GroqProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChunkFrame {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<UpstreamError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    message: String,
}

/// One decoded line of the provider's event stream.
#[derive(Debug, PartialEq)]
enum StreamLine {
    Token(String),
    Done,
    Skip,
}

fn decode_line(line: &str) -> Result<StreamLine, ProviderError> {
    let Some(data) = line.strip_prefix("data:") else {
        // Comments, `event:` fields, and blank separators.
        return Ok(StreamLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamLine::Done);
    }
    if data.is_empty() {
        return Ok(StreamLine::Skip);
    }

    let frame: ChunkFrame = serde_json::from_str(data)?;
    if let Some(err) = frame.error {
        return Err(ProviderError::Upstream(err.message));
    }
    let token = frame
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .unwrap_or_default();
    if token.is_empty() {
        Ok(StreamLine::Skip)
    } else {
        Ok(StreamLine::Token(token))
    }
}

/// Splits a byte stream into newline-terminated lines, refusing to buffer a
/// partial line longer than its limit.
struct LineBuffer {
    pending: Vec<u8>,
    limit: usize,
}

impl LineBuffer {
    fn new(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
        }
    }

    /// Append `chunk` and return every line it completed, trailing
    /// whitespace trimmed.
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ProviderError> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&raw).trim_end().to_string());
        }
        if self.pending.len() > self.limit {
            return Err(ProviderError::Upstream(format!(
                "stream line exceeded {} bytes",
                self.limit
            )));
        }
        Ok(lines)
    }
}

impl GroqProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn stream_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<TokenStream, ProviderError> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: &request.system,
        });
        messages.extend(request.messages.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));
        let body = ChatCompletionBody {
            model: &request.model,
            messages,
            stream: true,
        };

        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        debug!(model = %request.model, "Provider stream opened");

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut buffer = LineBuffer::new(MAX_LINE_BYTES);
            while let Some(chunk) = bytes.next().await {
                let lines = match chunk.map_err(ProviderError::from).and_then(|c| buffer.push(&c)) {
                    Ok(lines) => lines,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };
                for line in lines {
                    match decode_line(&line) {
                        Ok(StreamLine::Token(token)) => yield Ok(token),
                        Ok(StreamLine::Done) => return,
                        Ok(StreamLine::Skip) => {}
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }
            }
        };
        Ok(Box::pin(stream))
    }
}
