use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speaker of a chat message.
///
/// Roles are not validated: anything other than the three known values is
/// carried through as [`Role::Other`] and reaches the provider unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    System,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Other(raw) => raw,
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => Role::Other(raw),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical flat-text message sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A typed fragment of a segmented message. Only `"text"` segments carry
/// content today; attachments and tool parts are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }

    fn is_text(&self) -> bool {
        self.kind == "text"
    }
}

/// A chat message as it arrives from the chat widget.
///
/// The widget has shipped two wire formats: a flat `content` string and a
/// `parts` array of typed segments. Any JSON value decodes into this enum; a
/// message matching neither shape, or carrying no string `role`, becomes
/// [`RawInboundMessage::Unrecognized`] instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum RawInboundMessage {
    /// A string `content`. Any `parts` sent alongside are kept for display
    /// only and never reach the provider.
    Legacy {
        role: Role,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parts: Option<Vec<Segment>>,
    },
    Segmented { role: Role, parts: Vec<Segment> },
    Unrecognized { role: Role },
}

/// Loose JSON view of an inbound message, before shape resolution.
#[derive(Debug, Default, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    parts: Option<Value>,
}

fn decode_segments(items: Vec<Value>) -> Vec<Segment> {
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Segment>(item).ok())
        .collect()
}

impl From<Value> for RawInboundMessage {
    fn from(value: Value) -> Self {
        let WireMessage {
            role,
            content,
            parts,
        } = serde_json::from_value(value).unwrap_or_default();

        let role = match role {
            Some(Value::String(role)) => Role::from(role),
            other => {
                let raw = other.map(|v| v.to_string()).unwrap_or_default();
                return RawInboundMessage::Unrecognized {
                    role: Role::Other(raw),
                };
            }
        };

        match (content, parts) {
            (Some(Value::String(content)), parts) => RawInboundMessage::Legacy {
                role,
                content,
                parts: match parts {
                    Some(Value::Array(items)) => Some(decode_segments(items)),
                    _ => None,
                },
            },
            (_, Some(Value::Array(items))) => RawInboundMessage::Segmented {
                role,
                parts: decode_segments(items),
            },
            _ => RawInboundMessage::Unrecognized { role },
        }
    }
}

impl RawInboundMessage {
    pub fn role(&self) -> &Role {
        match self {
            RawInboundMessage::Legacy { role, .. }
            | RawInboundMessage::Segmented { role, .. }
            | RawInboundMessage::Unrecognized { role } => role,
        }
    }

    /// Display text of the message: the legacy string, or the in-order
    /// concatenation of every text segment. An empty legacy string falls back
    /// to any `parts` sent with it. Empty when neither applies.
    pub fn text(&self) -> String {
        match self {
            RawInboundMessage::Legacy {
                content,
                parts: Some(parts),
                ..
            } if content.is_empty() => join_text_segments(parts),
            RawInboundMessage::Legacy { content, .. } => content.clone(),
            RawInboundMessage::Segmented { parts, .. } => join_text_segments(parts),
            RawInboundMessage::Unrecognized { .. } => String::new(),
        }
    }

    /// Resolve into a canonical message, or `None` when it carries no text.
    /// A string `content` is used unchanged, even when empty.
    pub fn into_canonical(self) -> Option<ChatMessage> {
        let message = match self {
            RawInboundMessage::Legacy { role, content, .. } => ChatMessage { role, content },
            RawInboundMessage::Segmented { role, parts } => ChatMessage {
                role,
                content: join_text_segments(&parts),
            },
            RawInboundMessage::Unrecognized { .. } => return None,
        };
        (!message.content.is_empty()).then_some(message)
    }
}

impl From<ChatMessage> for RawInboundMessage {
    fn from(message: ChatMessage) -> Self {
        RawInboundMessage::Legacy {
            role: message.role,
            content: message.content,
            parts: None,
        }
    }
}

fn join_text_segments(parts: &[Segment]) -> String {
    parts
        .iter()
        .filter(|part| part.is_text())
        .map(|part| part.text.as_deref().unwrap_or(""))
        .collect()
}

/// Outbound normalization: canonicalise every message and drop the ones that
/// resolve to empty content, keeping the relative order of the rest.
pub fn normalize_messages(messages: Vec<RawInboundMessage>) -> Vec<ChatMessage> {
    messages
        .into_iter()
        .filter_map(RawInboundMessage::into_canonical)
        .collect()
}

/// Inbound extraction for display. Messages with no text are suppressed
/// entirely rather than rendered as blank bubbles.
pub fn render_transcript(messages: &[RawInboundMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .filter_map(|message| {
            let text = message.text();
            (!text.is_empty()).then(|| ChatMessage::new(message.role().clone(), text))
        })
        .collect()
}
