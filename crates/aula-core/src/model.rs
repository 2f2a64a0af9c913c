//! Conversation data model and response normalization.
//!
//! Wire shapes mirror the backend contract: requests carry `{message,
//! history}`, responses carry `{answer, sources}`. `sources` is the loose end
//! of that contract: entries may be bare strings or `{name, url}` objects,
//! and the whole field may be missing or malformed. [`Citation::normalize`]
//! collapses it into a typed list exactly once, so the renderer never
//! inspects raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Shown in place of an answer the backend omitted or left blank.
pub const FALLBACK_ANSWER: &str = "Something went wrong. Please try again.";

/// Speaker of a conversation turn. Serialized lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn, sent back to the backend so it can answer in context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for one exchange. Built fresh per send; `history` is a
/// snapshot of all resolved turns plus the user turn being asked about. The
/// in-flight placeholder is never part of it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ConversationTurn>,
}

/// A named source reference attached to an answer.
///
/// `Linked` URLs are always absolute: relative document paths from the
/// backend (e.g. `/docs/assessment.pdf`) are resolved against the chat
/// endpoint at normalization time, not at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Citation {
    /// Label with no resolvable link.
    Text(String),
    /// Label linking to a backend-hosted or absolute document URL.
    Linked { name: String, url: Url },
}

impl Citation {
    pub fn name(&self) -> &str {
        match self {
            Citation::Text(name) => name,
            Citation::Linked { name, .. } => name,
        }
    }

    pub fn url(&self) -> Option<&Url> {
        match self {
            Citation::Text(_) => None,
            Citation::Linked { url, .. } => Some(url),
        }
    }

    /// Collapse a raw `sources` value into typed citations.
    ///
    /// Anything that is not an array yields an empty list. Array entries that
    /// are neither strings nor objects are skipped, as are objects carrying
    /// neither a usable name nor a usable URL. A URL that fails to resolve
    /// against `endpoint` downgrades its entry to [`Citation::Text`].
    pub fn normalize(sources: &Value, endpoint: &Url) -> Vec<Citation> {
        let Some(entries) = sources.as_array() else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| Self::from_entry(entry, endpoint))
            .collect()
    }

    fn from_entry(entry: &Value, endpoint: &Url) -> Option<Citation> {
        match entry {
            Value::String(label) => {
                let name = label.trim();
                (!name.is_empty()).then(|| Citation::Text(name.to_string()))
            }
            Value::Object(fields) => {
                let raw_url = fields
                    .get("url")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|u| !u.is_empty());
                let name = fields
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .or(raw_url)?;
                match raw_url.and_then(|u| endpoint.join(u).ok()) {
                    Some(url) => Some(Citation::Linked {
                        name: name.to_string(),
                        url,
                    }),
                    None => Some(Citation::Text(name.to_string())),
                }
            }
            _ => None,
        }
    }
}

/// Normalized response: the answer text plus zero or more citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl ChatReply {
    /// Build a reply from the raw wire fields. An absent or blank answer
    /// falls back to [`FALLBACK_ANSWER`]; citations are normalized and
    /// URL-resolved in the same pass.
    pub fn from_wire(answer: Option<String>, sources: &Value, endpoint: &Url) -> Self {
        let answer = answer
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ANSWER.to_string());
        Self {
            answer,
            citations: Citation::normalize(sources, endpoint),
        }
    }
}
