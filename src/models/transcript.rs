use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chat::EscalationDecision;

/// What a transcript entry represents.
///
/// - `User`: Text the user typed
/// - `Thinking`: Transient placeholder while a reply is pending
/// - `Assistant`: A reply, remote or local
/// - `EscalationNotice`: Follow-up shown when the backend flags a reply for a human
/// - `Error`: A failed remote call
/// - `Notice`: Panel confirmations (ticket numbers, priority changes, thanks)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    User,
    Thinking,
    Assistant,
    EscalationNotice,
    Error,
    Notice,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Thinking => "thinking",
            Self::Assistant => "assistant",
            Self::EscalationNotice => "escalation_notice",
            Self::Error => "error",
            Self::Notice => "notice",
        }
    }
}

/// Where an assistant reply came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Remote,
    Local,
}

/// Metadata attached to remote assistant replies.
///
/// Local replies never carry a confidence score or tool list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMeta {
    /// Always within `[0, 1]`.
    pub confidence_score: f64,
    pub tools_used: Vec<String>,
    pub escalation: EscalationDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: String,
    pub kind: EntryKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ReplySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReplyMeta>,
    pub created_at: DateTime<Utc>,
}
