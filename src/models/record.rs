use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transcript::TranscriptEntry;

/// Thumbs up or down on an assistant reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "up" | "+" | "helpful" => Some(Self::Up),
            "down" | "-" | "unhelpful" => Some(Self::Down),
            _ => None,
        }
    }
}

/// A rating of one transcript entry. Appended to the local feedback
/// collection, then mirrored to `POST /feedback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    /// Transcript entry being rated.
    pub message_id: String,
    pub rating: Rating,
    #[serde(default)]
    pub comment: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Always [`FEEDBACK_TYPE`].
    #[serde(rename = "type")]
    pub record_type: String,
}

pub const FEEDBACK_TYPE: &str = "feedback";

/// Issue category picked by the user when asking for human help.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Technical,
    Account,
    Feature,
    Bug,
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Account => "account",
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "technical" => Some(Self::Technical),
            "account" => Some(Self::Account),
            "feature" => Some(Self::Feature),
            "bug" => Some(Self::Bug),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A request for human follow-up.
///
/// Status and priority start at `open` / `normal`; nothing in the client
/// changes them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationRecord {
    pub id: String,
    /// Human-facing ticket number, e.g. `ESC-482913`.
    pub ticket_id: String,
    pub category: IssueCategory,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub priority: String,
    /// The last few transcript entries at submission time.
    pub context: Vec<TranscriptEntry>,
}

pub const ESCALATION_STATUS_OPEN: &str = "open";
pub const ESCALATION_PRIORITY_NORMAL: &str = "normal";
