//! Wire types for the remote assistant backend.

use serde::{Deserialize, Serialize};

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// `None` on the first call of a session.
    pub session_id: Option<String>,
}

/// Escalation decision attached to every `/chat` reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    #[serde(default)]
    pub should_escalate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_type: Option<String>,
}

/// Body returned by `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub tools_used: Vec<String>,
    #[serde(default)]
    pub escalation: EscalationDecision,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub escalation_message: Option<String>,
    /// Set to `"create_task"` by task-management backends that want the
    /// client to add a card.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
}

/// Body of the HR backend's `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrChatRequest {
    pub message: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
}

/// Body returned by the HR backend's `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrChatResponse {
    pub response: String,
    pub user_id: String,
    pub session_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
