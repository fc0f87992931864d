//! HR question panel.
//!
//! A separate transcript that talks to an HR backend's `POST /chat`. The
//! backend assigns a user id and session id on the first reply; both are sent
//! back on every later question.

use std::time::Duration;

use crate::assistant::client::Backend;
use crate::assistant::{ClientError, PendingReply, Transcript};
use crate::models::{EntryKind, HrChatRequest, HrChatResponse, ReplySource, TranscriptEntry};

const THINKING_TEXT: &str = "Looking that up…";

#[derive(Debug, Clone)]
pub struct HrClient {
    backend: Backend,
}

impl HrClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            backend: Backend::new(base_url, api_key, timeout)?,
        })
    }

    pub async fn ask(&self, request: &HrChatRequest) -> Result<HrChatResponse, ClientError> {
        self.backend.post("/chat", request).await
    }
}

pub struct HrPanel {
    client: HrClient,
    transcript: Transcript,
    user_id: Option<String>,
    session_id: Option<String>,
}

impl HrPanel {
    pub fn new(client: HrClient) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            user_id: None,
            session_id: None,
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        self.transcript.entries()
    }

    /// Ask one question. Returns the id of the reply or error entry, or
    /// `None` for blank input.
    pub async fn ask(&mut self, question: &str) -> Option<String> {
        let pending = self.begin(question)?;
        Some(self.finish(pending).await)
    }

    /// Record the question and show the lookup placeholder until
    /// [`finish`](Self::finish) is called.
    pub fn begin(&mut self, question: &str) -> Option<PendingReply> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        Some(self.transcript.begin(question, THINKING_TEXT))
    }

    pub async fn finish(&mut self, pending: PendingReply) -> String {
        let request = HrChatRequest {
            message: pending.message().to_string(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
        };
        let result = self.client.ask(&request).await;
        self.transcript.remove(pending.placeholder_id());

        match result {
            Ok(response) => {
                if self.user_id.is_none() {
                    self.user_id = Some(response.user_id);
                }
                if self.session_id.is_none() {
                    self.session_id = Some(response.session_id);
                }
                self.transcript
                    .push_reply(response.response, ReplySource::Remote, None)
            }
            Err(e) => {
                tracing::warn!("HR request failed: {}", e);
                self.transcript.push(
                    EntryKind::Error,
                    format!("The HR assistant is unavailable right now. {}", e),
                )
            }
        }
    }
}
