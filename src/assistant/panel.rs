//! The chat panel: transcript, remote/local replies, feedback and escalation.
//!
//! # Deferred entries
//! Escalation notices, urgent-priority notices, board refreshes and record
//! mirroring run as spawned tasks owned by the panel. [`ChatPanel::settle`]
//! waits for all of them; [`ChatPanel::close`] cancels the ones still pending.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinSet;

use super::client::AssistantClient;
use super::fallback;
use super::transcript::{PendingReply, Transcript};
use crate::app::App;
use crate::id::{new_id, ticket_id};
use crate::models::*;
use crate::store::Store;

/// How many transcript entries an escalation carries as context.
pub const ESCALATION_CONTEXT_ENTRIES: usize = 5;

const THINKING_TEXT: &str = "Thinking…";

/// Whole-word urgency markers. A `non` prefix is captured so it can be ruled out.
static URGENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(non-?\s*)?(?:urgent|critical)\b").expect("valid urgency regex")
});

/// Delays before deferred transcript entries and refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub escalation_notice: Duration,
    pub board_refresh: Duration,
    pub priority_notice: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            escalation_notice: Duration::from_millis(1000),
            board_refresh: Duration::from_millis(2000),
            priority_notice: Duration::from_millis(1500),
        }
    }
}

impl Timings {
    /// No delays at all.
    pub fn immediate() -> Self {
        Self {
            escalation_notice: Duration::ZERO,
            board_refresh: Duration::ZERO,
            priority_notice: Duration::ZERO,
        }
    }
}

/// Client-side rejection of an escalation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please describe the issue before submitting")]
    EmptyDescription,
}

pub struct ChatPanel {
    client: Option<AssistantClient>,
    store: Store,
    transcript: Arc<Mutex<Transcript>>,
    session_id: Option<String>,
    timings: Timings,
    pending: JoinSet<()>,
    remote_snapshot: Arc<Mutex<Option<Value>>>,
    rng: StdRng,
}

impl ChatPanel {
    /// A panel that answers from the local responder only.
    pub fn local(store: Store) -> Self {
        Self::build(None, store)
    }

    /// A panel backed by a remote assistant.
    pub fn remote(client: AssistantClient, store: Store) -> Self {
        Self::build(Some(client), store)
    }

    fn build(client: Option<AssistantClient>, store: Store) -> Self {
        Self {
            client,
            store,
            transcript: Arc::new(Mutex::new(Transcript::new())),
            session_id: None,
            timings: Timings::default(),
            pending: JoinSet::new(),
            remote_snapshot: Arc::new(Mutex::new(None)),
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Make canned reply selection reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Session token handed out by the backend, once it has sent one.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Snapshot of the transcript.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .entries()
            .to_vec()
    }

    /// The last `/boards` payload pulled after a tool-using reply.
    pub fn remote_snapshot(&self) -> Option<Value> {
        self.remote_snapshot
            .lock()
            .expect("snapshot lock poisoned")
            .clone()
    }

    // ============================================================
    // Chat
    // ============================================================

    /// Handle one user message. Returns the id of the entry that answers it
    /// (a reply or an error), or `None` for blank input.
    pub async fn send(&mut self, app: &mut App, text: &str) -> Option<String> {
        let pending = self.begin(text)?;
        Some(self.finish(app, pending).await)
    }

    /// Record a user message and put up the thinking placeholder.
    ///
    /// The placeholder stays in [`entries`](Self::entries) until the returned
    /// reply is passed to [`finish`](Self::finish). Blank input yields `None`.
    pub fn begin(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.reap();
        Some(self.lock().begin(text, THINKING_TEXT))
    }

    /// Produce the answer for a pending message, replacing its placeholder.
    /// Returns the id of the reply or error entry.
    pub async fn finish(&mut self, app: &mut App, pending: PendingReply) -> String {
        let text = pending.message();
        let placeholder = pending.placeholder_id();
        match self.client.clone() {
            Some(client) => self.send_remote(&client, app, text, placeholder).await,
            None => self.send_local(app, text, placeholder),
        }
    }

    fn send_local(&mut self, app: &mut App, text: &str, placeholder: &str) -> String {
        let reply = fallback::respond(app, text, &mut self.rng);
        tracing::debug!("Local reply ({})", reply.intent.as_str());

        let mut transcript = self.lock();
        transcript.remove(placeholder);
        transcript.push_reply(reply.text, ReplySource::Local, None)
    }

    async fn send_remote(
        &mut self,
        client: &AssistantClient,
        app: &mut App,
        text: &str,
        placeholder: &str,
    ) -> String {
        let request = ChatRequest {
            message: text.to_string(),
            session_id: self.session_id.clone(),
        };

        let response = match client.chat(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Assistant request failed: {}", e);
                let mut transcript = self.lock();
                transcript.remove(placeholder);
                return transcript.push(
                    EntryKind::Error,
                    format!("Sorry, I couldn't reach the assistant. {}", e),
                );
            }
        };

        if self.session_id.is_none() {
            if let Some(session_id) = response.session_id.clone() {
                tracing::debug!("Assistant session {}", session_id);
                self.session_id = Some(session_id);
            }
        }

        let meta = ReplyMeta {
            confidence_score: clamp_confidence(response.confidence_score),
            tools_used: response.tools_used.clone(),
            escalation: response.escalation.clone(),
        };

        let reply_id = {
            let mut transcript = self.lock();
            transcript.remove(placeholder);
            transcript.push_reply(response.response.clone(), ReplySource::Remote, Some(meta))
        };

        if response.action.as_deref() == Some("create_task") {
            if let Some(name) = response.task_name.as_deref() {
                add_suggested_card(app, name);
            }
        }

        if response.escalation.should_escalate {
            let notice = response.escalation_message.clone().unwrap_or_else(|| {
                escalation_notice_text(response.escalation.escalation_type.as_deref())
            });
            self.defer_entry(
                EntryKind::EscalationNotice,
                notice,
                self.timings.escalation_notice,
            );
        }

        if !response.tools_used.is_empty() {
            self.schedule_refresh(client.clone());
        }

        reply_id
    }

    // ============================================================
    // Feedback & escalation
    // ============================================================

    /// Rate an assistant reply. Unknown ids and non-reply entries are ignored.
    pub fn rate(
        &mut self,
        entry_id: &str,
        rating: Rating,
        comment: Option<&str>,
    ) -> Option<FeedbackRecord> {
        let is_reply = self
            .lock()
            .get(entry_id)
            .is_some_and(|e| e.kind == EntryKind::Assistant);
        if !is_reply {
            return None;
        }

        let record = FeedbackRecord {
            id: new_id("fb"),
            message_id: entry_id.to_string(),
            rating,
            comment: comment
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            timestamp: Utc::now(),
            record_type: FEEDBACK_TYPE.to_string(),
        };

        if let Err(e) = self.store.append_feedback(record.clone()) {
            tracing::warn!("Failed to save feedback: {}", e);
        }

        if let Some(client) = self.client.clone() {
            let mirrored = record.clone();
            self.pending.spawn(async move {
                if let Err(e) = client.send_feedback(&mirrored).await {
                    tracing::warn!("Failed to mirror feedback {}: {}", mirrored.id, e);
                }
            });
        }

        Some(record)
    }

    /// File a request for human follow-up.
    ///
    /// The record is stored locally first; the backend copy is best effort.
    /// Descriptions mentioning urgency get a second, delayed notice.
    pub fn escalate(
        &mut self,
        category: IssueCategory,
        description: &str,
    ) -> Result<EscalationRecord, SubmitError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(SubmitError::EmptyDescription);
        }

        let record = EscalationRecord {
            id: new_id("esc"),
            ticket_id: ticket_id(),
            category,
            description: description.to_string(),
            timestamp: Utc::now(),
            status: ESCALATION_STATUS_OPEN.to_string(),
            priority: ESCALATION_PRIORITY_NORMAL.to_string(),
            context: self.lock().last(ESCALATION_CONTEXT_ENTRIES),
        };

        if let Err(e) = self.store.append_escalation(record.clone()) {
            tracing::warn!("Failed to save escalation: {}", e);
        }
        tracing::info!("Escalation {} filed ({})", record.ticket_id, category.as_str());

        if let Some(client) = self.client.clone() {
            let mirrored = record.clone();
            self.pending.spawn(async move {
                if let Err(e) = client.send_escalation(&mirrored).await {
                    tracing::warn!("Failed to mirror escalation {}: {}", mirrored.ticket_id, e);
                }
            });
        }

        self.lock().push(
            EntryKind::Notice,
            format!(
                "Your request has been escalated. Ticket {} is open and a team member will follow up.",
                record.ticket_id
            ),
        );

        if is_urgent(description) {
            self.defer_entry(
                EntryKind::Notice,
                format!(
                    "Ticket {} was marked urgent and moved to the priority queue.",
                    record.ticket_id
                ),
                self.timings.priority_notice,
            );
        }

        Ok(record)
    }

    // ============================================================
    // Deferred work
    // ============================================================

    /// Wait for every deferred entry, refresh and mirror to finish.
    pub async fn settle(&mut self) {
        while let Some(result) = self.pending.join_next().await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    tracing::warn!("Deferred chat task failed: {}", e);
                }
            }
        }
    }

    /// Cancel deferred entries that have not fired yet.
    pub fn close(&mut self) {
        self.pending.abort_all();
    }

    fn defer_entry(&mut self, kind: EntryKind, text: String, delay: Duration) {
        let transcript = Arc::clone(&self.transcript);
        self.pending.spawn(async move {
            tokio::time::sleep(delay).await;
            transcript
                .lock()
                .expect("transcript lock poisoned")
                .push(kind, text);
        });
    }

    fn schedule_refresh(&mut self, client: AssistantClient) {
        let snapshot = Arc::clone(&self.remote_snapshot);
        let delay = self.timings.board_refresh;
        self.pending.spawn(async move {
            tokio::time::sleep(delay).await;
            match client.list_boards().await {
                Ok(boards) => {
                    tracing::debug!("Pulled remote board listing");
                    *snapshot.lock().expect("snapshot lock poisoned") = Some(boards);
                }
                Err(e) => tracing::warn!("Board refresh failed: {}", e),
            }
        });
    }

    fn reap(&mut self) {
        while self.pending.try_join_next().is_some() {}
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Transcript> {
        self.transcript.lock().expect("transcript lock poisoned")
    }
}

fn add_suggested_card(app: &mut App, name: &str) {
    let target = app
        .boards()
        .first_list()
        .map(|(board, list)| (board.id.clone(), list.id.clone()));

    match target {
        Some((board_id, list_id)) => {
            app.create_card(&board_id, &list_id, name, true);
        }
        None => tracing::warn!("Assistant suggested \"{}\" but there is no list to add it to", name),
    }
}

fn clamp_confidence(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

fn is_urgent(description: &str) -> bool {
    URGENT_RE
        .captures_iter(description)
        .any(|caps| caps.get(1).is_none())
}

fn escalation_notice_text(escalation_type: Option<&str>) -> String {
    let detail = match escalation_type {
        Some("sensitive_content") => "This looks like something a person should review.",
        Some("user_requested") => "You asked for a person, so I'm bringing one in.",
        Some("low_confidence") => "I'm not confident in that answer.",
        Some("repeated_attempts") => "We've gone back and forth on this a few times.",
        _ => "This request needs a closer look.",
    };
    format!("{} A team member has been notified and will follow up.", detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
    }

    #[test]
    fn urgency_keywords_ignore_case() {
        assert!(is_urgent("This is URGENT"));
        assert!(is_urgent("critical outage"));
        assert!(!is_urgent("whenever you get a chance"));
    }

    #[test]
    fn urgency_needs_the_whole_word() {
        assert!(!is_urgent("Non-critical: typo on the settings page"));
        assert!(!is_urgent("noncritical styling glitch"));
        assert!(!is_urgent("Criticality review is next month"));
        assert!(!is_urgent("Please be less insurgent"));
        assert!(is_urgent("Non-critical for me but critical for the team"));
    }

    #[tokio::test]
    async fn placeholder_is_up_until_the_reply_is_finished() {
        let mut app = App::load(Store::memory());
        let mut panel = ChatPanel::local(Store::memory()).with_seed(7);

        let pending = panel.begin("hello there").unwrap();
        let entries = panel.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].kind, EntryKind::Thinking);
        assert_eq!(entries[1].text, THINKING_TEXT);
        assert_eq!(entries[1].id, pending.placeholder_id());

        let reply = panel.finish(&mut app, pending).await;
        let entries = panel.entries();
        assert!(entries.iter().all(|e| e.kind != EntryKind::Thinking));
        assert_eq!(entries.last().unwrap().id, reply);
    }

    #[tokio::test]
    async fn blank_messages_are_ignored() {
        let mut app = App::load(Store::memory());
        let mut panel = ChatPanel::local(Store::memory());

        assert!(panel.send(&mut app, "   ").await.is_none());
        assert!(panel.begin("").is_none());
        assert!(panel.entries().is_empty());
    }
}
