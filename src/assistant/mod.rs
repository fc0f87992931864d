//! Chat assistant for the board.
//!
//! A [`ChatPanel`] answers through the remote backend when an
//! [`AssistantClient`] is configured and through the local keyword responder
//! otherwise. Failed remote calls become error entries; they are never
//! retried and never fall through to the local responder.

pub mod client;
pub mod fallback;
mod panel;
mod transcript;

pub use client::{AssistantClient, ClientError};
pub use panel::{ChatPanel, SubmitError, Timings, ESCALATION_CONTEXT_ENTRIES};
pub use transcript::{Cursor, PendingReply, Transcript};
