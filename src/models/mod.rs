//! Domain models for taskpilot.
//!
//! # Core Concepts
//!
//! ## Board data
//!
//! - [`Board`]: Top-level container owning an ordered sequence of lists.
//! - [`BoardList`]: A workflow column owning an ordered sequence of cards.
//! - [`Card`]: A single task unit. Cards created by the chat assistant carry
//!   `ai_suggested = true`, and the flag is never cleared afterwards.
//!
//! Ownership is strict: every list lives inside exactly one board and every
//! card inside exactly one list. Insertion order is the only ordering.
//!
//! ## Conversation data
//!
//! - [`TranscriptEntry`]: One line of the chat panel's running transcript.
//! - [`FeedbackRecord`] / [`EscalationRecord`]: Append-only records written by
//!   the chat panel and mirrored to the backend on a best-effort basis.
//! - [`ChatRequest`] / [`ChatResponse`]: Wire types of the remote assistant.

mod board;
mod chat;
mod record;
mod transcript;

pub use board::*;
pub use chat::*;
pub use record::*;
pub use transcript::*;
