//! taskpilot: a Kanban board (boards → lists → cards) with a chat assistant
//! that can turn requests into cards, plus a separate HR question panel.
//!
//! The [`app::App`] composition root owns the model and its store; the chat
//! panels in [`assistant`] and [`hr`] are driven alongside it.

pub mod app;
pub mod assistant;
pub mod board;
pub mod config;
pub mod db;
pub mod hr;
pub mod id;
pub mod models;
pub mod render;
pub mod store;
