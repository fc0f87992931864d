use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A board: the top-level unit of the task board collection.
///
/// Deleting a board is a hard delete that cascades to every list and card it
/// owns. There is no archive or undo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lists: Vec<BoardList>,
    pub created_at: DateTime<Utc>,
}

/// A workflow column inside a board (e.g. "To Do", "Done").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
}

/// A single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    /// Free text, may be empty.
    #[serde(default)]
    pub description: String,
    /// Set when the chat assistant created the card rather than a person.
    #[serde(default)]
    pub ai_suggested: bool,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum()
    }
}

/// A card hit from [`crate::board::BoardSet::search_cards`], with the titles of
/// its owning list and board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMatch {
    pub card_id: String,
    pub title: String,
    pub description: String,
    pub list_title: String,
    pub board_title: String,
}

/// Aggregate counts over the whole board collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total_boards: usize,
    pub total_lists: usize,
    pub total_cards: usize,
    pub ai_suggested_cards: usize,
    /// Percentage of cards created by the assistant, rounded to two decimals.
    pub ai_usage_rate: f64,
}
