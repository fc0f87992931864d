//! In-memory board/list/card model.
//!
//! # Invariants
//! - Every list is owned by exactly one board, every card by exactly one list.
//! - Insertion order is preserved and is the only ordering.
//! - Ids are assigned at creation and never change.
//!
//! Every operation is permissive: empty titles and ids that do not resolve are
//! silent no-ops. Creation returns the new id so callers can tell the two
//! outcomes apart, but a `None` is never an error.

mod seed;

pub use seed::sample_boards;

use chrono::Utc;

use crate::id::new_id;
use crate::models::{Board, BoardList, BoardStats, Card, CardMatch};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSet {
    boards: Vec<Board>,
}

impl BoardSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_boards(boards: Vec<Board>) -> Self {
        Self { boards }
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn into_boards(self) -> Vec<Board> {
        self.boards
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    // ============================================================
    // Mutations
    // ============================================================

    pub fn create_board(&mut self, title: &str) -> Option<String> {
        self.create_board_with_description(title, "")
    }

    pub fn create_board_with_description(&mut self, title: &str, description: &str) -> Option<String> {
        let title = non_empty(title)?;
        let board = Board {
            id: new_id("board"),
            title,
            description: description.trim().to_string(),
            lists: Vec::new(),
            created_at: Utc::now(),
        };
        let id = board.id.clone();
        self.boards.push(board);
        Some(id)
    }

    pub fn create_list(&mut self, board_id: &str, title: &str) -> Option<String> {
        let title = non_empty(title)?;
        let board = self.board_mut(board_id)?;
        let list = BoardList {
            id: new_id("list"),
            title,
            cards: Vec::new(),
            created_at: Utc::now(),
        };
        let id = list.id.clone();
        board.lists.push(list);
        Some(id)
    }

    pub fn create_card(
        &mut self,
        board_id: &str,
        list_id: &str,
        title: &str,
        ai_suggested: bool,
    ) -> Option<String> {
        self.create_card_with_description(board_id, list_id, title, "", ai_suggested)
    }

    pub fn create_card_with_description(
        &mut self,
        board_id: &str,
        list_id: &str,
        title: &str,
        description: &str,
        ai_suggested: bool,
    ) -> Option<String> {
        let title = non_empty(title)?;
        let list = self.list_mut(board_id, list_id)?;
        let card = Card {
            id: new_id("card"),
            title,
            description: description.trim().to_string(),
            ai_suggested,
            created_at: Utc::now(),
        };
        let id = card.id.clone();
        list.cards.push(card);
        Some(id)
    }

    /// Replace a card's title in place. Returns whether anything changed.
    ///
    /// An empty replacement title is ignored, same as on creation.
    pub fn update_card_title(
        &mut self,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        new_title: &str,
    ) -> bool {
        let Some(title) = non_empty(new_title) else {
            return false;
        };
        match self.card_mut(board_id, list_id, card_id) {
            Some(card) => {
                card.title = title;
                true
            }
            None => false,
        }
    }

    pub fn update_card_description(
        &mut self,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        description: &str,
    ) -> bool {
        match self.card_mut(board_id, list_id, card_id) {
            Some(card) => {
                card.description = description.trim().to_string();
                true
            }
            None => false,
        }
    }

    /// Remove a board with every list and card it owns.
    pub fn delete_board(&mut self, board_id: &str) -> Option<Board> {
        let index = self.boards.iter().position(|b| b.id == board_id)?;
        Some(self.boards.remove(index))
    }

    /// Remove a list with every card it owns.
    pub fn delete_list(&mut self, board_id: &str, list_id: &str) -> Option<BoardList> {
        let board = self.board_mut(board_id)?;
        let index = board.lists.iter().position(|l| l.id == list_id)?;
        Some(board.lists.remove(index))
    }

    // ============================================================
    // Lookup
    // ============================================================

    pub fn find_board(&self, board_id: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.id == board_id)
    }

    pub fn find_list(&self, board_id: &str, list_id: &str) -> Option<&BoardList> {
        self.find_board(board_id)?
            .lists
            .iter()
            .find(|l| l.id == list_id)
    }

    pub fn find_card(&self, board_id: &str, list_id: &str, card_id: &str) -> Option<&Card> {
        self.find_list(board_id, list_id)?
            .cards
            .iter()
            .find(|c| c.id == card_id)
    }

    /// The first board's first list, where the assistant drops new cards.
    pub fn first_list(&self) -> Option<(&Board, &BoardList)> {
        let board = self.boards.first()?;
        let list = board.lists.first()?;
        Some((board, list))
    }

    // ============================================================
    // Queries
    // ============================================================

    /// Case-insensitive substring search over card titles and descriptions.
    pub fn search_cards(&self, query: &str) -> Vec<CardMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for board in &self.boards {
            for list in &board.lists {
                for card in &list.cards {
                    if card.title.to_lowercase().contains(&needle)
                        || card.description.to_lowercase().contains(&needle)
                    {
                        matches.push(CardMatch {
                            card_id: card.id.clone(),
                            title: card.title.clone(),
                            description: card.description.clone(),
                            list_title: list.title.clone(),
                            board_title: board.title.clone(),
                        });
                    }
                }
            }
        }
        matches
    }

    pub fn stats(&self) -> BoardStats {
        let total_lists = self.boards.iter().map(|b| b.lists.len()).sum();
        let cards = self
            .boards
            .iter()
            .flat_map(|b| &b.lists)
            .flat_map(|l| &l.cards);

        let (total_cards, ai_suggested_cards) =
            cards.fold((0usize, 0usize), |(total, ai), card| {
                (total + 1, ai + usize::from(card.ai_suggested))
            });

        let rate = ai_suggested_cards as f64 / total_cards.max(1) as f64 * 100.0;

        BoardStats {
            total_boards: self.boards.len(),
            total_lists,
            total_cards,
            ai_suggested_cards,
            ai_usage_rate: (rate * 100.0).round() / 100.0,
        }
    }

    pub fn card_count(&self) -> usize {
        self.boards.iter().map(Board::card_count).sum()
    }

    fn board_mut(&mut self, board_id: &str) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.id == board_id)
    }

    fn list_mut(&mut self, board_id: &str, list_id: &str) -> Option<&mut BoardList> {
        self.board_mut(board_id)?
            .lists
            .iter_mut()
            .find(|l| l.id == list_id)
    }

    fn card_mut(&mut self, board_id: &str, list_id: &str, card_id: &str) -> Option<&mut Card> {
        self.list_mut(board_id, list_id)?
            .cards
            .iter_mut()
            .find(|c| c.id == card_id)
    }
}

fn non_empty(title: &str) -> Option<String> {
    let trimmed = title.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
