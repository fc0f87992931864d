//! Application state and the mutate → persist → render cycle.

use crate::board::{sample_boards, BoardSet};
use crate::render::{render_boards, RenderOptions};
use crate::store::Store;

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Owns the board model and its store.
///
/// Every mutation that changes the model is followed by a full write of the
/// board collection and a full re-render. A failed write is logged and the
/// in-memory change is kept.
///
/// When the stored collection could not be read at startup, writes are held
/// back until a later read succeeds, so an unreadable store is never
/// overwritten.
pub struct App {
    boards: BoardSet,
    store: Store,
    options: RenderOptions,
    view: String,
    renders: u64,
    writable: bool,
}

impl App {
    /// Load the board collection, installing sample boards when the store has
    /// nothing usable.
    ///
    /// A failed read starts from an empty collection and leaves the store
    /// untouched.
    pub fn load(store: Store) -> Self {
        let (boards, seeded, writable) = match store.load_boards() {
            Ok(Some(boards)) => (BoardSet::from_boards(boards), false, true),
            Ok(None) => {
                tracing::info!("No stored boards found, installing sample data");
                (BoardSet::from_boards(sample_boards()), true, true)
            }
            Err(e) => {
                tracing::warn!("Failed to read stored boards, changes stay in memory: {}", e);
                (BoardSet::new(), false, false)
            }
        };

        let mut app = Self {
            boards,
            store,
            options: RenderOptions::default(),
            view: String::new(),
            renders: 0,
            writable,
        };
        if seeded {
            app.persist();
        }
        app.render();
        app
    }

    pub fn boards(&self) -> &BoardSet {
        &self.boards
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Whether changes are being written to the store.
    pub fn is_persisting(&self) -> bool {
        self.writable
    }

    /// The most recent rendering of the whole collection.
    pub fn view(&self) -> &str {
        &self.view
    }

    /// How many times the collection has been drawn.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.options = options;
        self.render();
    }

    pub fn create_board(&mut self, title: &str) -> Option<String> {
        self.create_board_with_description(title, "")
    }

    pub fn create_board_with_description(
        &mut self,
        title: &str,
        description: &str,
    ) -> Option<String> {
        let id = self.boards.create_board_with_description(title, description)?;
        tracing::debug!("Created board {}", id);
        self.commit();
        Some(id)
    }

    pub fn create_list(&mut self, board_id: &str, title: &str) -> Option<String> {
        let id = self.boards.create_list(board_id, title)?;
        tracing::debug!("Created list {} in {}", id, board_id);
        self.commit();
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
        let id = self.boards.create_card_with_description(
            board_id,
            list_id,
            title,
            description,
            ai_suggested,
        )?;
        tracing::debug!("Created card {} in {}", id, list_id);
        self.commit();
        Some(id)
    }

    pub fn update_card_title(
        &mut self,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        new_title: &str,
    ) -> bool {
        let changed = self
            .boards
            .update_card_title(board_id, list_id, card_id, new_title);
        if changed {
            self.commit();
        }
        changed
    }

    pub fn update_card_description(
        &mut self,
        board_id: &str,
        list_id: &str,
        card_id: &str,
        description: &str,
    ) -> bool {
        let changed = self
            .boards
            .update_card_description(board_id, list_id, card_id, description);
        if changed {
            self.commit();
        }
        changed
    }

    /// Delete a board and everything it owns once the user confirms.
    ///
    /// Returns `false` without prompting when the board does not exist, and
    /// `false` with state untouched when the user declines.
    pub fn delete_board(&mut self, board_id: &str, confirm: &impl Confirm) -> bool {
        let Some(board) = self.boards.find_board(board_id) else {
            return false;
        };
        let prompt = format!(
            "Delete board \"{}\" with {} lists and {} cards? This cannot be undone.",
            board.title,
            board.lists.len(),
            board.card_count()
        );
        if !confirm.confirm(&prompt) {
            return false;
        }

        if self.boards.delete_board(board_id).is_some() {
            tracing::info!("Deleted board {}", board_id);
            self.commit();
            true
        } else {
            false
        }
    }

    /// Delete a list and its cards once the user confirms.
    pub fn delete_list(&mut self, board_id: &str, list_id: &str, confirm: &impl Confirm) -> bool {
        let Some(list) = self.boards.find_list(board_id, list_id) else {
            return false;
        };
        let prompt = format!(
            "Delete list \"{}\" with {} cards? This cannot be undone.",
            list.title,
            list.cards.len()
        );
        if !confirm.confirm(&prompt) {
            return false;
        }

        if self.boards.delete_list(board_id, list_id).is_some() {
            tracing::info!("Deleted list {} from {}", list_id, board_id);
            self.commit();
            true
        } else {
            false
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.render();
    }

    fn persist(&mut self) {
        if !self.writable {
            match self.store.load_boards() {
                // Something is stored that this session never saw.
                Ok(Some(stored)) if !stored.is_empty() => {
                    tracing::warn!("Stored boards became readable; not overwriting them");
                    return;
                }
                Ok(_) => self.writable = true,
                Err(e) => {
                    tracing::warn!("Boards still unreadable, change not saved: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = self.store.save_boards(self.boards.boards()) {
            tracing::warn!("Failed to save boards: {}", e);
        }
    }

    fn render(&mut self) {
        self.view = render_boards(self.boards.boards(), self.options);
        self.renders += 1;
    }
}
