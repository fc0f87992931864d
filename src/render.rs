//! Text rendering of the board collection.
//!
//! Rendering is a pure projection of the model: the whole collection is drawn
//! again after every mutation.

use crate::models::{Board, BoardList, Card, EntryKind, TranscriptEntry};

const HUMAN_CARD: char = '•';
const AI_CARD: char = '✦';

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Append `[id]` to every node so commands can address it.
    pub show_ids: bool,
}

/// Render every board as a tree.
///
/// Example output:
/// ```text
/// Website Relaunch
/// ├── To Do (2)
/// │   ├── • Draft copy
/// │   └── ✦ Write tests
/// └── Done (0)
/// ```
pub fn render_boards(boards: &[Board], options: RenderOptions) -> String {
    if boards.is_empty() {
        return "No boards yet.\n".to_string();
    }

    let mut output = String::new();
    for (i, board) in boards.iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        render_board(&mut output, board, options);
    }
    output
}

fn render_board(output: &mut String, board: &Board, options: RenderOptions) {
    output.push_str(&board.title);
    push_id(output, &board.id, options);
    output.push('\n');

    for (i, list) in board.lists.iter().enumerate() {
        let is_last = i == board.lists.len() - 1;
        render_list(output, list, is_last, options);
    }
}

fn render_list(output: &mut String, list: &BoardList, is_last: bool, options: RenderOptions) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(branch);
    output.push_str(&format!("{} ({})", list.title, list.cards.len()));
    push_id(output, &list.id, options);
    output.push('\n');

    let prefix = if is_last { "    " } else { "│   " };
    for (i, card) in list.cards.iter().enumerate() {
        let card_is_last = i == list.cards.len() - 1;
        render_card(output, card, prefix, card_is_last, options);
    }
}

fn render_card(output: &mut String, card: &Card, prefix: &str, is_last: bool, options: RenderOptions) {
    let branch = if is_last { "└── " } else { "├── " };
    let symbol = if card.ai_suggested { AI_CARD } else { HUMAN_CARD };
    output.push_str(prefix);
    output.push_str(branch);
    output.push(symbol);
    output.push(' ');
    output.push_str(&card.title);
    push_id(output, &card.id, options);
    output.push('\n');
}

fn push_id(output: &mut String, id: &str, options: RenderOptions) {
    if options.show_ids {
        output.push_str(&format!("  [{}]", id));
    }
}

/// Render one transcript entry as a single chat line.
pub fn render_entry(entry: &TranscriptEntry) -> String {
    let label = match entry.kind {
        EntryKind::User => "you",
        EntryKind::Thinking => "…",
        EntryKind::Assistant => "assistant",
        EntryKind::EscalationNotice => "escalation",
        EntryKind::Error => "error",
        EntryKind::Notice => "notice",
    };

    let mut line = format!("[{}] {}", label, entry.text);
    if let Some(meta) = &entry.meta {
        line.push_str(&format!(" (confidence {:.0}%", meta.confidence_score * 100.0));
        if !meta.tools_used.is_empty() {
            line.push_str(&format!(", tools: {}", meta.tools_used.join(", ")));
        }
        line.push(')');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(title: &str, ai: bool) -> Card {
        Card {
            id: format!("card-{}", title),
            title: title.to_string(),
            description: String::new(),
            ai_suggested: ai,
            created_at: Utc::now(),
        }
    }

    fn list(title: &str, cards: Vec<Card>) -> BoardList {
        BoardList {
            id: format!("list-{}", title),
            title: title.to_string(),
            cards,
            created_at: Utc::now(),
        }
    }

    fn board(title: &str, lists: Vec<BoardList>) -> Board {
        Board {
            id: "board-1".to_string(),
            title: title.to_string(),
            description: String::new(),
            lists,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_collection() {
        assert_eq!(render_boards(&[], RenderOptions::default()), "No boards yet.\n");
    }

    #[test]
    fn test_board_with_lists_and_cards() {
        let boards = vec![board(
            "Website Relaunch",
            vec![
                list("To Do", vec![card("Draft copy", false), card("Write tests", true)]),
                list("Done", vec![]),
            ],
        )];
        let output = render_boards(&boards, RenderOptions::default());
        assert_eq!(
            output,
            "Website Relaunch\n├── To Do (2)\n│   ├── • Draft copy\n│   └── ✦ Write tests\n└── Done (0)\n"
        );
    }

    #[test]
    fn test_cards_under_last_list_use_blank_prefix() {
        let boards = vec![board("B", vec![list("Only", vec![card("x", false)])])];
        let output = render_boards(&boards, RenderOptions::default());
        assert_eq!(output, "B\n└── Only (1)\n    └── • x\n");
    }

    #[test]
    fn test_ids_are_appended_when_requested() {
        let boards = vec![board("B", vec![list("L", vec![])])];
        let output = render_boards(&boards, RenderOptions { show_ids: true });
        assert_eq!(output, "B  [board-1]\n└── L (0)  [list-L]\n");
    }
}
