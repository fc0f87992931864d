use crate::models::Board;

use super::BoardSet;

/// Starter content installed on first launch.
pub fn sample_boards() -> Vec<Board> {
    let mut set = BoardSet::new();
    let Some(board) = set.create_board_with_description(
        "My First Board",
        "A place to start. Rename, extend or delete it.",
    ) else {
        return Vec::new();
    };

    let todo = set.create_list(&board, "To Do");
    set.create_list(&board, "In Progress");
    set.create_list(&board, "Done");

    if let Some(todo) = todo {
        set.create_card_with_description(
            &board,
            &todo,
            "Explore the board",
            "Add lists for each stage of your workflow.",
            false,
        );
        set.create_card_with_description(
            &board,
            &todo,
            "Ask the assistant for help",
            "Try: create 'Plan the week'",
            false,
        );
    }

    set.into_boards()
}
