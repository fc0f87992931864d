use std::cell::Cell;
use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use speculate2::speculate;
use taskpilot::app::App;
use taskpilot::board::BoardSet;
use taskpilot::store::Store;

fn accept(_: &str) -> bool {
    true
}

fn decline(_: &str) -> bool {
    false
}

/// A board with two lists, the first holding two cards.
fn populated(set: &mut BoardSet) -> (String, String, String) {
    let board = set.create_board("Launch").expect("board");
    let todo = set.create_list(&board, "To Do").expect("list");
    set.create_list(&board, "Done").expect("list");
    let card = set.create_card(&board, &todo, "Write copy", false).expect("card");
    set.create_card(&board, &todo, "Pick date", true).expect("card");
    (board, todo, card)
}

speculate! {
    before {
        let mut set = BoardSet::new();
    }

    describe "creation" {
        it "adds one entity per call in insertion order" {
            let a = set.create_board("Alpha").unwrap();
            let b = set.create_board("Beta").unwrap();
            let titles: Vec<_> = set.boards().iter().map(|b| b.title.as_str()).collect();

            assert_eq!(titles, vec!["Alpha", "Beta"]);
            assert_ne!(a, b);
        }

        it "trims titles" {
            let id = set.create_board("  Groceries  ").unwrap();
            assert_eq!(set.find_board(&id).unwrap().title, "Groceries");
        }

        it "ignores empty or whitespace titles" {
            assert!(set.create_board("").is_none());
            assert!(set.create_board("   ").is_none());
            assert!(set.is_empty());

            let board = set.create_board("Home").unwrap();
            assert!(set.create_list(&board, " ").is_none());
            assert!(set.find_board(&board).unwrap().lists.is_empty());
        }

        it "ignores lists and cards aimed at unknown parents" {
            let (board, _, _) = populated(&mut set);
            let before = set.clone();

            assert!(set.create_list("board-missing", "Later").is_none());
            assert!(set.create_card(&board, "list-missing", "Stray", false).is_none());
            assert!(set.create_card("board-missing", "list-missing", "Stray", false).is_none());
            assert_eq!(set, before);
        }

        it "makes every created card reachable through its board and list" {
            let (board, todo, card) = populated(&mut set);
            let found = set.find_card(&board, &todo, &card).unwrap();

            assert_eq!(found.title, "Write copy");
            assert!(!found.ai_suggested);
            assert_eq!(set.card_count(), 2);
        }
    }

    describe "updates" {
        it "renames a card in place" {
            let (board, todo, card) = populated(&mut set);

            assert!(set.update_card_title(&board, &todo, &card, "Write final copy"));
            let list = set.find_list(&board, &todo).unwrap();
            assert_eq!(list.cards[0].title, "Write final copy");
            assert_eq!(list.cards[0].id, card);
        }

        it "rejects an empty replacement title" {
            let (board, todo, card) = populated(&mut set);

            assert!(!set.update_card_title(&board, &todo, &card, "  "));
            assert_eq!(set.find_card(&board, &todo, &card).unwrap().title, "Write copy");
        }

        it "sets descriptions" {
            let (board, todo, card) = populated(&mut set);

            assert!(set.update_card_description(&board, &todo, &card, "Two paragraphs"));
            assert_eq!(
                set.find_card(&board, &todo, &card).unwrap().description,
                "Two paragraphs"
            );
        }
    }

    describe "deletion" {
        it "cascades from board to lists and cards" {
            let (board, todo, card) = populated(&mut set);
            let keep = set.create_board("Keep").unwrap();

            let removed = set.delete_board(&board).unwrap();
            assert_eq!(removed.lists.len(), 2);
            assert!(set.find_card(&board, &todo, &card).is_none());
            assert_eq!(set.card_count(), 0);
            assert!(set.find_board(&keep).is_some());
        }

        it "cascades from list to cards" {
            let (board, todo, _) = populated(&mut set);

            let removed = set.delete_list(&board, &todo).unwrap();
            assert_eq!(removed.cards.len(), 2);
            assert_eq!(set.find_board(&board).unwrap().lists.len(), 1);
            assert_eq!(set.card_count(), 0);
        }

        it "is a no-op for unknown ids" {
            populated(&mut set);
            let before = set.clone();

            assert!(set.delete_board("board-missing").is_none());
            assert!(set.delete_list("board-missing", "list-missing").is_none());
            assert_eq!(set, before);
        }
    }

    describe "queries" {
        it "searches titles and descriptions ignoring case" {
            let (board, todo, card) = populated(&mut set);
            set.update_card_description(&board, &todo, &card, "Landing page COPY");

            let matches = set.search_cards("landing");
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].card_id, card);
            assert_eq!(matches[0].list_title, "To Do");
            assert_eq!(matches[0].board_title, "Launch");

            assert!(set.search_cards("   ").is_empty());
        }

        it "counts assistant-made cards" {
            populated(&mut set);
            let stats = set.stats();

            assert_eq!(stats.total_boards, 1);
            assert_eq!(stats.total_lists, 2);
            assert_eq!(stats.total_cards, 2);
            assert_eq!(stats.ai_suggested_cards, 1);
            assert_eq!(stats.ai_usage_rate, 50.0);
        }

        it "reports the first list of the first board" {
            assert!(set.first_list().is_none());
            let (_, todo, _) = populated(&mut set);

            let (board, list) = set.first_list().unwrap();
            assert_eq!(board.title, "Launch");
            assert_eq!(list.id, todo);
        }
    }

    describe "app" {
        before {
            let store = Store::memory();
            let mut app = App::load(store.clone());
        }

        it "seeds sample boards on first load" {
            assert_eq!(app.boards().boards().len(), 1);
            let board = &app.boards().boards()[0];
            assert_eq!(board.title, "My First Board");
            let lists: Vec<_> = board.lists.iter().map(|l| l.title.as_str()).collect();
            assert_eq!(lists, vec!["To Do", "In Progress", "Done"]);
            assert!(store.load_boards().unwrap().is_some());
        }

        it "persists and re-renders after each change" {
            let renders = app.render_count();
            let board = app.create_board("Errands").unwrap();

            assert_eq!(app.render_count(), renders + 1);
            assert!(app.view().contains("Errands"));
            let stored = store.load_boards().unwrap().unwrap();
            assert!(stored.iter().any(|b| b.id == board));
        }

        it "does not persist or render a no-op" {
            let renders = app.render_count();

            assert!(app.create_board("  ").is_none());
            assert!(!app.update_card_title("board-missing", "list", "card", "x"));
            assert_eq!(app.render_count(), renders);
        }

        it "leaves state untouched when deletion is declined" {
            let board = app.boards().boards()[0].id.clone();
            let before = app.boards().clone();

            assert!(!app.delete_board(&board, &decline));
            assert_eq!(app.boards(), &before);
            assert_eq!(store.load_boards().unwrap().unwrap(), before.boards());
        }

        it "deletes after confirmation" {
            let board = app.boards().boards()[0].id.clone();
            let list = app.boards().boards()[0].lists[0].id.clone();

            assert!(app.delete_list(&board, &list, &accept));
            assert_eq!(app.boards().boards()[0].lists.len(), 2);

            assert!(app.delete_board(&board, &accept));
            assert!(app.boards().is_empty());
            assert_eq!(app.view(), "No boards yet.\n");
        }

        it "does not prompt for unknown ids" {
            let asked = Cell::new(false);
            let confirm = |_: &str| {
                asked.set(true);
                true
            };

            assert!(!app.delete_board("board-missing", &confirm));
            assert!(!asked.get());
        }

        it "stays consistent through a long run of random edits" {
            let mut rng = StdRng::seed_from_u64(0x5eed);
            let mut expected_cards = app.boards().card_count();

            for step in 0..300 {
                let boards: Vec<String> =
                    app.boards().boards().iter().map(|b| b.id.clone()).collect();
                let lists: Vec<(String, String, usize)> = app
                    .boards()
                    .boards()
                    .iter()
                    .flat_map(|b| {
                        b.lists
                            .iter()
                            .map(|l| (b.id.clone(), l.id.clone(), l.cards.len()))
                    })
                    .collect();

                match rng.random_range(0..10) {
                    0 | 1 => {
                        app.create_board(&format!("Board {}", step)).unwrap();
                    }
                    2 | 3 => {
                        if let Some(board) = boards.choose(&mut rng) {
                            app.create_list(board, &format!("List {}", step)).unwrap();
                        }
                    }
                    4..=7 => {
                        if let Some((board, list, _)) = lists.choose(&mut rng) {
                            let ai = rng.random_bool(0.5);
                            app.create_card(board, list, &format!("Card {}", step), ai).unwrap();
                            expected_cards += 1;
                        }
                    }
                    8 => {
                        if let Some((board, list, cards)) = lists.choose(&mut rng) {
                            assert!(app.delete_list(board, list, &accept));
                            expected_cards -= cards;
                        }
                    }
                    _ => {
                        if let Some(board) = boards.choose(&mut rng) {
                            let cards = app.boards().find_board(board).unwrap().card_count();
                            assert!(app.delete_board(board, &accept));
                            expected_cards -= cards;
                        }
                    }
                }
                assert_eq!(app.boards().card_count(), expected_cards);
            }

            let mut seen = HashSet::new();
            for board in app.boards().boards() {
                for list in &board.lists {
                    for card in &list.cards {
                        assert!(app.boards().find_card(&board.id, &list.id, &card.id).is_some());
                        assert!(seen.insert(card.id.clone()));
                    }
                }
            }
            assert_eq!(seen.len(), expected_cards);

            let reloaded = App::load(store.clone());
            assert_eq!(reloaded.boards(), app.boards());
        }

        it "keeps an emptied collection empty across reloads" {
            let board = app.boards().boards()[0].id.clone();
            app.delete_board(&board, &accept);

            let reloaded = App::load(store.clone());
            assert!(reloaded.boards().is_empty());
        }
    }
}
