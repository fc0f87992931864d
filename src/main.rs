use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskpilot::app::App;
use taskpilot::assistant::{AssistantClient, ChatPanel, Cursor};
use taskpilot::config::Config;
use taskpilot::db::Database;
use taskpilot::hr::{HrClient, HrPanel};
use taskpilot::models::{EntryKind, IssueCategory, Rating, TranscriptEntry};
use taskpilot::render::{render_entry, RenderOptions};
use taskpilot::store::Store;

#[derive(Parser)]
#[command(name = "tpilot")]
#[command(about = "Kanban task board with a chat assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every board
    Show {
        /// Print ids next to boards, lists and cards
        #[arg(long)]
        ids: bool,
    },
    /// Create or delete boards
    Board {
        #[command(subcommand)]
        action: BoardAction,
    },
    /// Create or delete lists
    List {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Create or edit cards
    Card {
        #[command(subcommand)]
        action: CardAction,
    },
    /// Search card titles and descriptions
    Search { query: String },
    /// Board, list and card totals
    Stats,
    /// Chat with the board assistant
    Chat,
    /// Ask the HR assistant
    Hr,
    /// Print the effective configuration
    Config {
        /// Write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum BoardAction {
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Rm {
        board: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ListAction {
    Add {
        board: String,
        title: String,
    },
    Rm {
        board: String,
        list: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CardAction {
    Add {
        board: String,
        list: String,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    Rename {
        board: String,
        list: String,
        card: String,
        title: String,
    },
    Describe {
        board: String,
        list: String,
        card: String,
        description: String,
    },
}

/// How often the chat loop checks for deferred notices while idle.
const DEFERRED_POLL: Duration = Duration::from_millis(250);

/// Initialize tracing on stderr so stdout only carries boards and chat.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "taskpilot=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let database = match &config.db_path {
        Some(path) => Database::open(path.clone())
            .with_context(|| format!("Failed to open {}", path.display()))?,
        None => Database::open_default()?,
    };
    database.migrate()?;
    Ok(Store::new(database))
}

/// Ask on stdin; anything but y/yes declines.
fn prompt_confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn confirmer(skip: bool) -> impl Fn(&str) -> bool {
    move |prompt: &str| skip || prompt_confirm(prompt)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load();
    if let Some(Commands::Config { save }) = &cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        if *save {
            config.save()?;
            println!("Saved");
        }
        return Ok(());
    }

    let store = open_store(&config)?;
    let mut app = App::load(store.clone());

    match cli.command.unwrap_or(Commands::Show { ids: false }) {
        Commands::Show { ids } => {
            app.set_render_options(RenderOptions { show_ids: ids });
            print!("{}", app.view());
        }
        Commands::Board { action } => match action {
            BoardAction::Add { title, description } => {
                match app.create_board_with_description(&title, &description) {
                    Some(id) => println!("Created board {}", id),
                    None => println!("Nothing created: title is empty"),
                }
            }
            BoardAction::Rm { board, yes } => {
                if app.delete_board(&board, &confirmer(yes)) {
                    println!("Deleted board {}", board);
                } else {
                    println!("Board left unchanged");
                }
            }
        },
        Commands::List { action } => match action {
            ListAction::Add { board, title } => match app.create_list(&board, &title) {
                Some(id) => println!("Created list {}", id),
                None => println!("Nothing created: unknown board or empty title"),
            },
            ListAction::Rm { board, list, yes } => {
                if app.delete_list(&board, &list, &confirmer(yes)) {
                    println!("Deleted list {}", list);
                } else {
                    println!("List left unchanged");
                }
            }
        },
        Commands::Card { action } => match action {
            CardAction::Add {
                board,
                list,
                title,
                description,
            } => match app.create_card_with_description(&board, &list, &title, &description, false)
            {
                Some(id) => println!("Created card {}", id),
                None => println!("Nothing created: unknown board/list or empty title"),
            },
            CardAction::Rename {
                board,
                list,
                card,
                title,
            } => {
                if !app.update_card_title(&board, &list, &card, &title) {
                    println!("Card left unchanged");
                }
            }
            CardAction::Describe {
                board,
                list,
                card,
                description,
            } => {
                if !app.update_card_description(&board, &list, &card, &description) {
                    println!("Card left unchanged");
                }
            }
        },
        Commands::Search { query } => {
            let matches = app.boards().search_cards(&query);
            if matches.is_empty() {
                println!("No cards match \"{}\"", query);
            }
            for m in matches {
                println!("{} / {} / {}  [{}]", m.board_title, m.list_title, m.title, m.card_id);
            }
        }
        Commands::Stats => {
            let stats = app.boards().stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Chat => run_chat(&config, store, &mut app).await?,
        Commands::Hr => run_hr(&config).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn run_chat(config: &Config, store: Store, app: &mut App) -> anyhow::Result<()> {
    let panel = match &config.assistant_url {
        Some(url) => ChatPanel::remote(
            AssistantClient::new(url.clone(), config.api_key.clone(), config.request_timeout())
                .context("Failed to set up the assistant client")?,
            store,
        ),
        None => ChatPanel::local(store),
    };
    let mut panel = panel.with_timings(config.timings());

    println!(
        "Chatting with the {} assistant. Commands: /rate up|down [comment], /escalate <category> <description>, /board, /quit",
        if panel.is_remote() { "remote" } else { "local" }
    );

    let mut cursor = Cursor::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tick = tokio::time::interval(DEFERRED_POLL);
    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = tick.tick() => {
                print_new_entries(&mut cursor, &panel.entries());
                continue;
            }
        };

        let line = line.trim();
        if line == "/quit" {
            break;
        } else if line == "/board" {
            print!("{}", app.view());
        } else if let Some(rest) = line.strip_prefix("/rate") {
            rate_last_reply(&mut panel, rest.trim());
        } else if let Some(rest) = line.strip_prefix("/escalate") {
            escalate(&mut panel, rest.trim());
        } else if let Some(pending) = panel.begin(line) {
            print_new_entries(&mut cursor, &panel.entries());
            panel.finish(app, pending).await;
        }
        print_new_entries(&mut cursor, &panel.entries());
    }

    panel.settle().await;
    print_new_entries(&mut cursor, &panel.entries());
    Ok(())
}

fn rate_last_reply(panel: &mut ChatPanel, args: &str) {
    let (rating, comment) = args.split_once(' ').unwrap_or((args, ""));
    let Some(rating) = Rating::from_str(rating) else {
        println!("Usage: /rate up|down [comment]");
        return;
    };
    let last_reply = panel
        .entries()
        .into_iter()
        .rev()
        .find(|e| e.kind == EntryKind::Assistant);
    match last_reply {
        Some(entry) => {
            if panel.rate(&entry.id, rating, Some(comment)).is_some() {
                println!("Thanks for the feedback.");
            }
        }
        None => println!("Nothing to rate yet"),
    }
}

fn escalate(panel: &mut ChatPanel, args: &str) {
    let (category, description) = args.split_once(' ').unwrap_or((args, ""));
    let Some(category) = IssueCategory::from_str(category) else {
        println!("Categories: technical, account, feature, bug, other");
        return;
    };
    if let Err(e) = panel.escalate(category, description) {
        println!("{}", e);
    }
}

/// Print entries not shown yet. The user's own lines are already on screen.
fn print_new_entries(cursor: &mut Cursor, entries: &[TranscriptEntry]) {
    for entry in cursor.unseen(entries) {
        if entry.kind != EntryKind::User {
            println!("{}", render_entry(&entry));
        }
    }
}

async fn run_hr(config: &Config) -> anyhow::Result<()> {
    let url = config
        .hr_url
        .clone()
        .context("Set TASKPILOT_HR_URL to use the HR assistant")?;
    let client = HrClient::new(url, config.api_key.clone(), config.request_timeout())
        .context("Failed to set up the HR client")?;
    let mut panel = HrPanel::new(client);

    println!("Ask the HR assistant. /quit to leave.");
    let mut cursor = Cursor::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        if let Some(pending) = panel.begin(&line) {
            print_new_entries(&mut cursor, panel.entries());
            panel.finish(pending).await;
            print_new_entries(&mut cursor, panel.entries());
        }
    }
    Ok(())
}
