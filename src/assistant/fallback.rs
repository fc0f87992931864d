//! Local responder used when no remote assistant is configured.
//!
//! Messages are classified by keyword in a fixed priority order and answered
//! with a canned line picked at random. Create/add requests try to pull a
//! task name out of the text and add it as an assistant-suggested card.
//!
//! "make" only counts as a create request when a card noun or a quoted name
//! follows it ("make a task called ...", "make 'Book flights'"), and
//! questions only ever create a card from a quoted name.

use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;

use crate::app::App;

static ORGANIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(organi[sz](e|es|ed|ing|ation)|structure|arrange|prioriti[sz]e|sort)\b")
        .expect("valid organize regex")
});
static CREATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:create|add)\b|\bmake\s+(?:(?:a|an|the|new|another)\s+)*(?:tasks?|cards?|items?|todos?|to-dos?)\b|\bmake\s*["“‘']"#,
    )
    .expect("valid create regex")
});
static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(tasks?|cards?|todos?|to-dos?)\b").expect("valid task regex"));
static HELP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(help|how|what can you)\b").expect("valid help regex"));

static DOUBLE_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)""#).expect("valid double quote regex"));
static CURLY_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[“‘]([^”’]+)[”’]").expect("valid curly quote regex"));
static SINGLE_QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w])'([^']+)'(?:$|[^\w])").expect("valid single quote regex"));
static TRAILING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:create|add|make)\b\s+(.+)$").expect("valid trailing regex"));
static FILLER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:a|an|the|new|another)\s+)*(?:(?:tasks?|cards?|items?|todos?|to-dos?)\s+)?(?:(?:called|named|titled|for)\s+|:\s*)?(.+)$",
    )
    .expect("valid filler regex")
});
static DESTINATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:to|on|in)\s+(?:my|the)\s+(?:board|list|to-?do list)$")
        .expect("valid destination regex")
});

const BARE_NOUNS: &[&str] = &["task", "tasks", "card", "cards", "item", "todo", "to-do", "one", "it"];

const ORGANIZE_TIPS: &[&str] = &[
    "Try one list per stage of your work: To Do, In Progress and Done.",
    "Give each project its own board so every board tells one story.",
    "Keep In Progress short. If more than three cards are there, finish one before starting another.",
    "Review your board weekly and delete lists you no longer use.",
];

const TASK_SUGGESTIONS: &[&str] = &[
    "Break big tasks into cards you can finish in a day.",
    "Start card titles with a verb, like 'Draft report' or 'Email vendor'.",
    "Add a short description to each card so future you knows what done looks like.",
    "Move anything you won't start this week out of To Do.",
];

const HELP_LINES: &[&str] = &[
    "I can add cards for you. Try: create 'Draft report'.",
    "Ask me for organization tips, task ideas, or say add 'Task name' to create a card.",
    "I add new cards to the first list of your first board. Quote the name: create 'Book flights'.",
];

const CREATE_PROMPTS: &[&str] = &[
    "What should the new card be called? Try: create 'Draft report'.",
    "Tell me the task name in quotes, for example: add 'Book flights'.",
];

const DEFAULT_LINES: &[&str] = &[
    "I'm here to help with your board. Ask me to add a card or for organization tips.",
    "I'm not sure I follow. Type 'help' to see what I can do.",
    "I can create cards, suggest tasks and share organization tips.",
];

/// Category a message falls into. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Organize,
    Create,
    Task,
    Help,
    Default,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Organize => "organize",
            Self::Create => "create",
            Self::Task => "task",
            Self::Help => "help",
            Self::Default => "default",
        }
    }

    /// The canned lines for this category. `Create` falls back to prompts
    /// asking for a name.
    pub fn responses(&self) -> &'static [&'static str] {
        match self {
            Self::Organize => ORGANIZE_TIPS,
            Self::Create => CREATE_PROMPTS,
            Self::Task => TASK_SUGGESTIONS,
            Self::Help => HELP_LINES,
            Self::Default => DEFAULT_LINES,
        }
    }
}

pub fn classify(message: &str) -> Intent {
    if ORGANIZE_RE.is_match(message) {
        Intent::Organize
    } else if CREATE_RE.is_match(message) {
        Intent::Create
    } else if TASK_RE.is_match(message) {
        Intent::Task
    } else if HELP_RE.is_match(message) {
        Intent::Help
    } else {
        Intent::Default
    }
}

/// Pull a task name out of a create/add request.
///
/// Quoted text wins; otherwise whatever follows the trigger verb, minus
/// articles and words like "task called". Unquoted questions yield nothing.
pub fn extract_task_name(message: &str) -> Option<String> {
    for re in [&*DOUBLE_QUOTED_RE, &*CURLY_QUOTED_RE, &*SINGLE_QUOTED_RE] {
        if let Some(caps) = re.captures(message) {
            let name = caps[1].trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }

    if is_question(message) {
        return None;
    }

    let trailing = TRAILING_RE.captures(message)?.get(1)?.as_str().trim();
    let name = FILLER_RE.captures(trailing)?.get(1)?.as_str();
    let name = DESTINATION_RE.replace(name, "");
    let name = name.trim().trim_end_matches(['.', '!', '?']).trim();

    if name.is_empty() || BARE_NOUNS.contains(&name.to_lowercase().as_str()) {
        return None;
    }
    Some(name.to_string())
}

fn is_question(message: &str) -> bool {
    message.trim_end().ends_with('?')
}

/// Result of answering a message locally.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalReply {
    pub intent: Intent,
    pub text: String,
    /// Id of the card added for a create/add request.
    pub created_card: Option<String>,
}

/// Answer `message` without a backend, adding a card when asked to.
pub fn respond<R: Rng + ?Sized>(app: &mut App, message: &str, rng: &mut R) -> LocalReply {
    let intent = classify(message);

    if intent == Intent::Create {
        if let Some(name) = extract_task_name(message) {
            return create_card(app, &name);
        }
    }

    LocalReply {
        intent,
        text: pick(intent.responses(), rng),
        created_card: None,
    }
}

fn create_card(app: &mut App, name: &str) -> LocalReply {
    let target = app
        .boards()
        .first_list()
        .map(|(board, list)| (board.id.clone(), board.title.clone(), list.id.clone(), list.title.clone()));

    let Some((board_id, board_title, list_id, list_title)) = target else {
        return LocalReply {
            intent: Intent::Create,
            text: format!(
                "I couldn't add \"{}\" because there is no list yet. Create a board with a list first.",
                name
            ),
            created_card: None,
        };
    };

    let created_card = app.create_card(&board_id, &list_id, name, true);
    let text = match created_card {
        Some(_) => format!("Added \"{}\" to {} on {}.", name, list_title, board_title),
        None => format!("I couldn't add \"{}\" to {}.", name, list_title),
    };

    tracing::info!("Assistant created card {:?} in {}", created_card, list_id);
    LocalReply {
        intent: Intent::Create,
        text,
        created_card,
    }
}

fn pick<R: Rng + ?Sized>(lines: &[&str], rng: &mut R) -> String {
    lines.choose(rng).copied().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organize_wins_over_task_words() {
        assert_eq!(classify("Help me organize my tasks"), Intent::Organize);
        assert_eq!(classify("how should I structure this board"), Intent::Organize);
    }

    #[test]
    fn create_wins_over_task_words() {
        assert_eq!(classify("Create a task called 'Review docs'"), Intent::Create);
        assert_eq!(classify("add buy milk"), Intent::Create);
    }

    #[test]
    fn remaining_categories() {
        assert_eq!(classify("any task ideas?"), Intent::Task);
        assert_eq!(classify("help"), Intent::Help);
        assert_eq!(classify("good morning"), Intent::Default);
    }

    #[test]
    fn make_alone_is_not_a_create_request() {
        assert_eq!(classify("I can't make it to the meeting, any advice?"), Intent::Default);
        assert_eq!(classify("How do I make progress on my board?"), Intent::Help);
        assert_eq!(classify("make a task called renew passport"), Intent::Create);
        assert_eq!(classify("make 'Book flights'"), Intent::Create);
    }

    #[test]
    fn questions_need_a_quoted_name() {
        assert_eq!(extract_task_name("Can you add something for tomorrow?"), None);
        assert_eq!(extract_task_name("How do I add a card?"), None);
        assert_eq!(
            extract_task_name("Could you add 'Call Sam'?"),
            Some("Call Sam".to_string())
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        assert_eq!(classify("my address changed"), Intent::Default);
        assert_eq!(classify("discard that"), Intent::Default);
    }

    #[test]
    fn quoted_names_are_preferred() {
        assert_eq!(extract_task_name("create 'Draft report'"), Some("Draft report".to_string()));
        assert_eq!(
            extract_task_name("Create a task called 'Review project documentation'"),
            Some("Review project documentation".to_string())
        );
        assert_eq!(
            extract_task_name(r#"add "Book flights" to my list"#),
            Some("Book flights".to_string())
        );
        assert_eq!(extract_task_name("add “Call Sam”"), Some("Call Sam".to_string()));
    }

    #[test]
    fn trailing_text_after_verb() {
        assert_eq!(extract_task_name("add buy milk"), Some("buy milk".to_string()));
        assert_eq!(
            extract_task_name("please create a new task called renew passport."),
            Some("renew passport".to_string())
        );
        assert_eq!(
            extract_task_name("add water plants to my board"),
            Some("water plants".to_string())
        );
    }

    #[test]
    fn nothing_to_extract() {
        assert_eq!(extract_task_name("create a task"), None);
        assert_eq!(extract_task_name("make a new card"), None);
        assert_eq!(extract_task_name("create"), None);
    }

    #[test]
    fn responses_come_from_the_category_pool() {
        let mut rng = rand::rng();
        for _ in 0..20 {
            let text = pick(Intent::Organize.responses(), &mut rng);
            assert!(ORGANIZE_TIPS.contains(&text.as_str()));
        }
    }
}
