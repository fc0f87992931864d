use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use once_cell::sync::Lazy;
use uuid::Uuid;

/// Process-wide sequence. Seeded from the wall clock so ids minted after a
/// restart still sort after the ones already persisted.
static SEQUENCE: Lazy<AtomicU64> =
    Lazy::new(|| AtomicU64::new(Utc::now().timestamp_millis().max(0) as u64));

/// Mint a new identifier such as `card-1718000000123-9f86d081`.
///
/// The numeric part is strictly increasing within a process, so two ids
/// created in the same millisecond never collide and their order matches
/// creation order.
pub fn new_id(prefix: &str) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, seq, &suffix[..8])
}

/// Human-facing escalation ticket number: `ESC-` plus the last six digits of
/// the millisecond clock.
pub fn ticket_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0);
    format!("ESC-{:06}", millis % 1_000_000)
}

/// Numeric sequence part of an id minted by [`new_id`].
pub fn sequence_of(id: &str) -> Option<u64> {
    id.split('-').nth(1)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_under_rapid_creation() {
        let ids: HashSet<String> = (0..10_000).map(|_| new_id("card")).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn ids_follow_creation_order() {
        let first = new_id("board");
        let second = new_id("board");
        assert!(sequence_of(&first).unwrap() < sequence_of(&second).unwrap());
        assert!(first.starts_with("board-"));
    }

    #[test]
    fn ticket_ids_have_six_digit_suffix() {
        let ticket = ticket_id();
        assert!(ticket.starts_with("ESC-"));
        assert_eq!(ticket.len(), 10);
        assert!(ticket[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
