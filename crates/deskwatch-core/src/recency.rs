//! Timestamp ordering and comment recency.
//!
//! Comment dates arrive as service-supplied strings. `compare_dates` gives
//! them a total order so the rest of the crate can ask "strictly newer?"
//! without caring how the service spells its timestamps.

use crate::model::Comment;
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

/// Parse a service timestamp.
///
/// Accepts RFC 3339 plus the colonless-offset variant TOPdesk emits
/// (`2024-01-05T09:30:00.000+0200`).
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Compare two timestamp strings under a total order.
///
/// When both sides parse, instants are compared, with byte order breaking
/// ties so distinct spellings of the same instant stay ordered. When either
/// side does not parse, plain byte order applies. The service emits
/// ISO-ordered strings, so both branches agree on real data; the fallback
/// only exists to keep the order total for arbitrary input.
#[must_use]
pub fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

/// The most recent comment in `comments`, or `None` when the thread is
/// empty.
///
/// Ties resolve to the earliest occurrence in the slice, so repeated calls
/// over the same thread always pick the same comment.
#[must_use]
pub fn latest(comments: &[Comment]) -> Option<&Comment> {
    comments.iter().reduce(|best, candidate| {
        if compare_dates(&candidate.created_at, &best.created_at) == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

/// `true` when `candidate` is strictly newer than `cached`.
///
/// A missing cached date counts as older than anything.
#[must_use]
pub fn newer_than(candidate: &str, cached: Option<&str>) -> bool {
    cached.is_none_or(|cached| compare_dates(candidate, cached) == Ordering::Greater)
}
