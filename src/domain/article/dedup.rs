//! Near-duplicate detection rules
//!
//! Two articles describe the same story when their titles are equal or within
//! a small edit distance of each other AND they were published within a day of
//! one another. Titles are compared as raw strings: no case folding and no
//! whitespace normalization.

use chrono::{DateTime, Duration, Utc};

use super::entity::NewArticle;

/// Maximum Levenshtein distance between two titles of the same story
pub const MAX_TITLE_DISTANCE: usize = 4;

/// Maximum publication gap between two reports of the same story, in seconds
pub const DUPLICATE_WINDOW_SECS: i64 = 86_400;

/// Publication window around `published_at` inside which duplicates are searched
pub fn duplicate_window(published_at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let window = Duration::seconds(DUPLICATE_WINDOW_SECS);
    (published_at - window, published_at + window)
}

/// Whether two publication timestamps are close enough to be the same story
pub fn within_duplicate_window(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() <= Duration::seconds(DUPLICATE_WINDOW_SECS)
}

/// Whether two titles are similar enough to be the same story
pub fn titles_match(a: &str, b: &str) -> bool {
    a == b || levenshtein_within(a, b, MAX_TITLE_DISTANCE)
}

/// Whether an existing article is a near-duplicate of the candidate
pub fn is_near_duplicate(
    existing_title: &str,
    existing_published_at: DateTime<Utc>,
    candidate: &NewArticle,
) -> bool {
    within_duplicate_window(existing_published_at, candidate.published_at)
        && titles_match(existing_title, &candidate.title)
}

/// Levenshtein distance over Unicode scalar values
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }

    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let insertion = current[j] + 1;
            let deletion = previous[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }

        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// `levenshtein(a, b) <= max` without computing the full matrix when the
/// lengths alone already rule it out
pub fn levenshtein_within(a: &str, b: &str, max: usize) -> bool {
    let len_a = a.chars().count();
    let len_b = b.chars().count();

    if len_a.abs_diff(len_b) > max {
        return false;
    }

    levenshtein(a, b) <= max
}
