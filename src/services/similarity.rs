//! Fuzzy matching used to flag near-duplicate tag names.

use strsim::{levenshtein, normalized_levenshtein};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Cut-off used by the suggestion dropdown's near-duplicate pass. Low enough that
/// a changed ending ("Comedie" for "Comedy", 1 - 2/7) is still flagged.
pub const SUGGESTION_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Substring containment only counts once the shorter name has this many chars
const MIN_CONTAINED_LEN: usize = 3;

/// Levenshtein distance over Unicode scalar values
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// Whether two tag names are likely the same tag spelled differently
///
/// Names are compared lowercased and trimmed. Equal names, or a shorter name of
/// at least three chars contained in the longer one, are similar outright;
/// otherwise `1 - distance / len(longer)` must reach `threshold`.
pub fn are_tags_similar(a: &str, b: &str, threshold: f64) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return true;
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };

    if shorter.chars().count() >= MIN_CONTAINED_LEN && longer.contains(shorter.as_str()) {
        return true;
    }

    // 1 - distance / len(longer), 1.0 for two empty names
    normalized_levenshtein(&a, &b) >= threshold
}
