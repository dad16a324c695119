//! Similarity scoring for fuzzy medicine lookup.
//!
//! Pure functions: (query, candidate) → score + reason. The lookup
//! pipeline runs this against every registry entry in its last stage.
//! Rules are tried in priority order and the first hit wins — scores
//! are never blended across rules.

use serde::{Deserialize, Serialize};

/// Minimum normalized-Levenshtein similarity to call two strings fuzzy
/// matches.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 60.0;

const EXACT_SCORE: f64 = 100.0;
const CONTAINS_SCORE: f64 = 85.0;
const PREFIX_SCORE: f64 = 70.0;

/// Prefix rule: at least this many leading characters must match...
const MIN_PREFIX_LEN: usize = 3;
/// ...and cover at least this fraction of the shorter string.
const MIN_PREFIX_RATIO: f64 = 0.5;

/// Why a candidate matched, in rule-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchReason {
    Exact,
    Contains,
    Fuzzy,
    Prefix,
}

/// Which indexed field matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Name,
    BatchNumber,
}

/// Score + reason for one (query, candidate) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreOutcome {
    /// 0..=100.
    pub similarity: f64,
    pub reason: MatchReason,
}

/// Score `input` against `target` with the default fuzzy threshold.
pub fn score(input: &str, target: &str) -> Option<ScoreOutcome> {
    score_with_threshold(input, target, DEFAULT_FUZZY_THRESHOLD)
}

/// Rule cascade, first hit wins:
/// 1. case-insensitive equality → 100 / exact
/// 2. case-insensitive containment (either direction) → 85 / contains
/// 3. normalized Levenshtein ≥ threshold → fuzzy
/// 4. common prefix ≥ 3 chars covering ≥ half the shorter string → 70 / prefix
pub fn score_with_threshold(input: &str, target: &str, threshold: f64) -> Option<ScoreOutcome> {
    let input_lower = input.to_lowercase();
    let target_lower = target.to_lowercase();

    if input_lower == target_lower {
        return Some(ScoreOutcome { similarity: EXACT_SCORE, reason: MatchReason::Exact });
    }

    if target_lower.contains(&input_lower) || input_lower.contains(&target_lower) {
        return Some(ScoreOutcome { similarity: CONTAINS_SCORE, reason: MatchReason::Contains });
    }

    let similarity = normalized_similarity(&input_lower, &target_lower);
    if similarity >= threshold {
        return Some(ScoreOutcome { similarity, reason: MatchReason::Fuzzy });
    }

    let prefix_len = common_prefix_len(&input_lower, &target_lower);
    let min_len = input_lower.chars().count().min(target_lower.chars().count());
    if prefix_len >= MIN_PREFIX_LEN
        && min_len > 0
        && prefix_len as f64 / min_len as f64 >= MIN_PREFIX_RATIO
    {
        return Some(ScoreOutcome { similarity: PREFIX_SCORE, reason: MatchReason::Prefix });
    }

    None
}

/// `100 * (max_len - edit_distance) / max_len`, over already-lowercased
/// inputs. Defined as 100 when both strings are empty.
fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    let distance = edit_distance(a, b);
    100.0 * (max_len as f64 - distance as f64) / max_len as f64
}

/// Matching leading characters until the first mismatch.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Compute Levenshtein edit distance between two strings.
/// Classic DP with unit insert/delete/substitute costs, rolled into
/// two rows. Symmetric in value for swapped arguments.
pub fn edit_distance(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n as u32; }
    if n == 0 { return m as u32; }

    let mut prev: Vec<u32> = (0..=n as u32).collect();
    let mut curr = vec![0u32; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = (i + 1) as u32;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
