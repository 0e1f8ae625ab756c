//! Test assertions for ranked results and snapshots.

use crate::core::{RankedItem, RunSnapshot};

/// Asserts that scores never increase along the ranking.
pub fn assert_ranked_desc(ranked: &[RankedItem]) {
    for pair in ranked.windows(2) {
        assert!(
            pair[0].score >= pair[1].score,
            "Expected non-increasing scores, got {} ({}) before {} ({})",
            pair[0].title,
            pair[0].score,
            pair[1].title,
            pair[1].score
        );
    }
}

/// Asserts the ranked titles, in order.
pub fn assert_titles(ranked: &[RankedItem], expected: &[&str]) {
    let actual: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(actual, expected, "Unexpected ranking");
}

/// Asserts the counters and final flag of a snapshot.
pub fn assert_snapshot_counts(snapshot: &RunSnapshot, seen: usize, filtered: usize) {
    assert_eq!(
        (snapshot.total_seen, snapshot.total_filtered),
        (seen, filtered),
        "Unexpected counters in checkpoint {}",
        snapshot.sequence
    );
    assert_eq!(
        snapshot.ranked.len(),
        snapshot.total_filtered,
        "Ranked set and filtered counter disagree in checkpoint {}",
        snapshot.sequence
    );
}
