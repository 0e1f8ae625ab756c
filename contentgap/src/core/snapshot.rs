//! Immutable run snapshots handed to checkpoint actions.

use super::RankedItem;
use crate::utils::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A copy of the run counters and ranked collection at a checkpoint.
///
/// Actions receive a snapshot rather than the engine's own state, so nothing
/// they do can alter the run in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Identifier of the run that produced the snapshot.
    pub run_id: Uuid,
    /// Items pulled from the source so far.
    pub total_seen: usize,
    /// Items that passed every filter so far.
    pub total_filtered: usize,
    /// Survivors sorted by score, highest first.
    pub ranked: Vec<RankedItem>,
    /// 1-based checkpoint sequence number within the run.
    pub sequence: usize,
    /// Whether this is the unconditional checkpoint after the source ended.
    pub is_final: bool,
    /// When the snapshot was taken.
    pub taken_at: Timestamp,
}

impl RunSnapshot {
    /// Number of ranked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    /// Whether no item survived so far.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Whether consecutive scores never increase.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.ranked.windows(2).all(|w| w[0].score >= w[1].score)
    }

    /// Titles in ranked order.
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.ranked.iter().map(|r| r.title.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::now_utc;

    fn snapshot(scores: &[i64]) -> RunSnapshot {
        RunSnapshot {
            run_id: Uuid::new_v4(),
            total_seen: scores.len(),
            total_filtered: scores.len(),
            ranked: scores
                .iter()
                .enumerate()
                .map(|(i, s)| RankedItem::new(format!("T{i}"), *s))
                .collect(),
            sequence: 1,
            is_final: true,
            taken_at: now_utc(),
        }
    }

    #[test]
    fn test_is_sorted() {
        assert!(snapshot(&[9, 9, 5]).is_sorted());
        assert!(!snapshot(&[1, 5]).is_sorted());
        assert!(snapshot(&[]).is_sorted());
    }

    #[test]
    fn test_serializes_to_json() {
        let snap = snapshot(&[3]);
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["ranked"][0]["title"], "T0");
        assert_eq!(value["is_final"], true);
    }
}
