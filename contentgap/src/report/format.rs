//! Wiki table rendering of a ranking.

use crate::core::RankedItem;

/// Renders `ranked`, in the order given, as a wiki table.
///
/// A `== Data ==` summary follows the table only when both counters are
/// present and non-zero.
#[must_use]
pub fn render(
    ranked: &[RankedItem],
    total_seen: Option<usize>,
    total_filtered: Option<usize>,
) -> String {
    let mut out = String::with_capacity(64 + ranked.len() * 32);
    out.push_str("== Report ==\n");
    out.push_str("{| class=\"wikitable\"\n|-\n! Article\n! Views\n");
    for item in ranked {
        out.push_str(&format!("|-\n| [[{}]]\n| {}\n", item.title, item.score));
    }
    out.push_str("|}\n");

    // A zero counter hides the summary just like a missing one.
    if let (Some(seen), Some(filtered)) = (total_seen, total_filtered) {
        if seen != 0 && filtered != 0 {
            out.push_str(&format!(
                "== Data ==\n* Total articles: {seen}\n* Filtered articles: {filtered}\n"
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ranked() -> Vec<RankedItem> {
        vec![
            RankedItem::new("B", 9),
            RankedItem::new("C", 9),
            RankedItem::new("A", 5),
        ]
    }

    #[test]
    fn test_render_with_summary() {
        let expected = "== Report ==\n\
{| class=\"wikitable\"\n\
|-\n\
! Article\n\
! Views\n\
|-\n\
| [[B]]\n\
| 9\n\
|-\n\
| [[C]]\n\
| 9\n\
|-\n\
| [[A]]\n\
| 5\n\
|}\n\
== Data ==\n\
* Total articles: 10\n\
* Filtered articles: 3\n";
        assert_eq!(render(&ranked(), Some(10), Some(3)), expected);
    }

    #[test]
    fn test_render_empty_without_counters() {
        assert_eq!(
            render(&[], None, None),
            "== Report ==\n{| class=\"wikitable\"\n|-\n! Article\n! Views\n|}\n"
        );
    }

    #[test]
    fn test_zero_counter_suppresses_summary() {
        let with_zero_filtered = render(&[], Some(10), Some(0));
        assert!(!with_zero_filtered.contains("== Data =="));
        let with_zero_seen = render(&ranked(), Some(0), Some(3));
        assert!(!with_zero_seen.contains("== Data =="));
        let with_one_missing = render(&ranked(), Some(10), None);
        assert!(!with_one_missing.contains("== Data =="));
    }

    #[test]
    fn test_render_does_not_sort() {
        let unsorted = vec![RankedItem::new("Low", 1), RankedItem::new("High", 100)];
        let text = render(&unsorted, None, None);
        assert!(text.find("[[Low]]").unwrap() < text.find("[[High]]").unwrap());
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&ranked(), Some(4), Some(3)), render(&ranked(), Some(4), Some(3)));
    }
}
