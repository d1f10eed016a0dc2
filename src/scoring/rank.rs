// Problem rank formula.
//
// A post qualifies when its title, body and comments together mention at
// least `min_signals` distinct signal phrases. Qualifying posts are ranked by
// a linear blend of engagement and signal density:
//
//   score_rank = upvotes * 0.5 + comments * 1.0 + signals * 2.0
//
// Each signal is worth four upvotes, so a thread with little traction but
// several distinct complaints can still outrank a popular one-off.

use crate::models::{RankedItem, RankedRow, RawItem};
use crate::text::keywords::KeywordSet;

/// Configurable weights for the rank formula.
#[derive(Debug, Clone, PartialEq)]
pub struct RankWeights {
    /// Weight per net upvote (default 0.5)
    pub upvotes: f64,
    /// Weight per comment (default 1.0)
    pub comments: f64,
    /// Weight per distinct matched signal (default 2.0)
    pub signals: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            upvotes: 0.5,
            comments: 1.0,
            signals: 2.0,
        }
    }
}

/// Compute the rank score from engagement and signal count.
pub fn compute_score_rank(
    upvotes: i64,
    num_comments: i64,
    signal_count: usize,
    weights: &RankWeights,
) -> f64 {
    upvotes as f64 * weights.upvotes
        + num_comments as f64 * weights.comments
        + signal_count as f64 * weights.signals
}

/// Check a text for problem signals.
///
/// Returns whether at least `min_signals` distinct signals matched, together
/// with the matched signals in keyword-list order.
pub fn is_problem_post(text: &str, signals: &KeywordSet, min_signals: usize) -> (bool, Vec<String>) {
    let found = signals.matches(text);
    (found.len() >= min_signals, found)
}

/// Score every item, keep the qualifying ones and sort them by rank.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank_items(
    items: Vec<RawItem>,
    signals: &KeywordSet,
    min_signals: usize,
    weights: &RankWeights,
) -> Vec<RankedItem> {
    let mut ranked: Vec<RankedItem> = items
        .into_iter()
        .filter_map(|item| {
            let (qualifies, found) = is_problem_post(&item.full_text(), signals, min_signals);
            if !qualifies {
                return None;
            }
            let score_rank =
                compute_score_rank(item.score, item.num_comments, found.len(), weights);
            Some(RankedItem {
                item,
                problem_signals: found,
                score_rank,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score_rank
            .partial_cmp(&a.score_rank)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    ranked
}

/// Build the tabular summary for the top `top_n` ranked items.
pub fn summary_rows(ranked: &[RankedItem], top_n: usize) -> Vec<RankedRow> {
    ranked
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, r)| RankedRow {
            rank: i + 1,
            score: round2(r.score_rank),
            upvotes: r.item.score,
            comments: r.item.num_comments,
            title: r.item.title.clone(),
            top_comment: r.item.comments.first().cloned().unwrap_or_default(),
            signals: r.problem_signals.join("; "),
            url: r.item.url.clone(),
            topic_id: None,
            topic: None,
            topic_keywords: None,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, score: i64, num_comments: i64) -> RawItem {
        RawItem {
            subreddit: "test".to_string(),
            title: title.to_string(),
            text: String::new(),
            created_utc: 0.0,
            url: format!("https://example.com/{score}"),
            score,
            num_comments,
            comments: Vec::new(),
            permalink: String::new(),
        }
    }

    #[test]
    fn test_default_formula() {
        let weights = RankWeights::default();
        // 10 * 0.5 + 2 * 1 + 2 * 2 = 11
        assert!((compute_score_rank(10, 2, 2, &weights) - 11.0).abs() < 1e-9);
        // 5 * 0.5 + 0 + 3 * 2 = 8.5
        assert!((compute_score_rank(5, 0, 3, &weights) - 8.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_upvotes_lower_the_rank() {
        let weights = RankWeights::default();
        assert!(compute_score_rank(-4, 0, 2, &weights) < compute_score_rank(0, 0, 2, &weights));
    }

    #[test]
    fn test_rank_items_filters_and_sorts() {
        let signals = KeywordSet::new(["bug", "crash", "error"]);
        let items = vec![
            post("bug crash", 0, 0),        // 4.0
            post("just a bug", 100, 0),     // excluded
            post("bug crash error", 2, 0),  // 7.0
        ];
        let ranked = rank_items(items, &signals, 2, &RankWeights::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.title, "bug crash error");
        assert_eq!(ranked[1].item.title, "bug crash");
    }

    #[test]
    fn test_summary_rows_truncate_and_round() {
        let signals = KeywordSet::new(["bug", "crash"]);
        let mut first = post("bug crash", 1, 0);
        first.comments = vec!["same here".to_string(), "me too".to_string()];
        let ranked = rank_items(vec![first, post("crash bug", 0, 0)], &signals, 2, &RankWeights::default());
        let rows = summary_rows(&ranked, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].score, 4.5);
        assert_eq!(rows[0].top_comment, "same here");
        assert_eq!(rows[0].signals, "bug; crash");
    }
}
