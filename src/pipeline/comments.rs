//! Low-information comment filtering.

use crate::models::{Comment, CommentFilterConfig};
use crate::utils::truncate_chars;

/// Drops filler replies, ranks by score and enforces the comment cap.
#[derive(Debug, Clone)]
pub struct CommentFilter {
    min_chars: usize,
    blocklist: Vec<String>,
    text_chars: usize,
}

impl CommentFilter {
    /// Build a filter from source rules and the per-comment character budget.
    pub fn new(config: &CommentFilterConfig, text_chars: usize) -> Self {
        Self {
            min_chars: config.min_chars,
            blocklist: config.blocklist.iter().map(|b| b.to_lowercase()).collect(),
            text_chars,
        }
    }

    /// Whether a (trimmed) body carries enough information to keep.
    pub fn keeps(&self, body: &str) -> bool {
        if body.chars().count() < self.min_chars {
            return false;
        }
        let lowered = body.to_lowercase();
        !self.blocklist.iter().any(|filler| *filler == lowered)
    }

    /// Filter, rank and cap candidate comments.
    ///
    /// Comments without a score keep their natural thread order.
    pub fn apply(&self, candidates: Vec<Comment>, max_comments: usize) -> Vec<Comment> {
        let mut kept: Vec<Comment> = candidates
            .into_iter()
            .filter_map(|mut comment| {
                let body = comment.text.trim();
                if !self.keeps(body) {
                    return None;
                }
                comment.text = truncate_chars(body, self.text_chars);
                Some(comment)
            })
            .collect();

        kept.sort_by(|a, b| b.score.unwrap_or(0).cmp(&a.score.unwrap_or(0)));
        kept.truncate(max_comments);
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(text: &str, score: Option<i64>) -> Comment {
        Comment {
            author: "someone".into(),
            text: text.into(),
            score,
            permalink: None,
        }
    }

    fn reddit_filter() -> CommentFilter {
        CommentFilter::new(&CommentFilterConfig::new(30), 300)
    }

    #[test]
    fn test_filler_dropped_even_when_top_scored() {
        let long = "I switched from fixed windows to a token bucket and latency dropped 40%.";
        let kept = reddit_filter().apply(
            vec![comment("lol", Some(500)), comment(long, Some(3))],
            5,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, long);
    }

    #[test]
    fn test_blocklist_applies_regardless_of_length() {
        let filter = CommentFilter::new(&CommentFilterConfig::new(1), 300);
        assert!(!filter.keeps("Agreed"));
        assert!(!filter.keeps("+1"));
        assert!(filter.keeps("ok"));
    }

    #[test]
    fn test_sorted_by_score_and_capped() {
        let body = |n: usize| format!("A sufficiently long comment body number {n}");
        let kept = reddit_filter().apply(
            vec![
                comment(&body(1), Some(1)),
                comment(&body(2), Some(10)),
                comment(&body(3), Some(5)),
            ],
            2,
        );
        let scores: Vec<_> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![Some(10), Some(5)]);
    }

    #[test]
    fn test_unscored_keep_natural_order() {
        let filter = CommentFilter::new(&CommentFilterConfig::new(1), 300);
        let kept = filter.apply(
            vec![comment("first", None), comment("second", None)],
            5,
        );
        assert_eq!(kept[0].text, "first");
        assert_eq!(kept[1].text, "second");
    }

    #[test]
    fn test_text_trimmed_and_truncated() {
        let filter = CommentFilter::new(&CommentFilterConfig::new(1), 10);
        let kept = filter.apply(vec![comment("   0123456789abcdef  ", None)], 5);
        assert_eq!(kept[0].text, "0123456789");
    }
}
