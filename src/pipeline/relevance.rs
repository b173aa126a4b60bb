//! Keyword relevance scoring.
//!
//! A record passes when at least half of the query keywords (rounded up)
//! appear in its title, body or community name. If no record passes, the
//! whole list is kept so a strict query never produces a false "no results".

use crate::models::ResultRecord;

/// Minimum keyword length in characters.
const MIN_KEYWORD_CHARS: usize = 3;

/// Case-folded query tokens of at least three characters.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Attach `relevance` to every record and drop those below the threshold.
pub fn score(mut records: Vec<ResultRecord>, query: &str) -> Vec<ResultRecord> {
    let keywords = extract_keywords(query);
    if keywords.is_empty() {
        for record in &mut records {
            record.relevance = Some(1.0);
        }
        return records;
    }

    let threshold = keywords.len().div_ceil(2);
    let mut passed = Vec::with_capacity(records.len());

    for record in &mut records {
        let text = record.searchable_text();
        let matched = keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count();
        record.relevance = Some(matched as f64 / keywords.len() as f64);
        passed.push(matched >= threshold);
    }

    if !passed.iter().any(|&ok| ok) {
        log::debug!(
            "No record matched {} of {} keywords, keeping all {}",
            threshold,
            keywords.len(),
            records.len()
        );
        return records;
    }

    records
        .into_iter()
        .zip(passed)
        .filter_map(|(record, ok)| ok.then_some(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn thread(id: &str, title: &str) -> ResultRecord {
        ResultRecord::new(Source::Reddit, id, title)
    }

    #[test]
    fn test_extract_keywords() {
        assert_eq!(
            extract_keywords("Rate limiting in Go"),
            vec!["rate", "limiting"]
        );
        assert!(extract_keywords("a to be").is_empty());
    }

    #[test]
    fn test_no_keywords_scores_everything_one() {
        let records = score(vec![thread("1", "x"), thread("2", "y")], "go is");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.relevance == Some(1.0)));
    }

    #[test]
    fn test_half_of_keywords_required() {
        let records = vec![
            thread("1", "Token bucket rate limiting explained"),
            thread("2", "Why bucket sort is fast"),
            thread("3", "Nothing relevant here"),
        ];
        let scored = score(records, "token bucket limiting");
        // threshold = ceil(3/2) = 2
        let ids: Vec<_> = scored.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(scored[0].relevance, Some(1.0));
    }

    #[test]
    fn test_community_counts_as_match() {
        let mut record = thread("1", "Which crate should I use?");
        record.community = Some("rust".into());
        // "crates" is absent, "rust" only appears as the community
        let scored = score(vec![record], "rust crates");
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].relevance, Some(0.5));
    }

    #[test]
    fn test_fallback_to_all_when_nothing_passes() {
        let records = vec![thread("1", "alpha"), thread("2", "beta")];
        let scored = score(records, "completely unrelated query");
        assert_eq!(scored.len(), 2);
        assert!(scored.iter().all(|r| r.relevance == Some(0.0)));
    }

    #[test]
    fn test_never_empties_non_empty_input() {
        let queries = ["", "x", "rate limiting", "zzz yyy xxx www"];
        for query in queries {
            let records = vec![thread("1", "rate"), thread("2", "limits")];
            assert!(!score(records, query).is_empty(), "query {query:?}");
        }
    }
}
