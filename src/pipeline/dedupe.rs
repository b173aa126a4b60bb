//! Stable deduplication by source identity.

use std::collections::HashSet;

use crate::models::ResultRecord;

/// Keep the first record for each `source_id`, preserving order.
pub fn dedupe(mut records: Vec<ResultRecord>) -> Vec<ResultRecord> {
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.source_id.clone()));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn record(id: &str, title: &str) -> ResultRecord {
        ResultRecord::new(Source::Reddit, id, title)
    }

    #[test]
    fn test_first_occurrence_wins() {
        let records = vec![
            record("a", "first a"),
            record("b", "first b"),
            record("a", "second a"),
            record("c", "first c"),
            record("b", "second b"),
        ];
        let unique = dedupe(records);
        let pairs: Vec<_> = unique
            .iter()
            .map(|r| (r.source_id.as_str(), r.title.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", "first a"), ("b", "first b"), ("c", "first c")]
        );
    }

    #[test]
    fn test_no_duplicate_ids_remain() {
        let records: Vec<_> = (0..50)
            .map(|i| record(&(i % 7).to_string(), &i.to_string()))
            .collect();
        let unique = dedupe(records);
        let ids: HashSet<_> = unique.iter().map(|r| r.source_id.clone()).collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
