//! URL seeds for page enrichment.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{ResultRecord, Source};
use crate::utils::lenient::lenient;
use crate::utils::short_hash;

/// One page to enrich, with optional search-snippet values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageSeed {
    #[serde(default, deserialize_with = "lenient")]
    pub href: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub body: String,
}

impl PageSeed {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// `href` wins over `url`.
    pub fn target(&self) -> &str {
        let href = self.href.trim();
        if href.is_empty() { self.url.trim() } else { href }
    }

    pub fn into_record(self) -> ResultRecord {
        let target = self.target().to_string();
        let mut record = ResultRecord::new(Source::Web, short_hash(&target), self.title);
        record.url = target.clone();
        record.canonical_link = target;
        record.body = self.body;
        record
    }
}

/// Parse search results piped on stdin.
///
/// Accepts an array of objects, or an object carrying a `results` (or
/// `data`) array. Entries without a usable URL are dropped.
pub fn parse_seeds(raw: &str) -> Result<Vec<PageSeed>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let items = match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => return Err(AppError::validation("expected a JSON array or object on stdin")),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<PageSeed>(item).ok())
        .filter(|seed| !seed.target().is_empty())
        .collect())
}

/// Seeds from positional URL arguments; blank arguments are dropped.
pub fn seeds_from_urls<I, S>(urls: I) -> Vec<PageSeed>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    urls.into_iter()
        .map(|url| url.as_ref().trim().to_string())
        .filter(|url| !url.is_empty())
        .map(PageSeed::from_url)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_with_href_and_url() {
        let raw = r#"[
            {"href": "https://dev.to/a/one", "title": "One", "body": "snippet"},
            {"url": "https://lobste.rs/s/two"},
            {"href": "  ", "title": "blank"},
            "not an object"
        ]"#;
        let seeds = parse_seeds(raw).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].target(), "https://dev.to/a/one");
        assert_eq!(seeds[1].target(), "https://lobste.rs/s/two");
    }

    #[test]
    fn test_parse_wrapped_results() {
        let results = parse_seeds(r#"{"results": [{"href": "https://a.example"}]}"#).unwrap();
        assert_eq!(results.len(), 1);
        let data = parse_seeds(r#"{"data": [{"url": "https://b.example"}]}"#).unwrap();
        assert_eq!(data[0].target(), "https://b.example");
        assert!(parse_seeds(r#"{"other": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_empty_and_invalid() {
        assert!(parse_seeds("  \n").unwrap().is_empty());
        assert!(parse_seeds("not json").is_err());
        assert!(parse_seeds("42").is_err());
    }

    #[test]
    fn test_seed_into_record() {
        let seed = PageSeed {
            href: "https://dev.to/a/one".into(),
            title: "One".into(),
            body: "snippet".into(),
            ..PageSeed::default()
        };
        let record = seed.into_record();
        assert_eq!(record.source, Source::Web);
        assert_eq!(record.source_id, short_hash("https://dev.to/a/one"));
        assert_eq!(record.url, "https://dev.to/a/one");
        assert_eq!(record.title, "One");
        assert_eq!(record.body, "snippet");
    }

    #[test]
    fn test_seeds_from_urls_drops_blank() {
        let seeds = seeds_from_urls(["https://a.example", " ", ""]);
        assert_eq!(seeds, vec![PageSeed::from_url("https://a.example")]);
    }
}
