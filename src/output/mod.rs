//! Rendering of finished runs and `--check` probes.
//!
//! Renderers are pure: they read already-built records and never perform I/O.

mod compact;

pub use compact::render_compact;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::Result;
use crate::models::{ResultRecord, Source};

/// A finished run ready to be rendered.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub source: Source,

    /// Absent for page enrichment
    pub query: Option<&'a str>,

    pub records: &'a [ResultRecord],
}

impl<'a> Report<'a> {
    pub fn new(source: Source, query: Option<&'a str>, records: &'a [ResultRecord]) -> Self {
        Self {
            source,
            query,
            records,
        }
    }
}

// `{query, count, <items>}` in that order; the items key depends on the source.
impl Serialize for Report<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(query) = self.query {
            map.serialize_entry("query", query)?;
        }
        map.serialize_entry("count", &self.records.len())?;
        map.serialize_entry(self.source.items_key(), self.records)?;
        map.end()
    }
}

/// Pretty-printed JSON document.
///
/// Non-ASCII text is written as UTF-8, not escaped.
pub fn render_json(report: &Report<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Outcome of a `--check` probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub available: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    pub fn available() -> Self {
        Self {
            available: true,
            tool: None,
            error: None,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    pub fn unavailable(error: impl ToString) -> Self {
        Self {
            available: false,
            tool: None,
            error: Some(error.to_string()),
        }
    }

    /// Build from a probe result.
    pub fn from_result<T>(result: Result<T>) -> Self {
        match result {
            Ok(_) => Self::available(),
            Err(e) => Self::unavailable(e),
        }
    }

    /// Single-line JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Process exit status: 0 when available, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.available { 0 } else { FAILURE_EXIT_CODE }
    }
}

/// Exit status for failed probes and missing arguments.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// One-line usage hint printed when a required argument is missing.
pub fn usage_line(source: Source) -> String {
    match source {
        Source::Reddit => format!(
            "Usage: dev-scan reddit <query> {SEARCH_FLAGS} [--subreddits A,B]"
        ),
        Source::Web => {
            "Usage: dev-scan enrich <url>... | dev-scan enrich --stdin < results.json".to_string()
        }
        other => format!("Usage: dev-scan {} <query> {SEARCH_FLAGS}", other.command_name()),
    }
}

const SEARCH_FLAGS: &str =
    "[--count N] [--comments N] [--time hour|day|week|month|year|all] [--json] [--check]";

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::error::AppError;
    use crate::models::metric;

    #[test]
    fn test_render_json_shape() {
        let mut record = ResultRecord::new(Source::HackerNews, "1", "Résumé parsing, done right");
        record.metrics.set(metric::POINTS, 42);
        let records = vec![record];
        let json = render_json(&Report::new(Source::HackerNews, Some("résumé"), &records)).unwrap();

        assert!(json.contains("Résumé parsing, done right"));
        assert!(json.find("\"query\"").unwrap() < json.find("\"count\"").unwrap());
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "résumé");
        assert_eq!(value["count"], 1);
        assert_eq!(value["stories"][0]["metrics"]["points"], 42);
        assert!(value["stories"][0]["metrics"]["points"].is_i64());
    }

    #[test]
    fn test_render_json_without_query() {
        let json = render_json(&Report::new(Source::Web, None, &[])).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("query").is_none());
        assert_eq!(value["count"], 0);
        assert!(value["pages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_check_report_exit_code() {
        let ok = CheckReport::from_result(Ok(()));
        assert_eq!(ok.exit_code(), 0);
        assert_eq!(ok.to_json().unwrap(), r#"{"available":true}"#);

        let failed = CheckReport::from_result::<()>(Err(AppError::validation("unexpected response")));
        assert_eq!(failed.exit_code(), 1);
        let value: Value = serde_json::from_str(&failed.to_json().unwrap()).unwrap();
        assert_eq!(value["available"], false);
        assert_eq!(value["error"], "Validation error: unexpected response");
    }

    #[test]
    fn test_usage_lines() {
        assert!(usage_line(Source::Reddit).starts_with("Usage: dev-scan reddit <query>"));
        assert!(usage_line(Source::Reddit).contains("--subreddits"));
        assert!(usage_line(Source::HackerNews).starts_with("Usage: dev-scan hn <query>"));
        assert!(usage_line(Source::ProductHunt).starts_with("Usage: dev-scan ph <query>"));
        assert!(usage_line(Source::Web).contains("--stdin"));
    }

    #[test]
    fn test_check_report_json() {
        assert_eq!(
            CheckReport::available().to_json().unwrap(),
            r#"{"available":true}"#
        );
        let tool = CheckReport::available().with_tool("agent-browser (0.4.1)");
        assert_eq!(
            tool.to_json().unwrap(),
            r#"{"available":true,"tool":"agent-browser (0.4.1)"}"#
        );
        let failed = CheckReport::from_result::<()>(Err(AppError::config("PRODUCT_HUNT_TOKEN not set")));
        assert!(!failed.available);
        assert_eq!(
            failed.error.as_deref(),
            Some("Configuration error: PRODUCT_HUNT_TOKEN not set")
        );
    }
}
