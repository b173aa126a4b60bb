//! Normalized result record shared by every source.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::Source;

/// Well-known metric names.
pub mod metric {
    pub const SCORE: &str = "score";
    pub const POINTS: &str = "points";
    pub const VOTES: &str = "votes";
    pub const COMMENTS: &str = "num_comments";
    pub const UPVOTE_RATIO: &str = "upvote_ratio";
}

/// Named numeric signals (score, points, votes, comment count, ...).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Metrics(BTreeMap<String, f64>);

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<f64>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: impl Into<f64>) {
        self.0.insert(name.to_string(), value.into());
    }

    /// Value of a metric, `0.0` when absent.
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}

// Whole numbers are written as integers so counts read naturally in JSON.
impl Serialize for Metrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            if value.fract() == 0.0 && value.abs() < 1e15 {
                map.serialize_entry(name, &(*value as i64))?;
            } else {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

/// A single reply attached to a record during enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,

    /// Reply body, already truncated to the configured budget
    pub text: String,

    /// Score or votes when the platform exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
}

/// One discovered story, thread, product or page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    /// Platform that produced the record
    pub source: Source,

    /// Identity key, unique within `source`
    pub source_id: String,

    pub title: String,

    /// External link the item points to (may equal `canonical_link`)
    pub url: String,

    /// Permalink back to the platform
    pub canonical_link: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,

    /// Self text, description or extracted page body
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,

    /// Sub-community (subreddit) or site label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    pub metrics: Metrics,

    pub created_at: Option<DateTime<Utc>>,

    /// Keyword match ratio in `[0, 1]`, set by the relevance filter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,

    pub comments: Vec<Comment>,

    /// Enrichment failure diagnostic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Excerpt of an upstream payload that could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_excerpt: Option<String>,
}

impl ResultRecord {
    /// Create an empty record with its identity and title.
    pub fn new(source: Source, source_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source,
            source_id: source_id.into(),
            title: title.into(),
            url: String::new(),
            canonical_link: String::new(),
            author: String::new(),
            body: String::new(),
            tagline: None,
            community: None,
            tags: Vec::new(),
            metrics: Metrics::new(),
            created_at: None,
            relevance: None,
            comments: Vec::new(),
            error: None,
            raw_excerpt: None,
        }
    }

    /// Shortcut for `self.metrics.get(name)`.
    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name)
    }

    /// Text searched by the relevance filter.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.body,
            self.community.as_deref().unwrap_or("")
        )
        .to_lowercase()
    }

    /// Whole days elapsed between creation and `now`.
    pub fn days_ago(&self, now: DateTime<Utc>) -> Option<i64> {
        self.created_at.map(|created| (now - created).num_days())
    }
}

/// Convert epoch seconds (possibly fractional) into an instant.
pub fn from_epoch_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if seconds <= 0.0 || !seconds.is_finite() {
        return None;
    }
    Utc.timestamp_opt(seconds.trunc() as i64, 0).single()
}

/// Parse an ISO-8601 / RFC 3339 timestamp.
pub fn from_iso8601(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
