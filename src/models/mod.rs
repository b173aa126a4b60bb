// src/models/mod.rs

//! Domain models for the search and enrichment tools.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod source;
mod time_filter;

// Re-export all public types
pub use config::{
    BrowserConfig, CommentFilterConfig, Config, EnrichConfig, HackerNewsConfig, HttpConfig,
    ProductHuntConfig, RedditConfig,
};
pub use record::{Comment, Metrics, ResultRecord, from_epoch_seconds, from_iso8601, metric};
pub use source::Source;
pub use time_filter::TimeFilter;
