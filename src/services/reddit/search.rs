//! Phased Reddit search with subreddit auto-discovery.
//!
//! 1. Exact-phrase (quoted) global search.
//! 2. If that found fewer than `broaden_threshold` threads, an unquoted
//!    global search is appended.
//! 3. A targeted search scoped to the explicit or discovered subreddits
//!    (at most `max_subreddits`) is appended.
//!
//! Successive requests are separated by the courtesy delay. Duplicates are
//! left in place; the pipeline dedupes centrally.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{RedditConfig, ResultRecord, TimeFilter};
use crate::pipeline::Search;
use crate::services::reddit::RedditApi;

/// Subreddits ranked by how many records they contributed.
///
/// Ties keep first-seen order. Records without a subreddit are ignored.
pub fn discover_subreddits(records: &[ResultRecord], min_count: usize) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for community in records.iter().filter_map(|r| r.community.as_deref()) {
        if community.is_empty() {
            continue;
        }
        match counts.iter_mut().find(|(name, _)| name == community) {
            Some((_, count)) => *count += 1,
            None => counts.push((community.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .filter(|(_, count)| *count >= min_count)
        .map(|(name, _)| name)
        .collect()
}

/// Reddit implementation of [`Search`].
pub struct RedditSearch<A> {
    api: Arc<A>,
    config: RedditConfig,
    subreddits: Vec<String>,
}

impl<A: RedditApi> RedditSearch<A> {
    /// `subreddits` replaces auto-discovery when non-empty.
    pub fn new(api: Arc<A>, config: RedditConfig, subreddits: Vec<String>) -> Self {
        Self {
            api,
            config,
            subreddits,
        }
    }

    async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn search_in(
        &self,
        query: &str,
        subreddits: &[String],
        time: TimeFilter,
        limit: usize,
    ) -> Vec<ResultRecord> {
        match self.api.search(query, subreddits, time, limit).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Reddit search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl<A: RedditApi> Search for RedditSearch<A> {
    async fn search(&self, query: &str, time: TimeFilter, limit: usize) -> Vec<ResultRecord> {
        log::info!("Searching Reddit: {} (t={})", query, time);

        let exact = format!("\"{query}\"");
        let mut threads = self.search_in(&exact, &[], time, limit).await;

        if threads.len() < self.config.broaden_threshold {
            log::info!("Exact match too few ({}), broadening...", threads.len());
            self.pause().await;
            let broad = self.search_in(query, &[], time, limit).await;
            threads.extend(broad);
        }

        let mut targets = if self.subreddits.is_empty() {
            discover_subreddits(&threads, 1)
        } else {
            self.subreddits.clone()
        };
        targets.truncate(self.config.max_subreddits);

        if !targets.is_empty() {
            log::info!("Subreddits: {}", targets.join(", "));
            self.pause().await;
            let scoped = self.search_in(query, &targets, time, limit).await;
            threads.extend(scoped);
        }

        threads
    }
}
