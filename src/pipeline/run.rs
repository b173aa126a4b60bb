//! Search → relevance → dedupe → sort → truncate → enrich.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{ResultRecord, TimeFilter};
use crate::pipeline::enrich::{EnrichOptions, Enricher, enrich};
use crate::pipeline::{dedupe, relevance};

/// Issues the phased queries for one source.
///
/// Implementations recover from upstream failures themselves and return
/// whatever the successful sub-queries produced (possibly nothing).
#[async_trait]
pub trait Search: Send + Sync {
    async fn search(&self, query: &str, time: TimeFilter, limit: usize) -> Vec<ResultRecord>;
}

#[async_trait]
impl<T: Search + ?Sized> Search for Arc<T> {
    async fn search(&self, query: &str, time: TimeFilter, limit: usize) -> Vec<ResultRecord> {
        (**self).search(query, time, limit).await
    }
}

/// Final ordering applied after deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ranking {
    /// Keep the platform's own ranking
    Native,
    /// Descending by a named metric
    Metric(&'static str),
    /// Descending by relevance, ties broken by a named metric
    RelevanceThenMetric(&'static str),
}

impl Ranking {
    fn compare(&self, a: &ResultRecord, b: &ResultRecord) -> Ordering {
        match self {
            Ranking::Native => Ordering::Equal,
            Ranking::Metric(name) => b.metric(name).total_cmp(&a.metric(name)),
            Ranking::RelevanceThenMetric(name) => {
                let ra = a.relevance.unwrap_or(0.0);
                let rb = b.relevance.unwrap_or(0.0);
                rb.total_cmp(&ra)
                    .then_with(|| b.metric(name).total_cmp(&a.metric(name)))
            }
        }
    }

    /// Stable sort of `records` by this ranking.
    pub fn sort(&self, records: &mut [ResultRecord]) {
        if *self != Ranking::Native {
            records.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Per-run pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub time: TimeFilter,

    /// Records kept after ranking
    pub count: usize,

    /// Limit handed to each search sub-query
    pub search_limit: usize,

    /// Apply the keyword relevance filter
    pub score_relevance: bool,

    pub ranking: Ranking,

    pub enrich: EnrichOptions,
}

/// Complete search-and-enrich run for one source.
pub struct Pipeline<S, E> {
    search: S,
    enricher: E,
    options: PipelineOptions,
}

impl<S: Search, E: Enricher> Pipeline<S, E> {
    pub fn new(search: S, enricher: E, options: PipelineOptions) -> Self {
        Self {
            search,
            enricher,
            options,
        }
    }

    /// Collect, filter and rank records without enriching them.
    pub async fn collect(&self, query: &str) -> Vec<ResultRecord> {
        let opts = &self.options;
        let mut records = self
            .search
            .search(query, opts.time, opts.search_limit)
            .await;

        if opts.score_relevance {
            records = relevance::score(records, query);
        }
        let mut records = dedupe::dedupe(records);
        opts.ranking.sort(&mut records);
        records.truncate(opts.count);
        records
    }

    /// Run every stage and return the final ordered list.
    pub async fn run(&self, query: &str) -> Vec<ResultRecord> {
        let records = self.collect(query).await;
        let max_comments = self.options.enrich.max_comments;

        log::info!(
            "Unique results: {}, enriching top {}...",
            records.len(),
            if max_comments > 0 { records.len() } else { 0 }
        );

        if max_comments == 0 || records.is_empty() {
            return records;
        }
        enrich(records, &self.enricher, &self.options.enrich).await
    }
}
