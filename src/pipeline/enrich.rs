// src/pipeline/enrich.rs

//! Bounded concurrent enrichment.
//!
//! At most `concurrency` enrichment operations are in flight at once; the
//! rest wait for a free slot. Operations may complete in any order, but each
//! one writes its record back into the slot of its input position, so the
//! returned list always matches the input order.
//!
//! Every record survives enrichment:
//! - success attaches comments/detail,
//! - a rate-limit response leaves `comments` empty without setting `error`,
//! - any other failure sets `error` to a short diagnostic.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::ResultRecord;

/// Scheduler settings for one enrichment batch.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Comment cap per record
    pub max_comments: usize,

    /// Maximum operations in flight
    pub concurrency: usize,

    /// The Nth record waits `N * stagger` before its network call
    pub stagger: Duration,
}

impl EnrichOptions {
    pub fn new(max_comments: usize, concurrency: usize) -> Self {
        Self {
            max_comments,
            concurrency,
            stagger: Duration::ZERO,
        }
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }
}

/// Position of a record within its batch.
#[derive(Debug, Clone, Copy)]
pub struct EnrichContext {
    /// Zero-based input index
    pub index: usize,
    pub total: usize,
    pub max_comments: usize,
}

/// Fetches secondary detail for one record.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Attach comments/detail to `record`.
    ///
    /// Return [`crate::error::AppError::RateLimited`] when the upstream throttles us; any
    /// other error marks the record as failed.
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()>;
}

#[async_trait]
impl<T: Enricher + ?Sized> Enricher for Arc<T> {
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        (**self).enrich(record, ctx).await
    }
}

/// Result of one enrichment operation.
#[derive(Debug)]
pub enum EnrichOutcome {
    Enriched(ResultRecord),
    RateLimited(ResultRecord),
    Failed(ResultRecord, String),
}

impl EnrichOutcome {
    fn from_result(record: ResultRecord, result: Result<()>) -> Self {
        match result {
            Ok(()) => EnrichOutcome::Enriched(record),
            Err(e) if e.is_rate_limited() => EnrichOutcome::RateLimited(record),
            Err(e) => EnrichOutcome::Failed(record, e.to_string()),
        }
    }

    /// Resolve the outcome into the record that goes back into the list.
    pub fn into_record(self, max_comments: usize) -> ResultRecord {
        match self {
            EnrichOutcome::Enriched(mut record) => {
                record.comments.truncate(max_comments);
                record
            }
            EnrichOutcome::RateLimited(mut record) => {
                record.comments.clear();
                record
            }
            EnrichOutcome::Failed(mut record, reason) => {
                record.comments.clear();
                record.error = Some(reason);
                record
            }
        }
    }
}

/// Enrich `records` with bounded concurrency, preserving input order.
pub async fn enrich<E>(
    records: Vec<ResultRecord>,
    enricher: &E,
    options: &EnrichOptions,
) -> Vec<ResultRecord>
where
    E: Enricher + ?Sized,
{
    let total = records.len();
    let concurrency = options.concurrency.max(1);
    let mut slots: Vec<Option<ResultRecord>> = std::iter::repeat_with(|| None).take(total).collect();

    let mut completed = stream::iter(records.into_iter().enumerate())
        .map(|(index, record)| {
            let ctx = EnrichContext {
                index,
                total,
                max_comments: options.max_comments,
            };
            let delay = options.stagger.saturating_mul(index as u32);
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let outcome = enrich_one(enricher, record, &ctx).await;
                (index, outcome.into_record(ctx.max_comments))
            }
        })
        .buffer_unordered(concurrency);

    while let Some((index, record)) = completed.next().await {
        slots[index] = Some(record);
    }

    slots.into_iter().flatten().collect()
}

async fn enrich_one<E>(enricher: &E, mut record: ResultRecord, ctx: &EnrichContext) -> EnrichOutcome
where
    E: Enricher + ?Sized,
{
    let target = if record.canonical_link.is_empty() {
        record.url.clone()
    } else {
        record.canonical_link.clone()
    };
    log::info!("Enriching ({}/{}) {}", ctx.index + 1, ctx.total, target);

    let result = enricher.enrich(&mut record, ctx).await;
    let outcome = EnrichOutcome::from_result(record, result);

    match &outcome {
        EnrichOutcome::RateLimited(_) => {
            log::warn!("Rate limited while enriching {}, skipping comments", target)
        }
        EnrichOutcome::Failed(_, reason) => {
            log::warn!("Failed to enrich {}: {}", target, reason)
        }
        EnrichOutcome::Enriched(_) => {}
    }
    outcome
}
