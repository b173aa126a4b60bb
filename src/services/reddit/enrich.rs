//! Reddit comment enrichment.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::error::Result;
use crate::models::ResultRecord;
use crate::pipeline::{CommentFilter, EnrichContext, Enricher};
use crate::services::reddit::RedditApi;

/// Fetches the top replies of each thread.
pub struct RedditEnricher<A> {
    api: Arc<A>,
    filter: CommentFilter,
}

impl<A: RedditApi> RedditEnricher<A> {
    pub fn new(api: Arc<A>, filter: CommentFilter) -> Self {
        Self { api, filter }
    }
}

#[async_trait]
impl<A: RedditApi> Enricher for RedditEnricher<A> {
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        let permalink = Url::parse(&record.canonical_link)?.path().to_string();
        let candidates = self
            .api
            .thread_comments(&permalink, ctx.max_comments)
            .await?;
        record.comments = self.filter.apply(candidates, ctx.max_comments);
        Ok(())
    }
}
