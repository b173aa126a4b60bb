// src/pipeline/search.rs

//! Configured search-and-enrich runs for the API-backed sources.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, ResultRecord, Source, TimeFilter, metric};
use crate::pipeline::{CommentFilter, EnrichOptions, Pipeline, PipelineOptions, Ranking};
use crate::services::hackernews::HnClient;
use crate::services::producthunt::{
    ProductHuntApi, ProductHuntClient, ProductHuntEnricher, ProductHuntSearch,
};
use crate::services::reddit::{RedditApi, RedditClient, RedditEnricher, RedditSearch};
use crate::utils::http;

/// One search invocation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub source: Source,
    pub query: String,
    pub time: TimeFilter,
    pub count: usize,
    pub max_comments: usize,

    /// Reddit only: replaces subreddit discovery when non-empty
    pub subreddits: Vec<String>,
}

impl SearchRequest {
    pub fn new(source: Source, query: impl Into<String>) -> Self {
        Self {
            source,
            query: query.into(),
            time: TimeFilter::default(),
            count: 10,
            max_comments: 5,
            subreddits: Vec::new(),
        }
    }
}

/// Trimmed query, or a validation error when it is absent or blank.
pub fn require_query(raw: Option<&str>) -> Result<String> {
    match raw.map(str::trim) {
        Some(query) if !query.is_empty() => Ok(query.to_string()),
        _ => Err(AppError::validation("missing query")),
    }
}

/// Run the full pipeline for `request.source`.
///
/// Upstream failures degrade to fewer (or no) records; only local setup
/// problems such as an invalid client configuration are returned as errors.
pub async fn run_search(config: &Config, request: &SearchRequest) -> Result<Vec<ResultRecord>> {
    let client = http::create_client(&config.http)?;
    let enrich = EnrichOptions::new(request.max_comments, config.enrich.concurrency);
    let comment_chars = config.enrich.comment_chars;

    let records = match request.source {
        Source::Reddit => {
            let api = Arc::new(RedditClient::new(
                client,
                config.reddit.clone(),
                config.http.clone(),
            ));
            let search = RedditSearch::new(
                Arc::clone(&api),
                config.reddit.clone(),
                request.subreddits.clone(),
            );
            let filter = CommentFilter::new(&config.reddit.comment_filter, comment_chars);
            let options = PipelineOptions {
                time: request.time,
                count: request.count,
                search_limit: config.reddit.search_limit,
                score_relevance: true,
                ranking: Ranking::RelevanceThenMetric(metric::SCORE),
                enrich: enrich.with_stagger(config.reddit.request_delay()),
            };
            Pipeline::new(search, RedditEnricher::new(api, filter), options)
                .run(&request.query)
                .await
        }
        Source::HackerNews => {
            let hn = Arc::new(HnClient::new(
                client,
                config.hackernews.clone(),
                config.http.clone(),
                comment_chars,
            ));
            let options = PipelineOptions {
                time: request.time,
                count: request.count,
                search_limit: request.count,
                score_relevance: false,
                ranking: Ranking::Native,
                enrich,
            };
            Pipeline::new(Arc::clone(&hn), hn, options)
                .run(&request.query)
                .await
        }
        Source::ProductHunt => {
            let api = Arc::new(ProductHuntClient::new(
                client,
                config.producthunt.clone(),
                config.http.clone(),
            ));
            if !api.has_token() {
                log::warn!(
                    "{} is not set, ProductHunt returns no data",
                    config.producthunt.token_env
                );
            }
            let search = ProductHuntSearch::new(Arc::clone(&api), config.producthunt.clone());
            let filter = CommentFilter::new(&config.producthunt.comment_filter, comment_chars);
            let options = PipelineOptions {
                time: request.time,
                count: request.count,
                search_limit: request.count,
                score_relevance: false,
                ranking: Ranking::Metric(metric::VOTES),
                enrich,
            };
            Pipeline::new(search, ProductHuntEnricher::new(api, filter), options)
                .run(&request.query)
                .await
        }
        Source::Web => {
            return Err(AppError::validation(
                "web pages are enriched from URLs, not searched",
            ));
        }
    };

    Ok(records)
}

/// Lightweight reachability/credential probe for an API source.
pub async fn check_source(config: &Config, source: Source) -> Result<()> {
    let client = http::create_client(&config.http)?;
    match source {
        Source::Reddit => {
            RedditClient::new(client, config.reddit.clone(), config.http.clone())
                .check()
                .await
        }
        Source::HackerNews => {
            HnClient::new(
                client,
                config.hackernews.clone(),
                config.http.clone(),
                config.enrich.comment_chars,
            )
            .check()
            .await
        }
        Source::ProductHunt => {
            ProductHuntClient::new(client, config.producthunt.clone(), config.http.clone())
                .check()
                .await
        }
        Source::Web => Err(AppError::validation(
            "use the browser check for web pages",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_web_source_is_not_searchable() {
        let request = SearchRequest::new(Source::Web, "anything");
        let result = run_search(&Config::default(), &request).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_require_query() {
        assert_eq!(require_query(Some("  rate limiting ")).unwrap(), "rate limiting");
        assert!(matches!(require_query(None), Err(AppError::Validation(_))));
        assert!(matches!(require_query(Some("   ")), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_request_defaults() {
        let request = SearchRequest::new(Source::HackerNews, "rate limiting");
        assert_eq!(request.time, TimeFilter::Month);
        assert_eq!(request.count, 10);
        assert_eq!(request.max_comments, 5);
        assert!(request.subreddits.is_empty());
    }
}
