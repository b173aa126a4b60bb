// src/services/hackernews.rs

//! Hacker News search via the Algolia API.
//!
//! Single-phase search that keeps Algolia's own ranking, plus comment
//! enrichment from the items endpoint.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    Comment, HackerNewsConfig, HttpConfig, ResultRecord, Source, TimeFilter, from_iso8601, metric,
};
use crate::pipeline::{CommentFilter, EnrichContext, Enricher, Search};
use crate::utils::http::get_json;
use crate::utils::lenient::lenient;
use crate::utils::strip_html;

const ITEM_URL: &str = "https://news.ycombinator.com/item?id=";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "lenient")]
    hits: Vec<Hit>,
}

#[derive(Debug, Default, Deserialize)]
struct Hit {
    #[serde(default, rename = "objectID", deserialize_with = "lenient")]
    object_id: String,
    #[serde(default, deserialize_with = "lenient")]
    title: String,
    #[serde(default, deserialize_with = "lenient")]
    url: String,
    #[serde(default, deserialize_with = "lenient")]
    points: i64,
    #[serde(default, deserialize_with = "lenient")]
    num_comments: i64,
    #[serde(default, deserialize_with = "lenient")]
    author: String,
    #[serde(default, deserialize_with = "lenient")]
    created_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct Item {
    #[serde(default, deserialize_with = "lenient")]
    children: Vec<ItemChild>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemChild {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    kind: String,
    #[serde(default, deserialize_with = "lenient")]
    author: String,
    #[serde(default, deserialize_with = "lenient")]
    text: String,
    #[serde(default, deserialize_with = "lenient")]
    points: i64,
}

fn parse_hits(response: SearchResponse) -> Vec<ResultRecord> {
    response
        .hits
        .into_iter()
        .filter(|hit| !hit.object_id.is_empty())
        .map(|hit| {
            let mut record = ResultRecord::new(Source::HackerNews, hit.object_id, hit.title);
            record.canonical_link = format!("{ITEM_URL}{}", record.source_id);
            record.url = hit.url;
            record.author = hit.author;
            record.created_at = from_iso8601(&hit.created_at);
            record.metrics.set(metric::POINTS, hit.points as f64);
            record.metrics.set(metric::COMMENTS, hit.num_comments as f64);
            record
        })
        .collect()
}

/// Direct `comment` children with their HTML stripped.
fn parse_item(item: Item) -> Vec<Comment> {
    item.children
        .into_iter()
        .filter(|child| child.kind == "comment")
        .map(|child| Comment {
            author: child.author,
            text: strip_html(&child.text),
            score: Some(child.points),
            permalink: None,
        })
        .collect()
}

/// A search response is only trusted when it carries a `hits` field.
fn ensure_hits(body: &Value) -> Result<()> {
    if body.get("hits").is_none() {
        return Err(AppError::validation("unexpected response"));
    }
    Ok(())
}

/// Algolia-backed client; serves as both [`Search`] and [`Enricher`].
pub struct HnClient {
    client: Client,
    config: HackerNewsConfig,
    http: HttpConfig,
    filter: CommentFilter,
}

impl HnClient {
    pub fn new(client: Client, config: HackerNewsConfig, http: HttpConfig, comment_chars: usize) -> Self {
        let filter = CommentFilter::new(&config.comment_filter, comment_chars);
        Self {
            client,
            config,
            http,
            filter,
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn search_url(&self, query: &str, time: TimeFilter, limit: usize) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/search", self.base()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("query", query)
                .append_pair("tags", "story")
                .append_pair("hitsPerPage", &limit.to_string());
            if let Some(cutoff) = time.cutoff(Utc::now()) {
                pairs.append_pair("numericFilters", &format!("created_at_i>{}", cutoff.timestamp()));
            }
        }
        Ok(url)
    }

    async fn search_stories(&self, query: &str, time: TimeFilter, limit: usize) -> Result<Vec<ResultRecord>> {
        let url = self.search_url(query, time, limit)?;
        let response: SearchResponse =
            get_json(&self.client, url.as_str(), self.http.search_timeout()).await?;
        Ok(parse_hits(response))
    }

    /// Reachability probe: a one-hit search must return a `hits` field.
    pub async fn check(&self) -> Result<()> {
        let url = format!("{}/search?query=test&hitsPerPage=1", self.base());
        let body: Value = get_json(&self.client, &url, self.http.check_timeout()).await?;
        ensure_hits(&body)
    }
}

#[async_trait]
impl Search for HnClient {
    async fn search(&self, query: &str, time: TimeFilter, limit: usize) -> Vec<ResultRecord> {
        log::info!("Searching HN: {} (t={})", query, time);
        match self.search_stories(query, time, limit).await {
            Ok(stories) => stories,
            Err(e) => {
                log::warn!("HN search failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl Enricher for HnClient {
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        let url = format!("{}/items/{}", self.base(), record.source_id);
        let item: Item = get_json(&self.client, &url, self.http.detail_timeout()).await?;
        record.comments = self.filter.apply(parse_item(item), ctx.max_comments);
        Ok(())
    }
}
