//! ProductHunt search through topic resolution.
//!
//! ProductHunt has no free-text post search, only a topic taxonomy. Query
//! keywords are resolved to topics by keyword search plus slug guesses; the
//! most popular topics are then scanned for posts. When nothing resolves,
//! a fixed set of broad topics is scanned and posts are kept only if their
//! name or tagline mention a keyword.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Result;
use crate::models::{ProductHuntConfig, ResultRecord, TimeFilter};
use crate::pipeline::{CommentFilter, EnrichContext, Enricher, Search};
use crate::services::producthunt::{ProductHuntApi, Topic};
use crate::utils::slugify;

/// Posts requested per fallback topic.
const FALLBACK_POSTS_PER_TOPIC: usize = 20;

/// Minimum posts requested per resolved topic.
const MIN_POSTS_PER_TOPIC: usize = 5;

/// Query tokens of at least two characters, or the whole query.
pub fn topic_keywords(query: &str) -> Vec<String> {
    let keywords: Vec<String> = query
        .split_whitespace()
        .filter(|word| word.chars().count() >= 2)
        .map(str::to_string)
        .collect();
    if keywords.is_empty() {
        vec![query.trim().to_string()]
    } else {
        keywords
    }
}

/// Slugs worth a direct lookup, in lookup order without repeats.
pub fn slug_candidates(query: &str, keywords: &[String]) -> Vec<String> {
    let mut candidates = vec![slugify(query)];
    candidates.extend(keywords.iter().map(|kw| slugify(kw)));
    if keywords.len() >= 2 {
        candidates.push(slugify(&keywords.join(" ")));
    }

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for slug in candidates {
        if !slug.is_empty() && !unique.contains(&slug) {
            unique.push(slug);
        }
    }
    unique
}

/// A keyword appears in the topic's name or slug.
fn is_relevant_topic(topic: &Topic, keywords: &[String]) -> bool {
    let name = topic.name.to_lowercase();
    let slug = topic.slug.to_lowercase();
    keywords.iter().any(|kw| {
        let kw = kw.to_lowercase();
        name.contains(&kw) || slug.contains(&kw)
    })
}

/// A keyword appears in the product's name or tagline.
fn matches_query(record: &ResultRecord, keywords: &[String]) -> bool {
    let text = format!(
        "{} {}",
        record.title,
        record.tagline.as_deref().unwrap_or("")
    )
    .to_lowercase();
    keywords.iter().any(|kw| text.contains(&kw.to_lowercase()))
}

/// ProductHunt implementation of [`Search`].
pub struct ProductHuntSearch<A> {
    api: Arc<A>,
    config: ProductHuntConfig,
}

impl<A: ProductHuntApi> ProductHuntSearch<A> {
    pub fn new(api: Arc<A>, config: ProductHuntConfig) -> Self {
        Self { api, config }
    }

    /// Resolve the query to at most `max_topics` slugs, most popular first.
    pub async fn resolve_topics(&self, query: &str) -> Vec<String> {
        let keywords = topic_keywords(query);
        let mut found: Vec<Topic> = Vec::new();

        for keyword in &keywords {
            match self.api.search_topics(keyword).await {
                Ok(topics) => {
                    for topic in topics {
                        let known = found.iter().any(|t| t.slug == topic.slug);
                        if !known && is_relevant_topic(&topic, &keywords) {
                            found.push(topic);
                        }
                    }
                }
                Err(e) => log::warn!("Topic search for {:?} failed: {}", keyword, e),
            }
        }

        for slug in slug_candidates(query, &keywords) {
            if found.iter().any(|t| t.slug == slug) {
                continue;
            }
            match self.api.topic_by_slug(&slug).await {
                Ok(Some(topic)) if !found.iter().any(|t| t.slug == topic.slug) => {
                    found.push(topic)
                }
                Ok(_) => {}
                Err(e) => log::debug!("Topic lookup {:?} failed: {}", slug, e),
            }
        }

        found.sort_by(|a, b| b.posts_count.cmp(&a.posts_count));
        found
            .into_iter()
            .take(self.config.max_topics)
            .map(|topic| topic.slug)
            .collect()
    }
}

#[async_trait]
impl<A: ProductHuntApi> Search for ProductHuntSearch<A> {
    async fn search(&self, query: &str, time: TimeFilter, limit: usize) -> Vec<ResultRecord> {
        log::info!("Searching topics for: {}", query);
        let mut slugs = self.resolve_topics(query).await;
        let post_filter = slugs.is_empty();

        if post_filter {
            log::info!("No topics found, using fallback topics with post filter");
            slugs = self.config.fallback_topics.clone();
        } else {
            log::info!("Found topics: {}", slugs.join(", "));
        }

        let posted_after = time.cutoff(Utc::now());
        let per_topic = if post_filter {
            FALLBACK_POSTS_PER_TOPIC
        } else {
            limit.max(MIN_POSTS_PER_TOPIC)
        };
        let keywords = topic_keywords(query);

        let mut products = Vec::new();
        for slug in &slugs {
            let posts = match self.api.posts_by_topic(slug, posted_after, per_topic).await {
                Ok(posts) => posts,
                Err(e) => {
                    log::warn!("Posts for topic {} failed: {}", slug, e);
                    continue;
                }
            };
            products.extend(
                posts
                    .into_iter()
                    .filter(|post| !post_filter || matches_query(post, &keywords)),
            );
        }
        products
    }
}

/// Fetches the most voted comments of each product.
pub struct ProductHuntEnricher<A> {
    api: Arc<A>,
    filter: CommentFilter,
}

impl<A: ProductHuntApi> ProductHuntEnricher<A> {
    pub fn new(api: Arc<A>, filter: CommentFilter) -> Self {
        Self { api, filter }
    }
}

#[async_trait]
impl<A: ProductHuntApi> Enricher for ProductHuntEnricher<A> {
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        let candidates = self
            .api
            .post_comments(&record.source_id, ctx.max_comments)
            .await?;
        record.comments = self.filter.apply(candidates, ctx.max_comments);
        Ok(())
    }
}
