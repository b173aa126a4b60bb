//! Reddit public JSON API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{
    Comment, HttpConfig, RedditConfig, ResultRecord, Source, TimeFilter, from_epoch_seconds,
    metric,
};
use crate::utils::http::get_json;
use crate::utils::lenient::lenient;
use crate::utils::truncate_chars;

/// Permalinks are rendered against this host.
const PERMALINK_HOST: &str = "https://reddit.com";

/// Self text kept per thread.
const SELFTEXT_CHARS: usize = 500;

/// Calls the search and comment endpoints.
#[async_trait]
pub trait RedditApi: Send + Sync {
    /// Search globally, or within `subreddits` when non-empty.
    async fn search(
        &self,
        query: &str,
        subreddits: &[String],
        time: TimeFilter,
        limit: usize,
    ) -> Result<Vec<ResultRecord>>;

    /// Top-level replies of a thread, unfiltered.
    async fn thread_comments(&self, permalink: &str, limit: usize) -> Result<Vec<Comment>>;

    /// Reachability probe.
    async fn check(&self) -> Result<()>;
}

#[derive(Debug, Default, Deserialize)]
struct Listing {
    #[serde(default, deserialize_with = "lenient")]
    data: ListingData,
}

#[derive(Debug, Default, Deserialize)]
struct ListingData {
    #[serde(default, deserialize_with = "lenient")]
    children: Vec<Thing>,
}

#[derive(Debug, Default, Deserialize)]
struct Thing {
    #[serde(default, deserialize_with = "lenient")]
    kind: String,
    #[serde(default, deserialize_with = "lenient")]
    data: ThingData,
}

/// Union of the post (`t3`) and comment (`t1`) fields we read.
#[derive(Debug, Default, Deserialize)]
struct ThingData {
    #[serde(default, deserialize_with = "lenient")]
    id: String,
    #[serde(default, deserialize_with = "lenient")]
    subreddit: String,
    #[serde(default, deserialize_with = "lenient")]
    title: String,
    #[serde(default, deserialize_with = "lenient")]
    selftext: String,
    #[serde(default, deserialize_with = "lenient")]
    body: String,
    #[serde(default, deserialize_with = "lenient")]
    score: i64,
    #[serde(default, deserialize_with = "lenient")]
    num_comments: i64,
    #[serde(default, deserialize_with = "lenient")]
    upvote_ratio: f64,
    #[serde(default, deserialize_with = "lenient")]
    created_utc: f64,
    #[serde(default, deserialize_with = "lenient")]
    permalink: String,
    #[serde(default, deserialize_with = "lenient")]
    url: String,
    #[serde(default, deserialize_with = "lenient")]
    author: String,
}

impl ThingData {
    fn into_record(self) -> ResultRecord {
        let canonical = format!("{PERMALINK_HOST}{}", self.permalink);
        let mut record = ResultRecord::new(Source::Reddit, self.id, self.title);
        record.url = if self.url.is_empty() {
            canonical.clone()
        } else {
            self.url
        };
        record.canonical_link = canonical;
        record.author = self.author;
        record.body = truncate_chars(&self.selftext, SELFTEXT_CHARS);
        record.community = Some(self.subreddit);
        record.created_at = from_epoch_seconds(self.created_utc);
        record.metrics.set(metric::SCORE, self.score as f64);
        record.metrics.set(metric::COMMENTS, self.num_comments as f64);
        record.metrics.set(metric::UPVOTE_RATIO, self.upvote_ratio);
        record
    }

    fn into_comment(self) -> Comment {
        Comment {
            author: self.author,
            text: self.body.trim().to_string(),
            score: Some(self.score),
            permalink: Some(format!("{PERMALINK_HOST}{}", self.permalink)),
        }
    }
}

/// Thread metadata from a search listing; items without a permalink are skipped.
fn parse_listing(listing: Listing) -> Vec<ResultRecord> {
    listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data)
        .filter(|data| !data.permalink.is_empty())
        .map(ThingData::into_record)
        .collect()
}

/// Top-level `t1` replies from a `[post, comments]` listing pair.
fn parse_thread(listings: Vec<Listing>) -> Vec<Comment> {
    let Some(comments) = listings.into_iter().nth(1) else {
        return Vec::new();
    };
    comments
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t1")
        .map(|thing| thing.data.into_comment())
        .collect()
}

/// HTTP implementation of [`RedditApi`].
pub struct RedditClient {
    client: Client,
    config: RedditConfig,
    http: HttpConfig,
}

impl RedditClient {
    pub fn new(client: Client, config: RedditConfig, http: HttpConfig) -> Self {
        Self {
            client,
            config,
            http,
        }
    }

    fn search_url(
        &self,
        query: &str,
        subreddits: &[String],
        time: TimeFilter,
        limit: usize,
    ) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let endpoint = if subreddits.is_empty() {
            format!("{base}/search.json")
        } else {
            format!("{base}/r/{}/search.json", subreddits.join("+"))
        };
        let limit = limit.to_string();
        Ok(Url::parse_with_params(
            &endpoint,
            [
                ("q", query),
                ("sort", "relevance"),
                ("t", time.as_str()),
                ("limit", limit.as_str()),
                ("raw_json", "1"),
            ],
        )?)
    }
}

#[async_trait]
impl RedditApi for RedditClient {
    async fn search(
        &self,
        query: &str,
        subreddits: &[String],
        time: TimeFilter,
        limit: usize,
    ) -> Result<Vec<ResultRecord>> {
        let url = self.search_url(query, subreddits, time, limit)?;
        let listing: Listing =
            get_json(&self.client, url.as_str(), self.http.search_timeout()).await?;
        Ok(parse_listing(listing))
    }

    async fn thread_comments(&self, permalink: &str, limit: usize) -> Result<Vec<Comment>> {
        let base = self.config.base_url.trim_end_matches('/');
        let permalink = permalink.trim_end_matches('/');
        let limit = limit.to_string();
        let url = Url::parse_with_params(
            &format!("{base}{permalink}.json"),
            [("limit", limit.as_str()), ("sort", "top"), ("raw_json", "1")],
        )?;
        let listings: Vec<Listing> =
            get_json(&self.client, url.as_str(), self.http.detail_timeout()).await?;
        Ok(parse_thread(listings))
    }

    async fn check(&self) -> Result<()> {
        let url = format!("{}/r/test/about.json", self.config.base_url.trim_end_matches('/'));
        let _: serde_json::Value = get_json(&self.client, &url, self.http.check_timeout()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_FIXTURE: &str = r#"{
        "kind": "Listing",
        "data": {
            "children": [
                {"kind": "t3", "data": {
                    "id": "abc123", "subreddit": "golang", "title": "Rate limiting in Go",
                    "selftext": "Which approach do you use?", "score": 120, "num_comments": 34,
                    "upvote_ratio": 0.97, "created_utc": 1700000000.0,
                    "permalink": "/r/golang/comments/abc123/rate_limiting_in_go/",
                    "url": "https://www.reddit.com/r/golang/comments/abc123/rate_limiting_in_go/",
                    "author": "gopher", "link_flair_text": null
                }},
                {"kind": "t3", "data": {"id": "nolink", "title": "missing permalink"}},
                {"kind": "t3", "data": {
                    "id": "def456", "subreddit": "rust", "title": "Governor crate",
                    "selftext": null, "score": null, "permalink": "/r/rust/comments/def456/x/",
                    "url": "https://github.com/boinkor-net/governor"
                }}
            ]
        }
    }"#;

    #[test]
    fn test_parse_listing() {
        let listing: Listing = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let records = parse_listing(listing);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.source_id, "abc123");
        assert_eq!(first.community.as_deref(), Some("golang"));
        assert_eq!(
            first.canonical_link,
            "https://reddit.com/r/golang/comments/abc123/rate_limiting_in_go/"
        );
        assert_eq!(first.metric(metric::SCORE), 120.0);
        assert_eq!(first.metric(metric::COMMENTS), 34.0);
        assert!(first.created_at.is_some());

        let second = &records[1];
        assert_eq!(second.url, "https://github.com/boinkor-net/governor");
        assert_eq!(second.body, "");
        assert_eq!(second.metric(metric::SCORE), 0.0);
    }

    #[test]
    fn test_parse_thread_keeps_only_t1() {
        let raw = r#"[
            {"data": {"children": [{"kind": "t3", "data": {"id": "abc123"}}]}},
            {"data": {"children": [
                {"kind": "t1", "data": {"author": "a", "body": "  first reply  ", "score": 10,
                    "permalink": "/r/golang/comments/abc123/x/c1/"}},
                {"kind": "more", "data": {"count": 12, "children": ["c9", "c10"]}},
                {"kind": "t1", "data": {"author": "b", "body": "second", "score": 2}}
            ]}}
        ]"#;
        let listings: Vec<Listing> = serde_json::from_str(raw).unwrap();
        let comments = parse_thread(listings);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "first reply");
        assert_eq!(comments[0].score, Some(10));
        assert_eq!(
            comments[0].permalink.as_deref(),
            Some("https://reddit.com/r/golang/comments/abc123/x/c1/")
        );
    }

    #[test]
    fn test_parse_thread_without_comment_listing() {
        let listings: Vec<Listing> = serde_json::from_str(r#"[{"data": {}}]"#).unwrap();
        assert!(parse_thread(listings).is_empty());
    }

    #[test]
    fn test_search_url() {
        let client = RedditClient::new(
            Client::new(),
            RedditConfig::default(),
            HttpConfig::default(),
        );
        let url = client
            .search_url("\"rate limiting\"", &[], TimeFilter::Week, 25)
            .unwrap();
        assert_eq!(url.path(), "/search.json");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".into(), "\"rate limiting\"".into())));
        assert!(pairs.contains(&("t".into(), "week".into())));
        assert!(pairs.contains(&("limit".into(), "25".into())));

        let subs = vec!["golang".to_string(), "rust".to_string()];
        let url = client
            .search_url("rate limiting", &subs, TimeFilter::Month, 25)
            .unwrap();
        assert_eq!(url.path(), "/r/golang+rust/search.json");
    }
}
