//! ProductHunt GraphQL client.
//!
//! Every request carries the developer token as a bearer credential. Without
//! a token the client answers with empty data instead of failing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{
    Comment, HttpConfig, ProductHuntConfig, ResultRecord, Source, from_iso8601, metric,
};
use crate::utils::http::send_json;
use crate::utils::lenient::lenient;
use crate::utils::truncate_chars;

const POST_URL: &str = "https://www.producthunt.com/posts/";

/// Description characters kept per product.
const DESCRIPTION_CHARS: usize = 200;

const SEARCH_TOPICS_QUERY: &str = r#"
query SearchTopics($query: String!) {
  topics(query: $query, first: 10) {
    edges { node { id slug name postsCount } }
  }
}
"#;

const TOPIC_BY_SLUG_QUERY: &str = r#"
query TopicBySlug($slug: String!) {
  topic(slug: $slug) { id slug name postsCount }
}
"#;

const POSTS_BY_TOPIC_QUERY: &str = r#"
query PostsByTopic($topic: String!, $postedAfter: DateTime, $first: Int!) {
  posts(topic: $topic, first: $first, order: VOTES, postedAfter: $postedAfter) {
    edges {
      node {
        id name tagline description url slug votesCount commentsCount createdAt website
        topics { edges { node { slug } } }
      }
    }
  }
}
"#;

const POST_COMMENTS_QUERY: &str = r#"
query PostComments($id: ID!, $first: Int!) {
  post(id: $id) {
    comments(first: $first, order: VOTES_COUNT) {
      edges { node { id body votesCount createdAt user { username } } }
    }
  }
}
"#;

const VIEWER_QUERY: &str = "{ viewer { user { id } } }";

/// A topic of the ProductHunt taxonomy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub posts_count: i64,
}

/// Queries the taxonomy, posts and comments.
#[async_trait]
pub trait ProductHuntApi: Send + Sync {
    /// Topics matching a keyword.
    async fn search_topics(&self, keyword: &str) -> Result<Vec<Topic>>;

    /// Direct lookup of a topic slug.
    async fn topic_by_slug(&self, slug: &str) -> Result<Option<Topic>>;

    /// Posts of a topic ordered by votes.
    async fn posts_by_topic(
        &self,
        slug: &str,
        posted_after: Option<DateTime<Utc>>,
        first: usize,
    ) -> Result<Vec<ResultRecord>>;

    /// Comments of a post ordered by votes, unfiltered.
    async fn post_comments(&self, post_id: &str, first: usize) -> Result<Vec<Comment>>;

    /// Token presence and validity probe.
    async fn check(&self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct Connection<T> {
    #[serde(default = "Vec::new", deserialize_with = "lenient")]
    edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

impl<T> Connection<T> {
    fn nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().filter_map(|edge| edge.node)
    }
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned + Default"))]
struct Edge<T> {
    #[serde(default = "Option::default", deserialize_with = "lenient")]
    node: Option<T>,
}

impl<T> Default for Edge<T> {
    fn default() -> Self {
        Self { node: None }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TopicsData {
    #[serde(default, deserialize_with = "lenient")]
    topics: Connection<Topic>,
}

#[derive(Debug, Default, Deserialize)]
struct TopicData {
    #[serde(default, deserialize_with = "lenient")]
    topic: Option<Topic>,
}

#[derive(Debug, Default, Deserialize)]
struct PostsData {
    #[serde(default, deserialize_with = "lenient")]
    posts: Connection<PostNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostNode {
    #[serde(default, deserialize_with = "lenient")]
    id: String,
    #[serde(default, deserialize_with = "lenient")]
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    tagline: String,
    #[serde(default, deserialize_with = "lenient")]
    description: String,
    #[serde(default, deserialize_with = "lenient")]
    slug: String,
    #[serde(default, deserialize_with = "lenient")]
    votes_count: i64,
    #[serde(default, deserialize_with = "lenient")]
    comments_count: i64,
    #[serde(default, deserialize_with = "lenient")]
    created_at: String,
    #[serde(default, deserialize_with = "lenient")]
    website: String,
    #[serde(default, deserialize_with = "lenient")]
    topics: Connection<SlugNode>,
}

#[derive(Debug, Default, Deserialize)]
struct SlugNode {
    #[serde(default, deserialize_with = "lenient")]
    slug: String,
}

impl PostNode {
    fn into_record(self) -> ResultRecord {
        let mut record = ResultRecord::new(Source::ProductHunt, self.id, self.name);
        record.canonical_link = format!("{POST_URL}{}", self.slug);
        record.url = self.website;
        record.tagline = Some(self.tagline);
        record.body = truncate_chars(&self.description, DESCRIPTION_CHARS);
        record.created_at = from_iso8601(&self.created_at);
        record.tags = self
            .topics
            .nodes()
            .map(|topic| topic.slug)
            .filter(|slug| !slug.is_empty())
            .collect();
        record.metrics.set(metric::VOTES, self.votes_count as f64);
        record.metrics.set(metric::COMMENTS, self.comments_count as f64);
        record
    }
}

#[derive(Debug, Default, Deserialize)]
struct PostCommentsData {
    #[serde(default, deserialize_with = "lenient")]
    post: Option<PostComments>,
}

#[derive(Debug, Default, Deserialize)]
struct PostComments {
    #[serde(default, deserialize_with = "lenient")]
    comments: Connection<CommentNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentNode {
    #[serde(default, deserialize_with = "lenient")]
    body: String,
    #[serde(default, deserialize_with = "lenient")]
    votes_count: i64,
    #[serde(default, deserialize_with = "lenient")]
    user: Option<UserNode>,
}

#[derive(Debug, Default, Deserialize)]
struct UserNode {
    #[serde(default, deserialize_with = "lenient")]
    username: String,
}

impl CommentNode {
    fn into_comment(self) -> Comment {
        Comment {
            author: self.user.map(|u| u.username).unwrap_or_default(),
            text: self.body.trim().to_string(),
            score: Some(self.votes_count),
            permalink: None,
        }
    }
}

fn parse_posts(data: PostsData) -> Vec<ResultRecord> {
    data.posts
        .nodes()
        .filter(|post| !post.id.is_empty())
        .map(PostNode::into_record)
        .collect()
}

fn parse_comments(data: PostCommentsData) -> Vec<Comment> {
    data.post
        .map(|post| post.comments.nodes().map(CommentNode::into_comment).collect())
        .unwrap_or_default()
}

/// GraphQL implementation of [`ProductHuntApi`].
pub struct ProductHuntClient {
    client: Client,
    config: ProductHuntConfig,
    http: HttpConfig,
    token: Option<String>,
}

impl ProductHuntClient {
    /// The token is read once from the configured environment variable.
    pub fn new(client: Client, config: ProductHuntConfig, http: HttpConfig) -> Self {
        let token = config.token();
        Self {
            client,
            config,
            http,
            token,
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Run one GraphQL operation; `Ok(None)` when no token is configured.
    async fn request<T>(&self, query: &str, variables: Value, timeout: Duration) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };

        let request = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(token)
            .timeout(timeout)
            .json(&json!({ "query": query, "variables": variables }));
        let response: GraphQlResponse<T> = send_json(request, &self.config.api_url).await?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            return Err(AppError::GraphQl(Value::Array(errors).to_string()));
        }
        Ok(response.data)
    }
}

#[async_trait]
impl ProductHuntApi for ProductHuntClient {
    async fn search_topics(&self, keyword: &str) -> Result<Vec<Topic>> {
        let data: Option<TopicsData> = self
            .request(
                SEARCH_TOPICS_QUERY,
                json!({ "query": keyword }),
                self.http.detail_timeout(),
            )
            .await?;
        Ok(data
            .map(|d| d.topics.nodes().filter(|t| !t.slug.is_empty()).collect())
            .unwrap_or_default())
    }

    async fn topic_by_slug(&self, slug: &str) -> Result<Option<Topic>> {
        let data: Option<TopicData> = self
            .request(
                TOPIC_BY_SLUG_QUERY,
                json!({ "slug": slug }),
                self.http.detail_timeout(),
            )
            .await?;
        Ok(data
            .and_then(|d| d.topic)
            .filter(|topic| !topic.slug.is_empty()))
    }

    async fn posts_by_topic(
        &self,
        slug: &str,
        posted_after: Option<DateTime<Utc>>,
        first: usize,
    ) -> Result<Vec<ResultRecord>> {
        let mut variables = json!({ "topic": slug, "first": first });
        if let Some(after) = posted_after {
            variables["postedAfter"] = json!(after.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        }
        let data: Option<PostsData> = self
            .request(POSTS_BY_TOPIC_QUERY, variables, self.http.detail_timeout())
            .await?;
        Ok(data.map(parse_posts).unwrap_or_default())
    }

    async fn post_comments(&self, post_id: &str, first: usize) -> Result<Vec<Comment>> {
        let data: Option<PostCommentsData> = self
            .request(
                POST_COMMENTS_QUERY,
                json!({ "id": post_id, "first": first }),
                self.http.detail_timeout(),
            )
            .await?;
        Ok(data.map(parse_comments).unwrap_or_default())
    }

    async fn check(&self) -> Result<()> {
        if !self.has_token() {
            return Err(AppError::config(format!("{} not set", self.config.token_env)));
        }
        let data: Option<Value> = self
            .request(VIEWER_QUERY, json!({}), self.http.check_timeout())
            .await?;
        match data {
            Some(_) => Ok(()),
            None => Err(AppError::validation("invalid token or API error")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posts() {
        let raw = r#"{
            "posts": {"edges": [
                {"node": {
                    "id": "101", "name": "Throttle", "tagline": "Rate limits as a service",
                    "description": "Drop-in rate limiting for any API.", "slug": "throttle",
                    "votesCount": 412, "commentsCount": 31, "createdAt": "2024-05-02T08:00:00Z",
                    "website": "https://throttle.dev",
                    "topics": {"edges": [{"node": {"slug": "developer-tools"}}, {"node": null}]}
                }},
                {"node": null},
                {"node": {"id": "102", "name": "Quota", "tagline": null, "votesCount": "lots"}}
            ]}
        }"#;
        let records = parse_posts(serde_json::from_str(raw).unwrap());
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.source_id, "101");
        assert_eq!(first.canonical_link, "https://www.producthunt.com/posts/throttle");
        assert_eq!(first.url, "https://throttle.dev");
        assert_eq!(first.tagline.as_deref(), Some("Rate limits as a service"));
        assert_eq!(first.tags, vec!["developer-tools"]);
        assert_eq!(first.metric(metric::VOTES), 412.0);

        assert_eq!(records[1].tagline.as_deref(), Some(""));
        assert_eq!(records[1].metric(metric::VOTES), 0.0);
    }

    #[test]
    fn test_parse_comments() {
        let raw = r#"{"post": {"comments": {"edges": [
            {"node": {"id": "c1", "body": "  Congrats on the launch, the API looks clean.  ",
                      "votesCount": 9, "user": {"username": "maker"}}},
            {"node": {"id": "c2", "body": "nice", "votesCount": 1, "user": null}}
        ]}}}"#;
        let comments = parse_comments(serde_json::from_str(raw).unwrap());
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author, "maker");
        assert_eq!(comments[0].text, "Congrats on the launch, the API looks clean.");
        assert_eq!(comments[1].author, "");
    }

    #[test]
    fn test_graphql_errors_envelope() {
        let raw = r#"{"data": null, "errors": [{"message": "Invalid token"}]}"#;
        let response: GraphQlResponse<TopicsData> = serde_json::from_str(raw).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors.map(|e| e.len()), Some(1));
    }

    #[tokio::test]
    async fn test_missing_token_yields_no_data() {
        let config = ProductHuntConfig {
            token_env: "DEV_SCAN_TEST_UNSET_TOKEN".into(),
            ..ProductHuntConfig::default()
        };
        let client = ProductHuntClient::new(Client::new(), config, HttpConfig::default());
        assert!(!client.has_token());
        assert!(client.search_topics("api").await.unwrap().is_empty());
        assert!(client.post_comments("101", 3).await.unwrap().is_empty());
        assert!(matches!(client.check().await, Err(AppError::Config(_))));
    }
}
