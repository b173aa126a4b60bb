//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior shared by all sources
    #[serde(default)]
    pub http: HttpConfig,

    /// Enrichment scheduler settings
    #[serde(default)]
    pub enrich: EnrichConfig,

    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub hackernews: HackerNewsConfig,

    #[serde(default)]
    pub producthunt: ProductHuntConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.search_timeout_secs == 0 || self.http.detail_timeout_secs == 0 {
            return Err(AppError::validation("http timeouts must be > 0"));
        }
        if self.enrich.concurrency == 0 {
            return Err(AppError::validation("enrich.concurrency must be > 0"));
        }
        if self.enrich.comment_chars == 0 {
            return Err(AppError::validation("enrich.comment_chars must be > 0"));
        }
        if self.reddit.max_subreddits == 0 {
            return Err(AppError::validation("reddit.max_subreddits must be > 0"));
        }
        if self.producthunt.token_env.trim().is_empty() {
            return Err(AppError::validation("producthunt.token_env is empty"));
        }
        if self.browser.binary.trim().is_empty() {
            return Err(AppError::validation("browser.binary is empty"));
        }
        if self.browser.command_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.command_timeout_secs must be > 0",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for listing/search calls in seconds
    #[serde(default = "defaults::search_timeout")]
    pub search_timeout_secs: u64,

    /// Longer timeout for detail (comments) calls
    #[serde(default = "defaults::detail_timeout")]
    pub detail_timeout_secs: u64,

    /// Timeout for `--check` probes
    #[serde(default = "defaults::check_timeout")]
    pub check_timeout_secs: u64,
}

impl HttpConfig {
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            search_timeout_secs: defaults::search_timeout(),
            detail_timeout_secs: defaults::detail_timeout(),
            check_timeout_secs: defaults::check_timeout(),
        }
    }
}

/// Bounded enrichment settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichConfig {
    /// Maximum enrichment operations in flight
    #[serde(default = "defaults::concurrency")]
    pub concurrency: usize,

    /// Character budget for each comment body
    #[serde(default = "defaults::comment_chars")]
    pub comment_chars: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            concurrency: defaults::concurrency(),
            comment_chars: defaults::comment_chars(),
        }
    }
}

/// Rules for discarding low-information replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFilterConfig {
    /// Bodies shorter than this many characters are dropped
    pub min_chars: usize,

    /// Exact (case-insensitive) filler replies to drop
    #[serde(default)]
    pub blocklist: Vec<String>,
}

impl CommentFilterConfig {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars,
            blocklist: defaults::filler_replies(),
        }
    }
}

/// Reddit public JSON API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    #[serde(default = "defaults::reddit_base_url")]
    pub base_url: String,

    /// Courtesy delay between requests, also the enrichment stagger step
    #[serde(default = "defaults::reddit_request_delay")]
    pub request_delay_ms: u64,

    /// Listing size for every search sub-query
    #[serde(default = "defaults::reddit_search_limit")]
    pub search_limit: usize,

    /// Exact-phrase results below this count trigger broadening
    #[serde(default = "defaults::reddit_broaden_threshold")]
    pub broaden_threshold: usize,

    /// Maximum subreddits in a targeted search
    #[serde(default = "defaults::reddit_max_subreddits")]
    pub max_subreddits: usize,

    #[serde(default = "defaults::reddit_comment_filter")]
    pub comment_filter: CommentFilterConfig,
}

impl RedditConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::reddit_base_url(),
            request_delay_ms: defaults::reddit_request_delay(),
            search_limit: defaults::reddit_search_limit(),
            broaden_threshold: defaults::reddit_broaden_threshold(),
            max_subreddits: defaults::reddit_max_subreddits(),
            comment_filter: defaults::reddit_comment_filter(),
        }
    }
}

/// Hacker News (Algolia) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackerNewsConfig {
    #[serde(default = "defaults::hn_base_url")]
    pub base_url: String,

    #[serde(default = "defaults::hn_comment_filter")]
    pub comment_filter: CommentFilterConfig,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::hn_base_url(),
            comment_filter: defaults::hn_comment_filter(),
        }
    }
}

/// ProductHunt GraphQL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductHuntConfig {
    #[serde(default = "defaults::ph_api_url")]
    pub api_url: String,

    /// Environment variable holding the developer token
    #[serde(default = "defaults::ph_token_env")]
    pub token_env: String,

    /// Topics searched when no topic matches the query
    #[serde(default = "defaults::ph_fallback_topics")]
    pub fallback_topics: Vec<String>,

    /// Resolved topics kept after ranking
    #[serde(default = "defaults::ph_max_topics")]
    pub max_topics: usize,

    #[serde(default = "defaults::ph_comment_filter")]
    pub comment_filter: CommentFilterConfig,
}

impl ProductHuntConfig {
    /// Read the token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

impl Default for ProductHuntConfig {
    fn default() -> Self {
        Self {
            api_url: defaults::ph_api_url(),
            token_env: defaults::ph_token_env(),
            fallback_topics: defaults::ph_fallback_topics(),
            max_topics: defaults::ph_max_topics(),
            comment_filter: defaults::ph_comment_filter(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Browser automation executable
    #[serde(default = "defaults::browser_binary")]
    pub binary: String,

    /// Wait after page load for JS rendering, in milliseconds
    #[serde(default = "defaults::browser_wait")]
    pub wait_ms: u64,

    /// Maximum extracted body characters
    #[serde(default = "defaults::browser_body_chars")]
    pub body_chars: usize,

    /// Deadline for each open/wait/eval/close call
    #[serde(default = "defaults::browser_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default = "defaults::browser_comment_filter")]
    pub comment_filter: CommentFilterConfig,
}

impl BrowserConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            binary: defaults::browser_binary(),
            wait_ms: defaults::browser_wait(),
            body_chars: defaults::browser_body_chars(),
            command_timeout_secs: defaults::browser_command_timeout(),
            comment_filter: defaults::browser_comment_filter(),
        }
    }
}

mod defaults {
    use super::CommentFilterConfig;

    // HTTP defaults
    pub fn user_agent() -> String {
        "dev-scan/1.0 (+https://github.com)".into()
    }
    pub fn search_timeout() -> u64 {
        10
    }
    pub fn detail_timeout() -> u64 {
        15
    }
    pub fn check_timeout() -> u64 {
        10
    }

    // Enrichment defaults
    pub fn concurrency() -> usize {
        3
    }
    pub fn comment_chars() -> usize {
        300
    }
    pub fn filler_replies() -> Vec<String> {
        ["this", "this.", "lol", "same", "agreed", "+1"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Reddit defaults
    pub fn reddit_base_url() -> String {
        "https://www.reddit.com".into()
    }
    pub fn reddit_request_delay() -> u64 {
        1000
    }
    pub fn reddit_search_limit() -> usize {
        25
    }
    pub fn reddit_broaden_threshold() -> usize {
        3
    }
    pub fn reddit_max_subreddits() -> usize {
        8
    }
    pub fn reddit_comment_filter() -> CommentFilterConfig {
        CommentFilterConfig::new(30)
    }

    // Hacker News defaults
    pub fn hn_base_url() -> String {
        "https://hn.algolia.com/api/v1".into()
    }
    pub fn hn_comment_filter() -> CommentFilterConfig {
        CommentFilterConfig::new(20)
    }

    // ProductHunt defaults
    pub fn ph_api_url() -> String {
        "https://api.producthunt.com/v2/api/graphql".into()
    }
    pub fn ph_token_env() -> String {
        "PRODUCT_HUNT_TOKEN".into()
    }
    pub fn ph_fallback_topics() -> Vec<String> {
        [
            "artificial-intelligence",
            "developer-tools",
            "saas",
            "open-source",
            "productivity",
            "software-engineering",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn ph_max_topics() -> usize {
        5
    }
    pub fn ph_comment_filter() -> CommentFilterConfig {
        CommentFilterConfig::new(10)
    }

    // Browser defaults
    pub fn browser_binary() -> String {
        "agent-browser".into()
    }
    pub fn browser_wait() -> u64 {
        1500
    }
    pub fn browser_body_chars() -> usize {
        500
    }
    pub fn browser_command_timeout() -> u64 {
        30
    }
    pub fn browser_comment_filter() -> CommentFilterConfig {
        CommentFilterConfig::new(1)
    }
}
