//! Reddit: phased thread search, subreddit discovery and comment enrichment.

mod api;
mod enrich;
mod search;

pub use api::{RedditApi, RedditClient};
pub use enrich::RedditEnricher;
pub use search::{RedditSearch, discover_subreddits};
