//! ProductHunt: topic-resolved product search and comment enrichment.

mod api;
mod search;

pub use api::{ProductHuntApi, ProductHuntClient, Topic};
pub use search::{ProductHuntEnricher, ProductHuntSearch, slug_candidates, topic_keywords};
