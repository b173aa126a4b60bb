//! Source-independent pipeline stages and entry points.
//!
//! - `relevance`: keyword scoring with fallback-to-all
//! - `dedupe`: stable first-wins deduplication
//! - `comments`: low-information reply filtering
//! - `enrich`: bounded concurrent enrichment with order restoration
//! - `run_search` / `run_browser`: configured runs for each tool

pub mod browse;
pub mod comments;
pub mod dedupe;
pub mod enrich;
pub mod relevance;
pub mod run;
pub mod search;

pub use browse::{check_browser, run_browser};
pub use comments::CommentFilter;
pub use enrich::{EnrichContext, EnrichOptions, EnrichOutcome, Enricher, enrich};
pub use run::{Pipeline, PipelineOptions, Ranking, Search};
pub use search::{SearchRequest, check_source, require_query, run_search};
