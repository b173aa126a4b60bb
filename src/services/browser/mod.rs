//! Page enrichment through a browser automation tool.
//!
//! There is no search phase: each input URL becomes a record, and every
//! record is enriched in its own isolated session.

mod driver;
mod enrich;
mod extract;
mod input;

pub use driver::{AgentBrowser, BrowserDriver};
pub use enrich::BrowserEnricher;
pub use extract::{PageComment, PageExtract, Site, parse_eval_output};
pub use input::{PageSeed, parse_seeds, seeds_from_urls};
