//! Upstream platform integrations.
//!
//! Each platform module provides:
//! - a typed API client with a `check()` probe
//! - a `Search` implementation owning that platform's query phasing
//! - an `Enricher` that attaches comments to a record

pub mod browser;
pub mod hackernews;
pub mod producthunt;
pub mod reddit;
