//! Upstream platforms a result can come from.

use serde::{Deserialize, Serialize};

/// Content platform that produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Reddit,
    HackerNews,
    ProductHunt,
    Web,
}

impl Source {
    /// Human-readable platform name used in report headers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Source::Reddit => "Reddit",
            Source::HackerNews => "HN",
            Source::ProductHunt => "ProductHunt",
            Source::Web => "Web",
        }
    }

    /// Key under which records are listed in JSON output.
    pub fn items_key(&self) -> &'static str {
        match self {
            Source::Reddit => "threads",
            Source::HackerNews => "stories",
            Source::ProductHunt => "products",
            Source::Web => "pages",
        }
    }

    /// Plural noun for the record kind.
    pub fn item_noun(&self) -> &'static str {
        match self {
            Source::Reddit => "Threads",
            Source::HackerNews => "Stories",
            Source::ProductHunt => "Products",
            Source::Web => "Pages",
        }
    }

    /// CLI subcommand serving this source.
    pub fn command_name(&self) -> &'static str {
        match self {
            Source::Reddit => "reddit",
            Source::HackerNews => "hn",
            Source::ProductHunt => "ph",
            Source::Web => "enrich",
        }
    }

    /// Short tag prefixed to each numbered entry in compact output.
    pub fn entry_tag(&self) -> &'static str {
        match self {
            Source::Reddit => "R",
            Source::HackerNews => "HN",
            Source::ProductHunt => "PH",
            Source::Web => "",
        }
    }
}
