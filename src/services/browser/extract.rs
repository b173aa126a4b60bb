//! Site detection, in-page extractors and `eval` output parsing.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Comment, ResultRecord, metric};
use crate::pipeline::CommentFilter;
use crate::utils::lenient::lenient;
use crate::utils::truncate_chars;

/// Characters of unparseable output kept for diagnostics.
const RAW_EXCERPT_CHARS: usize = 200;

const EXTRACT_DEVTO: &str = r#"
JSON.stringify({
    site: "dev.to",
    url: location.href,
    title: document.querySelector('h1')?.innerText?.trim() || document.title,
    author: document.querySelector('.crayons-article__subheader a')?.innerText?.trim() || '',
    tags: [...document.querySelectorAll('.crayons-article__tags a')].map(a => a.innerText.trim()),
    body: (document.querySelector('#article-body')?.innerText || '').trim().slice(0, __BODY_LEN__),
    comments: [...document.querySelectorAll('.comment__body')].slice(0, __MAX_COMMENTS__).map(el => {
        const c = el.closest('.comment') || el.closest('.crayons-comment');
        return {
            author: c?.querySelector('.comment__username, .crayons-comment__username')?.innerText?.trim() || '',
            text: el.innerText.trim()
        };
    })
})
"#;

const EXTRACT_LOBSTERS: &str = r#"
JSON.stringify({
    site: "lobste.rs",
    url: location.href,
    title: document.querySelector('.u-url')?.innerText?.trim() || document.title,
    author: document.querySelector('.u-author')?.innerText?.trim() || '',
    tags: [...document.querySelectorAll('.story .tags a')].map(a => a.innerText.trim()),
    score: document.querySelector('.score')?.innerText?.trim() || '',
    comments: [...document.querySelectorAll('.comment_text')].slice(0, __MAX_COMMENTS__).map(el => {
        const container = el.closest('.details_container') || el.parentElement;
        return {
            author: container?.querySelector('.u-author')?.innerText?.trim() || '',
            text: el.innerText.trim()
        };
    })
})
"#;

const EXTRACT_GENERIC: &str = r#"
JSON.stringify({
    site: "generic",
    url: location.href,
    title: document.querySelector('h1')?.innerText?.trim() || document.title,
    body: (
        document.querySelector('article')?.innerText ||
        document.querySelector('main')?.innerText ||
        document.querySelector('.post-content, .entry-content, .article-body')?.innerText ||
        ''
    ).trim().slice(0, __BODY_LEN__)
})
"#;

/// Sites with a dedicated extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    DevTo,
    Lobsters,
    Generic,
}

impl Site {
    pub fn detect(url: &str) -> Self {
        if url.contains("dev.to") {
            Site::DevTo
        } else if url.contains("lobste.rs") {
            Site::Lobsters
        } else {
            Site::Generic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Site::DevTo => "dev.to",
            Site::Lobsters => "lobste.rs",
            Site::Generic => "generic",
        }
    }

    /// In-page script returning the extraction as a JSON string.
    pub fn extractor_js(&self, max_comments: usize, body_chars: usize) -> String {
        let template = match self {
            Site::DevTo => EXTRACT_DEVTO,
            Site::Lobsters => EXTRACT_LOBSTERS,
            Site::Generic => EXTRACT_GENERIC,
        };
        template
            .replace("__MAX_COMMENTS__", &max_comments.to_string())
            .replace("__BODY_LEN__", &body_chars.to_string())
    }
}

/// Fields an extractor may report.
#[derive(Debug, Default, Deserialize)]
pub struct PageExtract {
    #[serde(default, deserialize_with = "lenient")]
    pub site: String,
    #[serde(default, deserialize_with = "lenient")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: String,
    /// Free-form text on lobste.rs (`"42"`)
    #[serde(default)]
    pub score: Value,
    #[serde(default, deserialize_with = "lenient")]
    pub comments: Vec<PageComment>,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageComment {
    #[serde(default, deserialize_with = "lenient")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient")]
    pub text: String,
}

impl PageExtract {
    fn score(&self) -> Option<f64> {
        match &self.score {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Merge extracted fields into `record`; empty fields keep prior values.
    pub fn merge_into(
        self,
        record: &mut ResultRecord,
        filter: &CommentFilter,
        max_comments: usize,
        body_chars: usize,
    ) {
        if let Some(score) = self.score() {
            record.metrics.set(metric::SCORE, score);
        }
        if !self.title.is_empty() {
            record.title = self.title;
        }
        if !self.url.is_empty() {
            record.canonical_link = self.url;
        }
        if !self.author.is_empty() {
            record.author = self.author;
        }
        if !self.body.is_empty() {
            record.body = truncate_chars(&self.body, body_chars);
        }
        if !self.site.is_empty() {
            record.community = Some(self.site);
        }
        record.tags = self.tags.into_iter().filter(|t| !t.is_empty()).collect();

        let candidates = self
            .comments
            .into_iter()
            .map(|c| Comment {
                author: c.author,
                text: c.text,
                score: None,
                permalink: None,
            })
            .collect();
        record.comments = filter.apply(candidates, max_comments);

        if self.error.is_some() {
            record.error = self.error;
        }
    }
}

/// Parse `eval` output: a JSON string literal wrapping the JSON payload.
///
/// Returns the raw excerpt when nothing parses.
pub fn parse_eval_output(raw: &str) -> Result<PageExtract, String> {
    if let Ok(outer) = serde_json::from_str::<Value>(raw) {
        let parsed = match outer {
            Value::String(inner) => serde_json::from_str::<PageExtract>(&inner).ok(),
            value @ Value::Object(_) => serde_json::from_value::<PageExtract>(value).ok(),
            _ => None,
        };
        if let Some(extract) = parsed {
            return Ok(extract);
        }
    }

    let unquoted = raw.trim().trim_matches('"').replace("\\\"", "\"");
    serde_json::from_str::<PageExtract>(&unquoted)
        .map_err(|_| truncate_chars(&unquoted, RAW_EXCERPT_CHARS))
}
