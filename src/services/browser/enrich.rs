//! Per-page extraction in an isolated browser session.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BrowserConfig, ResultRecord};
use crate::pipeline::{CommentFilter, EnrichContext, Enricher};
use crate::services::browser::{BrowserDriver, Site, parse_eval_output};

/// Opens, waits on, extracts from and closes one session per record.
pub struct BrowserEnricher<D> {
    driver: D,
    filter: CommentFilter,
    wait_ms: u64,
    body_chars: usize,
}

impl<D: BrowserDriver> BrowserEnricher<D> {
    pub fn new(driver: D, config: &BrowserConfig, comment_chars: usize) -> Self {
        Self {
            driver,
            filter: CommentFilter::new(&config.comment_filter, comment_chars),
            wait_ms: config.wait_ms,
            body_chars: config.body_chars,
        }
    }

    pub fn session_name(index: usize) -> String {
        format!("enrich-{index}")
    }

    async fn extract(&self, session: &str, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        let site = Site::detect(&record.url);
        log::debug!("{} extracting {} page {}", session, site.label(), record.url);

        let wait = self.wait_ms.to_string();
        let script = site.extractor_js(ctx.max_comments, self.body_chars);

        self.driver.run(session, &["open", record.url.as_str()]).await?;
        self.driver.run(session, &["wait", wait.as_str()]).await?;
        let raw = self.driver.run(session, &["eval", script.as_str()]).await?;

        match parse_eval_output(&raw) {
            Ok(extract) => {
                extract.merge_into(record, &self.filter, ctx.max_comments, self.body_chars)
            }
            Err(excerpt) => {
                log::warn!("Could not parse extraction for {}", record.url);
                record.community = Some(site.label().to_string());
                record.error = Some("parse_failed".to_string());
                record.raw_excerpt = Some(excerpt);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<D: BrowserDriver> Enricher for BrowserEnricher<D> {
    async fn enrich(&self, record: &mut ResultRecord, ctx: &EnrichContext) -> Result<()> {
        let session = Self::session_name(ctx.index);
        let result = self.extract(&session, record, ctx).await;

        // released on every path
        if let Err(e) = self.driver.run(&session, &["close"]).await {
            log::debug!("Closing {} failed: {}", session, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::AppError;
    use crate::pipeline::{EnrichOptions, enrich};
    use crate::services::browser::PageSeed;

    /// Scripted driver: behavior is keyed on the page URL.
    #[derive(Default)]
    struct FakeDriver {
        calls: Mutex<Vec<(String, String)>>,
        pages: Mutex<Vec<(String, String)>>,
        open_sessions: AtomicUsize,
    }

    impl FakeDriver {
        fn closes(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, action)| action == "close")
                .map(|(session, _)| session.clone())
                .collect()
        }

        fn page_of(&self, session: &str) -> String {
            self.pages
                .lock()
                .unwrap()
                .iter()
                .find(|(s, _)| s == session)
                .map(|(_, url)| url.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl BrowserDriver for FakeDriver {
        async fn run(&self, session: &str, args: &[&str]) -> Result<String> {
            let action = args[0].to_string();
            self.calls
                .lock()
                .unwrap()
                .push((session.to_string(), action.clone()));

            match action.as_str() {
                "open" => {
                    self.open_sessions.fetch_add(1, Ordering::SeqCst);
                    self.pages
                        .lock()
                        .unwrap()
                        .push((session.to_string(), args[1].to_string()));
                    if args[1].contains("unreachable") {
                        return Err(AppError::browser(session, "net::ERR_NAME_NOT_RESOLVED"));
                    }
                    Ok("ok".into())
                }
                "wait" => Ok(String::new()),
                "eval" => {
                    let url = self.page_of(session);
                    if url.contains("garbled") {
                        return Ok("Uncaught TypeError: cannot read properties".into());
                    }
                    let payload = serde_json::json!({
                        "site": "dev.to",
                        "url": url,
                        "title": format!("Article at {url}"),
                        "author": "alice",
                        "body": "Token buckets smooth bursts.",
                        "comments": [
                            {"author": "bob", "text": "Nice"},
                            {"author": "carol", "text": "We do the same"}
                        ]
                    });
                    Ok(serde_json::to_string(&payload.to_string()).unwrap())
                }
                "close" => {
                    self.open_sessions.fetch_sub(1, Ordering::SeqCst);
                    Ok(String::new())
                }
                other => Err(AppError::browser(session, format!("unexpected {other}"))),
            }
        }

        async fn version(&self) -> Result<String> {
            Ok("agent-browser (fake)".into())
        }
    }

    fn records(urls: &[&str]) -> Vec<ResultRecord> {
        urls.iter()
            .map(|url| PageSeed::from_url(*url).into_record())
            .collect()
    }

    #[tokio::test]
    async fn test_sessions_always_closed() {
        let driver = FakeDriver::default();
        let config = BrowserConfig {
            wait_ms: 0,
            ..BrowserConfig::default()
        };
        let enricher = BrowserEnricher::new(driver, &config, 300);
        let input = records(&[
            "https://dev.to/a/ok",
            "https://unreachable.example/x",
            "https://garbled.example/y",
        ]);

        let out = enrich(input, &enricher, &EnrichOptions::new(1, 2)).await;

        assert_eq!(out.len(), 3);
        let mut closed = enricher.driver.closes();
        closed.sort();
        assert_eq!(closed, vec!["enrich-0", "enrich-1", "enrich-2"]);
        assert_eq!(enricher.driver.open_sessions.load(Ordering::SeqCst), 0);

        let ok = &out[0];
        assert_eq!(ok.title, "Article at https://dev.to/a/ok");
        assert_eq!(ok.author, "alice");
        assert_eq!(ok.comments.len(), 1);
        assert_eq!(ok.comments[0].author, "bob");
        assert!(ok.error.is_none());

        let failed = &out[1];
        assert!(failed.error.as_deref().unwrap().contains("ERR_NAME_NOT_RESOLVED"));
        assert!(failed.comments.is_empty());

        let garbled = &out[2];
        assert_eq!(garbled.error.as_deref(), Some("parse_failed"));
        assert!(
            garbled
                .raw_excerpt
                .as_deref()
                .unwrap()
                .starts_with("Uncaught TypeError")
        );
    }

    #[test]
    fn test_session_names_follow_index() {
        assert_eq!(BrowserEnricher::<FakeDriver>::session_name(7), "enrich-7");
    }
}
