//! Page enrichment run: seeds → records → dedupe → browser enrichment.

use crate::error::Result;
use crate::models::{Config, ResultRecord};
use crate::pipeline::{EnrichOptions, dedupe::dedupe, enrich};
use crate::services::browser::{AgentBrowser, BrowserDriver, BrowserEnricher, PageSeed};

/// Enrich every seed in its own browser session, preserving input order.
///
/// `config.browser` carries the effective wait and body limits; the CLI
/// folds its flags into it before calling.
pub async fn run_browser<D: BrowserDriver>(
    driver: D,
    config: &Config,
    seeds: Vec<PageSeed>,
    max_comments: usize,
) -> Vec<ResultRecord> {
    let records = dedupe(seeds.into_iter().map(PageSeed::into_record).collect());
    if records.is_empty() {
        return records;
    }

    log::info!(
        "Starting: {} URLs, concurrency={}",
        records.len(),
        config.enrich.concurrency
    );

    let enricher = BrowserEnricher::new(driver, &config.browser, config.enrich.comment_chars);
    let options = EnrichOptions::new(max_comments, config.enrich.concurrency);
    enrich(records, &enricher, &options).await
}

/// Availability probe for the configured automation tool.
pub async fn check_browser(config: &Config) -> Result<String> {
    AgentBrowser::new(&config.browser).version().await
}
