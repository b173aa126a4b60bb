//! Compact text digest, one layout per source.

use chrono::{DateTime, Utc};

use crate::models::{ResultRecord, Source, metric};
use crate::output::Report;
use crate::utils::{collapse_whitespace, truncate_chars};

/// Characters shown per body or comment preview.
const PREVIEW_CHARS: usize = 200;

/// Characters shown of an extracted page body.
const PAGE_BODY_CHARS: usize = 300;

/// Tags shown per page.
const MAX_PAGE_TAGS: usize = 8;

/// Render `report` as text; `now` anchors the "days ago" figures.
pub fn render_compact(report: &Report<'_>, now: DateTime<Utc>) -> String {
    let mut lines = Vec::new();

    if report.source != Source::Web {
        lines.push(format!(
            "## {} Search: {}",
            report.source.display_name(),
            report.query.unwrap_or_default()
        ));
        lines.push(format!(
            "**{} found:** {}",
            report.source.item_noun(),
            report.records.len()
        ));
        lines.push(String::new());
    }

    for (i, record) in report.records.iter().enumerate() {
        let n = i + 1;
        match record.source {
            Source::Reddit => reddit_entry(&mut lines, n, record, now),
            Source::HackerNews => hn_entry(&mut lines, n, record, now),
            Source::ProductHunt => ph_entry(&mut lines, n, record, now),
            Source::Web => page_entry(&mut lines, n, record),
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

fn format_date(record: &ResultRecord, now: DateTime<Utc>) -> String {
    match (record.created_at, record.days_ago(now)) {
        (Some(created), Some(days)) => format!("{} ({}d ago)", created.format("%Y-%m-%d"), days),
        _ => "?".to_string(),
    }
}

/// Whole numbers without a fractional part.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn preview(text: &str, max: usize) -> String {
    truncate_chars(&collapse_whitespace(text), max)
}

fn push_error(lines: &mut Vec<String>, record: &ResultRecord, indent: &str) {
    if let Some(error) = &record.error {
        lines.push(format!("{indent}ERROR: {error}"));
    }
}

fn reddit_entry(lines: &mut Vec<String>, n: usize, record: &ResultRecord, now: DateTime<Utc>) {
    let relevance = record.relevance.unwrap_or(0.0) * 100.0;
    lines.push(format!(
        "**{}{n}** r/{} | {} | score:{} | {}cmt | rel:{:.0}%",
        record.source.entry_tag(),
        record.community.as_deref().unwrap_or(""),
        format_date(record, now),
        format_number(record.metric(metric::SCORE)),
        format_number(record.metric(metric::COMMENTS)),
        relevance
    ));
    lines.push(format!("  {}", record.title));
    lines.push(format!("  {}", record.canonical_link));
    if !record.body.is_empty() {
        lines.push(format!("  > {}", preview(&record.body, PREVIEW_CHARS)));
    }

    if !record.comments.is_empty() {
        lines.push("  **Top comments:**".to_string());
        for (j, comment) in record.comments.iter().enumerate() {
            lines.push(format!(
                "    {}. u/{} (score:{}): {}",
                j + 1,
                comment.author,
                comment.score.unwrap_or(0),
                preview(&comment.text, PREVIEW_CHARS)
            ));
        }
    }
    push_error(lines, record, "  ");
}

fn hn_entry(lines: &mut Vec<String>, n: usize, record: &ResultRecord, now: DateTime<Utc>) {
    lines.push(format!(
        "**{}{n}** {} | {}pts | {}cmt",
        record.source.entry_tag(),
        format_date(record, now),
        format_number(record.metric(metric::POINTS)),
        format_number(record.metric(metric::COMMENTS))
    ));
    lines.push(format!("  {}", record.title));
    lines.push(format!("  {}", record.canonical_link));
    if !record.url.is_empty() {
        lines.push(format!("  → {}", record.url));
    }
    plain_comments(lines, record);
    push_error(lines, record, "  ");
}

fn ph_entry(lines: &mut Vec<String>, n: usize, record: &ResultRecord, now: DateTime<Utc>) {
    lines.push(format!(
        "**{}{n}** {} | {}votes | {}cmt",
        record.source.entry_tag(),
        format_date(record, now),
        format_number(record.metric(metric::VOTES)),
        format_number(record.metric(metric::COMMENTS))
    ));
    lines.push(format!(
        "  {} — {}",
        record.title,
        record.tagline.as_deref().unwrap_or("")
    ));
    lines.push(format!("  {}", record.canonical_link));
    if !record.body.is_empty() {
        lines.push(format!("  > {}", record.body));
    }
    if !record.tags.is_empty() {
        lines.push(format!("  Topics: {}", record.tags.join(", ")));
    }
    plain_comments(lines, record);
    push_error(lines, record, "  ");
}

fn plain_comments(lines: &mut Vec<String>, record: &ResultRecord) {
    if record.comments.is_empty() {
        return;
    }
    lines.push("  **Top comments:**".to_string());
    for (j, comment) in record.comments.iter().enumerate() {
        lines.push(format!(
            "    {}. {}: {}",
            j + 1,
            comment.author,
            preview(&comment.text, PREVIEW_CHARS)
        ));
    }
}

fn page_entry(lines: &mut Vec<String>, n: usize, record: &ResultRecord) {
    let title = if record.title.is_empty() {
        "No title"
    } else {
        record.title.as_str()
    };
    let url = if record.canonical_link.is_empty() {
        &record.url
    } else {
        &record.canonical_link
    };

    lines.push(format!("[{n}] {title}"));
    lines.push(format!("    URL: {url}"));
    if !record.author.is_empty() {
        lines.push(format!("    Author: {}", record.author));
    }
    if !record.tags.is_empty() {
        let tags: Vec<&str> = record
            .tags
            .iter()
            .take(MAX_PAGE_TAGS)
            .map(String::as_str)
            .collect();
        lines.push(format!("    Tags: {}", tags.join(" ")));
    }
    if !record.body.is_empty() {
        lines.push(format!("    Body: {}", preview(&record.body, PAGE_BODY_CHARS)));
    }
    if record.metrics.contains(metric::SCORE) {
        lines.push(format!(
            "    Score: {}",
            format_number(record.metric(metric::SCORE))
        ));
    }
    if !record.comments.is_empty() {
        lines.push(format!("    Comments ({}):", record.comments.len()));
        for (j, comment) in record.comments.iter().enumerate() {
            let author = if comment.author.is_empty() {
                "?"
            } else {
                comment.author.as_str()
            };
            lines.push(format!(
                "      {}. {}: {}",
                j + 1,
                author,
                preview(&comment.text, PREVIEW_CHARS)
            ));
        }
    }
    push_error(lines, record, "    ");
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::Comment;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn comment(author: &str, text: &str, score: Option<i64>) -> Comment {
        Comment {
            author: author.into(),
            text: text.into(),
            score,
            permalink: None,
        }
    }

    #[test]
    fn test_reddit_layout() {
        let mut record = ResultRecord::new(Source::Reddit, "abc", "Rate limiting in Go");
        record.community = Some("golang".into());
        record.canonical_link = "https://reddit.com/r/golang/comments/abc/x/".into();
        record.body = "Which\napproach?".into();
        record.created_at = Some(Utc.with_ymd_and_hms(2024, 5, 22, 0, 0, 0).unwrap());
        record.relevance = Some(0.5);
        record.metrics.set(metric::SCORE, 120);
        record.metrics.set(metric::COMMENTS, 34);
        record.comments = vec![comment("gopher", "Use x/time/rate.", Some(12))];
        let records = vec![record];

        let text = render_compact(&Report::new(Source::Reddit, Some("rate limiting"), &records), now());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "## Reddit Search: rate limiting");
        assert_eq!(lines[1], "**Threads found:** 1");
        assert_eq!(
            lines[3],
            "**R1** r/golang | 2024-05-22 (10d ago) | score:120 | 34cmt | rel:50%"
        );
        assert_eq!(lines[6], "  > Which approach?");
        assert_eq!(lines[7], "  **Top comments:**");
        assert_eq!(lines[8], "    1. u/gopher (score:12): Use x/time/rate.");
    }

    #[test]
    fn test_hn_layout_with_error() {
        let mut record = ResultRecord::new(Source::HackerNews, "1", "Show HN: Limiter");
        record.canonical_link = "https://news.ycombinator.com/item?id=1".into();
        record.url = "https://example.com".into();
        record.metrics.set(metric::POINTS, 10);
        record.error = Some("HTTP 503 from https://hn.algolia.com/api/v1/items/1".into());
        let records = vec![record];

        let text = render_compact(&Report::new(Source::HackerNews, Some("limiter"), &records), now());
        assert!(text.contains("**HN1** ? | 10pts | 0cmt"));
        assert!(text.contains("  → https://example.com"));
        assert!(text.contains("  ERROR: HTTP 503"));
    }

    #[test]
    fn test_ph_layout() {
        let mut record = ResultRecord::new(Source::ProductHunt, "101", "Throttle");
        record.tagline = Some("Rate limits as a service".into());
        record.canonical_link = "https://www.producthunt.com/posts/throttle".into();
        record.tags = vec!["developer-tools".into(), "saas".into()];
        record.metrics.set(metric::VOTES, 412);
        let records = vec![record];

        let text = render_compact(&Report::new(Source::ProductHunt, Some("rate"), &records), now());
        assert!(text.starts_with("## ProductHunt Search: rate\n**Products found:** 1"));
        assert!(text.contains("**PH1** ? | 412votes | 0cmt"));
        assert!(text.contains("  Throttle — Rate limits as a service"));
        assert!(text.contains("  Topics: developer-tools, saas"));
    }

    #[test]
    fn test_page_layout() {
        let mut record = ResultRecord::new(Source::Web, "h", "");
        record.url = "https://lobste.rs/s/abc".into();
        record.canonical_link = "https://lobste.rs/s/abc/token_buckets".into();
        record.metrics.set(metric::SCORE, 42);
        record.comments = vec![comment("", "Nice   write\nup", None)];
        let records = vec![record];

        let text = render_compact(&Report::new(Source::Web, None, &records), now());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[1] No title");
        assert_eq!(lines[1], "    URL: https://lobste.rs/s/abc/token_buckets");
        assert_eq!(lines[2], "    Score: 42");
        assert_eq!(lines[3], "    Comments (1):");
        assert_eq!(lines[4], "      1. ?: Nice write up");
    }
}
