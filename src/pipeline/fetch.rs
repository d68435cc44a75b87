//! Feed fetch stage.
//!
//! The feed source is an external collaborator behind [`FeedSource`]; the
//! default implementation pulls a configured RSS URL over HTTP with the
//! worker's retry policy and extracts raw `{title, summary HTML, link}`
//! records. Feed-format handling is deliberately minimal: the pipeline only
//! needs those three fields, and entries beyond the configured cap are
//! truncated here, never downstream.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use super::clean::decode_entities;
use crate::util::retry::{RetryConfig, is_retryable};

/// Raw article record as supplied by the feed collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeedArticle {
    pub title: String,
    /// Summary as found in the feed; may contain markup.
    pub summary_html: String,
    pub link: String,
}

/// External feed collaborator: returns at most the configured number of raw
/// articles per fetch.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_articles(&self) -> Result<Vec<RawFeedArticle>>;
}

/// HTTPで RSS フィードを取得する既定の実装。
pub struct RemoteFeedSource {
    client: reqwest::Client,
    feed_url: String,
    max_articles: usize,
    retry_config: RetryConfig,
}

impl RemoteFeedSource {
    /// 新しいフィードソースを構築する。
    ///
    /// # Errors
    /// HTTPクライアントの構築に失敗した場合はエラーを返す。
    pub fn new(
        feed_url: String,
        connect_timeout: Duration,
        total_timeout: Duration,
        max_articles: usize,
        retry_config: RetryConfig,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(total_timeout)
            .build()
            .context("failed to build feed HTTP client")?;

        Ok(Self {
            client,
            feed_url,
            max_articles,
            retry_config,
        })
    }

    /// 再試行付きでフィード本文を取得する。
    async fn fetch_body_with_retry(&self) -> Result<String> {
        let mut attempt = 0;

        loop {
            match self.fetch_body().await {
                Ok(body) => {
                    if attempt > 0 {
                        info!(attempt, "feed fetch succeeded after retry");
                    }
                    return Ok(body);
                }
                Err(err) => {
                    attempt += 1;

                    if !self.retry_config.can_retry(attempt) {
                        warn!(
                            attempt,
                            max_attempts = self.retry_config.max_attempts,
                            "feed fetch failed after all retries"
                        );
                        return Err(err);
                    }

                    if !is_retryable(&err) {
                        warn!(?err, "feed fetch error is not retryable");
                        return Err(err);
                    }

                    let delay = self.retry_config.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        "feed fetch failed, retrying after delay"
                    );

                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn fetch_body(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .context("feed request failed")?
            .error_for_status()
            .context("feed responded with an error status")?;

        response.text().await.context("failed to read feed body")
    }
}

#[async_trait]
impl FeedSource for RemoteFeedSource {
    async fn fetch_articles(&self) -> Result<Vec<RawFeedArticle>> {
        let body = self.fetch_body_with_retry().await?;
        let articles = parse_rss_items(&body, self.max_articles);

        info!(
            feed_url = %self.feed_url,
            count = articles.len(),
            "fetched articles from feed"
        );

        Ok(articles)
    }
}

static ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").expect("compile item pattern"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("compile title pattern"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").expect("compile link pattern"));
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<description\b[^>]*>(.*?)</description>").expect("compile description pattern")
});

/// Extract up to `cap` raw articles from an RSS document.
///
/// Items without a title are skipped; a missing link or description becomes
/// an empty string. Title and link are entity-decoded here, the description
/// stays raw for the cleaning stage.
#[must_use]
pub fn parse_rss_items(xml: &str, cap: usize) -> Vec<RawFeedArticle> {
    ITEM_RE
        .captures_iter(xml)
        .filter_map(|item| {
            let block = item.get(1)?.as_str();
            let title = extract_field(block, &TITLE_RE)?;
            if title.is_empty() {
                return None;
            }

            Some(RawFeedArticle {
                title: decode_entities(&title),
                summary_html: extract_field(block, &DESCRIPTION_RE).unwrap_or_default(),
                link: extract_field(block, &LINK_RE)
                    .map(|link| decode_entities(&link))
                    .unwrap_or_default(),
            })
        })
        .take(cap)
        .collect()
}

fn extract_field(block: &str, pattern: &Regex) -> Option<String> {
    let raw = pattern.captures(block)?.get(1)?.as_str().trim();
    let unwrapped = raw
        .strip_prefix("<![CDATA[")
        .and_then(|inner| inner.strip_suffix("]]>"))
        .unwrap_or(raw);
    Some(unwrapped.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
<title>Example Feed</title>
<item>
  <title>Markets rally on strong earnings</title>
  <link>https://example.com/rally</link>
  <description>&lt;p&gt;Stocks &lt;b&gt;soared&lt;/b&gt; today.&lt;/p&gt;</description>
</item>
<item>
  <title><![CDATA[Storm damage &amp; recovery efforts]]></title>
  <link>https://example.com/storm</link>
  <description><![CDATA[<p>Cleanup is underway.</p>]]></description>
</item>
<item>
  <title></title>
  <link>https://example.com/untitled</link>
</item>
</channel></rss>"#;

    #[test]
    fn parse_extracts_items_in_order() {
        let articles = parse_rss_items(FEED, 20);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Markets rally on strong earnings");
        assert_eq!(articles[0].link, "https://example.com/rally");
        assert_eq!(articles[1].title, "Storm damage & recovery efforts");
    }

    #[test]
    fn parse_keeps_description_markup_for_cleaning() {
        let articles = parse_rss_items(FEED, 20);
        assert!(articles[0].summary_html.contains("&lt;p&gt;"));
        assert_eq!(articles[1].summary_html, "<p>Cleanup is underway.</p>");
    }

    #[test]
    fn parse_truncates_at_cap() {
        let articles = parse_rss_items(FEED, 1);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Markets rally on strong earnings");
    }

    #[test]
    fn parse_handles_non_feed_body() {
        assert!(parse_rss_items("<html><body>not a feed</body></html>", 20).is_empty());
        assert!(parse_rss_items("", 20).is_empty());
    }

    #[test]
    fn missing_link_becomes_empty() {
        let xml = "<item><title>Linkless</title></item>";
        let articles = parse_rss_items(xml, 20);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].link, "");
        assert_eq!(articles[0].summary_html, "");
    }
}
