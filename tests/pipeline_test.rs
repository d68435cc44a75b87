//! フィード取得から集計までのパイプライン統合テスト。

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use prometheus::Registry;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sentiment_worker::analysis::{SentimentEngine, SentimentLabel};
use sentiment_worker::observability::metrics::Metrics;
use sentiment_worker::pipeline::NewsPipeline;
use sentiment_worker::pipeline::fetch::{FeedSource, RemoteFeedSource};
use sentiment_worker::pipeline::score::ScoreStage;
use sentiment_worker::util::retry::RetryConfig;

fn rss(items: &[(&str, &str)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel><title>Test</title>",
    );
    for (title, description) in items {
        write!(
            body,
            "<item><title>{title}</title><link>https://example.com/x</link>\
             <description>{description}</description></item>"
        )
        .expect("write item");
    }
    body.push_str("</channel></rss>");
    body
}

fn source(url: String, max_articles: usize) -> RemoteFeedSource {
    RemoteFeedSource::new(
        url,
        Duration::from_secs(3),
        Duration::from_secs(10),
        max_articles,
        RetryConfig::new(3, 1, 5),
    )
    .expect("feed source")
}

fn pipeline(feed: RemoteFeedSource) -> NewsPipeline {
    let engine = SentimentEngine::with_embedded_lexicon().expect("embedded lexicon");
    let registry = Arc::new(Registry::new());
    let metrics = Arc::new(Metrics::new(&registry).expect("metrics"));
    NewsPipeline::new(Arc::new(feed), ScoreStage::new(Arc::new(engine)), metrics)
}

#[tokio::test]
async fn digest_scores_feed_articles_in_order() {
    let server = MockServer::start().await;
    let body = rss(&[
        ("Wonderful recovery lifts markets", "&lt;p&gt;A &lt;b&gt;fantastic&lt;/b&gt; rally.&lt;/p&gt;"),
        ("Crisis deepens after terrible losses", "Widespread damage reported."),
    ]);
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let digest = pipeline(source(format!("{}/rss", server.uri()), 20))
        .run()
        .await
        .expect("digest");

    assert_eq!(digest.articles.len(), 2);
    assert_eq!(digest.articles[0].title, "Wonderful recovery lifts markets");
    assert_eq!(digest.articles[0].sentiment, SentimentLabel::Positive);
    assert_eq!(digest.articles[0].summary, "A fantastic rally.");
    assert_eq!(digest.articles[1].sentiment, SentimentLabel::Negative);

    for article in &digest.articles {
        let cents = article.score * 100.0;
        assert!((cents - cents.round()).abs() < 1e-9, "score not rounded");
    }
}

#[tokio::test]
async fn digest_caps_article_count() {
    let server = MockServer::start().await;
    let items: Vec<(String, String)> = (0..30)
        .map(|i| (format!("Story number {i}"), String::from("Nothing notable.")))
        .collect();
    let refs: Vec<(&str, &str)> = items
        .iter()
        .map(|(t, d)| (t.as_str(), d.as_str()))
        .collect();
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&refs)))
        .mount(&server)
        .await;

    let digest = pipeline(source(format!("{}/rss", server.uri()), 20))
        .run()
        .await
        .expect("digest");

    assert_eq!(digest.articles.len(), 20);
    assert_eq!(digest.articles[0].title, "Story number 0");
    assert_eq!(digest.articles[19].title, "Story number 19");
}

#[tokio::test]
async fn empty_feed_yields_neutral_digest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[])))
        .mount(&server)
        .await;

    let digest = pipeline(source(format!("{}/rss", server.uri()), 20))
        .run()
        .await
        .expect("digest");

    assert!(digest.articles.is_empty());
    assert_eq!(digest.overall.label, SentimentLabel::Neutral);
    assert!(digest.overall.score.abs() < f64::EPSILON);
}

#[tokio::test]
async fn fetch_retries_transient_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(&[("Calm day on the exchange", "Nothing moved.")])),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let articles = source(format!("{}/rss", server.uri()), 20)
        .fetch_articles()
        .await
        .expect("retried fetch");

    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "Calm day on the exchange");
}

#[tokio::test]
async fn fetch_gives_up_on_persistent_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = source(format!("{}/rss", server.uri()), 20)
        .fetch_articles()
        .await;

    assert!(result.is_err());
}
