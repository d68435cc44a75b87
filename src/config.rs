use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    users_db_dsn: String,
    users_db_max_connections: u32,
    news_feed_url: String,
    news_max_articles: usize,
    feed_connect_timeout: Duration,
    feed_total_timeout: Duration,
    http_max_retries: usize,
    http_backoff_base_ms: u64,
    http_backoff_cap_ms: u64,
    positive_threshold: f64,
    negative_threshold: f64,
    lexicon_path: Option<String>,
    session_ttl: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から設定値を読み込み、検証する。
    ///
    /// # Errors
    /// `USERS_DB_DSN` が未設定、もしくは各種値のパースに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let users_db_dsn = env_var("USERS_DB_DSN")?;
        let users_db_max_connections = parse_u32("USERS_DB_MAX_CONNECTIONS", 5)?;
        let http_bind = parse_socket_addr("SENTIMENT_WORKER_HTTP_BIND", "0.0.0.0:9007")?;

        // Feed settings
        let news_feed_url = env::var("NEWS_FEED_URL")
            .unwrap_or_else(|_| "https://news.google.com/news/rss".to_string());
        let news_max_articles = parse_usize("NEWS_MAX_ARTICLES", 20)?;
        let feed_connect_timeout = parse_duration_ms("FEED_CONNECT_TIMEOUT_MS", 3000)?;
        let feed_total_timeout = parse_duration_ms("FEED_TOTAL_TIMEOUT_MS", 15000)?;

        // Retry settings (exponential backoff + jitter)
        let http_max_retries = parse_usize("HTTP_MAX_RETRIES", 3)?;
        let http_backoff_base_ms = parse_u64("HTTP_BACKOFF_BASE_MS", 250)?;
        let http_backoff_cap_ms = parse_u64("HTTP_BACKOFF_CAP_MS", 10000)?;

        // Scoring thresholds for per-article labels
        let positive_threshold = parse_f64("SENTIMENT_POSITIVE_THRESHOLD", 0.05)?;
        let negative_threshold = parse_f64("SENTIMENT_NEGATIVE_THRESHOLD", -0.05)?;
        if negative_threshold > positive_threshold {
            return Err(ConfigError::Invalid {
                name: "SENTIMENT_NEGATIVE_THRESHOLD",
                source: anyhow::anyhow!("must not exceed the positive threshold"),
            });
        }
        let lexicon_path = env::var("SENTIMENT_LEXICON_PATH").ok();

        let session_ttl = parse_duration_secs("SESSION_TTL_SECS", 86400)?;

        Ok(Self {
            http_bind,
            users_db_dsn,
            users_db_max_connections,
            news_feed_url,
            news_max_articles,
            feed_connect_timeout,
            feed_total_timeout,
            http_max_retries,
            http_backoff_base_ms,
            http_backoff_cap_ms,
            positive_threshold,
            negative_threshold,
            lexicon_path,
            session_ttl,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn users_db_dsn(&self) -> &str {
        &self.users_db_dsn
    }

    #[must_use]
    pub fn users_db_max_connections(&self) -> u32 {
        self.users_db_max_connections
    }

    #[must_use]
    pub fn news_feed_url(&self) -> &str {
        &self.news_feed_url
    }

    #[must_use]
    pub fn news_max_articles(&self) -> usize {
        self.news_max_articles
    }

    #[must_use]
    pub fn feed_connect_timeout(&self) -> Duration {
        self.feed_connect_timeout
    }

    #[must_use]
    pub fn feed_total_timeout(&self) -> Duration {
        self.feed_total_timeout
    }

    #[must_use]
    pub fn http_max_retries(&self) -> usize {
        self.http_max_retries
    }

    #[must_use]
    pub fn http_backoff_base_ms(&self) -> u64 {
        self.http_backoff_base_ms
    }

    #[must_use]
    pub fn http_backoff_cap_ms(&self) -> u64 {
        self.http_backoff_cap_ms
    }

    #[must_use]
    pub fn positive_threshold(&self) -> f64 {
        self.positive_threshold
    }

    #[must_use]
    pub fn negative_threshold(&self) -> f64 {
        self.negative_threshold
    }

    #[must_use]
    pub fn lexicon_path(&self) -> Option<&str> {
        self.lexicon_path.as_deref()
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_duration_secs(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    let value = parse_u64(name, default_secs)?;
    Ok(Duration::from_secs(value))
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default_ms.to_string());
    let ms = raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    Ok(Duration::from_millis(ms))
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u32(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u32>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_f64(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<f64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_env(name: &str, value: &str) {
        // SAFETY: tests run sequentially and assign valid UTF-8 values.
        unsafe {
            env::set_var(name, value);
        }
    }

    fn remove_env(name: &str) {
        // SAFETY: tests run sequentially and clean up deterministic keys.
        unsafe {
            env::remove_var(name);
        }
    }

    fn clear_all() {
        for name in [
            "USERS_DB_DSN",
            "USERS_DB_MAX_CONNECTIONS",
            "SENTIMENT_WORKER_HTTP_BIND",
            "NEWS_FEED_URL",
            "NEWS_MAX_ARTICLES",
            "FEED_CONNECT_TIMEOUT_MS",
            "FEED_TOTAL_TIMEOUT_MS",
            "HTTP_MAX_RETRIES",
            "HTTP_BACKOFF_BASE_MS",
            "HTTP_BACKOFF_CAP_MS",
            "SENTIMENT_POSITIVE_THRESHOLD",
            "SENTIMENT_NEGATIVE_THRESHOLD",
            "SENTIMENT_LEXICON_PATH",
            "SESSION_TTL_SECS",
        ] {
            remove_env(name);
        }
    }

    #[test]
    fn from_env_applies_defaults() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        clear_all();
        set_env("USERS_DB_DSN", "sqlite::memory:");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.users_db_dsn(), "sqlite::memory:");
        assert_eq!(config.http_bind().port(), 9007);
        assert_eq!(config.news_feed_url(), "https://news.google.com/news/rss");
        assert_eq!(config.news_max_articles(), 20);
        assert_eq!(config.http_max_retries(), 3);
        assert!((config.positive_threshold() - 0.05).abs() < f64::EPSILON);
        assert!((config.negative_threshold() + 0.05).abs() < f64::EPSILON);
        assert_eq!(config.session_ttl(), Duration::from_secs(86400));
        assert_eq!(config.lexicon_path(), None);

        clear_all();
    }

    #[test]
    fn from_env_requires_users_db_dsn() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        clear_all();

        let err = Config::from_env().expect_err("missing dsn should fail");
        assert!(matches!(err, ConfigError::Missing("USERS_DB_DSN")));
    }

    #[test]
    fn from_env_reads_overrides() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        clear_all();
        set_env("USERS_DB_DSN", "sqlite:users.db");
        set_env("SENTIMENT_WORKER_HTTP_BIND", "127.0.0.1:8080");
        set_env("NEWS_MAX_ARTICLES", "5");
        set_env("SENTIMENT_POSITIVE_THRESHOLD", "0.1");
        set_env("SENTIMENT_NEGATIVE_THRESHOLD", "-0.1");
        set_env("SENTIMENT_LEXICON_PATH", "/etc/sentiment/lexicon.txt");

        let config = Config::from_env().expect("config should load");

        assert_eq!(config.http_bind().port(), 8080);
        assert_eq!(config.news_max_articles(), 5);
        assert!((config.positive_threshold() - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.lexicon_path(), Some("/etc/sentiment/lexicon.txt"));

        clear_all();
    }

    #[test]
    fn from_env_rejects_inverted_thresholds() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        clear_all();
        set_env("USERS_DB_DSN", "sqlite::memory:");
        set_env("SENTIMENT_POSITIVE_THRESHOLD", "-0.2");
        set_env("SENTIMENT_NEGATIVE_THRESHOLD", "0.2");

        let err = Config::from_env().expect_err("inverted thresholds should fail");
        assert!(matches!(err, ConfigError::Invalid { .. }));

        clear_all();
    }

    #[test]
    fn from_env_rejects_malformed_numbers() {
        let _lock = ENV_MUTEX.lock().expect("env mutex");
        clear_all();
        set_env("USERS_DB_DSN", "sqlite::memory:");
        set_env("NEWS_MAX_ARTICLES", "twenty");

        let err = Config::from_env().expect_err("malformed number should fail");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "NEWS_MAX_ARTICLES",
                ..
            }
        ));

        clear_all();
    }
}
