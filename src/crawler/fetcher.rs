//! Rate-limited, memory-cached HTTP fetcher
//!
//! This module handles all network requests for the importer, including:
//! - Building the HTTP client with a proper user agent string
//! - Enforcing a minimum interval between network fetches
//! - Caching raw responses by URL for the lifetime of the process

use crate::config::UserAgentConfig;
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use strongs_graph::config::UserAgentConfig;
/// use strongs_graph::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "StrongsGraph".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(5))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves remote documents with a single-lane rate limit and a memory cache
///
/// One instance is meant to live for the whole process and be lent to each
/// crawl by `&mut`, so the cache and the rate-limit clock carry over between
/// runs. Cache entries never expire.
#[derive(Debug)]
pub struct Fetcher {
    client: Client,
    cache: HashMap<String, String>,
    /// When the most recent network fetch completed
    last_fetch: Option<Instant>,
    min_interval: Duration,
}

impl Fetcher {
    pub fn new(client: Client, min_interval: Duration) -> Self {
        Self {
            client,
            cache: HashMap::new(),
            last_fetch: None,
            min_interval,
        }
    }

    /// Builds a fetcher with a client identified by the configured user agent
    pub fn from_user_agent(
        config: &UserAgentConfig,
        min_interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, min_interval))
    }

    /// Changes the minimum interval; takes effect on the next network fetch
    pub fn set_min_interval(&mut self, min_interval: Duration) {
        self.min_interval = min_interval;
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns the cached body for a URL without touching the network
    pub fn cached(&self, url: &str) -> Option<&str> {
        self.cache.get(url).map(String::as_str)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Fetches a URL's body as text
    ///
    /// # Behavior
    ///
    /// 1. With `use_cache`, a cached body is returned at once: no delay, no request
    /// 2. Otherwise wait until `min_interval` has passed since the last fetch completed
    /// 3. Send the request; record its completion time even if it failed
    /// 4. Cache successful bodies under `url`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The response body
    /// * `Err(FetchError)` - Network failure or a non-success status
    pub async fn get(&mut self, url: &str, use_cache: bool) -> Result<String, FetchError> {
        if use_cache {
            if let Some(body) = self.cache.get(url) {
                tracing::trace!("Cache hit for {}", url);
                return Ok(body.clone());
            }
        }

        if let Some(delay) = self.time_until_next_fetch(Instant::now()) {
            tracing::debug!("Rate limit: waiting {:?} before fetching {}", delay, url);
            sleep(delay).await;
        }

        tracing::debug!("Fetching {}", url);
        let result = self.fetch(url).await;
        self.last_fetch = Some(Instant::now());

        let body = result?;
        self.cache.insert(url.to_string(), body.clone());
        Ok(body)
    }

    /// Calculates how long to wait before the next network fetch
    ///
    /// Returns None if a fetch can be made now.
    fn time_until_next_fetch(&self, now: Instant) -> Option<Duration> {
        let last = self.last_fetch?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }

    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| classify(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| classify(url, source))
    }
}

fn classify(url: &str, source: reqwest::Error) -> FetchError {
    if source.is_builder() {
        FetchError::InvalidUrl(url.to_string())
    } else {
        FetchError::Http {
            url: url.to_string(),
            source,
        }
    }
}
