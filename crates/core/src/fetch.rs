//! Page fetching.
//!
//! The crawler talks to the site through the [`Transport`] trait, which issues
//! a GET and hands back the status and body. [`HttpTransport`] is the real
//! implementation on top of reqwest; [`MemoryTransport`] serves canned pages
//! and is used for offline runs and tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

#[cfg(feature = "fetch")]
use std::time::Duration;

#[cfg(feature = "fetch")]
use reqwest::{Client, header};
#[cfg(feature = "fetch")]
use url::Url;

#[cfg(feature = "fetch")]
use crate::CrawlerError;
use crate::Result;

/// Cookie that confirms the age gate of adult boards.
pub const AGE_COOKIE: &str = "over18=1";

/// HTTP client configuration for fetching board pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 3,
            user_agent: "Mozilla/5.0 (compatible; pttcrawl/1.0)".to_string(),
            verify_tls: true,
        }
    }
}

/// Status, final URL and body of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self { status, url: url.into(), body: body.into() }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests on behalf of the crawler.
///
/// Implementations return `Ok` for any HTTP answer, including error statuses;
/// `Err` is reserved for transport failures such as timeouts.
pub trait Transport {
    fn get(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}

/// [`Transport`] backed by a reqwest client.
///
/// Every request carries the age-gate cookie.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: u64,
}

#[cfg(feature = "fetch")]
impl HttpTransport {
    /// Builds the client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::HttpError`] if the TLS backend cannot be initialised.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(CrawlerError::HttpError)?;

        Ok(Self { client, timeout: config.timeout })
    }
}

#[cfg(feature = "fetch")]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        let parsed_url = Url::parse(url).map_err(|e| CrawlerError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .client
            .get(parsed_url)
            .header(header::COOKIE, AGE_COOKIE)
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() { CrawlerError::Timeout { timeout: self.timeout } } else { CrawlerError::HttpError(e) }
            })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchResponse { status, url: final_url, body })
    }
}

/// [`Transport`] serving pages from memory.
///
/// Unknown URLs answer `404`. Requested URLs are recorded in order.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pages: HashMap<String, FetchResponse>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with status 200 at `url`.
    pub fn with_page(mut self, url: &str, body: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), FetchResponse::new(200, url, body));
        self
    }

    /// Answers `url` with `status` and an empty body.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), FetchResponse::new(status, url, ""));
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Transport for MemoryTransport {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        Ok(self.pages.get(url).cloned().unwrap_or_else(|| FetchResponse::new(404, url, "")))
    }
}
