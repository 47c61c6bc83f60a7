//! Board crawling.
//!
//! [`Crawler`] walks a range of listing pages of a board, fetches every
//! article they link to and streams the results into one JSON document. It
//! also crawls single articles and resolves the index of the newest listing
//! page.
//!
//! Failures are contained at the smallest unit they affect: a listing page
//! that cannot be fetched is skipped, an article that cannot be fetched or
//! decoded becomes an [`ErrorRecord`], and a listing entry without a usable
//! link is dropped. Only output and configuration errors end a crawl.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use pttcrawl_core::{CrawlConfig, Crawler, FetchConfig, HttpTransport, PageEnd};
//!
//! # #[tokio::main]
//! # async fn main() -> pttcrawl_core::Result<()> {
//! let transport = HttpTransport::new(&FetchConfig::default())?;
//! let crawler = Crawler::new(transport, CrawlConfig::builder().output_dir("out").build());
//!
//! let report = crawler.crawl_range("Gossiping", 39000, PageEnd::Last, &HashSet::new()).await?;
//! println!("wrote {} articles to {}", report.summary.articles, report.path.display());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::aid::article_id_from_href;
use crate::article::{Article, ArticleOutcome, ErrorRecord};
use crate::extract::extract_article;
use crate::fetch::{FetchResponse, Transport};
use crate::parse::Document;
use crate::stream::{ArticleStream, write_outcome};
use crate::{CrawlerError, Result};

/// Site root.
pub const PTT_URL: &str = "https://www.ptt.cc";

/// Crawl settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use pttcrawl_core::CrawlConfig;
///
/// let config = CrawlConfig::builder()
///     .output_dir("data")
///     .page_delay(Duration::ZERO)
///     .build();
/// assert_eq!(config.base_url, "https://www.ptt.cc");
/// ```
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Site root that board paths are appended to (default: `https://www.ptt.cc`).
    ///
    /// Article identifiers can only be derived for `https://www.ptt.cc/bbs/...`
    /// URLs, so with any other root every article comes back as
    /// [`ErrorRecord::invalid_url`]. Listing pages and pagination still work.
    pub base_url: String,

    /// Directory output files are written to (default: `.`).
    pub output_dir: PathBuf,

    /// Pause after every listing page fetch (default: 100ms).
    pub page_delay: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { base_url: PTT_URL.to_string(), output_dir: PathBuf::from("."), page_delay: Duration::from_millis(100) }
    }
}

impl CrawlConfig {
    /// Creates a new builder for CrawlConfig.
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::new()
    }
}

/// Builder for CrawlConfig.
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: CrawlConfig::default() }
    }

    /// Sets the site root. See [`CrawlConfig::base_url`].
    pub fn base_url(mut self, value: impl Into<String>) -> Self {
        self.config.base_url = value.into();
        self
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, value: impl Into<PathBuf>) -> Self {
        self.config.output_dir = value.into();
        self
    }

    /// Sets the pause after every listing page.
    pub fn page_delay(mut self, value: Duration) -> Self {
        self.config.page_delay = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> CrawlConfig {
        self.config
    }
}

impl Default for CrawlConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Last page of a crawl range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEnd {
    /// The newest listing page, looked up before crawling.
    Last,
    Index(u32),
}

impl PageEnd {
    /// Interprets a command-line end index, where `-1` means the last page.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::ConfigError`] for `0` and negatives other than `-1`.
    pub fn from_index(index: i64) -> Result<Self> {
        match index {
            -1 => Ok(PageEnd::Last),
            1..=i64::MAX => u32::try_from(index)
                .map(PageEnd::Index)
                .map_err(|_| CrawlerError::ConfigError(format!("page index {} is too large", index))),
            _ => Err(CrawlerError::ConfigError(format!(
                "page index must be positive or -1 for the last page, got {}",
                index
            ))),
        }
    }
}

/// One `div.r-ent` row of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    Article { url: String, article_id: String },
    Skipped { reason: String },
}

/// Reads the article links of a listing page, in page order.
///
/// Rows without a usable link (deleted articles, broken markup) come back as
/// [`ListingEntry::Skipped`].
pub fn parse_listing(doc: &Document, base: &Url) -> Result<Vec<ListingEntry>> {
    let mut entries = Vec::new();
    for row in doc.select("div.r-ent")? {
        let href = row.select_first("a")?.and_then(|a| a.attr("href"));
        entries.push(listing_entry(base, href));
    }
    Ok(entries)
}

fn listing_entry(base: &Url, href: Option<&str>) -> ListingEntry {
    let skipped = |reason: String| ListingEntry::Skipped { reason };

    let Some(href) = href else {
        return skipped("no article link".to_string());
    };
    let url = match base.join(href) {
        Ok(url) => url,
        Err(e) => return skipped(format!("bad link {:?}: {}", href, e)),
    };
    match article_id_from_href(href) {
        Some(article_id) => ListingEntry::Article { url: url.to_string(), article_id },
        None => skipped(format!("no article id in {:?}", href)),
    }
}

/// Counters of a finished crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Listing pages requested.
    pub pages: usize,
    /// Listing pages skipped because their fetch failed.
    pub pages_skipped: usize,
    /// Outcomes written, error records included.
    pub articles: usize,
    /// Error records among `articles`.
    pub failed: usize,
    /// Listing entries without a usable link.
    pub entries_skipped: usize,
    /// Links skipped because the caller asked for it.
    pub links_skipped: usize,
}

/// Where a crawl wrote its output, and what it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub path: PathBuf,
    pub summary: CrawlSummary,
}

/// Crawls a board through a [`Transport`].
pub struct Crawler<T> {
    transport: T,
    config: CrawlConfig,
}

impl<T: Transport> Crawler<T> {
    pub fn new(transport: T, config: CrawlConfig) -> Self {
        Self { transport, config }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// The site root as an absolute URL, for resolving listing links.
    fn base_url(&self) -> Result<Url> {
        Url::parse(self.base()).map_err(|e| CrawlerError::InvalidUrl(format!("{}: {}", self.base(), e)))
    }

    /// URL of listing page `index`, or of the board root when `None`.
    pub fn index_url(&self, board: &str, index: Option<u32>) -> String {
        match index {
            Some(index) => format!("{}/bbs/{}/index{}.html", self.base(), board, index),
            None => format!("{}/bbs/{}/index.html", self.base(), board),
        }
    }

    /// URL of an article on `board`.
    pub fn article_url(&self, board: &str, article_id: &str) -> String {
        format!("{}/bbs/{}/{}.html", self.base(), board, article_id)
    }

    /// Index of the newest listing page of `board`.
    ///
    /// The board root shows the newest page, whose "previous page" link points
    /// one below it. A board without that link has a single page.
    ///
    /// # Errors
    ///
    /// Fails when the board root cannot be fetched.
    pub async fn last_page(&self, board: &str) -> Result<u32> {
        let url = self.index_url(board, None);
        let response = self.fetch(&url).await?;

        let pattern = format!(r#"href="/bbs/{}/index(\d+)\.html">&lsaquo;"#, regex::escape(board));
        let re = Regex::new(&pattern).map_err(|e| CrawlerError::ConfigError(e.to_string()))?;

        let previous = re
            .captures(&response.body)
            .and_then(|caps| caps[1].parse::<u32>().ok());

        let last = previous.map_or(1, |n| n.saturating_add(1));
        debug!(board, last, "resolved last page");
        Ok(last)
    }

    /// Resolves [`PageEnd::Last`] to a concrete index.
    pub async fn resolve_end(&self, board: &str, end: PageEnd) -> Result<u32> {
        match end {
            PageEnd::Index(index) => Ok(index),
            PageEnd::Last => self.last_page(board).await,
        }
    }

    /// Fetches `url`, turning non-success statuses into [`CrawlerError::Status`].
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let response = self.transport.get(url).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(CrawlerError::Status { status: response.status, url: response.url })
        }
    }

    /// Fetches and extracts one article.
    ///
    /// Never fails: fetch and decode failures are logged and come back as
    /// [`ErrorRecord::invalid_url`].
    pub async fn fetch_article(&self, url: &str, article_id: &str) -> ArticleOutcome {
        info!(article_id, "processing article");

        let response = match self.fetch(url).await {
            Ok(response) => response,
            Err(e) if e.is_fetch_failure() => {
                warn!(url, error = %e, "invalid url");
                return ErrorRecord::invalid_url().into();
            }
            Err(e) => {
                error!(url, error = %e, "article request could not be made");
                return ErrorRecord::invalid_url().into();
            }
        };

        let extracted = Document::parse(&response.body).and_then(|doc| extract_article(&doc, article_id, url));
        match extracted {
            Ok(article) => article.into(),
            Err(e) => {
                warn!(url, error = %e, "article extraction failed");
                ErrorRecord::invalid_url().into()
            }
        }
    }

    /// Walks listing pages `start..=end`, handing every outcome to `sink` in
    /// crawl order.
    async fn walk_range<F>(
        &self, base: &Url, board: &str, start: u32, end: u32, skip: &HashSet<String>, mut sink: F,
    ) -> Result<CrawlSummary>
    where
        F: FnMut(ArticleOutcome) -> Result<()>,
    {
        let mut summary = CrawlSummary::default();

        for index in start..=end {
            info!(board, index, "processing index");
            summary.pages += 1;

            let page = self.fetch(&self.index_url(board, Some(index))).await;
            self.pace().await;

            let response = match page {
                Ok(response) => response,
                Err(e) => {
                    warn!(board, index, error = %e, "skipping listing page");
                    summary.pages_skipped += 1;
                    continue;
                }
            };

            let entries = {
                let doc = Document::parse(&response.body)?;
                parse_listing(&doc, base)?
            };

            for entry in entries {
                let (url, article_id) = match entry {
                    ListingEntry::Article { url, article_id } => (url, article_id),
                    ListingEntry::Skipped { reason } => {
                        debug!(board, index, reason = %reason, "skipping listing entry");
                        summary.entries_skipped += 1;
                        continue;
                    }
                };

                if skip.contains(&url) {
                    debug!(url = %url, "skipping link on request");
                    summary.links_skipped += 1;
                    continue;
                }

                let outcome = self.fetch_article(&url, &article_id).await;
                summary.articles += 1;
                if outcome.is_error() {
                    summary.failed += 1;
                }
                sink(outcome)?;
            }
        }

        Ok(summary)
    }

    async fn pace(&self) {
        if !self.config.page_delay.is_zero() {
            tokio::time::sleep(self.config.page_delay).await;
        }
    }

    /// Crawls listing pages `start..=end` of `board` into
    /// `<output_dir>/<board>-<start>-<end>.json`.
    ///
    /// Links in `skip` are not fetched. The file name uses the resolved end
    /// index when `end` is [`PageEnd::Last`].
    ///
    /// # Errors
    ///
    /// Fails when the site root is not a URL, the last page cannot be
    /// resolved or the output cannot be written; page and article failures
    /// are absorbed. No output file is created when the crawl fails before
    /// its first page.
    pub async fn crawl_range(
        &self, board: &str, start: u32, end: PageEnd, skip: &HashSet<String>,
    ) -> Result<CrawlReport> {
        let base = self.base_url()?;
        let end = self.resolve_end(board, end).await?;
        let path = self.config.output_dir.join(format!("{}-{}-{}.json", board, start, end));

        let mut stream = ArticleStream::create(&path)?;
        let summary = self.walk_range(&base, board, start, end, skip, |outcome| stream.push(&outcome)).await?;
        stream.finish()?;

        info!(
            path = %path.display(),
            pages = summary.pages,
            pages_skipped = summary.pages_skipped,
            articles = summary.articles,
            failed = summary.failed,
            "crawl finished"
        );
        Ok(CrawlReport { path, summary })
    }

    /// Crawls listing pages `start..=end` of `board` into memory.
    ///
    /// Only successfully extracted articles are returned.
    pub async fn collect_range(
        &self, board: &str, start: u32, end: PageEnd, skip: &HashSet<String>,
    ) -> Result<Vec<Article>> {
        let base = self.base_url()?;
        let end = self.resolve_end(board, end).await?;
        let mut articles = Vec::new();
        self.walk_range(&base, board, start, end, skip, |outcome| {
            articles.extend(outcome.into_article());
            Ok(())
        })
        .await?;
        Ok(articles)
    }

    /// Crawls one article into `<output_dir>/<board>-<article_id>.json`.
    ///
    /// The file holds the article record, or `{"error": "invalid url"}` when
    /// the article could not be fetched.
    pub async fn crawl_article(&self, board: &str, article_id: &str) -> Result<CrawlReport> {
        let url = self.article_url(board, article_id);
        let path = self.config.output_dir.join(format!("{}-{}.json", board, article_id));

        let outcome = self.fetch_article(&url, article_id).await;
        let summary = CrawlSummary { articles: 1, failed: usize::from(outcome.is_error()), ..Default::default() };
        write_outcome(&path, &outcome)?;

        Ok(CrawlReport { path, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryTransport;

    fn crawler(transport: MemoryTransport) -> Crawler<MemoryTransport> {
        Crawler::new(transport, CrawlConfig::builder().page_delay(Duration::ZERO).build())
    }

    #[test]
    fn test_page_end_from_index() {
        assert_eq!(PageEnd::from_index(-1).unwrap(), PageEnd::Last);
        assert_eq!(PageEnd::from_index(7).unwrap(), PageEnd::Index(7));
        assert!(matches!(PageEnd::from_index(0), Err(CrawlerError::ConfigError(_))));
        assert!(matches!(PageEnd::from_index(-2), Err(CrawlerError::ConfigError(_))));
        assert!(PageEnd::from_index(i64::MAX).is_err());
    }

    #[test]
    fn test_urls() {
        let crawler = Crawler::new(
            MemoryTransport::new(),
            CrawlConfig::builder().base_url("https://www.ptt.cc/").build(),
        );
        assert_eq!(crawler.index_url("Test", Some(3)), "https://www.ptt.cc/bbs/Test/index3.html");
        assert_eq!(crawler.index_url("Test", None), "https://www.ptt.cc/bbs/Test/index.html");
        assert_eq!(
            crawler.article_url("Test", "M.1.A"),
            "https://www.ptt.cc/bbs/Test/M.1.A.html"
        );
    }

    #[test]
    fn test_parse_listing() {
        let html = r#"
            <div class="r-list-container">
                <div class="r-ent"><div class="title"><a href="/bbs/Test/M.1409529482.A.9D3.html">[問題] 一</a></div></div>
                <div class="r-ent"><div class="title">(本文已被刪除) [someone]</div></div>
                <div class="r-ent"><div class="title"><a>沒有連結</a></div></div>
                <div class="r-ent"><div class="title"><a href="/bbs/Test/M.1409529500.A.123.html">Re: [問題] 一</a></div></div>
            </div>
        "#;
        let doc = Document::parse(html).unwrap();
        let base = Url::parse(PTT_URL).unwrap();
        let entries = parse_listing(&doc, &base).unwrap();

        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[0],
            ListingEntry::Article {
                url: "https://www.ptt.cc/bbs/Test/M.1409529482.A.9D3.html".to_string(),
                article_id: "M.1409529482.A.9D3".to_string(),
            }
        );
        assert!(matches!(entries[1], ListingEntry::Skipped { .. }));
        assert!(matches!(entries[2], ListingEntry::Skipped { .. }));
        assert!(matches!(entries[3], ListingEntry::Article { .. }));
    }

    #[tokio::test]
    async fn test_last_page_single_page_board() {
        let transport = MemoryTransport::new()
            .with_page("https://www.ptt.cc/bbs/Tiny/index.html", r#"<a class="btn wide disabled">&lsaquo; 上頁</a>"#);
        assert_eq!(crawler(transport).last_page("Tiny").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_last_page_from_previous_link() {
        let transport = MemoryTransport::new().with_page(
            "https://www.ptt.cc/bbs/Big/index.html",
            r#"<a class="btn wide" href="/bbs/Big/index1.html">最舊</a><a class="btn wide" href="/bbs/Big/index3915.html">&lsaquo; 上頁</a>"#,
        );
        assert_eq!(crawler(transport).last_page("Big").await.unwrap(), 3916);
    }

    #[tokio::test]
    async fn test_last_page_unreachable_board() {
        let result = crawler(MemoryTransport::new()).last_page("Nope").await;
        assert!(matches!(result, Err(CrawlerError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_fetch_article_failure_is_error_record() {
        let crawler = crawler(MemoryTransport::new());
        let outcome = crawler
            .fetch_article("https://www.ptt.cc/bbs/Test/M.1.A.html", "M.1.A")
            .await;
        assert_eq!(outcome, ArticleOutcome::Error(ErrorRecord::invalid_url()));
    }

    #[test]
    fn test_default_page_delay() {
        assert_eq!(CrawlConfig::default().page_delay, Duration::from_millis(100));
        assert_eq!(CrawlConfig::builder().build().page_delay, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_crawl_range_bad_base_url_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlConfig::builder()
            .base_url("not a url")
            .output_dir(dir.path())
            .page_delay(Duration::ZERO)
            .build();
        let crawler = Crawler::new(MemoryTransport::new(), config);

        let result = crawler.crawl_range("Test", 1, PageEnd::Index(1), &HashSet::new()).await;

        assert!(matches!(result, Err(CrawlerError::InvalidUrl(_))));
        assert!(!dir.path().join("Test-1-1.json").exists());
        assert!(crawler.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_base_url_yields_error_records() {
        let url = "https://mirror.example/bbs/Test/M.1409529482.A.9D3.html";
        let transport = MemoryTransport::new().with_page(url, r#"<div id="main-content">內文</div>"#);
        let config = CrawlConfig::builder().base_url("https://mirror.example").page_delay(Duration::ZERO).build();
        let crawler = Crawler::new(transport, config);

        let article_url = crawler.article_url("Test", "M.1409529482.A.9D3");
        let outcome = crawler.fetch_article(&article_url, "M.1409529482.A.9D3").await;

        assert_eq!(outcome, ArticleOutcome::Error(ErrorRecord::invalid_url()));
        assert_eq!(crawler.transport().requests(), vec![url.to_string()]);
    }

    /// Fails every request with a fixed error.
    struct FailingTransport(fn() -> CrawlerError);

    impl Transport for FailingTransport {
        async fn get(&self, _url: &str) -> Result<FetchResponse> {
            Err((self.0)())
        }
    }

    #[tokio::test]
    async fn test_transport_errors_become_error_records() {
        let url = "https://www.ptt.cc/bbs/Test/M.1409529482.A.9D3.html";
        let failures: [fn() -> CrawlerError; 2] =
            [|| CrawlerError::Timeout { timeout: 3 }, || CrawlerError::InvalidUrl("bad".to_string())];

        for failure in failures {
            let crawler =
                Crawler::new(FailingTransport(failure), CrawlConfig::builder().page_delay(Duration::ZERO).build());
            let outcome = crawler.fetch_article(url, "M.1409529482.A.9D3").await;
            assert_eq!(outcome, ArticleOutcome::Error(ErrorRecord::invalid_url()));
        }
    }
}
