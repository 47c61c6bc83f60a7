pub mod aid;
pub mod article;
pub mod crawl;
pub mod email;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod json;
pub mod parse;
pub mod stream;

pub use aid::{article_id_from_href, derive_aid};
pub use article::{
    Article, ArticleDocument, ArticleOutcome, ErrorRecord, MessageCount, Polarity, Reaction, read_article,
    read_articles,
};
pub use crawl::{CrawlConfig, CrawlConfigBuilder, CrawlReport, CrawlSummary, Crawler, ListingEntry, PageEnd, PTT_URL};
#[doc(hidden)]
pub use crawl::parse_listing;
pub use email::decrypt_protected_email;
pub use error::{CrawlerError, Result};
pub use extract::{extract_article, extract_article_html};
#[doc(hidden)]
pub use extract::{clean_text, filter_body, filter_chars};
#[cfg(feature = "fetch")]
pub use fetch::HttpTransport;
pub use fetch::{FetchConfig, FetchResponse, MemoryTransport, Transport};
pub use parse::Document;
pub use stream::ArticleStream;
