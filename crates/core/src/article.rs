//! Article output types.
//!
//! This module defines the [`Article`] record produced by the extractor, its
//! [`Reaction`] list and [`MessageCount`] tally, the [`ErrorRecord`] written in
//! place of an article that could not be fetched, and the [`ArticleDocument`]
//! wrapper of range-mode output files.
//!
//! Field names and key order match the JSON produced by earlier releases of
//! the crawler, so existing consumers keep working.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, json};

/// Sentinel stored in [`Article::ip`] when no origin address is found.
pub const NO_IP: &str = "None";

/// Tag of an approving reaction.
pub const PUSH_TAG: &str = "推";

/// Tag of a disapproving reaction.
pub const BOO_TAG: &str = "噓";

/// One extracted board article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Compact site identifier, e.g. `#1Kcjcttm(C_Chat)`.
    pub aid: String,
    /// File stem of the article URL, e.g. `M.1419434423.A.DF0`.
    pub article_id: String,
    pub article_title: String,
    pub author: String,
    pub board: String,
    /// Filtered, whitespace-normalized body text.
    pub content: String,
    /// Posting date as printed by the site; not reparsed.
    pub date: String,
    /// Origin IPv4 address, or [`NO_IP`].
    pub ip: String,
    pub message_count: MessageCount,
    /// Reactions in on-page order.
    pub messages: Vec<Reaction>,
    pub url: String,
}

/// A reader's inline reaction to an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub push_content: String,
    pub push_ipdatetime: String,
    pub push_tag: String,
    pub push_userid: String,
}

/// Polarity bucket of a reaction tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Push,
    Boo,
    Neutral,
}

impl Reaction {
    /// Classifies the reaction by its tag: `推` is a push, `噓` a boo,
    /// anything else neutral.
    pub fn polarity(&self) -> Polarity {
        match self.push_tag.as_str() {
            PUSH_TAG => Polarity::Push,
            BOO_TAG => Polarity::Boo,
            _ => Polarity::Neutral,
        }
    }
}

/// Reaction tally of an article.
///
/// `all` is `push + boo + neutral` and `count` is `push - boo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCount {
    pub all: u32,
    pub boo: u32,
    pub count: i64,
    pub neutral: u32,
    pub push: u32,
}

impl MessageCount {
    /// Tallies reactions by polarity.
    pub fn tally(messages: &[Reaction]) -> Self {
        let (mut push, mut boo, mut neutral) = (0u32, 0u32, 0u32);
        for message in messages {
            match message.polarity() {
                Polarity::Push => push += 1,
                Polarity::Boo => boo += 1,
                Polarity::Neutral => neutral += 1,
            }
        }

        Self { all: push + boo + neutral, boo, count: i64::from(push) - i64::from(boo), neutral, push }
    }
}

/// Written in place of an article whose fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
}

impl ErrorRecord {
    /// The `{"error": "invalid url"}` record.
    pub fn invalid_url() -> Self {
        Self { error: "invalid url".to_string() }
    }
}

/// The result of crawling a single article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleOutcome {
    Article(Box<Article>),
    Error(ErrorRecord),
}

impl ArticleOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ArticleOutcome::Error(_))
    }

    /// Returns the article, dropping error records.
    pub fn into_article(self) -> Option<Article> {
        match self {
            ArticleOutcome::Article(article) => Some(*article),
            ArticleOutcome::Error(_) => None,
        }
    }

    /// Serializes the outcome as a single JSON line.
    pub fn to_json(&self) -> Result<String> {
        json::to_string(self)
    }
}

impl From<Article> for ArticleOutcome {
    fn from(article: Article) -> Self {
        ArticleOutcome::Article(Box::new(article))
    }
}

impl From<ErrorRecord> for ArticleOutcome {
    fn from(record: ErrorRecord) -> Self {
        ArticleOutcome::Error(record)
    }
}

/// Contents of a range-mode output file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDocument {
    pub articles: Vec<ArticleOutcome>,
}

/// Reads a range-mode output file back.
pub fn read_articles(path: impl AsRef<Path>) -> Result<ArticleDocument> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Reads a single-article output file back.
pub fn read_article(path: impl AsRef<Path>) -> Result<ArticleOutcome> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction(tag: &str) -> Reaction {
        Reaction {
            push_content: "ok".to_string(),
            push_ipdatetime: "01/01 00:00".to_string(),
            push_tag: tag.to_string(),
            push_userid: "user".to_string(),
        }
    }

    fn sample_article() -> Article {
        Article {
            aid: "#1Kcjcttm(C_Chat)".to_string(),
            article_id: "M.1419434423.A.DF0".to_string(),
            article_title: "[閒聊] 測試".to_string(),
            author: "someone (nick)".to_string(),
            board: "C_Chat".to_string(),
            content: "內文".to_string(),
            date: "Wed Dec 24 23:20:21 2014".to_string(),
            ip: "1.2.3.4".to_string(),
            message_count: MessageCount::default(),
            messages: vec![],
            url: "https://www.ptt.cc/bbs/C_Chat/M.1419434423.A.DF0.html".to_string(),
        }
    }

    #[test]
    fn test_tally_empty() {
        let count = MessageCount::tally(&[]);
        assert_eq!(count, MessageCount::default());
    }

    #[test]
    fn test_tally_mixed() {
        let messages = vec![reaction("推"), reaction("噓"), reaction("→"), reaction("噓"), reaction("噓")];
        let count = MessageCount::tally(&messages);

        assert_eq!(count.push, 1);
        assert_eq!(count.boo, 3);
        assert_eq!(count.neutral, 1);
        assert_eq!(count.all, count.push + count.boo + count.neutral);
        assert_eq!(count.count, -2);
    }

    #[test]
    fn test_polarity_is_exact_match() {
        assert_eq!(reaction("推").polarity(), Polarity::Push);
        assert_eq!(reaction("推 ").polarity(), Polarity::Neutral);
        assert_eq!(reaction("").polarity(), Polarity::Neutral);
    }

    #[test]
    fn test_error_record_json() {
        let outcome = ArticleOutcome::from(ErrorRecord::invalid_url());
        assert_eq!(outcome.to_json().unwrap(), r#"{"error": "invalid url"}"#);
        assert!(outcome.is_error());
    }

    #[test]
    fn test_article_json_keys_and_utf8() {
        let json = ArticleOutcome::from(sample_article()).to_json().unwrap();

        assert!(json.starts_with(r##"{"aid": "#1Kcjcttm(C_Chat)", "article_id": "##));
        assert!(json.contains(r#""article_title": "[閒聊] 測試""#));
        assert!(json.contains(r#""message_count": {"all": 0, "boo": 0, "count": 0, "neutral": 0, "push": 0}"#));
        assert!(json.ends_with(r#""url": "https://www.ptt.cc/bbs/C_Chat/M.1419434423.A.DF0.html"}"#));
    }

    #[test]
    fn test_reaction_json_keys() {
        let json = json::to_string(&reaction("推")).unwrap();
        assert_eq!(
            json,
            r#"{"push_content": "ok", "push_ipdatetime": "01/01 00:00", "push_tag": "推", "push_userid": "user"}"#
        );
    }

    #[test]
    fn test_untagged_outcome_deserialization() {
        let error: ArticleOutcome = serde_json::from_str(r#"{"error": "invalid url"}"#).unwrap();
        assert_eq!(error, ArticleOutcome::Error(ErrorRecord::invalid_url()));

        let json = ArticleOutcome::from(sample_article()).to_json().unwrap();
        let article: ArticleOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(article.into_article(), Some(sample_article()));
    }
}
