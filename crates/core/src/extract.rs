//! Article extraction from a parsed board page.
//!
//! The article page keeps everything inside `#main-content`: metadata lines,
//! the body, the origin stamp and the reaction list. Metadata and reactions are
//! read first and then excluded so that only body text is left for filtering.

use std::sync::LazyLock;

use regex::Regex;

use crate::aid::derive_aid;
use crate::article::{Article, MessageCount, NO_IP, Reaction};
use crate::email::decrypt_protected_email;
use crate::parse::{Child, Document, Element};
use crate::Result;

/// Marker phrase of the line carrying the origin address.
const ORIGIN_MARKER: &str = "※ 發信站:";

/// CJK punctuation kept in body text.
const CJK_PUNCTUATION: &[char] = &[
    '\u{3002}', '\u{ff1b}', '\u{ff0c}', '\u{ff1a}', '\u{201c}', '\u{201d}', '\u{ff08}', '\u{ff09}', '\u{3001}',
    '\u{ff1f}', '\u{300a}', '\u{300b}',
];

/// ASCII symbols kept in body text, enough for URLs and times.
const ASCII_SYMBOLS: &str = ":/-_.?~%()";

/// Characters trimmed from reaction fields.
const FIELD_TRIM: [char; 4] = [' ', '\t', '\n', '\r'];

static IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+").expect("ipv4 pattern"));
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Extracts an [`Article`] from a fetched article page.
///
/// `article_id` is the file stem of `url` and is used to drop the trailing
/// permalink line from the body. The board and AID are derived from `url`
/// and take precedence over whatever board the caller crawled.
///
/// A page without `#main-content` still yields a record, with empty metadata,
/// empty body and no reactions.
///
/// # Errors
///
/// Returns [`crate::CrawlerError::InvalidUrl`] when `url` is not an article URL.
pub fn extract_article(doc: &Document, article_id: &str, url: &str) -> Result<Article> {
    let (board, aid) = derive_aid(url)?;

    let mut article = Article {
        aid,
        article_id: article_id.to_string(),
        article_title: String::new(),
        author: String::new(),
        board,
        content: String::new(),
        date: String::new(),
        ip: NO_IP.to_string(),
        message_count: MessageCount::default(),
        messages: Vec::new(),
        url: url.to_string(),
    };

    let Some(main) = doc.select_first("#main-content")? else {
        return Ok(article);
    };

    let metas = main.select("div.article-metaline")?;
    article.author = meta_value(metas.first())?;
    article.article_title = meta_value(metas.get(1))?;
    article.date = meta_value(metas.get(2))?;

    let pushes = main.select("div.push")?;

    let mut excluded = metas;
    excluded.extend(main.select("div.article-metaline-right")?);
    excluded.extend(pushes.iter().copied());

    let fragments = main.stripped_strings(&excluded);
    article.ip = origin_ip(&fragments).unwrap_or_else(|| NO_IP.to_string());
    article.content = filter_body(&fragments, article_id);

    for push in &pushes {
        if let Some(reaction) = parse_reaction(push)? {
            article.messages.push(reaction);
        }
    }
    article.message_count = MessageCount::tally(&article.messages);

    Ok(article)
}

/// Parses `html` and extracts an [`Article`] from it.
pub fn extract_article_html(html: &str, article_id: &str, url: &str) -> Result<Article> {
    let doc = Document::parse(html)?;
    extract_article(&doc, article_id, url)
}

/// Reads the value span of a metadata line, decoding protected emails in place.
fn meta_value(meta: Option<&Element<'_>>) -> Result<String> {
    let Some(meta) = meta else {
        return Ok(String::new());
    };

    Ok(meta
        .select_first("span.article-meta-value")?
        .map(|value| text_with_emails(&value))
        .unwrap_or_default())
}

/// Text of `element` with every `.__cf_email__` element replaced by its
/// decoded address.
fn text_with_emails(element: &Element<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        match child {
            Child::Text(text) => out.push_str(text),
            Child::Element(el) if el.has_class("__cf_email__") => {
                out.push_str(&decrypt_protected_email(el.attr("data-cfemail").unwrap_or_default()));
            }
            Child::Element(el) => out.push_str(&text_with_emails(&el)),
        }
    }
    out
}

/// Finds the origin address in the first fragment carrying the origin marker.
fn origin_ip(fragments: &[&str]) -> Option<String> {
    let line = fragments.iter().find(|f| f.contains(ORIGIN_MARKER))?;
    IPV4.find(line).map(|m| m.as_str().to_string())
}

/// Whether `c` survives body filtering.
pub fn is_allowed_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
        || CJK_PUNCTUATION.contains(&c)
        || c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || ASCII_SYMBOLS.contains(c)
}

/// Removes every character not accepted by [`is_allowed_char`].
pub fn filter_chars(text: &str) -> String {
    text.chars().filter(|&c| is_allowed_char(c)).collect()
}

/// Filters characters and collapses whitespace runs to one space.
///
/// Applying it twice gives the same result as applying it once.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(&filter_chars(text), " ").into_owned()
}

/// Builds the body text from the stripped text fragments of the page.
///
/// Signature lines (`※`, `◆`, `--`) are dropped, remaining fragments are
/// character-filtered, empty results and the permalink line (which echoes
/// `article_id`) are dropped, and the rest is joined with single spaces.
pub fn filter_body(fragments: &[&str], article_id: &str) -> String {
    let kept: Vec<String> = fragments
        .iter()
        .filter(|f| !f.starts_with(['※', '◆']) && !f.starts_with("--"))
        .map(|f| filter_chars(f))
        .filter(|f| !f.is_empty())
        .filter(|f| article_id.is_empty() || !f.contains(article_id))
        .collect();

    WHITESPACE_RUN.replace_all(&kept.join(" "), " ").into_owned()
}

/// Parses one `div.push` element; pushes without a tag (system notices) are skipped.
fn parse_reaction(push: &Element<'_>) -> Result<Option<Reaction>> {
    let Some(tag) = push.select_first("span.push-tag")? else {
        return Ok(None);
    };

    let field = |selector: &str| -> Result<String> {
        Ok(push
            .select_first(selector)?
            .map(|el| el.text().trim_matches(FIELD_TRIM).to_string())
            .unwrap_or_default())
    };

    let content = push
        .select_first("span.push-content")?
        .map(|el| {
            let joined = el.text_runs().join(" ");
            let body = joined.strip_prefix(':').unwrap_or(&joined);
            body.trim_matches(FIELD_TRIM).to_string()
        })
        .unwrap_or_default();

    Ok(Some(Reaction {
        push_content: content,
        push_ipdatetime: field("span.push-ipdatetime")?,
        push_tag: tag.text().trim_matches(FIELD_TRIM).to_string(),
        push_userid: field("span.push-userid")?,
    }))
}
