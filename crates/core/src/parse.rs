//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types the extractor
//! and crawler query with CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use pttcrawl_core::parse::Document;
//!
//! let html = r#"
//!     <div class="r-ent"><div class="title"><a href="/bbs/Test/M.1.A.html">Hello</a></div></div>
//!     <div class="r-ent"><div class="title">(本文已被刪除)</div></div>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! let entries = doc.select("div.r-ent").unwrap();
//! assert_eq!(entries.len(), 2);
//! ```

use scraper::{ElementRef, Html, Node, Selector};

use crate::{CrawlerError, Result};

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| CrawlerError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// A Document wraps a board page and provides methods for querying elements
/// using CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// Parsing is lenient: malformed markup still produces a document.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Selects elements using a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pttcrawl_core::parse::Document;
    ///
    /// let html = r#"<div class="push">First</div><div class="push">Second</div>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("div.push").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }
}

/// A direct child of an [`Element`]: either a text run or a nested element.
///
/// Comments and other node kinds are not surfaced.
#[derive(Clone, Debug)]
pub enum Child<'a> {
    Text(&'a str),
    Element(Element<'a>),
}

/// A wrapper around scraper's ElementRef.
///
/// Two `Element`s compare equal when they refer to the same node of the same
/// document, which is what the extractor relies on to exclude subtrees.
///
/// # Example
///
/// ```rust
/// use pttcrawl_core::parse::Document;
///
/// let html = r#"<a href="/bbs/Test/index2.html">&lsaquo; 上頁</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "‹ 上頁");
/// assert_eq!(link.attr("href"), Some("/bbs/Test/index2.html"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the individual text runs within this element, untrimmed.
    pub fn text_runs(&self) -> Vec<&'a str> {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Whether the element carries the given class.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// Iterates over the direct text and element children.
    pub fn children(&self) -> impl Iterator<Item = Child<'a>> + 'a {
        self.element.children().filter_map(|node| match node.value() {
            Node::Text(text) => Some(Child::Text(&**text)),
            Node::Element(_) => ElementRef::wrap(node).map(|element| Child::Element(Element { element })),
            _ => None,
        })
    }

    /// Collects every descendant text run, trimmed, skipping empty runs and
    /// the subtrees rooted at any element in `excluded`.
    pub fn stripped_strings(&self, excluded: &[Element<'a>]) -> Vec<&'a str> {
        let mut out = Vec::new();
        self.collect_stripped(excluded, &mut out);
        out
    }

    fn collect_stripped(&self, excluded: &[Element<'a>], out: &mut Vec<&'a str>) {
        for child in self.children() {
            match child {
                Child::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() {
                        out.push(text);
                    }
                }
                Child::Element(el) if !excluded.contains(&el) => el.collect_stripped(excluded, out),
                Child::Element(_) => {}
            }
        }
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlerError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(|el| Element { element: el }))
    }
}
