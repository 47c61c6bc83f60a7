//! Article identifier (AID) derivation.
//!
//! PTT addresses every article by a compact AID such as `#1Kcjcttm` that is a
//! base-64 rendering of the numbers embedded in the article's file name
//! (`M.<timestamp>.A.<hex>.html`). This module derives it from the article URL.
//!
//! # Example
//!
//! ```rust
//! use pttcrawl_core::derive_aid;
//!
//! let (board, aid) = derive_aid("https://www.ptt.cc/bbs/C_Chat/M.1419434423.A.DF0.html").unwrap();
//! assert_eq!(board, "C_Chat");
//! assert_eq!(aid, "#1Kcjcttm(C_Chat)");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::{CrawlerError, Result};

/// Digit alphabet of the AID numeral system.
const AID_TABLE: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

static ARTICLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.ptt\.cc/bbs/([-.\w]+)/(M\.\d+\.A[.\w]*)\.html").expect("article url pattern")
});

/// Encodes the low `width * 6` bits of `value` as `width` AID digits,
/// most significant first.
fn encode(mut value: u64, width: usize) -> String {
    let mut digits = vec![b'0'; width];
    for slot in digits.iter_mut().rev() {
        *slot = AID_TABLE[(value % 64) as usize];
        value /= 64;
    }
    digits.into_iter().map(char::from).collect()
}

/// Derives `(board, aid)` from an article URL.
///
/// The board is the path segment after `/bbs/`. The second dot-field of the
/// file name is a decimal number encoded into six digits; the fourth, unless it
/// is the literal `html`, is a hexadecimal number encoded into two digits
/// (`"00"` otherwise).
///
/// # Errors
///
/// Returns [`CrawlerError::InvalidUrl`] when the URL is not a board article
/// URL or its numeric fields cannot be parsed.
pub fn derive_aid(url: &str) -> Result<(String, String)> {
    let invalid = || CrawlerError::InvalidUrl(url.to_string());
    let caps = ARTICLE_URL.captures(url).ok_or_else(invalid)?;
    let board = caps[1].to_string();

    let fields: Vec<&str> = caps[2].split('.').collect();
    let n0: u64 = fields.get(1).and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    let head = encode(n0, 6);

    let tail = match fields.get(3).copied() {
        None | Some("html") => "00".to_string(),
        Some(hex) => encode(u64::from_str_radix(hex, 16).map_err(|_| invalid())?, 2),
    };

    let aid = format!("#{}{}({})", head, tail, board);
    Ok((board, aid))
}

/// Derives the article id (file stem) from an article href or URL,
/// e.g. `M.1127742013.A.240` from `/bbs/PublicServan/M.1127742013.A.240.html`.
pub fn article_id_from_href(href: &str) -> Option<String> {
    let name = href.rsplit('/').next()?;
    let stem = name.strip_suffix(".html").unwrap_or(name);
    if stem.is_empty() { None } else { Some(stem.to_string()) }
}
