//! Recovery of obfuscated email addresses.
//!
//! The site hides addresses behind `<a class="__cf_email__" data-cfemail="...">`
//! elements. The attribute is a hex string whose first byte is a key that every
//! following byte is XORed with.

/// Decodes a `data-cfemail` payload.
///
/// Returns an empty string for anything that is not a well-formed payload
/// (empty, odd length, non-hex), so a bad attribute never aborts extraction.
///
/// # Example
///
/// ```rust
/// use pttcrawl_core::decrypt_protected_email;
///
/// assert_eq!(decrypt_protected_email("7c1500"), "i|");
/// assert_eq!(decrypt_protected_email("zz"), "");
/// ```
pub fn decrypt_protected_email(data: &str) -> String {
    decode(data).unwrap_or_default()
}

fn decode(data: &str) -> Option<String> {
    let bytes = hex::decode(data).ok()?;
    let (key, payload) = bytes.split_first()?;
    Some(payload.iter().map(|b| char::from(b ^ key)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Obfuscates `plain` with `key` the way the site does.
    fn protect(plain: &str, key: u8) -> String {
        std::iter::once(key)
            .chain(plain.bytes().map(|b| b ^ key))
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    #[test]
    fn test_decrypt_known_payload() {
        assert_eq!(decrypt_protected_email("7c1500"), "i|");
    }

    #[test]
    fn test_decrypt_address() {
        let payload = protect("someone@example.com", 0x5a);
        assert_eq!(decrypt_protected_email(&payload), "someone@example.com");
    }

    #[test]
    fn test_decrypt_uppercase_hex() {
        let payload = protect("a@b.tw", 0x3f).to_uppercase();
        assert_eq!(decrypt_protected_email(&payload), "a@b.tw");
    }

    #[test]
    fn test_decrypt_key_only() {
        assert_eq!(decrypt_protected_email("7c"), "");
    }

    #[test]
    fn test_decrypt_malformed() {
        assert_eq!(decrypt_protected_email("zz"), "");
        assert_eq!(decrypt_protected_email(""), "");
        assert_eq!(decrypt_protected_email("7c150"), "");
        assert_eq!(decrypt_protected_email("7c15g0"), "");
        assert_eq!(decrypt_protected_email("7c發信"), "");
    }
}
