//! Character encoding detection for raw clipboard and file payloads
//!
//! Pasted HTML usually arrives as UTF-8, but clipboard flavors and saved
//! pages can carry other encodings. Bytes are decoded to UTF-8 before
//! parsing using this cascade:
//!
//! 1. **Byte order mark**: a UTF-8 or UTF-16 BOM wins over every label
//! 2. **MIME type**: `charset=` parameter of the clipboard flavor
//!    (e.g. `text/html;charset=utf-8`)
//! 3. **Meta tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//!    within the first 1024 bytes
//! 4. **Default**: UTF-8
//!
//! # Examples
//!
//! ```rust
//! use link_formatter::charset::decode_markup;
//!
//! let text = decode_markup(b"<p>Caf\xE9</p>", Some("text/html; charset=ISO-8859-1"))
//!     .expect("latin-1 decodes");
//! assert_eq!(text, "<p>Café</p>");
//! ```

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use crate::error::FormatError;

/// Maximum bytes to scan for meta charset tags
const META_SCAN_LIMIT: usize = 1024;

/// Resolve the encoding of `markup` from its MIME type and meta tags
///
/// BOM sniffing is handled by [`decode_markup`]; this function only looks at
/// labels. A label that `encoding_rs` does not know is an error rather than a
/// silent fallback, since decoding with the wrong table corrupts every
/// non-ASCII character.
pub fn detect_encoding(
    mime_type: Option<&str>,
    markup: &[u8],
) -> Result<&'static Encoding, FormatError> {
    if let Some(label) = mime_type.and_then(charset_from_mime_type) {
        tracing::trace!(label, "charset taken from MIME type");
        return encoding_for_label(label);
    }

    if let Some(label) = charset_from_meta(markup) {
        tracing::trace!(label = %label, "charset taken from meta tag");
        let encoding = encoding_for_label(&label)?;
        // A meta tag is itself ASCII, so it cannot truthfully declare UTF-16.
        if encoding == encoding_rs::UTF_16BE || encoding == encoding_rs::UTF_16LE {
            return Ok(UTF_8);
        }
        return Ok(encoding);
    }

    Ok(UTF_8)
}

/// Decode raw markup bytes to a UTF-8 string
///
/// Valid UTF-8 input is borrowed, not copied. Byte sequences that are
/// invalid for the detected encoding produce [`FormatError::EncodingError`]
/// instead of replacement characters.
pub fn decode_markup<'a>(
    markup: &'a [u8],
    mime_type: Option<&str>,
) -> Result<Cow<'a, str>, FormatError> {
    let (encoding, body) = match Encoding::for_bom(markup) {
        Some((encoding, bom_len)) => (encoding, &markup[bom_len..]),
        None => (detect_encoding(mime_type, markup)?, markup),
    };

    if encoding == UTF_8 {
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            FormatError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to(),
                e
            ))
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            FormatError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                encoding.name()
            ))
        })
}

fn encoding_for_label(label: &str) -> Result<&'static Encoding, FormatError> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        tracing::warn!(label, "unsupported charset label");
        FormatError::EncodingError(format!("Unsupported charset '{}'", label))
    })
}

/// Extract the `charset` parameter of a MIME type
///
/// ```rust
/// use link_formatter::charset::charset_from_mime_type;
///
/// assert_eq!(charset_from_mime_type("text/html;charset=utf-8"), Some("utf-8"));
/// assert_eq!(charset_from_mime_type("text/html; charset=\"UTF-8\""), Some("UTF-8"));
/// assert_eq!(charset_from_mime_type("text/plain"), None);
/// ```
pub fn charset_from_mime_type(mime_type: &str) -> Option<&str> {
    static CHARSET_PARAM: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = CHARSET_PARAM
        .get_or_init(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";,\s]+)"?"#).ok())
        .as_ref()?;

    regex
        .captures(mime_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract a charset declared by a `<meta>` tag near the start of `markup`
///
/// Both the HTML5 form (`<meta charset="...">`) and the HTML4
/// `http-equiv="Content-Type"` form are recognized.
pub fn charset_from_meta(markup: &[u8]) -> Option<String> {
    let prefix = &markup[..markup.len().min(META_SCAN_LIMIT)];
    let prefix = String::from_utf8_lossy(prefix);

    static META_CHARSET: OnceLock<Option<Regex>> = OnceLock::new();
    let meta_charset = META_CHARSET
        .get_or_init(|| Regex::new(r#"(?i)<meta\s+charset\s*=\s*"?([^";>\s]+)"?"#).ok())
        .as_ref()?;

    if let Some(m) = meta_charset.captures(&prefix).and_then(|caps| caps.get(1)) {
        return Some(m.as_str().to_string());
    }

    static META_HTTP_EQUIV: OnceLock<Option<Regex>> = OnceLock::new();
    let meta_http_equiv = META_HTTP_EQUIV
        .get_or_init(|| {
            Regex::new(
                r#"(?i)<meta\s+http-equiv\s*=\s*"?Content-Type"?\s+content\s*=\s*"?[^">]*charset\s*=\s*([^";>\s]+)"?"#,
            )
            .ok()
        })
        .as_ref()?;

    meta_http_equiv
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mime_type_charset_variants() {
        assert_eq!(charset_from_mime_type("text/html; charset=UTF-8"), Some("UTF-8"));
        assert_eq!(charset_from_mime_type("text/html;charset=utf-8"), Some("utf-8"));
        assert_eq!(
            charset_from_mime_type("text/html; CHARSET=\"windows-1252\"; x=y"),
            Some("windows-1252")
        );
        assert_eq!(charset_from_mime_type("text/html"), None);
        assert_eq!(charset_from_mime_type(""), None);
    }

    #[test]
    fn test_meta_charset_html5_and_html4() {
        assert_eq!(
            charset_from_meta(b"<meta charset=\"ISO-8859-1\"><p>x</p>"),
            Some("ISO-8859-1".to_string())
        );
        assert_eq!(
            charset_from_meta(
                b"<META http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\">"
            ),
            Some("windows-1252".to_string())
        );
        assert_eq!(charset_from_meta(b"<p>No charset</p>"), None);
    }

    #[test]
    fn test_meta_charset_beyond_scan_limit_is_ignored() {
        let mut markup = vec![b' '; META_SCAN_LIMIT + 10];
        markup.extend_from_slice(b"<meta charset=\"ISO-8859-1\">");
        assert_eq!(charset_from_meta(&markup), None);
    }

    #[test]
    fn test_detect_defaults_to_utf8() {
        let encoding = detect_encoding(None, b"<p>plain</p>").expect("default");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_detect_mime_type_beats_meta() {
        let markup = b"<meta charset=\"ISO-8859-1\"><p>x</p>";
        let encoding = detect_encoding(Some("text/html; charset=UTF-8"), markup).expect("mime");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_detect_meta_utf16_is_treated_as_utf8() {
        let encoding = detect_encoding(None, b"<meta charset=\"utf-16\">").expect("meta");
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_detect_unknown_label_is_error() {
        let result = detect_encoding(Some("text/html; charset=x-unknown-test"), b"");
        assert!(matches!(result, Err(FormatError::EncodingError(_))));
    }

    #[test]
    fn test_decode_borrows_valid_utf8() {
        let decoded = decode_markup("<p>✓</p>".as_bytes(), None).expect("utf-8");
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded, "<p>✓</p>");
    }

    #[test]
    fn test_decode_windows_1252_from_mime_type() {
        let decoded =
            decode_markup(b"<p>Price \x80 10</p>", Some("text/html; charset=windows-1252"))
                .expect("windows-1252");
        assert_eq!(decoded, "<p>Price € 10</p>");
    }

    #[test]
    fn test_decode_bom_overrides_label() {
        let mut markup = vec![0xEF, 0xBB, 0xBF];
        markup.extend_from_slice("<p>é</p>".as_bytes());
        let decoded =
            decode_markup(&markup, Some("text/html; charset=ISO-8859-1")).expect("bom");
        assert_eq!(decoded, "<p>é</p>");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let mut markup = vec![0xFF, 0xFE];
        for unit in "<p>hi</p>".encode_utf16() {
            markup.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_markup(&markup, None).expect("utf-16le");
        assert_eq!(decoded, "<p>hi</p>");
    }

    #[test]
    fn test_decode_invalid_utf8_is_error() {
        let result = decode_markup(b"<p>\xC3\x28</p>", None);
        match result {
            Err(FormatError::EncodingError(message)) => {
                assert!(message.contains("Invalid UTF-8"));
            }
            other => panic!("Expected EncodingError, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_empty_input() {
        let decoded = decode_markup(b"", None).expect("empty is fine");
        assert_eq!(decoded, "");
    }

    proptest! {
        #[test]
        fn prop_mime_type_has_priority_over_meta(
            mime_charset in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "shift_jis"]),
            meta_charset in prop::sample::select(vec!["UTF-8", "ISO-8859-2", "GB2312", "BIG5"]),
        ) {
            let mime_type = format!("text/html; charset={mime_charset}");
            let markup = format!(r#"<meta charset="{meta_charset}"><p>x</p>"#);

            let detected = detect_encoding(Some(&mime_type), markup.as_bytes())
                .expect("known labels");
            let expected = Encoding::for_label(mime_charset.as_bytes()).expect("known label");
            prop_assert_eq!(detected, expected);
        }

        #[test]
        fn prop_ascii_decodes_identically_under_any_ascii_superset(
            text in "[a-zA-Z0-9 <>/=\"]{0,80}",
            label in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252"]),
        ) {
            let mime_type = format!("text/html; charset={label}");
            let decoded = decode_markup(text.as_bytes(), Some(&mime_type)).expect("ascii");
            prop_assert_eq!(decoded.as_ref(), text.as_str());
        }
    }
}
