//! Clipboard markup cleanup applied before parsing
//!
//! Browsers wrap copied selections in `<meta charset>` tags and inline
//! `style` attributes that carry the source page's computed styles. Neither
//! has a place in either output: the metadata would survive into the
//! rewritten markup and the styles would fight the destination platform's
//! own stylesheet.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Remove `<meta ...>` tags and double-quoted `style="..."` attributes
///
/// Matching is textual and happens before parsing, so it also applies to
/// fragments that are not well-formed. `<meta` is matched case-insensitively;
/// the `style` attribute only in its usual lowercase, double-quoted form.
/// Returns the input unchanged (borrowed) when there is nothing to strip.
///
/// ```rust
/// use link_formatter::preprocess::strip_metadata;
///
/// let cleaned = strip_metadata(r#"<meta charset="utf-8"><p style="color: red">Hi</p>"#);
/// assert_eq!(cleaned, "<p >Hi</p>");
/// ```
pub fn strip_metadata(markup: &str) -> Cow<'_, str> {
    static META_TAG: OnceLock<Option<Regex>> = OnceLock::new();
    static STYLE_ATTRIBUTE: OnceLock<Option<Regex>> = OnceLock::new();

    let without_meta = match META_TAG
        .get_or_init(|| Regex::new(r"(?i)<meta[^>]*>").ok())
        .as_ref()
    {
        Some(regex) => regex.replace_all(markup, ""),
        None => Cow::Borrowed(markup),
    };

    let Some(style_regex) = STYLE_ATTRIBUTE
        .get_or_init(|| Regex::new(r#"style="[^"]*""#).ok())
        .as_ref()
    else {
        return without_meta;
    };

    match without_meta {
        Cow::Borrowed(text) => style_regex.replace_all(text, ""),
        Cow::Owned(text) => Cow::Owned(style_regex.replace_all(&text, "").into_owned()),
    }
}
