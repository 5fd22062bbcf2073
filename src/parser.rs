//! Tolerant HTML5 parsing using html5ever
//!
//! Pasted content is whatever the source application put on the clipboard:
//! complete documents, fragments cut mid-element, or plain text with no
//! markup at all. html5ever implements the WHATWG tree-construction
//! algorithm, so every input produces a tree the same way a browser would:
//!
//! - unterminated elements are closed automatically
//! - misnested tags are repaired
//! - unknown tags become generic elements
//! - plain text ends up as a single text node inside the implied `<body>`
//!
//! # Examples
//!
//! ```rust
//! use link_formatter::parser::parse_markup;
//!
//! // Malformed markup (missing closing tags) still parses
//! let doc = parse_markup("<p>See <a href=\"#\">this paper");
//! assert_eq!(doc.text_content(), "See this paper");
//!
//! // Plain text is a single text node
//! let doc = parse_markup("just words");
//! assert_eq!(doc.text_content(), "just words");
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::RcDom;

use crate::charset::decode_markup;
use crate::dom::Document;
use crate::error::FormatError;

/// Parse markup text into a document tree
///
/// Never fails: malformed markup yields a best-effort tree and empty input
/// yields a document with an empty body.
pub fn parse_markup(markup: &str) -> Document {
    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    tracing::trace!(input_len = markup.len(), "parsed markup");
    Document::from_rcdom(dom)
}

/// Decode raw bytes and parse them into a document tree
///
/// `mime_type` is the clipboard flavor or Content-Type the bytes came with,
/// if known; it feeds the charset cascade in [`crate::charset`].
///
/// # Errors
///
/// Returns [`FormatError::EncodingError`] when the bytes are not valid in
/// the detected encoding or the declared charset is unknown.
///
/// ```rust
/// use link_formatter::parser::parse_markup_bytes;
///
/// let doc = parse_markup_bytes(b"<p>Caf\xE9</p>", Some("text/html; charset=ISO-8859-1"))
///     .expect("latin-1 input");
/// assert_eq!(doc.text_content(), "Café");
/// ```
pub fn parse_markup_bytes(markup: &[u8], mime_type: Option<&str>) -> Result<Document, FormatError> {
    let text = decode_markup(markup, mime_type)?;
    Ok(parse_markup(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tag_name;
    use markup5ever_rcdom::Handle;
    use proptest::prelude::*;

    fn count_elements(node: &Handle, tag: &str) -> usize {
        let own = usize::from(tag_name(node) == Some(tag));
        own + node
            .children
            .borrow()
            .iter()
            .map(|child| count_elements(child, tag))
            .sum::<usize>()
    }

    #[test]
    fn test_parse_fragment() {
        let doc = parse_markup("<p>Content</p>");
        assert_eq!(count_elements(doc.root(), "p"), 1);
        assert_eq!(doc.text_content(), "Content");
    }

    #[test]
    fn test_parse_empty_input() {
        let doc = parse_markup("");
        assert!(doc.body().is_some());
        assert_eq!(doc.text_content(), "");
    }

    #[test]
    fn test_parse_plain_text() {
        let doc = parse_markup("no markup here");
        let body = doc.body().expect("body");
        let children = body.children.borrow();
        assert_eq!(children.len(), 1);
        assert_eq!(doc.text_content(), "no markup here");
    }

    #[test]
    fn test_parse_unclosed_tags() {
        let doc = parse_markup("<p>First<p>Second");
        assert_eq!(count_elements(doc.root(), "p"), 2);
    }

    #[test]
    fn test_parse_unknown_tags_as_containers() {
        let doc = parse_markup("<x-note>inside</x-note>");
        assert_eq!(count_elements(doc.root(), "x-note"), 1);
        assert_eq!(doc.text_content(), "inside");
    }

    #[test]
    fn test_parse_entities() {
        let doc = parse_markup("<p>&lt;tag&gt; &amp; &quot;quotes&quot;</p>");
        assert_eq!(doc.text_content(), "<tag> & \"quotes\"");
    }

    #[test]
    fn test_parse_bytes_with_mime_charset() {
        let doc = parse_markup_bytes(b"<p>Price \x80 10</p>", Some("text/html;charset=windows-1252"))
            .expect("windows-1252");
        assert_eq!(doc.text_content(), "Price € 10");
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        let result = parse_markup_bytes(b"\xFF<p>Invalid</p>", None);
        match result {
            Err(err) => assert!(err.is_uninterpretable_input()),
            Ok(_) => panic!("Expected EncodingError"),
        }
    }

    #[test]
    fn test_parse_bytes_empty_is_not_an_error() {
        let doc = parse_markup_bytes(b"", None).expect("empty input");
        assert_eq!(doc.text_content(), "");
    }

    proptest! {
        #[test]
        fn prop_malformed_markup_never_panics(
            tag in prop::sample::select(vec!["div", "p", "span", "h1", "a", "sup", "li", "table"]),
            content in "[a-zA-Z0-9 ]{0,60}",
            close_tag in any::<bool>(),
            misnest in any::<bool>(),
        ) {
            let mut markup = format!("<{tag}>{content}");
            if close_tag {
                markup.push_str(&format!("</{tag}>"));
            }
            if misnest {
                markup.push_str("<b><i>x</b></i><p><div>y</div></p>");
            }

            let doc = parse_markup(&markup);
            prop_assert!(doc.text_content().contains(content.trim()));
        }

        #[test]
        fn prop_arbitrary_text_parses(input in "\\PC{0,200}") {
            let _doc = parse_markup(&input);
        }
    }
}
