//! Pipeline entry point
//!
//! A [`Formatter`] turns one pasted document into every output the copy
//! buttons offer:
//!
//! | Output | Destination |
//! |---|---|
//! | `plain_text` | plain-text platforms (LinkedIn) |
//! | `compact_text` | editors that turn each newline into a paragraph (ConvertKit) |
//! | `markup` | rich-text editors that keep links (Substack, Medium) |
//!
//! # Pipeline
//!
//! 1. Optional cleanup of `<meta>` tags and inline styles
//! 2. Parse once with html5ever
//! 3. Render plain text and the reference table from the parsed tree
//! 4. Build the footnote-rewritten copy of the same tree and serialize it
//! 5. Derive the compact text from the plain text
//!
//! The renderer only reads the parsed tree and the rewriter builds a new one,
//! so the two outputs are independent of each other.
//!
//! # Examples
//!
//! ```rust
//! use link_formatter::formatter::format_markup;
//!
//! let output = format_markup(
//!     r##"<p>See <a href="#">this paper</a>.</p><p>Also note.<sup><a class="footnote" href="#fn1">1</a></sup></p>"##,
//! ).expect("format");
//!
//! assert_eq!(output.plain_text, "See this paper[1].\n\nAlso note.[2]");
//! assert_eq!(output.compact_text, "See this paper[1].\nAlso note.[2]");
//! assert!(output.markup.contains(r##"<span><a href="#fn1">[1]</a></span>"##));
//! ```

use std::borrow::Cow;

use crate::charset::decode_markup;
use crate::error::FormatError;
use crate::footnotes::{FootnoteRewriter, RewriteOptions};
use crate::parser::parse_markup;
use crate::plain_text::{PlainTextRenderer, ReferenceTable, compact_newlines};
use crate::preprocess::strip_metadata;
use crate::serializer::{MarkupScope, serialize_markup};

/// Formatting options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Remove `<meta>` tags and inline `style` attributes before parsing
    pub strip_metadata: bool,
    /// Append a `References:` list to the plain text when any reference
    /// was recorded
    pub append_reference_list: bool,
    /// Part of the rewritten tree written to `markup`
    pub markup_scope: MarkupScope,
    /// Footnote rewriting options
    pub rewrite: RewriteOptions,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            strip_metadata: true,
            append_reference_list: false,
            markup_scope: MarkupScope::Document,
            rewrite: RewriteOptions::default(),
        }
    }
}

/// Everything produced for one input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedOutput {
    /// Plain text with reference markers and bold headings
    pub plain_text: String,
    /// `plain_text` with every blank line collapsed to a single newline
    pub compact_text: String,
    /// Footnote-rewritten markup
    pub markup: String,
    /// References recorded while rendering `plain_text`
    pub references: ReferenceTable,
}

/// Formats pasted markup for platforms with different conventions
///
/// Holds only configuration; one formatter can serve any number of inputs.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: FormatOptions,
    renderer: PlainTextRenderer,
    rewriter: FootnoteRewriter,
}

impl Formatter {
    /// Create a formatter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options
    ///
    /// ```rust
    /// use link_formatter::formatter::{FormatOptions, Formatter};
    /// use link_formatter::serializer::MarkupScope;
    ///
    /// let formatter = Formatter::with_options(FormatOptions {
    ///     append_reference_list: true,
    ///     markup_scope: MarkupScope::Body,
    ///     ..Default::default()
    /// });
    /// let output = formatter.format("<p>Read <a href=\"/x\">this</a></p>").expect("format");
    /// assert_eq!(output.plain_text, "Read this[1]\n\nReferences:\n[1] this");
    /// assert_eq!(output.markup, "<p>Read <a href=\"/x\">this</a></p>");
    /// ```
    pub fn with_options(options: FormatOptions) -> Self {
        Self {
            rewriter: FootnoteRewriter::with_options(options.rewrite.clone()),
            renderer: PlainTextRenderer::new(),
            options,
        }
    }

    /// Options in effect
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Format markup (or plain) text
    ///
    /// # Errors
    ///
    /// Parsing never fails; the only error source is serialization of the
    /// rewritten tree ([`FormatError::SerializeError`]).
    pub fn format(&self, markup: &str) -> Result<FormattedOutput, FormatError> {
        let input = if self.options.strip_metadata {
            strip_metadata(markup)
        } else {
            Cow::Borrowed(markup)
        };

        let document = parse_markup(&input);

        let rendered = self.renderer.render(&document);
        let mut plain_text = rendered.text;
        if self.options.append_reference_list && !rendered.references.is_empty() {
            if !plain_text.is_empty() {
                plain_text.push_str("\n\n");
            }
            plain_text.push_str(&rendered.references.to_reference_list());
        }
        let compact_text = compact_newlines(&plain_text);

        let rewritten = self.rewriter.rewrite(&document);
        let markup = serialize_markup(&rewritten, self.options.markup_scope)?;

        tracing::debug!(
            input_len = input.len(),
            references = rendered.references.len(),
            plain_text_len = plain_text.len(),
            compact_text_len = compact_text.len(),
            markup_len = markup.len(),
            "formatted document"
        );

        Ok(FormattedOutput {
            plain_text,
            compact_text,
            markup,
            references: rendered.references,
        })
    }

    /// Decode raw bytes and format them
    ///
    /// `mime_type` is the clipboard flavor or Content-Type the bytes came
    /// with, if known.
    ///
    /// # Errors
    ///
    /// [`FormatError::EncodingError`] when the bytes cannot be decoded, plus
    /// everything [`Formatter::format`] returns.
    pub fn format_bytes(
        &self,
        markup: &[u8],
        mime_type: Option<&str>,
    ) -> Result<FormattedOutput, FormatError> {
        let text = decode_markup(markup, mime_type)?;
        self.format(&text)
    }
}

/// Format `markup` with default options
pub fn format_markup(markup: &str) -> Result<FormattedOutput, FormatError> {
    Formatter::new().format(markup)
}
