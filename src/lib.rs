//! Link Formatter - pasted markup for platforms without links
//!
//! This library turns rich text pasted from a browser or editor into the
//! shapes different publishing platforms accept:
//!
//! - plain text with numbered reference markers (`this paper[1]`) and
//!   headings in bold mathematical Unicode letters
//! - the same text with blank lines collapsed, for editors that turn each
//!   newline into a paragraph
//! - markup whose footnote superscripts are flattened to bracketed inline
//!   links (`<span><a href="#fn1">[1]</a></span>`)
//!
//! # Architecture
//!
//! - `formatter`: pipeline entry point and options
//! - `parser`: tolerant HTML5 parsing using html5ever
//! - `dom`: tree model, node classification and constructors
//! - `plain_text`: plain-text rendering and the reference table
//! - `footnotes`: footnote-rewriting transformer
//! - `serializer`: markup serialization
//! - `preprocess`: `<meta>` and inline style cleanup
//! - `charset`: character encoding detection and decoding
//! - `ffi`: C ABI for native hosts
//!
//! # Example
//!
//! ```rust
//! use link_formatter::format_markup;
//!
//! let output = format_markup("<h1>Notes</h1><p>Read <a href=\"/doc\">the doc</a>.</p>")
//!     .expect("format");
//! assert_eq!(output.plain_text, "𝗡𝗼𝘁𝗲𝘀\n\nRead the doc[1].");
//! ```
//!
//! # Safety
//!
//! The FFI functions are `unsafe` and document their pointer contracts.
//! Memory allocated by Rust must be freed by Rust via the provided cleanup
//! functions.

pub mod charset;
pub mod dom;
pub mod error;
pub mod ffi;
pub mod footnotes;
pub mod formatter;
pub mod parser;
pub mod plain_text;
pub mod preprocess;
pub mod serializer;

pub use error::FormatError;
pub use ffi::{FormatOptionsFfi, FormatResultFfi};
pub use footnotes::{FootnoteRewriter, RewriteOptions};
pub use formatter::{FormatOptions, FormattedOutput, Formatter, format_markup};
pub use parser::{parse_markup, parse_markup_bytes};
pub use plain_text::{PlainTextRenderer, ReferenceTable};
pub use serializer::MarkupScope;
