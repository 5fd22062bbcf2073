//! Plain-text rendering with inline reference markers
//!
//! Platforms such as LinkedIn accept neither links nor footnotes in post
//! bodies. This module flattens a document tree to text that keeps the
//! reader able to find each source:
//!
//! - every link keeps its text and gains a numbered marker: `this paper[1]`
//! - every footnote marker (`<sup>`) becomes a bare marker: `[2]`
//! - headings are set in Mathematical Sans-Serif Bold letters
//! - paragraphs and line breaks become blank lines and newlines
//!
//! All other markup is dropped and only its text survives.
//!
//! # Example
//!
//! Input HTML:
//! ```html
//! <p>See <a href="#">this paper</a>.</p>
//! <p>Also note.<sup><a class="footnote" href="#fn1">1</a></sup></p>
//! ```
//!
//! Output text:
//! ```text
//! See this paper[1].
//!
//! Also note.[2]
//! ```
//!
//! with the reference table `{1: "this paper", 2: "1"}`.
//!
//! # Compact variant
//!
//! Newsletter tools like ConvertKit turn every newline into a paragraph
//! break. [`compact_newlines`] derives the variant for them from the
//! rendered text by replacing each blank line with a single newline.

use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::OnceLock;

use crate::dom::{Document, ElementKind, NodeKind, node_kind, parent_is_footnote_marker};

/// Code point of MATHEMATICAL SANS-SERIF BOLD SMALL A (`𝗮`)
const BOLD_SMALL_A: u32 = 0x1D5EE;

/// Code point of MATHEMATICAL SANS-SERIF BOLD CAPITAL A (`𝗔`)
const BOLD_CAPITAL_A: u32 = 0x1D5D4;

/// Ordered mapping from reference id to the rendered text that earned it
///
/// Ids start at 1 and are handed out by [`ReferenceTable::record`] only, so
/// they are dense and never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceTable {
    entries: Vec<String>,
}

impl ReferenceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` under the next id and return that id
    pub fn record(&mut self, content: String) -> usize {
        self.entries.push(content);
        self.entries.len()
    }

    /// Content recorded under `id`
    pub fn get(&self, id: usize) -> Option<&str> {
        id.checked_sub(1)
            .and_then(|index| self.entries.get(index))
            .map(String::as_str)
    }

    /// Number of recorded references
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(id, content)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, content)| (index + 1, content.as_str()))
    }

    /// Render the table as a trailing reference list
    ///
    /// ```text
    /// References:
    /// [1] this paper
    /// [2] 1
    /// ```
    ///
    /// Entry content is post-processed like rendered text: blank-line runs
    /// are collapsed and surrounding whitespace is trimmed. Returns an empty
    /// string for an empty table.
    pub fn to_reference_list(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut output = String::from("References:");
        for (id, content) in self.iter() {
            output.push('\n');
            output.push('[');
            output.push_str(&id.to_string());
            output.push_str("] ");
            output.push_str(collapse_blank_runs(content).trim());
        }
        output
    }
}

/// Result of rendering one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedText {
    /// Post-processed plain text (blank-line runs collapsed, trimmed)
    pub text: String,
    /// References assigned while rendering
    pub references: ReferenceTable,
}

/// Renders a document tree to plain text with numbered references
///
/// The renderer holds no state between calls; every [`render`] call starts
/// a fresh [`ReferenceTable`], so numbering always begins at 1.
///
/// [`render`]: PlainTextRenderer::render
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl PlainTextRenderer {
    /// Create a renderer
    pub fn new() -> Self {
        Self
    }

    /// Render `document` to post-processed plain text
    ///
    /// ```rust
    /// use link_formatter::parser::parse_markup;
    /// use link_formatter::plain_text::PlainTextRenderer;
    ///
    /// let doc = parse_markup("<p>Read <a href=\"/x\">the docs</a></p>");
    /// let rendered = PlainTextRenderer::new().render(&doc);
    /// assert_eq!(rendered.text, "Read the docs[1]");
    /// assert_eq!(rendered.references.get(1), Some("the docs"));
    /// ```
    pub fn render(&self, document: &Document) -> RenderedText {
        let mut references = ReferenceTable::new();
        let raw = self.render_node(document.root(), &mut references);

        RenderedText {
            text: collapse_blank_runs(&raw).trim().to_string(),
            references,
        }
    }

    fn render_node(&self, node: &Handle, references: &mut ReferenceTable) -> String {
        match node_kind(node) {
            NodeKind::Text => match node.data {
                NodeData::Text { ref contents } => contents.borrow().to_string(),
                _ => String::new(),
            },
            NodeKind::Root => self.render_children(node, references),
            NodeKind::Element(kind) => self.render_element(node, kind, references),
            NodeKind::Other => String::new(),
        }
    }

    fn render_element(
        &self,
        node: &Handle,
        kind: ElementKind,
        references: &mut ReferenceTable,
    ) -> String {
        match kind {
            ElementKind::Anchor => {
                let content = self.render_children(node, references);
                // The enclosing marker claims the number for footnote links.
                if parent_is_footnote_marker(node) {
                    return content;
                }
                let id = references.record(content.clone());
                format!("{content}[{id}]")
            }
            ElementKind::FootnoteMarker => {
                let content = self.render_children(node, references);
                let id = references.record(content);
                format!("[{id}]")
            }
            ElementKind::Paragraph => {
                let mut output = String::from("\n\n");
                output.push_str(&self.render_children(node, references));
                output
            }
            ElementKind::LineBreak => "\n".to_string(),
            ElementKind::Heading(_) => {
                let content = self.render_children(node, references);
                format!("\n\n{}\n\n", embolden(&content))
            }
            ElementKind::Other => self.render_children(node, references),
        }
    }

    fn render_children(&self, node: &Handle, references: &mut ReferenceTable) -> String {
        let mut output = String::new();
        for child in node.children.borrow().iter() {
            output.push_str(&self.render_node(child, references));
        }
        output
    }
}

/// Map ASCII letters to Mathematical Sans-Serif Bold letters
///
/// Every other character, digits and spaces included, passes through.
///
/// ```rust
/// use link_formatter::plain_text::embolden;
///
/// assert_eq!(embolden("abc ABC 123"), "𝗮𝗯𝗰 𝗔𝗕𝗖 123");
/// ```
pub fn embolden(text: &str) -> String {
    text.chars()
        .map(|ch| {
            let base = match ch {
                'a'..='z' => BOLD_SMALL_A + (ch as u32 - 'a' as u32),
                'A'..='Z' => BOLD_CAPITAL_A + (ch as u32 - 'A' as u32),
                _ => return ch,
            };
            char::from_u32(base).unwrap_or(ch)
        })
        .collect()
}

/// Collapse every run of three or more newlines to exactly two
pub fn collapse_blank_runs(text: &str) -> String {
    static BLANK_RUN: OnceLock<Option<Regex>> = OnceLock::new();
    match BLANK_RUN
        .get_or_init(|| Regex::new(r"\n{3,}").ok())
        .as_ref()
    {
        Some(regex) => regex.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    }
}

/// Replace every blank line (`"\n\n"`) with a single newline
///
/// Applied to already post-processed text, which has no runs longer than
/// two, so the result never contains a blank line.
pub fn compact_newlines(text: &str) -> String {
    text.replace("\n\n", "\n")
}
