//! Footnote rewriting for the rich-text variant
//!
//! Rich-text destinations (Substack, Medium) keep links but mangle
//! superscripts. The rewriter produces a new tree in which every footnote
//! marker is flattened to an inline `<span>` and every link inside it shows
//! its label in square brackets:
//!
//! ```html
//! <sup><a class="footnote" href="#fn1">1</a></sup>
//! ```
//!
//! becomes
//!
//! ```html
//! <span><a href="#fn1">[1]</a></span>
//! ```
//!
//! Everything else is copied as-is. The input tree is only read; the result
//! shares no nodes with it.

use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::{
    Document, ElementKind, NodeKind, append_child, new_inline_container, new_text, node_kind,
    parent_is_footnote_marker, shallow_copy,
};

/// Options for [`FootnoteRewriter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Attributes removed from links that sit directly inside a footnote
    /// marker (default: `class`, `rel`)
    pub stripped_anchor_attributes: Vec<String>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            stripped_anchor_attributes: vec!["class".to_string(), "rel".to_string()],
        }
    }
}

/// Builds a rewritten copy of a document with flattened footnote markers
///
/// # Examples
///
/// ```rust
/// use link_formatter::footnotes::FootnoteRewriter;
/// use link_formatter::parser::parse_markup;
/// use link_formatter::serializer::{MarkupScope, serialize_markup};
///
/// let doc = parse_markup(r##"<p>x<sup><a class="fn" href="#n1">1</a></sup></p>"##);
/// let rewritten = FootnoteRewriter::new().rewrite(&doc);
/// let markup = serialize_markup(&rewritten, MarkupScope::Body).expect("serialize");
/// assert_eq!(markup, r##"<p>x<span><a href="#n1">[1]</a></span></p>"##);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FootnoteRewriter {
    options: RewriteOptions,
}

impl FootnoteRewriter {
    /// Create a rewriter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rewriter with custom options
    pub fn with_options(options: RewriteOptions) -> Self {
        Self { options }
    }

    /// Build the rewritten copy of `document`
    pub fn rewrite(&self, document: &Document) -> Document {
        let root = Document::new();
        self.rewrite_children(document.root(), root.root());
        root
    }

    fn rewrite_node(&self, node: &Handle) -> Handle {
        match node_kind(node) {
            NodeKind::Element(ElementKind::FootnoteMarker) => {
                let container = new_inline_container();
                self.rewrite_children(node, &container);
                container
            }
            NodeKind::Element(ElementKind::Anchor) if parent_is_footnote_marker(node) => {
                let anchor = shallow_copy(node);
                self.strip_anchor_attributes(&anchor);
                append_child(&anchor, new_text("["));
                self.rewrite_children(node, &anchor);
                append_child(&anchor, new_text("]"));
                anchor
            }
            _ => {
                let copy = shallow_copy(node);
                self.rewrite_children(node, &copy);
                self.rewrite_template_contents(node, &copy);
                copy
            }
        }
    }

    fn rewrite_children(&self, source: &Handle, target: &Handle) {
        for child in source.children.borrow().iter() {
            append_child(target, self.rewrite_node(child));
        }
    }

    fn rewrite_template_contents(&self, source: &Handle, target: &Handle) {
        let (
            NodeData::Element {
                template_contents: source_contents,
                ..
            },
            NodeData::Element {
                template_contents: target_contents,
                ..
            },
        ) = (&source.data, &target.data)
        else {
            return;
        };

        if let Some(fragment) = source_contents.borrow().as_ref() {
            let copy = shallow_copy(fragment);
            self.rewrite_children(fragment, &copy);
            *target_contents.borrow_mut() = Some(copy);
        }
    }

    fn strip_anchor_attributes(&self, anchor: &Handle) {
        if let NodeData::Element { ref attrs, .. } = anchor.data {
            attrs.borrow_mut().retain(|attr| {
                !self
                    .options
                    .stripped_anchor_attributes
                    .iter()
                    .any(|name| attr.name.local.as_ref() == name)
            });
        }
    }
}
