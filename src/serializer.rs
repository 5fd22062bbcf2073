//! Markup serialization of document trees
//!
//! Uses html5ever's HTML serializer, so output follows the WHATWG
//! serialization rules: void elements have no closing tag, text is escaped
//! and attribute values are always double-quoted.
//!
//! The tree walk is our own: rcdom stores `<template>` children in a
//! separate fragment that its `SerializableHandle` never writes, and the
//! rewritten markup has to keep them.

use std::io;

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::Document;
use crate::error::FormatError;

/// Which part of the tree is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkupScope {
    /// The complete document, including the `<html>`, `<head>` and `<body>`
    /// elements the parser inferred
    #[default]
    Document,
    /// Only the children of `<body>`, for pasting into an editor that
    /// supplies its own document. Falls back to the whole document when
    /// the tree has no body.
    Body,
}

/// Serialize `document` to markup text
///
/// # Errors
///
/// Returns [`FormatError::SerializeError`] if writing fails or the output
/// is not valid UTF-8.
///
/// ```rust
/// use link_formatter::parser::parse_markup;
/// use link_formatter::serializer::{MarkupScope, serialize_markup};
///
/// let doc = parse_markup("<p>Hi</p>");
/// assert_eq!(
///     serialize_markup(&doc, MarkupScope::Document).expect("serialize"),
///     "<html><head></head><body><p>Hi</p></body></html>"
/// );
/// assert_eq!(
///     serialize_markup(&doc, MarkupScope::Body).expect("serialize"),
///     "<p>Hi</p>"
/// );
/// ```
pub fn serialize_markup(document: &Document, scope: MarkupScope) -> Result<String, FormatError> {
    let node = match scope {
        MarkupScope::Document => document.root().clone(),
        MarkupScope::Body => document.body().unwrap_or_else(|| document.root().clone()),
    };
    serialize_children(&node)
}

fn serialize_children(node: &Handle) -> Result<String, FormatError> {
    let mut buffer = Vec::new();
    serialize(&mut buffer, &MarkupNode(node), SerializeOpts::default())
        .map_err(|e| FormatError::SerializeError(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| FormatError::SerializeError(e.to_string()))
}

/// A node as html5ever's serializer sees it, template contents included
struct MarkupNode<'a>(&'a Handle);

impl Serialize for MarkupNode<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(serializer, self.0),
            TraversalScope::ChildrenOnly(_) => write_children(serializer, self.0),
        }
    }
}

fn write_node<S: Serializer>(serializer: &mut S, node: &Handle) -> io::Result<()> {
    match node.data {
        NodeData::Document => write_children(serializer, node),
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            serializer.start_elem(
                name.clone(),
                attrs
                    .borrow()
                    .iter()
                    .map(|attr| (&attr.name, &attr.value[..])),
            )?;
            write_children(serializer, node)?;
            serializer.end_elem(name.clone())
        }
        NodeData::Doctype { ref name, .. } => serializer.write_doctype(name),
        NodeData::Text { ref contents } => serializer.write_text(&contents.borrow()),
        NodeData::Comment { ref contents } => serializer.write_comment(contents),
        NodeData::ProcessingInstruction {
            ref target,
            ref contents,
        } => serializer.write_processing_instruction(target, contents),
    }
}

/// Write the children of `node`, or of its template fragment if it has one
fn write_children<S: Serializer>(serializer: &mut S, node: &Handle) -> io::Result<()> {
    let fragment = match node.data {
        NodeData::Element {
            ref template_contents,
            ..
        } => template_contents.borrow().clone(),
        _ => None,
    };
    let parent = fragment.as_ref().unwrap_or(node);

    for child in parent.children.borrow().iter() {
        write_node(serializer, child)?;
    }
    Ok(())
}
