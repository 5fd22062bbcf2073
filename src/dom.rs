//! Document tree model shared by the rendering and rewriting passes
//!
//! Nodes are `markup5ever_rcdom` handles: a parent owns its children through
//! `Rc`, and every child keeps a `Weak` back-reference to its parent. The
//! back-reference is only ever used for lookups ("is my parent a footnote
//! marker?"), never for ownership, so dropping the root releases the whole
//! tree.
//!
//! This module adds what the passes need on top of rcdom:
//!
//! - [`Document`]: the owning root of one parsed or rewritten tree
//! - [`NodeKind`] / [`ElementKind`]: typed classification of a handle
//! - explicit constructors ([`new_text`], [`new_element`],
//!   [`new_inline_container`]) that always produce complete node records and
//!   wire up parent links through [`append_child`]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html5ever::tendril::StrTendril;
use html5ever::{Attribute, QualName, local_name, ns};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// Owning root of a document tree
///
/// The root carries rcdom's `Document` data (no tag name). Each transformation
/// request builds its own `Document`; nodes are never shared between two
/// documents.
pub struct Document {
    root: Handle,
}

impl Document {
    /// Create a document with a bare root and no children
    pub fn new() -> Self {
        Self {
            root: Node::new(NodeData::Document),
        }
    }

    /// Wrap the tree produced by html5ever's tree builder
    pub fn from_rcdom(dom: RcDom) -> Self {
        Self { root: dom.document }
    }

    /// Root node of the tree
    pub fn root(&self) -> &Handle {
        &self.root
    }

    /// Find the `<body>` element below `<html>`, if the tree has one
    pub fn body(&self) -> Option<Handle> {
        let html = find_child_element(&self.root, "html")?;
        find_child_element(&html, "body")
    }

    /// Concatenated text of every text node in document order
    pub fn text_content(&self) -> String {
        text_content(&self.root)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Element kinds the formatting passes treat specially
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `a`
    Anchor,
    /// `sup`
    FootnoteMarker,
    /// `p`
    Paragraph,
    /// `br`
    LineBreak,
    /// `h1`..`h6` with their level
    Heading(u8),
    /// Anything else, treated as a generic container
    Other,
}

impl ElementKind {
    /// Classify an element by its local tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "a" => ElementKind::Anchor,
            "sup" => ElementKind::FootnoteMarker,
            "p" => ElementKind::Paragraph,
            "br" => ElementKind::LineBreak,
            "h1" => ElementKind::Heading(1),
            "h2" => ElementKind::Heading(2),
            "h3" => ElementKind::Heading(3),
            "h4" => ElementKind::Heading(4),
            "h5" => ElementKind::Heading(5),
            "h6" => ElementKind::Heading(6),
            _ => ElementKind::Other,
        }
    }
}

/// Kind of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root (or template contents fragment)
    Root,
    /// Text leaf
    Text,
    /// Element with its classification
    Element(ElementKind),
    /// Comment, doctype or processing instruction
    Other,
}

/// Classify a node
pub fn node_kind(node: &Node) -> NodeKind {
    match node.data {
        NodeData::Document => NodeKind::Root,
        NodeData::Text { .. } => NodeKind::Text,
        NodeData::Element { ref name, .. } => {
            NodeKind::Element(ElementKind::from_tag(name.local.as_ref()))
        }
        NodeData::Comment { .. }
        | NodeData::Doctype { .. }
        | NodeData::ProcessingInstruction { .. } => NodeKind::Other,
    }
}

/// Local tag name of an element node
pub fn tag_name(node: &Node) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Parent of a node, if it is still alive
///
/// rcdom stores the back-reference in a `Cell`, so it is taken out, upgraded
/// and put back.
pub fn parent(node: &Node) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// True if the node's direct parent is a footnote marker (`sup`)
pub fn parent_is_footnote_marker(node: &Node) -> bool {
    parent(node).is_some_and(|p| {
        node_kind(&p) == NodeKind::Element(ElementKind::FootnoteMarker)
    })
}

/// Create a detached text node
pub fn new_text(value: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(value)),
    })
}

/// Create a detached element with the given name and attributes
pub fn new_element(name: QualName, attrs: Vec<Attribute>) -> Handle {
    Node::new(NodeData::Element {
        name,
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// Create an attribute-less `span` in the HTML namespace
pub fn new_inline_container() -> Handle {
    new_element(QualName::new(None, ns!(html), local_name!("span")), Vec::new())
}

/// Append `child` to `parent`, setting the child's weak back-reference
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Copy a node's own data without its children or parent link
///
/// Template contents are not copied; callers that need them handle them
/// explicitly.
pub fn shallow_copy(node: &Node) -> Handle {
    let data = match node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            ref name,
            ref public_id,
            ref system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { ref contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { ref contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            ref name,
            ref attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction {
            ref target,
            ref contents,
        } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data,
    })
}

/// Concatenated text of every text node below `node`, in document order
pub fn text_content(node: &Handle) -> String {
    let mut output = String::new();
    collect_text(node, &mut output);
    output
}

fn collect_text(node: &Handle, output: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        output.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, output);
    }
}

fn find_child_element(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| tag_name(child) == Some(tag))
        .cloned()
}
