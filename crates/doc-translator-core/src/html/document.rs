use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::io;

use crate::error::{Error, Result};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Stable index of a node inside an [`HtmlDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element {
        name: QualName,
        attrs: Vec<(QualName, String)>,
    },
    Text(String),
    Comment(String),
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local tag name for elements.
    pub fn element_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }
}

/// The `<body>` subtree of a parsed HTML document, held as an arena.
///
/// Nodes never move once created, so a [`NodeId`] stays valid for the
/// lifetime of the document. The arena owns plain strings only and can be
/// held across await points.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    nodes: Vec<Node>,
}

impl HtmlDocument {
    /// Parse an HTML document or fragment (for example DOCX converter output).
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let mut doc = Self { nodes: Vec::new() };

        match find_element(&dom.document, "body") {
            Some(body) => doc.import(&body, None),
            // Frameset documents have no body
            None => {
                doc.push(
                    NodeKind::Element {
                        name: html_name("body"),
                        attrs: Vec::new(),
                    },
                    None,
                );
            }
        }

        doc
    }

    /// The body element.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Overwrite the content of a text node, leaving the tree untouched.
    pub fn set_text(&mut self, id: NodeId, text: String) -> Result<()> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Text(current)) => {
                *current = text;
                Ok(())
            }
            _ => Err(Error::InvalidNodeRef(id.0)),
        }
    }

    /// All nodes below `root` (inclusive) in document order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![root],
        }
    }

    /// Serialized markup of the body's children, as `innerHTML` would give.
    pub fn inner_html(&self) -> Result<String> {
        let root = self.root();
        let name = match self.node(root).map(|n| &n.kind) {
            Some(NodeKind::Element { name, .. }) => name.clone(),
            _ => html_name("body"),
        };

        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(Some(name)),
            ..Default::default()
        };

        let mut buf = Vec::new();
        serialize(&mut buf, &Subtree { doc: self, id: root }, opts)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn import(&mut self, handle: &Handle, parent: Option<NodeId>) {
        let kind = match &handle.data {
            NodeData::Element { name, attrs, .. } => NodeKind::Element {
                name: name.clone(),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.clone(), attr.value.to_string()))
                    .collect(),
            },
            NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
            NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
            NodeData::ProcessingInstruction { target, contents } => {
                NodeKind::ProcessingInstruction {
                    target: target.to_string(),
                    data: contents.to_string(),
                }
            }
            NodeData::Document | NodeData::Doctype { .. } => return,
        };

        let id = self.push(kind, parent);
        for child in handle.children.borrow().iter() {
            self.import(child, Some(id));
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    doc: &'a HtmlDocument,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(node) = self.doc.node(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}

struct Subtree<'a> {
    doc: &'a HtmlDocument,
    id: NodeId,
}

impl Subtree<'_> {
    fn serialize_children<S: Serializer>(&self, serializer: &mut S) -> io::Result<()> {
        let Some(node) = self.doc.node(self.id) else {
            return Ok(());
        };
        for &child in &node.children {
            Subtree { doc: self.doc, id: child }.serialize(serializer, TraversalScope::IncludeNode)?;
        }
        Ok(())
    }
}

impl Serialize for Subtree<'_> {
    fn serialize<S>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()>
    where
        S: Serializer,
    {
        if let TraversalScope::ChildrenOnly(_) = traversal_scope {
            return self.serialize_children(serializer);
        }

        let Some(node) = self.doc.node(self.id) else {
            return Ok(());
        };

        match &node.kind {
            NodeKind::Element { name, attrs } => {
                serializer.start_elem(name.clone(), attrs.iter().map(|(n, v)| (n, v.as_str())))?;
                self.serialize_children(serializer)?;
                serializer.end_elem(name.clone())
            }
            NodeKind::Text(text) => serializer.write_text(text),
            NodeKind::Comment(text) => serializer.write_comment(text),
            NodeKind::ProcessingInstruction { target, data } => {
                serializer.write_processing_instruction(target, data)
            }
        }
    }
}

fn html_name(local: &str) -> QualName {
    QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(local))
}

fn find_element(node: &Handle, local: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &node.data {
        if name.local.as_ref() == local {
            return Some(node.clone());
        }
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, local))
}
