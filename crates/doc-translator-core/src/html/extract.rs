use tracing::debug;

use super::document::{HtmlDocument, NodeId, NodeKind};
use crate::error::{Error, Result};

/// Elements whose text is code or inert markup rather than prose.
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "template"];

/// A text node selected for translation.
///
/// The handle is the join key with the translated string at the same index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedNode {
    node: NodeId,
    original: String,
}

impl ExtractedNode {
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Node value as found in the document.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Trimmed text sent to the provider.
    pub fn text(&self) -> &str {
        self.original.trim()
    }
}

/// Collect the non-blank text nodes of the body in document order.
///
/// Fails with [`Error::NoContentFound`] when there is nothing to translate.
pub fn extract_text_nodes(doc: &HtmlDocument) -> Result<Vec<ExtractedNode>> {
    let mut found = Vec::new();
    let mut stack = vec![doc.root()];

    while let Some(id) = stack.pop() {
        let Some(node) = doc.node(id) else { continue };
        match &node.kind {
            NodeKind::Text(text) if !text.trim().is_empty() => {
                found.push(ExtractedNode {
                    node: id,
                    original: text.clone(),
                });
            }
            NodeKind::Element { name, .. } if NON_TEXT_ELEMENTS.contains(&&*name.local) => {}
            _ => stack.extend(node.children().iter().rev().copied()),
        }
    }

    debug!("Extracted {} text node(s) from {} nodes", found.len(), doc.len());

    if found.is_empty() {
        return Err(Error::NoContentFound);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(nodes: &[ExtractedNode]) -> Vec<&str> {
        nodes.iter().map(ExtractedNode::text).collect()
    }

    #[test]
    fn test_collects_text_in_document_order() {
        let doc = HtmlDocument::parse("<h1>Title</h1><p>First <b>bold</b> end</p><ul><li>Item</li></ul>");
        let nodes = extract_text_nodes(&doc).unwrap();
        assert_eq!(texts(&nodes), vec!["Title", "First", "bold", "end", "Item"]);
    }

    #[test]
    fn test_whitespace_only_nodes_are_skipped() {
        let doc = HtmlDocument::parse("<p>a</p>\n   \n<p>  b  </p>\t");
        let nodes = extract_text_nodes(&doc).unwrap();
        assert_eq!(texts(&nodes), vec!["a", "b"]);
        assert_eq!(nodes[1].original(), "  b  ");
    }

    #[test]
    fn test_handles_point_at_the_text_nodes() {
        let doc = HtmlDocument::parse("<p>one</p><p>two</p>");
        for node in extract_text_nodes(&doc).unwrap() {
            assert_eq!(doc.text(node.node()), Some(node.original()));
        }
    }

    #[test]
    fn test_script_and_style_are_not_text() {
        let doc = HtmlDocument::parse("<style>p { color: red }</style><p>visible</p><script>var x = 1;</script>");
        let nodes = extract_text_nodes(&doc).unwrap();
        assert_eq!(texts(&nodes), vec!["visible"]);
    }

    #[test]
    fn test_empty_body_is_no_content() {
        for html in ["", "<p></p>", "<p>   </p><br>", "<img src=\"a.png\">"] {
            let doc = HtmlDocument::parse(html);
            assert!(matches!(extract_text_nodes(&doc), Err(Error::NoContentFound)), "{html:?}");
        }
    }
}
