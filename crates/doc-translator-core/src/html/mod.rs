//! HTML-bearing documents: parse into an arena, pull out the text nodes,
//! write translations back in place.

mod document;
mod extract;
mod reassemble;

pub use document::{Descendants, HtmlDocument, Node, NodeId, NodeKind};
pub use extract::{ExtractedNode, extract_text_nodes};
pub use reassemble::reassemble;
