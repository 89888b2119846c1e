use tracing::debug;

use super::document::HtmlDocument;
use super::extract::ExtractedNode;
use crate::error::{Error, Result};

/// Write `translations[i]` into the node behind `nodes[i]` and serialize the
/// body's markup.
///
/// Both sequences come from the same extraction pass and must have equal
/// length; anything else is a contract violation and nothing is written.
pub fn reassemble(
    doc: &mut HtmlDocument,
    nodes: Vec<ExtractedNode>,
    translations: Vec<String>,
) -> Result<String> {
    if nodes.len() != translations.len() {
        return Err(Error::LengthMismatch {
            expected: nodes.len(),
            actual: translations.len(),
        });
    }

    let count = nodes.len();
    for (node, translated) in nodes.into_iter().zip(translations) {
        doc.set_text(node.node(), translated)?;
    }

    debug!("Reassembled {} text node(s)", count);
    doc.inner_html()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::extract_text_nodes;

    #[test]
    fn test_translations_replace_only_text() {
        let html = r#"<p class="lead">Good morning</p><p>See <a href="/x">here</a></p>"#;
        let mut doc = HtmlDocument::parse(html);
        let nodes = extract_text_nodes(&doc).unwrap();
        let translated = vec!["Buenos días".to_string(), "Ver".to_string(), "aquí".to_string()];

        let out = reassemble(&mut doc, nodes, translated).unwrap();
        assert_eq!(out, r#"<p class="lead">Buenos días</p><p>Ver<a href="/x">aquí</a></p>"#);
    }

    #[test]
    fn test_length_mismatch_is_rejected_before_writing() {
        let mut doc = HtmlDocument::parse("<p>one</p><p>two</p>");
        let nodes = extract_text_nodes(&doc).unwrap();

        let err = reassemble(&mut doc, nodes, vec!["uno".to_string()]).unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { expected: 2, actual: 1 }));
        assert!(err.is_contract_violation());
        assert_eq!(doc.inner_html().unwrap(), "<p>one</p><p>two</p>");
    }
}
