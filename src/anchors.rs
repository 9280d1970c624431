//! Obsidian block anchors (`Some claim. ^c1150d`), turned into `id` attributes.
//!
//! The same walk over the parsed body drops the elements holding deferred footnote
//! definitions, whose references [`crate::footnotes::resolve`] has already rewritten.

use ego_tree::NodeId;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    footnotes,
    tree::{Node, Tree},
};

/// `^token` at the very end of a text node, optionally followed by one newline.
static TRAILING_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^(\w*)(\n?)$").unwrap());

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Anchor ids, in document order.
    pub anchors: Vec<String>,
    pub removed_definitions: usize,
}

enum Edit {
    Text { node: NodeId, value: String },
    Anchor { element: Option<NodeId>, id: String },
    RemoveDefinition(NodeId),
}

/// Resolves the block anchors in `tree` and removes the definitions of the deferred
/// footnotes named by `definitions`.
pub fn resolve(tree: &mut Tree, definitions: &IndexSet<String>) -> Summary {
    let mut summary = Summary::default();
    let mut edits = Vec::new();
    for node in tree.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let text: &str = text;
        let element = tree.enclosing_element(node);

        if let Some(element) = element {
            if node.prev_sibling().is_none() && footnotes::is_definition(text, definitions) {
                edits.push(Edit::RemoveDefinition(element));
                continue;
            }
        }

        // A definition sharing its element with other lines only loses its own lines
        let kept = footnotes::strip_definition(text, definitions);
        if kept.is_some() {
            summary.removed_definitions += 1;
        }
        let kept = kept.unwrap_or(text);

        match TRAILING_ANCHOR.captures(kept) {
            Some(caps) => {
                // The match always extends to the end of the text
                let start = kept.len() - caps[0].len();
                edits.push(Edit::Text {
                    node: node.id(),
                    value: format!("{}{}", &kept[..start], &caps[2]),
                });
                edits.push(Edit::Anchor {
                    element,
                    id: caps[1].to_owned(),
                });
            }
            None if kept.len() != text.len() => edits.push(Edit::Text {
                node: node.id(),
                value: kept.to_owned(),
            }),
            None => {}
        }
    }

    for edit in edits {
        match edit {
            Edit::Text { node, value } => tree.set_text(node, value),
            Edit::Anchor { element, id } => {
                if let Some(element) = element {
                    tree.set_id(element, id.as_str());
                }
                log::debug!("Converted block anchor ^{id}");
                summary.anchors.push(id);
            }
            Edit::RemoveDefinition(element) => {
                tree.remove(element);
                summary.removed_definitions += 1;
            }
        }
    }
    summary
}
