use std::borrow::Cow;

use ego_tree::{NodeId, NodeRef};
use html5ever::{
    local_name, namespace_url, ns,
    tendril::{StrTendril, TendrilSink},
    ParseOpts, QualName,
};

mod node;
pub use node::Node;

mod sink;
use sink::HtmlTreeSink;

mod serialize;
pub use serialize::escape_text;

/// An HTML document parsed into an arena.
#[derive(Debug)]
pub struct Tree {
    errors: Vec<Cow<'static, str>>,
    pub tree: ego_tree::Tree<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            tree: ego_tree::Tree::new(Node::Document),
        }
    }

    /// Parses `html` as the contents of a `<body>` element.
    ///
    /// Parsing is lenient: malformed markup is repaired the way browsers repair it and the
    /// complaints are available through [`Tree::errors`].
    pub fn parse_fragment(html: &str) -> Self {
        let mut opts = ParseOpts::default();
        // If this is enabled (the default) then the contents of <noscript> elements get parsed
        // as text rather than markup.
        opts.tree_builder.scripting_enabled = false;
        html5ever::driver::parse_fragment(
            HtmlTreeSink::new(),
            opts,
            QualName::new(None, ns!(html), local_name!("body")),
            Vec::new(),
        )
        .one(html)
    }

    pub fn errors(&self) -> &[Cow<'static, str>] {
        &self.errors
    }

    /// The element holding the parsed fragment's top-level nodes.
    pub fn fragment_root(&self) -> Option<NodeId> {
        self.tree
            .root()
            .children()
            .find(|node| matches!(node.value(), Node::Element(_)))
            .map(|node| node.id())
    }

    /// Iterates over the nodes of the fragment in document order.
    pub fn descendants(&self) -> impl Iterator<Item = NodeRef<'_, Node>> {
        let root = self.fragment_root().and_then(|id| self.tree.get(id));
        root.into_iter()
            .flat_map(|root| root.descendants().skip(1))
    }

    /// The nearest element containing `node`, unless that is the fragment root itself.
    pub fn enclosing_element(&self, node: NodeRef<'_, Node>) -> Option<NodeId> {
        let root = self.fragment_root();
        node.parent()
            .filter(|parent| Some(parent.id()) != root)
            .filter(|parent| matches!(parent.value(), Node::Element(_)))
            .map(|parent| parent.id())
    }

    /// Sets the `id` attribute of the element `element`, replacing any previous value.
    pub fn set_id(&mut self, element: NodeId, id: impl Into<StrTendril>) {
        if let Some(mut node) = self.tree.get_mut(element) {
            if let Node::Element(element) = node.value() {
                element.attrs.id = Some(id.into());
            }
        }
    }

    /// Replaces the contents of the text node `id`.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<StrTendril>) {
        if let Some(mut node) = self.tree.get_mut(id) {
            if let Node::Text(value) = node.value() {
                *value = text.into();
            }
        }
    }

    /// Detaches `id`, and everything below it, from the tree.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Serializes the fragment's top-level nodes as XHTML.
    pub fn to_xhtml(&self) -> String {
        let mut xhtml = String::new();
        if let Some(root) = self.fragment_root().and_then(|id| self.tree.get(id)) {
            serialize::children(root, &mut xhtml);
        }
        xhtml
    }
}
