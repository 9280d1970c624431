use ego_tree::NodeId;
use html5ever::{
    local_name, namespace_url, ns,
    tendril::{format_tendril, StrTendril},
    tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, QualName,
};
use std::{
    borrow::Cow,
    cell::{Ref, RefCell},
};

use super::{
    node::{Element, Node},
    Tree,
};

/// Builds a [`Tree`] from html5ever's parser callbacks.
#[derive(Debug)]
pub struct HtmlTreeSink {
    pub tree: RefCell<Tree>,
}

impl HtmlTreeSink {
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Tree::new()),
        }
    }
}

impl TreeSink for HtmlTreeSink {
    type Handle = NodeId;
    type Output = Tree;
    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> Tree {
        self.tree.into_inner()
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        self.tree.borrow_mut().errors.push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.tree.borrow().tree.root().id()
    }

    fn elem_name<'a>(&'a self, target: &Self::Handle) -> Ref<'a, QualName> {
        const UNNAMED: &QualName = &QualName {
            prefix: None,
            ns: ns!(),
            local: local_name!(""),
        };
        Ref::map(self.tree.borrow(), |this| {
            match this.tree.get(*target).map(|node| node.value()) {
                Some(Node::Element(element)) => &element.name,
                _ => UNNAMED,
            }
        })
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let mut this = self.tree.borrow_mut();
        this.tree
            .orphan(Node::Element(Element::new(name, attrs)))
            .id()
    }

    fn create_comment(&self, comment: StrTendril) -> Self::Handle {
        let mut this = self.tree.borrow_mut();
        this.tree.orphan(Node::Comment(comment)).id()
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        let mut this = self.tree.borrow_mut();
        // https://developer.mozilla.org/en-US/docs/Web/API/ProcessingInstruction
        // says processing instructions are considered comments in HTML
        let comment = format_tendril!("<?{target} {data}?>");
        this.tree.orphan(Node::Comment(comment)).id()
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut this = self.tree.borrow_mut();
        let Some(mut parent) = this.tree.get_mut(*parent) else {
            return;
        };

        match child {
            NodeOrText::AppendNode(id) => {
                parent.append_id(id);
            }
            NodeOrText::AppendText(text) => {
                if let Some(mut child) = parent.last_child() {
                    if let Node::Text(t) = child.value() {
                        t.push_tendril(&text);
                        return;
                    }
                }
                parent.append(Node::Text(text));
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = {
            let this = self.tree.borrow();
            this.tree
                .get(*element)
                .is_some_and(|element| element.parent().is_some())
        };

        if has_parent {
            self.append_before_sibling(element, child)
        } else {
            self.append(prev_element, child)
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    // Template contents are kept as ordinary children of the <template> element.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut this = self.tree.borrow_mut();
        let Some(mut sibling) = this.tree.get_mut(*sibling) else {
            return;
        };

        match new_node {
            NodeOrText::AppendNode(id) => {
                sibling.insert_id_before(id);
            }
            NodeOrText::AppendText(text) => {
                if let Some(mut prev) = sibling.prev_sibling() {
                    if let Node::Text(t) = prev.value() {
                        t.push_tendril(&text);
                        return;
                    }
                }
                sibling.insert_before(Node::Text(text));
            }
        }
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attributes: Vec<Attribute>) {
        let mut this = self.tree.borrow_mut();
        let Some(mut node) = this.tree.get_mut(*target) else {
            return;
        };
        if let Node::Element(element) = node.value() {
            for attr in attributes {
                element.attrs.insert_if_missing(attr);
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        let mut this = self.tree.borrow_mut();
        if let Some(mut node) = this.tree.get_mut(*target) {
            node.detach();
        }
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut this = self.tree.borrow_mut();
        if let Some(mut new_parent) = this.tree.get_mut(*new_parent) {
            new_parent.reparent_from_id_append(*node);
        }
    }
}
