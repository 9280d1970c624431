//! XHTML serialization.
//!
//! EPUB reading systems parse content documents as XML, so void elements are self-closed
//! and text is escaped with the XML predefined entities only.

use std::{borrow::Cow, fmt::Write as _};

use ego_tree::NodeRef;
use html5ever::{namespace_url, ns, QualName};

use super::node::{Element, Node, QualNameExt};

const XLINK: &str = "http://www.w3.org/1999/xlink";

pub(super) fn children(parent: NodeRef<'_, Node>, out: &mut String) {
    for child in parent.children() {
        node(child, out);
    }
}

fn node(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Document => children(node, out),
        Node::Comment(comment) => {
            let _ = write!(out, "<!--{comment}-->");
        }
        Node::Text(text) => {
            let raw = node.parent().is_some_and(|parent| match parent.value() {
                Node::Element(element) => element.name.is_raw_text_element(),
                _ => false,
            });
            if raw {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        Node::Element(element) => {
            out.push('<');
            push_name(&element.name, out);
            if let Some(namespace) = foreign_namespace(node) {
                if !declares(element, "xmlns") {
                    let _ = write!(out, r#" xmlns="{namespace}""#);
                }
                if uses_xlink(node) && !declares(element, "xlink") {
                    let _ = write!(out, r#" xmlns:xlink="{XLINK}""#);
                }
            }
            for (name, value) in element.attrs.iter() {
                out.push(' ');
                push_name(name, out);
                let _ = write!(out, r#"="{}""#, escape_attribute(value));
            }
            if element.name.is_void_element() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            children(node, out);
            out.push_str("</");
            push_name(&element.name, out);
            out.push('>');
        }
    }
}

fn push_name(name: &QualName, out: &mut String) {
    if let Some(prefix) = &name.prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(&name.local);
}

/// SVG and MathML roots need their namespace declared to survive XML parsing.
fn foreign_namespace(node: NodeRef<'_, Node>) -> Option<&'static str> {
    let Node::Element(element) = node.value() else {
        return None;
    };
    let namespace = if element.name.ns == ns!(svg) {
        "http://www.w3.org/2000/svg"
    } else if element.name.ns == ns!(mathml) {
        "http://www.w3.org/1998/Math/MathML"
    } else {
        return None;
    };
    let inherited = node.parent().is_some_and(|parent| match parent.value() {
        Node::Element(parent) => parent.name.ns == element.name.ns,
        _ => false,
    });
    (!inherited).then_some(namespace)
}

/// Does `element` carry its own `xmlns` (or `xmlns:{local}`) attribute?
fn declares(element: &Element, local: &str) -> bool {
    element
        .attrs
        .rest
        .keys()
        .any(|name| name.ns == ns!(xmlns) && &*name.local == local)
}

/// Do `node` or its descendants have `xlink:` attributes, such as SVG's `xlink:href`?
fn uses_xlink(node: NodeRef<'_, Node>) -> bool {
    node.descendants().any(|node| match node.value() {
        Node::Element(element) => element.attrs.rest.keys().any(|name| name.ns == ns!(xlink)),
        _ => false,
    })
}

fn escape(s: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && c == '"');
    if !s.contains(needs_escape) {
        return Cow::Borrowed(s);
    }
    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if quotes => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Escapes `text` for use as element content.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Escapes `value` for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, true)
}

#[cfg(test)]
mod tests {
    use super::{escape_attribute, escape_text};
    use crate::tree::Tree;

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_text(r#"say "hi""#), r#"say "hi""#);
        assert_eq!(escape_attribute(r#"say "hi" & go"#), "say &quot;hi&quot; &amp; go");
    }

    #[test]
    fn non_breaking_spaces_are_written_as_characters() {
        let tree = Tree::parse_fragment("<p>a&nbsp;b</p>");
        assert_eq!(tree.to_xhtml(), "<p>a\u{a0}b</p>");
    }

    #[test]
    fn foreign_content_declares_its_namespace() {
        let tree = Tree::parse_fragment(r#"<p><svg viewBox="0 0 1 1"><circle r="1"></circle></svg></p>"#);
        assert_eq!(
            tree.to_xhtml(),
            r#"<p><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"><circle r="1"></circle></svg></p>"#
        );
    }

    #[test]
    fn xlink_attributes_declare_their_namespace() {
        let tree = Tree::parse_fragment(r##"<svg><use xlink:href="#dot"></use></svg>"##);
        assert_eq!(
            tree.to_xhtml(),
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#dot"></use></svg>"##
        );
    }

    #[test]
    fn existing_declarations_are_not_repeated() {
        let html = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#dot"></use></svg>"##;
        assert_eq!(Tree::parse_fragment(html).to_xhtml(), html);
    }
}
