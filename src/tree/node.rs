use std::fmt;

use html5ever::{local_name, namespace_url, ns, tendril::StrTendril, Attribute, QualName};
use indexmap::IndexMap;

/// A node in the tree.
pub enum Node {
    /// The document root.
    Document,

    /// An HTML comment.
    Comment(StrTendril),

    /// Text.
    Text(StrTendril),

    /// An element.
    Element(Element),
}

#[derive(Clone, Default)]
pub struct Attributes {
    pub id: Option<StrTendril>,
    pub rest: IndexMap<QualName, StrTendril>,
}

/// An HTML element.
pub struct Element {
    /// The element name.
    pub name: QualName,
    /// The element attributes.
    pub attrs: Attributes,
}

pub trait QualNameExt {
    /// Is this the name of a [void element](https://developer.mozilla.org/en-US/docs/Glossary/Void_element)?
    fn is_void_element(&self) -> bool;

    /// Is this an element whose contents are written out without escaping?
    fn is_raw_text_element(&self) -> bool;
}

impl QualNameExt for QualName {
    fn is_void_element(&self) -> bool {
        self.ns == ns!(html)
            && matches!(
                self.local,
                local_name!("area")
                    | local_name!("base")
                    | local_name!("basefont")
                    | local_name!("bgsound")
                    | local_name!("br")
                    | local_name!("col")
                    | local_name!("embed")
                    | local_name!("frame")
                    | local_name!("hr")
                    | local_name!("img")
                    | local_name!("input")
                    | local_name!("keygen")
                    | local_name!("link")
                    | local_name!("meta")
                    | local_name!("param")
                    | local_name!("source")
                    | local_name!("track")
                    | local_name!("wbr")
            )
    }

    fn is_raw_text_element(&self) -> bool {
        self.ns == ns!(html) && matches!(self.local, local_name!("script") | local_name!("style"))
    }
}

impl Element {
    pub fn new(name: QualName, attributes: Vec<Attribute>) -> Self {
        let mut attrs = Attributes {
            id: None,
            rest: IndexMap::with_capacity(attributes.len()),
        };
        for attr in attributes {
            attrs.insert(attr);
        }
        Element { name, attrs }
    }
}

impl Attributes {
    /// Adds `attr`, replacing any previous value.
    pub fn insert(&mut self, attr: Attribute) {
        match attr.name.local {
            local_name!("id") if attr.name.ns == ns!() => {
                self.id = Some(attr.value);
            }
            _ => {
                self.rest.insert(attr.name, attr.value);
            }
        }
    }

    /// Adds `attr` unless the element already has an attribute of that name.
    pub fn insert_if_missing(&mut self, attr: Attribute) {
        match attr.name.local {
            local_name!("id") if attr.name.ns == ns!() => {
                if self.id.is_none() {
                    self.id = Some(attr.value);
                }
            }
            _ => {
                self.rest.entry(attr.name).or_insert(attr.value);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QualName, &StrTendril)> {
        const ID: &QualName = &QualName {
            prefix: None,
            ns: ns!(),
            local: local_name!("id"),
        };
        (self.id.as_ref().map(|id| (ID, id)).into_iter()).chain(&self.rest)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Document => write!(f, "Document"),
            Node::Comment(comment) => write!(f, "<!-- {comment} -->"),
            Node::Text(text) => write!(f, "Text({text:?})"),
            Node::Element(element) => write!(f, "{element:?}"),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "<{}", self.name.local)?;
        for (name, value) in self.attrs.iter() {
            write!(f, r#" {}="{value}""#, name.local)?;
        }
        write!(f, ">")
    }
}
