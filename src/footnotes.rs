//! Obsidian footnotes, rewritten into EPUB3 `noteref`/`footnote` markup.
//!
//! Two dialects are recognized in rendered HTML text:
//!
//! - inline footnotes, `^[body]`, which carry their body at the point of reference;
//! - deferred footnotes, `[^connector]` references paired with a `[^connector]: body`
//!   definition elsewhere in the document.
//!
//! All footnotes of a document share one numbering: inline footnotes first, in order of
//! appearance, followed by deferred footnotes in order of appearance.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{document, error::MalformedDocumentError};

/// `^[body]`, stopping at the first `]`.
static INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\^\[(.+?)\]").unwrap());

/// `[^connector]: body`, where the body is at least one character long and runs up to the
/// next tag.
static DEFERRED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\^(\w+)\]: ((?s:.)[^<]*)<").unwrap());

/// A `[^connector]: ` definition marker at the start of a line.
static DEFINITION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\[\^(\w+)\]: ").unwrap());

const BODY_CLOSE: &str = "</body>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Footnote {
    Inline { body: String },
    Deferred { connector: String, body: String },
}

/// The outcome of [`resolve`].
#[derive(Debug)]
pub struct Resolved {
    pub html: String,
    /// Connectors of the deferred footnotes whose definitions are still present in `html`
    /// and must be removed once the document has been parsed.
    pub definitions: IndexSet<String>,
    pub count: usize,
}

impl Footnote {
    /// Finds the footnotes in `html`, in numbering order.
    pub fn extract(html: &str) -> Vec<Self> {
        let inline = INLINE.captures_iter(html).map(|caps| Footnote::Inline {
            body: caps[1].to_owned(),
        });
        let deferred = DEFERRED.captures_iter(html).map(|caps| Footnote::Deferred {
            connector: caps[1].to_owned(),
            body: caps[2].to_owned(),
        });
        inline.chain(deferred).collect()
    }

    pub fn body(&self) -> &str {
        match self {
            Footnote::Inline { body } | Footnote::Deferred { body, .. } => body,
        }
    }

    /// Replaces the references to this footnote with a link to footnote `number`.
    fn rewrite(&self, html: &str, number: usize) -> String {
        let noteref = noteref(number);
        match self {
            // Every identical marker is replaced, so footnotes with the same body all point
            // at the first one.
            Footnote::Inline { body } => html.replace(&format!("^[{body}]"), &noteref),
            Footnote::Deferred { connector, .. } => {
                replace_references(html, connector, &noteref)
            }
        }
    }
}

/// Rewrites every footnote in `html` and appends the footnote bodies before `</body>`.
///
/// Only the note's content is scanned: the document head and the title heading are left
/// untouched. Deferred footnote definitions are left in place; their connectors are returned
/// in [`Resolved::definitions`] so the text holding them can be dropped from the parsed tree.
pub fn resolve(html: &str) -> Result<Resolved, MalformedDocumentError> {
    let (shell, content) = html.split_at(document::content_start(html));
    let footnotes = Footnote::extract(content);
    let mut content = content.to_owned();
    let mut definitions = IndexSet::new();
    for (number, footnote) in (1..).zip(&footnotes) {
        content = footnote.rewrite(&content, number);
        let insert_at = content
            .rfind(BODY_CLOSE)
            .ok_or(MalformedDocumentError::MissingBodyClose)?;
        content.insert_str(insert_at, &aside(number, footnote.body()));
        if let Footnote::Deferred { connector, .. } = footnote {
            definitions.insert(connector.clone());
        }
    }
    log::debug!("Resolved {} footnotes", footnotes.len());
    Ok(Resolved {
        html: [shell, content.as_str()].concat(),
        definitions,
        count: footnotes.len(),
    })
}

/// Does `text` begin a definition of one of the given deferred footnotes?
pub fn is_definition(text: &str, connectors: &IndexSet<String>) -> bool {
    let Some(rest) = text.strip_prefix("[^") else {
        return false;
    };
    let Some((connector, _)) = rest.split_once("]: ") else {
        return false;
    };
    connectors.contains(connector)
}

/// Cuts `text` before the first line that starts a definition of one of the given deferred
/// footnotes, along with the line break leading to it.
///
/// Returns `None` when `text` holds no such definition.
pub fn strip_definition<'a>(text: &'a str, connectors: &IndexSet<String>) -> Option<&'a str> {
    let start = DEFINITION_LINE
        .captures_iter(text)
        .find(|caps| connectors.contains(&caps[1]))?
        .get(0)?
        .start();
    let kept = &text[..start];
    Some(kept.strip_suffix('\n').unwrap_or(kept))
}

fn noteref(number: usize) -> String {
    format!(r##"<sup id="fnref{number}"><a href="#fn{number}" epub:type="noteref">{number}</a></sup>"##)
}

fn aside(number: usize, body: &str) -> String {
    format!("\n<aside id=\"fn{number}\" epub:type=\"footnote\"><p>{body}</p></aside>")
}

/// Replaces `[^connector]` markers that are not immediately followed by `:`.
fn replace_references(html: &str, connector: &str, noteref: &str) -> String {
    let marker = format!("[^{connector}]");
    let mut replaced = String::with_capacity(html.len());
    let mut copied = 0;
    for (start, _) in html.match_indices(&marker) {
        let end = start + marker.len();
        if html[end..].starts_with(':') {
            continue;
        }
        replaced.push_str(&html[copied..start]);
        replaced.push_str(noteref);
        copied = end;
    }
    replaced.push_str(&html[copied..]);
    replaced
}
