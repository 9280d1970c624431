use std::fmt;

use crate::{error::MalformedDocumentError, tree::escape_text};

const BODY_OPEN: &str = "<body>";
const BODY_CLOSE: &str = "</body>";
const HEADING_OPEN: &str = "\n  <h1>";
const HEADING_CLOSE: &str = "</h1>\n";

/// An EPUB3 XHTML content document wrapping an HTML body.
pub struct XhtmlDocument<'a> {
    /// Used for both the `<title>` and the leading `<h1>`.
    pub title: &'a str,
    /// Written verbatim after the heading.
    pub body: &'a str,
}

/// An assembled document cut around the contents of its `<body>`.
#[derive(Debug, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Everything up to and including `<body>`.
    pub head: &'a str,
    /// The title heading opening the body, if present.
    pub heading: &'a str,
    /// The note's content, between the heading and `</body>`.
    pub body: &'a str,
    /// Everything from `</body>` onwards.
    pub tail: &'a str,
}

impl fmt::Display for XhtmlDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = escape_text(self.title);
        writeln!(f, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(f, "<!DOCTYPE html>")?;
        writeln!(
            f,
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">"#
        )?;
        writeln!(f, "<head>")?;
        writeln!(f, r#"  <meta charset="utf-8"/>"#)?;
        writeln!(f, "  <title>{title}</title>")?;
        writeln!(f, "</head>")?;
        writeln!(f, "{BODY_OPEN}")?;
        writeln!(f, "  <h1>{title}</h1>")?;
        writeln!(f, "{}", self.body)?;
        writeln!(f, "{BODY_CLOSE}")?;
        write!(f, "</html>")
    }
}

/// Splits `document` at its first `<body>` and last `</body>`, separating the title heading
/// from the note's content.
pub fn split(document: &str) -> Result<Sections<'_>, MalformedDocumentError> {
    let start = document
        .find(BODY_OPEN)
        .ok_or(MalformedDocumentError::MissingBodyOpen)?
        + BODY_OPEN.len();
    let end = document
        .rfind(BODY_CLOSE)
        .ok_or(MalformedDocumentError::MissingBodyClose)?;
    if end < start {
        return Err(MalformedDocumentError::MisorderedBody);
    }
    let content = start + heading_len(&document[start..end]);
    Ok(Sections {
        head: &document[..start],
        heading: &document[start..content],
        body: &document[content..end],
        tail: &document[end..],
    })
}

/// Offset of the note's content in `document`: just past `<body>` and the title heading, or
/// the start of the text when there is no `<body>`.
pub fn content_start(document: &str) -> usize {
    match document.find(BODY_OPEN) {
        Some(open) => {
            let start = open + BODY_OPEN.len();
            start + heading_len(&document[start..])
        }
        None => 0,
    }
}

fn heading_len(body: &str) -> usize {
    if !body.starts_with(HEADING_OPEN) {
        return 0;
    }
    body.find(HEADING_CLOSE)
        .map_or(0, |end| end + HEADING_CLOSE.len())
}
