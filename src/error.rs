/// An assembled document is missing the structure footnote insertion and body
/// extraction rely on.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MalformedDocumentError {
    #[error("document has no opening <body> tag")]
    MissingBodyOpen,
    #[error("document has no closing </body> tag")]
    MissingBodyClose,
    #[error("closing </body> tag precedes the opening <body> tag")]
    MisorderedBody,
}
