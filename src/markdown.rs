use pulldown_cmark::{html, Options, Parser};

use crate::MarkdownConfig;

/// Renders CommonMark to an HTML fragment.
///
/// Footnote extensions stay disabled so Obsidian's footnote syntax reaches the HTML as text.
#[derive(Debug, Clone)]
pub struct Renderer {
    options: Options,
}

impl Renderer {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, config.tables);
        options.set(Options::ENABLE_STRIKETHROUGH, config.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, config.tasklists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, config.smart_punctuation);
        options.set(Options::ENABLE_HEADING_ATTRIBUTES, config.heading_attributes);
        Self { options }
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut rendered = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut rendered, Parser::new_ext(markdown, self.options));
        rendered
    }
}

/// Drops a leading `---`-delimited front-matter block.
///
/// The block ends at the next `---`, wherever it appears. Text without a closing delimiter
/// is returned unchanged.
pub fn strip_front_matter(markdown: &str) -> &str {
    let Some(rest) = markdown.strip_prefix("---") else {
        return markdown;
    };
    match rest.find("---") {
        Some(end) => rest[end + 3..].trim(),
        None => markdown,
    }
}
