use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

mod anchors;

mod document;
use document::XhtmlDocument;

mod error;
pub use error::MalformedDocumentError;

mod footnotes;

mod markdown;

mod tree;
use tree::Tree;

mod vault;
pub use vault::Report;

/// Converter configuration, usually read from a TOML file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Directory receiving the `.xhtml` files. Defaults to the directory of each note.
    pub output_dir: Option<PathBuf>,
    /// Markdown extensions to enable on top of CommonMark.
    pub markdown: MarkdownConfig,
}

#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
    pub heading_attributes: bool,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file '{}'", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Unable to parse config file '{}'", path.display()))
    }
}

/// Converts Obsidian notes into EPUB3 XHTML content documents.
pub struct Converter {
    config: Config,
    markdown: markdown::Renderer,
}

impl Converter {
    pub fn new(config: Config) -> Self {
        Self {
            markdown: markdown::Renderer::new(&config.markdown),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Converts the Markdown source of a note titled `title` into an XHTML document.
    pub fn convert_markdown(
        &self,
        title: &str,
        markdown: &str,
    ) -> Result<String, MalformedDocumentError> {
        let body = self.markdown.render(markdown::strip_front_matter(markdown));
        let document = XhtmlDocument { title, body: &body }.to_string();

        let footnotes = footnotes::resolve(&document)?;
        let sections = document::split(&footnotes.html)?;

        let mut tree = Tree::parse_fragment(sections.body);
        for err in tree.errors() {
            log::debug!("HTML parse error in '{title}': {err}");
        }
        let anchors = anchors::resolve(&mut tree, &footnotes.definitions);
        log::debug!(
            "'{title}': {} footnotes, {} block anchors, {} footnote definitions removed",
            footnotes.count,
            anchors.anchors.len(),
            anchors.removed_definitions,
        );

        let body = tree.to_xhtml();
        Ok([sections.head, sections.heading, body.as_str(), sections.tail].concat())
    }

    /// Converts the note at `path`, returning the path of the written `.xhtml` file.
    pub fn convert_file(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let title = path
            .file_stem()
            .with_context(|| format!("'{}' has no file name", path.display()))?
            .to_string_lossy();
        let markdown = fs::read_to_string(path)
            .with_context(|| format!("Unable to read '{}'", path.display()))?;
        let xhtml = self
            .convert_markdown(&title, &markdown)
            .with_context(|| format!("Unable to convert '{}'", path.display()))?;

        let destination = self.output_path(path);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Unable to create directory '{}'", parent.display()))?;
        }
        fs::write(&destination, xhtml)
            .with_context(|| format!("Unable to write '{}'", destination.display()))?;
        log::info!("Wrote output to {}", destination.display());
        Ok(destination)
    }

    /// Converts a single note, or every note below a directory.
    pub fn convert(&self, path: &Path) -> anyhow::Result<Report> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Unable to access '{}'", path.display()))?;
        if metadata.is_dir() {
            self.convert_directory(path)
        } else {
            let output = self.convert_file(path)?;
            Ok(Report {
                converted: vec![(path.to_path_buf(), output)],
                failed: Vec::new(),
            })
        }
    }

    fn output_path(&self, source: &Path) -> PathBuf {
        let file_name = source.with_extension("xhtml");
        let file_name = file_name.file_name().unwrap_or(file_name.as_os_str());
        match &self.config.output_dir {
            Some(dir) => dir.join(file_name),
            None => source.with_file_name(file_name),
        }
    }
}

#[cfg(test)]
mod tests;
