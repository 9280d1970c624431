use std::{
    collections::HashMap,
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use walkdir::{DirEntry, WalkDir};

use crate::Converter;

/// The outcome of converting a set of notes.
#[derive(Debug, Default)]
pub struct Report {
    /// Source notes and the documents written for them.
    pub converted: Vec<(PathBuf, PathBuf)>,
    /// Notes that could not be converted, with the reason.
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Converter {
    /// Converts every `.md` file below `dir`.
    ///
    /// A note that fails to convert is logged and recorded in the [`Report`]; the remaining
    /// notes are converted regardless.
    pub fn convert_directory(&self, dir: &Path) -> anyhow::Result<Report> {
        let dir = dir
            .canonicalize()
            .with_context(|| format!("Unable to canonicalize path: {}", dir.display()))?;
        // Notes written into a directory inside the vault must not be picked up again
        let destination = match &self.config().output_dir {
            Some(output_dir) => {
                fs::create_dir_all(output_dir).with_context(|| {
                    format!("Unable to create directory '{}'", output_dir.display())
                })?;
                Some(output_dir.canonicalize().with_context(|| {
                    format!("Unable to canonicalize path: {}", output_dir.display())
                })?)
            }
            None => None,
        };

        let mut report = Report::default();
        let mut written = HashMap::new();
        for src in notes(&dir, destination.as_deref()) {
            match self.convert_file(&src) {
                Ok(output) => {
                    if let Some(previous) = written.insert(output.clone(), src.clone()) {
                        log::warn!(
                            "'{}' overwrote the output of '{}'",
                            src.display(),
                            previous.display()
                        );
                    }
                    report.converted.push((src, output));
                }
                Err(err) => {
                    log::warn!("Failed to convert '{}': {err:#}", src.display());
                    report.failed.push((src, err));
                }
            }
        }

        log::info!(
            "Converted {} of {} notes in {}",
            report.converted.len(),
            report.len(),
            dir.display()
        );
        Ok(report)
    }
}

/// Markdown files below `dir`, in a stable order, skipping hidden entries (such as the
/// `.obsidian` settings folder and `.trash`) and anything under `skip`.
fn notes<'a>(dir: &Path, skip: Option<&'a Path>) -> impl Iterator<Item = PathBuf> + 'a {
    let visible = |entry: &DirEntry| {
        entry.depth() == 0
            || !entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with('.'))
    };
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(visible)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(move |entry| !skip.is_some_and(|skip| entry.path().starts_with(skip)))
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("md")))
        .map(DirEntry::into_path)
}
