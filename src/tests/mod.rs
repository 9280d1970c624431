use std::{
    fmt::{self, Write},
    fs::{self, File},
    io::{self, Read, Seek},
    path::{Path, PathBuf},
};

use anyhow::Context;
use regex::Regex;
use tempfile::{tempfile, TempDir};

use crate::{Config, Converter, Report};

pub struct Vault {
    root: TempDir,
    config: Config,
    _logger: tracing::subscriber::DefaultGuard,
    logfile: File,
}

#[derive(Clone, Copy)]
pub struct Options {
    max_log_level: tracing::level_filters::LevelFilter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_log_level: tracing::Level::WARN.into(),
        }
    }
}

impl Options {
    pub fn init(self) -> Vault {
        Vault::new(TempDir::new().unwrap(), self)
    }

    pub fn max_log_level(
        mut self,
        max_level: impl Into<tracing::level_filters::LevelFilter>,
    ) -> Self {
        self.max_log_level = max_level.into();
        self
    }
}

impl Vault {
    pub fn init() -> Self {
        Options::default().init()
    }

    pub fn options() -> Options {
        Options::default()
    }

    fn new(root: TempDir, options: Options) -> Self {
        // Initialize logger to captures `log` output and redirect it to a tempfile
        let logfile = tempfile().unwrap();
        let _logger = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_max_level(options.max_log_level)
                .compact()
                .without_time()
                .with_writer({
                    let logfile = logfile.try_clone().unwrap();
                    move || logfile.try_clone().unwrap()
                })
                .finish(),
        );
        {
            let logger = tracing_log::LogTracer::new();
            let _ = log::set_boxed_logger(Box::new(logger));
            log::set_max_level(log::LevelFilter::Trace);
        }

        Self {
            root,
            config: Config::default(),
            _logger,
            logfile,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Writes converted notes to `dir`, relative to the vault root.
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = Some(self.root.path().join(dir));
        self
    }

    pub fn note(self, path: impl AsRef<Path>, contents: &str) -> Self {
        self.file(path, contents)
    }

    pub fn file(self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Self {
        let path = self.root.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
        self
    }

    pub fn build(self) -> BuildOutput {
        let root = self.root.path().canonicalize().unwrap();
        let converter = Converter::new(self.config.clone());
        let res = converter.convert(&root);
        self.finish(res)
    }

    /// Converts only the note at `path`, relative to the vault root.
    pub fn build_note(self, path: impl AsRef<Path>) -> BuildOutput {
        let root = self.root.path().canonicalize().unwrap();
        let converter = Converter::new(self.config.clone());
        let res = converter.convert(&root.join(path));
        self.finish(res)
    }

    fn finish(mut self, res: anyhow::Result<Report>) -> BuildOutput {
        self.logfile.seek(io::SeekFrom::Start(0)).unwrap();
        let mut logs = String::new();
        self.logfile.read_to_string(&mut logs).unwrap();
        let report = match res {
            Ok(report) => Some(report),
            Err(err) => {
                writeln!(&mut logs, "{err:#}").unwrap();
                None
            }
        };

        let root = self.root.path().canonicalize().unwrap();
        let re = Regex::new(&regex::escape(&root.display().to_string())).unwrap();
        let logs = re.replace_all(&logs, "$$ROOT");
        BuildOutput {
            logs: logs.into(),
            report,
            dir: root,
            _root: self.root,
        }
    }
}

fn visualize_directory(dir: impl AsRef<Path>, mut writer: impl fmt::Write) -> anyhow::Result<()> {
    fn visualize_directory(
        root: &Path,
        dir: &Path,
        writer: &mut dyn fmt::Write,
    ) -> anyhow::Result<()> {
        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("Unable to read directory: {}", dir.display()))?
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|entry| entry.path());
        for entry in entries {
            let path = entry.path();
            match entry.file_type()? {
                ty if ty.is_dir() => visualize_directory(root, path.as_ref(), writer)?,
                ty if ty.is_file() => {
                    writeln!(
                        writer,
                        "├─ {}",
                        path.strip_prefix(root)
                            .unwrap()
                            .display()
                            .to_string()
                            .replace('\\', "/")
                    )?;
                    match fs::read_to_string(path) {
                        Ok(contents) => {
                            for line in contents.lines() {
                                writeln!(writer, "│ {line}")?;
                            }
                        }
                        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                            writeln!(writer, "│ <INVALID UTF8>")?;
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    visualize_directory(dir.as_ref(), dir.as_ref(), &mut writer)
}

pub struct BuildOutput {
    logs: String,
    report: Option<Report>,
    dir: PathBuf,
    _root: TempDir,
}

impl BuildOutput {
    pub fn logs(&self) -> &str {
        &self.logs
    }

    pub fn report(&self) -> &Report {
        self.report.as_ref().expect("conversion should have produced a report")
    }

    /// Reads a file from the vault, relative to its root.
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(self.dir.join(path)).unwrap()
    }
}

impl fmt::Display for BuildOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.logs.is_empty() {
            writeln!(f, "├─ log output")?;
            for line in self.logs.lines() {
                writeln!(f, "│ {line}")?;
            }
        }
        visualize_directory(&self.dir, f).expect("`visualize_directory` should succeed");
        Ok(())
    }
}

mod config;
