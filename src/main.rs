use std::{path::PathBuf, process};

use clap::Parser;
use vault_to_epub::{Config, Converter};

/// Converts Obsidian notes into EPUB3 XHTML content documents.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// A Markdown note, or a vault directory to convert recursively
    input: PathBuf,

    /// Directory to write the .xhtml files into, created if missing
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(output_dir) = args.output_dir {
        config.output_dir = Some(output_dir);
    }

    let report = Converter::new(config).convert(&args.input)?;
    if !report.is_success() {
        anyhow::bail!(
            "{} of {} notes failed to convert",
            report.failed.len(),
            report.len()
        );
    }
    Ok(())
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("VAULT_TO_EPUB_LOG", "info"))
        .format_timestamp(None)
        // The target is only useful when overriding the level
        .format_target(std::env::var_os("VAULT_TO_EPUB_LOG").is_some())
        .init();
}
