use std::{fs, path::Path};

use indoc::indoc;
use tempfile::TempDir;

use super::Vault;
use crate::{Config, MarkdownConfig};

#[test]
fn load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vault-to-epub.toml");
    fs::write(
        &path,
        indoc! {r#"
            output-dir = "epub/text"

            [markdown]
            tables = true
            smart-punctuation = true
        "#},
    )
    .unwrap();
    let config = Config::load(&path).unwrap();
    assert_eq!(config.output_dir.as_deref(), Some(Path::new("epub/text")));
    assert!(config.markdown.tables);
    assert!(config.markdown.smart_punctuation);
    assert!(!config.markdown.strikethrough);
}

#[test]
fn empty_config_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert!(config.output_dir.is_none());
    assert!(!config.markdown.tables);
}

#[test]
fn load_errors() {
    let dir = TempDir::new().unwrap();
    let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(format!("{missing:#}").starts_with("Unable to read config file"));

    let path = dir.path().join("bad.toml");
    fs::write(&path, "[markdown]\ntables = \"yes\"\n").unwrap();
    let invalid = Config::load(&path).unwrap_err();
    assert!(format!("{invalid:#}").starts_with("Unable to parse config file"));
}

#[test]
fn strikethrough() {
    let diff = |source: &str, markdown: MarkdownConfig| {
        let without = Vault::init().note("chapter.md", source).build();
        let with = Vault::init()
            .config(Config {
                markdown,
                ..Default::default()
            })
            .note("chapter.md", source)
            .build();
        similar::TextDiff::from_lines(&without.to_string(), &with.to_string())
            .unified_diff()
            .to_string()
    };
    let strikethrough = diff(
        "~~gone~~ text\n",
        MarkdownConfig {
            strikethrough: true,
            ..Default::default()
        },
    );
    insta::assert_snapshot!(strikethrough, @r"
    @@ -10,7 +10,7 @@
     │ </head>
     │ <body>
     │   <h1>chapter</h1>
    -│ <p>~~gone~~ text</p>
    +│ <p><del>gone</del> text</p>
     │ 
     │ </body>
     │ </html>
    ");
}
