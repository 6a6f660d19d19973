pub mod convert;
pub mod roundtrip;
pub mod to_html;
pub mod to_json;

pub use convert::{convert, ConvertArgs};
pub use roundtrip::{roundtrip, RoundtripArgs};
pub use to_html::{to_html, ToHtmlArgs};
pub use to_json::{to_json, ToJsonArgs};

use anyhow::{Context, Result};
use clap::ValueEnum;
use scribe_compiler_html::{serialize_nodes_with, SerializeOptions};
use scribe_model::Node;
use scribe_parser::{deserialize_html, into_document};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Input path does not exist: {0}")]
    MissingInput(PathBuf),

    #[error("Invalid include pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("{path} does not round-trip: block {block} differs after reparsing")]
    Unstable { path: PathBuf, block: usize },
}

/// Document file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Html,
    Json,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Json => "json",
        }
    }

    /// The format a file is read as, by extension
    pub fn of(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Format::Html),
            "json" => Some(Format::Json),
            _ => None,
        }
    }

    pub fn other(self) -> Format {
        match self {
            Format::Html => Format::Json,
            Format::Json => Format::Html,
        }
    }
}

pub fn read_document(path: &Path, format: Format) -> Result<Vec<Node>> {
    if !path.exists() {
        return Err(CliError::MissingInput(path.to_path_buf()).into());
    }
    let source =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match format {
        Format::Html => Ok(deserialize_html(&source)?),
        Format::Json => {
            let nodes: Vec<Node> = serde_json::from_str(&source)
                .with_context(|| format!("{} is not a document node list", path.display()))?;
            Ok(into_document(nodes))
        }
    }
}

pub fn render_document(nodes: &[Node], format: Format, pretty: bool) -> Result<String> {
    match format {
        Format::Html => {
            let options = if pretty {
                SerializeOptions::pretty()
            } else {
                SerializeOptions::default()
            };
            Ok(serialize_nodes_with(nodes, &options))
        }
        Format::Json if pretty => Ok(serde_json::to_string_pretty(nodes)?),
        Format::Json => Ok(serde_json::to_string(nodes)?),
    }
}

/// Write to `output`, or print when there is none
pub fn emit(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::ElementType;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::of(Path::new("a/b.HTM")), Some(Format::Html));
        assert_eq!(Format::of(Path::new("doc.json")), Some(Format::Json));
        assert_eq!(Format::of(Path::new("notes.md")), None);
        assert_eq!(Format::of(Path::new("README")), None);
        assert_eq!(Format::Html.other(), Format::Json);
    }

    #[test]
    fn test_json_input_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, r#"[{ "text": "loose" }]"#).unwrap();

        let nodes = read_document(&path, Format::Json).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_kind(ElementType::Paragraph));
        assert_eq!(nodes[0].string(), "loose");
    }

    #[test]
    fn test_missing_input() {
        let err = read_document(Path::new("/nonexistent/doc.html"), Format::Html).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingInput(_))
        ));
    }

    #[test]
    fn test_render_html_and_json() {
        let nodes = vec![Node::paragraph("hi")];
        let html = render_document(&nodes, Format::Html, false).unwrap();
        assert!(html.starts_with("<p>"));

        let json = render_document(&nodes, Format::Json, false).unwrap();
        let back: Vec<Node> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, nodes);
    }
}
