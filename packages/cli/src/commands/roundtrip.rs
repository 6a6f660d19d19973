use super::CliError;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use scribe_editor::EditorSession;
use scribe_model::Node;
use scribe_parser::deserialize_html;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct RoundtripArgs {
    /// HTML document to check
    pub input: PathBuf,

    /// Print the canonical html the editor would save
    #[arg(long)]
    pub show: bool,
}

/// Load html into an editor session, save it again and check that reading the
/// saved html gives back the same document
pub fn roundtrip(args: RoundtripArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let path = cwd.join(&args.input);
    if !path.exists() {
        return Err(CliError::MissingInput(path).into());
    }
    let source = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;

    let session = EditorSession::with_html(config.editor, &source)?;
    let saved = session.html();
    let reparsed = deserialize_html(&saved)?;
    let loaded = session.editor().children();

    if args.show {
        println!("{}", saved);
    }

    if let Some(block) = first_difference(loaded, &reparsed) {
        eprintln!("  {} {}", "✗".red(), args.input.display());
        return Err(CliError::Unstable { path: args.input, block }.into());
    }

    println!(
        "  {} {} ({} blocks, {} → {} bytes)",
        "✓".green(),
        args.input.display(),
        loaded.len(),
        source.len(),
        saved.len()
    );
    Ok(())
}

/// Index of the first block that differs, if any
fn first_difference(left: &[Node], right: &[Node]) -> Option<usize> {
    let common = left.len().min(right.len());
    (0..common)
        .find(|&index| left[index] != right[index])
        .or_else(|| (left.len() != right.len()).then_some(common))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        let a = vec![Node::paragraph("a"), Node::paragraph("b")];
        let b = vec![Node::paragraph("a"), Node::paragraph("c")];
        assert_eq!(first_difference(&a, &a), None);
        assert_eq!(first_difference(&a, &b), Some(1));
        assert_eq!(first_difference(&a, &a[..1]), Some(1));
    }

    #[test]
    fn test_roundtrip_of_editor_html_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("doc.html"),
            "<ul><li>one</li></ul><p>Go <a href=\"https://x.com\">there</a></p>",
        )
        .unwrap();

        let args = RoundtripArgs {
            input: PathBuf::from("doc.html"),
            show: false,
        };
        roundtrip(args, dir.path()).unwrap();
    }
}
