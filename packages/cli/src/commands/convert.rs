use super::{emit, read_document, render_document, CliError, Format};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Directory to convert (defaults to srcDir from the config)
    pub path: Option<PathBuf>,

    /// Format to produce; files in the other format are converted
    #[arg(short, long, value_enum)]
    pub target: Format,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Only convert files whose relative path matches this glob
    #[arg(long)]
    pub include: Option<String>,

    /// Print results instead of writing files
    #[arg(long)]
    pub stdout: bool,
}

pub fn convert(args: ConvertArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let src_dir = match &args.path {
        Some(path) => cwd.join(path),
        None => config.src_dir(cwd),
    };
    if !src_dir.is_dir() {
        return Err(CliError::MissingInput(src_dir).into());
    }
    let out_dir = match &args.out_dir {
        Some(out) => cwd.join(out),
        None => config.out_dir(cwd),
    };
    let include = args
        .include
        .as_deref()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| CliError::BadPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .transpose()?;

    let source_format = args.target.other();
    println!(
        "{}",
        format!(
            "Converting {} files to {}...",
            source_format.extension(),
            args.target.extension()
        )
        .bright_blue()
        .bold()
    );

    let files = find_documents(&src_dir, &out_dir, source_format, include.as_ref());
    if files.is_empty() {
        println!("{}", "No documents found".yellow());
        return Ok(());
    }
    println!("Found {} files", files.len());

    let mut success_count = 0;
    let mut error_count = 0;

    for file in &files {
        let relative_path = file.strip_prefix(&src_dir).unwrap_or(file);
        let output_file = out_dir
            .join(relative_path)
            .with_extension(args.target.extension());

        let result = read_document(file, source_format).and_then(|nodes| {
            let content = render_document(&nodes, args.target, config.pretty)?;
            let output = (!args.stdout).then_some(output_file.as_path());
            emit(output, &content)
        });

        match result {
            Ok(()) => {
                success_count += 1;
                if !args.stdout {
                    println!(
                        "  {} {} → {}",
                        "✓".green(),
                        relative_path.display(),
                        output_file.display()
                    );
                }
            }
            Err(e) => {
                error_count += 1;
                tracing::warn!(file = %file.display(), error = %e, "conversion failed");
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Converted {} files", "✓".green(), success_count);
    } else {
        println!(
            "{} Converted {} files, {} errors",
            "!".yellow(),
            success_count,
            error_count
        );
    }

    Ok(())
}

/// Files under `dir` in `format`, skipping anything already inside `out_dir`
fn find_documents(
    dir: &Path,
    out_dir: &Path,
    format: Format,
    include: Option<&Pattern>,
) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.path() != out_dir)
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| Format::of(path) == Some(format))
        .filter(|path| {
            include.map_or(true, |pattern| {
                pattern.matches_path(path.strip_prefix(dir).unwrap_or(path))
            })
        })
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::Node;
    use std::fs;

    fn args(target: Format) -> ConvertArgs {
        ConvertArgs {
            path: Some(PathBuf::from("content")),
            target,
            out_dir: Some(PathBuf::from("out")),
            include: None,
            stdout: false,
        }
    }

    #[test]
    fn test_convert_directory_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(content.join("nested")).unwrap();
        fs::write(content.join("a.html"), "<p>first</p>").unwrap();
        fs::write(content.join("nested/b.htm"), "<ol><li>second</li></ol>").unwrap();
        fs::write(content.join("skip.txt"), "not a document").unwrap();

        convert(args(Format::Json), dir.path()).unwrap();

        let a: Vec<Node> =
            serde_json::from_str(&fs::read_to_string(dir.path().join("out/a.json")).unwrap())
                .unwrap();
        assert_eq!(a, vec![Node::paragraph("first")]);
        assert!(dir.path().join("out/nested/b.json").exists());
        assert!(!dir.path().join("out/skip.json").exists());
    }

    #[test]
    fn test_convert_json_back_to_html() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        fs::create_dir_all(&content).unwrap();
        let json = serde_json::to_string(&vec![Node::paragraph("hello")]).unwrap();
        fs::write(content.join("doc.json"), json).unwrap();

        convert(args(Format::Html), dir.path()).unwrap();

        let html = fs::read_to_string(dir.path().join("out/doc.html")).unwrap();
        assert!(html.starts_with("<p>"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_include_pattern_filters_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.html"), "<p>k</p>").unwrap();
        fs::write(dir.path().join("drop.html"), "<p>d</p>").unwrap();

        let pattern = Pattern::new("keep*").unwrap();
        let out = dir.path().join("out");
        let files = find_documents(dir.path(), &out, Format::Html, Some(&pattern));
        assert_eq!(files, vec![dir.path().join("keep.html")]);
    }

    #[test]
    fn test_bad_include_pattern() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        let mut args = args(Format::Html);
        args.include = Some("[".to_string());

        let err = convert(args, dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::BadPattern { .. })
        ));
    }
}
