use super::{emit, read_document, render_document, Format};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ToHtmlArgs {
    /// JSON document (a list of block nodes)
    pub input: PathBuf,

    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Put each block on its own line
    #[arg(long)]
    pub pretty: bool,
}

pub fn to_html(args: ToHtmlArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let nodes = read_document(&cwd.join(&args.input), Format::Json)?;
    let html = render_document(&nodes, Format::Html, args.pretty || config.pretty)?;
    tracing::info!(blocks = nodes.len(), bytes = html.len(), "serialized");
    emit(args.output.map(|out| cwd.join(out)).as_deref(), &html)
}
