use super::{emit, read_document, render_document, Format};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ToJsonArgs {
    /// HTML document or fragment
    pub input: PathBuf,

    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Indent the JSON
    #[arg(long)]
    pub pretty: bool,
}

pub fn to_json(args: ToJsonArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let nodes = read_document(&cwd.join(&args.input), Format::Html)?;
    let json = render_document(&nodes, Format::Json, args.pretty || config.pretty)?;
    tracing::info!(blocks = nodes.len(), "deserialized");
    emit(args.output.map(|out| cwd.join(out)).as_deref(), &json)
}
