mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    convert, roundtrip, to_html, to_json, ConvertArgs, RoundtripArgs, ToHtmlArgs, ToJsonArgs,
};
use tracing_subscriber::EnvFilter;

/// Scribe CLI - convert rich-text documents between html and json
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `scribe_editor=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serialize a JSON document to html
    ToHtml(ToHtmlArgs),

    /// Deserialize html into a JSON document
    ToJson(ToJsonArgs),

    /// Check that html survives a load and save through the editor
    Roundtrip(RoundtripArgs),

    /// Convert every document in a directory
    Convert(ConvertArgs),
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::ToHtml(args) => to_html(args, &cwd),
            Command::ToJson(args) => to_json(args, &cwd),
            Command::Roundtrip(args) => roundtrip(args, &cwd),
            Command::Convert(args) => convert(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        for cause in err.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::Format;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = Cli::parse_from(["scribe", "convert", "docs", "--target", "json", "-o", "out"]);
        match cli.command {
            Command::Convert(args) => {
                assert_eq!(args.target, Format::Json);
                assert_eq!(args.path.as_deref(), Some(std::path::Path::new("docs")));
                assert_eq!(args.out_dir.as_deref(), Some(std::path::Path::new("out")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
