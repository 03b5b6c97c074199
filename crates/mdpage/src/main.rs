//! mdpage CLI - Markdown to styled HTML page converter.
//!
//! Provides commands for:
//! - `convert`: Convert a markdown file into a self-contained HTML page

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ConvertArgs;
use output::Output;

/// mdpage - Markdown to styled HTML page converter.
#[derive(Parser)]
#[command(name = "mdpage", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown into a self-contained HTML page.
    Convert(ConvertArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Convert(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Convert(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert_command() {
        let cli = Cli::try_parse_from([
            "mdpage",
            "convert",
            "README.md",
            "-o",
            "out/readme.html",
            "--title",
            "Readme",
            "--no-toc",
            "-v",
        ])
        .unwrap();
        let Commands::Convert(args) = cli.command;
        assert!(args.verbose);
    }

    #[test]
    fn test_parse_convert_without_input() {
        assert!(Cli::try_parse_from(["mdpage", "convert"]).is_ok());
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["mdpage", "serve"]).is_err());
    }
}
