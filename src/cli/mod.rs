//! CLI argument parsing for render-shim.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "render-shim.yaml";

/// render-shim: run the configured PDF or image renderer as a subprocess.
///
/// Each document type (`pdf`, `image`) has its own binary, timeout, options,
/// and environment overlay in the configuration file.
#[derive(Parser, Debug)]
#[command(name = "render-shim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the renderer configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for render-shim.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a document with the configured binary.
    ///
    /// Reads input from a file or stdin and writes the binary's output to a
    /// file or stdout.
    Render(RenderArgs),

    /// Check that every enabled renderer's binary can be executed.
    ///
    /// Exits non-zero if any enabled renderer is unusable.
    Check,

    /// Print the resolved configuration as YAML.
    Config(ConfigArgs),
}

/// Arguments for the `render` command.
#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// Document type to render (pdf or image).
    pub doc_type: String,

    /// Input file, or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Output file, or `-` for stdout.
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Extra option for the binary, as FLAG or FLAG=VALUE. Repeatable;
    /// appended after the configured options.
    #[arg(
        short = 'O',
        long = "option",
        value_name = "FLAG[=VALUE]",
        allow_hyphen_values = true
    )]
    pub options: Vec<String>,

    /// Replace the output file if it already exists.
    #[arg(long)]
    pub overwrite: bool,
}

/// Arguments for the `config` command.
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Only print the section for this document type.
    #[arg(long)]
    pub doc_type: Option<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_render_minimal() {
        let cli = Cli::try_parse_from(["render-shim", "render", "pdf"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        if let Command::Render(args) = cli.command {
            assert_eq!(args.doc_type, "pdf");
            assert_eq!(args.input, "-");
            assert_eq!(args.output, "-");
            assert!(args.options.is_empty());
            assert!(!args.overwrite);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_render_full() {
        let cli = Cli::try_parse_from([
            "render-shim",
            "render",
            "image",
            "--input",
            "page.html",
            "--output",
            "page.jpg",
            "-O",
            "--quality=80",
            "--option",
            "--quiet",
            "--overwrite",
            "--config",
            "/etc/render-shim.yaml",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/render-shim.yaml"));
        if let Command::Render(args) = cli.command {
            assert_eq!(args.doc_type, "image");
            assert_eq!(args.input, "page.html");
            assert_eq!(args.output, "page.jpg");
            assert_eq!(args.options, vec!["--quality=80", "--quiet"]);
            assert!(args.overwrite);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_check_with_verbosity() {
        let cli = Cli::try_parse_from(["render-shim", "-vv", "check"]).unwrap();
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parse_config_with_doc_type() {
        let cli = Cli::try_parse_from(["render-shim", "config", "--doc-type", "pdf"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert_eq!(args.doc_type.as_deref(), Some("pdf"));
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn render_requires_doc_type() {
        assert!(Cli::try_parse_from(["render-shim", "render"]).is_err());
    }
}
