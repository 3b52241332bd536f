//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page through collection endpoints of a Pipedrive-style API
#[derive(Parser, Debug)]
#[command(name = "pipedrive-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// API token, overrides the config file and PIPEDRIVE_API_TOKEN
    #[arg(long, global = true)]
    pub api_token: Option<String>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    pub log_level: LogLevel,

    /// Verbose output (same as --log-level debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level after applying `--verbose`
    pub fn effective_log_level(&self) -> LogLevel {
        let quieter_than_debug = matches!(
            self.log_level,
            LogLevel::Info | LogLevel::Warn | LogLevel::Error
        );
        if self.verbose && quieter_than_debug {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every item of a collection, one page at a time
    List {
        /// Collection target relative to the base URL (e.g. "deals")
        origin: String,

        /// Items per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Offset of the first page
        #[arg(long)]
        start: Option<u64>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Validate the configuration
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON item per line
    Json,
    /// Indented JSON
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::parse_from([
            "pipedrive-pager",
            "--base-url",
            "https://api.example.com/v1",
            "list",
            "deals",
            "--page-size",
            "50",
            "--max-pages",
            "2",
        ]);

        assert_eq!(cli.base_url.as_deref(), Some("https://api.example.com/v1"));
        match cli.command {
            Commands::List {
                origin,
                page_size,
                start,
                max_pages,
                format,
            } => {
                assert_eq!(origin, "deals");
                assert_eq!(page_size, Some(50));
                assert_eq!(start, None);
                assert_eq!(max_pages, Some(2));
                assert_eq!(format, OutputFormat::Json);
            }
            Commands::Validate => panic!("Expected List"),
        }
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let cli = Cli::parse_from(["pipedrive-pager", "-v", "validate"]);
        assert_eq!(cli.effective_log_level(), LogLevel::Debug);

        let cli = Cli::parse_from(["pipedrive-pager", "--log-level", "trace", "-v", "validate"]);
        assert_eq!(cli.effective_log_level(), LogLevel::Trace);
    }
}
