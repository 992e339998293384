//! CLI argument definitions using clap
//!
//! Commands:
//! - vidquery translate --config <path>
//! - vidquery explain --config <path>
//! - vidquery serve --config <path> [--port <port>]
//! - vidquery load --config <path> --input <dump.json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// vidquery - answers Russian analytics questions about videos with SQL
#[derive(Parser, Debug)]
#[command(name = "vidquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate questions read from stdin, one per line, into JSON plans
    Translate {
        /// Path to configuration file
        #[arg(long, default_value = "./vidquery.json")]
        config: PathBuf,
    },

    /// Explain how each question on stdin is translated
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./vidquery.json")]
        config: PathBuf,
    },

    /// Start the HTTP front-end
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./vidquery.json")]
        config: PathBuf,

        /// Overrides the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Turn a JSON dump into upsert batches, one JSON line per batch
    Load {
        /// Path to configuration file
        #[arg(long, default_value = "./vidquery.json")]
        config: PathBuf,

        /// Dump file with a top-level "videos" array
        #[arg(long)]
        input: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load() {
        let cli = Cli::try_parse_from(["vidquery", "load", "--input", "dump.json"]).unwrap();
        match cli.command {
            Command::Load { config, input } => {
                assert_eq!(config, PathBuf::from("./vidquery.json"));
                assert_eq!(input, PathBuf::from("dump.json"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["vidquery", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(9000), .. }));
    }

    #[test]
    fn test_load_requires_input() {
        assert!(Cli::try_parse_from(["vidquery", "load"]).is_err());
    }
}
