//! CLI module for vidquery
//!
//! Provides command-line interface for:
//! - translate: questions on stdin to JSON plans on stdout
//! - explain: human-readable translation trace
//! - serve: HTTP front-end
//! - load: dataset dump to upsert batches

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    explain, explain_lines, load, load_to, run, run_command, serve, translate, translate_lines,
    Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_questions, write_error, write_response, write_text};
