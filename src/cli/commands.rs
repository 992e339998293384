//! CLI command implementations
//!
//! Every command loads the configuration first and fails before doing any
//! work if it is invalid. Commands that read questions take one per line
//! from stdin and answer on stdout.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::dataset::{self, LoaderConfig};
use crate::http_server::{AppState, HttpServer, HttpServerConfig};
use crate::observability::{
    observe_translation, Logger, MetricsRegistry, ObservationScope, Severity,
};
use crate::responder::DEFAULT_SENTINEL;
use crate::translator::Translator;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_questions, write_error, write_response, write_text};

/// Configuration file structure; every field is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Enables the top-creator and top-video ranking rules
    #[serde(default)]
    pub legacy_ranking: bool,

    /// Reply used when a question cannot be answered
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Lowest severity written to the log (default "INFO")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub http: HttpServerConfig,

    #[serde(default)]
    pub loader: LoaderConfig,
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

fn default_log_level() -> String {
    Severity::Info.as_str().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            legacy_ranking: false,
            sentinel: default_sentinel(),
            log_level: default_log_level(),
            http: HttpServerConfig::default(),
            loader: LoaderConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load(path: &Path) -> CliResult<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.sentinel.is_empty() {
            return Err(CliError::config_error("sentinel must not be empty"));
        }

        self.severity()?;

        self.loader
            .validate()
            .map_err(|e| CliError::config_error(format!("Loader config error: {}", e)))?;

        Ok(())
    }

    pub fn severity(&self) -> CliResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            CliError::config_error(format!("Invalid log_level: '{}'", self.log_level))
        })
    }

    pub fn translator(&self) -> Translator {
        Translator::new().with_legacy_ranking(self.legacy_ranking)
    }
}

/// Main entry point: parse arguments and dispatch
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Translate { config } => translate(&config),
        Command::Explain { config } => explain(&config),
        Command::Serve { config, port } => serve(&config, port),
        Command::Load { config, input } => load(&config, &input),
    }
}

fn boot(config_path: &Path) -> CliResult<Config> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity()?);
    Ok(config)
}

/// Translate every question on stdin
pub fn translate(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let metrics = MetricsRegistry::new();

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    translate_lines(&config, &metrics, stdin.lock(), &mut stdout)
}

/// Writes one response line per question
pub fn translate_lines<R: BufRead, W: Write>(
    config: &Config,
    metrics: &MetricsRegistry,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let translator = config.translator();

    for question in read_questions(input) {
        let question = match question {
            Ok(question) => question,
            Err(e) => {
                write_error(output, e.code_str(), e.message())?;
                return Err(e);
            }
        };

        let request_id = Uuid::new_v4().to_string();
        let translation = translator.translate_detailed(question.as_str());
        observe_translation(metrics, &request_id, &translation);

        write_response(
            output,
            &json!({
                "request_id": request_id,
                "text": question,
                "matched": translation.plan.is_some(),
                "plan": translation.plan,
            }),
        )?;
    }

    Ok(())
}

/// Explain every question on stdin
pub fn explain(config_path: &Path) -> CliResult<()> {
    let config = boot(config_path)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    explain_lines(&config, stdin.lock(), &mut stdout)
}

pub fn explain_lines<R: BufRead, W: Write>(
    config: &Config,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let translator = config.translator();
    for question in read_questions(input) {
        let question = question?;
        let rendered = translator.explain(question.as_str()).to_string();
        write_text(output, &rendered)?;
        writeln!(output)?;
    }
    Ok(())
}

/// Start the HTTP front-end and block until it stops
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let config = boot(config_path)?;

    let mut http = config.http.clone();
    if let Some(port) = port {
        http.port = port;
    }

    let state = AppState::new(config.translator(), Arc::new(MetricsRegistry::new()))
        .with_sentinel(config.sentinel.clone());
    let server = HttpServer::new(http, state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}

/// Batch a dataset dump and write the batches to stdout
pub fn load(config_path: &Path, input: &Path) -> CliResult<()> {
    let config = boot(config_path)?;
    let mut stdout = io::stdout().lock();
    load_to(&config, input, &mut stdout)
}

/// Writes one JSON line per upsert batch, then a summary line
pub fn load_to<W: Write>(config: &Config, input: &Path, output: &mut W) -> CliResult<()> {
    let input_name = input.display().to_string();
    let scope = ObservationScope::with_fields("DATASET_LOAD", &[("input", input_name.as_str())]);

    let outcome = match dataset::load_file(input, &config.loader) {
        Ok(outcome) => outcome,
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(e.into());
        }
    };

    for batch in &outcome.batches {
        serde_json::to_writer(&mut *output, batch)?;
        writeln!(output)?;
    }

    let videos = outcome.videos.to_string();
    let snapshots = outcome.snapshots.to_string();
    let batches = outcome.batches.len().to_string();
    scope.complete_with_fields(&[
        ("batches", batches.as_str()),
        ("snapshots", snapshots.as_str()),
        ("videos", videos.as_str()),
    ]);

    write_response(
        output,
        &json!({
            "videos": outcome.videos,
            "snapshots": outcome.snapshots,
            "batches": outcome.batches.len(),
        }),
    )
}
