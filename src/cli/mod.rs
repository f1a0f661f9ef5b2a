//! The `golden` command-line interface.
//!
//! This module is the entry point for all CLI commands and orchestrates the
//! library: it builds the configuration, picks the compiler and runs the
//! scenario catalog.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::catalog::catalog;
use crate::cli::args::{Command, GoldenArgs, RunArgs};
use crate::compiler::CommandCompiler;
use crate::config::HarnessConfig;
use crate::errors::{GoldenError, Result};
use crate::golden::{GoldenMode, GoldenStore};
use crate::harness::Harness;

pub mod args;
pub mod output;

/// Parse arguments, dispatch, and return the process exit code.
pub fn run(mode: GoldenMode) -> i32 {
    init_tracing();
    let args = GoldenArgs::parse();

    let result = match args.command {
        Command::Run(run) => handle_run(run, mode),
        Command::List => output::print_catalog(&catalog())
            .map(|_| 0)
            .map_err(|e| GoldenError::io("<stdout>", e)),
        Command::Audit { testdata } => handle_audit(&testdata),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            1
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the configuration: file first, then flags, then the mode.
fn resolve_config(run: &RunArgs, mode: GoldenMode) -> Result<HarnessConfig> {
    let mut config = match &run.config {
        Some(path) => HarnessConfig::from_file(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(dir) = &run.testdata {
        config.testdata_dir = dir.clone();
    }
    if let Some(program) = &run.compiler {
        config.compiler.program = Some(program.clone());
    }
    if !run.compiler_args.is_empty() {
        config.compiler.args = run.compiler_args.clone();
    }
    if let Some(ordering) = run.ordering {
        config.ordering = ordering;
    }
    if let Some(policy) = run.header_policy {
        config.header_policy = policy;
    }
    Ok(config.with_mode(mode))
}

fn handle_run(run: RunArgs, mode: GoldenMode) -> Result<i32> {
    let config = resolve_config(&run, mode)?;
    let compiler = CommandCompiler::from_config(&config.compiler)?;
    let harness = Harness::new(config, compiler);
    let results = harness.run_all(&catalog(), run.filter.as_deref());
    let summary = harness.report_results(&results);
    Ok(if summary.failed > 0 { 1 } else { 0 })
}

fn handle_audit(testdata: &std::path::Path) -> Result<i32> {
    let scenarios = catalog();
    let audit = GoldenStore::new(testdata).audit(scenarios.iter().map(|s| s.golden.as_str()));
    output::print_audit(&audit).map_err(|e| GoldenError::io("<stdout>", e))?;
    Ok(if audit.missing.is_empty() { 0 } else { 1 })
}
