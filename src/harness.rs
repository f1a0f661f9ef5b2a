//! Golden-master scenario driver.
//!
//! Each scenario moves through a fixed sequence of phases:
//! 1. **Compile**: run the compiler into a fresh scratch directory
//! 2. **Normalize**: apply the scenario's text normalizer, if any
//! 3. **Parse**: load the compiled text into a structural value
//! 4. **Record** or **Verify**: overwrite the golden, or load it and compare
//!
//! Any failure is terminal for that scenario. The scratch directory is removed
//! on every exit path.
//!
//! # Example
//!
//! ```rust,no_run
//! use pipeline_golden::catalog::catalog;
//! use pipeline_golden::compiler::CommandCompiler;
//! use pipeline_golden::config::HarnessConfig;
//! use pipeline_golden::golden::GoldenMode;
//! use pipeline_golden::harness::Harness;
//!
//! let config = HarnessConfig::default().with_mode(GoldenMode::from_env());
//! let harness = Harness::new(config, CommandCompiler::new("dsl-compile"));
//! let results = harness.run_all(&catalog(), None);
//! if harness.report_results(&results).failed > 0 {
//!     std::process::exit(1);
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tempfile::TempDir;

use crate::compare::{strategy_for, verify, EqualityStrategy};
use crate::compiler::Compiler;
use crate::config::HarnessConfig;
use crate::document::load_document;
use crate::errors::{GoldenError, Result};
use crate::golden::{GoldenMode, GoldenStore, RecordOutcome};
use crate::normalize::normalize;
use crate::scenario::{Scenario, ScenarioKind};

// =============================================================================
// CORE TYPES
// =============================================================================

/// What a successful scenario run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Verified,
    Recorded(RecordOutcome),
}

/// Result of one scenario in a batch run.
#[derive(Debug)]
pub enum ScenarioResult {
    Pass {
        id: String,
        golden: String,
    },
    Recorded {
        id: String,
        golden: String,
        changed: bool,
    },
    Fail {
        id: String,
        golden: String,
        error: GoldenError,
    },
    Skipped {
        id: String,
        reason: String,
    },
}

/// Counts per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub recorded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.recorded + self.failed + self.skipped
    }
}

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

pub struct Harness<C: Compiler> {
    config: HarnessConfig,
    store: GoldenStore,
    compiler: C,
    strategy: Box<dyn EqualityStrategy>,
}

impl<C: Compiler> Harness<C> {
    pub fn new(config: HarnessConfig, compiler: C) -> Self {
        if config.mode.is_record() {
            tracing::warn!(
                testdata = %config.testdata_dir.display(),
                "record mode: golden files will be regenerated instead of verified"
            );
        }
        let store =
            GoldenStore::new(&config.testdata_dir).with_header_policy(config.header_policy);
        let strategy = strategy_for(config.ordering);
        Self {
            config,
            store,
            compiler,
            strategy,
        }
    }

    /// Replace the equality strategy chosen from the configured ordering.
    pub fn with_strategy(mut self, strategy: Box<dyn EqualityStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn store(&self) -> &GoldenStore {
        &self.store
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.config.use_colors {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }

    // =========================================================================
    // SCENARIO EXECUTION
    // =========================================================================

    /// Run one scenario to completion.
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<Outcome> {
        let scratch = scratch_dir()?;
        tracing::debug!(scenario = %scenario.id, scratch = %scratch.path().display(), "compiling");
        let compiled = self.compile_phase(scenario, scratch.path())?;
        let golden_path = self.store.resolve(&scenario.golden);
        match self.config.mode {
            GoldenMode::Record => {
                let outcome = self.store.record(&golden_path, &compiled)?;
                Ok(Outcome::Recorded(outcome))
            }
            GoldenMode::Verify => {
                let golden = self.store.load(&golden_path)?;
                verify(
                    &file_name(&golden_path),
                    golden,
                    compiled,
                    self.strategy.as_ref(),
                )?;
                Ok(Outcome::Verified)
            }
        }
    }

    /// Produce the compiled structural value of a scenario inside `scratch`.
    fn compile_phase(&self, scenario: &Scenario, scratch: &Path) -> Result<Value> {
        match &scenario.kind {
            ScenarioKind::Pipeline(definition) => {
                let output = scratch.join("workflow.yaml");
                self.compiler
                    .compile(definition, &output, &scenario.options)?;
                self.parse_phase(&output, scenario)
            }
            ScenarioKind::Nested(definitions) => {
                let Some(last) = definitions.len().checked_sub(1) else {
                    return Err(GoldenError::Config {
                        message: format!("scenario '{}' lists no definitions", scenario.id),
                    });
                };
                for (index, definition) in definitions.iter().enumerate() {
                    let output = nested_output(scratch, index);
                    self.compiler
                        .compile(definition, &output, &scenario.options)?;
                }
                self.parse_phase(&nested_output(scratch, last), scenario)
            }
            ScenarioKind::NoDecorator(request) => {
                if let Some(normalizer) = &scenario.normalizer {
                    return Err(GoldenError::Config {
                        message: format!(
                            "scenario '{}' sets normalizer '{}' but its workflow is never rendered to text",
                            scenario.id,
                            normalizer.label()
                        ),
                    });
                }
                self.compiler.create_workflow(request)
            }
        }
    }

    /// Read compiled text, normalize it, then parse it.
    fn parse_phase(&self, output: &Path, scenario: &Scenario) -> Result<Value> {
        let raw = fs::read_to_string(output).map_err(|e| GoldenError::io(output, e))?;
        let text = normalize(raw, scenario.normalizer.as_ref());
        load_document(&text, &output.display().to_string())
    }

    /// Run every scenario whose id contains `filter`; the rest are skipped.
    pub fn run_all(&self, scenarios: &[Scenario], filter: Option<&str>) -> Vec<ScenarioResult> {
        let filter = filter.map(str::to_lowercase);
        scenarios
            .iter()
            .map(|scenario| {
                if let Some(f) = filter.as_deref() {
                    if !scenario.id.to_lowercase().contains(f) {
                        return ScenarioResult::Skipped {
                            id: scenario.id.clone(),
                            reason: format!("Filtered out by substring: {}", f),
                        };
                    }
                }
                let id = scenario.id.clone();
                let golden = scenario.golden.clone();
                match self.run_scenario(scenario) {
                    Ok(Outcome::Verified) => ScenarioResult::Pass { id, golden },
                    Ok(Outcome::Recorded(outcome)) => ScenarioResult::Recorded {
                        id,
                        golden,
                        changed: outcome.changed,
                    },
                    Err(error) => ScenarioResult::Fail { id, golden, error },
                }
            })
            .collect()
    }

    // =========================================================================
    // REPORTING
    // =========================================================================

    /// Print one line per scenario plus a summary, and return the counts.
    pub fn report_results(&self, results: &[ScenarioResult]) -> Summary {
        for r in results {
            match r {
                ScenarioResult::Pass { id, golden } => {
                    println!("{}: {} [{}]", self.colorize("PASS", GREEN), id, golden)
                }
                ScenarioResult::Recorded {
                    id,
                    golden,
                    changed,
                } => {
                    let note = if *changed { "updated" } else { "unchanged" };
                    println!("{}: {} [{}] ({})", self.colorize("REC", CYAN), id, golden, note)
                }
                ScenarioResult::Fail { .. } => self.print_failure(r),
                ScenarioResult::Skipped { id, reason } => {
                    println!("{}: {} ({})", self.colorize("SKIP", YELLOW), id, reason)
                }
            }
        }

        let summary = partition_results(results);
        println!(
            "\nGolden summary: total {}, {} {}, {} {}, {} {}, {} {}",
            summary.total(),
            self.colorize("passed", GREEN),
            summary.passed,
            self.colorize("recorded", CYAN),
            summary.recorded,
            self.colorize("failed", RED),
            summary.failed,
            self.colorize("skipped", YELLOW),
            summary.skipped,
        );

        if summary.failed > 0 {
            eprintln!("\nFailed scenarios:");
            for r in results {
                if let ScenarioResult::Fail { id, error, .. } = r {
                    eprintln!("  - {} ({})", id, error.kind());
                }
            }
        }
        summary
    }

    fn print_failure(&self, r: &ScenarioResult) {
        if let ScenarioResult::Fail { id, golden, error } = r {
            eprintln!("{}: {} [{}]", self.colorize("FAIL", RED), id, golden);
            eprintln!("  Error: {}", error);
        }
    }
}

/// Count results by outcome.
pub fn partition_results(results: &[ScenarioResult]) -> Summary {
    results.iter().fold(Summary::default(), |mut acc, r| {
        match r {
            ScenarioResult::Pass { .. } => acc.passed += 1,
            ScenarioResult::Recorded { .. } => acc.recorded += 1,
            ScenarioResult::Fail { .. } => acc.failed += 1,
            ScenarioResult::Skipped { .. } => acc.skipped += 1,
        }
        acc
    })
}

fn scratch_dir() -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix("golden-")
        .tempdir()
        .map_err(|e| GoldenError::io(std::env::temp_dir(), e))
}

fn nested_output(scratch: &Path, index: usize) -> PathBuf {
    scratch.join(format!("nested{}.yaml", index))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_every_outcome() {
        let results = vec![
            ScenarioResult::Pass {
                id: "a".into(),
                golden: "a.yaml".into(),
            },
            ScenarioResult::Recorded {
                id: "b".into(),
                golden: "b.yaml".into(),
                changed: true,
            },
            ScenarioResult::Fail {
                id: "c".into(),
                golden: "c.yaml".into(),
                error: GoldenError::GoldenNotFound {
                    path: PathBuf::from("c.yaml"),
                },
            },
            ScenarioResult::Skipped {
                id: "d".into(),
                reason: "filtered".into(),
            },
        ];
        let summary = partition_results(&results);
        assert_eq!(
            summary,
            Summary {
                passed: 1,
                recorded: 1,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn nested_outputs_are_indexed() {
        let scratch = Path::new("/tmp/golden-x");
        assert_eq!(nested_output(scratch, 2), scratch.join("nested2.yaml"));
    }

    #[test]
    fn mismatch_names_only_the_basename() {
        assert_eq!(file_name(Path::new("sdk/testdata/loop_static.yaml")), "loop_static.yaml");
    }
}
