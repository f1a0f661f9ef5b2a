//! Flags for `golden run`, `golden list` and `golden audit`.
//!
//! Whether `run` records or verifies is not a flag: it comes from
//! `GENERATE_GOLDEN_YAML`, read once by the binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::compare::OrderingMode;
use crate::golden::HeaderPolicy;

/// Top level of the `golden` command line.
#[derive(Debug, Parser)]
#[command(
    name = "golden",
    version,
    about = "Verify compiled workflow documents against recorded golden files.",
    after_help = "Set GENERATE_GOLDEN_YAML=True to regenerate the golden files instead of verifying them."
)]
pub struct GoldenArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// What `golden` should do with the scenario catalog.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compile every scenario and verify (or record) its golden file.
    Run(RunArgs),
    /// List the scenario catalog.
    List,
    /// Report golden files with no scenario, and scenarios with no golden file.
    Audit {
        /// Directory holding the golden files.
        #[arg(long, default_value = "testdata")]
        testdata: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// YAML configuration file; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Directory holding the golden files.
    #[arg(long)]
    pub testdata: Option<PathBuf>,
    /// Compiler executable.
    #[arg(long)]
    pub compiler: Option<PathBuf>,
    /// Extra argument passed to the compiler before the subcommand.
    #[arg(long = "compiler-arg", allow_hyphen_values = true)]
    pub compiler_args: Vec<String>,
    /// Whether the compiler's container ordering can be trusted.
    #[arg(long, value_enum)]
    pub ordering: Option<OrderingMode>,
    /// What to do with golden files missing the license header.
    #[arg(long, value_enum)]
    pub header_policy: Option<HeaderPolicy>,
    /// Run only scenarios whose id contains this substring.
    #[arg(short, long)]
    pub filter: Option<String>,
}
