//! The compiler seam.
//!
//! The pipeline compiler itself is an external collaborator. The harness only
//! needs two entry points from it, captured by the [`Compiler`] trait.
//! [`CommandCompiler`] drives an external executable; tests plug in their own
//! in-process implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Deserialize;
use serde_yaml::Value;

use crate::document::load_document;
use crate::errors::{GoldenError, Result};

/// Named compile options. Unset options are not forwarded, so the compiler's
/// own defaults apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub enable_artifacts: Option<bool>,
    pub enable_s3_logs: Option<bool>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(mut self, enabled: bool) -> Self {
        self.enable_artifacts = Some(enabled);
        self
    }

    pub fn s3_logs(mut self, enabled: bool) -> Self {
        self.enable_s3_logs = Some(enabled);
        self
    }

    /// Artifact passing, on unless disabled.
    pub fn artifacts_enabled(&self) -> bool {
        self.enable_artifacts.unwrap_or(true)
    }

    /// Log archival, off unless enabled.
    pub fn s3_logs_enabled(&self) -> bool {
        self.enable_s3_logs.unwrap_or(false)
    }
}

/// Reference to a pipeline definition, e.g. `testdata.condition:flipcoin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineRef(String);

impl PipelineRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipelineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PipelineRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A pipeline parameter for decorator-free workflow construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineParam {
    pub name: String,
    pub default: Option<String>,
}

impl PipelineParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Arguments of the alternate, decorator-free entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowRequest {
    pub function: PipelineRef,
    pub name: Option<String>,
    pub description: Option<String>,
    pub params: Option<Vec<PipelineParam>>,
    pub extra_config: BTreeMap<String, String>,
}

impl WorkflowRequest {
    pub fn new(function: impl Into<PipelineRef>) -> Self {
        Self {
            function: function.into(),
            name: None,
            description: None,
            params: None,
            extra_config: BTreeMap::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn params(mut self, params: Vec<PipelineParam>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_config.insert(key.into(), value.into());
        self
    }
}

/// The two entry points the harness needs from a pipeline compiler.
pub trait Compiler {
    /// Compile `definition` and write the serialized workflow to `output`.
    fn compile(&self, definition: &PipelineRef, output: &Path, options: &CompileOptions)
        -> Result<()>;

    /// Build a workflow directly from a function reference.
    fn create_workflow(&self, request: &WorkflowRequest) -> Result<Value>;
}

/// How to launch an external compiler executable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub program: Option<PathBuf>,
    pub args: Vec<String>,
}

/// Drives a compiler executable.
///
/// ```text
/// <program> <args..> compile <definition> --output <path> [--enable-artifacts=<bool>] [--enable-s3-logs=<bool>]
/// <program> <args..> create-workflow <function> [--name N] [--description D] [--param name[=default]].. [--conf k=v]..
/// ```
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }

    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let program = config.program.clone().ok_or_else(|| GoldenError::Config {
            message: "no compiler program configured".to_string(),
        })?;
        Ok(Self::new(program).with_args(config.args.iter().cloned()))
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    fn run(&self, mut cmd: Command, definition: &PipelineRef) -> Result<Output> {
        tracing::debug!(?cmd, "invoking compiler");
        let output = cmd.output().map_err(|e| GoldenError::Compile {
            definition: definition.to_string(),
            message: format!("failed to launch {}: {}", self.program.display(), e),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GoldenError::Compile {
                definition: definition.to_string(),
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }
        Ok(output)
    }
}

impl Compiler for CommandCompiler {
    fn compile(
        &self,
        definition: &PipelineRef,
        output: &Path,
        options: &CompileOptions,
    ) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.arg("compile")
            .arg(definition.as_str())
            .arg("--output")
            .arg(output);
        if let Some(enabled) = options.enable_artifacts {
            cmd.arg(format!("--enable-artifacts={}", enabled));
        }
        if let Some(enabled) = options.enable_s3_logs {
            cmd.arg(format!("--enable-s3-logs={}", enabled));
        }
        self.run(cmd, definition)?;
        if !output.is_file() {
            return Err(GoldenError::Compile {
                definition: definition.to_string(),
                message: format!("compiler wrote nothing to {}", output.display()),
            });
        }
        Ok(())
    }

    fn create_workflow(&self, request: &WorkflowRequest) -> Result<Value> {
        let mut cmd = self.base_command();
        cmd.arg("create-workflow").arg(request.function.as_str());
        if let Some(name) = &request.name {
            cmd.arg("--name").arg(name);
        }
        if let Some(description) = &request.description {
            cmd.arg("--description").arg(description);
        }
        for param in request.params.iter().flatten() {
            let spec = match &param.default {
                Some(default) => format!("{}={}", param.name, default),
                None => param.name.clone(),
            };
            cmd.arg("--param").arg(spec);
        }
        for (key, value) in &request.extra_config {
            cmd.arg("--conf").arg(format!("{}={}", key, value));
        }
        let output = self.run(cmd, &request.function)?;
        let stdout = String::from_utf8(output.stdout).map_err(|e| GoldenError::Compile {
            definition: request.function.to_string(),
            message: format!("compiler printed invalid UTF-8: {}", e),
        })?;
        load_document(&stdout, &format!("create-workflow {}", request.function))
    }
}
