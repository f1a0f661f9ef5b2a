//! Scenario declarations.

use std::fmt;

use crate::compiler::{CompileOptions, PipelineRef, WorkflowRequest};
use crate::normalize::Normalizer;

/// How the compiled document of a scenario is produced.
#[derive(Debug, Clone)]
pub enum ScenarioKind {
    /// Compile one pipeline definition.
    Pipeline(PipelineRef),
    /// Compile each definition in order; only the last output is verified.
    Nested(Vec<PipelineRef>),
    /// Build the workflow through the decorator-free entry point.
    NoDecorator(WorkflowRequest),
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScenarioKind::Pipeline(_) => f.write_str("pipeline"),
            ScenarioKind::Nested(defs) => write!(f, "nested({})", defs.len()),
            ScenarioKind::NoDecorator(_) => f.write_str("no-decorator"),
        }
    }
}

/// One test case. Immutable once declared.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: String,
    /// Golden file name, relative to the testdata directory.
    pub golden: String,
    pub kind: ScenarioKind,
    pub options: CompileOptions,
    pub normalizer: Option<Normalizer>,
    pub description: String,
}

impl Scenario {
    pub fn pipeline(id: &str, definition: &str, golden: &str) -> Self {
        Self::with_kind(id, golden, ScenarioKind::Pipeline(PipelineRef::new(definition)))
    }

    pub fn nested(id: &str, definitions: &[&str], golden: &str) -> Self {
        let defs = definitions.iter().map(|d| PipelineRef::new(*d)).collect();
        Self::with_kind(id, golden, ScenarioKind::Nested(defs))
    }

    pub fn no_decorator(id: &str, request: WorkflowRequest, golden: &str) -> Self {
        Self::with_kind(id, golden, ScenarioKind::NoDecorator(request))
    }

    fn with_kind(id: &str, golden: &str, kind: ScenarioKind) -> Self {
        Self {
            id: id.to_string(),
            golden: golden.to_string(),
            kind,
            options: CompileOptions::default(),
            normalizer: None,
            description: String::new(),
        }
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Rewrite compiled text before parsing. Only file-producing kinds have
    /// text to rewrite; a no-decorator scenario with a normalizer fails with a
    /// configuration error when run.
    pub fn normalized(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}
