//! In-process stand-in for the pipeline compiler.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use pipeline_golden::compiler::{CompileOptions, Compiler, PipelineRef, WorkflowRequest};
use pipeline_golden::config::HarnessConfig;
use pipeline_golden::document::load_document;
use pipeline_golden::golden::GoldenMode;
use pipeline_golden::{GoldenError, Result};
use serde_yaml::Value;

/// Emits small, deterministic workflow documents keyed by definition name.
#[derive(Default)]
pub struct FakeCompiler {
    /// Bumped on every compile; feeds the nondeterministic fixtures.
    pub runs: Cell<u32>,
    /// Output paths requested so far, in order.
    pub outputs: RefCell<Vec<PathBuf>>,
    pub requests: RefCell<Vec<WorkflowRequest>>,
    /// Image tag written into every task; change it to simulate drift.
    pub image_tag: RefCell<String>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        let fake = Self::default();
        *fake.image_tag.borrow_mut() = "1.0".to_string();
        fake
    }

    fn render(&self, definition: &str, options: &CompileOptions, run: u32) -> Option<String> {
        let tag = self.image_tag.borrow().clone();
        let text = match definition {
            "fixtures:sequential" => format!(
                "apiVersion: tekton.dev/v1beta1\nkind: PipelineRun\nmetadata:\n  name: sequential\nspec:\n  tasks:\n  - name: gcs-download\n    image: library/bash:{tag}\n  - name: echo\n    image: library/bash:{tag}\n    runAfter: [gcs-download]\n"
            ),
            "fixtures:parallel_join" => {
                let mut text = String::from(
                    "apiVersion: tekton.dev/v1beta1\nkind: PipelineRun\nmetadata:\n  name: parallel-join\n  annotations:\n    pipelines.kubeflow.org/pipeline_spec: '{\"name\": \"parallel\"}'\n",
                );
                if options.artifacts_enabled() {
                    text.push_str(
                        "    tekton.dev/artifact_bucket: mlpipeline\n    tekton.dev/artifact_items: '{\"gcs-download\": [[\"data\", \"$(results.data.path)\"]]}'\n",
                    );
                }
                if options.s3_logs_enabled() {
                    text.push_str("    tekton.dev/log_archival: s3\n");
                }
                text.push_str(
                    "spec:\n  tasks:\n  - name: gcs-download\n  - name: gcs-download-2\n  - name: echo\n    runAfter: [gcs-download, gcs-download-2]\n",
                );
                text
            }
            "fixtures:loop" => format!(
                "kind: PipelineRun\nspec:\n  params:\n  - name: loop-item-param-{run:04x}-subvar\n    value: $(params.loop-item-param-{run:04x}-subvar)\n"
            ),
            "fixtures:shuffled" => {
                let (first, second) = if run % 2 == 0 { ("a", "b") } else { ("b", "a") };
                format!("kind: PipelineRun\nspec:\n  tasks: [{first}, {second}]\n")
            }
            "fixtures:small" => "kind: PipelineRun\nmetadata:\n  name: save-most-frequent\n".to_string(),
            "fixtures:composed" => "kind: PipelineRun\nmetadata:\n  name: download-and-save\nspec:\n  tasks:\n  - name: download\n  - name: save-most-frequent\n".to_string(),
            "fixtures:garbage" => "kind: [unclosed\n".to_string(),
            _ => return None,
        };
        Some(text)
    }
}

impl Compiler for FakeCompiler {
    fn compile(&self, definition: &PipelineRef, output: &Path, options: &CompileOptions) -> Result<()> {
        let run = self.runs.get() + 1;
        self.runs.set(run);
        self.outputs.borrow_mut().push(output.to_path_buf());
        let text = self
            .render(definition.as_str(), options, run)
            .ok_or_else(|| GoldenError::Compile {
                definition: definition.to_string(),
                message: "unknown pipeline definition".to_string(),
            })?;
        fs::write(output, text).expect("write compiled output");
        Ok(())
    }

    fn create_workflow(&self, request: &WorkflowRequest) -> Result<Value> {
        self.requests.borrow_mut().push(request.clone());
        let mut text = format!(
            "kind: PipelineRun\nmetadata:\n  name: {}\n",
            request
                .name
                .as_deref()
                .unwrap_or("pipeline")
                .to_lowercase()
                .replace(' ', "-")
        );
        if let Some(description) = &request.description {
            text.push_str(&format!("  description: {}\n", description));
        }
        if let Some(params) = &request.params {
            text.push_str("spec:\n  params:\n");
            for p in params {
                text.push_str(&format!("  - name: {}\n", p.name));
            }
        }
        load_document(&text, "fake create_workflow")
    }
}

pub fn config(testdata: &Path, mode: GoldenMode) -> HarnessConfig {
    HarnessConfig::default()
        .with_testdata(testdata)
        .with_mode(mode)
        .with_colors(false)
}
