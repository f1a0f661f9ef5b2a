//! The scenario table.
//!
//! Every scenario the harness knows about is listed here explicitly; there is
//! no lookup by name at run time beyond [`find`].

use crate::compiler::{CompileOptions, PipelineParam, WorkflowRequest};
use crate::normalize::loop_item_normalizer;
use crate::scenario::Scenario;

pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::pipeline(
            "init_container",
            "testdata.init_container:init_container_pipeline",
            "init_container.yaml",
        )
        .describe("initial container workflow"),
        Scenario::pipeline("condition", "testdata.condition:flipcoin", "condition.yaml")
            .describe("conditional workflow"),
        Scenario::pipeline(
            "sequential",
            "testdata.sequential:sequential_pipeline",
            "sequential.yaml",
        )
        .describe("sequential workflow"),
        Scenario::pipeline(
            "parallel_join",
            "testdata.parallel_join:download_and_join",
            "parallel_join.yaml",
        )
        .options(CompileOptions::new().artifacts(false))
        .describe("parallel join workflow without artifacts"),
        Scenario::pipeline(
            "parallel_join_with_artifacts",
            "testdata.parallel_join:download_and_join",
            "parallel_join_with_artifacts.yaml",
        )
        .options(CompileOptions::new().artifacts(true))
        .describe("parallel join workflow with artifacts"),
        Scenario::pipeline(
            "parallel_join_with_logging",
            "testdata.parallel_join:download_and_join",
            "parallel_join_with_logging.yaml",
        )
        .options(CompileOptions::new().artifacts(false).s3_logs(true))
        .describe("parallel join workflow with log archival"),
        Scenario::pipeline(
            "parallel_join_with_argo_vars",
            "testdata.parallel_join_with_argo_vars:download_and_join_with_argo_vars",
            "parallel_join_with_argo_vars.yaml",
        )
        .describe("parallel join workflow with argo variables"),
        Scenario::pipeline("sidecar", "testdata.sidecar:sidecar_pipeline", "sidecar.yaml")
            .describe("sidecar workflow"),
        Scenario::pipeline("loop_static", "testdata.loop_static:pipeline", "loop_static.yaml")
            .normalized(loop_item_normalizer())
            .describe("loop over static params"),
        Scenario::pipeline(
            "withitem_nested",
            "testdata.withitem_nested:pipeline",
            "withitem_nested.yaml",
        )
        .describe("nested withItems loops"),
        Scenario::pipeline(
            "pipelineparams",
            "testdata.pipelineparams:pipelineparams_pipeline",
            "pipelineparams.yaml",
        )
        .describe("pipeline params workflow"),
        Scenario::pipeline("retry", "testdata.retry:retry_sample_pipeline", "retry.yaml")
            .describe("retry task"),
        Scenario::pipeline("volume", "testdata.volume:volume_pipeline", "volume.yaml")
            .describe("volume workflow"),
        Scenario::pipeline(
            "timeout",
            "testdata.timeout:timeout_sample_pipeline",
            "timeout.yaml",
        )
        .describe("step level timeout"),
        Scenario::pipeline(
            "resourceop_basic",
            "testdata.resourceop_basic:resourceop_basic",
            "resourceop_basic.yaml",
        )
        .describe("basic resource op"),
        Scenario::pipeline("volume_op", "testdata.volume_op:volumeop_basic", "volume_op.yaml")
            .describe("basic volume op"),
        Scenario::pipeline(
            "volume_snapshot_op",
            "testdata.volume_snapshot_op:volume_snapshotop_sequential",
            "volume_snapshot_op.yaml",
        )
        .describe("sequential volume snapshot op"),
        Scenario::pipeline(
            "hidden_output_file",
            "testdata.hidden_output_file:hidden_output_file_pipeline",
            "hidden_output_file.yaml",
        )
        .describe("non configurable output file"),
        Scenario::pipeline("tolerations", "testdata.tolerations:tolerations", "tolerations.yaml")
            .describe("tolerations workflow"),
        Scenario::pipeline("affinity", "testdata.affinity:affinity_pipeline", "affinity.yaml")
            .describe("affinity workflow"),
        Scenario::pipeline(
            "node_selector",
            "testdata.node_selector:node_selector_pipeline",
            "node_selector.yaml",
        )
        .describe("node selector workflow"),
        Scenario::pipeline(
            "pipeline_transformers",
            "testdata.pipeline_transformers:transform_pipeline",
            "pipeline_transformers.yaml",
        )
        .describe("pod annotations and labels"),
        Scenario::pipeline(
            "input_artifact_raw_value",
            "testdata.input_artifact_raw_value:input_artifact_pipeline",
            "input_artifact_raw_value.yaml",
        )
        .describe("input artifact with raw value"),
        Scenario::pipeline(
            "big_data_passing",
            "testdata.big_data_passing:file_passing_pipelines",
            "big_data_passing.yaml",
        )
        .describe("big data passing"),
        Scenario::pipeline("katib", "testdata.katib:mnist_hpo", "katib.yaml")
            .describe("katib hyperparameter tuning"),
        Scenario::pipeline(
            "load_from_yaml",
            "testdata.load_from_yaml:component_yaml_pipeline",
            "load_from_yaml.yaml",
        )
        .describe("components loaded from yaml"),
        Scenario::pipeline(
            "imagepullsecrets",
            "testdata.imagepullsecrets:imagepullsecrets_pipeline",
            "imagepullsecrets.yaml",
        )
        .describe("image pull secrets"),
        Scenario::no_decorator(
            "basic_no_decorator",
            WorkflowRequest::new("testdata.basic_no_decorator:save_most_frequent_word")
                .name("Save Most Frequent Word")
                .description("Get Most Frequent Word and Save to GCS")
                .params(vec![
                    PipelineParam::new("message"),
                    PipelineParam::new("outputpath"),
                ]),
            "basic_no_decorator.yaml",
        )
        .describe("workflow without a pipeline decorator"),
        Scenario::pipeline(
            "exit_handler",
            "testdata.exit_handler:download_and_print",
            "exit_handler.yaml",
        )
        .describe("exit handler"),
        Scenario::nested(
            "compose",
            &[
                "testdata.compose:save_most_frequent_word",
                "testdata.compose:download_save_most_frequent_word",
            ],
            "compose.yaml",
        )
        .describe("pipeline composed from a smaller one"),
    ]
}

pub fn find(id: &str) -> Option<Scenario> {
    catalog().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioKind;
    use std::collections::HashSet;

    #[test]
    fn ids_and_goldens_are_unique() {
        let scenarios = catalog();
        let ids: HashSet<_> = scenarios.iter().map(|s| s.id.as_str()).collect();
        let goldens: HashSet<_> = scenarios.iter().map(|s| s.golden.as_str()).collect();
        assert_eq!(ids.len(), scenarios.len());
        assert_eq!(goldens.len(), scenarios.len());
    }

    #[test]
    fn parallel_join_variants_differ_only_in_options() {
        let plain = find("parallel_join").unwrap();
        let artifacts = find("parallel_join_with_artifacts").unwrap();
        let logging = find("parallel_join_with_logging").unwrap();
        assert!(!plain.options.artifacts_enabled());
        assert!(artifacts.options.artifacts_enabled());
        assert!(logging.options.s3_logs_enabled());
        assert!(!logging.options.artifacts_enabled());
    }

    #[test]
    fn special_kinds_are_declared() {
        assert!(find("loop_static").unwrap().normalizer.is_some());
        assert!(matches!(find("compose").unwrap().kind, ScenarioKind::Nested(ref d) if d.len() == 2));
        assert!(matches!(
            find("basic_no_decorator").unwrap().kind,
            ScenarioKind::NoDecorator(_)
        ));
        assert!(find("does_not_exist").is_none());
    }
}
