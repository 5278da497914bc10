//! Job graph linter: skip handling, fail-fast order, copy isolation.

#[allow(dead_code)]
mod helpers;

use serde_json::json;

use helpers::*;
use release_lint::catalog::JobCatalog;
use release_lint::config::LintConfig;
use release_lint::error::{ErrorKind, ExpandError, LintError, ReleaseError};
use release_lint::parse::RunPolicy;
use release_lint::validate::lint_workflow;

fn lint(wf: &release_lint::parse::WorkflowDefinition) -> Result<(), ReleaseError> {
    lint_workflow(Some(wf), &JobCatalog::builtin(), &LintConfig::default())
}

#[test]
fn null_workflow_fails() {
    let err = lint_workflow(None, &JobCatalog::builtin(), &LintConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "workflow cannot be empty");
}

#[test]
fn workflow_without_jobs_passes() {
    assert_eq!(lint(&workflow(vec![])), Ok(()));
    assert_eq!(lint(&workflow(vec![stage("a", vec![]), stage("b", vec![])])), Ok(()));
}

#[test]
fn skipped_jobs_are_never_linted_or_expanded() {
    let (catalog, counts) = catalog_with_spy("Text");
    let wf = workflow(vec![stage(
        "notify",
        vec![skipped(job("note", "Text", json!({"anything": true})))],
    )]);

    assert_eq!(lint_workflow(Some(&wf), &catalog, &LintConfig::default()), Ok(()));
    assert_eq!(counts.total(), 0);
}

#[test]
fn skip_run_policy_counts_as_skipped() {
    let (catalog, counts) = catalog_with_spy("spy");
    let mut spy = job("spy", "spy", json!({}));
    spy.run_policy = RunPolicy::Skip;
    let wf = workflow(vec![stage("s", vec![spy])]);

    assert_eq!(lint_workflow(Some(&wf), &catalog, &LintConfig::default()), Ok(()));
    assert_eq!(counts.total(), 0);
}

#[test]
fn non_skipped_spy_is_linted_and_expanded_once() {
    let (catalog, counts) = catalog_with_spy("spy");
    let wf = workflow(vec![stage("s", vec![job("spy", "spy", json!({}))])]);

    assert_eq!(lint_workflow(Some(&wf), &catalog, &LintConfig::default()), Ok(()));
    assert_eq!(counts.lint.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(counts.expand.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn skipped_job_with_invalid_spec_is_ignored() {
    let wf = workflow(vec![stage(
        "test",
        vec![skipped(freestyle_job("smoke", "")), freestyle_job("unit", "cargo test")],
    )]);
    assert_eq!(lint(&wf), Ok(()));
}

#[test]
fn unknown_job_kind() {
    let wf = workflow(vec![stage("s", vec![job("scan", "sonar", json!({}))])]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(
        err,
        ReleaseError::lint("scan", LintError::UnknownJobKind("sonar".into()))
    );
}

#[test]
fn first_failing_job_is_reported() {
    let wf = workflow(vec![
        stage("one", vec![freestyle_job("ok", "make"), freestyle_job("first", "")]),
        stage("two", vec![job("second", "deploy", json!({}))]),
    ]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.to_string(), "lint job-first err: script is required");
}

#[test]
fn duplicate_job_names() {
    let wf = workflow(vec![
        stage("one", vec![freestyle_job("test", "make")]),
        stage("two", vec![freestyle_job("test", "make e2e")]),
    ]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::lint("test", LintError::DuplicateJobName))
    );
}

#[test]
fn earlier_failure_reported_before_later_duplicate() {
    let wf = workflow(vec![
        stage("one", vec![freestyle_job("a", "")]),
        stage("two", vec![freestyle_job("b", "make"), freestyle_job("b", "make e2e")]),
    ]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::lint("a", LintError::MissingField("script".into())))
    );
}

#[test]
fn duplicate_of_skipped_job_is_reported() {
    let wf = workflow(vec![
        stage("one", vec![skipped(freestyle_job("test", ""))]),
        stage("two", vec![freestyle_job("test", "make")]),
    ]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::lint("test", LintError::DuplicateJobName))
    );
}

#[test]
fn upstream_must_be_in_earlier_stage() {
    let wf = workflow(vec![stage(
        "all",
        vec![build_job("build", &[("api", "gateway")]), deploy_from_job("deploy", "build")],
    )]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::lint(
            "deploy",
            LintError::UpstreamNotEarlier("build".into())
        ))
    );
}

#[test]
fn self_reference() {
    let wf = workflow(vec![stage(
        "s",
        vec![job(
            "report",
            "freestyle",
            json!({"script": "echo {{.job.report.output.URL}}", "outputs": ["URL"]}),
        )],
    )]);
    assert_eq!(lint(&wf), Err(ReleaseError::lint("report", LintError::SelfReference)));
}

#[test]
fn deploy_from_non_build_job() {
    let wf = workflow(vec![
        stage("test", vec![freestyle_job("unit", "make test")]),
        stage("deploy", vec![deploy_from_job("deploy", "unit")]),
    ]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.code(), "L009");
    assert_eq!(
        err.to_string(),
        "lint job-deploy err: upstream job unit should be of type build, found freestyle"
    );
}

#[test]
fn duplicate_build_target() {
    let wf = workflow(vec![stage(
        "build",
        vec![build_job("build", &[("api", "gateway"), ("api", "gateway")])],
    )]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::lint(
            "build",
            LintError::DuplicateTarget("api/gateway".into())
        ))
    );
}

#[test]
fn choice_value_outside_options() {
    let wf = workflow(vec![stage(
        "s",
        vec![job(
            "smoke",
            "freestyle",
            json!({
                "script": "run",
                "envs": [{"key": "REGION", "value": "mars", "type": "choice", "choice_option": ["eu", "us"]}]
            }),
        )],
    )]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lint);
    assert!(matches!(err, ReleaseError::Lint { cause: LintError::InvalidParam { .. }, .. }));
}

#[test]
fn invalid_kind_spec_is_a_lint_error() {
    let wf = workflow(vec![stage("s", vec![job("build", "build", json!({"service_and_builds": {}}))])]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.code(), "L001");
    assert!(err.to_string().starts_with("lint job-build err: invalid spec: "), "{err}");
}

// =============================================================================
// Expansion failures surface as runtime errors
// =============================================================================

#[test]
fn empty_build_list_is_a_runtime_error() {
    let wf = workflow(vec![stage("build", vec![build_job("build", &[])])]);
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Expand);
    assert_eq!(
        err.to_string(),
        "lint job-build runtime err: service_and_builds is empty, at least one runtime job is required"
    );
}

#[test]
fn malformed_matrix_expression() {
    let wf = workflow(vec![stage(
        "s",
        vec![job(
            "cross",
            "freestyle",
            json!({"script": "build --os {{.matrix.os", "matrix": {"os": ["linux"]}}),
        )],
    )]);
    let err = lint(&wf).unwrap_err();
    assert!(matches!(
        err,
        ReleaseError::Expand { cause: ExpandError::MalformedExpression(_), .. }
    ));
}

#[test]
fn unresolved_variable() {
    let wf = workflow(vec![stage("s", vec![freestyle_job("t", "echo {{.workflow.params.nope}}")])]);
    assert_eq!(
        lint(&wf),
        Err(ReleaseError::expand(
            "t",
            ExpandError::UnresolvedVariable("workflow.params.nope".into())
        ))
    );
}

#[test]
fn cyclic_params_fail_jobs_that_use_them() {
    let wf = workflow_with_params(
        vec![stage("s", vec![freestyle_job("plain", "make"), freestyle_job("t", "echo {{.workflow.params.a}}")])],
        vec![("a", "{{.workflow.params.b}}"), ("b", "{{.workflow.params.a}}")],
    );
    let err = lint(&wf).unwrap_err();
    assert_eq!(err.job_name(), Some("t"));
    assert!(matches!(
        err,
        ReleaseError::Expand { cause: ExpandError::CyclicReference(_), .. }
    ));
}

#[test]
fn runtime_job_limit() {
    let wf = workflow(vec![stage(
        "s",
        vec![job(
            "grid",
            "freestyle",
            json!({"script": "run", "matrix": {"a": ["1", "2", "3"], "b": ["1", "2", "3"]}}),
        )],
    )]);
    let config = LintConfig {
        max_runtime_jobs: 4,
        ..LintConfig::default()
    };
    let err = lint_workflow(Some(&wf), &JobCatalog::builtin(), &config).unwrap_err();
    assert_eq!(
        err,
        ReleaseError::expand("grid", ExpandError::TooManyInstances { count: 9, max: 4 })
    );
}

// =============================================================================
// Copy isolation
// =============================================================================

#[test]
fn linting_leaves_the_workflow_untouched() {
    let wf = workflow_with_params(
        vec![
            stage("build", vec![build_job("build", &[("web", "frontend"), ("api", "gateway")])]),
            stage("deploy", vec![deploy_from_job("deploy", "build")]),
        ],
        vec![("tag", "v1")],
    );
    let before = serde_json::to_string(&wf).unwrap();

    let first = lint(&wf);
    let second = lint(&wf);

    assert_eq!(first, Ok(()));
    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&wf).unwrap(), before);
}

#[test]
fn failing_lint_is_idempotent() {
    let wf = workflow(vec![stage("deploy", vec![deploy_from_job("deploy", "missing")])]);
    let before = wf.clone();
    assert_eq!(lint(&wf), lint(&wf));
    assert_eq!(wf, before);
}
