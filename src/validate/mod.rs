//! Validation phase: release jobs, embedded workflows and approval gates.
//!
//! Everything here is fail-fast: the first violation is returned and nothing
//! after it is checked.

pub mod approval;
pub mod references;

use std::collections::HashSet;

use tracing::{debug, debug_span};

use crate::catalog::JobCatalog;
use crate::config::LintConfig;
use crate::error::{ExpandError, LintError, ReleaseError};
use crate::expand::{ExpandContext, RuntimeJob};
use crate::parse::index::JobIndex;
use crate::parse::types::{ReleaseJobSpec, ReleaseJobType, ReleasePlan};
use crate::parse::workflow::WorkflowDefinition;

pub use approval::validate_approval;

/// Decode a release job's spec for its declared type and, for workflow jobs,
/// lint the embedded workflow.
pub fn lint_release_job(
    job_type: &str,
    spec: &serde_json::Value,
    catalog: &JobCatalog,
    config: &LintConfig,
) -> Result<(), ReleaseError> {
    let job_type: ReleaseJobType = job_type.parse()?;
    match crate::parse::decode(job_type, spec)? {
        ReleaseJobSpec::Text(_) => Ok(()),
        ReleaseJobSpec::Workflow(w) => lint_workflow(w.workflow.as_ref(), catalog, config),
    }
}

/// Lint every non-skipped job of `workflow` and check that it expands.
///
/// Works on a private copy; `workflow` is left untouched.
pub fn lint_workflow(
    workflow: Option<&WorkflowDefinition>,
    catalog: &JobCatalog,
    config: &LintConfig,
) -> Result<(), ReleaseError> {
    let workflow = workflow.ok_or(ReleaseError::EmptyWorkflow)?;
    walk(workflow, catalog, config, false).map(|_| ())
}

/// Lint `workflow` and return the runtime jobs of every non-skipped job, in
/// stage order. Instance indices run across the whole workflow.
pub fn expand_workflow(
    workflow: &WorkflowDefinition,
    catalog: &JobCatalog,
    config: &LintConfig,
) -> Result<Vec<RuntimeJob>, ReleaseError> {
    walk(workflow, catalog, config, true)
}

fn walk(
    workflow: &WorkflowDefinition,
    catalog: &JobCatalog,
    config: &LintConfig,
    running_index: bool,
) -> Result<Vec<RuntimeJob>, ReleaseError> {
    let _span = debug_span!("lint_workflow", workflow = %workflow.name).entered();

    let index = JobIndex::new(workflow);
    let ctx = ExpandContext::new(workflow, catalog, config);

    let mut scratch = workflow.clone();
    let mut runtime_jobs = Vec::new();
    let mut seen = HashSet::new();
    for stage in &mut scratch.stages {
        for job in &mut stage.jobs {
            if !seen.insert(job.name.clone()) {
                return Err(ReleaseError::lint(&job.name, LintError::DuplicateJobName));
            }
            let kind = catalog.get(&job.kind);
            let skipped = kind.map_or_else(|| job.is_skipped(), |k| k.is_skipped(job));
            if skipped {
                debug!(job = %job.name, kind = %job.kind, "skipping job");
                continue;
            }
            let kind = kind.ok_or_else(|| {
                ReleaseError::lint(&job.name, LintError::UnknownJobKind(job.kind.clone()))
            })?;

            kind.lint(job, workflow)
                .map_err(|cause| ReleaseError::lint(&job.name, cause))?;
            references::check_upstreams(job, &kind.upstreams(job), &index)
                .map_err(|cause| ReleaseError::lint(&job.name, cause))?;

            let start_index = if running_index { runtime_jobs.len() } else { 0 };
            let scope = ctx.scope(&job.name);
            let expanded = kind
                .expand(job, &scope, start_index)
                .map_err(|cause| ReleaseError::expand(&job.name, cause))?;
            if expanded.len() > config.max_runtime_jobs {
                return Err(ReleaseError::expand(
                    &job.name,
                    ExpandError::TooManyInstances {
                        count: expanded.len(),
                        max: config.max_runtime_jobs,
                    },
                ));
            }
            debug!(job = %job.name, instances = expanded.len(), "expanded job");
            runtime_jobs.extend(expanded);
        }
    }

    Ok(runtime_jobs)
}

/// Lint every release job of `plan`, then its approval gate.
pub fn lint_release_plan(
    plan: &ReleasePlan,
    catalog: &JobCatalog,
    config: &LintConfig,
) -> Result<(), ReleaseError> {
    for job in &plan.jobs {
        lint_release_job(&job.job_type, &job.spec, catalog, config).map_err(|e| {
            ReleaseError::ReleaseJob {
                job: job.name.clone(),
                source: Box::new(e),
            }
        })?;
    }
    validate_approval(plan.approval.as_ref(), config)?;
    Ok(())
}
