use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};

use release_lint::catalog::{JobCatalog, JobKind};
use release_lint::error::{ExpandError, LintError};
use release_lint::expand::{JobScope, RuntimeJob};
use release_lint::parse::*;

// =============================================================================
// Workflow builders
// =============================================================================

pub fn workflow(stages: Vec<Stage>) -> WorkflowDefinition {
    WorkflowDefinition {
        name: "release-wf".into(),
        display_name: "Release".into(),
        project: "shop".into(),
        params: vec![],
        stages,
    }
}

pub fn workflow_with_params(stages: Vec<Stage>, params: Vec<(&str, &str)>) -> WorkflowDefinition {
    let mut wf = workflow(stages);
    wf.params = params
        .into_iter()
        .map(|(name, value)| WorkflowParam {
            name: name.into(),
            value: value.into(),
            description: String::new(),
        })
        .collect();
    wf
}

pub fn stage(name: &str, jobs: Vec<Job>) -> Stage {
    Stage {
        name: name.into(),
        parallel: false,
        jobs,
    }
}

pub fn job(name: &str, kind: &str, spec: Value) -> Job {
    Job {
        name: name.into(),
        kind: kind.into(),
        skipped: false,
        run_policy: RunPolicy::DefaultRun,
        spec,
    }
}

pub fn skipped(mut job: Job) -> Job {
    job.skipped = true;
    job
}

// =============================================================================
// Job spec builders
// =============================================================================

pub fn build_job(name: &str, targets: &[(&str, &str)]) -> Job {
    let service_and_builds: Vec<Value> = targets
        .iter()
        .map(|(service, module)| {
            json!({
                "service_name": service,
                "service_module": module,
                "build_name": format!("{module}-build"),
            })
        })
        .collect();
    job(name, "build", json!({ "service_and_builds": service_and_builds }))
}

pub fn deploy_from_job(name: &str, upstream: &str) -> Job {
    job(
        name,
        "deploy",
        json!({ "env": "prod", "source": "fromjob", "job_name": upstream }),
    )
}

pub fn deploy_runtime(name: &str, services: &[(&str, &str)]) -> Job {
    let services: Vec<Value> = services
        .iter()
        .map(|(service, module)| json!({ "service_name": service, "service_module": module }))
        .collect();
    job(name, "deploy", json!({ "env": "prod", "services": services }))
}

pub fn freestyle_job(name: &str, script: &str) -> Job {
    job(name, "freestyle", json!({ "script": script }))
}

pub fn release_workflow_spec(wf: &WorkflowDefinition) -> Value {
    json!({ "workflow": wf })
}

// =============================================================================
// Spy job kind
// =============================================================================

/// Counts how often the linter calls into it.
#[derive(Default, Clone)]
pub struct SpyCounts {
    pub upstreams: Arc<AtomicUsize>,
    pub lint: Arc<AtomicUsize>,
    pub expand: Arc<AtomicUsize>,
}

impl SpyCounts {
    pub fn total(&self) -> usize {
        self.upstreams.load(Ordering::SeqCst)
            + self.lint.load(Ordering::SeqCst)
            + self.expand.load(Ordering::SeqCst)
    }
}

pub struct SpyKind {
    pub tag: &'static str,
    pub counts: SpyCounts,
}

impl JobKind for SpyKind {
    fn kind(&self) -> &str {
        self.tag
    }

    fn upstreams(&self, _job: &Job) -> Vec<String> {
        self.counts.upstreams.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }

    fn lint(&self, _job: &Job, _workflow: &WorkflowDefinition) -> Result<(), LintError> {
        self.counts.lint.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn expand(
        &self,
        job: &mut Job,
        _scope: &JobScope<'_>,
        start_index: usize,
    ) -> Result<Vec<RuntimeJob>, ExpandError> {
        self.counts.expand.fetch_add(1, Ordering::SeqCst);
        Ok(vec![RuntimeJob::new(&job.name, self.tag, start_index)])
    }
}

pub fn catalog_with_spy(tag: &'static str) -> (JobCatalog, SpyCounts) {
    let counts = SpyCounts::default();
    let mut catalog = JobCatalog::builtin();
    catalog.register(SpyKind {
        tag,
        counts: counts.clone(),
    });
    (catalog, counts)
}

// =============================================================================
// Approval builders
// =============================================================================

pub fn user(id: &str) -> ApprovalUser {
    ApprovalUser {
        id: id.into(),
        name: format!("user {id}"),
    }
}

pub fn node(ids: &[&str], gate: &str) -> ApprovalNode {
    ApprovalNode {
        approve_users: ids.iter().map(|id| user(id)).collect(),
        gate: gate.into(),
    }
}

pub fn native(users: usize, needed: usize) -> Approval {
    Approval {
        enabled: true,
        provider: "native".into(),
        native_approval: Some(NativeApproval {
            timeout: 60,
            approve_users: (0..users).map(|i| user(&format!("u{i}"))).collect(),
            needed_approvers: needed,
        }),
        ..Default::default()
    }
}

pub fn lark(nodes: Vec<ApprovalNode>) -> Approval {
    Approval {
        enabled: true,
        provider: "lark".into(),
        lark_approval: Some(NodeApproval {
            timeout: 60,
            approval_nodes: nodes,
        }),
        ..Default::default()
    }
}

pub fn dingtalk(nodes: Vec<ApprovalNode>) -> Approval {
    Approval {
        enabled: true,
        provider: "dingtalk".into(),
        dingtalk_approval: Some(NodeApproval {
            timeout: 60,
            approval_nodes: nodes,
        }),
        ..Default::default()
    }
}
