//! Expansion phase: declared jobs → runtime job instances.
//!
//! The [`ExpandContext`] is built once per workflow and only ever read. Each
//! job renders its templates through a [`JobScope`], a private view holding
//! that job's name and per-instance variables.

pub mod matrix;
pub mod params;
pub mod reference;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::JobCatalog;
use crate::config::LintConfig;
use crate::error::ExpandError;
use crate::parse::workflow::WorkflowDefinition;

/// A concrete job instance produced by expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeJob {
    pub name: String,
    /// Name of the declared job this instance came from.
    pub origin: String,
    pub kind: String,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

impl RuntimeJob {
    pub fn new(origin: &str, kind: &str, index: usize) -> Self {
        RuntimeJob {
            name: format!("{origin}-{index}"),
            origin: origin.to_string(),
            kind: kind.to_string(),
            index,
            target: None,
            env: BTreeMap::new(),
            script: None,
        }
    }
}

pub struct ExpandContext<'a> {
    /// The stored definition, never the linter's working copy.
    pub workflow: &'a WorkflowDefinition,
    pub catalog: &'a JobCatalog,
    pub config: &'a LintConfig,
    params: Result<BTreeMap<String, String>, ExpandError>,
}

impl<'a> ExpandContext<'a> {
    pub fn new(
        workflow: &'a WorkflowDefinition,
        catalog: &'a JobCatalog,
        config: &'a LintConfig,
    ) -> Self {
        ExpandContext {
            workflow,
            catalog,
            config,
            params: params::resolve_params(workflow),
        }
    }

    pub fn scope(&self, job: &str) -> JobScope<'_> {
        JobScope {
            ctx: self,
            job: job.to_string(),
            locals: BTreeMap::new(),
        }
    }

    /// A resolved workflow parameter. Fails for every lookup when the
    /// workflow's parameters themselves do not resolve.
    pub fn param(&self, name: &str) -> Result<String, ExpandError> {
        let params = self.params.as_ref().map_err(Clone::clone)?;
        params
            .get(name)
            .cloned()
            .ok_or_else(|| ExpandError::UnresolvedVariable(format!("workflow.params.{name}")))
    }

    /// Whether `job` exists in the workflow and its kind declares `key`.
    fn declares_output(&self, job: &str, key: &str) -> bool {
        let Some(upstream) = self.workflow.find_job(job) else {
            return false;
        };
        self.catalog
            .get(&upstream.kind)
            .is_some_and(|kind| kind.outputs(upstream).iter().any(|o| o == key))
    }
}

#[derive(Clone)]
pub struct JobScope<'a> {
    ctx: &'a ExpandContext<'a>,
    job: String,
    locals: BTreeMap<String, String>,
}

impl<'a> JobScope<'a> {
    pub fn job_name(&self) -> &str {
        &self.job
    }

    pub fn context(&self) -> &'a ExpandContext<'a> {
        self.ctx
    }

    /// A copy of this scope with one more local variable.
    pub fn with(&self, path: &str, value: &str) -> Self {
        let mut scope = self.clone();
        scope.locals.insert(path.to_string(), value.to_string());
        scope
    }

    pub fn resolve(&self, path: &str) -> Result<String, ExpandError> {
        if let Some(value) = self.locals.get(path) {
            return Ok(value.clone());
        }
        if let Some(name) = path.strip_prefix("workflow.params.") {
            return self.ctx.param(name);
        }
        match path {
            "workflow.name" => return Ok(self.ctx.workflow.name.clone()),
            "workflow.project" => return Ok(self.ctx.workflow.project.clone()),
            "job.name" => return Ok(self.job.clone()),
            _ => {}
        }
        // Upstream outputs only exist at run time; keep them as written.
        if let Some((job, key)) = reference::job_output_ref(path) {
            if job != self.job && self.ctx.declares_output(job, key) {
                return Ok(reference::placeholder(path));
            }
        }
        Err(ExpandError::UnresolvedVariable(path.to_string()))
    }

    pub fn render(&self, template: &str) -> Result<String, ExpandError> {
        reference::render(template, |path| self.resolve(path))
    }
}
