//! Job kind catalog.
//!
//! Each workflow job names its kind with a `type` tag. The catalog maps that
//! tag to a [`JobKind`], which knows how to lint the job's spec and expand it
//! into runtime jobs. Catalogs are plain values passed to the linter, so
//! callers can register their own kinds next to the built-in ones.

pub mod build;
pub mod deploy;
pub mod freestyle;

use std::collections::{BTreeMap, HashSet};

use serde::de::DeserializeOwned;

use crate::error::{ExpandError, LintError};
use crate::expand::{JobScope, RuntimeJob};
use crate::parse::decode_value;
use crate::parse::workflow::{Job, KeyVal, ParamType, WorkflowDefinition};

pub use build::BuildKind;
pub use deploy::DeployKind;
pub use freestyle::FreestyleKind;

pub trait JobKind: Send + Sync {
    /// The `type` tag this kind is registered under.
    fn kind(&self) -> &str;

    fn is_skipped(&self, job: &Job) -> bool {
        job.is_skipped()
    }

    /// Names of jobs this job depends on. Specs that fail to decode report
    /// none; `lint` reports the decode error.
    fn upstreams(&self, _job: &Job) -> Vec<String> {
        Vec::new()
    }

    /// Output keys downstream jobs may reference as `{{.job.<name>.output.<key>}}`.
    fn outputs(&self, _job: &Job) -> Vec<String> {
        Vec::new()
    }

    /// Static validation of the job against the stored workflow.
    fn lint(&self, job: &Job, workflow: &WorkflowDefinition) -> Result<(), LintError>;

    /// Compute the runtime jobs for `job`. May rewrite `job` in place, so
    /// callers hand in a copy they own.
    fn expand(
        &self,
        job: &mut Job,
        scope: &JobScope<'_>,
        start_index: usize,
    ) -> Result<Vec<RuntimeJob>, ExpandError>;
}

pub struct JobCatalog {
    kinds: BTreeMap<String, Box<dyn JobKind>>,
}

impl JobCatalog {
    pub fn empty() -> Self {
        JobCatalog {
            kinds: BTreeMap::new(),
        }
    }

    /// Catalog with the `build`, `deploy` and `freestyle` kinds.
    pub fn builtin() -> Self {
        let mut catalog = JobCatalog::empty();
        catalog
            .register(BuildKind)
            .register(DeployKind)
            .register(FreestyleKind);
        catalog
    }

    /// Register `kind`, replacing any kind with the same tag.
    pub fn register<K: JobKind + 'static>(&mut self, kind: K) -> &mut Self {
        self.kinds.insert(kind.kind().to_string(), Box::new(kind));
        self
    }

    pub fn get(&self, kind: &str) -> Option<&dyn JobKind> {
        self.kinds.get(kind).map(|k| k.as_ref())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }
}

impl Default for JobCatalog {
    fn default() -> Self {
        JobCatalog::builtin()
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the built-in kinds
// ---------------------------------------------------------------------------

pub(crate) fn lint_spec<T: DeserializeOwned>(job: &Job) -> Result<T, LintError> {
    decode_value(&job.spec).map_err(|e| LintError::InvalidSpec(e.to_string()))
}

pub(crate) fn expand_spec<T: DeserializeOwned>(job: &Job) -> Result<T, ExpandError> {
    decode_value(&job.spec).map_err(|e| ExpandError::InvalidSpec(e.to_string()))
}

pub(crate) fn write_spec<T: serde::Serialize>(job: &mut Job, spec: &T) -> Result<(), ExpandError> {
    job.spec = serde_json::to_value(spec).map_err(|e| ExpandError::InvalidSpec(e.to_string()))?;
    Ok(())
}

pub(crate) fn require(value: &str, field: impl Into<String>) -> Result<(), LintError> {
    if value.trim().is_empty() {
        return Err(LintError::MissingField(field.into()));
    }
    Ok(())
}

/// Keys must be present and unique; choice values must be one of the options.
pub(crate) fn lint_key_vals(key_vals: &[KeyVal]) -> Result<(), LintError> {
    let mut seen = HashSet::new();
    for kv in key_vals {
        require(&kv.key, "key")?;
        if !seen.insert(kv.key.as_str()) {
            return Err(LintError::InvalidParam {
                key: kv.key.clone(),
                reason: "declared more than once".into(),
            });
        }
        if kv.param_type == ParamType::Choice && !kv.choice_option.contains(&kv.value) {
            return Err(LintError::InvalidParam {
                key: kv.key.clone(),
                reason: format!("value {:?} is not one of the choice options", kv.value),
            });
        }
    }
    Ok(())
}

/// Render each value through `scope` into `env`, returning the rendered list.
pub(crate) fn render_key_vals(
    key_vals: &[KeyVal],
    scope: &JobScope<'_>,
    env: &mut BTreeMap<String, String>,
) -> Result<Vec<KeyVal>, ExpandError> {
    key_vals
        .iter()
        .map(|kv| {
            let value = scope.render(&kv.value)?;
            env.insert(kv.key.clone(), value.clone());
            Ok(KeyVal {
                value,
                ..kv.clone()
            })
        })
        .collect()
}

/// Upstream job names referenced through `{{.job.<name>.output.<key>}}`.
pub(crate) fn output_upstreams<'a>(templates: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for template in templates {
        for path in crate::expand::reference::references(template) {
            if let Some((job, _)) = crate::expand::reference::job_output_ref(path) {
                if !names.iter().any(|n| n == job) {
                    names.push(job.to_string());
                }
            }
        }
    }
    names
}
