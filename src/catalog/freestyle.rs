//! `freestyle` jobs: a script, optionally fanned out over a matrix.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{
    JobKind, expand_spec, lint_key_vals, lint_spec, output_upstreams, render_key_vals, require,
};
use crate::error::{ExpandError, LintError};
use crate::expand::matrix;
use crate::expand::{JobScope, RuntimeJob};
use crate::parse::workflow::{Job, KeyVal, WorkflowDefinition};

pub const KIND: &str = "freestyle";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreestyleJobSpec {
    pub script: String,
    #[serde(default)]
    pub envs: Vec<KeyVal>,
    #[serde(default)]
    pub matrix: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

pub struct FreestyleKind;

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl JobKind for FreestyleKind {
    fn kind(&self) -> &str {
        KIND
    }

    fn upstreams(&self, job: &Job) -> Vec<String> {
        let Ok(spec) = lint_spec::<FreestyleJobSpec>(job) else {
            return Vec::new();
        };
        output_upstreams(
            std::iter::once(spec.script.as_str())
                .chain(spec.envs.iter().map(|kv| kv.value.as_str())),
        )
    }

    fn outputs(&self, job: &Job) -> Vec<String> {
        lint_spec::<FreestyleJobSpec>(job)
            .map(|spec| spec.outputs)
            .unwrap_or_default()
    }

    fn lint(&self, job: &Job, _workflow: &WorkflowDefinition) -> Result<(), LintError> {
        let spec: FreestyleJobSpec = lint_spec(job)?;
        require(&spec.script, "script")?;
        lint_key_vals(&spec.envs)?;

        let mut seen = HashSet::new();
        for output in &spec.outputs {
            if !is_identifier(output) || !seen.insert(output.as_str()) {
                return Err(LintError::InvalidOutput(output.clone()));
            }
        }
        for axis in spec.matrix.keys() {
            if !is_identifier(axis) {
                return Err(LintError::InvalidParam {
                    key: axis.clone(),
                    reason: "matrix axis must be an identifier".into(),
                });
            }
        }
        Ok(())
    }

    fn expand(
        &self,
        job: &mut Job,
        scope: &JobScope<'_>,
        start_index: usize,
    ) -> Result<Vec<RuntimeJob>, ExpandError> {
        let spec: FreestyleJobSpec = expand_spec(job)?;
        let limit = scope.context().config.max_runtime_jobs;
        let combos = matrix::combinations(&spec.matrix, limit)?;

        let mut jobs = Vec::with_capacity(combos.len());
        for (i, combo) in combos.iter().enumerate() {
            let mut instance = scope.clone();
            for (axis, value) in combo {
                instance = instance.with(&format!("matrix.{axis}"), value);
            }

            let mut runtime = RuntimeJob::new(&job.name, KIND, start_index + i);
            if !combo.is_empty() {
                let target: Vec<String> = combo.iter().map(|(a, v)| format!("{a}={v}")).collect();
                runtime.target = Some(target.join(","));
            }
            render_key_vals(&spec.envs, &instance, &mut runtime.env)?;
            runtime.script = Some(instance.render(&spec.script)?);
            jobs.push(runtime);
        }
        Ok(jobs)
    }
}
