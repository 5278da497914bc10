//! `build` jobs: one runtime job per service module to build.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    JobKind, expand_spec, lint_key_vals, lint_spec, output_upstreams, render_key_vals, require,
    write_spec,
};
use crate::error::{ExpandError, LintError};
use crate::expand::{JobScope, RuntimeJob};
use crate::parse::workflow::{Job, KeyVal, WorkflowDefinition};

pub const KIND: &str = "build";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildJobSpec {
    #[serde(default)]
    pub docker_registry_id: String,
    pub service_and_builds: Vec<ServiceAndBuild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAndBuild {
    pub service_name: String,
    pub service_module: String,
    pub build_name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub key_vals: Vec<KeyVal>,
}

impl ServiceAndBuild {
    pub fn target(&self) -> String {
        format!("{}/{}", self.service_name, self.service_module)
    }
}

pub struct BuildKind;

impl JobKind for BuildKind {
    fn kind(&self) -> &str {
        KIND
    }

    fn upstreams(&self, job: &Job) -> Vec<String> {
        let Ok(spec) = lint_spec::<BuildJobSpec>(job) else {
            return Vec::new();
        };
        output_upstreams(
            spec.service_and_builds
                .iter()
                .flat_map(|sb| sb.key_vals.iter().map(|kv| kv.value.as_str())),
        )
    }

    fn outputs(&self, _job: &Job) -> Vec<String> {
        vec!["IMAGE".to_string()]
    }

    fn lint(&self, job: &Job, _workflow: &WorkflowDefinition) -> Result<(), LintError> {
        let spec: BuildJobSpec = lint_spec(job)?;
        let mut targets = HashSet::new();
        for (i, sb) in spec.service_and_builds.iter().enumerate() {
            require(&sb.service_name, format!("service_and_builds[{i}].service_name"))?;
            require(&sb.service_module, format!("service_and_builds[{i}].service_module"))?;
            require(&sb.build_name, format!("service_and_builds[{i}].build_name"))?;
            if !targets.insert(sb.target()) {
                return Err(LintError::DuplicateTarget(sb.target()));
            }
            lint_key_vals(&sb.key_vals)?;
        }
        Ok(())
    }

    fn expand(
        &self,
        job: &mut Job,
        scope: &JobScope<'_>,
        start_index: usize,
    ) -> Result<Vec<RuntimeJob>, ExpandError> {
        let mut spec: BuildJobSpec = expand_spec(job)?;
        if spec.service_and_builds.is_empty() {
            return Err(ExpandError::EmptyEnumeration("service_and_builds".into()));
        }

        let mut jobs = Vec::with_capacity(spec.service_and_builds.len());
        for (i, sb) in spec.service_and_builds.iter_mut().enumerate() {
            let scope = scope
                .with("service.name", &sb.service_name)
                .with("service.module", &sb.service_module);
            let mut runtime = RuntimeJob::new(&job.name, KIND, start_index + i);
            runtime.target = Some(sb.target());
            runtime.env.insert("SERVICE".into(), sb.service_name.clone());
            runtime.env.insert("SERVICE_MODULE".into(), sb.service_module.clone());
            runtime.env.insert("BUILD_NAME".into(), sb.build_name.clone());
            if !sb.image.is_empty() {
                sb.image = scope.render(&sb.image)?;
                runtime.env.insert("IMAGE".into(), sb.image.clone());
            }
            sb.key_vals = render_key_vals(&sb.key_vals, &scope, &mut runtime.env)?;
            jobs.push(runtime);
        }

        write_spec(job, &spec)?;
        Ok(jobs)
    }
}

/// The `(service, module)` targets of a build job's spec.
pub fn targets(job: &Job) -> Result<Vec<(String, String)>, ExpandError> {
    let spec: BuildJobSpec = expand_spec(job)?;
    Ok(spec
        .service_and_builds
        .into_iter()
        .map(|sb| (sb.service_name, sb.service_module))
        .collect())
}
