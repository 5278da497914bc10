//! `deploy` jobs: one runtime job per service deployed to an environment.
//!
//! Services are either listed in the spec (`runtime`) or taken from an
//! upstream build job (`fromjob`), in which case the build's targets are
//! copied into the job during expansion.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{JobKind, build, expand_spec, lint_spec, output_upstreams, require, write_spec};
use crate::error::{ExpandError, LintError};
use crate::expand::reference::placeholder;
use crate::expand::{JobScope, RuntimeJob};
use crate::parse::workflow::{Job, WorkflowDefinition};

pub const KIND: &str = "deploy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployJobSpec {
    pub env: String,
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub source: DeploySource,
    /// Upstream build job, for `fromjob` deploys.
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub services: Vec<DeployService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploySource {
    #[default]
    Runtime,
    #[serde(rename = "fromjob")]
    FromJob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployService {
    pub service_name: String,
    pub service_module: String,
    #[serde(default)]
    pub image: String,
}

pub struct DeployKind;

impl JobKind for DeployKind {
    fn kind(&self) -> &str {
        KIND
    }

    fn upstreams(&self, job: &Job) -> Vec<String> {
        let Ok(spec) = lint_spec::<DeployJobSpec>(job) else {
            return Vec::new();
        };
        let mut names = output_upstreams(spec.services.iter().map(|s| s.image.as_str()));
        if spec.source == DeploySource::FromJob && !names.contains(&spec.job_name) {
            names.insert(0, spec.job_name);
        }
        names
    }

    fn lint(&self, job: &Job, workflow: &WorkflowDefinition) -> Result<(), LintError> {
        let spec: DeployJobSpec = lint_spec(job)?;
        require(&spec.env, "env")?;

        match spec.source {
            DeploySource::FromJob => {
                require(&spec.job_name, "job_name")?;
                // Existence and ordering are checked with the other upstream
                // references; only the kind matters here.
                if let Some(upstream) = workflow.find_job(&spec.job_name) {
                    if upstream.kind != build::KIND {
                        return Err(LintError::InvalidUpstreamKind {
                            job: upstream.name.clone(),
                            expected: build::KIND.into(),
                            found: upstream.kind.clone(),
                        });
                    }
                }
            }
            DeploySource::Runtime => {
                let mut targets = HashSet::new();
                for (i, svc) in spec.services.iter().enumerate() {
                    require(&svc.service_name, format!("services[{i}].service_name"))?;
                    require(&svc.service_module, format!("services[{i}].service_module"))?;
                    let target = format!("{}/{}", svc.service_name, svc.service_module);
                    if !targets.insert(target.clone()) {
                        return Err(LintError::DuplicateTarget(target));
                    }
                }
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
        let mut spec: DeployJobSpec = expand_spec(job)?;

        if spec.source == DeploySource::FromJob {
            let upstream = scope
                .context()
                .workflow
                .find_job(&spec.job_name)
                .ok_or_else(|| ExpandError::UnresolvedVariable(format!("job.{}", spec.job_name)))?;
            let image = placeholder(&format!("job.{}.output.IMAGE", spec.job_name));
            spec.services = build::targets(upstream)?
                .into_iter()
                .map(|(service_name, service_module)| DeployService {
                    service_name,
                    service_module,
                    image: image.clone(),
                })
                .collect();
        }

        if spec.services.is_empty() {
            return Err(ExpandError::EmptyEnumeration("services".into()));
        }

        let env = scope.render(&spec.env)?;
        let mut jobs = Vec::with_capacity(spec.services.len());
        for (i, svc) in spec.services.iter_mut().enumerate() {
            let scope = scope
                .with("service.name", &svc.service_name)
                .with("service.module", &svc.service_module);
            svc.image = scope.render(&svc.image)?;

            let mut runtime = RuntimeJob::new(&job.name, KIND, start_index + i);
            runtime.target = Some(format!("{}/{}", svc.service_name, svc.service_module));
            runtime.env.insert("ENV".into(), env.clone());
            runtime.env.insert("SERVICE".into(), svc.service_name.clone());
            runtime.env.insert("SERVICE_MODULE".into(), svc.service_module.clone());
            if !svc.image.is_empty() {
                runtime.env.insert("IMAGE".into(), svc.image.clone());
            }
            jobs.push(runtime);
        }

        write_spec(job, &spec)?;
        Ok(jobs)
    }
}
