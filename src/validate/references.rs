//! Upstream reference rules shared by every job kind.

use crate::error::LintError;
use crate::parse::index::JobIndex;
use crate::parse::workflow::Job;

/// A job may only reference existing jobs from earlier stages.
pub fn check_upstreams(job: &Job, upstreams: &[String], index: &JobIndex) -> Result<(), LintError> {
    let Some(stage) = index.stage_of(&job.name) else {
        return Ok(());
    };
    for upstream in upstreams {
        if *upstream == job.name {
            return Err(LintError::SelfReference);
        }
        let Some(upstream_stage) = index.stage_of(upstream) else {
            return Err(LintError::UnknownUpstream(upstream.clone()));
        };
        if upstream_stage >= stage {
            return Err(LintError::UpstreamNotEarlier(upstream.clone()));
        }
    }
    Ok(())
}
