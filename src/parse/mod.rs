//! Parse phase: stored JSON → typed release plan structures.

pub mod approval;
pub mod index;
pub mod types;
pub mod workflow;

pub use approval::*;
pub use index::JobIndex;
pub use types::*;
pub use workflow::*;

use serde::de::DeserializeOwned;

use crate::error::DecodeError;

/// Checked conversion of an untyped payload into `T`.
pub fn decode_value<T: DeserializeOwned>(raw: &serde_json::Value) -> Result<T, serde_json::Error> {
    T::deserialize(raw)
}

/// Decode a release job spec for an already recognised job type.
pub fn decode(job_type: ReleaseJobType, raw: &serde_json::Value) -> Result<ReleaseJobSpec, DecodeError> {
    let fail = |e: serde_json::Error| DecodeError {
        job_type,
        cause: e.to_string(),
    };
    match job_type {
        ReleaseJobType::Text => decode_value(raw).map(ReleaseJobSpec::Text).map_err(fail),
        ReleaseJobType::Workflow => decode_value(raw).map(ReleaseJobSpec::Workflow).map_err(fail),
    }
}

/// Deserialize a release plan document.
pub fn parse_release_plan(json: &str) -> Result<ReleasePlan, serde_json::Error> {
    serde_json::from_str(json)
}
