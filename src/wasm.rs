//! WASM entry points for the plan editor.
//!
//! Each function returns a JSON array of error objects, empty on success.

use wasm_bindgen::prelude::*;

use crate::catalog::JobCatalog;
use crate::config::LintConfig;
use crate::error::ReleaseError;
use crate::parse::approval::Approval;

/// Lint one release job given its type tag and spec JSON.
#[wasm_bindgen]
pub fn lint_release_job(job_type: &str, spec_json: &str) -> JsValue {
    to_js(&lint_release_job_inner(job_type, spec_json))
}

fn lint_release_job_inner(job_type: &str, spec_json: &str) -> Vec<ErrorDto> {
    let spec = match serde_json::from_str::<serde_json::Value>(spec_json) {
        Ok(v) => v,
        Err(e) => return vec![ErrorDto::parse(format!("Failed to parse spec JSON: {}", e))],
    };
    let result = crate::validate::lint_release_job(
        job_type,
        &spec,
        &JobCatalog::builtin(),
        &LintConfig::default(),
    );
    collect(result)
}

/// Validate an approval block JSON.
#[wasm_bindgen]
pub fn lint_approval(approval_json: &str) -> JsValue {
    to_js(&lint_approval_inner(approval_json))
}

fn lint_approval_inner(approval_json: &str) -> Vec<ErrorDto> {
    let approval = match serde_json::from_str::<Option<Approval>>(approval_json) {
        Ok(a) => a,
        Err(e) => return vec![ErrorDto::parse(format!("Failed to parse approval JSON: {}", e))],
    };
    let result = crate::validate::validate_approval(approval.as_ref(), &LintConfig::default())
        .map_err(ReleaseError::from);
    collect(result)
}

/// Lint a whole release plan document: every job, then the approval gate.
#[wasm_bindgen]
pub fn lint_release_plan(plan_json: &str) -> JsValue {
    to_js(&lint_release_plan_inner(plan_json))
}

fn lint_release_plan_inner(plan_json: &str) -> Vec<ErrorDto> {
    let plan = match crate::parse::parse_release_plan(plan_json) {
        Ok(p) => p,
        Err(e) => return vec![ErrorDto::parse(format!("Failed to parse release plan JSON: {}", e))],
    };
    let result = crate::validate::lint_release_plan(
        &plan,
        &JobCatalog::builtin(),
        &LintConfig::default(),
    );
    collect(result)
}

fn to_js(errors: &[ErrorDto]) -> JsValue {
    serde_wasm_bindgen::to_value(errors).unwrap_or(JsValue::NULL)
}

fn collect(result: Result<(), ReleaseError>) -> Vec<ErrorDto> {
    match result {
        Ok(()) => vec![],
        Err(e) => vec![ErrorDto::from(e)],
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    kind: String,
    message: String,
    job_name: Option<String>,
    node_index: Option<usize>,
}

impl ErrorDto {
    fn parse(message: String) -> Self {
        ErrorDto {
            code: "P001".into(),
            kind: "Parse".into(),
            message,
            job_name: None,
            node_index: None,
        }
    }
}

impl From<ReleaseError> for ErrorDto {
    fn from(e: ReleaseError) -> Self {
        ErrorDto {
            code: e.code().into(),
            kind: e.kind().to_string(),
            message: e.to_string(),
            job_name: e.job_name().map(String::from),
            node_index: e.node_index(),
        }
    }
}
