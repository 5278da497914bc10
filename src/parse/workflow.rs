//! Workflow definitions embedded in workflow release jobs.
//!
//! Job specs stay as raw JSON here; each job kind in the catalog decodes its
//! own spec shape. `Clone` is the deep copy the linter works on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub params: Vec<WorkflowParam>,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl WorkflowDefinition {
    /// All jobs with the index of the stage they belong to, in run order.
    pub fn jobs(&self) -> impl Iterator<Item = (usize, &Job)> {
        self.stages
            .iter()
            .enumerate()
            .flat_map(|(i, stage)| stage.jobs.iter().map(move |job| (i, job)))
    }

    pub fn find_job(&self, name: &str) -> Option<&Job> {
        self.jobs().map(|(_, job)| job).find(|job| job.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParam {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub run_policy: RunPolicy,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl Job {
    pub fn is_skipped(&self) -> bool {
        self.skipped || self.run_policy == RunPolicy::Skip
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    #[default]
    DefaultRun,
    DefaultNotRun,
    ForceRun,
    Skip,
}

/// A user-supplied key/value parameter on build and freestyle jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyVal {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub param_type: ParamType,
    #[serde(default)]
    pub choice_option: Vec<String>,
    #[serde(default)]
    pub is_credential: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    #[default]
    String,
    Text,
    Choice,
}
