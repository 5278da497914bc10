//! Release plan wire types.
//!
//! These are the serde targets for release plan documents as they come out of
//! the plan store. Field names follow the stored snake_case layout.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::approval::Approval;
use super::workflow::WorkflowDefinition;
use crate::error::ReleaseError;

// =============================================================================
// RELEASE PLAN
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasePlan {
    #[serde(default)]
    pub id: String,
    /// Assigned once by the store; determines default ordering.
    #[serde(default)]
    pub index: i64,
    pub name: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ReleasePlanStatus,
    #[serde(default)]
    pub jobs: Vec<ReleaseJob>,
    #[serde(default)]
    pub approval: Option<Approval>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub create_time: i64,
    #[serde(default)]
    pub updated_by: String,
    #[serde(default)]
    pub update_time: i64,
}

impl ReleasePlan {
    /// Move the plan to `next`, stamping the author and time of the change.
    pub fn transition(
        &mut self,
        next: ReleasePlanStatus,
        author: &str,
        at: i64,
    ) -> Result<(), ReleaseError> {
        if !self.status.can_transition_to(next) {
            return Err(ReleaseError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_by = author.to_string();
        self.update_time = at;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleasePlanStatus {
    #[default]
    Draft,
    PendingApproval,
    Approved,
    Executing,
    Succeeded,
    Failed,
    Cancelled,
}

impl ReleasePlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleasePlanStatus::Draft => "draft",
            ReleasePlanStatus::PendingApproval => "pending-approval",
            ReleasePlanStatus::Approved => "approved",
            ReleasePlanStatus::Executing => "executing",
            ReleasePlanStatus::Succeeded => "succeeded",
            ReleasePlanStatus::Failed => "failed",
            ReleasePlanStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReleasePlanStatus::Succeeded | ReleasePlanStatus::Failed | ReleasePlanStatus::Cancelled
        )
    }

    fn rank(&self) -> u8 {
        match self {
            ReleasePlanStatus::Draft => 0,
            ReleasePlanStatus::PendingApproval => 1,
            ReleasePlanStatus::Approved => 2,
            ReleasePlanStatus::Executing => 3,
            ReleasePlanStatus::Succeeded
            | ReleasePlanStatus::Failed
            | ReleasePlanStatus::Cancelled => 4,
        }
    }

    /// Status only moves forward; terminal states are final.
    pub fn can_transition_to(&self, next: ReleasePlanStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }
}

impl std::fmt::Display for ReleasePlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// RELEASE JOBS
// =============================================================================

/// A release job as stored: the type tag and the still-untyped spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseJob {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub spec: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseJobType {
    Text,
    Workflow,
}

impl ReleaseJobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseJobType::Text => "text",
            ReleaseJobType::Workflow => "workflow",
        }
    }
}

impl std::fmt::Display for ReleaseJobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseJobType {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ReleaseJobType::Text),
            "workflow" => Ok(ReleaseJobType::Workflow),
            other => Err(ReleaseError::UnknownJobType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextReleaseJobSpec {
    pub content: String,
    #[serde(default)]
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReleaseJobSpec {
    /// `None` decodes fine; the linter rejects it.
    #[serde(default)]
    pub workflow: Option<WorkflowDefinition>,
}

/// Typed release job spec, one variant per [`ReleaseJobType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseJobSpec {
    Text(TextReleaseJobSpec),
    Workflow(WorkflowReleaseJobSpec),
}

impl ReleaseJobSpec {
    pub fn job_type(&self) -> ReleaseJobType {
        match self {
            ReleaseJobSpec::Text(_) => ReleaseJobType::Text,
            ReleaseJobSpec::Workflow(_) => ReleaseJobType::Workflow,
        }
    }
}
