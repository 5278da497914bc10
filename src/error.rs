//! Unified error taxonomy shared by the decoder, linter, expander and
//! approval validator.
//!
//! Display strings are what gets surfaced to users; the structured fields
//! (job name, node index, provider) are what callers branch on.

use thiserror::Error;

use crate::parse::types::{ReleaseJobType, ReleasePlanStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Lint,
    Expand,
    Approval,
    UnknownType,
    Status,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Decode => write!(f, "Decode"),
            ErrorKind::Lint => write!(f, "Lint"),
            ErrorKind::Expand => write!(f, "Expand"),
            ErrorKind::Approval => write!(f, "Approval"),
            ErrorKind::UnknownType => write!(f, "Unknown Type"),
            ErrorKind::Status => write!(f, "Status"),
        }
    }
}

/// Payload shape does not match the declared release job type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {job_type} spec: {cause}")]
pub struct DecodeError {
    pub job_type: ReleaseJobType,
    pub cause: String,
}

/// A workflow job's static configuration violates its kind-specific rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintError {
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
    #[error("{0} is required")]
    MissingField(String),
    #[error("job name is duplicated in workflow")]
    DuplicateJobName,
    #[error("target {0} is declared more than once")]
    DuplicateTarget(String),
    #[error("parameter {key} is invalid: {reason}")]
    InvalidParam { key: String, reason: String },
    #[error("upstream job {0} does not exist")]
    UnknownUpstream(String),
    #[error("job cannot depend on itself")]
    SelfReference,
    #[error("upstream job {0} must be in an earlier stage")]
    UpstreamNotEarlier(String),
    #[error("upstream job {job} should be of type {expected}, found {found}")]
    InvalidUpstreamKind {
        job: String,
        expected: String,
        found: String,
    },
    #[error("unknown job type {0}")]
    UnknownJobKind(String),
    #[error("output name {0} is invalid")]
    InvalidOutput(String),
}

impl LintError {
    pub fn code(&self) -> &'static str {
        match self {
            LintError::InvalidSpec(_) => "L001",
            LintError::MissingField(_) => "L002",
            LintError::DuplicateJobName => "L003",
            LintError::DuplicateTarget(_) => "L004",
            LintError::InvalidParam { .. } => "L005",
            LintError::UnknownUpstream(_) => "L006",
            LintError::SelfReference => "L007",
            LintError::UpstreamNotEarlier(_) => "L008",
            LintError::InvalidUpstreamKind { .. } => "L009",
            LintError::UnknownJobKind(_) => "L010",
            LintError::InvalidOutput(_) => "L011",
        }
    }
}

/// A well-formed job that still cannot be expanded into runtime jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
    #[error("unresolved variable {{{{.{0}}}}}")]
    UnresolvedVariable(String),
    #[error("cyclic reference through parameter {0}")]
    CyclicReference(String),
    #[error("malformed expression: {0}")]
    MalformedExpression(String),
    #[error("{0} is empty, at least one runtime job is required")]
    EmptyEnumeration(String),
    #[error("job expands to {count} runtime jobs, the limit is {max}")]
    TooManyInstances { count: usize, max: usize },
    #[error("parameter {0} is declared more than once")]
    DuplicateParam(String),
}

impl ExpandError {
    pub fn code(&self) -> &'static str {
        match self {
            ExpandError::InvalidSpec(_) => "X001",
            ExpandError::UnresolvedVariable(_) => "X002",
            ExpandError::CyclicReference(_) => "X003",
            ExpandError::MalformedExpression(_) => "X004",
            ExpandError::EmptyEnumeration(_) => "X005",
            ExpandError::TooManyInstances { .. } => "X006",
            ExpandError::DuplicateParam(_) => "X007",
        }
    }
}

/// Structural problems in an approval gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalError {
    #[error("invalid approval type {0}")]
    UnknownProvider(String),
    #[error("approval not found")]
    NotFound { provider: String },
    #[error("all approve users should not less than needed approvers")]
    QuorumUnsatisfiable { approvers: usize, needed: usize },
    #[error("num of approval-node is 0")]
    NoNodes { provider: String },
    #[error("num of approval-node should not exceed {max}")]
    TooManyNodes { provider: String, max: usize },
    #[error("num of approval-node {index} approver is 0")]
    EmptyNode { provider: String, index: usize },
    #[error("approval-node {index} type should be AND or OR")]
    InvalidGateType {
        provider: String,
        index: usize,
        value: String,
    },
    #[error("Duplicate approvers {name} should not appear in a complete approval process")]
    DuplicateApprover {
        provider: String,
        index: usize,
        id: String,
        name: String,
    },
}

impl ApprovalError {
    pub fn code(&self) -> &'static str {
        match self {
            ApprovalError::UnknownProvider(_) => "A001",
            ApprovalError::NotFound { .. } => "A002",
            ApprovalError::QuorumUnsatisfiable { .. } => "A003",
            ApprovalError::NoNodes { .. } => "A004",
            ApprovalError::TooManyNodes { .. } => "A005",
            ApprovalError::EmptyNode { .. } => "A006",
            ApprovalError::InvalidGateType { .. } => "A007",
            ApprovalError::DuplicateApprover { .. } => "A008",
        }
    }

    pub fn node_index(&self) -> Option<usize> {
        match self {
            ApprovalError::EmptyNode { index, .. }
            | ApprovalError::InvalidGateType { index, .. }
            | ApprovalError::DuplicateApprover { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            ApprovalError::UnknownProvider(p) => Some(p),
            ApprovalError::QuorumUnsatisfiable { .. } => Some("native"),
            ApprovalError::NotFound { provider }
            | ApprovalError::NoNodes { provider }
            | ApprovalError::TooManyNodes { provider, .. }
            | ApprovalError::EmptyNode { provider, .. }
            | ApprovalError::InvalidGateType { provider, .. }
            | ApprovalError::DuplicateApprover { provider, .. } => Some(provider),
        }
    }
}

/// Boundary error returned by every public validation entry point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReleaseError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("workflow cannot be empty")]
    EmptyWorkflow,
    #[error("lint job-{job} err: {cause}")]
    Lint { job: String, cause: LintError },
    #[error("lint job-{job} runtime err: {cause}")]
    Expand { job: String, cause: ExpandError },
    #[error(transparent)]
    Approval(#[from] ApprovalError),
    #[error("invalid release job type: {0}")]
    UnknownJobType(String),
    #[error("release job {job}: {source}")]
    ReleaseJob {
        job: String,
        source: Box<ReleaseError>,
    },
    #[error("release plan status cannot move from {from} to {to}")]
    InvalidTransition {
        from: ReleasePlanStatus,
        to: ReleasePlanStatus,
    },
}

impl ReleaseError {
    pub fn lint(job: &str, cause: LintError) -> Self {
        ReleaseError::Lint {
            job: job.to_string(),
            cause,
        }
    }

    pub fn expand(job: &str, cause: ExpandError) -> Self {
        ReleaseError::Expand {
            job: job.to_string(),
            cause,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::Decode(_) => ErrorKind::Decode,
            ReleaseError::EmptyWorkflow | ReleaseError::Lint { .. } => ErrorKind::Lint,
            ReleaseError::Expand { .. } => ErrorKind::Expand,
            ReleaseError::Approval(ApprovalError::UnknownProvider(_)) => ErrorKind::UnknownType,
            ReleaseError::Approval(_) => ErrorKind::Approval,
            ReleaseError::UnknownJobType(_) => ErrorKind::UnknownType,
            ReleaseError::ReleaseJob { source, .. } => source.kind(),
            ReleaseError::InvalidTransition { .. } => ErrorKind::Status,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ReleaseError::Decode(_) => "D001",
            ReleaseError::EmptyWorkflow => "W001",
            ReleaseError::Lint { cause, .. } => cause.code(),
            ReleaseError::Expand { cause, .. } => cause.code(),
            ReleaseError::Approval(e) => e.code(),
            ReleaseError::UnknownJobType(_) => "T001",
            ReleaseError::ReleaseJob { source, .. } => source.code(),
            ReleaseError::InvalidTransition { .. } => "S001",
        }
    }

    /// Name of the innermost workflow job the error is attributed to.
    pub fn job_name(&self) -> Option<&str> {
        match self {
            ReleaseError::Lint { job, .. } | ReleaseError::Expand { job, .. } => Some(job),
            ReleaseError::ReleaseJob { source, .. } => source.job_name(),
            _ => None,
        }
    }

    pub fn release_job_name(&self) -> Option<&str> {
        match self {
            ReleaseError::ReleaseJob { job, .. } => Some(job),
            _ => None,
        }
    }

    pub fn node_index(&self) -> Option<usize> {
        match self {
            ReleaseError::Approval(e) => e.node_index(),
            _ => None,
        }
    }

    pub fn provider(&self) -> Option<&str> {
        match self {
            ReleaseError::Approval(e) => e.provider(),
            _ => None,
        }
    }
}
