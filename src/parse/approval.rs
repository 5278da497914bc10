//! Approval gate wire types.
//!
//! The stored shape keeps one optional block per provider next to a free-form
//! `type` tag. [`Approval::gate`] turns that into [`ApprovalGate`], which has
//! exactly one provider block.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ApprovalError;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Approval {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type", default)]
    pub provider: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub native_approval: Option<NativeApproval>,
    #[serde(default)]
    pub lark_approval: Option<NodeApproval>,
    #[serde(default)]
    pub dingtalk_approval: Option<NodeApproval>,
}

impl Approval {
    pub fn gate(&self) -> Result<ApprovalGate<'_>, ApprovalError> {
        let provider: ApprovalProvider = self.provider.parse()?;
        let not_found = || ApprovalError::NotFound {
            provider: provider.to_string(),
        };
        match provider {
            ApprovalProvider::Native => self
                .native_approval
                .as_ref()
                .map(ApprovalGate::Native)
                .ok_or_else(not_found),
            ApprovalProvider::Lark => self
                .lark_approval
                .as_ref()
                .map(ApprovalGate::Lark)
                .ok_or_else(not_found),
            ApprovalProvider::DingTalk => self
                .dingtalk_approval
                .as_ref()
                .map(ApprovalGate::DingTalk)
                .ok_or_else(not_found),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalGate<'a> {
    Native(&'a NativeApproval),
    Lark(&'a NodeApproval),
    DingTalk(&'a NodeApproval),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApprovalProvider {
    Native,
    Lark,
    DingTalk,
}

impl ApprovalProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalProvider::Native => "native",
            ApprovalProvider::Lark => "lark",
            ApprovalProvider::DingTalk => "dingtalk",
        }
    }
}

impl std::fmt::Display for ApprovalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalProvider {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "native" => Ok(ApprovalProvider::Native),
            "lark" => Ok(ApprovalProvider::Lark),
            "dingtalk" => Ok(ApprovalProvider::DingTalk),
            other => Err(ApprovalError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NativeApproval {
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub approve_users: Vec<ApprovalUser>,
    #[serde(default)]
    pub needed_approvers: usize,
}

/// Node-based approval, shared by the Lark and DingTalk providers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeApproval {
    #[serde(default)]
    pub timeout: u32,
    #[serde(default)]
    pub approval_nodes: Vec<ApprovalNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalNode {
    #[serde(default)]
    pub approve_users: Vec<ApprovalUser>,
    /// Raw gating tag; see [`GateType`].
    #[serde(rename = "type", default)]
    pub gate: String,
}

impl ApprovalNode {
    pub fn gate_type(&self) -> Option<GateType> {
        self.gate.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApprovalUser {
    #[serde(alias = "user_id")]
    pub id: String,
    #[serde(default, alias = "user_name")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateType {
    And,
    Or,
}

impl FromStr for GateType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(GateType::And),
            "OR" => Ok(GateType::Or),
            _ => Err(()),
        }
    }
}
