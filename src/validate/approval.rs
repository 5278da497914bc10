//! Approval gate validation.
//!
//! Structural checks only; no provider API is contacted. Every check fails
//! on the first violation, walking nodes in index order.

use std::collections::HashSet;

use crate::config::LintConfig;
use crate::error::ApprovalError;
use crate::parse::approval::{Approval, ApprovalGate, ApprovalNode, NativeApproval};

const LARK: &str = "lark";
const DINGTALK: &str = "dingtalk";

/// Validate `approval`. A missing or disabled gate is always valid.
pub fn validate_approval(approval: Option<&Approval>, config: &LintConfig) -> Result<(), ApprovalError> {
    let Some(approval) = approval else {
        return Ok(());
    };
    if !approval.enabled {
        return Ok(());
    }

    match approval.gate()? {
        ApprovalGate::Native(native) => validate_native(native),
        ApprovalGate::Lark(lark) => validate_lark(&lark.approval_nodes),
        ApprovalGate::DingTalk(dingtalk) => {
            validate_dingtalk(&dingtalk.approval_nodes, config.dingtalk_max_nodes)
        }
    }
}

fn validate_native(native: &NativeApproval) -> Result<(), ApprovalError> {
    if native.approve_users.len() < native.needed_approvers {
        return Err(ApprovalError::QuorumUnsatisfiable {
            approvers: native.approve_users.len(),
            needed: native.needed_approvers,
        });
    }
    Ok(())
}

fn validate_lark(nodes: &[ApprovalNode]) -> Result<(), ApprovalError> {
    if nodes.is_empty() {
        return Err(ApprovalError::NoNodes {
            provider: LARK.into(),
        });
    }
    for (index, node) in nodes.iter().enumerate() {
        check_not_empty(LARK, index, node)?;
        check_gate_type(LARK, index, node)?;
    }
    Ok(())
}

/// DingTalk additionally caps the node count and rejects an approver that
/// appears anywhere twice in the process, even across different nodes.
fn validate_dingtalk(nodes: &[ApprovalNode], max_nodes: usize) -> Result<(), ApprovalError> {
    if nodes.len() > max_nodes {
        return Err(ApprovalError::TooManyNodes {
            provider: DINGTALK.into(),
            max: max_nodes,
        });
    }
    if nodes.is_empty() {
        return Err(ApprovalError::NoNodes {
            provider: DINGTALK.into(),
        });
    }

    let mut seen = HashSet::new();
    for (index, node) in nodes.iter().enumerate() {
        check_not_empty(DINGTALK, index, node)?;
        for user in &node.approve_users {
            if !seen.insert(user.id.as_str()) {
                return Err(ApprovalError::DuplicateApprover {
                    provider: DINGTALK.into(),
                    index,
                    id: user.id.clone(),
                    name: user.name.clone(),
                });
            }
        }
        check_gate_type(DINGTALK, index, node)?;
    }
    Ok(())
}

fn check_not_empty(provider: &str, index: usize, node: &ApprovalNode) -> Result<(), ApprovalError> {
    if node.approve_users.is_empty() {
        return Err(ApprovalError::EmptyNode {
            provider: provider.into(),
            index,
        });
    }
    Ok(())
}

fn check_gate_type(provider: &str, index: usize, node: &ApprovalNode) -> Result<(), ApprovalError> {
    if node.gate_type().is_none() {
        return Err(ApprovalError::InvalidGateType {
            provider: provider.into(),
            index,
            value: node.gate.clone(),
        });
    }
    Ok(())
}
