//! Approval gate validation for every provider.

#[allow(dead_code)]
mod helpers;

use helpers::*;
use release_lint::config::LintConfig;
use release_lint::error::{ApprovalError, ErrorKind, ReleaseError};
use release_lint::parse::Approval;
use release_lint::validate::validate_approval;

fn check(approval: &Approval) -> Result<(), ApprovalError> {
    validate_approval(Some(approval), &LintConfig::default())
}

fn unique_nodes(count: usize) -> Vec<release_lint::parse::ApprovalNode> {
    (0..count)
        .map(|i| {
            let id = format!("d{i}");
            node(&[id.as_str()], "AND")
        })
        .collect()
}

// =============================================================================
// Inert gates
// =============================================================================

#[test]
fn missing_approval_is_valid() {
    assert!(validate_approval(None, &LintConfig::default()).is_ok());
}

#[test]
fn disabled_approval_is_not_inspected() {
    let approval = Approval {
        enabled: false,
        provider: "carrier-pigeon".into(),
        ..Default::default()
    };
    assert!(check(&approval).is_ok());
}

#[test]
fn unknown_provider() {
    let approval = Approval {
        enabled: true,
        provider: "carrier-pigeon".into(),
        ..Default::default()
    };
    let err = check(&approval).unwrap_err();
    assert_eq!(err.to_string(), "invalid approval type carrier-pigeon");
    assert_eq!(ReleaseError::from(err).kind(), ErrorKind::UnknownType);
}

#[test]
fn provider_block_missing() {
    let mut approval = lark(vec![node(&["u1"], "AND")]);
    approval.lark_approval = None;
    let err = check(&approval).unwrap_err();
    assert_eq!(err.to_string(), "approval not found");
    assert_eq!(err.code(), "A002");
    assert_eq!(err.provider(), Some("lark"));
}

// =============================================================================
// Native
// =============================================================================

#[test]
fn native_quorum_unsatisfiable() {
    let err = check(&native(3, 4)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "all approve users should not less than needed approvers"
    );
    assert_eq!(ReleaseError::from(err).kind(), ErrorKind::Approval);
}

#[test]
fn native_quorum_exactly_met() {
    assert!(check(&native(3, 3)).is_ok());
}

// =============================================================================
// Lark
// =============================================================================

#[test]
fn lark_without_nodes() {
    let err = check(&lark(vec![])).unwrap_err();
    assert_eq!(err.to_string(), "num of approval-node is 0");
}

#[test]
fn lark_empty_node() {
    let err = check(&lark(vec![node(&["u1"], "AND"), node(&[], "OR")])).unwrap_err();
    assert_eq!(err.to_string(), "num of approval-node 1 approver is 0");
    assert_eq!(err.node_index(), Some(1));
}

#[test]
fn lark_invalid_gate_type() {
    let err = check(&lark(vec![node(&["u1"], "XOR")])).unwrap_err();
    assert_eq!(err.to_string(), "approval-node 0 type should be AND or OR");
    assert_eq!(err.code(), "A007");
}

#[test]
fn lark_allows_repeated_approvers() {
    assert!(check(&lark(vec![node(&["u1"], "AND"), node(&["u1"], "OR")])).is_ok());
}

// =============================================================================
// DingTalk
// =============================================================================

#[test]
fn dingtalk_too_many_nodes() {
    let err = check(&dingtalk(unique_nodes(21))).unwrap_err();
    assert_eq!(err.to_string(), "num of approval-node should not exceed 20");
}

#[test]
fn dingtalk_node_limit_is_inclusive() {
    assert!(check(&dingtalk(unique_nodes(20))).is_ok());
}

#[test]
fn dingtalk_without_nodes() {
    let err = check(&dingtalk(vec![])).unwrap_err();
    assert_eq!(err.to_string(), "num of approval-node is 0");
    assert_eq!(err.provider(), Some("dingtalk"));
}

#[test]
fn dingtalk_duplicate_across_nodes() {
    let err = check(&dingtalk(vec![
        node(&["u1", "u2"], "AND"),
        node(&["u3", "u1"], "OR"),
    ]))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Duplicate approvers user u1 should not appear in a complete approval process"
    );
    assert_eq!(err.node_index(), Some(1));
    assert_eq!(err.code(), "A008");
}

#[test]
fn dingtalk_duplicate_within_node() {
    let err = check(&dingtalk(vec![node(&["u1", "u1"], "AND")])).unwrap_err();
    assert_eq!(err.node_index(), Some(0));
}

#[test]
fn dingtalk_invalid_gate_type() {
    let err = check(&dingtalk(vec![node(&["u1"], "AND"), node(&["u2"], "XOR")])).unwrap_err();
    assert_eq!(err.to_string(), "approval-node 1 type should be AND or OR");
    assert_eq!(err.node_index(), Some(1));
    assert_eq!(err.provider(), Some("dingtalk"));
}

#[test]
fn dingtalk_duplicate_before_gate_type() {
    let err = check(&dingtalk(vec![node(&["u1"], "AND"), node(&["u1"], "XOR")])).unwrap_err();
    assert_eq!(err.code(), "A008");
    assert_eq!(err.node_index(), Some(1));
}

#[test]
fn dingtalk_empty_node_before_gate_type() {
    let err = check(&dingtalk(vec![node(&[], "XOR")])).unwrap_err();
    assert_eq!(err.code(), "A006");
}

#[test]
fn dingtalk_node_limit_from_config() {
    let config = LintConfig {
        dingtalk_max_nodes: 2,
        ..LintConfig::default()
    };
    let err = validate_approval(Some(&dingtalk(unique_nodes(3))), &config).unwrap_err();
    assert_eq!(err.to_string(), "num of approval-node should not exceed 2");
    assert!(validate_approval(Some(&dingtalk(unique_nodes(2))), &config).is_ok());
}
