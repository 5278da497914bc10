//! Limits applied by the linter and the approval validator.

use serde::{Deserialize, Serialize};

/// DingTalk rejects approval processes with more nodes than this.
pub const DEFAULT_DINGTALK_MAX_NODES: usize = 20;
pub const DEFAULT_MAX_RUNTIME_JOBS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    pub dingtalk_max_nodes: usize,
    /// Upper bound on the runtime jobs a single declared job may expand to.
    pub max_runtime_jobs: usize,
}

impl Default for LintConfig {
    fn default() -> Self {
        LintConfig {
            dingtalk_max_nodes: DEFAULT_DINGTALK_MAX_NODES,
            max_runtime_jobs: DEFAULT_MAX_RUNTIME_JOBS,
        }
    }
}

impl LintConfig {
    /// Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
