//! Stage lookup over the jobs of one workflow.

use std::collections::HashMap;

use super::workflow::WorkflowDefinition;

/// Which stage each job name is declared in. The first declaration of a
/// name wins; the linter reports later duplicates when it reaches them.
pub struct JobIndex {
    stages: HashMap<String, usize>,
}

impl JobIndex {
    pub fn new(workflow: &WorkflowDefinition) -> Self {
        let mut stages = HashMap::new();
        for (stage, job) in workflow.jobs() {
            stages.entry(job.name.clone()).or_insert(stage);
        }
        JobIndex { stages }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    pub fn stage_of(&self, name: &str) -> Option<usize> {
        self.stages.get(name).copied()
    }
}
