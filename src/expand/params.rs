//! Workflow parameter resolution.
//!
//! Parameters may reference each other through `{{.workflow.params.<p>}}`.
//! They are resolved in dependency order; any cycle is an error.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use super::reference;
use crate::error::ExpandError;
use crate::parse::workflow::WorkflowDefinition;

const PARAM_PREFIX: &str = "workflow.params.";

pub fn resolve_params(workflow: &WorkflowDefinition) -> Result<BTreeMap<String, String>, ExpandError> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut indices = HashMap::new();
    let mut values = HashMap::new();

    for param in &workflow.params {
        if indices.contains_key(param.name.as_str()) {
            return Err(ExpandError::DuplicateParam(param.name.clone()));
        }
        indices.insert(param.name.as_str(), graph.add_node(param.name.as_str()));
        values.insert(param.name.as_str(), param.value.as_str());
    }

    for param in &workflow.params {
        reference::parse_template(&param.value)?;
        let target = indices[param.name.as_str()];
        for path in reference::references(&param.value) {
            let Some(dep) = path.strip_prefix(PARAM_PREFIX) else {
                continue;
            };
            let Some(&source) = indices.get(dep) else {
                return Err(ExpandError::UnresolvedVariable(path.to_string()));
            };
            graph.update_edge(source, target, ());
        }
    }

    let order = toposort(&graph, None)
        .map_err(|cycle| ExpandError::CyclicReference(graph[cycle.node_id()].to_string()))?;

    let mut resolved = BTreeMap::new();
    for idx in order {
        let name = graph[idx];
        let value = reference::render(values[name], |path| {
            if let Some(dep) = path.strip_prefix(PARAM_PREFIX) {
                return resolved
                    .get(dep)
                    .cloned()
                    .ok_or_else(|| ExpandError::UnresolvedVariable(path.to_string()));
            }
            match path {
                "workflow.name" => Ok(workflow.name.clone()),
                "workflow.project" => Ok(workflow.project.clone()),
                _ => Err(ExpandError::UnresolvedVariable(path.to_string())),
            }
        })?;
        resolved.insert(name.to_string(), value);
    }

    Ok(resolved)
}
