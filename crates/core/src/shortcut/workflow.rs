//! Workflow-state lookups

use std::collections::{HashMap, HashSet};

use super::models::Workflow;

/// Name shown for a state id that no workflow declares
pub const UNKNOWN_STATE: &str = "Unknown";

/// Workflow-state id to name, flattened across every workflow
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowStateMap(HashMap<u64, String>);

impl WorkflowStateMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(u64, String)> for WorkflowStateMap {
    fn from_iter<I: IntoIterator<Item = (u64, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Flatten the states of every workflow into a single map
pub fn build_state_map(workflows: &[Workflow]) -> WorkflowStateMap {
    workflows
        .iter()
        .flat_map(|workflow| workflow.states.iter())
        .map(|state| (state.id, state.name.clone()))
        .collect()
}

/// Name of a workflow state, or [`UNKNOWN_STATE`]
pub fn resolve_state_name(map: &WorkflowStateMap, state_id: u64) -> &str {
    map.0.get(&state_id).map(String::as_str).unwrap_or(UNKNOWN_STATE)
}

/// Same as [`resolve_state_name`] for records whose state id may be missing
pub fn resolve_optional_state_name(map: &WorkflowStateMap, state_id: Option<u64>) -> &str {
    state_id
        .map(|id| resolve_state_name(map, id))
        .unwrap_or(UNKNOWN_STATE)
}

/// Find a state id by name, case-insensitively, across all workflows
pub fn find_state_id(workflows: &[Workflow], name: &str) -> Option<u64> {
    let needle = name.trim().to_lowercase();
    workflows
        .iter()
        .flat_map(|workflow| workflow.states.iter())
        .find(|state| state.name.to_lowercase() == needle)
        .map(|state| state.id)
}

/// Ids of every state whose type is `done`
pub fn done_state_ids(workflows: &[Workflow]) -> HashSet<u64> {
    workflows
        .iter()
        .flat_map(|workflow| workflow.states.iter())
        .filter(|state| state.state_type.as_deref() == Some("done"))
        .map(|state| state.id)
        .collect()
}

/// First state of the first workflow; new stories start there
pub fn default_state_id(workflows: &[Workflow]) -> Option<u64> {
    workflows
        .first()
        .and_then(|workflow| workflow.states.first())
        .map(|state| state.id)
}
