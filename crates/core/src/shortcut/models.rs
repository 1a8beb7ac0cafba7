//! Shortcut REST API (v3) response models

use serde::{Deserialize, Serialize};

/// Team (the API calls them groups)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mention_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub entity_type: Option<String>,
}

/// Workspace member
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    pub profile: Profile,
}

/// Member profile
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Profile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub mention_name: Option<String>,
}

impl Member {
    /// Name shown in tables: profile name, then mention name, then the raw id.
    pub fn display_name(&self) -> String {
        self.profile
            .name
            .clone()
            .or_else(|| self.profile.mention_name.clone())
            .unwrap_or_else(|| self.id.clone())
    }
}

/// Workflow with its ordered list of states
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub states: Vec<WorkflowState>,
}

/// A single workflow state
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WorkflowState {
    pub id: u64,
    pub name: String,
    /// One of `unstarted`, `started`, `done`
    #[serde(rename = "type", default)]
    pub state_type: Option<String>,
}

/// Story counters attached to an iteration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct IterationStats {
    #[serde(default)]
    pub num_stories_done: u64,
    #[serde(default)]
    pub num_stories_started: u64,
    #[serde(default)]
    pub num_stories_unstarted: u64,
}

impl IterationStats {
    pub fn story_count(&self) -> u64 {
        self.num_stories_done + self.num_stories_started + self.num_stories_unstarted
    }
}

/// Iteration (sprint)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Iteration {
    pub id: u64,
    pub name: String,
    /// One of `unstarted`, `started`, `done`
    pub status: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stats: Option<IterationStats>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub app_url: Option<String>,
}

impl Iteration {
    pub fn story_count(&self) -> u64 {
        self.stats.as_ref().map(IterationStats::story_count).unwrap_or(0)
    }
}

/// Story as returned by the search endpoint
///
/// `id`, `name`, `story_type` and `workflow_state_id` are required; a payload
/// missing any of them fails the structured parse and triggers the raw fallback.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorySlim {
    pub id: u64,
    pub name: String,
    pub story_type: String,
    pub workflow_state_id: u64,
    #[serde(default)]
    pub estimate: Option<u32>,
    #[serde(default)]
    pub owner_ids: Vec<String>,
    #[serde(default)]
    pub epic_id: Option<u64>,
    #[serde(default)]
    pub iteration_id: Option<u64>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub app_url: Option<String>,
}

/// Story label
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Label {
    pub name: String,
}

/// Story checklist task
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Task {
    pub description: String,
    #[serde(default)]
    pub complete: bool,
}

/// Story comment
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub text: Option<String>,
}

/// Full story returned by `GET /stories/{id}`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Story {
    pub id: u64,
    pub name: String,
    pub story_type: String,
    pub workflow_state_id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimate: Option<u32>,
    #[serde(default)]
    pub owner_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub blocker: bool,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub epic_id: Option<u64>,
    #[serde(default)]
    pub iteration_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub app_url: Option<String>,
}

/// Story counters attached to an epic
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct EpicStats {
    #[serde(default)]
    pub num_stories_done: u64,
    #[serde(default)]
    pub num_stories_started: u64,
    #[serde(default)]
    pub num_stories_unstarted: u64,
    #[serde(default)]
    pub num_stories_backlog: u64,
}

impl EpicStats {
    pub fn story_count(&self) -> u64 {
        self.num_stories_done
            + self.num_stories_started
            + self.num_stories_unstarted
            + self.num_stories_backlog
    }
}

/// Epic as returned by `GET /epics` and the epic search endpoint
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EpicSlim {
    pub id: u64,
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub stats: Option<EpicStats>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub project_ids: Vec<u64>,
    #[serde(default)]
    pub app_url: Option<String>,
}

/// Project a story can be filed under
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub archived: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_slim_ignores_unknown_fields() {
        let json = r#"{
            "id": 12,
            "name": "Login page",
            "story_type": "feature",
            "workflow_state_id": 500,
            "estimate": 3,
            "owner_ids": ["a-1"],
            "entity_type": "story",
            "position": 42
        }"#;

        let story: StorySlim = serde_json::from_str(json).unwrap();
        assert_eq!(story.id, 12);
        assert_eq!(story.estimate, Some(3));
        assert_eq!(story.owner_ids, vec!["a-1".to_string()]);
        assert!(!story.blocked);
    }

    #[test]
    fn test_story_slim_requires_workflow_state() {
        let json = r#"{"id": 12, "name": "Login page", "story_type": "feature"}"#;
        assert!(serde_json::from_str::<StorySlim>(json).is_err());
    }

    #[test]
    fn test_workflow_state_type_rename() {
        let json = r#"{"id": 1, "name": "Dev", "states": [{"id": 7, "name": "Done", "type": "done"}]}"#;
        let workflow: Workflow = serde_json::from_str(json).unwrap();
        assert_eq!(workflow.states[0].state_type.as_deref(), Some("done"));
    }

    #[test]
    fn test_iteration_story_count() {
        let json = r#"{
            "id": 3,
            "name": "Sprint 3",
            "status": "started",
            "stats": {"num_stories_done": 2, "num_stories_started": 1, "num_stories_unstarted": 4}
        }"#;
        let iteration: Iteration = serde_json::from_str(json).unwrap();
        assert_eq!(iteration.story_count(), 7);
    }

    #[test]
    fn test_iteration_story_count_without_stats() {
        let json = r#"{"id": 3, "name": "Sprint 3", "status": "unstarted"}"#;
        let iteration: Iteration = serde_json::from_str(json).unwrap();
        assert_eq!(iteration.story_count(), 0);
    }

    #[test]
    fn test_epic_and_project_defaults() {
        let epic: EpicSlim =
            serde_json::from_str(r#"{"id": 10, "name": "Auth Epic", "state": "to do"}"#).unwrap();
        assert!(epic.project_ids.is_empty());
        assert!(!epic.archived);

        let project: Project =
            serde_json::from_str(r#"{"id": 1, "name": "API Backend", "archived": true}"#).unwrap();
        assert!(project.archived);
    }

    #[test]
    fn test_member_display_name_fallbacks() {
        let mut member = Member {
            id: "m-1".to_string(),
            role: None,
            disabled: false,
            profile: Profile {
                name: None,
                email_address: None,
                mention_name: Some("sarah".to_string()),
            },
        };
        assert_eq!(member.display_name(), "sarah");

        member.profile.mention_name = None;
        assert_eq!(member.display_name(), "m-1");
    }
}
