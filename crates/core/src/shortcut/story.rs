//! Story identifiers and request bodies

use regex::Regex;
use serde::Serialize;

/// Story types accepted by the API
pub const STORY_TYPES: [&str; 3] = ["feature", "bug", "chore"];

/// Parse a story reference into its numeric id
///
/// Accepts `123`, `#123`, `sc-123` or an app URL such as
/// `https://app.shortcut.com/acme/story/123/some-slug`.
pub fn parse_story_id(input: &str) -> Option<u64> {
    let input = input.trim();
    let bare = input.trim_start_matches('#').to_lowercase();
    let bare = bare.strip_prefix("sc-").unwrap_or(&bare);

    if let Ok(id) = bare.parse::<u64>() {
        return Some(id);
    }

    let re = Regex::new(r"/story/(\d+)").ok()?;
    re.captures(input)?.get(1)?.as_str().parse().ok()
}

/// Parse an estimate answer; anything but plain digits means "no estimate"
pub fn parse_estimate(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

/// Body of `POST /stories`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StoryInput {
    pub name: String,
    pub story_type: String,
    pub workflow_state_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl StoryInput {
    pub fn new(name: impl Into<String>, story_type: impl Into<String>, workflow_state_id: u64) -> Self {
        Self {
            name: name.into(),
            story_type: story_type.into(),
            workflow_state_id,
            project_id: None,
            description: None,
            estimate: None,
            owner_ids: Vec::new(),
            epic_id: None,
            iteration_id: None,
            group_id: None,
        }
    }
}

/// Body of `PUT /stories/{id}`; unset fields are left untouched by the API
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct StoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_state_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iteration_id: Option<u64>,
}

impl StoryUpdate {
    pub fn move_to(workflow_state_id: u64) -> Self {
        Self {
            workflow_state_id: Some(workflow_state_id),
            ..Self::default()
        }
    }

    pub fn blocked(blocked: bool) -> Self {
        Self {
            blocked: Some(blocked),
            ..Self::default()
        }
    }

    /// Replace the owners with a single member
    pub fn assign(member_id: impl Into<String>) -> Self {
        Self {
            owner_ids: Some(vec![member_id.into()]),
            ..Self::default()
        }
    }

    pub fn team(group_id: impl Into<String>) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Self::default()
        }
    }

    pub fn epic(epic_id: u64) -> Self {
        Self {
            epic_id: Some(epic_id),
            ..Self::default()
        }
    }

    pub fn iteration(iteration_id: u64) -> Self {
        Self {
            iteration_id: Some(iteration_id),
            ..Self::default()
        }
    }

    /// True when the update would not change anything
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `POST /stories/{id}/comments`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentInput {
    pub text: String,
}

/// Comment recorded when a story is blocked with a reason
pub fn block_comment(reason: &str) -> CommentInput {
    CommentInput {
        text: format!("Blocked: {}", reason.trim()),
    }
}
