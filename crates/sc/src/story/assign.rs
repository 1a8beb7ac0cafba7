//! Owner, team, epic and iteration assignment

use clap::Args;
use colored::Colorize;
use sc_core::shortcut::member::find_member_id;
use sc_core::shortcut::models::Group;
use sc_core::shortcut::story::StoryUpdate;
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::{eprintln, *};
use crate::render;

/// Member alias for the owner of the API token
const ME: &str = "@me";

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct AssignOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Member name, email or mention name (`@me` for yourself)
    pub member: String,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct TeamOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Team ID, name or mention name
    pub team: String,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct EpicOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Epic ID
    pub epic_id: u64,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct IterationOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Iteration ID
    pub iteration_id: u64,
}

/// Find a team by exact id, or by case-insensitive name or mention name
fn find_group<'a>(groups: &'a [Group], needle: &str) -> Option<&'a Group> {
    let needle = needle.trim();
    groups.iter().find(|g| g.id == needle).or_else(|| {
        let lowered = needle.trim_start_matches('@').to_lowercase();
        groups.iter().find(|g| {
            g.name.to_lowercase() == lowered
                || g.mention_name.as_deref().map(str::to_lowercase) == Some(lowered.clone())
        })
    })
}

/// Member id for `member`, or `None` after printing why
async fn resolve_member(client: &ShortcutClient, member: &str) -> Option<(String, String)> {
    if member == ME {
        return match client.current_member().await {
            Ok(me) => Some((me.id.clone(), me.display_name())),
            Err(e) => {
                render::failed("fetching current member", e);
                None
            }
        };
    }

    let members = match client.list_members().await {
        Ok(members) => members,
        Err(e) => {
            render::failed("listing members", e);
            return None;
        }
    };

    let found = find_member_id(&members, member)
        .and_then(|id| members.iter().find(|m| m.id == id))
        .map(|m| (m.id.clone(), m.display_name()));
    if found.is_none() {
        eprintln!("{}", f!("Error: No member matching '{member}'").red());
    }
    found
}

pub async fn assign_handler(client: &ShortcutClient, options: AssignOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };
    let Some((member_id, member_name)) = resolve_member(client, &options.member).await else {
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::assign(member_id),
        &f!("Assigned story #{story_id} to {member_name}"),
    )
    .await;

    Ok(())
}

pub async fn team_handler(client: &ShortcutClient, options: TeamOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    let groups = match client.list_groups().await {
        Ok(groups) => groups,
        Err(e) => {
            render::failed("listing teams", e);
            return Ok(());
        }
    };
    let Some(group) = find_group(&groups, &options.team) else {
        eprintln!("{}", f!("Error: No team matching '{}'", options.team).red());
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::team(group.id.clone()),
        &f!("Assigned story #{story_id} to team {}", group.name),
    )
    .await;

    Ok(())
}

pub async fn epic_handler(client: &ShortcutClient, options: EpicOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::epic(options.epic_id),
        &f!("Added story #{story_id} to epic {}", options.epic_id),
    )
    .await;

    Ok(())
}

pub async fn iteration_handler(client: &ShortcutClient, options: IterationOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::iteration(options.iteration_id),
        &f!(
            "Added story #{story_id} to iteration {}",
            options.iteration_id
        ),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn groups() -> Vec<Group> {
        serde_json::from_value(json!([
            {"id": "5f1e-aa", "name": "Backend", "mention_name": "backend-team"},
            {"id": "5f1e-bb", "name": "Mobile Apps"},
        ]))
        .unwrap()
    }

    #[test]
    fn test_find_group_by_id() {
        let groups = groups();
        assert_eq!(find_group(&groups, "5f1e-bb").map(|g| g.name.as_str()), Some("Mobile Apps"));
    }

    #[test]
    fn test_find_group_by_name_case_insensitive() {
        let groups = groups();
        assert_eq!(find_group(&groups, "mobile apps").map(|g| g.id.as_str()), Some("5f1e-bb"));
    }

    #[test]
    fn test_find_group_by_mention_name() {
        let groups = groups();
        assert_eq!(find_group(&groups, "@backend-team").map(|g| g.id.as_str()), Some("5f1e-aa"));
    }

    #[test]
    fn test_find_group_no_match() {
        assert!(find_group(&groups(), "Design").is_none());
    }
}
