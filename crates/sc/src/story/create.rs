//! Interactive story creation

use colored::Colorize;
use sc_core::shortcut::models::{EpicSlim, Group, Iteration, Member, Project};
use sc_core::shortcut::story::{parse_estimate, StoryInput, STORY_TYPES};
use sc_core::shortcut::workflow::default_state_id;

use crate::api::ShortcutClient;
use crate::prelude::{eprintln, println, *};
use crate::render;

use super::prompt;

const NO_PROJECTS: &str = "No projects available. Please create a project first.";
const NO_ACTIVE_PROJECTS: &str = "No active projects available. All projects are archived.";

/// Unarchived projects, or the reason a story cannot be filed
fn project_choices(projects: &[Project]) -> std::result::Result<Vec<(String, u64)>, &'static str> {
    if projects.is_empty() {
        return Err(NO_PROJECTS);
    }
    let choices: Vec<(String, u64)> = projects
        .iter()
        .filter(|p| !p.archived)
        .map(|p| (p.name.clone(), p.id))
        .collect();
    if choices.is_empty() {
        return Err(NO_ACTIVE_PROJECTS);
    }
    Ok(choices)
}

/// Owner choices: unassigned first, then every active member
fn owner_choices(members: &[Member]) -> Vec<(String, Option<String>)> {
    let mut choices = vec![("Unassigned".to_string(), None)];
    choices.extend(members.iter().filter(|m| !m.disabled).map(|m| {
        let label = match &m.profile.email_address {
            Some(email) => f!("{} ({email})", m.display_name()),
            None => m.display_name(),
        };
        (label, Some(m.id.clone()))
    }));
    choices
}

/// Unarchived epics belonging to `project_id`
fn epic_choices(epics: &[EpicSlim], project_id: u64) -> Vec<(String, Option<u64>)> {
    let mut choices = vec![("No epic".to_string(), None)];
    choices.extend(
        epics
            .iter()
            .filter(|e| !e.archived && e.project_ids.contains(&project_id))
            .map(|e| (e.name.clone(), Some(e.id))),
    );
    choices
}

/// Only iterations that can still take work are offered
fn iteration_choices(iterations: &[Iteration]) -> Vec<(String, Option<u64>)> {
    let mut choices = vec![("No iteration".to_string(), None)];
    choices.extend(
        iterations
            .iter()
            .filter(|i| i.status == "unstarted" || i.status == "started")
            .map(|i| (f!("{} ({})", i.name, i.status), Some(i.id))),
    );
    choices
}

fn team_choices(groups: &[Group]) -> Vec<(String, Option<String>)> {
    let mut choices = vec![("No team".to_string(), None)];
    choices.extend(
        groups
            .iter()
            .filter(|g| !g.archived)
            .map(|g| (g.name.clone(), Some(g.id.clone()))),
    );
    choices
}

pub async fn handler(client: &ShortcutClient) -> Result<()> {
    let projects = match client.list_projects().await {
        Ok(projects) => projects,
        Err(e) => {
            render::failed("fetching projects", e);
            return Ok(());
        }
    };
    let projects = match project_choices(&projects) {
        Ok(choices) => choices,
        Err(reason) => {
            eprintln!("{}", reason.red());
            return Ok(());
        }
    };

    let workflows = match client.list_workflows().await {
        Ok(workflows) => workflows,
        Err(e) => {
            render::failed("fetching workflows", e);
            return Ok(());
        }
    };
    let Some(state_id) = default_state_id(&workflows) else {
        eprintln!("{}", "Error: No workflow states found".red());
        return Ok(());
    };

    let (members, epics, iterations, groups) = match load_choices(client).await {
        Ok(choices) => choices,
        Err(e) => {
            render::failed("loading story options", e);
            return Ok(());
        }
    };

    let name = prompt::text("Story title", None)?;
    if name.trim().is_empty() {
        eprintln!("{}", "Story creation cancelled".red());
        return Ok(());
    }

    let types: Vec<String> = STORY_TYPES.iter().map(|t| t.to_string()).collect();
    let story_type = types[prompt::select("Story type", &types, 0)?].clone();
    let project_id = prompt::choose("Project", &projects)?;

    let description = prompt::text("Description (optional, press Enter to skip)", None)?;
    let estimate = parse_estimate(&prompt::text("Estimate in points (optional)", None)?);

    let owner_id = prompt::choose("Assign to", &owner_choices(&members))?;
    let epic_id = prompt::choose("Add to epic", &epic_choices(&epics, project_id))?;
    let iteration_id = prompt::choose("Add to iteration", &iteration_choices(&iterations))?;
    let group_id = prompt::choose("Assign to team", &team_choices(&groups))?;

    let mut input = StoryInput::new(name.trim(), story_type, state_id);
    input.project_id = Some(project_id);
    input.description = Some(description).filter(|d| !d.trim().is_empty());
    input.estimate = estimate;
    input.owner_ids = owner_id.into_iter().collect();
    input.epic_id = epic_id;
    input.iteration_id = iteration_id;
    input.group_id = group_id;

    match client.create_story(&input).await {
        Ok(story) => {
            println!();
            render::success(&f!("Created story #{}", story.id));
            if let Some(app_url) = &story.app_url {
                println!("{}", f!("View in browser: {app_url}").bright_black());
            }
        }
        Err(e) => render::failed("creating story", e),
    }

    Ok(())
}

async fn load_choices(
    client: &ShortcutClient,
) -> std::result::Result<(Vec<Member>, Vec<EpicSlim>, Vec<Iteration>, Vec<Group>), Error> {
    Ok((
        client.list_members().await?,
        client.list_epics().await?,
        client.list_iterations().await?,
        client.list_groups().await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::mock_shortcut;
    use serde_json::json;

    #[test]
    fn test_owner_choices_skip_disabled_members() {
        let members: Vec<Member> = serde_json::from_value(json!([
            {"id": "m1", "profile": {"name": "Sarah", "email_address": "sarah@example.com"}},
            {"id": "m2", "disabled": true, "profile": {"name": "Gone"}},
            {"id": "m3", "profile": {"mention_name": "bob"}},
        ]))
        .unwrap();

        let choices = owner_choices(&members);
        assert_eq!(
            choices,
            vec![
                ("Unassigned".to_string(), None),
                ("Sarah (sarah@example.com)".to_string(), Some("m1".to_string())),
                ("bob".to_string(), Some("m3".to_string())),
            ]
        );
    }

    #[test]
    fn test_iteration_choices_exclude_done() {
        let iterations: Vec<Iteration> = serde_json::from_value(json!([
            {"id": 1, "name": "Sprint 1", "status": "done"},
            {"id": 2, "name": "Sprint 2", "status": "started"},
            {"id": 3, "name": "Sprint 3", "status": "unstarted"},
        ]))
        .unwrap();

        let values: Vec<Option<u64>> = iteration_choices(&iterations)
            .into_iter()
            .map(|(_, id)| id)
            .collect();
        assert_eq!(values, vec![None, Some(2), Some(3)]);
    }

    fn projects(archived: &[bool]) -> Vec<Project> {
        archived
            .iter()
            .enumerate()
            .map(|(i, archived)| Project {
                id: i as u64 + 1,
                name: f!("Project {}", i + 1),
                archived: *archived,
            })
            .collect()
    }

    #[test]
    fn test_project_choices_without_projects() {
        assert_eq!(
            project_choices(&[]),
            Err("No projects available. Please create a project first.")
        );
    }

    #[test]
    fn test_project_choices_all_archived() {
        assert_eq!(
            project_choices(&projects(&[true, true])),
            Err("No active projects available. All projects are archived.")
        );
    }

    #[test]
    fn test_project_choices_skip_archived() {
        assert_eq!(
            project_choices(&projects(&[true, false])),
            Ok(vec![("Project 2".to_string(), 2)])
        );
    }

    #[tokio::test]
    async fn test_handler_stops_before_prompting_without_projects() {
        let (client, seen) = mock_shortcut(|line| {
            if line.starts_with("GET /api/v3/projects") {
                (200, r#"[{"id": 1, "name": "Old", "archived": true}]"#.to_string())
            } else {
                (500, String::new())
            }
        })
        .await;

        // Only the project list is fetched; nothing is prompted or created
        assert!(handler(&client).await.is_ok());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen.iter().any(|line| line.starts_with("POST")));
    }

    #[test]
    fn test_epic_choices_filtered_by_project() {
        let epics: Vec<EpicSlim> = serde_json::from_value(json!([
            {"id": 10, "name": "Auth Epic", "state": "to do", "project_ids": [1]},
            {"id": 11, "name": "API Epic", "state": "to do", "project_ids": [1, 2]},
            {"id": 12, "name": "Mobile Epic", "state": "to do", "project_ids": [2]},
            {"id": 13, "name": "Loose Epic", "state": "to do"},
        ]))
        .unwrap();

        let ids: Vec<Option<u64>> = epic_choices(&epics, 2).into_iter().map(|(_, id)| id).collect();
        assert_eq!(ids, vec![None, Some(11), Some(12)]);
    }

    #[test]
    fn test_epic_and_team_choices_exclude_archived() {
        let epics: Vec<EpicSlim> = serde_json::from_value(json!([
            {"id": 10, "name": "Login", "state": "in progress", "project_ids": [1]},
            {"id": 11, "name": "Old", "state": "done", "archived": true, "project_ids": [1]},
        ]))
        .unwrap();
        let groups: Vec<Group> = serde_json::from_value(json!([
            {"id": "g1", "name": "Backend"},
            {"id": "g2", "name": "Legacy", "archived": true},
        ]))
        .unwrap();

        assert_eq!(epic_choices(&epics, 1).len(), 2);
        assert_eq!(epic_choices(&epics, 1)[1], ("Login".to_string(), Some(10)));
        assert_eq!(team_choices(&groups)[1], ("Backend".to_string(), Some("g1".to_string())));
        assert_eq!(team_choices(&groups).len(), 2);
    }
}
