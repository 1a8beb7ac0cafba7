pub mod assign;
pub mod create;
pub mod delete;
pub mod edit;
pub mod prompt;
pub mod search;
pub mod view;
pub mod workflow;

use std::collections::HashMap;

use colored::Colorize;
use sc_core::shortcut::display::{short_date, EMPTY};
use sc_core::shortcut::member::{owner_labels, UNASSIGNED};
use sc_core::shortcut::models::Story;
use sc_core::shortcut::story::{parse_story_id, StoryUpdate};
use sc_core::shortcut::workflow::{resolve_state_name, WorkflowStateMap};
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::config::Config;
use crate::prelude::{eprintln, println, *};
use crate::render;

#[derive(Debug, clap::Parser)]
#[command(name = "story")]
#[command(about = "Manage Shortcut stories")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

/// Story commands
#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search for stories using Shortcut's search syntax
    #[clap(name = "search")]
    Search(search::SearchOptions),

    /// View detailed information about a story
    #[clap(name = "view")]
    View(view::ViewOptions),

    /// Create a new story (interactive)
    #[clap(name = "create")]
    Create,

    /// Edit an existing story
    #[clap(name = "edit")]
    Edit(edit::EditOptions),

    /// Delete a story
    #[clap(name = "delete")]
    Delete(delete::DeleteOptions),

    /// Move a story to a different workflow state
    #[clap(name = "move")]
    Move(workflow::MoveOptions),

    /// Move a story to 'In Progress'
    #[clap(name = "start")]
    Start(StoryIdOptions),

    /// Move a story to 'Done'
    #[clap(name = "finish")]
    Finish(StoryIdOptions),

    /// Mark a story as blocked
    #[clap(name = "block")]
    Block(workflow::BlockOptions),

    /// Clear the blocked flag of a story
    #[clap(name = "unblock")]
    Unblock(StoryIdOptions),

    /// Assign a story to a member
    #[clap(name = "assign")]
    Assign(assign::AssignOptions),

    /// Assign a story to a team
    #[clap(name = "team")]
    Team(assign::TeamOptions),

    /// Add a story to an epic
    #[clap(name = "epic")]
    Epic(assign::EpicOptions),

    /// Add a story to an iteration
    #[clap(name = "iteration")]
    Iteration(assign::IterationOptions),
}

/// Options for commands that only take a story reference
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct StoryIdOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,
}

pub async fn run(app: App, config: &Config) -> Result<()> {
    let client = ShortcutClient::new(config)?;

    match app.command {
        Commands::Search(options) => search::handler(&client, options).await,
        Commands::View(options) => view::handler(&client, options).await,
        Commands::Create => create::handler(&client).await,
        Commands::Edit(options) => edit::handler(&client, options).await,
        Commands::Delete(options) => delete::handler(&client, options).await,
        Commands::Move(options) => workflow::move_handler(&client, options).await,
        Commands::Start(options) => workflow::start_handler(&client, options).await,
        Commands::Finish(options) => workflow::finish_handler(&client, options).await,
        Commands::Block(options) => workflow::block_handler(&client, options).await,
        Commands::Unblock(options) => workflow::unblock_handler(&client, options).await,
        Commands::Assign(options) => assign::assign_handler(&client, options).await,
        Commands::Team(options) => assign::team_handler(&client, options).await,
        Commands::Epic(options) => assign::epic_handler(&client, options).await,
        Commands::Iteration(options) => assign::iteration_handler(&client, options).await,
    }
}

/// Parse a story reference, printing an error when it isn't one
fn story_id(input: &str) -> Option<u64> {
    let id = parse_story_id(input);
    if id.is_none() {
        eprintln!("{}", f!("Error: '{input}' is not a valid story ID").red());
    }
    id
}

/// Report an error from a call addressing a single story
fn report(story_id: u64, context: &str, err: Error) {
    match err {
        Error::NotFound(_) => render::lookup_failed("story", story_id, &err),
        other => render::failed(context, other),
    }
}

/// Send a story update and print `message` on success
async fn apply_update(
    client: &ShortcutClient,
    story_id: u64,
    update: &StoryUpdate,
    message: &str,
) -> Option<Story> {
    match client.update_story(story_id, update).await {
        Ok(story) => {
            render::success(message);
            Some(story)
        }
        Err(e) => {
            report(story_id, "updating story", e);
            None
        }
    }
}

/// Print a story's details.
///
/// Renders the view used by `story view`: metadata table, description,
/// tasks, comment count and the browser link.
fn display_story(story: &Story, states: &WorkflowStateMap, owners: &HashMap<String, String>) {
    println!(
        "\n{} - {}\n",
        f!("Story #{}", story.id).bold().cyan(),
        story.name.bright_white()
    );

    let owner_names = owner_labels(&story.owner_ids, owners);
    let owners_colored = if owner_names.is_empty() {
        UNASSIGNED.bright_black().to_string()
    } else {
        owner_names.join(", ").bright_magenta().to_string()
    };

    let mut table = new_table();
    table.add_row(prettytable::row!["ID".bold().cyan(), story.id]);
    table.add_row(prettytable::row![
        "Type".bold().cyan(),
        story.story_type.bright_yellow().to_string()
    ]);
    table.add_row(prettytable::row![
        "State".bold().cyan(),
        resolve_state_name(states, story.workflow_state_id)
            .green()
            .to_string()
    ]);
    table.add_row(prettytable::row!["Owners".bold().cyan(), owners_colored]);
    table.add_row(prettytable::row![
        "Estimate".bold().cyan(),
        story
            .estimate
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unestimated".to_string())
    ]);
    table.add_row(prettytable::row![
        "Created".bold().cyan(),
        short_date(story.created_at.as_deref()).bright_black().to_string()
    ]);
    table.add_row(prettytable::row![
        "Updated".bold().cyan(),
        short_date(story.updated_at.as_deref()).bright_black().to_string()
    ]);
    if story.started_at.is_some() {
        table.add_row(prettytable::row![
            "Started".bold().cyan(),
            short_date(story.started_at.as_deref())
        ]);
    }
    if story.completed_at.is_some() {
        table.add_row(prettytable::row![
            "Completed".bold().cyan(),
            short_date(story.completed_at.as_deref())
        ]);
    }
    if !story.labels.is_empty() {
        let labels: Vec<&str> = story.labels.iter().map(|l| l.name.as_str()).collect();
        table.add_row(prettytable::row![
            "Labels".bold().cyan(),
            labels.join(", ").bright_green().to_string()
        ]);
    }
    table.printstd();

    if story.blocked {
        println!("\n{}", "BLOCKED".bold().red());
    }

    if let Some(description) = story.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("\n{}", "Description:".bold().cyan());
        println!("{description}");
    }

    if !story.tasks.is_empty() {
        println!("\n{}", "Tasks:".bold().cyan());
        for task in &story.tasks {
            let mark = if task.complete { "✓".green() } else { "○".normal() };
            println!("  {} {}", mark, task.description);
        }
    }

    if !story.comments.is_empty() {
        println!("\n{}", f!("Comments: {}", story.comments.len()).bright_black());
    }

    println!(
        "\n{}",
        f!(
            "View in browser: {}",
            story.app_url.as_deref().unwrap_or(EMPTY)
        )
        .bright_black()
    );
}
