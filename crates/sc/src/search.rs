use colored::Colorize;
use sc_core::shortcut::display::{short_date, truncate};
use sc_core::shortcut::query::{build_query, Filter};
use sc_core::shortcut::search::{EpicRecord, IterationRecord, Record};
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::config::Config;
use crate::prelude::{println, *};
use crate::render;

#[derive(Debug, clap::Parser)]
#[command(name = "search")]
#[command(about = "Search across Shortcut resources")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search stories, epics and iterations at once
    #[clap(name = "all")]
    All(AllOptions),

    /// Search for stories
    #[clap(name = "stories")]
    Stories(StoriesOptions),

    /// Search for epics
    #[clap(name = "epics")]
    Epics(EpicsOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct AllOptions {
    /// Search query
    pub query: String,

    /// Maximum results per resource type
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Output every match as JSON, tagged by kind
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
#[command(after_help = "EXAMPLES:
    sc search stories login
    sc search stories \"payment retry\" -t bug -s \"In Progress\"
    sc search stories auth --json")]
pub struct StoriesOptions {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Filter by story type (feature, bug, chore)
    #[arg(short = 't', long = "type")]
    pub story_type: Option<String>,

    /// Filter by workflow state
    #[arg(short, long)]
    pub state: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct EpicsOptions {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Filter by epic state
    #[arg(short, long)]
    pub state: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: App, config: &Config) -> Result<()> {
    let client = ShortcutClient::new(config)?;

    match app.command {
        Commands::All(options) => all_handler(&client, options).await,
        Commands::Stories(options) => stories_handler(&client, options).await,
        Commands::Epics(options) => epics_handler(&client, options).await,
    }
}

/// Iterations whose name contains the query, case-insensitively
fn matching_iterations(
    iterations: &[sc_core::shortcut::models::Iteration],
    query: &str,
    limit: usize,
) -> Vec<IterationRecord> {
    let needle = query.to_lowercase();
    iterations
        .iter()
        .filter(|i| i.name.to_lowercase().contains(&needle))
        .take(limit)
        .map(IterationRecord::from)
        .collect()
}

fn epic_table(epics: &[EpicRecord]) -> prettytable::Table {
    let mut table = new_table();
    table.set_titles(render::header(&["ID", "Name", "State", "Stories", "Started"]));
    for epic in epics {
        table.add_row(prettytable::row![
            epic.id.to_string().green(),
            truncate(&epic.name, render::NAME_WIDTH).bright_white(),
            epic.state.as_deref().unwrap_or("-"),
            r->epic
                .story_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
            short_date(epic.started_at.as_deref())
        ]);
    }
    table
}

async fn all_handler(client: &ShortcutClient, options: AllOptions) -> Result<()> {
    // Each section reports its own failure and the others still show
    let stories = client.search_stories(&options.query, options.limit).await;
    let epics = client.search_epics(&options.query, options.limit).await;
    let iterations = client
        .list_iterations()
        .await
        .map(|iterations| matching_iterations(&iterations, &options.query, options.limit));

    if options.json {
        let mut records: Vec<Record> = Vec::new();
        match stories {
            Ok(stories) => records.extend(stories.into_iter().map(Record::Story)),
            Err(e) => render::failed("searching stories", e),
        }
        match epics {
            Ok(epics) => records.extend(epics.into_iter().map(Record::Epic)),
            Err(e) => render::failed("searching epics", e),
        }
        match iterations {
            Ok(iterations) => records.extend(iterations.into_iter().map(Record::Iteration)),
            Err(e) => render::failed("searching iterations", e),
        }
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("\n{}\n", f!("Searching for: '{}'", options.query).bold());

    match stories {
        Ok(stories) if !stories.is_empty() => {
            let states = client.state_names().await;
            let owners = client.member_names().await;
            println!("{}", "Stories:".bold().green());
            render::story_table(&stories, &states, &owners).printstd();
            println!();
        }
        Ok(_) => {}
        Err(e) => render::failed("searching stories", e),
    }

    match epics {
        Ok(epics) if !epics.is_empty() => {
            println!("{}", "Epics:".bold().blue());
            epic_table(&epics).printstd();
            println!();
        }
        Ok(_) => {}
        Err(e) => render::failed("searching epics", e),
    }

    match iterations {
        Ok(iterations) if !iterations.is_empty() => {
            println!("{}", "Iterations:".bold().yellow());
            let mut table = new_table();
            table.set_titles(render::header(&["ID", "Name", "Status", "Stories"]));
            for iteration in &iterations {
                table.add_row(prettytable::row![
                    iteration.id.to_string().green(),
                    iteration.name.bright_white(),
                    render::iteration_status(&iteration.status),
                    r->iteration.story_count
                ]);
            }
            table.printstd();
            println!();
        }
        Ok(_) => {}
        Err(e) => render::failed("searching iterations", e),
    }

    Ok(())
}

async fn stories_handler(client: &ShortcutClient, options: StoriesOptions) -> Result<()> {
    let query = build_query(
        Some(&options.query),
        &[
            (Filter::Type, options.story_type.clone()),
            (Filter::State, options.state.clone()),
        ],
    );
    log::debug!("Story search query: {query}");

    let stories = match client.search_stories(&query, options.limit).await {
        Ok(stories) => stories,
        Err(e) => {
            render::failed("searching stories", e);
            return Ok(());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&stories)?);
        return Ok(());
    }

    if stories.is_empty() {
        render::notice("No stories found");
        return Ok(());
    }

    let states = client.state_names().await;
    let owners = client.member_names().await;

    println!("\n{}", f!("Found {} stories", stories.len()).bold());
    render::story_table(&stories, &states, &owners).printstd();

    Ok(())
}

async fn epics_handler(client: &ShortcutClient, options: EpicsOptions) -> Result<()> {
    let query = build_query(
        Some(&options.query),
        &[(Filter::State, options.state.clone())],
    );
    log::debug!("Epic search query: {query}");

    let epics = match client.search_epics(&query, options.limit).await {
        Ok(epics) => epics,
        Err(e) => {
            render::failed("searching epics", e);
            return Ok(());
        }
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&epics)?);
        return Ok(());
    }

    if epics.is_empty() {
        render::notice("No epics found");
        return Ok(());
    }

    println!("\n{}", f!("Found {} epics", epics.len()).bold());
    epic_table(&epics).printstd();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::shortcut::models::Iteration;

    fn iteration(id: u64, name: &str) -> Iteration {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "status": "started",
        }))
        .unwrap()
    }

    #[test]
    fn test_matching_iterations_case_insensitive() {
        let iterations = vec![
            iteration(1, "Sprint 41"),
            iteration(2, "Hardening"),
            iteration(3, "sprint 42"),
        ];

        let found = matching_iterations(&iterations, "SPRINT", 10);
        let ids: Vec<u64> = found.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_matching_iterations_respects_limit() {
        let iterations = vec![iteration(1, "Sprint 41"), iteration(2, "Sprint 42")];
        assert_eq!(matching_iterations(&iterations, "sprint", 1).len(), 1);
    }
}
