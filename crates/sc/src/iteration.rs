use colored::Colorize;
use sc_core::shortcut::display::{format_rate, short_date, short_date_or};
use sc_core::shortcut::iteration::{
    current_iteration, iteration_stats, next_iteration, visible_iterations,
};
use sc_core::shortcut::models::Iteration;
use sc_core::shortcut::search::IterationRecord;
use sc_core::shortcut::workflow::{build_state_map, done_state_ids};
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::config::Config;
use crate::prelude::{println, *};
use crate::render;

/// Stories fetched when computing iteration statistics
const STATS_LIMIT: usize = 100;

#[derive(Debug, clap::Parser)]
#[command(name = "iteration")]
#[command(about = "Manage iterations (sprints) in Shortcut")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List iterations
    #[clap(name = "list")]
    List(ListOptions),

    /// Show the iteration in progress
    #[clap(name = "current")]
    Current,

    /// Show the next upcoming iteration
    #[clap(name = "next")]
    Next,

    /// View details of a specific iteration
    #[clap(name = "view")]
    View(IterationIdOptions),

    /// List stories in an iteration
    #[clap(name = "stories")]
    Stories(StoriesOptions),

    /// Show completion statistics for an iteration
    #[clap(name = "stats")]
    Stats(IterationIdOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Include completed iterations
    #[arg(long)]
    pub include_archived: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct IterationIdOptions {
    /// Iteration ID
    pub iteration_id: u64,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct StoriesOptions {
    /// Iteration ID
    pub iteration_id: u64,

    /// Maximum number of stories
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

pub async fn run(app: App, config: &Config) -> Result<()> {
    let client = ShortcutClient::new(config)?;

    match app.command {
        Commands::List(options) => list_handler(&client, options).await,
        Commands::Current => current_handler(&client).await,
        Commands::Next => next_handler(&client).await,
        Commands::View(options) => view_handler(&client, options.iteration_id).await,
        Commands::Stories(options) => stories_handler(&client, options).await,
        Commands::Stats(options) => stats_handler(&client, options).await,
    }
}

async fn list_handler(client: &ShortcutClient, options: ListOptions) -> Result<()> {
    let iterations = match client.list_iterations().await {
        Ok(iterations) => visible_iterations(iterations, options.include_archived),
        Err(e) => {
            render::failed("listing iterations", e);
            return Ok(());
        }
    };

    if options.json {
        let records: Vec<IterationRecord> = iterations.iter().map(IterationRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if iterations.is_empty() {
        render::notice("No iterations found");
        return Ok(());
    }

    let mut table = new_table();
    table.set_titles(render::header(&[
        "ID", "Name", "Status", "Start", "End", "Stories",
    ]));
    for iteration in &iterations {
        table.add_row(prettytable::row![
            iteration.id.to_string().green(),
            iteration.name.bright_white(),
            render::iteration_status(&iteration.status),
            short_date(iteration.start_date.as_deref()),
            short_date(iteration.end_date.as_deref()),
            r->iteration.story_count()
        ]);
    }
    table.printstd();

    Ok(())
}

async fn current_handler(client: &ShortcutClient) -> Result<()> {
    let iterations = match client.list_iterations().await {
        Ok(iterations) => iterations,
        Err(e) => {
            render::failed("fetching iterations", e);
            return Ok(());
        }
    };

    match current_iteration(&iterations) {
        Some(iteration) => print_iteration(iteration),
        None => render::notice("No active iteration found"),
    }

    Ok(())
}

async fn next_handler(client: &ShortcutClient) -> Result<()> {
    let iterations = match client.list_iterations().await {
        Ok(iterations) => iterations,
        Err(e) => {
            render::failed("fetching iterations", e);
            return Ok(());
        }
    };

    match next_iteration(&iterations) {
        Some(iteration) => print_iteration(iteration),
        None => render::notice("No upcoming iteration found"),
    }

    Ok(())
}

async fn view_handler(client: &ShortcutClient, iteration_id: u64) -> Result<()> {
    match client.get_iteration(iteration_id).await {
        Ok(iteration) => print_iteration(&iteration),
        Err(e) => render::lookup_failed("iteration", iteration_id, &e),
    }

    Ok(())
}

fn print_iteration(iteration: &Iteration) {
    println!("\n{}", f!("Iteration: {}", iteration.name).bold());
    render::field("ID", iteration.id.to_string().cyan());
    render::field("Status", render::iteration_status(&iteration.status));
    render::field("Start", short_date_or(iteration.start_date.as_deref(), "Not set"));
    render::field("End", short_date_or(iteration.end_date.as_deref(), "Not set"));
    render::field("Stories", iteration.story_count());

    if let Some(stats) = &iteration.stats {
        render::field(
            "Progress",
            f!(
                "{} done, {} started, {} unstarted",
                stats.num_stories_done,
                stats.num_stories_started,
                stats.num_stories_unstarted
            ),
        );
    }

    if let Some(description) = iteration.description.as_deref().filter(|d| !d.is_empty()) {
        println!("\n{}", "Description:".bold());
        println!("{description}");
    }

    if let Some(app_url) = &iteration.app_url {
        println!("\n{}", f!("View in browser: {app_url}").bright_black());
    }
}

async fn stories_handler(client: &ShortcutClient, options: StoriesOptions) -> Result<()> {
    let iteration = match client.get_iteration(options.iteration_id).await {
        Ok(iteration) => iteration,
        Err(e) => {
            render::lookup_failed("iteration", options.iteration_id, &e);
            return Ok(());
        }
    };

    let query = f!("iteration:{}", iteration.id);
    let stories = match client.search_stories(&query, options.limit).await {
        Ok(stories) => stories,
        Err(e) => {
            render::failed("searching stories", e);
            return Ok(());
        }
    };

    println!("\n{}", f!("Stories in {}:", iteration.name).bold());

    if stories.is_empty() {
        render::notice("No stories found");
        return Ok(());
    }

    let states = client.state_names().await;
    let owners = client.member_names().await;
    render::story_table(&stories, &states, &owners).printstd();

    Ok(())
}

async fn stats_handler(client: &ShortcutClient, options: IterationIdOptions) -> Result<()> {
    let iteration = match client.get_iteration(options.iteration_id).await {
        Ok(iteration) => iteration,
        Err(e) => {
            render::lookup_failed("iteration", options.iteration_id, &e);
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

    let query = f!("iteration:{}", iteration.id);
    let stories = match client.search_stories(&query, STATS_LIMIT).await {
        Ok(stories) => stories,
        Err(e) => {
            render::failed("searching stories", e);
            return Ok(());
        }
    };

    let summary = iteration_stats(
        &stories,
        &done_state_ids(&workflows),
        &build_state_map(&workflows),
    );

    println!("\n{}", f!("Statistics for {}", iteration.name).bold());
    render::field("Status", render::iteration_status(&iteration.status));
    render::field(
        "Stories",
        f!(
            "{} of {} completed ({})",
            summary.completed_stories,
            summary.total_stories,
            format_rate(summary.completion_rate)
        ),
    );
    render::field(
        "Points",
        f!(
            "{} of {} completed ({})",
            summary.completed_points,
            summary.total_points,
            format_rate(summary.points_completion_rate)
        ),
    );

    if !summary.by_type.is_empty() {
        println!("\n{}", "By type:".bold());
        let mut table = new_table();
        for (story_type, count) in &summary.by_type {
            table.add_row(prettytable::row![story_type.bright_yellow(), r->count]);
        }
        table.printstd();
    }

    if !summary.by_state.is_empty() {
        println!("\n{}", "By state:".bold());
        let mut table = new_table();
        for (state, count) in &summary.by_state {
            table.add_row(prettytable::row![state, r->count]);
        }
        table.printstd();
    }

    Ok(())
}
