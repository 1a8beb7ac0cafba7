//! Story search with structured filters

use clap::Args;
use colored::Colorize;
use sc_core::shortcut::iteration::current_iteration;
use sc_core::shortcut::query::{build_query, Filter};
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::{println, *};
use crate::render;

/// Owner alias for the member owning the API token
const ME: &str = "@me";

/// Iteration alias for the iteration in progress
const CURRENT: &str = "current";

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[command(after_help = "EXAMPLES:
    sc story search authentication
    sc story search --owner @me --state \"In Progress\"
    sc story search --type bug --label urgent
    sc story search \"label:security state:todo\"
    sc story search -i current --json")]
pub struct SearchOptions {
    /// Free-text query; Shortcut search operators are passed through
    pub query: Option<String>,

    /// Maximum number of results
    #[arg(short, long, default_value = "25")]
    pub limit: usize,

    /// Filter by project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Filter by owner mention name (`@me` for yourself)
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Filter by workflow state
    #[arg(short, long)]
    pub state: Option<String>,

    /// Filter by story type (feature, bug, chore)
    #[arg(short = 't', long = "type")]
    pub story_type: Option<String>,

    /// Filter by label
    #[arg(long)]
    pub label: Option<String>,

    /// Filter by epic
    #[arg(short, long)]
    pub epic: Option<String>,

    /// Filter by iteration (`current` for the iteration in progress)
    #[arg(short, long)]
    pub iteration: Option<String>,

    /// Filter by team
    #[arg(long)]
    pub team: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Replace `@me` with the current member's mention name
async fn resolve_owner(
    client: &ShortcutClient,
    owner: Option<String>,
) -> std::result::Result<Option<String>, Error> {
    match owner {
        Some(owner) if owner == ME => {
            let member = client.current_member().await?;
            member
                .profile
                .mention_name
                .map(Some)
                .ok_or_else(|| Error::Shape("/member: no mention name".to_string()))
        }
        other => Ok(other),
    }
}

/// Replace `current` with the id of the started iteration
async fn resolve_iteration(
    client: &ShortcutClient,
    iteration: Option<String>,
) -> std::result::Result<Option<String>, Error> {
    match iteration {
        Some(iteration) if iteration.eq_ignore_ascii_case(CURRENT) => {
            let iterations = client.list_iterations().await?;
            current_iteration(&iterations)
                .map(|i| Some(i.id.to_string()))
                .ok_or_else(|| Error::NotFound("current iteration".to_string()))
        }
        other => Ok(other),
    }
}

/// Ordered filters; clause order in the query follows this order
fn filters(
    options: &SearchOptions,
    owner: Option<String>,
    iteration: Option<String>,
) -> Vec<(Filter, Option<String>)> {
    vec![
        (Filter::Project, options.project.clone()),
        (Filter::Owner, owner),
        (Filter::State, options.state.clone()),
        (Filter::Type, options.story_type.clone()),
        (Filter::Label, options.label.clone()),
        (Filter::Epic, options.epic.clone()),
        (Filter::Iteration, iteration),
        (Filter::Team, options.team.clone()),
    ]
}

pub async fn handler(client: &ShortcutClient, options: SearchOptions) -> Result<()> {
    let owner = match resolve_owner(client, options.owner.clone()).await {
        Ok(owner) => owner,
        Err(e) => {
            render::failed("resolving owner", e);
            return Ok(());
        }
    };
    let iteration = match resolve_iteration(client, options.iteration.clone()).await {
        Ok(iteration) => iteration,
        Err(e) => {
            render::failed("resolving iteration", e);
            return Ok(());
        }
    };

    let query = build_query(options.query.as_deref(), &filters(&options, owner, iteration));
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
        render::notice(&f!("No stories found matching: {query}"));
        return Ok(());
    }

    let states = client.state_names().await;
    let owners = client.member_names().await;

    println!("\n{}", f!("Stories matching: {query}").bold());
    render::story_table(&stories, &states, &owners).printstd();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        options: SearchOptions,
    }

    fn options(args: &[&str]) -> SearchOptions {
        Harness::try_parse_from(std::iter::once("search").chain(args.iter().copied()))
            .unwrap()
            .options
    }

    #[test]
    fn test_filters_follow_fixed_order() {
        let options = options(&["--team", "Backend", "-t", "bug", "-p", "Web"]);
        let query = build_query(None, &filters(&options, None, None));
        assert_eq!(query, "project:\"Web\" type:bug group:\"Backend\"");
    }

    #[test]
    fn test_filters_with_resolved_owner_and_iteration() {
        let options = options(&["auth", "-s", "In Progress"]);
        let query = build_query(
            options.query.as_deref(),
            &filters(&options, Some("sarah".to_string()), Some("42".to_string())),
        );
        assert_eq!(query, "auth owner:sarah state:\"In Progress\" iteration:42");
    }

    #[test]
    fn test_no_filters_is_wildcard() {
        let options = options(&[]);
        assert_eq!(build_query(options.query.as_deref(), &filters(&options, None, None)), "*");
    }
}
