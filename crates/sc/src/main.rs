use crate::prelude::{eprintln, *};
use clap::Parser;

mod api;
mod config;
mod error;
mod iteration;
mod prelude;
mod render;
mod search;
mod story;
mod team;

#[derive(Debug, clap::Parser)]
#[command(
    name = "sc",
    author,
    version,
    about,
    long_about = "Command line client for the Shortcut project-management service"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Shortcut REST API base URL
    #[clap(
        long,
        env = "SHORTCUT_API_URL",
        global = true,
        default_value = crate::api::DEFAULT_BASE_URL
    )]
    api_url: String,

    /// Whether to display additional information.
    #[clap(long, env = "SC_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Manage teams
    Team(crate::team::App),

    /// Manage iterations
    Iteration(crate::iteration::App),

    /// Search across stories, epics and iterations
    Search(crate::search::App),

    /// Manage stories
    Story(crate::story::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();
    let config = crate::config::Config::load(&app.global)?;

    if config.verbose {
        eprintln!("Using Shortcut API at {}", config.base_url);
    }

    match app.command {
        SubCommands::Team(sub_app) => crate::team::run(sub_app, &config).await,
        SubCommands::Iteration(sub_app) => crate::iteration::run(sub_app, &config).await,
        SubCommands::Search(sub_app) => crate::search::run(sub_app, &config).await,
        SubCommands::Story(sub_app) => crate::story::run(sub_app, &config).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> App {
        App::try_parse_from(std::iter::once("sc").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_parse_team_list() {
        let app = parse(&["team", "list", "--json"]);
        assert!(matches!(app.command, SubCommands::Team(_)));
        assert_eq!(app.global.api_url, crate::api::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_global_api_url_after_subcommand() {
        let app = parse(&["iteration", "current", "--api-url", "http://localhost:9000"]);
        assert_eq!(app.global.api_url, "http://localhost:9000");
    }

    #[test]
    fn test_parse_story_search_filters() {
        let app = parse(&[
            "story", "search", "auth", "-t", "bug", "--owner", "@me", "-i", "current", "-l", "5",
        ]);
        let SubCommands::Story(story) = app.command else {
            panic!("expected story command");
        };
        let crate::story::Commands::Search(options) = story.command else {
            panic!("expected story search");
        };
        assert_eq!(options.query.as_deref(), Some("auth"));
        assert_eq!(options.story_type.as_deref(), Some("bug"));
        assert_eq!(options.owner.as_deref(), Some("@me"));
        assert_eq!(options.iteration.as_deref(), Some("current"));
        assert_eq!(options.limit, 5);
    }

    #[test]
    fn test_parse_story_search_defaults() {
        let app = parse(&["story", "search"]);
        let SubCommands::Story(story) = app.command else {
            panic!("expected story command");
        };
        let crate::story::Commands::Search(options) = story.command else {
            panic!("expected story search");
        };
        assert_eq!(options.query, None);
        assert_eq!(options.limit, 25);
    }

    #[test]
    fn test_parse_search_stories_defaults() {
        let app = parse(&["search", "stories", "login"]);
        let SubCommands::Search(search) = app.command else {
            panic!("expected search command");
        };
        let crate::search::Commands::Stories(options) = search.command else {
            panic!("expected search stories");
        };
        assert_eq!(options.query, "login");
        assert_eq!(options.limit, 20);
    }

    #[test]
    fn test_parse_iteration_view_requires_numeric_id() {
        assert!(App::try_parse_from(["sc", "iteration", "view", "abc"]).is_err());
        let app = parse(&["iteration", "view", "42"]);
        assert!(matches!(app.command, SubCommands::Iteration(_)));
    }

    #[test]
    fn test_parse_story_mutations() {
        for args in [
            vec!["story", "move", "12", "In Progress"],
            vec!["story", "start", "12"],
            vec!["story", "finish", "sc-12"],
            vec!["story", "block", "12", "-r", "waiting on design"],
            vec!["story", "unblock", "12"],
            vec!["story", "assign", "12", "sarah"],
            vec!["story", "team", "12", "Backend"],
            vec!["story", "epic", "12", "10"],
            vec!["story", "iteration", "12", "20"],
            vec!["story", "delete", "12", "--yes"],
            vec!["story", "edit", "12", "--estimate", "3"],
        ] {
            let app = parse(&args);
            assert!(matches!(app.command, SubCommands::Story(_)), "{args:?}");
        }
    }

    #[test]
    fn test_parse_unknown_group_fails() {
        assert!(App::try_parse_from(["sc", "project", "list"]).is_err());
    }
}
