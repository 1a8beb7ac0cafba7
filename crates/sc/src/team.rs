use colored::Colorize;
use sc_core::shortcut::member::group_members;
use sc_core::shortcut::query::{build_query, Filter};
use sc_core::shortcut::search::TeamRecord;
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::config::Config;
use crate::prelude::{println, *};
use crate::render;

#[derive(Debug, clap::Parser)]
#[command(name = "team")]
#[command(about = "Manage teams in Shortcut")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List all teams
    #[clap(name = "list")]
    List(ListOptions),

    /// View details of a specific team
    #[clap(name = "view")]
    View(TeamIdOptions),

    /// List members of a team
    #[clap(name = "members")]
    Members(TeamIdOptions),

    /// List stories assigned to a team
    #[clap(name = "stories")]
    Stories(StoriesOptions),
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct ListOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct TeamIdOptions {
    /// Team (group) ID
    pub group_id: String,
}

#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct StoriesOptions {
    /// Team (group) ID
    pub group_id: String,

    /// Maximum number of stories
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Filter by workflow state
    #[arg(short, long)]
    pub state: Option<String>,
}

pub async fn run(app: App, config: &Config) -> Result<()> {
    let client = ShortcutClient::new(config)?;

    match app.command {
        Commands::List(options) => list_handler(&client, options).await,
        Commands::View(options) => view_handler(&client, options).await,
        Commands::Members(options) => members_handler(&client, options).await,
        Commands::Stories(options) => stories_handler(&client, options).await,
    }
}

async fn list_handler(client: &ShortcutClient, options: ListOptions) -> Result<()> {
    let groups = match client.list_groups().await {
        Ok(groups) => groups,
        Err(e) => {
            render::failed("listing teams", e);
            return Ok(());
        }
    };

    if options.json {
        let records: Vec<TeamRecord> = groups.iter().map(TeamRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if groups.is_empty() {
        render::notice("No teams found");
        return Ok(());
    }

    let mut table = new_table();
    table.set_titles(render::header(&["ID", "Name", "Description", "Members"]));
    for group in &groups {
        table.add_row(prettytable::row![
            group.id.green(),
            group.name.bright_white(),
            group.description.as_deref().unwrap_or(""),
            r->group.member_ids.len()
        ]);
    }
    table.printstd();

    Ok(())
}

async fn view_handler(client: &ShortcutClient, options: TeamIdOptions) -> Result<()> {
    let group = match client.get_group(&options.group_id).await {
        Ok(group) => group,
        Err(e) => {
            render::lookup_failed("team", &options.group_id, &e);
            return Ok(());
        }
    };

    println!("\n{}", f!("Team: {}", group.name).bold());
    render::field("ID", group.id.cyan());
    render::field(
        "Description",
        group
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description"),
    );
    render::field("Members", group.member_ids.len());
    render::field("Color", group.color.as_deref().unwrap_or("-"));
    render::field("Archived", group.archived);
    if let Some(mention_name) = &group.mention_name {
        render::field("Mention", f!("@{mention_name}"));
    }
    render::field(
        "Entity Type",
        group.entity_type.as_deref().unwrap_or("group"),
    );

    Ok(())
}

async fn members_handler(client: &ShortcutClient, options: TeamIdOptions) -> Result<()> {
    let group = match client.get_group(&options.group_id).await {
        Ok(group) => group,
        Err(e) => {
            render::lookup_failed("team", &options.group_id, &e);
            return Ok(());
        }
    };
    let members = match client.list_members().await {
        Ok(members) => members,
        Err(e) => {
            render::failed("listing members", e);
            return Ok(());
        }
    };

    println!("\n{}", f!("Members of {}:", group.name).bold());

    let mut table = new_table();
    table.set_titles(render::header(&["ID", "Name", "Email", "Role"]));
    for member in group_members(&members, &group) {
        table.add_row(prettytable::row![
            member.id.green(),
            member.display_name().bright_white(),
            member.profile.email_address.as_deref().unwrap_or("-"),
            member.role.as_deref().unwrap_or("-")
        ]);
    }
    table.printstd();

    Ok(())
}

async fn stories_handler(client: &ShortcutClient, options: StoriesOptions) -> Result<()> {
    let group = match client.get_group(&options.group_id).await {
        Ok(group) => group,
        Err(e) => {
            render::lookup_failed("team", &options.group_id, &e);
            return Ok(());
        }
    };

    // Group ids are UUIDs, so the id goes in unquoted
    let query = build_query(
        Some(&f!("group:{}", group.id)),
        &[(Filter::State, options.state.clone())],
    );

    let stories = match client.search_stories(&query, options.limit).await {
        Ok(stories) => stories,
        Err(e) => {
            render::failed("searching stories", e);
            return Ok(());
        }
    };

    println!("\n{}", f!("Stories for {}:", group.name).bold());

    if stories.is_empty() {
        render::notice("No stories found");
        return Ok(());
    }

    let states = client.state_names().await;
    let owners = client.member_names().await;
    render::story_table(&stories, &states, &owners).printstd();

    Ok(())
}
