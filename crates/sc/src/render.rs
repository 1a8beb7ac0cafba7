//! Terminal rendering shared by the command handlers

use std::collections::HashMap;

use colored::{ColoredString, Colorize};
use sc_core::shortcut::display::{format_estimate, truncate};
use sc_core::shortcut::member::owner_label;
use sc_core::shortcut::search::StoryRecord;
use sc_core::shortcut::workflow::{resolve_optional_state_name, WorkflowStateMap};

use crate::prelude::{eprintln, println, *};

/// Names longer than this are cut in story tables
pub const NAME_WIDTH: usize = 50;

/// Table header cells in bold cyan
pub fn header(cells: &[&str]) -> prettytable::Row {
    prettytable::Row::new(
        cells
            .iter()
            .map(|c| prettytable::Cell::new(&c.bold().cyan().to_string()))
            .collect(),
    )
}

/// Story table with resolved state and owner names
pub fn story_table(
    stories: &[StoryRecord],
    states: &WorkflowStateMap,
    owners: &HashMap<String, String>,
) -> prettytable::Table {
    let mut table = new_table();
    table.set_titles(header(&["ID", "Name", "Type", "State", "Estimate", "Owner"]));

    for story in stories {
        table.add_row(prettytable::row![
            story.id.to_string().green(),
            truncate(&story.name, NAME_WIDTH).bright_white(),
            story.story_type.as_deref().unwrap_or("-").bright_yellow(),
            resolve_optional_state_name(states, story.workflow_state_id),
            format_estimate(story.estimate),
            owner_label(&story.owner_ids, owners)
        ]);
    }

    table
}

/// Color for an iteration status
pub fn iteration_status(status: &str) -> ColoredString {
    match status {
        "unstarted" => status.yellow(),
        "started" => status.green(),
        "done" => status.blue(),
        _ => status.normal(),
    }
}

/// `label: value` line used by the detail views
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", label.bold(), value);
}

/// Report a failed lookup; the command then returns normally
pub fn lookup_failed(what: &str, id: impl std::fmt::Display, err: &Error) {
    eprintln!(
        "{}",
        f!("Error: Could not find {what} with ID '{id}'").red()
    );
    eprintln!("{}", f!("Details: {err}").bright_black());
}

/// Report a failed operation; the command then returns normally
pub fn failed(context: &str, err: impl std::fmt::Display) {
    eprintln!("{}", f!("Error {context}: {err}").red());
}

/// Success line for mutations
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

/// Yellow notice for empty results
pub fn notice(message: &str) {
    println!("{}", message.yellow());
}
