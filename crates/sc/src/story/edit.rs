use clap::Args;
use sc_core::shortcut::models::Story;
use sc_core::shortcut::story::{parse_estimate, StoryUpdate, STORY_TYPES};
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::*;
use crate::render;

use super::prompt;

/// Edit a story; without field flags every field is prompted for
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[command(after_help = "EXAMPLES:
    sc story edit 123 --estimate 3
    sc story edit sc-123 --name \"Fix login redirect\" --type bug
    sc story edit 123")]
pub struct EditOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// New title
    #[arg(long)]
    pub name: Option<String>,

    /// New description
    #[arg(short, long)]
    pub description: Option<String>,

    /// New story type (feature, bug, chore)
    #[arg(short = 't', long = "type")]
    pub story_type: Option<String>,

    /// New estimate in points
    #[arg(short, long)]
    pub estimate: Option<u32>,
}

impl EditOptions {
    fn has_fields(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.story_type.is_some()
            || self.estimate.is_some()
    }
}

/// Fields that differ from the story, as an update body
fn changes(
    story: &Story,
    name: Option<String>,
    description: Option<String>,
    story_type: Option<String>,
    estimate: Option<u32>,
) -> StoryUpdate {
    StoryUpdate {
        name: name.filter(|n| !n.trim().is_empty() && *n != story.name),
        // A story without a description and a blank answer are the same thing
        description: description
            .filter(|d| d.as_str() != story.description.as_deref().unwrap_or_default()),
        story_type: story_type.filter(|t| *t != story.story_type),
        estimate: estimate.filter(|e| Some(*e) != story.estimate),
        ..StoryUpdate::default()
    }
}

/// Prompt for every editable field, pre-filled with the current values
fn prompt_changes(story: &Story) -> std::result::Result<StoryUpdate, Error> {
    let name = prompt::text("Story title", Some(&story.name))?;

    let types: Vec<String> = STORY_TYPES.iter().map(|t| t.to_string()).collect();
    let current = types
        .iter()
        .position(|t| *t == story.story_type)
        .unwrap_or(0);
    let story_type = types[prompt::select("Story type", &types, current)?].clone();

    let description = prompt::text(
        "Description",
        Some(story.description.as_deref().unwrap_or("")),
    )?;

    let estimate_default = story.estimate.map(|e| e.to_string()).unwrap_or_default();
    let estimate = parse_estimate(&prompt::text(
        "Estimate in points",
        Some(&estimate_default),
    )?);

    Ok(changes(
        story,
        Some(name),
        Some(description),
        Some(story_type),
        estimate,
    ))
}

pub async fn handler(client: &ShortcutClient, options: EditOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    let story = match client.get_story(story_id).await {
        Ok(story) => story,
        Err(e) => {
            super::report(story_id, "fetching story", e);
            return Ok(());
        }
    };

    let update = if options.has_fields() {
        changes(
            &story,
            options.name,
            options.description,
            options.story_type,
            options.estimate,
        )
    } else {
        prompt_changes(&story)?
    };

    if update.is_empty() {
        render::notice("No changes");
        return Ok(());
    }

    super::apply_update(client, story_id, &update, &f!("Updated story #{story_id}")).await;

    Ok(())
}
