use clap::Args;
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::*;
use crate::render;

use super::prompt;

/// Delete a story
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn handler(client: &ShortcutClient, options: DeleteOptions) -> Result<()> {
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

    if !options.yes
        && !prompt::confirm(&f!(
            "Are you sure you want to delete story #{} '{}'?",
            story.id,
            story.name
        ))?
    {
        render::notice("Deletion cancelled");
        return Ok(());
    }

    match client.delete_story(story_id).await {
        Ok(()) => render::success(&f!("Deleted story #{story_id}")),
        Err(e) => super::report(story_id, "deleting story", e),
    }

    Ok(())
}
