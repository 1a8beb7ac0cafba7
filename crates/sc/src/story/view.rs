use clap::Args;
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::{println, *};

/// View a story
#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handler(client: &ShortcutClient, options: ViewOptions) -> Result<()> {
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

    if options.json {
        println!("{}", serde_json::to_string_pretty(&story)?);
        return Ok(());
    }

    let states = client.state_names().await;
    let owners = client.member_names().await;
    super::display_story(&story, &states, &owners);

    Ok(())
}
