//! Workflow-state transitions and the blocked flag

use clap::Args;
use colored::Colorize;
use sc_core::shortcut::story::{block_comment, StoryUpdate};
use sc_core::shortcut::workflow::find_state_id;
use serde::{Deserialize, Serialize};

use crate::api::ShortcutClient;
use crate::prelude::{eprintln, *};
use crate::render;

use super::StoryIdOptions;

/// State `story start` moves to
const START_STATE: &str = "In Progress";

/// State `story finish` moves to
const FINISH_STATE: &str = "Done";

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct MoveOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Target workflow state name (case-insensitive)
    pub state: String,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct BlockOptions {
    /// Story ID (`123`, `sc-123` or a story URL)
    pub story: String,

    /// Reason for blocking, added as a comment
    #[arg(short, long)]
    pub reason: Option<String>,
}

/// Move a story to the state called `state_name`
async fn transition(
    client: &ShortcutClient,
    story: &str,
    state_name: &str,
    message: impl FnOnce(u64) -> String,
) -> Result<()> {
    let Some(story_id) = super::story_id(story) else {
        return Ok(());
    };

    let workflows = match client.list_workflows().await {
        Ok(workflows) => workflows,
        Err(e) => {
            render::failed("fetching workflows", e);
            return Ok(());
        }
    };

    let Some(state_id) = find_state_id(&workflows, state_name) else {
        eprintln!(
            "{}",
            f!("Error: Could not find workflow state '{state_name}'").red()
        );
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::move_to(state_id),
        &message(story_id),
    )
    .await;

    Ok(())
}

pub async fn move_handler(client: &ShortcutClient, options: MoveOptions) -> Result<()> {
    let state = options.state.clone();
    transition(client, &options.story, &options.state, |id| {
        f!("Moved story #{id} to '{state}'")
    })
    .await
}

pub async fn start_handler(client: &ShortcutClient, options: StoryIdOptions) -> Result<()> {
    transition(client, &options.story, START_STATE, |id| {
        f!("Started story #{id}")
    })
    .await
}

pub async fn finish_handler(client: &ShortcutClient, options: StoryIdOptions) -> Result<()> {
    transition(client, &options.story, FINISH_STATE, |id| {
        f!("Finished story #{id}")
    })
    .await
}

pub async fn block_handler(client: &ShortcutClient, options: BlockOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    let blocked = super::apply_update(
        client,
        story_id,
        &StoryUpdate::blocked(true),
        &f!("Blocked story #{story_id}"),
    )
    .await;

    // The flag is already set; a failed comment only loses the reason
    if let (Some(_), Some(reason)) = (blocked, options.reason.as_deref()) {
        if let Err(e) = client
            .create_comment(story_id, &block_comment(reason))
            .await
        {
            render::failed("adding block reason", e);
        }
    }

    Ok(())
}

pub async fn unblock_handler(client: &ShortcutClient, options: StoryIdOptions) -> Result<()> {
    let Some(story_id) = super::story_id(&options.story) else {
        return Ok(());
    };

    super::apply_update(
        client,
        story_id,
        &StoryUpdate::blocked(false),
        &f!("Unblocked story #{story_id}"),
    )
    .await;

    Ok(())
}
