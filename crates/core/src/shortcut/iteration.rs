//! Iteration selection and statistics

use std::collections::HashSet;

use serde::Serialize;

use super::models::Iteration;
use super::search::StoryRecord;
use super::workflow::{resolve_optional_state_name, WorkflowStateMap};

/// The iteration currently in progress
pub fn current_iteration(iterations: &[Iteration]) -> Option<&Iteration> {
    iterations.iter().find(|i| i.status == "started")
}

/// The unstarted iteration with the earliest start date
///
/// Iterations without a start date can't be ordered and are skipped.
pub fn next_iteration(iterations: &[Iteration]) -> Option<&Iteration> {
    iterations
        .iter()
        .filter(|i| i.status == "unstarted" && i.start_date.is_some())
        .min_by(|a, b| a.start_date.cmp(&b.start_date))
}

/// Iterations shown by `iteration list`
///
/// The API has no archived flag for iterations, so `done` iterations stand in
/// for archived ones. The result is sorted by start date with undated
/// iterations first.
pub fn visible_iterations(iterations: Vec<Iteration>, include_archived: bool) -> Vec<Iteration> {
    let mut visible: Vec<Iteration> = iterations
        .into_iter()
        .filter(|i| include_archived || i.status != "done")
        .collect();
    // `None` sorts before `Some`, which puts undated iterations first
    visible.sort_by(|a, b| a.start_date.cmp(&b.start_date));
    visible
}

/// Aggregate numbers shown by `iteration stats`
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IterationSummary {
    pub total_stories: usize,
    pub completed_stories: usize,
    pub total_points: u64,
    pub completed_points: u64,
    /// Percentage, `None` when there are no stories
    pub completion_rate: Option<f64>,
    /// Percentage, `None` when no story is estimated
    pub points_completion_rate: Option<f64>,
    /// Story count per type, in first-seen order
    pub by_type: Vec<(String, usize)>,
    /// Story count per workflow state name, in first-seen order
    pub by_state: Vec<(String, usize)>,
}

/// Compute completion statistics for the stories of an iteration
///
/// # Arguments
/// * `stories` - Stories found in the iteration
/// * `done_ids` - Workflow states of type `done`
/// * `state_map` - Workflow-state names for the breakdown
pub fn iteration_stats(
    stories: &[StoryRecord],
    done_ids: &HashSet<u64>,
    state_map: &WorkflowStateMap,
) -> IterationSummary {
    let is_done = |story: &StoryRecord| {
        story
            .workflow_state_id
            .map(|id| done_ids.contains(&id))
            .unwrap_or(false)
    };
    let points = |story: &StoryRecord| u64::from(story.estimate.unwrap_or(0));

    let completed: Vec<&StoryRecord> = stories.iter().filter(|s| is_done(s)).collect();
    let total_points: u64 = stories.iter().map(points).sum();
    let completed_points: u64 = completed.iter().map(|s| points(s)).sum();

    let mut by_type = Vec::new();
    let mut by_state = Vec::new();
    for story in stories {
        let story_type = story.story_type.as_deref().unwrap_or("unknown");
        tally(&mut by_type, story_type);
        tally(
            &mut by_state,
            resolve_optional_state_name(state_map, story.workflow_state_id),
        );
    }

    IterationSummary {
        total_stories: stories.len(),
        completed_stories: completed.len(),
        total_points,
        completed_points,
        completion_rate: percentage(completed.len() as u64, stories.len() as u64),
        points_completion_rate: percentage(completed_points, total_points),
        by_type,
        by_state,
    }
}

fn tally(counts: &mut Vec<(String, usize)>, key: &str) {
    match counts.iter_mut().find(|(k, _)| k == key) {
        Some((_, count)) => *count += 1,
        None => counts.push((key.to_string(), 1)),
    }
}

fn percentage(part: u64, whole: u64) -> Option<f64> {
    (whole > 0).then(|| part as f64 / whole as f64 * 100.0)
}
