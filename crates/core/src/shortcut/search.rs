//! Search response normalization
//!
//! The search endpoints answer with a paged wrapper (`{data, next, total}`),
//! but the structured parse can fail when the payload does not match the
//! expected record shape. In that case the shell re-issues the request and
//! hands the raw JSON over as [`SearchPayload::RawFallback`]; records are then
//! rebuilt from whatever fields the payload actually carries.
//!
//! Either way the caller gets an ordered, truncated list of [`Hit`]s, tagged
//! with the path that produced them, which convert into uniform records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::models::{EpicSlim, Group, Iteration, StorySlim};

/// Failure of the raw fallback path
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SearchError {
    #[error("Undecodable search payload: {0}")]
    Undecodable(String),
}

/// Paged search results
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SearchResults<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// The two shapes a structured search response may take
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SearchEnvelope<T> {
    Paged(SearchResults<T>),
    Bare(Vec<T>),
}

impl<T> SearchEnvelope<T> {
    /// Pagination token for the following page, if any
    pub fn next_token(&self) -> Option<String> {
        match self {
            SearchEnvelope::Paged(results) => results.next.as_deref().and_then(next_page_token),
            SearchEnvelope::Bare(_) => None,
        }
    }

    pub fn into_data(self) -> Vec<T> {
        match self {
            SearchEnvelope::Paged(results) => results.data,
            SearchEnvelope::Bare(data) => data,
        }
    }
}

/// Input of [`normalize`]: either a structured parse or the raw payload of the fallback request
#[derive(Debug, Clone)]
pub enum SearchPayload<T> {
    Parsed(SearchEnvelope<T>),
    RawFallback(serde_json::Value),
}

/// A normalized search result, tagged with the path that produced it
#[derive(Debug, Clone, PartialEq)]
pub enum Hit<T, P> {
    Parsed(T),
    RawFallback(P),
}

/// Record type that can come back from a search endpoint
pub trait Searchable: DeserializeOwned {
    /// Lightweight record rebuilt from a raw payload
    type Partial: PartialRecord;
}

/// Raw-fallback record; every field but the id is optional
pub trait PartialRecord: DeserializeOwned {
    fn id(&self) -> Option<u64>;
}

/// Story rebuilt from a raw search payload
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct PartialStory {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub story_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub workflow_state_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub estimate: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub owner_ids: Option<Vec<String>>,
}

impl PartialRecord for PartialStory {
    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Searchable for StorySlim {
    type Partial = PartialStory;
}

/// Epic rebuilt from a raw search payload
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct PartialEpic {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub started_at: Option<String>,
}

impl PartialRecord for PartialEpic {
    fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Searchable for EpicSlim {
    type Partial = PartialEpic;
}

/// Treat a field of the wrong JSON type as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Structured parse of a search response body
///
/// An error here means the payload did not match the expected record shape.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<SearchEnvelope<T>, serde_json::Error> {
    serde_json::from_str(body)
}

/// Extract the `next` token from the relative URL the API returns for the following page
pub fn next_page_token(next: &str) -> Option<String> {
    let (_, query) = next.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "next")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Produce at most `limit` hits, in API order, from either payload shape
///
/// # Arguments
/// * `payload` - Structured envelope or raw fallback JSON
/// * `limit` - Maximum number of hits to return
///
/// # Returns
/// * `Ok(Vec<Hit>)` - Tagged hits; raw records lacking an `id` are dropped
/// * `Err(SearchError)` - The raw payload holds neither a `data` array nor an array
pub fn normalize<T: Searchable>(
    payload: SearchPayload<T>,
    limit: usize,
) -> Result<Vec<Hit<T, T::Partial>>, SearchError> {
    match payload {
        SearchPayload::Parsed(envelope) => Ok(envelope
            .into_data()
            .into_iter()
            .take(limit)
            .map(Hit::Parsed)
            .collect()),
        SearchPayload::RawFallback(value) => Ok(raw_items(value)?
            .into_iter()
            .filter_map(|item| serde_json::from_value::<T::Partial>(item).ok())
            .filter(|partial| partial.id().is_some())
            .take(limit)
            .map(Hit::RawFallback)
            .collect()),
    }
}

fn raw_items(value: serde_json::Value) -> Result<Vec<serde_json::Value>, SearchError> {
    Ok(raw_page(value)?.items)
}

/// One page of an untyped search response
#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub items: Vec<serde_json::Value>,
    /// Token for the following page, already extracted from the `next` URL
    pub next: Option<String>,
}

/// Split a raw search response into its records and the following page token
///
/// A bare array is a single, final page.
pub fn raw_page(value: serde_json::Value) -> Result<RawPage, SearchError> {
    use serde_json::Value;

    match value {
        Value::Array(items) => Ok(RawPage { items, next: None }),
        Value::Object(mut map) => {
            let next = match map.remove("next") {
                Some(Value::String(next)) => next_page_token(&next),
                _ => None,
            };
            match map.remove("data") {
                Some(Value::Array(items)) => Ok(RawPage { items, next }),
                Some(_) => Err(SearchError::Undecodable("`data` is not an array".to_string())),
                None => Err(SearchError::Undecodable("missing `data` field".to_string())),
            }
        }
        other => Err(SearchError::Undecodable(format!(
            "expected an object or an array, got {other}"
        ))),
    }
}

/// Uniform story record used for display
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StoryRecord {
    pub id: u64,
    pub name: String,
    pub story_type: Option<String>,
    pub workflow_state_id: Option<u64>,
    pub estimate: Option<u32>,
    pub owner_ids: Vec<String>,
}

impl From<StorySlim> for StoryRecord {
    fn from(story: StorySlim) -> Self {
        Self {
            id: story.id,
            name: story.name,
            story_type: Some(story.story_type),
            workflow_state_id: Some(story.workflow_state_id),
            estimate: story.estimate,
            owner_ids: story.owner_ids,
        }
    }
}

impl From<Hit<StorySlim, PartialStory>> for StoryRecord {
    fn from(hit: Hit<StorySlim, PartialStory>) -> Self {
        match hit {
            Hit::Parsed(story) => story.into(),
            Hit::RawFallback(partial) => Self {
                id: partial.id.unwrap_or_default(),
                name: partial.name.unwrap_or_default(),
                story_type: partial.story_type,
                workflow_state_id: partial.workflow_state_id,
                estimate: partial.estimate,
                owner_ids: partial.owner_ids.unwrap_or_default(),
            },
        }
    }
}

/// Uniform epic record used for display
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct EpicRecord {
    pub id: u64,
    pub name: String,
    pub state: Option<String>,
    pub story_count: Option<u64>,
    pub stories_done: Option<u64>,
    pub started_at: Option<String>,
}

impl From<Hit<EpicSlim, PartialEpic>> for EpicRecord {
    fn from(hit: Hit<EpicSlim, PartialEpic>) -> Self {
        match hit {
            Hit::Parsed(epic) => Self {
                id: epic.id,
                name: epic.name,
                state: Some(epic.state),
                story_count: epic.stats.as_ref().map(|s| s.story_count()),
                stories_done: epic.stats.as_ref().map(|s| s.num_stories_done),
                started_at: epic.started_at,
            },
            Hit::RawFallback(partial) => Self {
                id: partial.id.unwrap_or_default(),
                name: partial.name.unwrap_or_default(),
                state: partial.state,
                story_count: None,
                stories_done: None,
                started_at: partial.started_at,
            },
        }
    }
}

/// Uniform iteration record used for display
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct IterationRecord {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub story_count: u64,
}

impl From<&Iteration> for IterationRecord {
    fn from(iteration: &Iteration) -> Self {
        Self {
            id: iteration.id,
            name: iteration.name.clone(),
            status: iteration.status.clone(),
            start_date: iteration.start_date.clone(),
            end_date: iteration.end_date.clone(),
            story_count: iteration.story_count(),
        }
    }
}

/// Uniform team record used for display
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub member_ids: Vec<String>,
}

impl From<&Group> for TeamRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            member_ids: group.member_ids.clone(),
        }
    }
}

/// Any record a command can print
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Story(StoryRecord),
    Epic(EpicRecord),
    Iteration(IterationRecord),
    Team(TeamRecord),
}

impl Record {
    pub fn id(&self) -> String {
        match self {
            Record::Story(r) => r.id.to_string(),
            Record::Epic(r) => r.id.to_string(),
            Record::Iteration(r) => r.id.to_string(),
            Record::Team(r) => r.id.clone(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Record::Story(r) => &r.name,
            Record::Epic(r) => &r.name,
            Record::Iteration(r) => &r.name,
            Record::Team(r) => &r.name,
        }
    }
}
