//! HTTP client for the Shortcut REST API (v3)

use std::collections::HashMap;

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use sc_core::shortcut::member::member_name_map;
use sc_core::shortcut::models::{
    Comment, EpicSlim, Group, Iteration, Member, Project, Story, StorySlim, Workflow,
};
use sc_core::shortcut::search::{
    normalize, parse_envelope, raw_page, EpicRecord, Hit, SearchEnvelope, SearchPayload,
    Searchable, StoryRecord,
};
use sc_core::shortcut::story::{CommentInput, StoryInput, StoryUpdate};
use sc_core::shortcut::workflow::{build_state_map, WorkflowStateMap};

use crate::config::Config;
use crate::prelude::*;

/// Default Shortcut API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.app.shortcut.com/api/v3";

/// Largest page the search endpoints accept
pub const MAX_PAGE_SIZE: usize = 25;

type ApiResult<T> = std::result::Result<T, Error>;

/// Authenticated Shortcut client
#[derive(Debug, Clone)]
pub struct ShortcutClient {
    http: reqwest::Client,
    base_url: String,
}

impl ShortcutClient {
    /// Create a client sending the `Shortcut-Token` header on every request
    pub fn new(config: &Config) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "shortcut-token",
            HeaderValue::from_str(&config.token)
                .map_err(|e| Error::InvalidToken(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Network(f!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        f!("{}{}", self.base_url, path)
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> ApiResult<String> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(f!("Failed to send request to {path}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(f!("Failed to read response body: {e}")))
    }

    async fn get_text(&self, path: &str, query: &[(&str, String)]) -> ApiResult<String> {
        debug!("GET {path} {query:?}");
        self.send(self.http.get(self.url(path)).query(query), path)
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let body = self.get_text(path, query).await?;
        serde_json::from_str(&body).map_err(|e| Error::Shape(f!("{path}: {e}")))
    }

    /// Plain GET decoded as untyped JSON, used when the typed parse fails
    pub async fn get_raw(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<serde_json::Value> {
        self.get_json(path, query).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!("POST {path}");
        let text = self.send(self.http.post(self.url(path)).json(body), path).await?;
        serde_json::from_str(&text).map_err(|e| Error::Shape(f!("{path}: {e}")))
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        debug!("PUT {path}");
        let text = self.send(self.http.put(self.url(path)).json(body), path).await?;
        serde_json::from_str(&text).map_err(|e| Error::Shape(f!("{path}: {e}")))
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        debug!("DELETE {path}");
        self.send(self.http.delete(self.url(path)), path).await?;
        Ok(())
    }

    // --- Teams and members ---

    pub async fn list_groups(&self) -> ApiResult<Vec<Group>> {
        self.get_json("/groups", &[]).await
    }

    pub async fn get_group(&self, group_id: &str) -> ApiResult<Group> {
        self.get_json(&f!("/groups/{}", urlencoding::encode(group_id)), &[])
            .await
    }

    pub async fn list_members(&self) -> ApiResult<Vec<Member>> {
        self.get_json("/members", &[]).await
    }

    /// The member who owns the API token
    pub async fn current_member(&self) -> ApiResult<Member> {
        self.get_json("/member", &[]).await
    }

    /// Member id to display name; owners render as raw ids when the lookup fails
    pub async fn member_names(&self) -> HashMap<String, String> {
        match self.list_members().await {
            Ok(members) => member_name_map(&members),
            Err(e) => {
                warn!("Could not load members, showing owner ids instead: {e}");
                HashMap::new()
            }
        }
    }

    // --- Workflows ---

    pub async fn list_workflows(&self) -> ApiResult<Vec<Workflow>> {
        self.get_json("/workflows", &[]).await
    }

    /// Fetch every workflow once and flatten their states
    pub async fn fetch_state_map(&self) -> ApiResult<WorkflowStateMap> {
        Ok(build_state_map(&self.list_workflows().await?))
    }

    /// State map for display; states render as "Unknown" when the lookup fails
    pub async fn state_names(&self) -> WorkflowStateMap {
        match self.fetch_state_map().await {
            Ok(states) => states,
            Err(e) => {
                warn!("Could not load workflow states, showing them as Unknown: {e}");
                WorkflowStateMap::default()
            }
        }
    }

    // --- Iterations and epics ---

    pub async fn list_iterations(&self) -> ApiResult<Vec<Iteration>> {
        self.get_json("/iterations", &[]).await
    }

    pub async fn get_iteration(&self, iteration_id: u64) -> ApiResult<Iteration> {
        self.get_json(&f!("/iterations/{iteration_id}"), &[]).await
    }

    pub async fn list_epics(&self) -> ApiResult<Vec<EpicSlim>> {
        self.get_json("/epics", &[]).await
    }

    pub async fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.get_json("/projects", &[]).await
    }

    // --- Stories ---

    pub async fn get_story(&self, story_id: u64) -> ApiResult<Story> {
        self.get_json(&f!("/stories/{story_id}"), &[]).await
    }

    pub async fn create_story(&self, input: &StoryInput) -> ApiResult<Story> {
        self.post_json("/stories", input).await
    }

    pub async fn update_story(&self, story_id: u64, update: &StoryUpdate) -> ApiResult<Story> {
        self.put_json(&f!("/stories/{story_id}"), update).await
    }

    pub async fn delete_story(&self, story_id: u64) -> ApiResult<()> {
        self.delete(&f!("/stories/{story_id}")).await
    }

    pub async fn create_comment(&self, story_id: u64, input: &CommentInput) -> ApiResult<Comment> {
        self.post_json(&f!("/stories/{story_id}/comments"), input)
            .await
    }

    // --- Search ---

    /// Search stories, falling back to a raw request when the typed parse fails
    pub async fn search_stories(&self, query: &str, limit: usize) -> ApiResult<Vec<StoryRecord>> {
        let hits = self.search::<StorySlim>("/search/stories", query, limit).await?;
        Ok(hits.into_iter().map(StoryRecord::from).collect())
    }

    /// Search epics, falling back to a raw request when the typed parse fails
    pub async fn search_epics(&self, query: &str, limit: usize) -> ApiResult<Vec<EpicRecord>> {
        let hits = self.search::<EpicSlim>("/search/epics", query, limit).await?;
        Ok(hits.into_iter().map(EpicRecord::from).collect())
    }

    async fn search<T: Searchable>(
        &self,
        path: &str,
        query: &str,
        limit: usize,
    ) -> ApiResult<Vec<Hit<T, T::Partial>>> {
        let payload = match self.search_pages::<T>(path, query, limit).await {
            Ok(records) => SearchPayload::Parsed(SearchEnvelope::Bare(records)),
            Err(primary) => {
                warn!("Structured search on {path} failed ({primary}); re-issuing as a raw request");
                let raw = self
                    .search_raw_pages(path, query, limit)
                    .await
                    .map_err(|fallback| {
                        Error::SearchFailure(f!("{primary}; raw fallback: {fallback}"))
                    })?;
                SearchPayload::RawFallback(raw)
            }
        };

        normalize(payload, limit).map_err(|e| Error::SearchFailure(e.to_string()))
    }

    /// Structured search, following `next` tokens until `limit` records are collected
    async fn search_pages<T: Searchable>(
        &self,
        path: &str,
        query: &str,
        limit: usize,
    ) -> ApiResult<Vec<T>> {
        let mut records: Vec<T> = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let params = search_params(query, limit.saturating_sub(records.len()), next.as_deref());
            let body = self.get_text(path, &params).await?;
            let envelope = parse_envelope::<T>(&body).map_err(|e| Error::Shape(f!("{path}: {e}")))?;

            let token = envelope.next_token();
            records.extend(envelope.into_data());

            match token {
                Some(token) if records.len() < limit => next = Some(decode_token(token)),
                _ => break,
            }
        }

        Ok(records)
    }

    /// Untyped search from the first page, following `next` tokens until `limit` raw records are in hand
    async fn search_raw_pages(
        &self,
        path: &str,
        query: &str,
        limit: usize,
    ) -> ApiResult<serde_json::Value> {
        let mut items: Vec<serde_json::Value> = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let params = search_params(query, limit.saturating_sub(items.len()), next.as_deref());
            let page = raw_page(self.get_raw(path, &params).await?)
                .map_err(|e| Error::Shape(f!("{path}: {e}")))?;

            items.extend(page.items);

            match page.next {
                Some(token) if items.len() < limit => next = Some(decode_token(token)),
                _ => break,
            }
        }

        Ok(serde_json::Value::Array(items))
    }
}

/// `next` tokens arrive percent-encoded inside a URL; the query builder encodes them again
fn decode_token(token: String) -> String {
    urlencoding::decode(&token)
        .map(|t| t.into_owned())
        .unwrap_or(token)
}

/// Query string of a search request
fn search_params(query: &str, remaining: usize, next: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("query", query.to_string()),
        ("page_size", remaining.clamp(1, MAX_PAGE_SIZE).to_string()),
    ];
    if let Some(next) = next {
        params.push(("next", next.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::mock::mock_shortcut;
    use super::*;

    use sc_core::shortcut::workflow::resolve_state_name;

    fn config(token: &str) -> Config {
        Config {
            token: token.to_string(),
            base_url: "http://localhost:9999/api/v3/".to_string(),
            verbose: false,
        }
    }

    #[test]
    fn test_search_params_clamps_page_size() {
        let params = search_params("auth", 100, None);
        assert_eq!(params[0], ("query", "auth".to_string()));
        assert_eq!(params[1], ("page_size", "25".to_string()));
        assert_eq!(params.len(), 2);

        let params = search_params("auth", 0, Some("abc"));
        assert_eq!(params[1], ("page_size", "1".to_string()));
        assert_eq!(params[2], ("next", "abc".to_string()));
    }

    #[test]
    fn test_client_url_joins_base_and_path() {
        let client = ShortcutClient::new(&config("token")).unwrap();
        assert_eq!(client.url("/groups"), "http://localhost:9999/api/v3/groups");
    }

    #[test]
    fn test_client_rejects_invalid_token_header() {
        let result = ShortcutClient::new(&config("bad\ntoken"));
        assert!(matches!(result, Err(Error::InvalidToken(_))));
    }

    /// Stories `from..=to`, with or without the `story_type` the typed parse needs
    fn stories_json(from: u64, to: u64, typed: bool) -> Vec<serde_json::Value> {
        (from..=to)
            .map(|id| {
                let mut story = serde_json::json!({
                    "id": id,
                    "name": format!("Story {id}"),
                    "workflow_state_id": 500,
                });
                if typed {
                    story["story_type"] = serde_json::json!("feature");
                }
                story
            })
            .collect()
    }

    /// Two pages of 25 records, the first pointing at the second with a `next` token
    fn two_pages(line: &str, typed: bool) -> (u16, String) {
        let body = if line.contains("next=page2") {
            serde_json::json!({"data": stories_json(26, 50, typed), "next": null, "total": 50})
        } else {
            serde_json::json!({
                "data": stories_json(1, 25, typed),
                "next": "/api/v3/search/stories?query=iteration%3A1&page_size=25&next=page2",
                "total": 50
            })
        };
        (200, body.to_string())
    }

    #[tokio::test]
    async fn test_search_follows_next_pages() {
        let (client, seen) = mock_shortcut(|line| two_pages(line, true)).await;

        let stories = client.search_stories("iteration:1", 40).await.unwrap();
        let ids: Vec<u64> = stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=40).collect::<Vec<u64>>());
        assert!(stories.iter().all(|s| s.story_type.as_deref() == Some("feature")));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("page_size=25"));
        assert!(seen[1].contains("page_size=15") && seen[1].contains("next=page2"));
    }

    #[tokio::test]
    async fn test_search_shape_mismatch_falls_back_to_raw_pages() {
        let (client, seen) = mock_shortcut(|line| two_pages(line, false)).await;

        let stories = client.search_stories("iteration:1", 50).await.unwrap();
        assert_eq!(stories.len(), 50);
        assert_eq!(stories[0].id, 1);
        assert_eq!(stories[49].id, 50);
        assert_eq!(stories[30].workflow_state_id, Some(500));
        assert!(stories.iter().all(|s| s.story_type.is_none()));

        // One failed typed request, then both raw pages
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(!seen[1].contains("next="));
        assert!(seen[2].contains("next=page2"));
    }

    #[tokio::test]
    async fn test_search_raw_fallback_truncates_to_limit() {
        let (client, _) = mock_shortcut(|_| {
            (200, serde_json::json!({"data": stories_json(1, 3, false), "next": null}).to_string())
        })
        .await;

        let stories = client.search_stories("auth", 2).await.unwrap();
        assert_eq!(stories.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_fails_when_both_paths_fail() {
        let (client, seen) =
            mock_shortcut(|_| (500, r#"{"message": "server error"}"#.to_string())).await;

        let result = client.search_epics("billing", 10).await;
        match result {
            Err(Error::SearchFailure(reason)) => assert!(reason.contains("raw fallback")),
            other => panic!("expected a search failure, got {other:?}"),
        }
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_state_names_empty_when_workflows_fail() {
        let (client, _) = mock_shortcut(|_| (503, String::new())).await;
        assert!(client.state_names().await.is_empty());
    }

    #[tokio::test]
    async fn test_state_names_from_workflows() {
        let (client, seen) = mock_shortcut(|_| {
            let body = serde_json::json!([{
                "id": 1,
                "name": "Engineering",
                "states": [{"id": 500, "name": "In Progress", "type": "started"}]
            }]);
            (200, body.to_string())
        })
        .await;

        let states = client.state_names().await;
        assert_eq!(resolve_state_name(&states, 500), "In Progress");
        assert!(seen.lock().unwrap()[0].starts_with("GET /api/v3/workflows"));
    }
}

/// Local stand-in for the Shortcut API
#[cfg(test)]
pub(crate) mod mock {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::ShortcutClient;
    use crate::config::Config;

    pub(crate) type Responder = fn(&str) -> (u16, String);

    /// Local HTTP server answering each request with `respond(request_line)`.
    /// Returns a client pointed at it and the request lines it received.
    pub(crate) async fn mock_shortcut(respond: Responder) -> (ShortcutClient, Arc<Mutex<Vec<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request: Vec<u8> = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let line = request.lines().next().unwrap_or_default().to_string();
                log.lock().unwrap().push(line.clone());

                let (status, body) = respond(&line);
                let response = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        let config = Config {
            token: "token".to_string(),
            base_url: format!("http://{addr}/api/v3"),
            verbose: false,
        };
        (ShortcutClient::new(&config).unwrap(), seen)
    }
}
