#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "No API token found. Set the SHORTCUT_API_TOKEN environment variable or save the token under `auth.token` in ~/.config/shortcut/config.yml"
    )]
    AuthMissing,

    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Search failed: {0}")]
    SearchFailure(String),

    #[error("Shortcut API error [{status}]: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response from {0}")]
    Shape(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),
}
