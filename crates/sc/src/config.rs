//! Startup configuration
//!
//! Built once in `main` and handed to every command handler. The API token is
//! taken from `SHORTCUT_API_TOKEN` when set, otherwise from `auth.token` in
//! `~/.config/shortcut/config.yml`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use sc_core::config::{parse_config, resolve_token, ConfigFile, TOKEN_ENV};

use crate::prelude::*;

/// Resolved configuration for a single invocation
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub verbose: bool,
}

impl Config {
    /// Resolve the configuration from the environment, the config file and global flags
    pub fn load(global: &crate::Global) -> std::result::Result<Self, Error> {
        let env_token = std::env::var(TOKEN_ENV).ok();
        let file = match config_path() {
            Some(path) => read_config_file(&path),
            None => ConfigFile::default(),
        };

        Self::from_sources(env_token.as_deref(), &file, &global.api_url, global.verbose)
    }

    /// Combine already-read sources; the environment token wins over the file
    pub fn from_sources(
        env_token: Option<&str>,
        file: &ConfigFile,
        base_url: &str,
        verbose: bool,
    ) -> std::result::Result<Self, Error> {
        let token = resolve_token(env_token, file).ok_or(Error::AuthMissing)?;

        Ok(Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            verbose,
        })
    }
}

/// `~/.config/shortcut/config.yml`
pub fn config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config/shortcut/config.yml"))
}

/// Read and parse the config file; a missing or broken file counts as empty
pub fn read_config_file(path: &Path) -> ConfigFile {
    if !path.exists() {
        debug!("No config file at {}", path.display());
        return ConfigFile::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return ConfigFile::default();
        }
    };

    parse_config(&contents).unwrap_or_else(|e| {
        warn!("Ignoring {}: {}", path.display(), e);
        ConfigFile::default()
    })
}
