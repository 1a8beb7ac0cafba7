//! Config-file parsing and API token precedence
//!
//! The file is YAML with a single recognized key path, `auth.token`:
//!
//! ```yaml
//! auth:
//!   token: 0a1b2c3d-...
//! ```

use serde::Deserialize;

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "SHORTCUT_API_TOKEN";

/// Error type for config parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config file: {0}")]
    Invalid(#[from] serde_yaml::Error),
}

/// Parsed contents of `config.yml`
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub auth: Option<AuthSection>,
}

/// `auth` section of the config file
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AuthSection {
    #[serde(default)]
    pub token: Option<String>,
}

impl ConfigFile {
    pub fn token(&self) -> Option<&str> {
        self.auth
            .as_ref()
            .and_then(|auth| auth.token.as_deref())
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Parse the YAML config file; an empty document is an empty config
pub fn parse_config(contents: &str) -> Result<ConfigFile, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    let parsed: Option<ConfigFile> = serde_yaml::from_str(contents)?;
    Ok(parsed.unwrap_or_default())
}

/// Pick the API token: environment first, then the config file
pub fn resolve_token(env_token: Option<&str>, file: &ConfigFile) -> Option<String> {
    env_token
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| file.token())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_auth_token() {
        let config = parse_config("auth:\n  token: abc-123\n").unwrap();
        assert_eq!(config.token(), Some("abc-123"));
    }

    #[test]
    fn test_parse_config_empty_and_null() {
        assert_eq!(parse_config("").unwrap(), ConfigFile::default());
        assert_eq!(parse_config("~\n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_parse_config_without_token() {
        let config = parse_config("auth:\n  user: someone\ntheme: dark\n").unwrap();
        assert_eq!(config.token(), None);
    }

    #[test]
    fn test_parse_config_invalid() {
        assert!(parse_config("auth: [unclosed").is_err());
    }

    #[test]
    fn test_resolve_token_env_first() {
        let file = parse_config("auth:\n  token: from-file\n").unwrap();
        assert_eq!(
            resolve_token(Some("from-env"), &file),
            Some("from-env".to_string())
        );
    }

    #[test]
    fn test_resolve_token_falls_back_to_file() {
        let file = parse_config("auth:\n  token: from-file\n").unwrap();
        assert_eq!(resolve_token(None, &file), Some("from-file".to_string()));
        assert_eq!(resolve_token(Some("  "), &file), Some("from-file".to_string()));
    }

    #[test]
    fn test_resolve_token_missing() {
        assert_eq!(resolve_token(None, &ConfigFile::default()), None);
    }
}
