//! Client configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use medboard_core::error::ApiError;
use medboard_core::model::{GroupBy, DEFAULT_DIFFICULTY, DEFAULT_SPECIALTY};
use medboard_core::session::{Session, SessionToken};
use medboard_core::traits::{AuthApi, TutorApi};

use crate::http::HttpClient;
use crate::store::FileStore;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "MEDBOARD_API_URL";

/// Environment variable overriding the config/session directory.
pub const HOME_ENV: &str = "MEDBOARD_HOME";

/// Local config file name, looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "medboard.toml";

const SESSION_FILE: &str = "session.json";

/// Top-level MedBoard client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the tutor API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Where the session token is kept. Defaults to `<config dir>/session.json`.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    /// Topic used when `medboard quiz` gets no `--specialty`.
    #[serde(default = "default_specialty")]
    pub default_specialty: String,
    /// Difficulty used when `medboard quiz` gets no `--difficulty`.
    #[serde(default = "default_difficulty")]
    pub default_difficulty: String,
    /// Grouping used when `medboard dashboard` gets no `--group-by`.
    #[serde(default)]
    pub default_group_by: GroupBy,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout() -> u64 {
    10
}
fn default_specialty() -> String {
    DEFAULT_SPECIALTY.to_string()
}
fn default_difficulty() -> String {
    DEFAULT_DIFFICULTY.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            session_file: None,
            default_specialty: default_specialty(),
            default_difficulty: default_difficulty(),
            default_group_by: GroupBy::default(),
        }
    }
}

impl ClientConfig {
    /// Absolute URL for an API path, tolerating slashes on either side.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.api_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Where the session token lives.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(|| config_dir().map(|d| d.join(SESSION_FILE)))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are inserted as-is and never rescanned.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Apply `${VAR}` resolution and the base URL override.
fn apply_overrides(mut config: ClientConfig, api_url_override: Option<String>) -> ClientConfig {
    config.api_url = resolve_env_vars(&config.api_url);
    config.session_file = config
        .session_file
        .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy())));
    if let Some(url) = api_url_override.filter(|u| !u.trim().is_empty()) {
        config.api_url = url.trim().to_string();
    }
    config
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `medboard.toml` in the current directory
/// 2. `$MEDBOARD_HOME/config.toml`, else `~/.config/medboard/config.toml`
///
/// `MEDBOARD_API_URL` overrides the base URL from any file.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            Some(local)
        } else {
            config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ClientConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ClientConfig::default(),
    };

    Ok(apply_overrides(config, std::env::var(API_URL_ENV).ok()))
}

/// Directory holding the global config and the session file.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("medboard"))
}

/// Open the session persisted at the configured location.
pub fn open_session(config: &ClientConfig) -> Result<Session> {
    let path = config
        .session_path()
        .context("cannot locate a session file: set HOME or MEDBOARD_HOME")?;
    Ok(Session::new(Arc::new(FileStore::new(path))))
}

/// Create the authenticated API client. A `None` token sends no Authorization header.
pub fn create_tutor_api(
    config: &ClientConfig,
    token: Option<&SessionToken>,
) -> Result<Arc<dyn TutorApi>, ApiError> {
    Ok(Arc::new(HttpClient::new(config, token)?))
}

/// Create the client for the login/signup/SSO endpoints.
pub fn create_auth_api(config: &ClientConfig) -> Result<Arc<dyn AuthApi>, ApiError> {
    Ok(Arc::new(HttpClient::new(config, None)?))
}
