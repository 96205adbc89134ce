use serde::{Deserialize, Serialize};

/// Main configuration structure for the poller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// GitHub API access
    #[serde(default)]
    pub github: GithubConfig,

    /// Microsoft Teams webhook destination
    #[serde(default)]
    pub teams: TeamsConfig,

    /// Application behaviour
    #[serde(default)]
    pub app: AppConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sources to track
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// GitHub configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GithubConfig {
    /// Personal access token attached to every request
    #[serde(default)]
    pub auth_token: String,

    /// Base URL of the REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.github.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            auth_token: String::new(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("auth_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Teams webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TeamsConfig {
    /// Incoming webhook URL
    #[serde(default)]
    pub webhook_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Hours between two polls of every source
    #[serde(default = "default_check_interval_hours")]
    pub check_interval_hours: u64,
}

const fn default_check_interval_hours() -> u64 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            check_interval_hours: default_check_interval_hours(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; console only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Kind of GitHub entity a source tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A single issue, identified by number
    Issue,
    /// The latest release of a repository
    Release,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => f.write_str("issue"),
            Self::Release => f.write_str("release"),
        }
    }
}

/// One tracked source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Unique name used in logs and notifications
    pub name: String,

    /// What to track
    pub kind: SourceKind,

    /// Repository link, e.g. `https://github.com/octocat/Hello-World`
    pub link: String,

    /// Issue number, required for `kind: issue`
    #[serde(default)]
    pub issue: Option<u64>,
}
