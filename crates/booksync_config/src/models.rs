// --- File: crates/booksync_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::time::Duration;

// --- Callback Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/booksync.db, overridden via BOOKSYNC__DATABASE__URL
    /// Upper bound for connecting and preparing the token store.
    #[serde(default = "default_init_timeout_secs")]
    pub init_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_secs(self.init_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/booksync.db".to_string(),
            init_timeout_secs: default_init_timeout_secs(),
        }
    }
}

fn default_init_timeout_secs() -> u64 {
    10
}

// --- Sync Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Run the whole decision pipeline but skip every mutating provider call.
    #[serde(default)]
    pub dry_run: bool,
    /// Width of the sync window, starting now.
    pub weeks_to_sync: u32,
    pub interval_minutes: u64,
    /// Tag that marks a calendar event for syncing, e.g. "💪 ".
    pub event_prefix: String,
    /// Key under which the refresh token is stored.
    pub account_id: String,
    /// Zone used when printing event times.
    pub time_zone: String,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            weeks_to_sync: 2,
            interval_minutes: 5,
            event_prefix: "💪 ".to_string(),
            account_id: "default".to_string(),
            time_zone: "Europe/Brussels".to_string(),
        }
    }
}

// --- OAuth Config ---
// client_secret is usually "secret_from_env" and resolved from AUTH_CLIENT_SECRET.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub redirect_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// How long to wait for the browser redirect before giving up.
    pub timeout_secs: u64,
    /// Refresh token supplied from the environment (OAUTH_REFRESH_TOKEN).
    #[serde(default)]
    pub refresh_token_override: Option<String>,
}

impl AuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorization_endpoint: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_endpoint: "https://oauth2.googleapis.com/token".to_string(),
            redirect_url: "http://localhost:8080/auth_callback".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar.events".to_string()],
            timeout_secs: 300,
            refresh_token_override: None,
        }
    }
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// Daily rolling log files are written here when set.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
