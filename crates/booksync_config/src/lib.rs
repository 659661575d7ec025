use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::debug;
pub mod models;
pub use models::*;


/// Placeholder value that is swapped for an environment variable at load time.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Loads the application configuration.
///
/// Sources are applied in order, later ones winning: built-in defaults,
/// `config/default`, `config/{RUN_ENV}`, `BOOKSYNC__*` environment variables,
/// `secret_from_env` markers and finally the single-variable overrides
/// (`DRY_RUN`, `NUMBER_OF_WEEKS_TO_RESERVE`, `OAUTH_REFRESH_TOKEN` or
/// `GOOGLE_REFRESH_TOKEN`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "BOOKSYNC".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading config from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    let lookup = |key: &str| env::var(key).ok();
    let config = apply_env_overrides_from_marker(raw_config, lookup)?;
    apply_legacy_env_overrides(config, lookup)
}

/// Replaces every `secret_from_env` string with the environment variable named
/// after its key path, e.g. `auth.client_secret` reads `AUTH_CLIENT_SECRET`.
pub fn apply_env_overrides_from_marker<F>(
    config: AppConfig,
    lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config is not serializable: {err}")))?;
    let mut missing = Vec::new();
    inject_env_secrets(&mut Vec::new(), &mut json, &lookup, &mut missing);
    if !missing.is_empty() {
        return Err(ConfigError::Message(format!(
            "missing environment variables for secret_from_env: {}",
            missing.join(", ")
        )));
    }
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("config is no longer valid: {err}")))
}

fn inject_env_secrets<F>(path: &mut Vec<String>, value: &mut Value, lookup: &F, missing: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                path.push(key.clone());
                inject_env_secrets(path, child, lookup, missing);
                path.pop();
            }
        }
        Value::String(s) if s == SECRET_MARKER => {
            let env_key = path.join("_").to_uppercase();
            match lookup(&env_key) {
                Some(env_val) => *value = Value::String(env_val),
                None => missing.push(env_key),
            }
        }
        _ => {}
    }
}

/// Applies the short environment variables the sync job has always honoured.
pub fn apply_legacy_env_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("DRY_RUN").as_deref() {
        Some("true") => config.sync.dry_run = true,
        Some("false") => config.sync.dry_run = false,
        _ => {}
    }

    if let Some(weeks) = lookup("NUMBER_OF_WEEKS_TO_RESERVE") {
        config.sync.weeks_to_sync = weeks.trim().parse().map_err(|_| {
            ConfigError::Message(format!(
                "NUMBER_OF_WEEKS_TO_RESERVE could not be parsed to a number: {weeks}"
            ))
        })?;
    }

    let refresh_token = ["OAUTH_REFRESH_TOKEN", "GOOGLE_REFRESH_TOKEN"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|t| !t.is_empty()));
    if let Some(token) = refresh_token {
        config.auth.refresh_token_override = Some(token);
    }

    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// The path comes from `DOTENV_OVERRIDE` and falls back to `.env`.
/// Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
