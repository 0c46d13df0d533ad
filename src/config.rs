//! Application-level configuration: a JSON file on disk, overridden by environment variables.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PICK_SURVIVE_CONFIG_PATH";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";

/// Which [`PoolStore`](crate::dao::pool_store::PoolStore) backend the server runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongo,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub port: u16,
    pub storage: StorageBackend,
    pub mongo_uri: String,
    pub mongo_db: Option<String>,
    /// JSON fixture loaded into the memory store at startup.
    pub seed_path: Option<PathBuf>,
    /// Token granting match administration rights; nobody may settle matches when unset.
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageBackend::default(),
            mongo_uri: DEFAULT_MONGO_URI.into(),
            mongo_db: None,
            seed_path: None,
            admin_token: None,
        }
    }
}

impl AppConfig {
    /// Load the configuration file, falling back to defaults, then apply environment overrides.
    pub fn load() -> Self {
        let mut config = Self::from_file();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    fn from_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded configuration file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Apply overrides looked up through `lookup` (the process environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }
        if let Some(value) = lookup("PICK_SURVIVE_STORAGE") {
            match StorageBackend::parse(&value) {
                Some(storage) => self.storage = storage,
                None => warn!(%value, "unknown storage backend; keeping configured one"),
            }
        }
        if let Some(uri) = non_empty(lookup("MONGO_URI")) {
            self.mongo_uri = uri;
        }
        if let Some(db) = non_empty(lookup("MONGO_DB")) {
            self.mongo_db = Some(db);
        }
        if let Some(path) = non_empty(lookup("PICK_SURVIVE_SEED_PATH")) {
            self.seed_path = Some(PathBuf::from(path));
        }
        if let Some(token) = non_empty(lookup("PICK_SURVIVE_ADMIN_TOKEN")) {
            self.admin_token = Some(token);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    storage: Option<StorageBackend>,
    #[serde(default)]
    mongo_uri: Option<String>,
    #[serde(default)]
    mongo_db: Option<String>,
    #[serde(default)]
    seed_path: Option<PathBuf>,
    #[serde(default)]
    admin_token: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            port: value.port.unwrap_or(defaults.port),
            storage: value.storage.unwrap_or(defaults.storage),
            mongo_uri: value.mongo_uri.unwrap_or(defaults.mongo_uri),
            mongo_db: value.mongo_db,
            seed_path: value.seed_path,
            admin_token: non_empty(value.admin_token),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
