use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "yatube";
static DATA_DIR_ENV: &str = "YATUBE_DATA_DIR";
static YATUBE_DB_NAME: &str = "yatube_db.sqlite";
static MEDIA_DIR_NAME: &str = "media";
static CONFIG_FILE_NAME: &str = "config.json";

// data_dir_path
// |- yatube
//    |- yatube_db.sqlite
//    |- media/
//    |- config.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session_ttl_hours out of range: {0}")]
    SessionTtlOutOfRange(i64),
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_page_size() -> u64 {
    10
}

fn default_index_cache_seconds() -> u64 {
    20
}

const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 100;

fn default_session_ttl_hours() -> i64 {
    24 * 14
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct YatubeConfig {
    pub database_path: PathBuf,

    /// Uploaded images live under `<media_root>/posts/`.
    pub media_root: PathBuf,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Posts per feed page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// How long a rendered home page is served from cache.
    #[serde(default = "default_index_cache_seconds")]
    pub index_cache_seconds: u64,

    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl YatubeConfig {
    /// Default configuration rooted at `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();

        YatubeConfig {
            database_path: data_dir.join(YATUBE_DB_NAME),
            media_root: data_dir.join(MEDIA_DIR_NAME),
            bind_addr: default_bind_addr(),
            page_size: default_page_size(),
            index_cache_seconds: default_index_cache_seconds(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }

    /// How long a login session stays valid. Must be between one hour and
    /// a century so that expiry cutoffs stay representable.
    pub fn session_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        match chrono::Duration::try_hours(self.session_ttl_hours) {
            Some(ttl) if (1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) => Ok(ttl),
            _ => Err(ConfigError::SessionTtlOutOfRange(self.session_ttl_hours)),
        }
    }
}

fn data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<YatubeConfig, ConfigError> {
    load_or_create(&data_dir()?).await
}

/// Reads `config.json` from `dir`, writing the defaults first when it is missing.
pub async fn load_or_create(dir: &Path) -> Result<YatubeConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(dir).await?;

    let config = if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        serde_json::from_str(&contents)?
    } else {
        let config = YatubeConfig::in_dir(dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        tracing::info!(path = %config_path.display(), "wrote default config");
        config
    };

    fs::create_dir_all(&config.media_root).await?;
    Ok(config)
}
