use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub api_url: String,
    /// Per-request timeout. Added in v1; a timed-out request counts as a
    /// connectivity failure and falls back to the offline store.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Artificial delay for offline-store operations.
    #[serde(default)]
    pub offline_latency_ms: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            offline_latency_ms: 0,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn offline_latency(&self) -> Duration {
        Duration::from_millis(self.offline_latency_ms)
    }

    /// `FISIO_API_URL` and `FISIO_REQUEST_TIMEOUT_SECS` win over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("FISIO_API_URL")
            && !url.trim().is_empty()
        {
            self.api_url = url;
        }
        if let Some(secs) = std::env::var("FISIO_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.request_timeout_secs = secs;
        }
        self
    }
}

pub fn config_dir() -> Result<PathBuf, ClientError> {
    let base = dirs::config_dir()
        .ok_or_else(|| ClientError::Config("no config directory found".to_string()))?;
    Ok(base.join("fisio"))
}

pub fn config_path() -> Result<PathBuf, ClientError> {
    Ok(config_dir()?.join("config.json"))
}

/// Load from the default location, falling back to defaults when no file
/// exists yet. Environment overrides are applied last.
pub fn load_config() -> Result<ClientConfig, ClientError> {
    let path = config_path()?;
    let config = if path.exists() {
        load_config_from(&path)?
    } else {
        ClientConfig::default()
    };
    Ok(config.with_env_overrides())
}

pub fn load_config_from(path: &Path) -> Result<ClientConfig, ClientError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ClientError::Config(format!("failed to read config at {}: {e}", path.display()))
    })?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    Ok(serde_json::from_value(migrated)?)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
/// Each migration is a pure transform on the raw JSON value.
fn migrate(mut json: serde_json::Value, from_version: u32) -> Result<serde_json::Value, ClientError> {
    if from_version > CURRENT_VERSION {
        return Err(ClientError::Config(format!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION})"
        )));
    }

    // v0 → v1: `base_url` renamed to `api_url`, timeout added
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| ClientError::Config("config is not a JSON object".to_string()))?;
        if let Some(url) = obj.remove("base_url") {
            obj.entry("api_url").or_insert(url);
        }
        obj.entry("request_timeout_secs")
            .or_insert(serde_json::Value::Number(DEFAULT_TIMEOUT_SECS.into()));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (renamed base_url, added request_timeout_secs)");
    }

    Ok(json)
}

pub fn save_config(config: &ClientConfig) -> Result<(), ClientError> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &ClientConfig) -> Result<(), ClientError> {
    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;
    write_private(path, json.as_bytes())?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

/// Write via a temp file and rename, owner-only on Unix.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<(), ClientError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = PathBuf::from(tmp_path);
    std::fs::write(&tmp_path, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
