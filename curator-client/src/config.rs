//! Client configuration, loaded from `~/.curator/config.yaml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Errors that can arise loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` — cannot locate `~/.curator/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    ConfigNotFound { path: PathBuf },
}

/// Endpoints and credentials for the entity store and regeneration service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the entity store.
    pub store_url: String,
    /// Base URL of the regeneration service.
    pub regen_url: String,
    /// Bearer token sent with every request, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(store_url: &str, regen_url: &str) -> Self {
        ClientConfig {
            store_url: store_url.trim_end_matches('/').to_string(),
            regen_url: regen_url.trim_end_matches('/').to_string(),
            auth_token: None,
            retry: RetryPolicy::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.curator/config.yaml`.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".curator").join("config.yaml")
}

/// Config path under the real home directory.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(config_path_at(&home))
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load the config rooted at an explicit home directory.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<ClientConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound { path });
    }
    let contents = fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load the config from the real home directory.
pub fn load() -> Result<ClientConfig, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

/// Save the config rooted at an explicit home directory, creating
/// `~/.curator/` if needed. Writes to a sibling temp file then renames, so
/// a crash never leaves a truncated config.
pub fn save_at(home: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(config)?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, yaml)?;
    fs::rename(&tmp, &path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips() {
        let home = TempDir::new().expect("tempdir");
        let mut config = ClientConfig::new("http://store.test/", "http://regen.test");
        config.auth_token = Some("tok".to_string());
        save_at(home.path(), &config).expect("save");

        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, config);
        // Trailing slash was normalized at construction.
        assert_eq!(loaded.store_url, "http://store.test");
    }

    #[test]
    fn missing_config_is_config_not_found() {
        let home = TempDir::new().expect("tempdir");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }), "got: {err}");
    }

    #[test]
    fn malformed_yaml_is_parse_with_path() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "store_url: [unclosed").expect("write");

        let err = load_at(home.path()).unwrap_err();
        match err {
            ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Parse, got: {other}"),
        }
    }

    #[test]
    fn retry_defaults_when_omitted() {
        let home = TempDir::new().expect("tempdir");
        let path = config_path_at(home.path());
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(
            &path,
            "store_url: http://s.test\nregen_url: http://r.test\n",
        )
        .expect("write");

        let config = load_at(home.path()).expect("load");
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.auth_token.is_none());
    }
}
