use crate::feed::DEFAULT_FEED_LIMIT;
use crate::profile::DEFAULT_DISPLAY_NAME;
use crate::storage::{DEFAULT_KEY_PREFIX, StorageKeys};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the configured data directory.
pub const DATA_DIR_ENV: &str = "GM_DATA_DIR";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key_prefix: default_key_prefix(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageConfig {
    /// Storage key names for the configured prefix.
    #[must_use]
    pub fn keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(&self.key_prefix)
    }

    /// Writer lock timeout.
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: default_feed_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_display_name")]
    pub default_name: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_name: default_display_name(),
        }
    }
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    2_000
}

const fn default_feed_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

/// Default config file location: `<config_dir>/gmledger/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gmledger/config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, the default location is used
/// when present and built-in defaults otherwise.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for
/// [`LedgerConfig`].
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => match default_config_path() {
            Some(default) if default.exists() => default,
            _ => return Ok(LedgerConfig::default()),
        },
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<LedgerConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Environment reader trait for dependency injection in tests.
pub trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
}

/// Real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Resolve where ledger data lives.
///
/// Precedence (highest wins):
/// 1. `cli_dir` (`--data-dir`)
/// 2. `GM_DATA_DIR`
/// 3. `storage.data_dir` from the config file
/// 4. `<data_dir>/gmledger` from the platform directories
///
/// # Errors
///
/// Returns an error when no candidate is available, which only happens on
/// platforms without a data directory and nothing configured.
pub fn resolve_data_dir(
    cli_dir: Option<&Path>,
    storage: &StorageConfig,
    env: &dyn EnvReader,
) -> Result<PathBuf> {
    if let Some(dir) = cli_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env.get(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = &storage.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("gmledger"))
        .with_context(|| format!("no data directory available; set {DATA_DIR_ENV}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct MockEnv(HashMap<&'static str, &'static str>);

    impl EnvReader for MockEnv {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| (*v).to_string())
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> MockEnv {
        MockEnv(pairs.iter().copied().collect())
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = LedgerConfig::default();
        assert_eq!(config.storage.key_prefix, "dapp_");
        assert_eq!(config.storage.lock_timeout(), Duration::from_secs(2));
        assert_eq!(config.feed.limit, 10);
        assert_eq!(config.profile.default_name, "Alex Sterling");
        assert!(config.storage.data_dir.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[feed]\nlimit = 3\n").expect("write config");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.feed.limit, 3);
        assert_eq!(config.storage.key_prefix, "dapp_");
    }

    #[test]
    fn full_file_parses() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/tmp/gm\"\nkey_prefix = \"alice_\"\nlock_timeout_ms = 50\n\n[profile]\ndefault_name = \"anon\"\n",
        )
        .expect("write config");

        let config = load_config(Some(&path)).expect("load");
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/gm")));
        assert_eq!(config.storage.keys().activities, "alice_activities");
        assert_eq!(config.storage.lock_timeout(), Duration::from_millis(50));
        assert_eq!(config.profile.default_name, "anon");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[feed\nlimit = ").expect("write config");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn cli_dir_wins() {
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..StorageConfig::default()
        };
        let resolved = resolve_data_dir(
            Some(Path::new("/from/cli")),
            &storage,
            &env(&[("GM_DATA_DIR", "/from/env")]),
        )
        .expect("resolve");
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn env_beats_config() {
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..StorageConfig::default()
        };
        let resolved =
            resolve_data_dir(None, &storage, &env(&[("GM_DATA_DIR", "/from/env")])).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/from/env"));
    }

    #[test]
    fn config_beats_platform_default() {
        let storage = StorageConfig {
            data_dir: Some(PathBuf::from("/from/config")),
            ..StorageConfig::default()
        };
        let resolved = resolve_data_dir(None, &storage, &env(&[])).expect("resolve");
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
