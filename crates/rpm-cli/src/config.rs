//! Configuration file management for rpm.
//!
//! Provides a TOML-based config file at `~/.config/rpm-matrix/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use rpm_core::GeminiConfig;
use rpm_store::StoreConfig;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the rpm config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/rpm-matrix` or
/// `~/.config/rpm-matrix`, on macOS too.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("rpm-matrix");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("rpm-matrix")
}

/// Return the path to the rpm config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`. Returns an error if it does not exist.
fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Mask an API key for display, keeping a few characters at each end.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct RpmConfig {
    pub gemini: GeminiConfig,
    pub store: StoreConfig,
}

impl RpmConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `GEMINI_API_KEY` env > `API_KEY` env > `gemini.api_key` > none
    /// - Model: `RPM_GEMINI_MODEL` env > `gemini.model` > `GeminiConfig::DEFAULT_MODEL`
    /// - Base URL: `RPM_GEMINI_BASE_URL` env > `gemini.base_url` > Google endpoint
    /// - Data dir: `cli_data_dir` > `RPM_DATA_DIR` env > `storage.data_dir` > XDG data dir
    ///
    /// A missing API key is not an error here; generation reports it when it
    /// is attempted.
    pub fn resolve(cli_data_dir: Option<&Path>) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            load_config_from(&path)?
        } else {
            ConfigFile::default()
        };
        Ok(Self::resolve_with(cli_data_dir, file_config))
    }

    fn resolve_with(cli_data_dir: Option<&Path>, file_config: ConfigFile) -> Self {
        let ConfigFile { gemini, storage } = file_config;

        let api_key = env_nonempty("GEMINI_API_KEY")
            .or_else(|| env_nonempty("API_KEY"))
            .or(gemini.api_key);

        let model = env_nonempty("RPM_GEMINI_MODEL")
            .or(gemini.model)
            .unwrap_or_else(|| GeminiConfig::DEFAULT_MODEL.to_string());

        let base_url = env_nonempty("RPM_GEMINI_BASE_URL")
            .or(gemini.base_url)
            .unwrap_or_else(|| GeminiConfig::DEFAULT_BASE_URL.to_string());

        let store = if let Some(dir) = cli_data_dir {
            StoreConfig::new(dir)
        } else if let Some(dir) = std::env::var_os("RPM_DATA_DIR") {
            StoreConfig::new(dir)
        } else if let Some(dir) = storage.data_dir {
            StoreConfig::new(dir)
        } else {
            StoreConfig::new(StoreConfig::default_data_dir())
        };

        Self {
            gemini: GeminiConfig::new(api_key)
                .with_model(model)
                .with_base_url(base_url),
            store,
        }
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 5] = [
        "GEMINI_API_KEY",
        "API_KEY",
        "RPM_GEMINI_MODEL",
        "RPM_GEMINI_BASE_URL",
        "RPM_DATA_DIR",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    fn clear_env() {
        for var in ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn file_with_key(key: &str) -> ConfigFile {
        ConfigFile {
            gemini: GeminiSection {
                api_key: Some(key.to_string()),
                model: Some("gemini-file".to_string()),
                base_url: None,
            },
            storage: StorageSection {
                data_dir: Some(PathBuf::from("/from/file")),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rpm-matrix").join("config.toml");

        save_config_to(&file_with_key("secret-key-123"), &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.gemini.api_key.as_deref(), Some("secret-key-123"));
        assert_eq!(loaded.gemini.model.as_deref(), Some("gemini-file"));
        assert!(loaded.gemini.base_url.is_none());
        assert_eq!(loaded.storage.data_dir, Some(PathBuf::from("/from/file")));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        save_config_to(&ConfigFile::default(), &path).unwrap();

        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn empty_file_parses_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert!(loaded.gemini.api_key.is_none());
        assert!(loaded.storage.data_dir.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[gemini\napi_key = ").unwrap();
        let msg = load_config_from(&path).unwrap_err().to_string();
        assert!(msg.contains("failed to parse config file"), "got: {msg}");
    }

    #[test]
    fn env_overrides_config_file() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("GEMINI_API_KEY", "env-key") };
        unsafe { std::env::set_var("API_KEY", "legacy-key") };
        unsafe { std::env::set_var("RPM_GEMINI_MODEL", "gemini-env") };
        unsafe { std::env::set_var("RPM_DATA_DIR", "/from/env") };

        let config = RpmConfig::resolve_with(None, file_with_key("file-key"));
        clear_env();

        assert_eq!(config.gemini.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.gemini.model, "gemini-env");
        assert_eq!(config.store.data_dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn legacy_api_key_var_is_honoured() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("API_KEY", "legacy-key") };

        let config = RpmConfig::resolve_with(None, file_with_key("file-key"));
        clear_env();

        assert_eq!(config.gemini.api_key.as_deref(), Some("legacy-key"));
    }

    #[test]
    fn cli_data_dir_overrides_all() {
        let _lock = lock_env();
        clear_env();
        unsafe { std::env::set_var("RPM_DATA_DIR", "/from/env") };

        let config = RpmConfig::resolve_with(Some(Path::new("/from/cli")), file_with_key("k"));
        clear_env();

        assert_eq!(config.store.data_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn file_values_used_when_env_unset() {
        let _lock = lock_env();
        clear_env();

        let config = RpmConfig::resolve_with(None, file_with_key("file-key"));

        assert_eq!(config.gemini.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.gemini.model, "gemini-file");
        assert_eq!(config.gemini.base_url, GeminiConfig::DEFAULT_BASE_URL);
        assert_eq!(config.store.data_dir, PathBuf::from("/from/file"));
    }

    #[test]
    fn missing_key_resolves_without_error() {
        let _lock = lock_env();
        clear_env();

        let config = RpmConfig::resolve_with(None, ConfigFile::default());

        assert!(config.gemini.api_key.is_none());
        assert_eq!(config.gemini.model, GeminiConfig::DEFAULT_MODEL);
        assert!(config.store.data_dir.ends_with(StoreConfig::APP_DIR));
    }

    #[test]
    fn mask_key_hides_middle() {
        assert_eq!(mask_key("AIzaSyABCDEFGH1234"), "AIza...1234");
        assert_eq!(mask_key("short"), "*****");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("rpm-matrix/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
