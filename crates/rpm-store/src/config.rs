use std::env;
use std::path::PathBuf;

/// Storage configuration.
///
/// The binary resolves the data directory from its flag, `RPM_DATA_DIR`, or
/// the config file, and falls back to [`StoreConfig::default_data_dir`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per storage key.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Directory name used under the XDG data home.
    pub const APP_DIR: &str = "rpm-matrix";

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The XDG data directory for the application.
    ///
    /// Like the config directory, this ignores the macOS-specific location
    /// returned by `dirs::data_dir()` so every platform uses the same layout.
    pub fn default_data_dir() -> PathBuf {
        if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(Self::APP_DIR);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join(Self::APP_DIR)
    }

    /// Path of the dashboard log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("rpm.log")
    }
}
