use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum accepted upload size in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// Idle session lifetime in seconds before cleanup
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Filename prefix for the merged download artifact
    #[serde(default = "default_download_prefix")]
    pub download_prefix: String,
}

const fn default_max_upload_mb() -> u64 {
    50
}

const fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_download_prefix() -> String {
    "merged".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_upload_mb: default_max_upload_mb(),
            session_ttl_secs: default_session_ttl_secs(),
            download_prefix: default_download_prefix(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/pdf-merger/config.toml, ./config.toml)
    pub fn load() -> Self {
        // Try user config
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("pdf-merger").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Try local config
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        // Return defaults
        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Reject values that would break the HTTP layer or the session sweeper.
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_mb == 0 {
            return Err(Error::ConfigInvalid {
                field: "max_upload_mb".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.session_ttl_secs == 0 {
            return Err(Error::ConfigInvalid {
                field: "session_ttl_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Upload ceiling in bytes, for the HTTP body limit.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn max_upload_bytes(&self) -> usize {
        (self.max_upload_mb as usize) * 1024 * 1024
    }
}
