//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the application can start with
//! zero configuration for local development.

use std::path::PathBuf;

use kirala_shared::constants::DEFAULT_MAX_IMAGE_BYTES;

/// How an active rental reaches its terminal state.
///
/// The original product never completed rentals at all; which mechanism is
/// right is a product decision, so both exist behind this switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    /// The renter (or owner) explicitly returns the toy.
    ManualReturn,
    /// A periodic sweep completes rentals whose paid duration has elapsed.
    AutoExpire,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the SQLite database.
    /// Env: `DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Filesystem path where uploaded images are stored.
    /// Env: `BLOB_STORAGE_PATH`
    /// Default: `./media`
    pub blob_dir: PathBuf,

    /// Maximum accepted image upload size in bytes.
    /// Env: `MAX_IMAGE_BYTES`
    /// Default: 10 MiB.
    pub max_image_bytes: usize,

    /// Rental completion mechanism.
    /// Env: `RENTAL_COMPLETION` (`manual` / `auto`)
    /// Default: `manual`.
    pub completion: CompletionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            blob_dir: PathBuf::from("./media"),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            completion: CompletionPolicy::ManualReturn,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(path) = std::env::var("BLOB_STORAGE_PATH") {
            config.blob_dir = PathBuf::from(path);
        }

        if let Ok(val) = std::env::var("MAX_IMAGE_BYTES") {
            if let Ok(n) = val.parse::<usize>() {
                config.max_image_bytes = n;
            } else {
                tracing::warn!(value = %val, "Invalid MAX_IMAGE_BYTES, using default");
            }
        }

        if let Ok(val) = std::env::var("RENTAL_COMPLETION") {
            match val.as_str() {
                "manual" => config.completion = CompletionPolicy::ManualReturn,
                "auto" => config.completion = CompletionPolicy::AutoExpire,
                other => {
                    tracing::warn!(value = %other, "Invalid RENTAL_COMPLETION, using default");
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.blob_dir, PathBuf::from("./media"));
        assert_eq!(config.completion, CompletionPolicy::ManualReturn);
        assert_eq!(config.max_image_bytes, DEFAULT_MAX_IMAGE_BYTES);
    }
}
