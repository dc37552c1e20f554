use std::path::PathBuf;
use thiserror::Error;

/// Represents a failure to load the application configuration.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// A required env file does not exist or could not be parsed.
    #[error("failed to apply env file {}: {source}", .path.display())]
    EnvFile {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: dotenvy::Error,
    },

    /// The environment could not be deserialized into the requested type.
    #[error("failed to deserialize config: {0}")]
    Config(#[from] config::ConfigError),
}
