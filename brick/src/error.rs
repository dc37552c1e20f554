use brick_config::ConfigLoadError;
use brick_graceful::{ShutdownTimeout, SwitchError};
use thiserror::Error;

/// Represents a failure to boot or to gracefully stop a service.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    /// The async runtime could not be built.
    #[error("failed to build the async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The shutdown switch could not listen for OS signals.
    #[error(transparent)]
    Switch(#[from] SwitchError),

    /// Some shutdown tasks did not finish within the grace period.
    #[error(transparent)]
    Shutdown(#[from] ShutdownTimeout),
}
