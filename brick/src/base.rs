use brick_tracing::TracingConfig;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// The configuration section shared by every service.
///
/// Application configs embed it with `#[serde(flatten)]` and expose it through
/// [`WithBaseConfig`]:
///
/// ```
/// use brick::{BaseConfig, WithBaseConfig};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct ServiceConfig {
///     #[serde(flatten)]
///     base: BaseConfig,
///     greeting: String,
/// }
///
/// impl WithBaseConfig for ServiceConfig {
///     fn base(&self) -> &BaseConfig {
///         &self.base
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    #[serde(alias = "env")]
    environment: String,
    #[serde(alias = "service")]
    service_name: String,
    #[serde(deserialize_with = "brick_config::duration::deserialize")]
    shutdown_timeout: Duration,
    #[serde(alias = "tracing")]
    log: TracingConfig,
}

impl BaseConfig {
    /// Replaces the environment name.
    pub fn with_environment(self, environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..self
        }
    }

    /// Replaces the service name.
    pub fn with_service_name(self, service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..self
        }
    }

    /// Replaces the grace period given to shutdown tasks.
    pub fn with_shutdown_timeout(self, shutdown_timeout: Duration) -> Self {
        Self {
            shutdown_timeout,
            ..self
        }
    }

    /// Replaces the logging section.
    pub fn with_log(self, log: TracingConfig) -> Self {
        Self { log, ..self }
    }
}

impl BaseConfig {
    /// Reports the name of the environment the service runs in, e.g. `dev` or
    /// `prod`.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Reports the service name. May be empty.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Reports how long shutdown tasks may run once the service is told to
    /// stop.
    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Reports the logging section.
    pub fn log(&self) -> &TracingConfig {
        &self.log
    }
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            service_name: String::new(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            log: TracingConfig::default(),
        }
    }
}

/// Gives access to the [`BaseConfig`] embedded in an application config.
pub trait WithBaseConfig {
    /// Returns the embedded [`BaseConfig`].
    fn base(&self) -> &BaseConfig;
}

impl WithBaseConfig for BaseConfig {
    fn base(&self) -> &BaseConfig {
        self
    }
}
