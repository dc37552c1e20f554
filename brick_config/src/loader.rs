use crate::{ConfigLoadError, EnvFiles};
use config::{Config, Environment};
use serde::de::DeserializeOwned;
use tracing::debug;

const PREFIX_SEPARATOR: &str = "_";
const NESTING_SEPARATOR: &str = "__";

/// Loads a configuration structure from prefixed environment variables.
///
/// Before reading the environment, the loader applies its [`EnvFiles`]: the
/// ones given via [`with_env_files`](Loader::with_env_files), or the
/// [defaults](EnvFiles::defaults) for its prefix when none were given.
///
/// Variable `APP_SERVICE_NAME` becomes key `service_name` for prefix `APP`.
/// Nested sections are separated by a double underscore. Values that look like
/// numbers or booleans are parsed as such.
#[derive(Debug, Clone)]
pub struct Loader {
    prefix: String,
    env_files: Option<EnvFiles>,
}

impl Loader {
    /// Creates a loader for variables that start with the given prefix. An
    /// empty prefix reads every variable of the environment.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            env_files: None,
        }
    }

    /// Appends the given files to the env files of this loader, replacing the
    /// defaults. Pass an empty [`EnvFiles`] to skip env files altogether.
    pub fn with_env_files(mut self, env_files: EnvFiles) -> Self {
        self.env_files = Some(match self.env_files {
            Some(existing) => existing.and(env_files),
            None => env_files,
        });

        self
    }

    /// Reports the variable prefix of this loader.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Applies the env files, then deserializes `T` from the environment.
    pub fn load<T>(&self) -> Result<T, ConfigLoadError>
    where
        T: DeserializeOwned,
    {
        match &self.env_files {
            Some(env_files) => env_files.load()?,
            None => EnvFiles::defaults(&self.prefix).load()?,
        }

        let config = Config::builder()
            .add_source(self.make_environment())
            .build()?;

        debug!(prefix = self.prefix.as_str(), "Loaded configuration from environment");

        Ok(config.try_deserialize()?)
    }

    fn make_environment(&self) -> Environment {
        let environment = if self.prefix.is_empty() {
            Environment::default()
        } else {
            Environment::with_prefix(&self.prefix).prefix_separator(PREFIX_SEPARATOR)
        };

        environment.separator(NESTING_SEPARATOR).try_parsing(true)
    }
}
