use crate::{BaseLocator, LaunchError, WithBaseConfig};
use brick_config::{EnvFiles, Loader};
use brick_graceful::ShutdownSignal;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tokio::runtime::{Builder, Runtime};
use tokio::select;
use tracing::{error, info};

const DEFAULT_ENV_PREFIX: &str = "APP";

/// Configures and launches a service.
///
/// Booting goes through the following stages:
///
/// 1. **Configuration:** the env files are applied and the service config is
///    deserialized from the prefixed environment variables.
/// 2. **Runtime:** the multi-threaded Tokio [`Runtime`] is built.
/// 3. **Locator:** logging is installed and the shutdown switch is created
///    (see [`BaseLocator`]).
/// 4. **Main:** the service's main future runs until it returns or the switch
///    is triggered, whichever happens first.
/// 5. **Shutdown:** the switch is triggered (if it was not yet) and its
///    outcome is awaited and returned.
pub struct Launchpad {
    env_prefix: String,
    env_files: Option<EnvFiles>,
    worker_threads: Option<usize>,
    signals: Vec<ShutdownSignal>,
}

impl Default for Launchpad {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env_files: None,
            worker_threads: None,
            signals: ShutdownSignal::DEFAULT.to_vec(),
        }
    }
}

impl Launchpad {
    /// Creates a launchpad with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the prefix of the environment variables that hold the
    /// configuration. For example, with the default prefix `"APP"`, variable
    /// `APP_SHUTDOWN_TIMEOUT` sets the `shutdown_timeout` key.
    pub fn with_env_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            env_prefix: prefix.into(),
            ..self
        }
    }

    /// Adds a required env file. Once any env file is added, the
    /// [default files](EnvFiles::defaults) are no longer loaded.
    pub fn with_env_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_env_files(EnvFiles::required([path]))
    }

    /// Adds the given env files, replacing the defaults like
    /// [`with_env_file`](Launchpad::with_env_file).
    pub fn with_env_files(self, env_files: EnvFiles) -> Self {
        let env_files = match self.env_files {
            Some(existing) => existing.and(env_files),
            None => env_files,
        };

        Self {
            env_files: Some(env_files),
            ..self
        }
    }

    /// Specifies the number of worker threads of the runtime. Defaults to the
    /// number of CPU cores.
    pub fn with_worker_threads(self, worker_threads: usize) -> Self {
        Self {
            worker_threads: Some(worker_threads),
            ..self
        }
    }

    /// Specifies the OS signals that trigger the shutdown. Defaults to
    /// [`ShutdownSignal::DEFAULT`].
    pub fn with_signals(self, signals: impl IntoIterator<Item = ShutdownSignal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            ..self
        }
    }
}

impl Launchpad {
    /// Loads the configuration, builds the runtime and runs the service to
    /// completion, blocking the current thread.
    ///
    /// The `init` closure receives the [`BaseLocator`] and returns the main
    /// future of the service. Returns `Ok(())` once every shutdown task has
    /// finished, or [`LaunchError::Shutdown`] if some did not finish in time.
    pub fn boot<C, F, Fut>(self, init: F) -> Result<(), LaunchError>
    where
        C: WithBaseConfig + DeserializeOwned,
        F: FnOnce(BaseLocator<C>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let config = self.make_loader().load::<C>()?;
        let runtime = self.make_runtime()?;

        runtime.block_on(self.launch(config, init))
    }

    /// Runs the service on the current runtime with an already loaded config.
    ///
    /// This is the async part of [`boot`](Launchpad::boot).
    pub async fn launch<C, F, Fut>(self, config: C, init: F) -> Result<(), LaunchError>
    where
        C: WithBaseConfig,
        F: FnOnce(BaseLocator<C>) -> Fut,
        Fut: Future<Output = ()>,
    {
        let locator = BaseLocator::with_signals(config, self.signals)?;
        let main = init(locator.clone());

        // Run the main logic, keeping an eye on the switch
        select! {
            biased;
            _ = locator.switch().triggered() => {},
            _ = main => {},
        }

        // Trigger the switch in case it is not triggered yet
        locator.shutdown();

        match locator.wait().await {
            Ok(()) => {
                info!("Service stopped");

                Ok(())
            }
            Err(timeout) => {
                error!(%timeout, "Service stopped with unfinished shutdown tasks");

                Err(LaunchError::Shutdown(timeout))
            }
        }
    }

    fn make_loader(&self) -> Loader {
        let loader = Loader::new(&self.env_prefix);

        match &self.env_files {
            Some(env_files) => loader.with_env_files(env_files.clone()),
            None => loader,
        }
    }

    fn make_runtime(&self) -> Result<Runtime, LaunchError> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all();

        if let Some(worker_threads) = self.worker_threads {
            builder.worker_threads(worker_threads);
        }

        builder.build().map_err(LaunchError::Runtime)
    }
}
