use crate::{BaseConfig, LaunchError, WithBaseConfig};
use brick_graceful::{Completion, ShutdownSignal, Switch};
use std::sync::Arc;
use tracing::info;

/// Holds the resources shared across a service: its configuration and its
/// shutdown [`Switch`].
///
/// Cloning is cheap: clones share the same configuration and switch.
pub struct BaseLocator<C = BaseConfig> {
    config: Arc<C>,
    switch: Switch,
}

impl<C> Clone for BaseLocator<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            switch: self.switch.clone(),
        }
    }
}

impl<C> BaseLocator<C>
where
    C: WithBaseConfig,
{
    /// Installs logging as configured, then creates a switch that triggers on
    /// [`ShutdownSignal::DEFAULT`] with the configured shutdown timeout.
    ///
    /// Must be called from within a Tokio runtime, otherwise fails with
    /// [`SwitchError::NoRuntime`](crate::SwitchError::NoRuntime).
    pub fn new(config: C) -> Result<Self, LaunchError> {
        Self::with_signals(config, ShutdownSignal::DEFAULT)
    }

    /// Same as [`new`](BaseLocator::new), but the switch triggers on the given
    /// signals instead. An empty set leaves only manual triggering.
    pub fn with_signals(
        config: C,
        signals: impl IntoIterator<Item = ShutdownSignal>,
    ) -> Result<Self, LaunchError> {
        let base = config.base();

        // A subscriber installed earlier (e.g., by a test harness) stays in place
        brick_tracing::init(base.log());

        let switch = Switch::with_signals(base.shutdown_timeout(), signals)?;

        info!(
            environment = base.environment(),
            service = base.service_name(),
            shutdown_timeout = ?base.shutdown_timeout(),
            "Service starting",
        );

        Ok(Self {
            config: Arc::new(config),
            switch,
        })
    }
}

impl<C> BaseLocator<C> {
    /// Exposes the service configuration.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Exposes the shutdown switch.
    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    /// See [`Switch::on_shutdown`].
    pub fn on_shutdown<F, Fut>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.switch.on_shutdown(name, task);
    }

    /// See [`Switch::on_shutdown_blocking`].
    pub fn on_shutdown_blocking<F>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.switch.on_shutdown_blocking(name, task);
    }

    /// See [`Switch::shutdown`].
    pub fn shutdown(&self) {
        self.switch.shutdown();
    }

    /// See [`Switch::wait`].
    pub fn wait(&self) -> Completion {
        self.switch.wait()
    }
}
