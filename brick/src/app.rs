use crate::{BaseLocator, LaunchError, Launchpad, WithBaseConfig};
use serde::de::DeserializeOwned;

/// The primary entry point for launching a service.
///
/// Use [`App::boot`] for a quick start with default settings, or
/// [`App::launchpad`] to customize the startup.
pub struct App;

impl App {
    /// Boots a service with default settings. See [`Launchpad::boot`].
    ///
    /// ## Example
    ///
    /// ```no_run
    /// use brick::{App, BaseLocator};
    ///
    /// fn main() -> Result<(), brick::LaunchError> {
    ///     App::boot(|locator: BaseLocator| async move {
    ///         locator.on_shutdown("goodbye", || async {
    ///             tracing::info!("Saying goodbye");
    ///         });
    ///
    ///         // Serve until a signal arrives
    ///         locator.switch().triggered().await;
    ///     })
    /// }
    /// ```
    pub fn boot<C, F, Fut>(init: F) -> Result<(), LaunchError>
    where
        C: WithBaseConfig + DeserializeOwned,
        F: FnOnce(BaseLocator<C>) -> Fut,
        Fut: Future<Output = ()>,
    {
        Self::launchpad().boot(init)
    }

    /// Creates a [`Launchpad`] for a customized startup.
    ///
    /// ## Example
    ///
    /// ```no_run
    /// use brick::{App, BaseLocator};
    ///
    /// fn main() -> Result<(), brick::LaunchError> {
    ///     App::launchpad()
    ///         .with_env_prefix("ORDERS")
    ///         .with_env_file(".env.local")
    ///         .with_worker_threads(2)
    ///         .boot(|locator: BaseLocator| async move {
    ///             locator.switch().triggered().await;
    ///         })
    /// }
    /// ```
    pub fn launchpad() -> Launchpad {
        Launchpad::new()
    }
}
