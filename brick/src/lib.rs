#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`BaseConfig`] section shared by all services.
mod base;
pub use self::base::{BaseConfig, WithBaseConfig};

/// Implements the [`BaseLocator`] service container.
mod locator;
pub use self::locator::BaseLocator;

/// Declares the [`LaunchError`].
mod error;
pub use self::error::LaunchError;

/// Implements the [`Launchpad`] utility for booting an [`App`].
mod launchpad;
pub use self::launchpad::Launchpad;

/// Implements the [`App`] facade.
mod app;
pub use self::app::App;

/// Re-exports the public API of `brick-graceful` in the root of this crate for
/// convenience.
pub use brick_graceful::*;

/// Re-exports the public API of `brick-config` for convenience.
pub use brick_config as config;

/// Re-exports the logging configuration section for convenience.
pub use brick_tracing::{FormatFlavor, TracingConfig, Verbosity};

/// Re-exports the public API of `tokio` for convenience.
pub use tokio;

/// Re-exports the public API of `tracing` for convenience.
pub use tracing;
