#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements [`EnvFiles`], the `.env` sources of a [`Loader`].
mod env_files;
pub use self::env_files::EnvFiles;

/// Implements the environment-based [`Loader`].
mod loader;
pub use self::loader::Loader;

/// Declares the [`ConfigLoadError`].
mod error;
pub use self::error::ConfigLoadError;

/// Deserializes human-readable durations, such as `10s` or `1m 30s`.
pub mod duration;

/// Re-exports the `config` crate for callers assembling their own sources.
pub use config;
