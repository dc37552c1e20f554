#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

/// Implements the [`Switch`] facade and its one-shot [`Completion`].
mod switch;
pub use self::switch::completion::Completion;
pub use self::switch::{Switch, SwitchPhase};

/// Implements the [`ShutdownSignal`] set observed by a [`Switch`].
mod signal;
pub use self::signal::ShutdownSignal;

/// Implements the error types reported by a [`Switch`].
mod error;
pub use self::error::{ShutdownTimeout, SwitchError};
