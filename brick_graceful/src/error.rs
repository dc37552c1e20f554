use crate::ShutdownSignal;
use std::io;
use thiserror::Error;

/// Reports the named tasks that failed to finish within the grace period of a
/// [`Switch`](crate::Switch).
///
/// The task names are sorted lexicographically, so the error message is
/// deterministic regardless of the order in which the tasks were registered or
/// executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("shutdown timeout, tasks left: {}", .tasks.join(", "))]
pub struct ShutdownTimeout {
    tasks: Vec<String>,
}

impl ShutdownTimeout {
    /// Internal constructor. Sorts the given task names.
    pub(crate) fn new(tasks: impl IntoIterator<Item = String>) -> Self {
        let mut tasks = tasks.into_iter().collect::<Vec<_>>();
        tasks.sort();

        Self { tasks }
    }

    /// Returns the names of the tasks that were still running (or had
    /// panicked) when the grace period elapsed.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }
}

/// Represents a failure to construct a [`Switch`](crate::Switch).
#[derive(Debug, Error)]
pub enum SwitchError {
    /// The platform refused to deliver the given signal to this process.
    #[error("failed to listen for {signal}: {source}")]
    Signal {
        /// The signal that could not be registered.
        signal: ShutdownSignal,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The switch was constructed outside of a Tokio runtime.
    #[error("a shutdown switch must be created within a Tokio runtime")]
    NoRuntime,
}
