use crate::SwitchPhase;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, error, warn};

/// A named unit of clean-up work, executed once when the switch triggers.
pub(crate) enum Task {
    /// Produces a future that is polled on the async runtime.
    Async(Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>),

    /// Runs on the blocking thread pool.
    Blocking(Box<dyn FnOnce() + Send>),
}

impl Task {
    /// Runs this task to completion and reports whether it returned normally.
    ///
    /// A panic inside an [`Async`](Task::Async) task unwinds through this
    /// method. A panic inside a [`Blocking`](Task::Blocking) task is caught by
    /// the blocking pool, logged, and reported as `false`.
    pub(crate) async fn run(self, name: &str) -> bool {
        match self {
            Self::Async(task) => {
                task().await;
                true
            }
            Self::Blocking(task) => match tokio::task::spawn_blocking(task).await {
                Ok(()) => true,
                Err(error) => {
                    error!(task = name, %error, "Blocking shutdown task failed");
                    false
                }
            },
        }
    }
}

/// Thread-safe storage of the registered [`Task`]s and of the bookkeeping that
/// accompanies their execution.
///
/// A single lock guards everything: the registered tasks, the trigger guard,
/// the set of active task names, and the current [`SwitchPhase`].
pub(crate) struct TaskRegistry {
    state: Mutex<RegistryState>,
}

struct RegistryState {
    closed: bool,
    snapshot_taken: bool,
    phase: SwitchPhase,
    tasks: BTreeMap<String, Task>,
    active: BTreeSet<String>,
}

impl TaskRegistry {
    /// Internal constructor.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState {
                closed: false,
                snapshot_taken: false,
                phase: SwitchPhase::Idle,
                tasks: BTreeMap::new(),
                active: BTreeSet::new(),
            }),
        }
    }

    /// Stores the given task under the given name, replacing any task
    /// previously stored under the same name.
    ///
    /// Once the tasks have been [taken](TaskRegistry::take_snapshot) for
    /// execution, the task is dropped and `false` is returned.
    pub(crate) fn register(&self, name: String, task: Task) -> bool {
        let mut state = self.state.lock();

        if state.snapshot_taken {
            warn!(
                task = name.as_str(),
                "Shutdown task registered after the tasks were started; it will not run",
            );
            return false;
        }

        if state.tasks.insert(name.clone(), task).is_some() {
            debug!(task = name.as_str(), "Replaced previously registered shutdown task");
        }

        true
    }

    /// Flips the trigger guard. Returns `true` only for the single call that
    /// performed the transition.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();

        if state.closed {
            return false;
        }

        state.closed = true;
        state.phase = SwitchPhase::Triggered;

        true
    }

    /// Takes the registered tasks for execution, leaving the registry closed
    /// for further registrations, and marks every taken task as active.
    pub(crate) fn take_snapshot(&self) -> Vec<(String, Task)> {
        let mut state = self.state.lock();

        state.snapshot_taken = true;
        let tasks = std::mem::take(&mut state.tasks);
        state.active.extend(tasks.keys().cloned());

        tasks.into_iter().collect()
    }

    /// Marks the task with the given name as finished.
    pub(crate) fn finish(&self, name: &str) {
        self.state.lock().active.remove(name);
    }

    /// Reports whether every taken task has finished.
    pub(crate) fn is_drained(&self) -> bool {
        self.state.lock().active.is_empty()
    }

    /// Returns the (sorted) names of the tasks that have not finished yet.
    pub(crate) fn remaining(&self) -> Vec<String> {
        self.state.lock().active.iter().cloned().collect()
    }

    /// Records the final phase.
    pub(crate) fn settle(&self, phase: SwitchPhase) {
        self.state.lock().phase = phase;
    }

    /// Reports the current phase.
    pub(crate) fn phase(&self) -> SwitchPhase {
        self.state.lock().phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    fn noop() -> Task {
        Task::Async(Box::new(|| async {}.boxed()))
    }

    #[test]
    fn close_once() {
        // Given
        let registry = TaskRegistry::new();

        // When
        let first = registry.close();
        let second = registry.close();

        // Then
        assert!(first);
        assert!(!second);
        assert_eq!(registry.phase(), SwitchPhase::Triggered);
    }

    #[test]
    fn last_registration_wins() {
        // Given
        let registry = TaskRegistry::new();
        registry.register("db".to_string(), noop());
        registry.register("db".to_string(), noop());
        registry.register("http".to_string(), noop());

        // When
        let names = registry
            .take_snapshot()
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();

        // Then
        assert_eq!(names, vec!["db", "http"]);
        assert_eq!(registry.remaining(), vec!["db", "http"]);
    }

    #[test]
    fn registration_after_snapshot_is_dropped() {
        // Given
        let registry = TaskRegistry::new();
        registry.close();
        let _ = registry.take_snapshot();

        // When
        let accepted = registry.register("late".to_string(), noop());

        // Then
        assert!(!accepted);
        assert!(registry.take_snapshot().is_empty());
        assert!(registry.is_drained());
    }

    #[test]
    fn finish_removes_from_active() {
        // Given
        let registry = TaskRegistry::new();
        registry.register("a".to_string(), noop());
        registry.register("b".to_string(), noop());
        let _ = registry.take_snapshot();

        // When
        registry.finish("a");

        // Then
        assert_eq!(registry.remaining(), vec!["b"]);
        assert!(!registry.is_drained());

        // When
        registry.finish("b");

        // Then
        assert!(registry.is_drained());
    }
}
