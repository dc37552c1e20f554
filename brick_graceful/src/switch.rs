use self::completion::Completion;
use self::registry::{Task, TaskRegistry};
use crate::signal::SignalListener;
use crate::{ShutdownSignal, ShutdownTimeout, SwitchError};
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::select;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub mod completion;
mod registry;

/// Coordinates the graceful shutdown of an application.
///
/// A switch is a single coordination point where:
///
/// - arbitrary subsystems [register](Switch::on_shutdown) clean-up work under
///   a human-readable name,
/// - a termination signal or an explicit [call](Switch::shutdown) triggers
///   that clean-up work to run concurrently,
/// - callers [wait](Switch::wait) until the clean-up is complete or has run
///   out of its grace period, learning exactly which named tasks did not
///   finish in time.
///
/// The switch is triggered at most once. Triggering it via an OS signal and
/// via [`shutdown`](Switch::shutdown) converge on the same execution path.
///
/// ## Example
///
/// ```rust
/// use brick_graceful::Switch;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let switch = Switch::new(Duration::from_secs(10)).unwrap();
///
///     switch.on_shutdown("database", || async {
///         // Close the connection pool...
///     });
///
///     // Somewhere else, e.g. after the main logic is done
///     switch.shutdown();
///
///     // Block until all tasks complete or the grace period elapses
///     if let Err(timeout) = switch.wait().await {
///         eprintln!("{timeout}");
///     }
/// }
/// ```
///
/// ## Late registration
///
/// When triggered, the switch takes all tasks registered so far for execution.
/// A task registered after that moment is dropped without running (a `tracing`
/// warning is emitted). A registration racing with the trigger may land on
/// either side of that moment: there is no guarantee that it runs.
///
/// ## Failing tasks
///
/// Tasks have no error channel: the only failure the switch recognizes is a
/// task not finishing within the grace period. A task that panics is isolated
/// from the other tasks and from the switch itself, but is reported exactly
/// like a task that is still running.
#[derive(Clone)]
pub struct Switch {
    inner: Arc<SwitchInner>,
}

struct SwitchInner {
    registry: TaskRegistry,
    trigger: CancellationToken,
    completion: Completion,
    grace_period: Duration,
}

/// The lifecycle phase of a [`Switch`].
///
/// The only transitions are `Idle → Triggered` and then either
/// `Triggered → Completed` or `Triggered → TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchPhase {
    /// Not triggered yet; tasks may be registered.
    Idle,

    /// Triggered; the registered tasks are running.
    Triggered,

    /// All tasks finished within the grace period.
    Completed,

    /// The grace period elapsed before all tasks finished.
    TimedOut,
}

impl Switch {
    /// Creates a switch that triggers on [`ShutdownSignal::DEFAULT`] (interrupt
    /// and terminate) and allows its tasks up to `grace_period` to finish.
    ///
    /// See [`with_signals`](Switch::with_signals) for details.
    pub fn new(grace_period: Duration) -> Result<Self, SwitchError> {
        Self::with_signals(grace_period, ShutdownSignal::DEFAULT)
    }

    /// Creates a switch that triggers on any of the given `signals` and allows
    /// its tasks up to `grace_period` to finish.
    ///
    /// The signals are registered before this method returns, so a signal
    /// delivered right after is observed. The watcher is spawned on the current
    /// Tokio runtime: outside of one, [`SwitchError::NoRuntime`] is returned.
    /// An empty set of signals is allowed: such a switch is only triggered
    /// manually.
    pub fn with_signals(
        grace_period: Duration,
        signals: impl IntoIterator<Item = ShutdownSignal>,
    ) -> Result<Self, SwitchError> {
        let runtime = Handle::try_current().map_err(|_| SwitchError::NoRuntime)?;
        let listener = SignalListener::register(signals)?;

        let switch = Self {
            inner: Arc::new(SwitchInner {
                registry: TaskRegistry::new(),
                trigger: CancellationToken::new(),
                completion: Completion::new(),
                grace_period,
            }),
        };

        runtime.spawn(switch.clone().watch(listener));

        Ok(switch)
    }
}

impl Switch {
    /// Registers an asynchronous task to run on shutdown under the given
    /// `name`. Registering another task under the same name replaces the
    /// previous one.
    ///
    /// The task is not invoked until the switch is triggered.
    pub fn on_shutdown<F, Fut>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = Task::Async(Box::new(move || task().boxed()));

        self.inner.registry.register(name.into(), task);
    }

    /// Registers a blocking task to run on shutdown under the given `name`.
    /// The task is executed on the blocking thread pool, so it may freely
    /// perform synchronous I/O or sleep.
    ///
    /// Otherwise identical to [`on_shutdown`](Switch::on_shutdown).
    pub fn on_shutdown_blocking<F>(&self, name: impl Into<String>, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let task = Task::Blocking(Box::new(task));

        self.inner.registry.register(name.into(), task);
    }

    /// Triggers this switch and stops listening for OS signals.
    ///
    /// Only the first call has an effect: repeated calls are no-ops and never
    /// block.
    pub fn shutdown(&self) {
        if self.inner.registry.close() {
            info!("Triggering graceful shutdown");

            self.inner.trigger.cancel();
        }
    }

    /// Returns the handle on the outcome of this switch.
    ///
    /// The handle resolves once the switch has been triggered and all tasks
    /// have finished (`Ok(())`) or the grace period has elapsed
    /// (`Err(ShutdownTimeout)`). See [`Completion`] for how the outcome is
    /// shared between receivers.
    pub fn wait(&self) -> Completion {
        self.inner.completion.clone()
    }

    /// Waits until this switch is triggered, by a signal or manually.
    ///
    /// Resolves immediately if the switch is already triggered.
    pub async fn triggered(&self) {
        self.inner.trigger.cancelled().await;
    }

    /// Reports whether this switch has been triggered as of this moment.
    pub fn is_triggered(&self) -> bool {
        self.inner.trigger.is_cancelled()
    }

    /// Reports the current [`SwitchPhase`].
    pub fn phase(&self) -> SwitchPhase {
        self.inner.registry.phase()
    }

    /// Reports the grace period given to the tasks once triggered.
    pub fn grace_period(&self) -> Duration {
        self.inner.grace_period
    }
}

impl Switch {
    /// The watcher: waits for the trigger, runs the tasks, and publishes the
    /// outcome.
    async fn watch(self, mut listener: SignalListener) {
        select! {
            biased;
            _ = self.inner.trigger.cancelled() => {}
            signal = listener.recv() => {
                info!(%signal, "Shutdown signal intercepted");
            }
        }

        // Stop listening before converging with the manual path
        drop(listener);
        self.shutdown();

        let outcome = self.run_tasks().await;

        self.inner.registry.settle(match outcome {
            Ok(()) => SwitchPhase::Completed,
            Err(_) => SwitchPhase::TimedOut,
        });
        self.inner.completion.publish(outcome);
    }

    /// Runs all registered tasks concurrently and waits for them within the
    /// grace period.
    async fn run_tasks(&self) -> Result<(), ShutdownTimeout> {
        let tasks = self.inner.registry.take_snapshot();

        if tasks.is_empty() {
            info!("Graceful shutdown completed (no tasks registered)");
            return Ok(());
        }

        info!("Running {} shutdown task(s)", tasks.len());

        let mut running = JoinSet::new();

        for (name, task) in tasks {
            let inner = Arc::clone(&self.inner);

            running.spawn(async move {
                if task.run(&name).await {
                    inner.registry.finish(&name);
                    info!(task = name.as_str(), "Shutdown task completed");
                }
            });
        }

        // Saturates to a far-future deadline for oversized grace periods
        let deadline = tokio::time::sleep(self.inner.grace_period);
        tokio::pin!(deadline);

        loop {
            select! {
                biased;
                joined = running.join_next() => match joined {
                    Some(Ok(())) => continue,
                    Some(Err(error)) => {
                        error!(%error, "Shutdown task failed");
                        continue;
                    }
                    None if self.inner.registry.is_drained() => {
                        info!("Graceful shutdown completed");
                        return Ok(());
                    }
                    None => {
                        // Every task has stopped, but some failed: their
                        // names stay active until the deadline
                        (&mut deadline).await;
                        break;
                    }
                },
                _ = &mut deadline => break,
            }
        }

        // Tasks that outlive the deadline are left running
        running.detach_all();

        let remaining = self.inner.registry.remaining();

        for name in &remaining {
            error!(task = name.as_str(), "Did not complete within the grace period");
        }

        warn!("Some shutdown tasks did not complete gracefully");

        Err(ShutdownTimeout::new(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::Instant;

    /// Makes a switch that does not listen to any OS signals.
    fn make_switch(grace_period: Duration) -> Switch {
        Switch::with_signals(grace_period, []).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn no_tasks() {
        // Given
        let switch = make_switch(Duration::from_secs(5));
        let start = Instant::now();

        // When
        switch.shutdown();
        let outcome = switch.wait().recv().await;

        // Then
        assert_eq!(outcome, Ok(()));
        assert!(
            start.elapsed() < Duration::from_millis(1),
            "wait() should resolve immediately when no tasks are registered",
        );
        assert_eq!(switch.phase(), SwitchPhase::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn all_tasks_complete() {
        // Given
        let switch = make_switch(Duration::from_secs(5));
        let counter = Arc::new(AtomicUsize::new(0));
        for name in ["a", "b", "c"] {
            let counter = Arc::clone(&counter);
            switch.on_shutdown(name, move || async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        // When
        switch.shutdown();
        let outcome = switch.wait().recv().await;

        // Then
        assert_eq!(outcome, Ok(()));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(switch.phase(), SwitchPhase::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_reports_sorted_leftovers() {
        // Given
        let switch = make_switch(Duration::from_millis(1));
        switch.on_shutdown("test2", || tokio::time::sleep(Duration::from_secs(60)));
        switch.on_shutdown("test1", || tokio::time::sleep(Duration::from_secs(60)));
        switch.on_shutdown("test3", || async {});

        // When
        switch.shutdown();
        let error = switch.wait().recv().await.unwrap_err();

        // Then
        assert_eq!(error.to_string(), "shutdown timeout, tasks left: test1, test2");
        assert_eq!(switch.phase(), SwitchPhase::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_run_concurrently() {
        // Given
        let switch = make_switch(Duration::from_millis(300));
        for index in 0..5 {
            switch.on_shutdown(format!("task{index}"), || {
                tokio::time::sleep(Duration::from_millis(100))
            });
        }
        let start = Instant::now();

        // When
        switch.shutdown();
        let outcome = switch.wait().recv().await;

        // Then
        assert_eq!(outcome, Ok(()));
        assert!(
            start.elapsed() < Duration::from_millis(200),
            "tasks should run concurrently, not one after another",
        );
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_task_does_not_run() {
        // Given
        let switch = make_switch(Duration::from_secs(1));
        let replaced = Arc::new(AtomicBool::new(false));
        let replacing = Arc::new(AtomicBool::new(false));
        {
            let replaced = Arc::clone(&replaced);
            switch.on_shutdown("db", move || async move {
                replaced.store(true, Ordering::SeqCst);
            });
        }
        {
            let replacing = Arc::clone(&replacing);
            switch.on_shutdown("db", move || async move {
                replacing.store(true, Ordering::SeqCst);
            });
        }

        // When
        switch.shutdown();
        switch.wait().recv().await.unwrap();

        // Then
        assert!(!replaced.load(Ordering::SeqCst));
        assert!(replacing.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_task_is_reported_as_left() {
        // Given
        let switch = make_switch(Duration::from_millis(50));
        let completed = Arc::new(AtomicBool::new(false));
        switch.on_shutdown("broken", || async { panic!("clean-up failed") });
        {
            let completed = Arc::clone(&completed);
            switch.on_shutdown("healthy", move || async move {
                completed.store(true, Ordering::SeqCst);
            });
        }

        // When
        switch.shutdown();
        let error = switch.wait().recv().await.unwrap_err();

        // Then
        assert_eq!(error.tasks().to_vec(), vec!["broken"]);
        assert!(completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn triggered_resolves_on_manual_trigger() {
        // Given
        let switch = make_switch(Duration::from_secs(1));
        assert!(!switch.is_triggered());
        assert_eq!(switch.phase(), SwitchPhase::Idle);

        // When
        switch.shutdown();
        switch.triggered().await;

        // Then
        assert!(switch.is_triggered());
        assert_ne!(switch.phase(), SwitchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_grace_period_completes() {
        // Given
        let switch = make_switch(Duration::MAX);
        let ran = Arc::new(AtomicBool::new(false));
        {
            let ran = ran.clone();
            switch.on_shutdown("db", move || async move {
                ran.store(true, Ordering::SeqCst);
            });
        }

        // When
        switch.shutdown();
        let outcome = switch.wait().recv().await;

        // Then
        assert_eq!(outcome, Ok(()));
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(switch.phase(), SwitchPhase::Completed);
    }

    #[test]
    fn outside_runtime_is_an_error() {
        // When
        let result = Switch::with_signals(Duration::from_secs(1), []);

        // Then
        assert!(matches!(result, Err(SwitchError::NoRuntime)));
    }

    #[tokio::test]
    async fn grace_period_is_reported() {
        let switch = make_switch(Duration::from_secs(7));

        assert_eq!(switch.grace_period(), Duration::from_secs(7));
    }
}
