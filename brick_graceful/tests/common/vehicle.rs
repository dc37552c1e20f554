use brick_graceful::{ShutdownTimeout, Switch};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// How long a test is willing to wait for a switch to publish its outcome.
pub const REASONABLE_TIME: Duration = Duration::from_secs(1);

/// Helper struct for testing [`Switch`].
pub struct SwitchTestVehicle {
    switch: Switch,
    markers: Vec<Arc<AtomicBool>>,
}

impl SwitchTestVehicle {
    /// Wraps the given switch.
    pub fn new(switch: Switch) -> Self {
        Self {
            switch,
            markers: vec![],
        }
    }

    /// Exposes the wrapped switch.
    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    /// Registers a task that flips its marker as soon as it is invoked.
    pub fn register_task(&mut self, name: &str) {
        self.register_slow_task(name, Duration::ZERO);
    }

    /// Registers a task that sleeps for the given duration before flipping its
    /// marker.
    pub fn register_slow_task(&mut self, name: &str, duration: Duration) {
        let marker = Arc::new(AtomicBool::new(false));
        let task_marker = marker.clone();

        self.switch.on_shutdown(name, move || async move {
            tokio::time::sleep(duration).await;
            task_marker.store(true, Ordering::SeqCst);
        });

        self.markers.push(marker);
    }

    /// Waits (within a reasonable time) for the outcome of the switch.
    pub async fn outcome(&self) -> Result<(), ShutdownTimeout> {
        tokio::time::timeout(REASONABLE_TIME, self.switch.wait().recv())
            .await
            .expect("failed to shutdown in reasonable time")
    }

    /// Asserts that none of the registered tasks has finished yet.
    pub fn assert_tasks_not_finished(&self) {
        for marker in &self.markers {
            assert_eq!(marker.load(Ordering::SeqCst), false);
        }
    }

    /// Asserts that all registered tasks have finished.
    pub fn assert_tasks_finished(&self) {
        for marker in &self.markers {
            assert_eq!(marker.load(Ordering::SeqCst), true);
        }
    }
}
