mod common;

#[cfg(test)]
mod tests {
    use crate::common::vehicle::{REASONABLE_TIME, SwitchTestVehicle};
    use brick_graceful::{ShutdownSignal, Switch, SwitchPhase};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn manual() {
        // Given
        let mut vehicle = SwitchTestVehicle::new(
            Switch::with_signals(Duration::from_secs(60), [ShutdownSignal::Terminate]).unwrap(),
        );
        vehicle.register_task("test");

        // When
        vehicle.switch().shutdown();
        let outcome = vehicle.outcome().await;

        // Then
        assert_eq!(outcome, Ok(()));
        vehicle.assert_tasks_finished();

        // Repeated trigger neither panics nor blocks
        vehicle.switch().shutdown();
        vehicle.switch().shutdown();
        assert_eq!(vehicle.switch().phase(), SwitchPhase::Completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_triggers_run_tasks_once() {
        // Given
        let switch = Switch::with_signals(Duration::from_secs(60), []).unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        {
            let runs = runs.clone();
            switch.on_shutdown("counted", move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
            });
        }

        // When
        let triggers = (0..16)
            .map(|_| {
                let switch = switch.clone();
                tokio::spawn(async move { switch.shutdown() })
            })
            .collect::<Vec<_>>();
        for trigger in triggers {
            trigger.await.unwrap();
        }
        let outcome = tokio::time::timeout(REASONABLE_TIME, switch.wait().recv())
            .await
            .unwrap();

        // Then
        assert_eq!(outcome, Ok(()));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_outcome_can_be_received_repeatedly() {
        // Given
        let switch = Switch::with_signals(Duration::from_secs(60), []).unwrap();
        let first = switch.wait();
        let second = switch.wait();

        // When
        switch.shutdown();

        // Then
        for receiver in [&first, &second, &first, &switch.wait()] {
            let outcome = tokio::time::timeout(REASONABLE_TIME, receiver.recv())
                .await
                .unwrap();
            assert_eq!(outcome, Ok(()));
        }
    }

    #[tokio::test]
    async fn triggered_notifies_collaborators() {
        // Given
        let switch = Switch::with_signals(Duration::from_secs(60), []).unwrap();
        let collaborator = {
            let switch = switch.clone();
            tokio::spawn(async move {
                switch.triggered().await;
                "stopped"
            })
        };

        // When
        switch.shutdown();

        // Then
        let stopped = tokio::time::timeout(REASONABLE_TIME, collaborator)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stopped, "stopped");
    }
}
