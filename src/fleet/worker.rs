//! Account-bound worker loop.
//!
//! # State Machine
//! ```text
//! Idle → Running → (Cycle → Sleeping)* → Stopped
//! ```
//! Cancellation is checked at the loop head and interrupts the sleep; an
//! in-flight cycle always runs to completion, so shutdown latency per
//! worker is bounded by one request timeout plus one poll interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::fleet::cycle::InteractionCycle;
use crate::wallet::Credential;

/// Observable worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, loop not yet entered.
    Idle,
    /// Loop running (cycling or sleeping).
    Running,
    /// Cancellation observed; loop exited.
    Stopped,
}

/// One worker: a credential, its assigned egress proxy, and a cycle.
pub struct Worker<C: InteractionCycle> {
    id: usize,
    credential: Credential,
    proxy: String,
    poll_interval: Duration,
    cycle: Arc<C>,
}

/// Handle to a spawned worker: its id, observable state, and join point.
pub struct WorkerHandle {
    id: usize,
    state: watch::Receiver<WorkerState>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn id(&self) -> usize {
        self.id
    }

    /// Last observed lifecycle state.
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Wait for the worker's run loop to exit.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}

impl<C: InteractionCycle> Worker<C> {
    /// Bind a worker to one credential and its assigned proxy URL
    /// (already formatted; empty means direct egress).
    pub fn new(
        id: usize,
        credential: Credential,
        proxy: String,
        poll_interval: Duration,
        cycle: Arc<C>,
    ) -> Self {
        Self {
            id,
            credential,
            proxy,
            poll_interval,
            cycle,
        }
    }

    /// Spawn the run loop onto the runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> WorkerHandle {
        let (state_tx, state_rx) = watch::channel(WorkerState::Idle);
        let id = self.id;
        let join = tokio::spawn(self.run(shutdown, state_tx));
        WorkerHandle {
            id,
            state: state_rx,
            join,
        }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>, state: watch::Sender<WorkerState>) {
        let _ = state.send(WorkerState::Running);
        tracing::info!(worker = self.id, proxy = %self.proxy, "worker started");

        loop {
            // Head-of-loop cancellation check. A closed channel means the
            // supervisor is gone, which also stops the worker.
            match shutdown.try_recv() {
                Ok(()) | Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => break,
                Err(TryRecvError::Empty) => {}
            }

            if let Err(error) = self.cycle.run_cycle(&self.credential, &self.proxy).await {
                // Cycle failures are logged, never fatal; the poll
                // interval is the de facto backoff.
                tracing::warn!(worker = self.id, %error, "interaction cycle failed");
            }

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        let _ = state.send(WorkerState::Stopped);
        tracing::info!(worker = self.id, "worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::cycle::CycleError;
    use crate::fleet::Shutdown;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    struct CountingCycle {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingCycle {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail,
            })
        }
    }

    impl InteractionCycle for CountingCycle {
        fn run_cycle(
            &self,
            _credential: &Credential,
            _proxy: &str,
        ) -> impl Future<Output = Result<(), CycleError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            async move {
                if fail {
                    Err(CycleError::Client(crate::client::ClientError::Status {
                        status: 500,
                        body: "boom".to_string(),
                    }))
                } else {
                    Ok(())
                }
            }
        }
    }

    fn test_worker(cycle: Arc<CountingCycle>) -> Worker<CountingCycle> {
        let credential = Credential::from_hex(TEST_PRIVATE_KEY).unwrap();
        Worker::new(
            1,
            credential,
            String::new(),
            Duration::from_millis(5),
            cycle,
        )
    }

    #[tokio::test]
    async fn test_worker_cycles_until_cancelled() {
        let cycle = CountingCycle::new(false);
        let shutdown = Shutdown::new();
        let handle = test_worker(cycle.clone()).spawn(shutdown.subscribe());

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(handle.state(), WorkerState::Running);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("worker did not stop in time");
        assert!(cycle.calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_worker_survives_cycle_failures() {
        let cycle = CountingCycle::new(true);
        let shutdown = Shutdown::new();
        let handle = test_worker(cycle.clone()).spawn(shutdown.subscribe());

        tokio::time::sleep(Duration::from_millis(30)).await;
        // Still running despite every cycle failing
        assert_eq!(handle.state(), WorkerState::Running);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("worker did not stop in time");
        assert!(cycle.calls.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_pre_triggered_shutdown_stops_before_first_cycle() {
        let cycle = CountingCycle::new(false);
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        shutdown.trigger();

        let handle = test_worker(cycle.clone()).spawn(rx);
        tokio::time::timeout(Duration::from_secs(1), handle.join())
            .await
            .expect("worker did not stop in time");
        assert_eq!(cycle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_reports_stopped_state() {
        let cycle = CountingCycle::new(false);
        let shutdown = Shutdown::new();
        let handle = test_worker(cycle).spawn(shutdown.subscribe());

        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.trigger();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.state(), WorkerState::Stopped);
        handle.join().await;
    }
}
