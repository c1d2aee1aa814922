//! Race-with-timeout resolution for native discovery calls that may never
//! settle.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::warn;

use shimmer_core::{DisplayError, DisplayHandle, DisplayResult};

/// Outcome of racing one native call against the timeout guard.
#[derive(Debug)]
pub enum RaceOutcome<T> {
    Resolved(T),
    TimedOut,
    Rejected(DisplayError),
}

/// Outcome of a raced display enumeration.
pub type DiscoveryOutcome = RaceOutcome<Vec<DisplayHandle>>;

/// Single-resolution result cell: whichever producer writes first wins and
/// later writes are discarded no-ops. Correct under preemptive threads, not
/// just cooperative scheduling.
///
/// Single consumer: `wait` hands the value out once.
pub struct SettleCell<T> {
    state: Mutex<SettleState<T>>,
    notify: Notify,
}

struct SettleState<T> {
    settled: bool,
    value: Option<T>,
}

impl<T> SettleCell<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SettleState {
                settled: false,
                value: None,
            }),
            notify: Notify::new(),
        }
    }

    /// Attempt to resolve the cell. Returns whether this call won; a cell
    /// stays settled even after the value has been consumed, so a losing
    /// producer can never win retroactively.
    pub fn settle(&self, value: T) -> bool {
        {
            let mut state = match self.state.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if state.settled {
                return false;
            }
            state.settled = true;
            state.value = Some(value);
        }
        self.notify.notify_one();
        true
    }

    fn take(&self) -> Option<T> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.value.take()
    }

    pub async fn wait(&self) -> T {
        loop {
            if let Some(value) = self.take() {
                return value;
            }
            self.notify.notified().await;
        }
    }
}

impl<T> Default for SettleCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Invoke one native call and start the timeout timer; whichever settles the
/// cell first determines the outcome.
///
/// The native call is not cancellable: on timeout it keeps running and its
/// eventual settlement is discarded. The timer is cancelled as soon as the
/// native call settles first.
pub async fn race<T, F>(native: F, timeout: Duration) -> RaceOutcome<T>
where
    T: Send + 'static,
    F: Future<Output = DisplayResult<T>> + Send + 'static,
{
    let cell = Arc::new(SettleCell::new());

    let native_cell = cell.clone();
    tokio::spawn(async move {
        let outcome = match native.await {
            Ok(value) => RaceOutcome::Resolved(value),
            Err(err) => RaceOutcome::Rejected(err),
        };
        native_cell.settle(outcome);
    });

    let timer_cell = cell.clone();
    let timer = tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if timer_cell.settle(RaceOutcome::TimedOut) {
            // Diagnostic, not an error: a hung native implementation is
            // recovered from by falling back.
            warn!(
                "native discovery did not settle within {} ms; continuing without it",
                timeout.as_millis()
            );
        }
    });

    let outcome = cell.wait().await;
    timer.abort();
    outcome
}
