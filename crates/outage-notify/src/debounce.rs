//! Delay-and-coalesce primitives.
//!
//! Two shapes of the same idea:
//!
//! - [`Debouncer`] is a timer handle owned by a single task. The owner calls
//!   [`Debouncer::trigger`] on every input and awaits [`Debouncer::fired`]
//!   inside its `select!` loop. Because the handle holds at most one deadline,
//!   at most one flush can ever be pending.
//! - [`debounce`] wraps a callback: every [`Debounced::trigger`] cancels the
//!   previously scheduled run and schedules a new one `window` later. A run
//!   whose window has already elapsed is never interrupted.
//!
//! ```text
//!   trigger()      trigger()                    window elapsed
//!  ────●──────────────●─────────────────────────────────●──────▶
//!      └─ armed ──────┴─ re-armed (old deadline dropped) └─ fired, idle
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant, Sleep};
use tokio_util::sync::CancellationToken;

/// Default debounce window.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(30_000);

/// A resettable single-deadline timer.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    pending: Option<Pin<Box<Sleep>>>,
}

impl Debouncer {
    /// Create an idle debouncer with the given window.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Arm the timer to fire `window` from now, replacing any pending deadline.
    pub fn trigger(&mut self) {
        let deadline = Instant::now() + self.window;
        match self.pending.as_mut() {
            Some(timer) => timer.as_mut().reset(deadline),
            None => self.pending = Some(Box::pin(sleep_until(deadline))),
        }
    }

    /// Disarm the timer. A no-op when idle.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Instant the pending flush will fire at, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|timer| timer.deadline())
    }

    /// Resolve once the pending deadline elapses, then return to idle.
    ///
    /// Never resolves while idle, so it can sit in a `select!` branch
    /// permanently. Cancel safe: dropping the future leaves the deadline armed.
    pub async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.pending = None;
            }
            None => std::future::pending().await,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

type Action = Box<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback form of the debouncer, see [`debounce`].
pub struct Debounced {
    action: std::sync::Arc<Action>,
    window: Duration,
    scheduled: Option<Scheduled>,
}

/// One spawned wait-then-run. Only the wait observes `cancel`.
struct Scheduled {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Wrap `action` so that repeated [`Debounced::trigger`] calls within
/// `window` collapse into a single trailing run.
///
/// The action takes no arguments; it reads whatever state it needs when it
/// fires. Must be triggered from within a Tokio runtime.
pub fn debounce<F, Fut>(action: F, window: Duration) -> Debounced
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let action: Action = Box::new(move || Box::pin(action()));
    Debounced {
        action: std::sync::Arc::new(action),
        window,
        scheduled: None,
    }
}

impl Debounced {
    /// Schedule the action `window` from now, dropping any earlier schedule
    /// that has not started yet. A run already in progress finishes.
    pub fn trigger(&mut self) {
        self.cancel();

        let action = std::sync::Arc::clone(&self.action);
        let window = self.window;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = sleep(window) => {}
            }
            action().await;
        });

        self.scheduled = Some(Scheduled { cancel, handle });
    }

    /// Drop the scheduled run if its window has not elapsed yet.
    pub fn cancel(&mut self) {
        if let Some(scheduled) = self.scheduled.take() {
            scheduled.cancel.cancel();
        }
    }

    /// Whether a run is scheduled, or running, and has not completed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.scheduled
            .as_ref()
            .is_some_and(|scheduled| !scheduled.handle.is_finished())
    }
}

impl Drop for Debounced {
    fn drop(&mut self) {
        self.cancel();
    }
}
