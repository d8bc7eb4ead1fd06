//! Debouncing of rapidly changing input.
//!
//! [`Debouncer`] is the state machine: it holds at most one pending value and
//! the instant at which that value may be emitted. Every new input replaces
//! the pending value and restarts the window. [`Debounced`] drives the state
//! machine from a `watch` channel on the caller's own task.

use tokio::sync::watch;
use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Records `value` as the latest input, superseding any pending one
    pub fn input(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// When the pending value becomes due, if there is one
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value if its quiet period has fully elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((_, deadline)) if now >= deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Discards the pending value without emitting it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }
}

/// Debounced view of a `watch` channel
///
/// The value held by the channel when this is constructed counts as already
/// seen and is not emitted.
pub struct Debounced<T> {
    input: watch::Receiver<T>,
    state: Debouncer<T>,
}

impl<T: Clone> Debounced<T> {
    pub fn new(mut input: watch::Receiver<T>, delay: Duration) -> Self {
        let _ = input.borrow_and_update();
        Self {
            input,
            state: Debouncer::new(delay),
        }
    }

    /// Waits for the next value that stayed unchanged for the full delay
    ///
    /// Returns `None` once the sending side is gone; a value still inside its
    /// window at that point is dropped.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            match self.state.deadline() {
                Some(deadline) => {
                    tokio::select! {
                        biased;
                        _ = tokio::time::sleep_until(deadline) => {
                            if let Some(value) = self.state.poll(Instant::now()) {
                                return Some(value);
                            }
                        }
                        changed = self.input.changed() => {
                            if changed.is_err() {
                                self.state.cancel();
                                return None;
                            }
                            self.accept();
                        }
                    }
                }
                None => {
                    if self.input.changed().await.is_err() {
                        return None;
                    }
                    self.accept();
                }
            }
        }
    }

    fn accept(&mut self) {
        let value = self.input.borrow_and_update().clone();
        self.state.input(value, Instant::now());
    }
}
