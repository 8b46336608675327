//! Tick sources for the session engine.
//!
//! The engine does not own a clock. It starts and stops a [`Ticker`], and
//! whoever drives the engine feeds the resulting [`TickSignal`]s back into
//! [`SessionEngine::accept_tick`](super::SessionEngine::accept_tick).
//!
//! Each start of a ticker opens a new *generation*. Signals carry the
//! generation they were produced in, so a signal that was already queued
//! when the ticker got stopped can be recognised and dropped.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One tick produced by a ticker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: u64,
}

/// A periodic scheduler the engine can start and stop.
///
/// `stop` must be idempotent: stopping a stopped ticker is a no-op.
/// `start` on a running ticker is a no-op as well.
pub trait Ticker: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    /// Generation of the current (or last) run.
    fn generation(&self) -> u64;
}

// ============================================================================
// TokioTicker
// ============================================================================

/// Ticker backed by a tokio interval task.
pub struct TokioTicker {
    period: Duration,
    tick_tx: mpsc::UnboundedSender<TickSignal>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TokioTicker {
    /// Creates a ticker that sends its signals to `tick_tx`.
    pub fn new(tick_tx: mpsc::UnboundedSender<TickSignal>) -> Self {
        Self {
            period: TICK_PERIOD,
            tick_tx,
            handle: None,
            generation: 0,
        }
    }

    /// Creates a ticker together with the receiving end of its signals.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TickSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Overrides the tick period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
}

impl Ticker for TokioTicker {
    fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::error!("cannot start ticker outside a tokio runtime: {}", e);
                return;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tx = self.tick_tx.clone();

        self.handle = Some(runtime.spawn(async move {
            // First tick one period after start, not immediately
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if tx.send(TickSignal { generation }).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(generation, "ticker started");
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "ticker stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// MockTicker
// ============================================================================

#[derive(Debug, Default)]
struct MockTickerState {
    running: bool,
    generation: u64,
    start_calls: usize,
    stop_calls: usize,
}

/// Ticker for tests. Never produces signals on its own.
///
/// Clones share state, so a test can keep one handle while the engine
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MockTicker {
    state: Arc<Mutex<MockTickerState>>,
}

impl MockTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal for the current generation, as a live ticker would send it.
    #[must_use]
    pub fn signal(&self) -> TickSignal {
        TickSignal {
            generation: self.generation(),
        }
    }

    #[must_use]
    pub fn start_calls(&self) -> usize {
        self.state.lock().unwrap().start_calls
    }

    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.state.lock().unwrap().stop_calls
    }
}

impl Ticker for MockTicker {
    fn start(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.start_calls += 1;
        if !state.running {
            state.running = true;
            state.generation += 1;
        }
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.stop_calls += 1;
        state.running = false;
    }

    fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    fn generation(&self) -> u64 {
        self.state.lock().unwrap().generation
    }
}

// ============================================================================
// Tests
// ============================================================================
