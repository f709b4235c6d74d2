//! Time sources for the draw scheduler
//!
//! The scheduler never sleeps or reads the wall clock directly. Production
//! code uses [`SystemClock`] and [`TokioTimer`]; tests drive virtual time with
//! [`ManualClock`] and [`VirtualTimer`], where every wait returns immediately.

use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

/// Wall clock used for event timestamps and generated codes
pub trait Clock: Send + Sync {
    /// Milliseconds since the unix epoch
    fn now_millis(&self) -> u64;

    /// Whole seconds since the unix epoch
    fn now_unix_secs(&self) -> u64 {
        self.now_millis() / 1_000
    }
}

/// Timed suspension
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// Sleeps on the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(start_millis),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let delta = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Timer that advances a [`ManualClock`] instead of sleeping.
///
/// Every requested wait is recorded so tests can assert on the schedule.
#[derive(Debug, Clone)]
pub struct VirtualTimer {
    clock: Arc<ManualClock>,
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl VirtualTimer {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            waits: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// All waits requested so far, in order
    pub fn waits(&self) -> Vec<Duration> {
        self.waits
            .lock()
            .map(|waits| waits.clone())
            .unwrap_or_default()
    }

    /// Sum of all waits requested so far
    pub fn elapsed(&self) -> Duration {
        self.waits().iter().sum()
    }

    fn record(&self, duration: Duration) {
        if let Ok(mut waits) = self.waits.lock() {
            waits.push(duration);
        }
        self.clock.advance(duration);
    }
}

#[async_trait]
impl Timer for VirtualTimer {
    async fn sleep(&self, duration: Duration) {
        self.record(duration);
        // Let other tasks observe progress between virtual ticks
        tokio::task::yield_now().await;
    }
}
