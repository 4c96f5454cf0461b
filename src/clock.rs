//! Time source used for throttling and cache windows.
//!
//! The gateway never calls `SystemTime::now()` directly — every
//! timestamp comparison goes through a `Clock`, the same way register
//! I/O goes through `RegisterIo` rather than a concrete transport. This
//! is what makes the throttle and post-write suppression properties
//! testable without real sleeps: tests hand the gateway a
//! `FakeClock` they advance by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A monotonically-nondecreasing source of "now", in milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since the Unix epoch. The default for production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Returns a boxed `SystemClock`, the usual way callers wire up a
/// [`crate::gateway::Gateway`] outside of tests.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// A clock tests advance by hand, for exercising throttle windows and
/// post-write suppression without real sleeps.
#[derive(Debug, Default)]
pub struct FakeClock(AtomicU64);

impl FakeClock {
    pub fn new(start_ms: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(start_ms)))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}
