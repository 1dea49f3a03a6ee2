//! Wall-Clock Sources

use chrono::Utc;
use std::{
    convert::TryFrom,
    sync::atomic::{AtomicU64, Ordering},
};

/// A source of the current time, in whole seconds since the Unix epoch
pub trait Clock: Send + Sync {
    /// Returns the current Unix time in seconds
    fn now(&self) -> u64;
}

/// The system wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        // a clock set before 1970 is pinned to the epoch
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A clock that only moves when told to
///
/// Useful for deterministic tests and for replaying codes at a fixed point in time.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a new clock stopped at `now`
    ///
    /// # Arguments
    /// * `now` - Unix time (in seconds) to start at
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Moves the clock to an absolute time
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs` seconds
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> u64 {
        (**self).now()
    }
}
