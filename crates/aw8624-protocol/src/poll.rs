//! Pause strategies between `GLB_STATE` polls.

use std::fmt::Debug;
use std::time::Duration;

/// Called by Stop between consecutive status reads.
///
/// `attempt` is the 1-based number of the read that just reported busy.
pub trait PollDelay: Send + Debug {
    fn pause(&mut self, attempt: u32);
}

/// Spin for a short fixed number of iterations. The default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyWait {
    pub spins: u32,
}

impl Default for BusyWait {
    fn default() -> Self {
        Self { spins: 64 }
    }
}

impl PollDelay for BusyWait {
    fn pause(&mut self, _attempt: u32) {
        for _ in 0..self.spins {
            std::hint::spin_loop();
        }
    }
}

/// Yield the current thread to the scheduler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YieldNow;

impl PollDelay for YieldNow {
    fn pause(&mut self, _attempt: u32) {
        std::thread::yield_now();
    }
}

/// Sleep for a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sleep(pub Duration);

impl PollDelay for Sleep {
    fn pause(&mut self, _attempt: u32) {
        std::thread::sleep(self.0);
    }
}
