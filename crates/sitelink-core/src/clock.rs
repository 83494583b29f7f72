//! Clock abstraction
//!
//! Every expiry decision is computed against an injected clock so the
//! boundary behavior around `expires_at` can be tested deterministically.

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used everywhere outside tests
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
