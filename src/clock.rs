use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// The machine's only external collaborator: a wall clock read by
/// CONTRACT, OBSERVE and RECEIPT.
///
/// Injecting the clock keeps those instructions deterministic under test;
/// everything else the machine touches is its own state.
pub trait Clock: fmt::Debug {
    /// Seconds since the Unix epoch.
    fn now(&self) -> f64;
}

/// Reads the host system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default()
    }
}

/// Always reports the same instant, making observation ids and record
/// timestamps reproducible.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl Clock for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}
