//! Standard library implementations of platform traits.

use super::{ConsoleProvider, RandomProvider, TimeProvider};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
pub struct StdTimeProvider;

impl TimeProvider for StdTimeProvider {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Random provider using a xorshift64 PRNG seeded from the clock.
pub struct StdRandomProvider {
    state: u64,
}

impl StdRandomProvider {
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x12345678_9abcdef0);
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        // xorshift must not start at zero
        let seed = if seed == 0 { 0x12345678_9abcdef0 } else { seed };
        Self { state: seed }
    }
}

impl Default for StdRandomProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomProvider for StdRandomProvider {
    fn random(&mut self) -> f64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;

        // upper 53 bits
        let mantissa = x >> 11;
        (mantissa as f64) / ((1u64 << 53) as f64)
    }
}

/// Writes `display` output to stdout.
#[derive(Default)]
pub struct StdConsoleProvider;

impl ConsoleProvider for StdConsoleProvider {
    fn write(&self, message: &str) {
        println!("{message}");
    }
}
