//! Identifier and timestamp generation for outbound requests.

use chrono::Local;
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source of correlation ids (`FPQQLSH`) and data exchange ids.
///
/// Implementations must not hand out the same id twice for the same prefix
/// within one second from one generator instance, including under
/// concurrent use. The numeric suffix bounds this: at most 10 000 request
/// serials or 1 000 data exchange ids per second are distinct, and
/// [`SequentialIdGenerator`] draws both from one counter, so the budget is
/// shared between them.
pub trait IdGenerator: Send + Sync {
    /// Platform code, timestamp and four digits, e.g.
    /// `111MFWIK201805081541348952`.
    fn request_serial(&self, platform_code: &str) -> String;

    /// Request code, timestamp and three digits, e.g.
    /// `111MFWIK20180508154134634`.
    fn data_exchange_id(&self, request_code: &str) -> String;
}

/// Timestamp plus a wrapping counter. The counter starts at a random offset
/// drawn from the OS-seeded thread RNG so separate processes rarely line up.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    counter: AtomicU32,
}

impl SequentialIdGenerator {
    pub fn with_start(start: u32) -> Self {
        Self {
            counter: AtomicU32::new(start),
        }
    }

    fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::with_start(rand::thread_rng().gen_range(0..10_000))
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn request_serial(&self, platform_code: &str) -> String {
        let stamp = Local::now().format(STAMP_FORMAT);
        format!("{platform_code}{stamp}{:04}", self.next() % 10_000)
    }

    fn data_exchange_id(&self, request_code: &str) -> String {
        let stamp = Local::now().format(STAMP_FORMAT);
        format!("{request_code}{stamp}{:03}", self.next() % 1_000)
    }
}

/// `requestTime` value for the current instant, e.g. `2016-11-14 14:11:30 301`.
pub fn request_time() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S %3f").to_string()
}
