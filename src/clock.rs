//! Injectable clock and RNG (spec §5 "Determinism", §4.D).
//!
//! Time is modeled as milliseconds since an arbitrary epoch rather
//! than wrapping `std::time::Instant` directly: the external driver
//! already threads a `now` value through `Node::tick`, and a plain
//! `u64` is trivial to fast-forward deterministically in tests without
//! needing a fake `Instant`.

use rand::Rng;

pub type Millis = u64;

/// Monotonic time source. RPC handlers that need "now" but aren't
/// given one by the external interface (spec §6.2 only threads `now`
/// through `tick`) read it from the node's injected clock.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock backed implementation for production use.
#[derive(Debug)]
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: std::sync::atomic::AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: std::sync::atomic::AtomicU64::new(start_ms),
        }
    }

    pub fn advance(&self, delta_ms: Millis) -> Millis {
        self.now
            .fetch_add(delta_ms, std::sync::atomic::Ordering::SeqCst)
            + delta_ms
    }

    pub fn set(&self, ms: Millis) {
        self.now.store(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// Lets a driver hold onto a clock handle (e.g. `Arc<ManualClock>`)
/// after handing a `Box<dyn Clock>` built from the same `Arc` to a
/// `Node`, so it can advance time out-of-band.
impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}

/// Source of randomized election timeouts. All random choices in the
/// core must draw from this, so seeded tests are reproducible (spec
/// §9 "Randomness").
pub trait TimeoutRng: Send + Sync {
    fn next_timeout_ms(&mut self, min_inclusive: Millis, max_exclusive: Millis) -> Millis;
}

/// Any `rand::Rng` is usable as a `TimeoutRng`, including
/// `rand::rngs::StdRng::seed_from_u64(seed)` for deterministic tests
/// or `rand::rng()` for production.
impl<R: Rng + Send + Sync> TimeoutRng for R {
    fn next_timeout_ms(&mut self, min_inclusive: Millis, max_exclusive: Millis) -> Millis {
        self.random_range(min_inclusive..max_exclusive)
    }
}
