//! Randomized election timer (spec §4.D). The asymmetry of a fresh
//! random timeout per reset, drawn from an injected RNG, is the whole
//! mechanism that keeps split votes from recurring forever — it must
//! never be replaced by a fixed timeout.

use crate::clock::{Millis, TimeoutRng};
use crate::config::RaftConfig;

#[derive(Debug)]
pub struct ElectionTimer {
    min_ms: Millis,
    max_ms: Millis,
    timeout_ms: Millis,
    last_activity_ms: Millis,
}

impl ElectionTimer {
    pub fn new(config: &RaftConfig, now_ms: Millis, rng: &mut dyn TimeoutRng) -> Self {
        let timeout_ms = rng.next_timeout_ms(config.election_timeout_min_ms, config.election_timeout_max_ms);
        Self {
            min_ms: config.election_timeout_min_ms,
            max_ms: config.election_timeout_max_ms,
            timeout_ms,
            last_activity_ms: now_ms,
        }
    }

    /// Picks a fresh random timeout in `[min, max)` and records
    /// `last_activity = now`.
    pub fn reset(&mut self, now_ms: Millis, rng: &mut dyn TimeoutRng) {
        self.timeout_ms = rng.next_timeout_ms(self.min_ms, self.max_ms);
        self.last_activity_ms = now_ms;
    }

    pub fn expired(&self, now_ms: Millis) -> bool {
        now_ms.saturating_sub(self.last_activity_ms) > self.timeout_ms
    }

    pub fn current_timeout_ms(&self) -> Millis {
        self.timeout_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn not_expired_before_timeout_elapses() {
        let config = RaftConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let timer = ElectionTimer::new(&config, 0, &mut rng);
        assert!(!timer.expired(timer.current_timeout_ms()));
    }

    #[test]
    fn expired_strictly_after_timeout_elapses() {
        let config = RaftConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let timer = ElectionTimer::new(&config, 0, &mut rng);
        assert!(timer.expired(timer.current_timeout_ms() + 1));
    }

    #[test]
    fn reset_rebases_last_activity() {
        let config = RaftConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut timer = ElectionTimer::new(&config, 0, &mut rng);
        timer.reset(1_000, &mut rng);
        assert!(!timer.expired(1_000));
    }

    #[test]
    fn timeout_always_within_configured_range() {
        let config = RaftConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let timer = ElectionTimer::new(&config, 0, &mut rng);
            assert!(timer.current_timeout_ms() >= config.election_timeout_min_ms);
            assert!(timer.current_timeout_ms() < config.election_timeout_max_ms);
        }
    }
}
