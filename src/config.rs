//! Configuration knobs (spec §6.3), adapted from `rusty_db`'s
//! `networking::membership::RaftConfig`, trimmed to what the core
//! actually consumes (membership/snapshot knobs named no-goals in
//! spec.md are dropped, not carried forward).

use std::time::Duration;

use crate::error::{RaftError, Result};

/// Tuning for election timing and heartbeats.
#[derive(Debug, Clone)]
pub struct RaftConfig {
    /// Lower bound (inclusive) of the randomized election timeout.
    pub election_timeout_min_ms: u64,

    /// Upper bound (exclusive) of the randomized election timeout.
    pub election_timeout_max_ms: u64,

    /// Leader heartbeat period.
    pub heartbeat_interval_ms: u64,

    /// Advisory for the transport collaborator; unused by core logic.
    pub rpc_timeout_ms: u64,
}

impl Default for RaftConfig {
    fn default() -> Self {
        Self {
            election_timeout_min_ms: 150,
            election_timeout_max_ms: 300,
            heartbeat_interval_ms: 50,
            rpc_timeout_ms: 100,
        }
    }
}

impl RaftConfig {
    pub fn election_timeout_min(&self) -> Duration {
        Duration::from_millis(self.election_timeout_min_ms)
    }

    pub fn election_timeout_max(&self) -> Duration {
        Duration::from_millis(self.election_timeout_max_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Enforces `min < max` and `heartbeat < min / 2` (spec §6.3).
    pub fn validate(&self) -> Result<()> {
        if self.election_timeout_min_ms >= self.election_timeout_max_ms {
            return Err(RaftError::Configuration(format!(
                "election_timeout_min_ms ({}) must be < election_timeout_max_ms ({})",
                self.election_timeout_min_ms, self.election_timeout_max_ms
            )));
        }
        if self.heartbeat_interval_ms * 2 >= self.election_timeout_min_ms {
            return Err(RaftError::Configuration(format!(
                "heartbeat_interval_ms ({}) must be < election_timeout_min_ms ({}) / 2",
                self.heartbeat_interval_ms, self.election_timeout_min_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RaftConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_timeout_range() {
        let mut config = RaftConfig::default();
        config.election_timeout_min_ms = 300;
        config.election_timeout_max_ms = 150;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_heartbeat_too_close_to_min_timeout() {
        let mut config = RaftConfig::default();
        config.heartbeat_interval_ms = config.election_timeout_min_ms;
        assert!(config.validate().is_err());
    }
}
