//! Error taxonomy for the consensus core (spec §7).
//!
//! Most error kinds here are locally recoverable and never leave the
//! node: a stale term or a log-inconsistency just becomes
//! `success=false` on the RPC reply. The variants below are only the
//! ones that cross an API boundary as an `Err`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RaftError>;

#[derive(Error, Debug, Clone)]
pub enum RaftError {
    /// A durability-path write (vote grant, append ack, term bump)
    /// failed. The triggering operation is aborted with no externally
    /// visible state change.
    #[error("persistence failure: {0}")]
    Persistence(String),

    /// A log-invariant was about to be violated by an internal call
    /// (e.g. `append` with a non-contiguous index). Callers that hit
    /// this from inside the core treat it as a safety violation; the
    /// `Log` type itself returns it so the caller can decide.
    #[error("log invariant violation: {0}")]
    Log(String),

    /// Attempt to truncate a committed entry, a corrupted sentinel, a
    /// negative/overflowing index, or majority-count arithmetic
    /// overflow. Fatal: the node halts (see `Node::halted`).
    #[error("safety violation: {0}")]
    SafetyViolation(String),

    /// Invalid `RaftConfig` (e.g. `min >= max`).
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The node already observed a prior safety violation and is
    /// refusing to process further operations.
    #[error("node halted: {0}")]
    Halted(String),
}

impl RaftError {
    pub fn safety(msg: impl Into<String>) -> Self {
        RaftError::SafetyViolation(msg.into())
    }
}
