//! A Raft consensus core: leader election, log replication, and the
//! commit-safety invariants that make a replicated log linearizable.
//!
//! This crate deliberately stops at the algorithm. Wire transport,
//! durable storage, wall-clock time, the application state machine,
//! cluster membership changes, and snapshotting are all collaborator
//! concerns, injected through the traits in [`raft::transport`],
//! [`raft::persistent`], and [`clock`] rather than implemented here.
//!
//! [`raft::Node`] is the entry point: construct one per cluster member,
//! feed it inbound RPCs and periodic `tick`s, and drain its transport
//! to see what it wants to send.

pub mod clock;
pub mod common;
pub mod config;
pub mod error;
pub mod raft;

pub use error::{RaftError, Result};
pub use raft::{Node, Status, SubmitOutcome};
