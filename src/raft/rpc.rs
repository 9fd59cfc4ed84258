//! Transport-agnostic RPC message shapes (spec §6.1). How these bytes
//! actually move between nodes is a collaborator's problem; the core
//! only defines the shapes and the handlers that consume them.

use serde::{Deserialize, Serialize};

use super::log::{LogEntry, LogIndex, Term};
use crate::common::NodeId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestVoteRequest {
    pub term: Term,
    pub candidate_id: NodeId,
    pub last_log_index: LogIndex,
    pub last_log_term: Term,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestVoteReply {
    pub term: Term,
    pub vote_granted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendEntriesRequest<C> {
    pub term: Term,
    pub leader_id: NodeId,
    pub prev_log_index: LogIndex,
    pub prev_log_term: Term,
    pub entries: Vec<LogEntry<C>>,
    pub leader_commit: LogIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendEntriesReply {
    pub term: Term,
    pub success: bool,
    /// Optional accelerated-backoff hint (spec §4.G: "Implementations
    /// MAY accelerate with conflict-index hints; not required"). When
    /// absent the leader falls back to the mandatory single-step
    /// `next_index` decrement.
    pub conflict_index: Option<LogIndex>,
}

/// Context the leader must remember about an in-flight `AppendEntries`
/// to interpret its reply (spec §6.2:
/// `on_append_entries_reply(peer_id, reply, context={prev_log_index,
/// entries_sent_len})`).
#[derive(Debug, Clone, Copy)]
pub struct AppendEntriesContext {
    pub prev_log_index: LogIndex,
    pub entries_sent_len: usize,
}
