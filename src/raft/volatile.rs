//! Volatile state (spec §4.C): `commit_index`/`last_applied` plus the
//! leader-only per-peer progress maps. Pure in-memory, rebuilt from
//! nothing on restart (nothing here is part of the durability
//! contract).

use std::collections::HashMap;

use super::log::LogIndex;
use crate::common::NodeId;

#[derive(Debug, Default)]
pub struct VolatileState {
    pub commit_index: LogIndex,
    pub last_applied: LogIndex,

    /// Leader-only: next log index to send to each peer.
    pub next_index: HashMap<NodeId, LogIndex>,
    /// Leader-only: highest log index known to be replicated on each peer.
    pub match_index: HashMap<NodeId, LogIndex>,
}

impl VolatileState {
    pub fn new() -> Self {
        Self::default()
    }

    /// On transition to Leader: seed `next_index`/`match_index` for
    /// every peer (spec §4.C).
    pub fn init_leader_state(&mut self, peers: &[NodeId], last_log_index: LogIndex) {
        self.next_index.clear();
        self.match_index.clear();
        for peer in peers {
            self.next_index.insert(peer.clone(), last_log_index + 1);
            self.match_index.insert(peer.clone(), 0);
        }
    }

    /// On transition away from Leader: the maps are meaningless for a
    /// follower/candidate (spec §4.C).
    pub fn clear_leader_state(&mut self) {
        self.next_index.clear();
        self.match_index.clear();
    }
}
