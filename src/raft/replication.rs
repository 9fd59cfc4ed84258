//! Log replication: the `AppendEntries` handler (spec §4.F) and the
//! leader-side replication/heartbeat loop (spec §4.G). Grounded on
//! `rusty_db`'s `networking::membership::raft::replication`, with the
//! consistency check and conflict backoff kept faithful to the Raft
//! paper's explicit suffix-truncation rule rather than an
//! always-overwrite shortcut.

use super::log::LogIndex;
use super::node::Node;
use super::role::Role;
use super::rpc::{AppendEntriesContext, AppendEntriesReply, AppendEntriesRequest};
use crate::common::NodeId;
use crate::error::{RaftError, Result};

impl<C: Clone + std::fmt::Debug + Send + Sync> Node<C> {
    /// Single entry point for a driver loop: advances the election
    /// timer and, if we're leader, sends any heartbeats that are due
    /// (spec §4.D, §4.G).
    pub fn tick(&mut self) -> Result<()> {
        self.check_halted()?;
        self.tick_election()?;
        if self.role == Role::Leader {
            self.send_heartbeats(false)?;
        }
        Ok(())
    }

    /// Sends `AppendEntries` to every peer whose heartbeat period has
    /// elapsed, or to all peers regardless of timing when `force` is
    /// set (used right after becoming leader, spec §4.E).
    pub(crate) fn send_heartbeats(&mut self, force: bool) -> Result<()> {
        if self.role != Role::Leader {
            return Ok(());
        }
        let now = self.now_ms();
        let heartbeat_ms = self.config.heartbeat_interval_ms;
        let peers = self.peers.clone();
        for peer in &peers {
            let last_sent = *self.last_send_ms.get(peer).unwrap_or(&0);
            let due = force || now.saturating_sub(last_sent) >= heartbeat_ms;
            if due {
                self.replicate_to_peer(peer);
                self.last_send_ms.insert(peer.clone(), now);
            }
        }
        Ok(())
    }

    /// Sends a fresh `AppendEntries` to every peer immediately,
    /// bypassing the heartbeat cadence (spec §4.G: a new entry is
    /// replicated without waiting for the next heartbeat tick).
    pub(crate) fn replicate_to_all_peers(&mut self) {
        let peers = self.peers.clone();
        let now = self.now_ms();
        for peer in &peers {
            self.replicate_to_peer(peer);
            self.last_send_ms.insert(peer.clone(), now);
        }
    }

    fn replicate_to_peer(&mut self, peer: &NodeId) {
        if self.role != Role::Leader {
            return;
        }
        let next = *self.volatile.next_index.get(peer).unwrap_or(&1);
        let prev_log_index = next.saturating_sub(1);
        let prev_log_term = self.log.term_at(prev_log_index).unwrap_or(0);
        let entries = self.log.slice(next);
        let context = AppendEntriesContext {
            prev_log_index,
            entries_sent_len: entries.len(),
        };
        let request = AppendEntriesRequest {
            term: self.current_term,
            leader_id: self.node_id.clone(),
            prev_log_index,
            prev_log_term,
            entries,
            leader_commit: self.volatile.commit_index,
        };
        self.transport.send_append_entries(peer, request, context);
    }

    /// `AppendEntries` receiver (spec §4.F), rules applied in order:
    /// stale term rejected, newer term adopted, consistency check
    /// against `prev_log_index`/`prev_log_term`, conflicting suffix
    /// truncated, new entries appended, `commit_index` advanced.
    pub fn on_append_entries(&mut self, request: AppendEntriesRequest<C>) -> Result<AppendEntriesReply> {
        self.check_halted()?;

        if request.term < self.current_term {
            return Ok(AppendEntriesReply {
                term: self.current_term,
                success: false,
                conflict_index: None,
            });
        }

        if request.term > self.current_term {
            self.step_down(request.term)?;
        } else if self.role != Role::Follower {
            // A valid AppendEntries at our own term means someone else
            // is leader of it; stop campaigning or acting as leader.
            self.role = Role::Follower;
        }

        self.leader_id = Some(request.leader_id.clone());
        self.reset_election_timer();

        match self.log.term_at(request.prev_log_index) {
            None => {
                return Ok(AppendEntriesReply {
                    term: self.current_term,
                    success: false,
                    conflict_index: Some(self.log.last_index() + 1),
                });
            }
            Some(term) if term != request.prev_log_term => {
                return Ok(AppendEntriesReply {
                    term: self.current_term,
                    success: false,
                    conflict_index: Some(request.prev_log_index.max(1)),
                });
            }
            Some(_) => {}
        }

        for entry in request.entries {
            match self.log.term_at(entry.index) {
                Some(existing_term) if existing_term != entry.term => {
                    if entry.index <= self.volatile.commit_index {
                        return Err(self.halt(RaftError::safety(format!(
                            "refusing to truncate committed entry at index {} (commit_index {})",
                            entry.index, self.volatile.commit_index
                        ))));
                    }
                    self.log.truncate_from(entry.index)?;
                    self.log.append(entry)?;
                }
                Some(_) => {
                    // Same term already at this index: already have it.
                }
                None => {
                    self.log.append(entry)?;
                }
            }
        }
        self.persist()?;

        if request.leader_commit > self.volatile.commit_index {
            self.volatile.commit_index = request.leader_commit.min(self.log.last_index());
        }
        self.run_applier();

        Ok(AppendEntriesReply {
            term: self.current_term,
            success: true,
            conflict_index: None,
        })
    }

    /// Reply to our own `AppendEntries` (spec §4.G): advances
    /// `match_index`/`next_index` on success, backs off `next_index`
    /// on failure (using the peer's `conflict_index` hint when given,
    /// otherwise the mandatory single-step decrement), then re-checks
    /// whether the commit index can advance.
    pub fn on_append_entries_reply(
        &mut self,
        from: NodeId,
        reply: AppendEntriesReply,
        context: AppendEntriesContext,
    ) -> Result<()> {
        self.check_halted()?;

        if reply.term > self.current_term {
            self.step_down(reply.term)?;
            return Ok(());
        }

        if self.role != Role::Leader || reply.term != self.current_term {
            return Ok(());
        }

        if reply.success {
            let new_match = context.prev_log_index + context.entries_sent_len as LogIndex;
            let entry = self.volatile.match_index.entry(from.clone()).or_insert(0);
            if new_match > *entry {
                *entry = new_match;
            }
            self.volatile.next_index.insert(from, new_match + 1);
            self.advance_commit_index();
            self.run_applier();
        } else {
            let current_next = *self.volatile.next_index.get(&from).unwrap_or(&1);
            let new_next = reply.conflict_index.unwrap_or_else(|| current_next.saturating_sub(1)).max(1);
            self.volatile.next_index.insert(from.clone(), new_next);
            self.replicate_to_peer(&from);
        }

        Ok(())
    }

    /// Commit rule (spec §4.H, the Figure 8 safety restriction): a
    /// leader only advances `commit_index` to `N` if a majority of
    /// `match_index` reach `N` AND the entry at `N` was written in the
    /// leader's *current* term.
    pub(crate) fn advance_commit_index(&mut self) {
        if self.role != Role::Leader {
            return;
        }
        let last_index = self.log.last_index();
        let mut new_commit = self.volatile.commit_index;
        for n in (self.volatile.commit_index + 1)..=last_index {
            let term_at_n = match self.log.term_at(n) {
                Some(t) => t,
                None => continue,
            };
            if term_at_n != self.current_term {
                continue;
            }
            let mut count = 1; // the leader itself
            for peer in &self.peers {
                if *self.volatile.match_index.get(peer).unwrap_or(&0) >= n {
                    count += 1;
                }
            }
            if count >= self.majority() {
                new_commit = n;
            }
        }
        if new_commit > self.volatile.commit_index {
            self.volatile.commit_index = new_commit;
        }
    }
}
