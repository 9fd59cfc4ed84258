//! Leader election: role transitions (spec §4.E) and the `RequestVote`
//! handler (spec §4.F). Grounded on `rusty_db`'s
//! `networking::membership::raft::election::ElectionManager`, with
//! votes genuinely asynchronous (`on_request_vote_reply`) instead of a
//! synchronous self-only tally — see SPEC_FULL.md §11.3.

use super::node::Node;
use super::role::Role;
use super::rpc::{RequestVoteReply, RequestVoteRequest};
use crate::error::Result;

impl<C: Clone + std::fmt::Debug + Send + Sync> Node<C> {
    pub(crate) fn reset_election_timer(&mut self) {
        let now = self.now_ms();
        self.timer.reset(now, self.rng.as_mut());
    }

    /// Global term-discovery rule (spec §4.E): on any RPC whose term
    /// exceeds ours, adopt it and fall back to Follower. Callers apply
    /// this themselves before processing the rest of the payload.
    pub(crate) fn step_down(&mut self, term: super::log::Term) -> Result<()> {
        tracing::info!(node_id = %self.node_id, term, "stepping down to follower");
        self.current_term = term;
        self.voted_for = None;
        self.role = Role::Follower;
        self.leader_id = None;
        self.volatile.clear_leader_state();
        self.persist()?;
        self.reset_election_timer();
        Ok(())
    }

    /// Drives the election timer; called from `tick` for
    /// Follower/Candidate roles only (spec §4.E).
    pub(crate) fn tick_election(&mut self) -> Result<()> {
        let now = self.now_ms();
        if matches!(self.role, Role::Follower | Role::Candidate) && self.timer.expired(now) {
            self.start_election()?;
        }
        Ok(())
    }

    /// Candidate start (spec §4.E): bump term, vote for self, persist,
    /// reset timer, fan out `RequestVote`.
    pub(crate) fn start_election(&mut self) -> Result<()> {
        self.current_term += 1;
        self.role = Role::Candidate;
        self.voted_for = Some(self.node_id.clone());
        self.leader_id = None;
        self.votes_received.clear();
        self.votes_received.insert(self.node_id.clone());
        self.persist()?;
        self.reset_election_timer();

        tracing::info!(
            node_id = %self.node_id,
            term = self.current_term,
            votes_needed = self.majority(),
            "starting election"
        );

        let last_log_index = self.log.last_index();
        let last_log_term = self.log.last_term();
        let term = self.current_term;
        let candidate_id = self.node_id.clone();

        let peers = self.peers.clone();
        for peer in &peers {
            self.transport.send_request_vote(
                peer,
                RequestVoteRequest {
                    term,
                    candidate_id: candidate_id.clone(),
                    last_log_index,
                    last_log_term,
                },
            );
        }

        // A single-node "cluster" (no peers) wins immediately: the
        // self-vote alone already meets the majority threshold (spec
        // §8 scenario 1).
        self.maybe_become_leader()
    }

    fn maybe_become_leader(&mut self) -> Result<()> {
        if self.role == Role::Candidate && self.votes_received.len() >= self.majority() {
            self.become_leader()?;
        }
        Ok(())
    }

    pub(crate) fn become_leader(&mut self) -> Result<()> {
        tracing::info!(node_id = %self.node_id, term = self.current_term, "becoming leader");
        self.role = Role::Leader;
        self.leader_id = Some(self.node_id.clone());
        let last_log_index = self.log.last_index();
        self.volatile.init_leader_state(&self.peers, last_log_index);
        self.last_send_ms.clear();
        // Heartbeat immediately (spec §4.E: "send the initial empty
        // AppendEntries (heartbeat) immediately").
        self.send_heartbeats(true)
    }

    /// `RequestVote` receiver (spec §4.F), rules applied in order.
    pub fn on_request_vote(&mut self, request: RequestVoteRequest) -> Result<RequestVoteReply> {
        self.check_halted()?;

        if request.term < self.current_term {
            return Ok(RequestVoteReply {
                term: self.current_term,
                vote_granted: false,
            });
        }

        if request.term > self.current_term {
            self.step_down(request.term)?;
        }

        let already_voted_for_other = matches!(&self.voted_for, Some(v) if v != &request.candidate_id);
        let our_last_term = self.log.last_term();
        let our_last_index = self.log.last_index();
        let candidate_up_to_date = request.last_log_term > our_last_term
            || (request.last_log_term == our_last_term && request.last_log_index >= our_last_index);

        if already_voted_for_other || !candidate_up_to_date {
            return Ok(RequestVoteReply {
                term: self.current_term,
                vote_granted: false,
            });
        }

        self.voted_for = Some(request.candidate_id.clone());
        self.persist()?;
        self.reset_election_timer();

        Ok(RequestVoteReply {
            term: self.current_term,
            vote_granted: true,
        })
    }

    /// Reply to our own `RequestVote` (spec §4.E/§6.2). Votes are
    /// asynchronous: each reply is tallied as it arrives, never
    /// collected synchronously inside `start_election`.
    pub fn on_request_vote_reply(&mut self, from: crate::common::NodeId, reply: RequestVoteReply) -> Result<()> {
        self.check_halted()?;

        if reply.term > self.current_term {
            self.step_down(reply.term)?;
            return Ok(());
        }

        if self.role != Role::Candidate || reply.term != self.current_term {
            return Ok(());
        }

        if reply.vote_granted {
            self.votes_received.insert(from);
            self.maybe_become_leader()?;
        }

        Ok(())
    }
}
