//! Node composition (spec §4.I): owns every other component and
//! exposes the external API (`tick`, `submit`, the `on_*` handlers,
//! `status`). Transitions and RPC handling are implemented in sibling
//! `impl<C> Node<C>` blocks in `election.rs`, `replication.rs`, and
//! `apply.rs` — see SPEC_FULL.md §11.1 for why this is a plain
//! `&mut self` struct rather than an actor wrapped in `Arc<RwLock<_>>`:
//! single ownership is what makes "no two handlers observe or mutate
//! node state concurrently" (spec §5) true by construction instead of
//! by locking discipline.

use std::collections::{HashMap, HashSet};

use super::log::{Log, LogEntry, LogIndex, Term};
use super::persistent::{PersistentRecord, PersistentStore};
use super::role::Role;
use super::timer::ElectionTimer;
use super::transport::Transport;
use super::volatile::VolatileState;
use crate::clock::{Clock, Millis, TimeoutRng};
use crate::common::NodeId;
use crate::config::RaftConfig;
use crate::error::{RaftError, Result};

/// Outcome of `submit` (spec §6.2).
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Accepted { index: LogIndex },
    NotLeader { hint: Option<NodeId> },
}

/// Snapshot of node state for observability (spec §6.2 `status()`).
#[derive(Debug, Clone)]
pub struct Status {
    pub node_id: NodeId,
    pub role: Role,
    pub term: Term,
    pub log_length: usize,
    pub commit_index: LogIndex,
    pub last_applied: LogIndex,
    pub voted_for: Option<NodeId>,
    pub leader_id: Option<NodeId>,
    pub last_apply_error: Option<String>,
}

type ApplyCallback<C> = Box<dyn FnMut(&LogEntry<C>) -> std::result::Result<(), String> + Send>;

pub struct Node<C> {
    pub(crate) node_id: NodeId,
    pub(crate) peers: Vec<NodeId>,
    pub(crate) config: RaftConfig,

    pub(crate) role: Role,
    pub(crate) current_term: Term,
    pub(crate) voted_for: Option<NodeId>,
    pub(crate) leader_id: Option<NodeId>,

    pub(crate) log: Log<C>,
    pub(crate) volatile: VolatileState,

    pub(crate) persistent: Box<dyn PersistentStore<C>>,
    pub(crate) transport: Box<dyn Transport<C>>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) rng: Box<dyn TimeoutRng>,

    pub(crate) timer: ElectionTimer,
    /// Candidate-only: peers (plus self) that granted a vote this term.
    pub(crate) votes_received: HashSet<NodeId>,
    /// Leader-only: last time (ms) we sent AppendEntries to each peer,
    /// for the heartbeat policy (spec §4.G).
    pub(crate) last_send_ms: HashMap<NodeId, Millis>,

    pub(crate) apply_callback: Option<ApplyCallback<C>>,
    pub(crate) last_apply_error: Option<String>,

    /// Set on the first observed safety violation; once set, every
    /// operation short-circuits (spec §11.4 in SPEC_FULL.md).
    pub(crate) halted: Option<RaftError>,
}

impl<C: Clone + std::fmt::Debug + Send + Sync> Node<C> {
    pub fn new(
        node_id: NodeId,
        peers: Vec<NodeId>,
        config: RaftConfig,
        mut persistent: Box<dyn PersistentStore<C>>,
        transport: Box<dyn Transport<C>>,
        clock: Box<dyn Clock>,
        mut rng: Box<dyn TimeoutRng>,
    ) -> Result<Self> {
        config.validate()?;

        let record = persistent.load()?.unwrap_or_default();
        let mut log = Log::new();
        log.append_all(record.log)?;

        let now_ms = clock.now_ms();
        let timer = ElectionTimer::new(&config, now_ms, rng.as_mut());

        Ok(Self {
            node_id,
            peers,
            config,
            role: Role::Follower,
            current_term: record.current_term,
            voted_for: record.voted_for,
            leader_id: None,
            log,
            volatile: VolatileState::new(),
            persistent,
            transport,
            clock,
            rng,
            timer,
            votes_received: HashSet::new(),
            last_send_ms: HashMap::new(),
            apply_callback: None,
            last_apply_error: None,
            halted: None,
        })
    }

    pub fn status(&self) -> Status {
        Status {
            node_id: self.node_id.clone(),
            role: self.role,
            term: self.current_term,
            log_length: self.log.len(),
            commit_index: self.volatile.commit_index,
            last_applied: self.volatile.last_applied,
            voted_for: self.voted_for.clone(),
            leader_id: self.leader_id.clone(),
            last_apply_error: self.last_apply_error.clone(),
        }
    }

    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Hands an external driver everything queued since the last call
    /// (spec §1: the core never moves bytes itself).
    pub fn drain_outbound(&mut self) -> Vec<super::transport::OutboundMessage<C>> {
        self.transport.drain_pending()
    }

    pub fn register_apply_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&LogEntry<C>) -> std::result::Result<(), String> + Send + 'static,
    {
        self.apply_callback = Some(Box::new(callback));
    }

    /// `submit(command)` (spec §4.G): only a leader accepts new
    /// commands. Appended locally, persisted, then commit/apply is
    /// re-checked immediately — for a leader with no peers this is
    /// what makes the single-node cluster (spec §8 scenario 1) commit
    /// without waiting for a heartbeat round.
    pub fn submit(&mut self, command: C) -> Result<SubmitOutcome> {
        self.check_halted()?;

        if self.role != Role::Leader {
            return Ok(SubmitOutcome::NotLeader {
                hint: self.leader_id.clone(),
            });
        }

        let index = self.log.last_index() + 1;
        let entry = LogEntry::new(self.current_term, index, command);
        if let Err(e) = self.log.append(entry) {
            return Err(self.halt(e));
        }
        self.persist()?;

        self.replicate_to_all_peers();
        self.advance_commit_index();
        self.run_applier();

        Ok(SubmitOutcome::Accepted { index })
    }

    /// `1 + peers.len()` is the cluster size; majority is `floor(n/2)
    /// + 1` (spec §9 redesign flag — the source's `votes > peers //
    /// 2` undercounts because it omits the `+1` for self and uses
    /// strict `>` against `peers.len()` instead of the cluster size).
    pub(crate) fn majority(&self) -> usize {
        let cluster_size = 1 + self.peers.len();
        cluster_size / 2 + 1
    }

    pub(crate) fn persist(&mut self) -> Result<()> {
        let record = PersistentRecord {
            current_term: self.current_term,
            voted_for: self.voted_for.clone(),
            log: self.log.slice(1),
        };
        match self.persistent.save(&record) {
            Ok(()) => Ok(()),
            Err(e) => Err(RaftError::Persistence(e.to_string())),
        }
    }

    pub(crate) fn check_halted(&self) -> Result<()> {
        match &self.halted {
            Some(e) => Err(RaftError::Halted(e.to_string())),
            None => Ok(()),
        }
    }

    /// Records a fatal safety violation and returns the error that
    /// should be propagated to the caller that triggered it.
    pub(crate) fn halt(&mut self, cause: RaftError) -> RaftError {
        tracing::error!(node_id = %self.node_id, error = %cause, "halting node on safety violation");
        self.halted.get_or_insert(cause.clone());
        cause
    }

    pub(crate) fn now_ms(&self) -> Millis {
        self.clock.now_ms()
    }
}
