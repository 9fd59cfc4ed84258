// Shared harness for integration tests: a small in-process "cluster"
// that wires `Node`s together with `QueueTransport` and a manual
// driver loop, the same pattern as `demos/three_node_cluster.rs`.

#![allow(dead_code)]

use std::sync::Arc;

use raftcore::clock::{Millis, ManualClock, TimeoutRng};
use raftcore::config::RaftConfig;
use raftcore::raft::persistent::InMemoryStore;
use raftcore::raft::transport::{NullTransport, OutboundMessage, QueueTransport};
use raftcore::{Node, SubmitOutcome};
use rand::{rngs::StdRng, SeedableRng};

/// Always returns the same timeout. Used to drive a node to its
/// election timeout deterministically in tests that hand-script the
/// rest of the message flow instead of using `Cluster`.
#[derive(Debug)]
pub struct FixedRng(pub Millis);

impl TimeoutRng for FixedRng {
    fn next_timeout_ms(&mut self, _min_inclusive: Millis, _max_exclusive: Millis) -> Millis {
        self.0
    }
}

/// A standalone node with a `NullTransport`, for tests that drive
/// `on_request_vote`/`on_append_entries` (and their reply handlers)
/// by hand instead of pumping a real transport. Returns the node
/// alongside its clock handle so the caller can advance time to force
/// an election timeout without needing `Cluster`'s full pump loop.
pub fn scripted_node(id: &str, peers: &[&str], config: RaftConfig) -> (Node<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let node = Node::new(
        id.to_string(),
        peers.iter().map(|p| p.to_string()).collect(),
        config,
        Box::new(InMemoryStore::default()),
        Box::new(NullTransport),
        Box::new(clock.clone()),
        Box::new(FixedRng(1)),
    )
    .expect("valid configuration");
    (node, clock)
}

pub struct Cluster {
    pub nodes: Vec<Node<String>>,
    pub clock: Arc<ManualClock>,
}

impl Cluster {
    pub fn new(ids: &[&str], config: RaftConfig, seed_base: u64) -> Self {
        let clock = Arc::new(ManualClock::new(0));
        let nodes = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let peers = ids
                    .iter()
                    .filter(|&&other| other != *id)
                    .map(|s| s.to_string())
                    .collect();
                Node::new(
                    id.to_string(),
                    peers,
                    config.clone(),
                    Box::new(InMemoryStore::default()),
                    Box::new(QueueTransport::new()),
                    Box::new(clock.clone()),
                    Box::new(StdRng::seed_from_u64(seed_base + i as u64)),
                )
                .expect("valid configuration")
            })
            .collect();
        Self { nodes, clock }
    }

    fn find_index(&self, id: &str) -> usize {
        self.nodes
            .iter()
            .position(|n| n.node_id().as_str() == id)
            .unwrap_or_else(|| panic!("unknown node id {id}"))
    }

    pub fn tick_all(&mut self) {
        for node in self.nodes.iter_mut() {
            node.tick().expect("tick never fails on a healthy node");
        }
    }

    /// Drains every node's outbound queue and delivers each message
    /// directly to its destination, routing the reply straight back.
    pub fn pump(&mut self) {
        for i in 0..self.nodes.len() {
            let outbound = self.nodes[i].drain_outbound();
            for msg in outbound {
                match msg {
                    OutboundMessage::RequestVote { to, request } => {
                        let to_idx = self.find_index(&to);
                        let reply = self.nodes[to_idx]
                            .on_request_vote(request)
                            .expect("vote handler never fails");
                        self.nodes[i]
                            .on_request_vote_reply(to, reply)
                            .expect("vote reply handler never fails");
                    }
                    OutboundMessage::AppendEntries { to, request, context } => {
                        let to_idx = self.find_index(&to);
                        let reply = self.nodes[to_idx]
                            .on_append_entries(request)
                            .expect("append handler never fails");
                        self.nodes[i]
                            .on_append_entries_reply(to, reply, context)
                            .expect("append reply handler never fails");
                    }
                }
            }
        }
    }

    /// Advances simulated time in `step_ms` increments, ticking and
    /// pumping after each step, until `done` holds or `max_steps` is
    /// exhausted (in which case it returns `false`).
    pub fn run_until(&mut self, step_ms: u64, max_steps: u64, done: impl Fn(&Cluster) -> bool) -> bool {
        for _ in 0..max_steps {
            if done(self) {
                return true;
            }
            self.clock.advance(step_ms);
            self.tick_all();
            self.pump();
        }
        done(self)
    }

    pub fn leader_index(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.is_leader())
    }

    pub fn submit_via_leader(&mut self, command: &str) -> SubmitOutcome {
        let idx = self.leader_index().expect("no leader elected yet");
        let outcome = self.nodes[idx]
            .submit(command.to_string())
            .expect("submit never fails once leading");
        self.pump();
        outcome
    }
}
