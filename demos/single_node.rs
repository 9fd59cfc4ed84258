// Single-Node Cluster Demo
// Demonstrates a lone `Node` winning its own election and committing
// submitted commands without ever needing a peer to acknowledge them.

use std::sync::Arc;

use raftcore::clock::ManualClock;
use raftcore::config::RaftConfig;
use raftcore::raft::persistent::InMemoryStore;
use raftcore::raft::transport::QueueTransport;
use raftcore::{Node, SubmitOutcome};
use rand::{rngs::StdRng, SeedableRng};

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Single-Node Cluster Demo ===\n");

    println!("1. Constructing the node...");
    let clock = Arc::new(ManualClock::new(0));
    let mut node: Node<String> = Node::new(
        "n1".to_string(),
        vec![],
        RaftConfig::default(),
        Box::new(InMemoryStore::default()),
        Box::new(QueueTransport::new()),
        Box::new(clock.clone()),
        Box::new(StdRng::seed_from_u64(1)),
    )
    .expect("valid configuration");

    node.register_apply_callback(|entry| {
        println!("   [apply] index {} -> {:?}", entry.index, entry.command);
        Ok(())
    });

    println!("2. Waiting for the election timeout to elapse...");
    let mut now = 0u64;
    while !node.is_leader() {
        now = clock.advance(10);
        node.tick().expect("tick never fails on a healthy node");
    }
    println!("   Became leader in term {} at t={}ms\n", node.status().term, now);

    println!("3. Submitting commands...");
    for command in ["set x=1", "set y=2", "delete x"] {
        match node.submit(command.to_string()).expect("submit never fails once leading") {
            SubmitOutcome::Accepted { index } => println!("   accepted '{command}' at index {index}"),
            SubmitOutcome::NotLeader { hint } => println!("   rejected, not leader (hint: {hint:?})"),
        }
    }

    println!("\n4. Final status: {:?}", node.status());
}
