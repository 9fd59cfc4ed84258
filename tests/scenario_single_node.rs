// Spec scenario 1: a single-node "cluster" becomes Leader on its own
// and commits a submitted command without waiting on any peer.

use std::sync::{Arc, Mutex};

use raftcore::clock::ManualClock;
use raftcore::config::RaftConfig;
use raftcore::raft::persistent::InMemoryStore;
use raftcore::raft::transport::QueueTransport;
use raftcore::{Node, SubmitOutcome};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn single_node_becomes_leader_and_commits_without_peers() {
    let config = RaftConfig::default();

    let clock = Arc::new(ManualClock::new(0));
    let mut node: Node<String> = Node::new(
        "n1".to_string(),
        vec![],
        config,
        Box::new(InMemoryStore::default()),
        Box::new(QueueTransport::new()),
        Box::new(clock.clone()),
        Box::new(StdRng::seed_from_u64(1)),
    )
    .unwrap();

    let applied = Arc::new(Mutex::new(Vec::new()));
    let applied_clone = applied.clone();
    node.register_apply_callback(move |entry| {
        applied_clone.lock().unwrap().push((entry.term, entry.index, entry.command.clone()));
        Ok(())
    });

    assert!(!node.is_leader());
    for _ in 0..100 {
        if node.is_leader() {
            break;
        }
        clock.advance(10);
        node.tick().unwrap();
    }
    assert!(node.is_leader(), "single node must eventually elect itself");
    assert_eq!(node.status().term, 1);

    match node.submit("x".to_string()).unwrap() {
        SubmitOutcome::Accepted { index } => assert_eq!(index, 1),
        SubmitOutcome::NotLeader { .. } => panic!("the lone node must be leader"),
    }

    assert_eq!(node.status().commit_index, 1);
    assert_eq!(node.status().last_applied, 1);
    assert_eq!(*applied.lock().unwrap(), vec![(1, 1, "x".to_string())]);
}
