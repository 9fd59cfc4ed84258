// Three-Node Cluster Demo
// Wires three `Node`s together with in-memory `QueueTransport`s and a
// tiny synchronous driver loop that pumps messages between them,
// showing leader election and log replication end to end.

use std::sync::Arc;

use raftcore::clock::ManualClock;
use raftcore::config::RaftConfig;
use raftcore::raft::persistent::InMemoryStore;
use raftcore::raft::transport::{OutboundMessage, QueueTransport};
use raftcore::{Node, SubmitOutcome};
use rand::{rngs::StdRng, SeedableRng};

fn find_index(nodes: &[Node<String>], id: &str) -> usize {
    nodes
        .iter()
        .position(|n| n.node_id().as_str() == id)
        .unwrap_or_else(|| panic!("unknown node id {id}"))
}

/// Drains every node's outbound queue and delivers each message
/// directly to its destination, then routes the reply straight back —
/// standing in for whatever a real transport collaborator would do
/// over the network.
fn pump(nodes: &mut Vec<Node<String>>) {
    for i in 0..nodes.len() {
        let outbound = nodes[i].drain_outbound();
        for msg in outbound {
            match msg {
                OutboundMessage::RequestVote { to, request } => {
                    let to_idx = find_index(nodes, &to);
                    let reply = nodes[to_idx].on_request_vote(request).expect("vote handler never fails");
                    nodes[i]
                        .on_request_vote_reply(to, reply)
                        .expect("vote reply handler never fails");
                }
                OutboundMessage::AppendEntries { to, request, context } => {
                    let to_idx = find_index(nodes, &to);
                    let reply = nodes[to_idx]
                        .on_append_entries(request)
                        .expect("append handler never fails");
                    nodes[i]
                        .on_append_entries_reply(to, reply, context)
                        .expect("append reply handler never fails");
                }
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    println!("=== Three-Node Cluster Demo ===\n");

    println!("1. Constructing nodes n1, n2, n3...");
    let clock = Arc::new(ManualClock::new(0));
    let ids = ["n1", "n2", "n3"];
    let mut nodes: Vec<Node<String>> = ids
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
                RaftConfig::default(),
                Box::new(InMemoryStore::default()),
                Box::new(QueueTransport::new()),
                Box::new(clock.clone()),
                Box::new(StdRng::seed_from_u64(10 + i as u64)),
            )
            .expect("valid configuration")
        })
        .collect();

    println!("2. Running the cluster until a leader emerges...");
    let mut elapsed = 0u64;
    loop {
        elapsed = clock.advance(5);
        for node in nodes.iter_mut() {
            node.tick().expect("tick never fails on a healthy node");
        }
        pump(&mut nodes);

        if nodes.iter().any(|n| n.is_leader()) {
            break;
        }
        if elapsed > 10_000 {
            panic!("no leader elected within 10s of simulated time");
        }
    }

    let leader_idx = nodes.iter().position(|n| n.is_leader()).unwrap();
    println!(
        "   {} became leader in term {} at t={}ms\n",
        nodes[leader_idx].node_id(),
        nodes[leader_idx].status().term,
        elapsed
    );

    for node in nodes.iter_mut() {
        node.register_apply_callback(|entry| {
            println!("   [apply {}] index {} -> {:?}", entry.term, entry.index, entry.command);
            Ok(())
        });
    }

    println!("3. Submitting commands through the leader...");
    for command in ["set x=1", "set y=2"] {
        match nodes[leader_idx]
            .submit(command.to_string())
            .expect("submit never fails once leading")
        {
            SubmitOutcome::Accepted { index } => println!("   accepted '{command}' at index {index}"),
            SubmitOutcome::NotLeader { .. } => unreachable!("we just checked is_leader()"),
        }
    }

    println!("\n4. Driving the cluster until every node has committed...");
    let mut rounds = 0;
    while !nodes.iter().all(|n| n.status().commit_index == 2) {
        clock.advance(5);
        for node in nodes.iter_mut() {
            node.tick().expect("tick never fails on a healthy node");
        }
        pump(&mut nodes);
        rounds += 1;
        if rounds > 1000 {
            panic!("replication never converged");
        }
    }

    println!("\n5. Final status of every node:");
    for node in &nodes {
        println!("   {:?}", node.status());
    }
}
