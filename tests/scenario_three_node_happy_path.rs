// Spec scenario 2: a three-node cluster elects a leader, replicates one
// submitted command to both followers, and converges on the same
// `commit_index`/`last_applied` everywhere.

mod common;

use common::Cluster;
use raftcore::config::RaftConfig;
use raftcore::SubmitOutcome;

#[test]
fn three_node_cluster_elects_and_replicates_one_command() {
    let mut cluster = Cluster::new(&["A", "B", "C"], RaftConfig::default(), 100);

    let elected = cluster.run_until(10, 200, |c| c.leader_index().is_some());
    assert!(elected, "a leader must emerge within the timeout window");

    match cluster.submit_via_leader("cmd1") {
        SubmitOutcome::Accepted { index } => assert_eq!(index, 1),
        SubmitOutcome::NotLeader { .. } => panic!("leader_index() pointed at a non-leader"),
    }

    let converged = cluster.run_until(10, 200, |c| c.nodes.iter().all(|n| n.status().commit_index == 1));
    assert!(converged, "replication must converge within the timeout window");

    for node in &cluster.nodes {
        let status = node.status();
        assert_eq!(status.commit_index, 1);
        assert_eq!(status.last_applied, 1);
    }
}
