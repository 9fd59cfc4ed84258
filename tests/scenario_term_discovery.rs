// Spec scenario 5: a leader that has been partitioned away discovers a
// newer term from a follower's rejection and steps down, abandoning
// its claim to leadership without anyone telling it directly about the
// new leader.

mod common;

use common::scripted_node;
use raftcore::config::RaftConfig;
use raftcore::raft::role::Role;
use raftcore::raft::rpc::{AppendEntriesContext, AppendEntriesRequest};

#[test]
fn stale_leader_steps_down_on_discovering_higher_term_via_reply() {
    let config = RaftConfig::default();
    let (mut l1, l1_clock) = scripted_node("L1", &["F"], config.clone());
    let (mut follower, _follower_clock) = scripted_node("F", &["L1"], config);

    // L1 wins term 1.
    l1_clock.advance(10);
    l1.tick().unwrap();
    l1.on_request_vote_reply(
        "F".to_string(),
        raftcore::raft::rpc::RequestVoteReply {
            term: l1.status().term,
            vote_granted: true,
        },
    )
    .unwrap();
    assert!(l1.is_leader());
    assert_eq!(l1.status().term, 1);

    // Meanwhile, unseen by L1, the follower has already heard from a
    // new leader L2 campaigning at term 3 (e.g. across a network
    // partition that hid L1 from the rest of the cluster).
    let from_l2 = follower
        .on_append_entries(AppendEntriesRequest {
            term: 3,
            leader_id: "L2".to_string(),
            prev_log_index: 0,
            prev_log_term: 0,
            entries: vec![],
            leader_commit: 0,
        })
        .unwrap();
    assert!(from_l2.success);
    assert_eq!(follower.status().term, 3);

    // L1, unaware of any of this, sends its stale term-1 heartbeat.
    let stale_heartbeat_term = l1.status().term;
    let reply = follower
        .on_append_entries(AppendEntriesRequest {
            term: stale_heartbeat_term,
            leader_id: "L1".to_string(),
            prev_log_index: 0,
            prev_log_term: 0,
            entries: vec![],
            leader_commit: 0,
        })
        .unwrap();
    assert!(!reply.success);
    assert_eq!(reply.term, 3);

    // Once L1 sees that reply, it must recognize term 3 as current and
    // step down, even though it never directly heard from L2.
    l1.on_append_entries_reply(
        "F".to_string(),
        reply,
        AppendEntriesContext {
            prev_log_index: 0,
            entries_sent_len: 0,
        },
    )
    .unwrap();

    assert_eq!(l1.status().role, Role::Follower);
    assert_eq!(l1.status().term, 3);
    assert!(!l1.is_leader());
}
