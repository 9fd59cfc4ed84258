//! Abstract peer transport (spec §1, §5). The core never blocks
//! waiting for a reply: it hands outbound RPCs to a `Transport` and
//! later receives replies as ordinary inbound events
//! (`on_request_vote_reply` / `on_append_entries_reply`), exactly like
//! any other message the driver feeds in.
//!
//! `QueueTransport` is the reference collaborator used by the demos
//! and tests: `send_*` just enqueues a message for the driver to pump
//! to the destination node (and back) however it likes — in process
//! for a simulated cluster, or over a real socket for a production
//! driver.

use std::collections::VecDeque;

use super::rpc::{AppendEntriesContext, AppendEntriesRequest, RequestVoteRequest};
use crate::common::NodeId;

pub trait Transport<C>: std::fmt::Debug + Send + Sync {
    fn send_request_vote(&mut self, to: &NodeId, request: RequestVoteRequest);
    fn send_append_entries(
        &mut self,
        to: &NodeId,
        request: AppendEntriesRequest<C>,
        context: AppendEntriesContext,
    );

    /// Hands back whatever is queued for an external driver to deliver.
    /// Transports that ship bytes over a real socket as soon as `send_*`
    /// is called have nothing to hand back, so the default is empty;
    /// `QueueTransport` is the one reference collaborator that overrides it.
    fn drain_pending(&mut self) -> Vec<OutboundMessage<C>> {
        Vec::new()
    }
}

/// Drops every outbound RPC. Correct (if useless) for a single-node
/// "cluster" with no peers (spec §8 scenario 1).
#[derive(Debug, Default)]
pub struct NullTransport;

impl<C: std::fmt::Debug> Transport<C> for NullTransport {
    fn send_request_vote(&mut self, _to: &NodeId, _request: RequestVoteRequest) {}
    fn send_append_entries(
        &mut self,
        _to: &NodeId,
        _request: AppendEntriesRequest<C>,
        _context: AppendEntriesContext,
    ) {
    }
}

#[derive(Debug)]
pub enum OutboundMessage<C> {
    RequestVote {
        to: NodeId,
        request: RequestVoteRequest,
    },
    AppendEntries {
        to: NodeId,
        request: AppendEntriesRequest<C>,
        context: AppendEntriesContext,
    },
}

/// Fire-and-forget mailbox: `send_*` just pushes, `drain` hands the
/// backlog to whatever is actually moving bytes.
#[derive(Debug, Default)]
pub struct QueueTransport<C> {
    outbox: VecDeque<OutboundMessage<C>>,
}

impl<C> QueueTransport<C> {
    pub fn new() -> Self {
        Self {
            outbox: VecDeque::new(),
        }
    }

    pub fn drain(&mut self) -> Vec<OutboundMessage<C>> {
        self.outbox.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty()
    }
}

impl<C: std::fmt::Debug + Send + Sync> Transport<C> for QueueTransport<C> {
    fn send_request_vote(&mut self, to: &NodeId, request: RequestVoteRequest) {
        self.outbox.push_back(OutboundMessage::RequestVote {
            to: to.clone(),
            request,
        });
    }

    fn send_append_entries(
        &mut self,
        to: &NodeId,
        request: AppendEntriesRequest<C>,
        context: AppendEntriesContext,
    ) {
        self.outbox.push_back(OutboundMessage::AppendEntries {
            to: to.clone(),
            request,
            context,
        });
    }

    fn drain_pending(&mut self) -> Vec<OutboundMessage<C>> {
        self.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_transport_collects_and_drains() {
        let mut transport: QueueTransport<String> = QueueTransport::new();
        transport.send_request_vote(
            &"peer".to_string(),
            RequestVoteRequest {
                term: 1,
                candidate_id: "self".to_string(),
                last_log_index: 0,
                last_log_term: 0,
            },
        );
        assert!(!transport.is_empty());
        let drained = transport.drain();
        assert_eq!(drained.len(), 1);
        assert!(transport.is_empty());
    }
}
