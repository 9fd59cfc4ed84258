//! The consensus core (spec §4). Each submodule owns one piece of the
//! state described there; `Node` in `node.rs` composes them and is the
//! only type external code actually touches.

mod apply;
mod election;
mod node;
mod replication;

pub mod log;
pub mod persistent;
pub mod role;
pub mod rpc;
pub mod timer;
pub mod transport;
pub mod volatile;

pub use node::{Node, Status, SubmitOutcome};
pub use transport::OutboundMessage;
