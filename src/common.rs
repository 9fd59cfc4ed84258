//! Shared primitive types used across the consensus core.

/// Opaque peer identifier. A plain `String` keeps the core agnostic of
/// how a transport collaborator names its peers (socket address,
/// UUID, DNS name, ...).
pub type NodeId = String;
