//! 传输层错误
//!
//! 点对点通道上可能出现的失败，集合通信层原样向上传播。

use thiserror::Error;

/// Failure reported by a [`Group`](super::Group) endpoint.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("peer {peer} is out of range for a group of {num_hosts} hosts")]
    InvalidPeer { peer: usize, num_hosts: usize },

    #[error("host {rank} cannot send a message to itself")]
    SelfMessage { rank: usize },

    #[error("connection to peer {peer} is closed")]
    Disconnected { peer: usize },

    #[error("failed to encode message for peer {peer}: {source}")]
    Encode {
        peer: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode message from peer {peer}: {source}")]
    Decode {
        peer: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while building or driving an in-process [`LocalMesh`](super::LocalMesh).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("a group needs at least one host")]
    EmptyGroup,

    #[error("worker on host {rank} panicked")]
    WorkerPanicked { rank: usize },
}
