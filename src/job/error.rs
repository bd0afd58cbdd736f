use std::path::PathBuf;

use thiserror::Error;

use crate::cc::{CollectiveError, CollectiveOp};
use crate::net::MeshError;

use super::config::SumOpKind;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid job json: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("unsupported schema_version {got}, expected {expected}")]
    SchemaVersion { got: u32, expected: u32 },

    #[error("a job needs at least one host")]
    EmptyGroup,

    #[error("{0}")]
    UnknownCollective(String),

    #[error("expected one value per host ({expected}), got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("op {op} cannot combine {kind} values")]
    IncompatibleOp { op: SumOpKind, kind: &'static str },

    #[error("initial is only used by prefix sums, not {collective}")]
    InitialNotSupported { collective: CollectiveOp },

    #[error("initial is a {got} but values are {expected}s")]
    InitialKind {
        expected: &'static str,
        got: &'static str,
    },

    #[error("host {rank}: {source}")]
    Collective {
        rank: usize,
        #[source]
        source: CollectiveError,
    },

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
