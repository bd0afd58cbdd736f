//! Errors surfaced by collective operations.

use thiserror::Error;

use crate::net::GroupError;

use super::collective::CollectiveOp;

/// Failure of a collective call.
///
/// Only locally checkable preconditions are reported here. A protocol
/// violation across hosts (different group sizes, roots or call sequences)
/// is not detected and shows up as a blocked receive.
#[derive(Debug, Error)]
pub enum CollectiveError {
    #[error("{op} requires a power-of-two group, got {num_hosts} hosts")]
    NotPowerOfTwo { op: CollectiveOp, num_hosts: usize },

    #[error("root {root} is out of range for a group of {num_hosts} hosts")]
    InvalidRoot { root: usize, num_hosts: usize },

    #[error(transparent)]
    Group(#[from] GroupError),
}

pub(crate) fn check_root(root: usize, num_hosts: usize) -> Result<(), CollectiveError> {
    if root >= num_hosts {
        return Err(CollectiveError::InvalidRoot { root, num_hosts });
    }
    Ok(())
}

pub(crate) fn check_power_of_two(op: CollectiveOp, num_hosts: usize) -> Result<(), CollectiveError> {
    if !super::math::is_power_of_two(num_hosts) {
        return Err(CollectiveError::NotPowerOfTwo { op, num_hosts });
    }
    Ok(())
}
