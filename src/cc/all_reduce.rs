//! All-reduce: every host ends with the fold over all hosts.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::net::{Group, Message};

use super::broadcast::broadcast;
use super::collective::CollectiveOp;
use super::error::{CollectiveError, check_power_of_two};
use super::math::is_power_of_two;
use super::reduce::reduce;

/// Strategy used by [`all_reduce_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllReduceAlgorithm {
    /// Reduce to host 0, then broadcast from host 0. Any group size.
    ReduceBroadcast,
    /// Single-phase hypercube exchange. Power-of-two group sizes only.
    Hypercube,
}

impl AllReduceAlgorithm {
    pub fn auto(num_hosts: usize) -> Self {
        if is_power_of_two(num_hosts) {
            Self::Hypercube
        } else {
            Self::ReduceBroadcast
        }
    }
}

/// Two-phase all-reduce for any group size.
///
/// Both phases are built from blocking exchanges with matching round counts,
/// so no extra barrier is needed between them.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts())
)]
pub fn all_reduce<G, T, F>(group: &mut G, value: &mut T, sum_op: F) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    reduce(group, value, 0, sum_op)?;
    broadcast(group, value, 0)
}

/// Hypercube all-reduce: in round `d` every host swaps its value with
/// `rank ^ d`. Fails before sending anything unless the group size is a
/// power of two.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts())
)]
pub fn all_reduce_hypercube<G, T, F>(
    group: &mut G,
    value: &mut T,
    sum_op: F,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    let num_hosts = group.num_hosts();
    let rank = group.my_host_rank();
    check_power_of_two(CollectiveOp::AllReduceHypercube, num_hosts)?;

    let mut d = 1;
    while d < num_hosts {
        let peer = rank ^ d;
        let mut conn = group.connection(peer);
        conn.send(&*value)?;
        let recv: T = conn.receive()?;
        debug!(round = d, peer, "exchanged value");

        // The half with bit `d` cleared holds the lower ranks.
        *value = if rank & d != 0 {
            sum_op(&recv, value)
        } else {
            sum_op(value, &recv)
        };

        d <<= 1;
    }

    Ok(())
}

pub fn all_reduce_with<G, T, F>(
    group: &mut G,
    value: &mut T,
    sum_op: F,
    algorithm: AllReduceAlgorithm,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    match algorithm {
        AllReduceAlgorithm::ReduceBroadcast => all_reduce(group, value, sum_op),
        AllReduceAlgorithm::Hypercube => all_reduce_hypercube(group, value, sum_op),
    }
}
