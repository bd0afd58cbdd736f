//! Prefix sums over the hosts of a group.
//!
//! Host `k` ends up with the fold of the values of hosts `0..=k` (inclusive)
//! or `0..k` (exclusive), always combined in ascending rank order so the
//! operator only needs to be associative.

use tracing::{debug, trace};

use crate::net::{Group, Message};

use super::collective::CollectiveOp;
use super::error::{CollectiveError, check_power_of_two};

/// Progress of one host through a recursive-doubling prefix sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixState {
    /// Exclusive mode before anything arrived: the host's own value must not
    /// enter its result, so the first receipt replaces it.
    AwaitingFirstReceipt,
    /// Every further receipt is folded in front of the current result.
    Accumulating,
}

/// Inclusive (`inclusive == true`) or exclusive prefix sum for any group size.
///
/// In exclusive mode host 0 receives `T::default()`, which must be an
/// identity of `sum_op`.
pub fn prefix_sum<G, T, F>(
    group: &mut G,
    value: &mut T,
    sum_op: F,
    inclusive: bool,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone + Default,
    F: Fn(&T, &T) -> T,
{
    if inclusive {
        scan(group, value, &sum_op, None)
    } else {
        scan(group, value, &sum_op, Some(T::default()))
    }
}

/// Inclusive prefix sum without requiring an identity element.
pub fn inclusive_prefix_sum<G, T, F>(
    group: &mut G,
    value: &mut T,
    sum_op: F,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    scan(group, value, &sum_op, None)
}

/// Exclusive prefix sum; host 0 gets `T::default()`.
pub fn ex_prefix_sum<G, T, F>(group: &mut G, value: &mut T, sum_op: F) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone + Default,
    F: Fn(&T, &T) -> T,
{
    scan(group, value, &sum_op, Some(T::default()))
}

/// Exclusive prefix sum with an explicit identity element for host 0.
pub fn ex_prefix_sum_with<G, T, F>(
    group: &mut G,
    value: &mut T,
    initial: T,
    sum_op: F,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    scan(group, value, &sum_op, Some(initial))
}

/// Recursive doubling: in round `d` host `r` sends its running partial sum
/// to `r + d` and receives the partial sum of `r - d`, so after
/// `ceil(log2(n))` rounds every host has seen all of its predecessors.
///
/// `identity` is `Some` for an exclusive scan.
#[tracing::instrument(
    skip_all,
    fields(
        rank = group.my_host_rank(),
        num_hosts = group.num_hosts(),
        exclusive = identity.is_some()
    )
)]
fn scan<G, T, F>(
    group: &mut G,
    value: &mut T,
    sum_op: &F,
    identity: Option<T>,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    let num_hosts = group.num_hosts();
    let rank = group.my_host_rank();

    let mut state = if identity.is_some() {
        PrefixState::AwaitingFirstReceipt
    } else {
        PrefixState::Accumulating
    };
    // In exclusive mode what we forward is not our result.
    let mut to_forward = value.clone();

    let mut d = 1;
    while d < num_hosts {
        if rank + d < num_hosts {
            debug!(round = d, to = rank + d, "sending partial sum");
            group.send_to(rank + d, &to_forward)?;
        }

        if rank >= d {
            let recv: T = group.receive_from(rank - d)?;
            debug!(round = d, from = rank - d, "received partial sum");

            // The sender covers strictly lower ranks, so it goes on the left.
            to_forward = sum_op(&recv, &to_forward);
            match state {
                PrefixState::Accumulating => *value = sum_op(&recv, value),
                PrefixState::AwaitingFirstReceipt => {
                    *value = recv;
                    state = PrefixState::Accumulating;
                    trace!(round = d, "first receipt taken as exclusive base");
                }
            }
        }

        d <<= 1;
    }

    // Only host 0 never receives anything.
    if let (Some(identity), PrefixState::AwaitingFirstReceipt) = (identity, state) {
        *value = identity;
    }
    Ok(())
}

/// Inclusive prefix sum by hypercube exchange. The group size must be a
/// power of two; otherwise this fails before sending anything.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts())
)]
pub fn prefix_sum_hypercube<G, T, F>(
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
    check_power_of_two(CollectiveOp::PrefixSumHypercube, num_hosts)?;

    // Fold of the whole sub-cube this host belongs to so far.
    let mut total_sum = value.clone();

    let mut d = 1;
    while d < num_hosts {
        let peer = rank ^ d;
        group.send_to(peer, &total_sum)?;
        let recv: T = group.receive_from(peer)?;
        debug!(round = d, peer, "exchanged sub-cube sums");

        if rank & d != 0 {
            // The peer's sub-cube precedes ours.
            total_sum = sum_op(&recv, &total_sum);
            *value = sum_op(&recv, value);
        } else {
            total_sum = sum_op(&total_sum, &recv);
        }

        d <<= 1;
    }

    Ok(())
}
