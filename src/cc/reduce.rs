//! Binomial tree reduction to a single root.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::net::{Group, Message};

use super::error::{CollectiveError, check_root};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReduceState {
    /// Still collecting subtrees from higher shifted ranks.
    Active,
    /// Our subtree went to the parent; remaining rounds are no-ops.
    Done,
}

/// Partial fold of a run of consecutive shifted ranks.
///
/// Shifted order starts at the root and wraps from rank `n - 1` to rank 0.
/// Keeping the ranks at or above the root (`high`) apart from the wrapped
/// ones (`low`) lets the root put them back in ascending rank order.
#[derive(Debug, Serialize, Deserialize)]
struct Segment<T> {
    high: Option<T>,
    low: Option<T>,
}

fn join<T, F>(sum_op: &F, lhs: Option<T>, rhs: Option<T>) -> Option<T>
where
    F: Fn(&T, &T) -> T,
{
    match (lhs, rhs) {
        (Some(l), Some(r)) => Some(sum_op(&l, &r)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Fold every host's value into `value` on `root`, in ascending rank order,
/// for any root.
///
/// On other hosts `value` is left untouched and should be treated as
/// unspecified.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts(), root = root)
)]
pub fn reduce<G, T, F>(
    group: &mut G,
    value: &mut T,
    root: usize,
    sum_op: F,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    let num_hosts = group.num_hosts();
    check_root(root, num_hosts)?;

    let rank = group.my_host_rank();
    let shifted_rank = (rank + num_hosts - root) % num_hosts;
    let mut state = ReduceState::Active;
    let mut segment = if rank >= root {
        Segment { high: Some(value.clone()), low: None }
    } else {
        Segment { high: None, low: Some(value.clone()) }
    };

    let mut d = 1;
    while d < num_hosts {
        if state == ReduceState::Active {
            if shifted_rank & d != 0 {
                let to = (rank + num_hosts - d) % num_hosts;
                debug!(round = d, to, shifted_rank, "sending subtree to parent");
                group.send_to(to, &segment)?;
                state = ReduceState::Done;
                trace!(round = d, "reduce done on this host");
            } else if shifted_rank + d < num_hosts {
                let from = (rank + d) % num_hosts;
                let recv: Segment<T> = group.receive_from(from)?;
                debug!(round = d, from, shifted_rank, "folded child subtree");
                // Our run of shifted ranks precedes the child's.
                segment = Segment {
                    high: join(&sum_op, segment.high, recv.high),
                    low: join(&sum_op, segment.low, recv.low),
                };
            }
        }
        d <<= 1;
    }

    if shifted_rank == 0 {
        // Ranks below the root come first.
        if let Some(total) = join(&sum_op, segment.low, segment.high) {
            *value = total;
        }
    }
    Ok(())
}
