//! Global prefix sum over item sequences spread across hosts.

use tracing::debug;

use crate::net::{Group, Message};

use super::error::CollectiveError;
use super::prefix_sum::ex_prefix_sum_with;

/// Running inclusive prefix of every local item, offset by the fold of all
/// items held by lower-ranked hosts.
///
/// Concatenating the outputs of hosts `0..n` gives the sequential scan of the
/// concatenated inputs starting from `initial`. Hosts with no items still take
/// part in the exchange.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts(), items = items.len())
)]
pub fn prefix_sum_items<G, T, F>(
    group: &mut G,
    items: &[T],
    initial: T,
    sum_op: F,
) -> Result<Vec<T>, CollectiveError>
where
    G: Group,
    T: Message + Clone,
    F: Fn(&T, &T) -> T,
{
    let local_sum = items.iter().fold(None, |acc: Option<T>, item| {
        Some(match acc {
            Some(acc) => sum_op(&acc, item),
            None => item.clone(),
        })
    });

    // `None` stands for "no items", so `initial` is applied exactly once no
    // matter how many hosts hold data.
    let mut offset = local_sum;
    ex_prefix_sum_with(group, &mut offset, None, |lhs: &Option<T>, rhs: &Option<T>| {
        match (lhs, rhs) {
            (Some(l), Some(r)) => Some(sum_op(l, r)),
            (Some(x), None) | (None, Some(x)) => Some(x.clone()),
            (None, None) => None,
        }
    })?;
    debug!(has_offset = offset.is_some(), "global offset computed");

    let mut sum = match offset {
        Some(offset) => sum_op(&initial, &offset),
        None => initial,
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        sum = sum_op(&sum, item);
        out.push(sum.clone());
    }
    Ok(out)
}
