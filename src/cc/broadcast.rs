//! Broadcast of one host's value to the whole group.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::net::{Group, Message};

use super::error::{CollectiveError, check_root};
use super::math::{lowest_set_bit, round_up_to_power_of_two};

/// Strategy used by [`broadcast_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BroadcastAlgorithm {
    /// The origin sends to every other host itself.
    Trivial,
    /// Binomial spanning tree rooted at the origin, `ceil(log2(n))` rounds.
    BinomialTree,
}

impl BroadcastAlgorithm {
    /// With at most two hosts both strategies send the same single message.
    pub fn auto(num_hosts: usize) -> Self {
        if num_hosts <= 2 {
            Self::Trivial
        } else {
            Self::BinomialTree
        }
    }
}

/// Copy the value of host `origin` into `value` on every host.
pub fn broadcast<G, T>(group: &mut G, value: &mut T, origin: usize) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message,
{
    broadcast_binomial_tree(group, value, origin)
}

pub fn broadcast_with<G, T>(
    group: &mut G,
    value: &mut T,
    origin: usize,
    algorithm: BroadcastAlgorithm,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message,
{
    match algorithm {
        BroadcastAlgorithm::Trivial => broadcast_trivial(group, value, origin),
        BroadcastAlgorithm::BinomialTree => broadcast_binomial_tree(group, value, origin),
    }
}

/// The origin sends `n - 1` messages, everybody else receives one.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts(), origin = origin)
)]
pub fn broadcast_trivial<G, T>(
    group: &mut G,
    value: &mut T,
    origin: usize,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message,
{
    let num_hosts = group.num_hosts();
    check_root(origin, num_hosts)?;

    if group.my_host_rank() == origin {
        for peer in (0..num_hosts).filter(|&p| p != origin) {
            group.send_to(peer, &*value)?;
        }
        debug!(sends = num_hosts - 1, "origin sent to all peers");
    } else {
        *value = group.receive_from(origin)?;
        debug!("received from origin");
    }
    Ok(())
}

/// Binomial tree broadcast from an arbitrary origin.
///
/// Ranks are shifted cyclically so the origin sits at position 0. A host at
/// shifted position `s > 0` receives from `s` with its lowest set bit cleared,
/// then forwards to `s + d` for every smaller power of two `d`.
#[tracing::instrument(
    skip_all,
    fields(rank = group.my_host_rank(), num_hosts = group.num_hosts(), origin = origin)
)]
pub fn broadcast_binomial_tree<G, T>(
    group: &mut G,
    value: &mut T,
    origin: usize,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message,
{
    let num_hosts = group.num_hosts();
    check_root(origin, num_hosts)?;

    let shifted_rank = (group.my_host_rank() + num_hosts - origin) % num_hosts;

    let mut round = 0;
    let mut d;
    if shifted_rank > 0 {
        // The lowest set bit also fixes how many rounds we forward afterwards.
        round = lowest_set_bit(shifted_rank);
        d = 1usize << round;
        let from = ((shifted_rank ^ d) + origin) % num_hosts;
        *value = group.receive_from(from)?;
        debug!(round, from, shifted_rank, "received from tree parent");
    } else {
        d = round_up_to_power_of_two(num_hosts);
    }

    d >>= 1;
    while d > 0 {
        if shifted_rank + d < num_hosts {
            let to = (shifted_rank + d + origin) % num_hosts;
            debug!(round, to, shifted_rank, "forwarding to tree child");
            group.send_to(to, &*value)?;
        }
        d >>= 1;
        round += 1;
    }

    Ok(())
}
