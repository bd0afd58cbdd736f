//! 通信组接口
//!
//! 集合通信算法只依赖这里的点对点收发接口，不关心底层传输。

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::GroupError;

/// A value that can travel between hosts of a [`Group`].
///
/// Wire encoding is the group's business; the collective layer only asks for
/// serde support.
pub trait Message: Serialize + DeserializeOwned + Send + 'static {}

impl<T> Message for T where T: Serialize + DeserializeOwned + Send + 'static {}

/// A fixed set of hosts with reliable, ordered, blocking point-to-point
/// channels between every pair.
///
/// Messages between one ordered pair of hosts arrive in the order they were
/// sent. There is no timeout: a receive whose matching send never happens
/// blocks forever.
pub trait Group {
    /// Number of hosts in the group, at least one.
    fn num_hosts(&self) -> usize;

    /// Rank of this endpoint, `0..num_hosts()`.
    fn my_host_rank(&self) -> usize;

    /// Send `value` to `peer`.
    fn send_to<T: Message>(&mut self, peer: usize, value: &T) -> Result<(), GroupError>;

    /// Block until the next message from `peer` arrives.
    fn receive_from<T: Message>(&mut self, peer: usize) -> Result<T, GroupError>;

    /// The channel to `peer`, addressed by endpoint instead of rank.
    fn connection(&mut self, peer: usize) -> Connection<'_, Self>
    where
        Self: Sized,
    {
        Connection { group: self, peer }
    }
}

/// One end of the channel between this host and a fixed peer.
pub struct Connection<'a, G: Group> {
    group: &'a mut G,
    peer: usize,
}

impl<G: Group> Connection<'_, G> {
    pub fn peer(&self) -> usize {
        self.peer
    }

    pub fn send<T: Message>(&mut self, value: &T) -> Result<(), GroupError> {
        self.group.send_to(self.peer, value)
    }

    pub fn receive<T: Message>(&mut self) -> Result<T, GroupError> {
        self.group.receive_from(self.peer)
    }
}

impl<G: Group> Group for &mut G {
    fn num_hosts(&self) -> usize {
        (**self).num_hosts()
    }

    fn my_host_rank(&self) -> usize {
        (**self).my_host_rank()
    }

    fn send_to<T: Message>(&mut self, peer: usize, value: &T) -> Result<(), GroupError> {
        (**self).send_to(peer, value)
    }

    fn receive_from<T: Message>(&mut self, peer: usize) -> Result<T, GroupError> {
        (**self).receive_from(peer)
    }
}
