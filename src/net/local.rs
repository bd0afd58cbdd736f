//! 进程内全连接通信组
//!
//! 每个有序主机对使用一条 mpsc 字节通道，消息用 serde_json 编码，
//! 行为等价于一组可靠、有序、阻塞的字节管道。

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, trace};

use super::error::{GroupError, MeshError};
use super::group::{Group, Message};
use super::stats::GroupStats;

/// Endpoint of a [`LocalMesh`] owned by a single host.
#[derive(Debug)]
pub struct LocalGroup {
    rank: usize,
    num_hosts: usize,
    /// `tx[peer]` carries frames from this host to `peer`.
    tx: Vec<Option<Sender<Vec<u8>>>>,
    /// `rx[peer]` carries frames from `peer` to this host.
    rx: Vec<Option<Receiver<Vec<u8>>>>,
    stats: GroupStats,
}

impl LocalGroup {
    pub fn stats(&self) -> &GroupStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = GroupStats::default();
    }

    fn check_peer(&self, peer: usize) -> Result<(), GroupError> {
        if peer >= self.num_hosts {
            return Err(GroupError::InvalidPeer {
                peer,
                num_hosts: self.num_hosts,
            });
        }
        if peer == self.rank {
            return Err(GroupError::SelfMessage { rank: self.rank });
        }
        Ok(())
    }
}

impl Group for LocalGroup {
    fn num_hosts(&self) -> usize {
        self.num_hosts
    }

    fn my_host_rank(&self) -> usize {
        self.rank
    }

    fn send_to<T: Message>(&mut self, peer: usize, value: &T) -> Result<(), GroupError> {
        self.check_peer(peer)?;
        let frame =
            serde_json::to_vec(value).map_err(|source| GroupError::Encode { peer, source })?;
        let bytes = frame.len();
        let tx = self.tx[peer]
            .as_ref()
            .ok_or(GroupError::Disconnected { peer })?;
        tx.send(frame)
            .map_err(|_| GroupError::Disconnected { peer })?;
        self.stats.on_send(peer, bytes);
        trace!(rank = self.rank, peer, bytes, "frame sent");
        Ok(())
    }

    fn receive_from<T: Message>(&mut self, peer: usize) -> Result<T, GroupError> {
        self.check_peer(peer)?;
        let rx = self.rx[peer]
            .as_ref()
            .ok_or(GroupError::Disconnected { peer })?;
        let frame = rx.recv().map_err(|_| GroupError::Disconnected { peer })?;
        self.stats.on_receive(peer, frame.len());
        trace!(rank = self.rank, peer, bytes = frame.len(), "frame received");
        serde_json::from_slice(&frame).map_err(|source| GroupError::Decode { peer, source })
    }
}

/// A fully connected set of in-process hosts.
#[derive(Debug)]
pub struct LocalMesh {
    hosts: Vec<LocalGroup>,
}

impl LocalMesh {
    /// Build `num_hosts` endpoints with one channel per ordered host pair.
    pub fn new(num_hosts: usize) -> Result<Self, MeshError> {
        if num_hosts == 0 {
            return Err(MeshError::EmptyGroup);
        }

        let mut hosts: Vec<LocalGroup> = (0..num_hosts)
            .map(|rank| LocalGroup {
                rank,
                num_hosts,
                tx: (0..num_hosts).map(|_| None).collect(),
                rx: (0..num_hosts).map(|_| None).collect(),
                stats: GroupStats::default(),
            })
            .collect();

        for src in 0..num_hosts {
            for dst in 0..num_hosts {
                if src == dst {
                    continue;
                }
                let (tx, rx) = mpsc::channel();
                hosts[src].tx[dst] = Some(tx);
                hosts[dst].rx[src] = Some(rx);
            }
        }

        debug!(num_hosts, "local mesh built");
        Ok(Self { hosts })
    }

    pub fn num_hosts(&self) -> usize {
        self.hosts.len()
    }

    /// Hand out the endpoints, ordered by rank.
    pub fn into_hosts(self) -> Vec<LocalGroup> {
        self.hosts
    }
}

/// Run `f` once per host, each on its own thread with its own endpoint, and
/// collect the results ordered by rank.
///
/// A worker that panics drops its endpoint, so peers blocked on it observe
/// [`GroupError::Disconnected`] instead of hanging.
pub fn run_workers<R, F>(num_hosts: usize, f: F) -> Result<Vec<R>, MeshError>
where
    R: Send,
    F: Fn(&mut LocalGroup) -> R + Sync,
{
    let hosts = LocalMesh::new(num_hosts)?.into_hosts();
    let f = &f;

    thread::scope(|scope| {
        let handles: Vec<_> = hosts
            .into_iter()
            .map(|mut group| {
                thread::Builder::new()
                    .name(format!("host-{}", group.my_host_rank()))
                    .spawn_scoped(scope, move || f(&mut group))
            })
            .collect();

        let mut results = Vec::with_capacity(num_hosts);
        let mut failed = None;
        for (rank, handle) in handles.into_iter().enumerate() {
            match handle {
                Ok(handle) => match handle.join() {
                    Ok(r) => results.push(r),
                    Err(_) => {
                        failed.get_or_insert(MeshError::WorkerPanicked { rank });
                    }
                },
                Err(_) => {
                    failed.get_or_insert(MeshError::WorkerPanicked { rank });
                }
            }
        }

        match failed {
            Some(err) => Err(err),
            None => Ok(results),
        }
    })
}
