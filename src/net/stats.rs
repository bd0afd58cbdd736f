//! 通信统计
//!
//! 记录每个端点收发的消息数与字节数，用于检查轮数上界。

use std::collections::BTreeMap;

use serde::Serialize;

/// Per-endpoint message counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    pub sent_msgs: u64,
    pub sent_bytes: u64,
    pub received_msgs: u64,
    pub received_bytes: u64,
    /// Messages sent, keyed by destination rank.
    pub sent_to: BTreeMap<usize, u64>,
    /// Messages received, keyed by source rank.
    pub received_from: BTreeMap<usize, u64>,
}

impl GroupStats {
    pub(crate) fn on_send(&mut self, peer: usize, bytes: usize) {
        self.sent_msgs = self.sent_msgs.saturating_add(1);
        self.sent_bytes = self.sent_bytes.saturating_add(bytes as u64);
        *self.sent_to.entry(peer).or_default() += 1;
    }

    pub(crate) fn on_receive(&mut self, peer: usize, bytes: usize) {
        self.received_msgs = self.received_msgs.saturating_add(1);
        self.received_bytes = self.received_bytes.saturating_add(bytes as u64);
        *self.received_from.entry(peer).or_default() += 1;
    }

    /// Total point-to-point operations issued by this endpoint.
    pub fn total_msgs(&self) -> u64 {
        self.sent_msgs.saturating_add(self.received_msgs)
    }
}
