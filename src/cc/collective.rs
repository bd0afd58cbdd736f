//! Names and round budgets of the collective operations.

use std::fmt;

use serde::Serialize;

use super::math::ceil_log2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectiveOp {
    PrefixSum,
    ExPrefixSum,
    PrefixSumHypercube,
    Broadcast,
    BroadcastTrivial,
    Reduce,
    AllReduce,
    AllReduceHypercube,
}

impl CollectiveOp {
    pub const ALL: [CollectiveOp; 8] = [
        Self::PrefixSum,
        Self::ExPrefixSum,
        Self::PrefixSumHypercube,
        Self::Broadcast,
        Self::BroadcastTrivial,
        Self::Reduce,
        Self::AllReduce,
        Self::AllReduceHypercube,
    ];

    pub fn parse(raw: &str) -> Result<Self, String> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(Self::AllReduce);
        }
        let compact: String = normalized
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .collect();
        match compact.as_str() {
            "prefixsum" | "inclusiveprefixsum" | "scan" => Ok(Self::PrefixSum),
            "exprefixsum" | "exclusiveprefixsum" | "exscan" => Ok(Self::ExPrefixSum),
            "prefixsumhypercube" => Ok(Self::PrefixSumHypercube),
            "broadcast" | "bcast" | "broadcastbinomialtree" => Ok(Self::Broadcast),
            "broadcasttrivial" => Ok(Self::BroadcastTrivial),
            "reduce" => Ok(Self::Reduce),
            "allreduce" => Ok(Self::AllReduce),
            "allreducehypercube" => Ok(Self::AllReduceHypercube),
            _ => Err(format!("unknown collective op: {raw}")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PrefixSum => "prefix_sum",
            Self::ExPrefixSum => "ex_prefix_sum",
            Self::PrefixSumHypercube => "prefix_sum_hypercube",
            Self::Broadcast => "broadcast",
            Self::BroadcastTrivial => "broadcast_trivial",
            Self::Reduce => "reduce",
            Self::AllReduce => "all_reduce",
            Self::AllReduceHypercube => "all_reduce_hypercube",
        }
    }

    pub fn requires_power_of_two(self) -> bool {
        matches!(self, Self::PrefixSumHypercube | Self::AllReduceHypercube)
    }

    /// Whether the operation takes a root (or origin) rank.
    pub fn is_rooted(self) -> bool {
        matches!(self, Self::Broadcast | Self::BroadcastTrivial | Self::Reduce)
    }

    /// Upper bound on sequential message rounds any single host goes through.
    ///
    /// The trivial broadcast is the only linear one: its origin issues
    /// `ranks - 1` sends back to back.
    pub fn total_rounds(self, ranks: usize) -> usize {
        let rounds = ceil_log2(ranks);
        match self {
            Self::BroadcastTrivial => ranks.saturating_sub(1),
            Self::AllReduce => rounds.saturating_mul(2),
            _ => rounds,
        }
    }
}

impl fmt::Display for CollectiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
