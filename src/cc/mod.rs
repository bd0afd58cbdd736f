//! 集合通信算法
//!
//! 前缀和、广播、归约与全归约。所有算法都按 rank 升序组合，只要求组合算子满足结合律，
//! 不要求交换律；每个主机执行相同的轮数，总轮数为 ceil(log2(n))（平凡广播除外）。

mod all_reduce;
mod broadcast;
mod error;
mod ext;
mod items;
mod math;
mod prefix_sum;
mod reduce;

pub mod collective;

pub use all_reduce::{AllReduceAlgorithm, all_reduce, all_reduce_hypercube, all_reduce_with};
pub use broadcast::{
    BroadcastAlgorithm, broadcast, broadcast_binomial_tree, broadcast_trivial, broadcast_with,
};
pub use collective::CollectiveOp;
pub use error::CollectiveError;
pub use ext::GroupCollectives;
pub use items::prefix_sum_items;
pub use math::{ceil_log2, is_power_of_two, lowest_set_bit, round_up_to_power_of_two};
pub use prefix_sum::{
    ex_prefix_sum, ex_prefix_sum_with, inclusive_prefix_sum, prefix_sum, prefix_sum_hypercube,
};
pub use reduce::reduce;
