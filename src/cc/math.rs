//! Bit tricks shared by the tree and hypercube algorithms.

pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Smallest power of two `>= n`; `1` for `n == 0`.
pub fn round_up_to_power_of_two(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Number of doubling rounds needed to span `n` hosts, i.e. `ceil(log2(n))`.
pub fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    (usize::BITS - (n - 1).leading_zeros()) as usize
}

/// Index of the lowest set bit. `x` must be non-zero.
pub fn lowest_set_bit(x: usize) -> u32 {
    debug_assert!(x != 0);
    x.trailing_zeros()
}
