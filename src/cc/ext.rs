//! Collectives as methods on any [`Group`].

use crate::net::{Group, Message};

use super::all_reduce::all_reduce;
use super::broadcast::broadcast;
use super::error::CollectiveError;
use super::prefix_sum::{ex_prefix_sum, prefix_sum};
use super::reduce::reduce;

/// Method-call forms of the general-purpose collectives.
///
/// Every host of the group must make the same sequence of calls with the
/// same roots; anything else blocks.
pub trait GroupCollectives: Group + Sized {
    fn prefix_sum<T, F>(&mut self, value: &mut T, sum_op: F, inclusive: bool) -> Result<(), CollectiveError>
    where
        T: Message + Clone + Default,
        F: Fn(&T, &T) -> T,
    {
        prefix_sum(self, value, sum_op, inclusive)
    }

    fn ex_prefix_sum<T, F>(&mut self, value: &mut T, sum_op: F) -> Result<(), CollectiveError>
    where
        T: Message + Clone + Default,
        F: Fn(&T, &T) -> T,
    {
        ex_prefix_sum(self, value, sum_op)
    }

    fn broadcast<T: Message>(&mut self, value: &mut T, origin: usize) -> Result<(), CollectiveError> {
        broadcast(self, value, origin)
    }

    fn reduce<T, F>(&mut self, value: &mut T, root: usize, sum_op: F) -> Result<(), CollectiveError>
    where
        T: Message + Clone,
        F: Fn(&T, &T) -> T,
    {
        reduce(self, value, root, sum_op)
    }

    fn all_reduce<T, F>(&mut self, value: &mut T, sum_op: F) -> Result<(), CollectiveError>
    where
        T: Message + Clone,
        F: Fn(&T, &T) -> T,
    {
        all_reduce(self, value, sum_op)
    }
}

impl<G: Group> GroupCollectives for G {}
