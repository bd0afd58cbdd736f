use serde::Serialize;
use tracing::info;

use crate::cc::{
    CollectiveError, CollectiveOp, all_reduce, all_reduce_hypercube, broadcast,
    broadcast_trivial, ex_prefix_sum_with, inclusive_prefix_sum, prefix_sum_hypercube,
    prefix_sum_items, reduce,
};
use crate::net::{Group, GroupStats, LocalGroup, Message, run_workers};

use super::config::{JobConfig, JobValue, JobValues, SumOpKind};
use super::error::JobError;

#[derive(Debug, Clone, Serialize)]
pub struct HostReport {
    pub rank: usize,
    /// `None` where the result is unspecified (non-root hosts of a reduce).
    pub value: Option<JobValue>,
    pub stats: GroupStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub collective: CollectiveOp,
    pub op: SumOpKind,
    pub num_hosts: usize,
    pub root: Option<usize>,
    /// Upper bound on sequential rounds per host for this collective.
    pub max_rounds: usize,
    pub hosts: Vec<HostReport>,
}

struct Plan {
    collective: CollectiveOp,
    root: usize,
    inclusive: bool,
}

/// Run `cfg` on a fresh [`LocalMesh`](crate::net::LocalMesh), one thread per host.
pub fn run_job(cfg: &JobConfig) -> Result<JobReport, JobError> {
    let collective = cfg.validate()?;
    let plan = Plan {
        collective,
        root: cfg.root(),
        inclusive: cfg.inclusive.unwrap_or(true),
    };
    info!(
        collective = %collective,
        op = %cfg.op,
        num_hosts = cfg.num_hosts,
        "running collective job"
    );

    let outcomes = match &cfg.values {
        JobValues::Ints(values) => {
            let (Some(sum_op), Some(identity)) = (cfg.op.int_op(), cfg.op.int_identity()) else {
                return Err(JobError::IncompatibleOp {
                    op: cfg.op,
                    kind: cfg.values.kind(),
                });
            };
            let initial = match &cfg.initial {
                Some(JobValue::Int(v)) => Some(*v),
                _ => None,
            };
            run_typed(&plan, values, sum_op, identity, initial)?
                .into_iter()
                .map(|(v, stats)| (JobValue::Int(v), stats))
                .collect::<Vec<_>>()
        }
        JobValues::Strings(values) => {
            let concat: fn(&String, &String) -> String = |a, b| format!("{a}{b}");
            let initial = match &cfg.initial {
                Some(JobValue::Str(v)) => Some(v.clone()),
                _ => None,
            };
            run_typed(&plan, values, concat, String::new(), initial)?
                .into_iter()
                .map(|(v, stats)| (JobValue::Str(v), stats))
                .collect::<Vec<_>>()
        }
    };

    let hosts: Vec<HostReport> = outcomes
        .into_iter()
        .enumerate()
        .map(|(rank, (value, stats))| {
            let specified = collective != CollectiveOp::Reduce || rank == plan.root;
            HostReport {
                rank,
                value: specified.then_some(value),
                stats,
            }
        })
        .collect();

    info!(collective = %collective, "collective job finished");
    Ok(JobReport {
        collective,
        op: cfg.op,
        num_hosts: cfg.num_hosts,
        root: collective.is_rooted().then_some(plan.root),
        max_rounds: collective.total_rounds(cfg.num_hosts),
        hosts,
    })
}

fn run_typed<T>(
    plan: &Plan,
    values: &[T],
    sum_op: fn(&T, &T) -> T,
    identity: T,
    initial: Option<T>,
) -> Result<Vec<(T, GroupStats)>, JobError>
where
    T: Message + Clone + Sync,
{
    let results = run_workers(values.len(), |group: &mut LocalGroup| {
        let rank = group.my_host_rank();
        let mut value = values[rank].clone();
        run_one(group, plan, &mut value, sum_op, identity.clone(), initial.clone())
            .map(|()| (value, group.stats().clone()))
            .map_err(|source| JobError::Collective { rank, source })
    })?;
    results.into_iter().collect()
}

fn run_one<G, T>(
    group: &mut G,
    plan: &Plan,
    value: &mut T,
    sum_op: fn(&T, &T) -> T,
    identity: T,
    initial: Option<T>,
) -> Result<(), CollectiveError>
where
    G: Group,
    T: Message + Clone,
{
    match plan.collective {
        CollectiveOp::PrefixSum | CollectiveOp::ExPrefixSum => {
            let inclusive = plan.collective == CollectiveOp::PrefixSum && plan.inclusive;
            match (initial, inclusive) {
                (None, true) => inclusive_prefix_sum(group, value, sum_op),
                (None, false) => ex_prefix_sum_with(group, value, identity, sum_op),
                (Some(initial), true) => {
                    // One item per host: its running prefix is the inclusive result.
                    let scanned =
                        prefix_sum_items(group, std::slice::from_ref(&*value), initial, sum_op)?;
                    if let Some(last) = scanned.into_iter().last() {
                        *value = last;
                    }
                    Ok(())
                }
                (Some(initial), false) => {
                    ex_prefix_sum_with(group, value, identity, sum_op)?;
                    *value = sum_op(&initial, value);
                    Ok(())
                }
            }
        }
        CollectiveOp::PrefixSumHypercube => prefix_sum_hypercube(group, value, sum_op),
        CollectiveOp::Broadcast => broadcast(group, value, plan.root),
        CollectiveOp::BroadcastTrivial => broadcast_trivial(group, value, plan.root),
        CollectiveOp::Reduce => reduce(group, value, plan.root, sum_op),
        CollectiveOp::AllReduce => all_reduce(group, value, sum_op),
        CollectiveOp::AllReduceHypercube => all_reduce_hypercube(group, value, sum_op),
    }
}
