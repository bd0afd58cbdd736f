use super::harness::{Mat2, add, ceil_log2, concat, run_each, run_in_place, seq_fold, tokens, values_of};
use crate::cc::{
    CollectiveError, CollectiveOp, GroupCollectives, ex_prefix_sum, ex_prefix_sum_with,
    inclusive_prefix_sum, prefix_sum, prefix_sum_hypercube,
};

#[test]
fn five_hosts_integer_prefix_sums() {
    let values: Vec<i64> = vec![1, 2, 3, 4, 5];

    let inclusive = run_in_place(&values, |g, v| prefix_sum(g, v, add, true));
    assert_eq!(values_of(&inclusive), vec![1, 3, 6, 10, 15]);

    let exclusive = run_in_place(&values, |g, v| prefix_sum(g, v, add, false));
    assert_eq!(values_of(&exclusive), vec![0, 1, 3, 6, 10]);

    let exclusive = run_in_place(&values, |g, v| ex_prefix_sum(g, v, add));
    assert_eq!(values_of(&exclusive), vec![0, 1, 3, 6, 10]);
}

#[test]
fn inclusive_prefix_keeps_rank_order_for_every_group_size() {
    for n in 1..=17 {
        let values = tokens(n);
        let out = run_in_place(&values, |g, v| prefix_sum(g, v, concat, true));
        for (k, (got, _)) in out.iter().enumerate() {
            assert_eq!(got, &seq_fold(&values[..=k], concat), "n={n} rank={k}");
        }
    }
}

#[test]
fn exclusive_prefix_starts_with_identity() {
    for n in 1..=17 {
        let values = tokens(n);
        let out = run_in_place(&values, |g, v| ex_prefix_sum(g, v, concat));
        assert_eq!(out[0].0, "", "n={n}");
        for k in 1..n {
            assert_eq!(out[k].0, seq_fold(&values[..k], concat), "n={n} rank={k}");
        }
    }
}

#[test]
fn exclusive_prefix_with_explicit_identity() {
    for n in [1, 2, 3, 6, 9] {
        let values: Vec<Mat2> = (0..n).map(Mat2::for_rank).collect();
        let out = run_in_place(&values, |g, v| {
            ex_prefix_sum_with(g, v, Mat2::IDENTITY, Mat2::mul)
        });
        assert_eq!(out[0].0, Mat2::IDENTITY);
        for k in 1..n {
            assert_eq!(out[k].0, seq_fold(&values[..k], Mat2::mul), "n={n} rank={k}");
        }
    }
}

#[test]
fn inclusive_prefix_without_default() {
    let values: Vec<Mat2> = (0..7).map(Mat2::for_rank).collect();
    let out = run_in_place(&values, |g, v| inclusive_prefix_sum(g, v, Mat2::mul));
    for k in 0..values.len() {
        assert_eq!(out[k].0, seq_fold(&values[..=k], Mat2::mul), "rank={k}");
    }
}

#[test]
fn single_host_sends_nothing() {
    let out = run_in_place(&[7i64], |g, v| prefix_sum(g, v, add, true));
    assert_eq!(out[0].0, 7);
    assert_eq!(out[0].1.total_msgs(), 0);

    let out = run_in_place(&[7i64], |g, v| prefix_sum(g, v, add, false));
    assert_eq!(out[0].0, 0);
    assert_eq!(out[0].1.total_msgs(), 0);
}

#[test]
fn prefix_sum_stays_within_log_rounds() {
    for n in 1..=17 {
        let values = tokens(n);
        for inclusive in [true, false] {
            let out = run_in_place(&values, |g, v| prefix_sum(g, v, concat, inclusive));
            for (rank, (_, stats)) in out.iter().enumerate() {
                assert!(stats.sent_msgs <= ceil_log2(n), "n={n} rank={rank}");
                assert!(stats.received_msgs <= ceil_log2(n), "n={n} rank={rank}");
            }
        }
    }
}

#[test]
fn hypercube_prefix_matches_recursive_doubling() {
    for n in [1, 2, 4, 8, 16] {
        let values = tokens(n);
        let general = run_in_place(&values, |g, v| prefix_sum(g, v, concat, true));
        let cube = run_in_place(&values, |g, v| prefix_sum_hypercube(g, v, concat));
        assert_eq!(values_of(&general), values_of(&cube), "n={n}");
        for (_, stats) in &cube {
            assert_eq!(stats.sent_msgs, ceil_log2(n));
            assert_eq!(stats.received_msgs, ceil_log2(n));
        }

        let mats: Vec<Mat2> = (0..n).map(Mat2::for_rank).collect();
        let general = run_in_place(&mats, |g, v| inclusive_prefix_sum(g, v, Mat2::mul));
        let cube = run_in_place(&mats, |g, v| prefix_sum_hypercube(g, v, Mat2::mul));
        assert_eq!(values_of(&general), values_of(&cube), "n={n}");
    }
}

#[test]
fn hypercube_prefix_rejects_non_power_of_two_before_sending() {
    for n in [3, 5, 6, 12] {
        let out = run_each(&tokens(n), |g, mut v| {
            let err = prefix_sum_hypercube(g, &mut v, concat).unwrap_err();
            (err, g.stats().total_msgs())
        });
        for (err, msgs) in out {
            assert!(matches!(
                err,
                CollectiveError::NotPowerOfTwo {
                    op: CollectiveOp::PrefixSumHypercube,
                    num_hosts
                } if num_hosts == n
            ));
            assert_eq!(msgs, 0);
        }
    }
}

#[test]
fn group_method_forms() {
    let values: Vec<i64> = vec![4, 1, 7];
    let out = run_in_place(&values, |g, v| g.prefix_sum(v, add, true));
    assert_eq!(values_of(&out), vec![4, 5, 12]);

    let out = run_in_place(&values, |g, v| g.ex_prefix_sum(v, add));
    assert_eq!(values_of(&out), vec![0, 4, 5]);
}
