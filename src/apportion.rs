//! Sum-preserving integer apportionment and the alternating balance order.
//!
//! Both routines are pure and deterministic; the layout orchestrator leans on
//! them to split a fixed lobe budget and a fixed 100-point percentage budget
//! across weighted variables without rounding drift.

use itertools::{Either, Itertools};
use ndarray::{Array1, ArrayView1};
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApportionError {
    #[error("apportionment weights must be non-negative, but weight {index} was {value}")]
    NegativeWeight { index: usize, value: f64 },

    #[error("apportionment weights must be finite, but weight {index} was {value}")]
    NonFiniteWeight { index: usize, value: f64 },

    #[error("cannot apportion a total of {total} across zero weights")]
    EmptyWeights { total: u32 },
}

/// Splits an integer `total` across `weights` proportionally, using the
/// largest-remainder (Hamilton) method.
///
/// The result always sums to `total` exactly, and every entry is within one
/// unit of its exact quota `total · wᵢ / Σw`. Leftover units after the floor
/// pass go to the largest remainders; exactly equal remainders are resolved
/// by ascending original index, so the output is fully deterministic.
///
/// All-zero weights have no defined quota; the budget is then split evenly,
/// with the same largest-remainder pass run over uniform weights.
pub fn largest_remainder(
    weights: ArrayView1<f64>,
    total: u32,
) -> Result<Vec<u32>, ApportionError> {
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() {
            return Err(ApportionError::NonFiniteWeight { index, value });
        }
        if value < 0.0 {
            return Err(ApportionError::NegativeWeight { index, value });
        }
    }
    if weights.is_empty() {
        if total > 0 {
            return Err(ApportionError::EmptyWeights { total });
        }
        return Ok(Vec::new());
    }
    if total == 0 {
        return Ok(vec![0; weights.len()]);
    }

    let sum: f64 = weights.sum();
    if sum == 0.0 {
        let uniform = Array1::ones(weights.len());
        return largest_remainder(uniform.view(), total);
    }

    let quota = sum / f64::from(total);
    let mut allocation: Vec<u32> = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, f64)> = Vec::with_capacity(weights.len());
    for (index, &weight) in weights.iter().enumerate() {
        let exact = weight / quota;
        let floored = exact.floor();
        allocation.push(floored as u32);
        remainders.push((index, exact - floored));
    }

    // Stable sort: equal remainders keep ascending source order.
    remainders.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let assigned: u32 = allocation.iter().sum();
    let leftover = total.saturating_sub(assigned) as usize;
    for &(index, _) in remainders.iter().take(leftover) {
        allocation[index] += 1;
    }

    Ok(allocation)
}

/// Reorders `items` so that magnitudes alternate around the sequence instead
/// of decreasing monotonically: the global maximum comes first, then the
/// descending even ranks, then the odd ranks reversed. Laid out around a
/// circle this interleaves large and small entries rather than bunching the
/// dominant ones together.
///
/// For distinct values `[1, 2, 3, 4, 5]` the output order is `[5, 3, 1, 2, 4]`.
pub fn alternate_sort<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    let mut sorted = items;
    sorted.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));

    let (front, back): (Vec<T>, Vec<T>) =
        sorted
            .into_iter()
            .enumerate()
            .partition_map(|(rank, item)| {
                if rank % 2 == 0 {
                    Either::Left(item)
                } else {
                    Either::Right(item)
                }
            });

    front.into_iter().chain(back.into_iter().rev()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn coefficients_two_one_across_ten_lobes() {
        // Locked regression fixture: quota 0.3, floors [6, 3], one leftover
        // unit to the larger remainder.
        let got = largest_remainder(array![2.0, 1.0].view(), 10).unwrap();
        assert_eq!(got, vec![7, 3]);
    }

    #[test]
    fn allocation_always_sums_to_total() {
        let cases: Vec<(Array1<f64>, u32)> = vec![
            (array![1.0, 1.0, 1.0], 100),
            (array![0.3742, 0.6012, 0.2777, 0.6457, 0.1458], 10),
            (array![5.0], 7),
            (array![0.001, 1000.0], 13),
            (array![2.5, 2.5, 2.5, 2.5], 9),
        ];
        for (weights, total) in cases {
            let allocation = largest_remainder(weights.view(), total).unwrap();
            assert_eq!(allocation.iter().sum::<u32>(), total, "weights {weights}");
        }
    }

    #[test]
    fn allocation_stays_within_one_of_exact_quota() {
        let weights = array![0.11, 0.47, 3.0, 1.9, 0.02];
        let total = 37;
        let sum: f64 = weights.sum();
        let allocation = largest_remainder(weights.view(), total).unwrap();
        for (a, &w) in allocation.iter().zip(weights.iter()) {
            let exact = f64::from(total) * w / sum;
            assert!((f64::from(*a) - exact).abs() < 1.0);
        }
    }

    #[test]
    fn identical_inputs_yield_identical_outputs() {
        let weights = array![1.7, 2.9, 0.4, 0.4, 8.1];
        let first = largest_remainder(weights.view(), 23).unwrap();
        for _ in 0..10 {
            assert_eq!(largest_remainder(weights.view(), 23).unwrap(), first);
        }
    }

    #[test]
    fn equal_remainders_break_ties_by_source_index() {
        // Quota 0.75: every weight has remainder 1/3, one leftover unit.
        let got = largest_remainder(array![1.0, 1.0, 1.0].view(), 4).unwrap();
        assert_eq!(got, vec![2, 1, 1]);
    }

    #[test]
    fn all_zero_weights_split_evenly() {
        let got = largest_remainder(array![0.0, 0.0, 0.0].view(), 10).unwrap();
        assert_eq!(got, vec![4, 3, 3]);
    }

    #[test]
    fn zero_total_allocates_nothing() {
        let got = largest_remainder(array![3.0, 1.0].view(), 0).unwrap();
        assert_eq!(got, vec![0, 0]);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = largest_remainder(array![1.0, -0.5].view(), 10).unwrap_err();
        assert_eq!(
            err,
            ApportionError::NegativeWeight {
                index: 1,
                value: -0.5
            }
        );
    }

    #[test]
    fn empty_weights_with_positive_total_are_rejected() {
        let weights: Array1<f64> = array![];
        let err = largest_remainder(weights.view(), 5).unwrap_err();
        assert_eq!(err, ApportionError::EmptyWeights { total: 5 });
    }

    #[test]
    fn alternate_sort_interleaves_large_and_small() {
        let got = alternate_sort(vec![1.0, 2.0, 3.0, 4.0, 5.0], |v| *v);
        assert_eq!(got, vec![5.0, 3.0, 1.0, 2.0, 4.0]);
    }

    #[test]
    fn alternate_sort_puts_global_max_first() {
        let got = alternate_sort(vec![0.2, 9.0, 4.5, 7.1], |v| *v);
        assert_eq!(got[0], 9.0);
    }

    #[test]
    fn alternate_sort_handles_tiny_inputs() {
        assert_eq!(alternate_sort(Vec::<f64>::new(), |v| *v), Vec::<f64>::new());
        assert_eq!(alternate_sort(vec![3.0], |v| *v), vec![3.0]);
        assert_eq!(alternate_sort(vec![1.0, 2.0], |v| *v), vec![2.0, 1.0]);
    }
}
