//! The one scoring formula every figure in a breakdown is derived from.
//!
//! The best-ranked copy earns the bucket's `maxPoints`, minus 20% of it for
//! each rank step above 1. Every further copy adds
//! `additionalPoints * diminishingFactor^(i - 1)` regardless of its own rank,
//! so dupes of different weapons in one bucket share a single decay series.

use crate::catalog::keys::TOP_PICK_RANK_DECAY;
use crate::catalog::types::Bucket;

/// A bucket's score split into its two sources.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BucketScore {
    /// Qualifying copies scored, whether or not they earned points.
    pub copies: usize,
    pub top_points: f64,
    pub additional_count: usize,
    pub additional_points: f64,
}

impl BucketScore {
    pub fn total(&self) -> f64 {
        self.top_points + self.additional_points
    }
}

/// Points for the best copy in a bucket. Zero from rank 6 onwards.
pub fn top_pick_points(bucket: &Bucket, rank: u32) -> f64 {
    let steps = f64::from(rank.saturating_sub(1));
    let max_points = bucket.max_points();
    (max_points - TOP_PICK_RANK_DECAY * steps * max_points).max(0.0)
}

/// Bonus for the `nth` additional copy, counting from 1.
pub fn additional_copy_points(bucket: &Bucket, nth: usize) -> f64 {
    let exponent = i32::try_from(nth.saturating_sub(1)).unwrap_or(i32::MAX);
    (bucket.additional_points() * bucket.diminishing_factor().powi(exponent)).max(0.0)
}

/// Score a bucket from the ranks of its qualifying copies, in any order.
pub fn score_bucket(bucket: &Bucket, ranks: impl IntoIterator<Item = u32>) -> BucketScore {
    let mut ranks: Vec<u32> = ranks.into_iter().collect();
    ranks.sort_unstable();

    let Some((&top_rank, rest)) = ranks.split_first() else {
        return BucketScore::default();
    };

    BucketScore {
        copies: ranks.len(),
        top_points: top_pick_points(bucket, top_rank),
        additional_count: rest.len(),
        additional_points: (1..=rest.len())
            .map(|nth| additional_copy_points(bucket, nth))
            .sum(),
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use super::*;

    fn bucket(max_points: f64, additional_points: f64, diminishing_factor: f64) -> Bucket {
        Bucket::builder()
            .name("Orb Generation")
            .max_points(max_points)
            .additional_points(additional_points)
            .diminishing_factor(diminishing_factor)
            .build()
    }

    #[test]
    fn empty_bucket_scores_zero() {
        for factor in [0.1, 0.5, 1.0] {
            let score = score_bucket(&bucket(10.0, 1.0, factor), []);
            assert_eq!(score.total(), 0.0);
            assert_eq!(score.copies, 0);
        }
    }

    #[test]
    fn best_rank_plus_one_dupe() {
        let score = score_bucket(&bucket(10.0, 1.0, 0.5), [3, 1]);
        assert_relative_eq!(score.top_points, 10.0);
        assert_relative_eq!(score.additional_points, 1.0);
        assert_relative_eq!(score.total(), 11.0);
        assert_eq!(score.additional_count, 1);
        assert_eq!(score.copies, 2);
    }

    #[test]
    fn single_copy_loses_a_fifth_per_rank() {
        let score = score_bucket(&bucket(10.0, 1.0, 0.5), [3]);
        assert_relative_eq!(score.total(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn worthless_top_copy_still_counts_as_a_copy() {
        let score = score_bucket(&bucket(10.0, 1.0, 0.5), [6]);
        assert_eq!(score.total(), 0.0);
        assert_eq!(score.copies, 1);
        assert_eq!(score.additional_count, 0);

        let score = score_bucket(&bucket(10.0, 1.0, 0.5), [9, 7]);
        assert_eq!(score.copies, 2);
        assert_eq!(score.additional_count, 1);
    }

    #[test]
    fn top_pick_is_non_increasing_and_hits_zero_at_rank_six() {
        for max_points in [0.5, 1.0, 7.0, 10.0] {
            let bucket = bucket(max_points, 0.1, 0.5);
            let mut previous = f64::INFINITY;
            for rank in 1..=12 {
                let points = top_pick_points(&bucket, rank);
                assert!(points <= previous);
                assert!(points >= 0.0);
                previous = points;
            }
            for rank in 6..=12 {
                assert_eq!(top_pick_points(&bucket, rank), 0.0);
            }
        }
    }

    #[test]
    fn dupe_series_matches_geometric_sum() {
        for factor in [0.25, 0.5, 0.9] {
            let bucket = bucket(10.0, 1.0, factor);
            for extra in 0..=10 {
                let ranks = std::iter::repeat_n(1, extra + 1);
                let score = score_bucket(&bucket, ranks);

                let mut direct = 0.0;
                for nth in 1..=extra {
                    direct += 1.0 * factor.powi(nth as i32 - 1);
                }
                let closed = 1.0 * (1.0 - factor.powi(extra as i32)) / (1.0 - factor);

                assert_relative_eq!(score.additional_points, direct, epsilon = 1e-12);
                assert_relative_eq!(score.additional_points, closed, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn adding_a_copy_never_lowers_the_score() {
        for factor in [0.1, 0.5, 1.0] {
            let bucket = bucket(10.0, 1.0, factor);
            let mut ranks = vec![4];
            for new_rank in [7, 2, 2, 9, 1, 5] {
                let before = score_bucket(&bucket, ranks.iter().copied()).total();
                ranks.push(new_rank);
                let after = score_bucket(&bucket, ranks.iter().copied()).total();
                assert!(after >= before, "{after} < {before} after adding rank {new_rank}");
            }
        }
    }

    #[test]
    fn dupe_bonus_ignores_the_dupes_own_rank() {
        let bucket = bucket(10.0, 1.0, 0.5);
        let near = score_bucket(&bucket, [1, 2]);
        let far = score_bucket(&bucket, [1, 40]);
        assert_eq!(near, far);
    }
}
