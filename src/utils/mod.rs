use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod metrics;
pub mod validation;

/// Descending score order where NaN sorts last and `-0.0 == 0.0`.
fn descending(a: f64, b: f64) -> Ordering {
    let key = |x: f64| if x.is_nan() { f64::NEG_INFINITY } else { x + 0.0 };
    key(b).total_cmp(&key(a))
}

/// Candidate indices ordered by descending score.
///
/// The sort is stable, so tied scores keep their original candidate order.
pub fn rank_indices<S: Copy + Into<f64>>(scores: &[S]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a].into(), scores[b].into()));
    order
}

pub fn top_k_indices<S: Copy + Into<f64>>(scores: &[S], k: usize) -> Vec<usize> {
    let mut order = rank_indices(scores);
    order.truncate(k);
    order
}

/// Descriptive statistics over a numeric column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

impl Summary {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<f64>,
    {
        let mut values: Vec<f64> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Self::default();
        }

        values.sort_by(|a, b| a.total_cmp(b));
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        // sample standard deviation; reported as 0.0 for a single value
        let std = if count > 1 {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };
        let median = if count % 2 == 0 {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        } else {
            values[count / 2]
        };

        Self {
            count,
            mean,
            std,
            min: values[0],
            median,
            max: values[count - 1],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_indices() {
        let scores = vec![0.1f32, 0.5, 0.3, 0.9, 0.2];
        let top_2 = top_k_indices(&scores, 2);
        assert_eq!(top_2, vec![3, 1]);
    }

    #[test]
    fn test_rank_indices_ties_keep_candidate_order() {
        let scores = vec![0.5f64, 0.9, 0.5, 0.9, 0.1];
        assert_eq!(rank_indices(&scores), vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_rank_indices_nan_sorts_last() {
        let scores = vec![f64::NAN, 0.2, -1.0, f64::NAN, 0.0];
        assert_eq!(rank_indices(&scores), vec![1, 4, 2, 0, 3]);
    }

    #[test]
    fn test_rank_indices_signed_zero_ties() {
        let scores = vec![-0.0f64, 0.0];
        assert_eq!(rank_indices(&scores), vec![0, 1]);
    }

    #[test]
    fn test_summary() {
        let summary = Summary::from_values(vec![4u32, 1, 3, 2]);
        assert_eq!(summary.count, 4);
        assert!((summary.mean - 2.5).abs() < 1e-12);
        assert!((summary.median - 2.5).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert!((summary.std - 1.2909944487358056).abs() < 1e-12);

        let empty = Summary::from_values(Vec::<f64>::new());
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, 0.0);
    }
}
