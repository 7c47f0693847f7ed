//! Top-k ranking metrics for binary relevance labels.
//!
//! Every metric ranks candidates by descending score (ties keep candidate
//! order, see [`crate::utils::rank_indices`]), clamps `k` to the number of
//! candidates and returns 0.0 for empty input.
//!
//! DCG@k = Σ rel_i / log2(i + 1) for i = 1..k
//! NDCG@k = DCG@k / IDCG@k

use crate::models::RankingInput;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Labels reordered by descending score.
///
/// Label and score slices of unequal length are truncated to the shorter one.
pub fn ranked_labels<S: Copy + Into<f64>>(labels: &[i32], scores: &[S]) -> Vec<i32> {
    let n = labels.len().min(scores.len());
    crate::utils::rank_indices(&scores[..n])
        .into_iter()
        .map(|i| labels[i])
        .collect()
}

fn dcg(labels: &[i32]) -> f64 {
    labels
        .iter()
        .enumerate()
        .map(|(i, &rel)| rel as f64 / ((i + 2) as f64).log2())
        .sum()
}

pub fn ndcg_at_k<S: Copy + Into<f64>>(labels: &[i32], scores: &[S], k: usize) -> f64 {
    let ranked = ranked_labels(labels, scores);
    if ranked.is_empty() {
        return 0.0;
    }
    let k = k.min(ranked.len());

    let mut ideal = ranked.clone();
    ideal.sort_unstable_by(|a, b| b.cmp(a));

    let actual = dcg(&ranked[..k]);
    let ideal_dcg = dcg(&ideal[..k]);
    if ideal_dcg > 0.0 {
        actual / ideal_dcg
    } else {
        0.0
    }
}

pub fn mrr_at_k<S: Copy + Into<f64>>(labels: &[i32], scores: &[S], k: usize) -> f64 {
    let ranked = ranked_labels(labels, scores);
    if ranked.is_empty() {
        return 0.0;
    }
    let k = k.min(ranked.len());

    match ranked[..k].iter().position(|&label| label == 1) {
        Some(hit) => 1.0 / (hit + 1) as f64,
        None => 0.0,
    }
}

pub fn recall_at_k<S: Copy + Into<f64>>(labels: &[i32], scores: &[S], k: usize) -> f64 {
    let ranked = ranked_labels(labels, scores);
    if ranked.is_empty() {
        return 0.0;
    }
    let k = k.min(ranked.len());

    let relevant: i64 = ranked[..k].iter().map(|&l| l as i64).sum();
    let total_relevant: i64 = ranked.iter().map(|&l| l as i64).sum();
    if total_relevant > 0 {
        relevant as f64 / total_relevant as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingMetrics {
    pub ndcg_at_k: f64,
    pub mrr_at_k: f64,
    pub recall_at_k: f64,
}

#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    k: usize,
}

impl MetricsCalculator {
    pub fn new(k: usize) -> Self {
        Self { k }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn calculate_ndcg_at_k(&self, input: &RankingInput) -> f64 {
        ndcg_at_k(&input.labels, &input.scores, self.k)
    }

    pub fn calculate_mrr_at_k(&self, input: &RankingInput) -> f64 {
        mrr_at_k(&input.labels, &input.scores, self.k)
    }

    pub fn calculate_recall_at_k(&self, input: &RankingInput) -> f64 {
        recall_at_k(&input.labels, &input.scores, self.k)
    }

    pub fn calculate_all_metrics(&self, input: &RankingInput) -> RankingMetrics {
        RankingMetrics {
            ndcg_at_k: self.calculate_ndcg_at_k(input),
            mrr_at_k: self.calculate_mrr_at_k(input),
            recall_at_k: self.calculate_recall_at_k(input),
        }
    }

    /// Mean of each metric over independent impressions.
    ///
    /// Runs on the current rayon pool; the result does not depend on the
    /// order in which impressions are evaluated beyond float summation order.
    pub fn calculate_mean_metrics(&self, inputs: &[RankingInput]) -> RankingMetrics {
        if inputs.is_empty() {
            return RankingMetrics::default();
        }

        let per_impression: Vec<RankingMetrics> = inputs
            .par_iter()
            .map(|input| self.calculate_all_metrics(input))
            .collect();

        let n = per_impression.len() as f64;
        let total = per_impression.iter().fold(RankingMetrics::default(), |acc, m| RankingMetrics {
            ndcg_at_k: acc.ndcg_at_k + m.ndcg_at_k,
            mrr_at_k: acc.mrr_at_k + m.mrr_at_k,
            recall_at_k: acc.recall_at_k + m.recall_at_k,
        });

        RankingMetrics {
            ndcg_at_k: total.ndcg_at_k / n,
            mrr_at_k: total.mrr_at_k / n,
            recall_at_k: total.recall_at_k / n,
        }
    }
}
