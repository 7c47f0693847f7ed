use crate::algorithms::Recommender;
use crate::config::EvaluationConfig;
use crate::error::{MindError, Result};
use crate::models::{BehaviorRecord, RankingInput};
use crate::utils::metrics::MetricsCalculator;
use crate::utils::validation::{validate_cutoff, validate_scores};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model: String,
    pub split: String,
    pub k: usize,
    pub impressions: usize,
    pub impressions_without_clicks: usize,
    pub ndcg: f64,
    pub mrr: f64,
    pub recall: f64,
    pub evaluated_at: DateTime<Utc>,
}

pub struct Evaluator {
    calculator: MetricsCalculator,
    pool: rayon::ThreadPool,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Result<Self> {
        validate_cutoff(config.k)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| MindError::InvalidConfig(format!("failed to build worker pool: {}", e)))?;

        Ok(Self {
            calculator: MetricsCalculator::new(config.k),
            pool,
        })
    }

    pub fn k(&self) -> usize {
        self.calculator.k()
    }

    /// Scores each impression with `recommender`, then averages the metrics.
    ///
    /// Scoring is sequential because recommenders may carry generator state;
    /// the per-impression metric computation runs on the worker pool. Every
    /// impression contributes to the mean, including ones without clicks.
    pub fn evaluate(
        &self,
        recommender: &mut dyn Recommender,
        split: &str,
        behaviors: &[BehaviorRecord],
    ) -> Result<EvaluationReport> {
        let mut inputs = Vec::with_capacity(behaviors.len());
        for behavior in behaviors {
            let scores = recommender.score(&behavior.user_id, &behavior.candidates)?;
            validate_scores(recommender.name(), &behavior.candidates, &scores)?;
            inputs.push(RankingInput::new(
                behavior.labels.clone(),
                scores.into_iter().map(f64::from).collect(),
            )?);
        }
        debug!("Scored {} impressions with '{}'", inputs.len(), recommender.name());

        let metrics = self.pool.install(|| self.calculator.calculate_mean_metrics(&inputs));

        let report = EvaluationReport {
            model: recommender.name().to_string(),
            split: split.to_string(),
            k: self.k(),
            impressions: behaviors.len(),
            impressions_without_clicks: behaviors.iter().filter(|b| b.clicked().next().is_none()).count(),
            ndcg: metrics.ndcg_at_k,
            mrr: metrics.mrr_at_k,
            recall: metrics.recall_at_k,
            evaluated_at: Utc::now(),
        };

        info!(
            "Evaluated '{}' on '{}' ({} impressions): NDCG@{}={:.4} MRR@{}={:.4} Recall@{}={:.4}",
            report.model, report.split, report.impressions, report.k, report.ndcg, report.k, report.mrr, report.k, report.recall
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{PopularityRecommender, RandomRecommender};

    fn behavior(id: &str, candidates: &[&str], labels: &[i32]) -> BehaviorRecord {
        BehaviorRecord {
            impression_id: id.to_string(),
            user_id: format!("U{}", id),
            time: String::new(),
            history: vec![],
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            labels: labels.to_vec(),
        }
    }

    fn evaluator(k: usize) -> Evaluator {
        Evaluator::new(&EvaluationConfig {
            k,
            split: "test".to_string(),
            workers: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_zero_cutoff() {
        let config = EvaluationConfig {
            k: 0,
            ..EvaluationConfig::default()
        };
        assert!(Evaluator::new(&config).is_err());
    }

    #[test]
    fn test_popularity_evaluation() {
        let train = vec![
            behavior("1", &["N1", "N2"], &[1, 0]),
            behavior("2", &["N1", "N3"], &[1, 1]),
        ];
        let test = vec![
            behavior("3", &["N3", "N1", "N4"], &[0, 1, 0]),
            behavior("4", &["N2", "N4"], &[0, 0]),
        ];

        let mut model = PopularityRecommender::new(None);
        model.fit(&train).unwrap();
        let report = evaluator(1).evaluate(&mut model, "test", &test).unwrap();

        assert_eq!(report.model, "popular");
        assert_eq!(report.impressions, 2);
        assert_eq!(report.impressions_without_clicks, 1);
        assert!((report.mrr - 0.5).abs() < 1e-12);
        assert!((report.ndcg - 0.5).abs() < 1e-12);
        assert!((report.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unfitted_model_fails() {
        let mut model = PopularityRecommender::new(None);
        let test = vec![behavior("1", &["N1"], &[1])];
        let err = evaluator(5).evaluate(&mut model, "test", &test).unwrap_err();
        assert!(matches!(err, MindError::NotFitted(_)));
    }

    #[test]
    fn test_random_evaluation_is_bounded() {
        let test: Vec<BehaviorRecord> = (0..50)
            .map(|i| behavior(&i.to_string(), &["N1", "N2", "N3", "N4"], &[0, 1, 0, 0]))
            .collect();
        let mut model = RandomRecommender::new(3);
        let report = evaluator(2).evaluate(&mut model, "test", &test).unwrap();

        assert!((0.0..=1.0).contains(&report.ndcg));
        assert!((0.0..=1.0).contains(&report.mrr));
        assert!((0.0..=1.0).contains(&report.recall));
    }
}
