use crate::algorithms::{create_recommender, Recommender, RecommenderKind};
use crate::config::RecommenderConfig;
use crate::dataset::SplitStore;
use crate::error::Result;
use crate::models::BehaviorRecord;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model: String,
    pub split: String,
    pub impressions: usize,
    pub interactions: usize,
    pub clicks: i64,
    pub elapsed_ms: u128,
}

/// Fits baseline recommenders on cached splits.
pub struct TrainingService {
    store: SplitStore,
    config: RecommenderConfig,
}

impl TrainingService {
    pub fn new(store: SplitStore, config: RecommenderConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &SplitStore {
        &self.store
    }

    pub fn train(&self, kind: RecommenderKind, split: &str) -> Result<(Box<dyn Recommender>, TrainingSummary)> {
        let tables = self.store.load(split)?;
        let mut recommender = create_recommender(kind, &self.config);
        let summary = fit_recommender(recommender.as_mut(), split, &tables.behaviors)?;
        Ok((recommender, summary))
    }
}

pub fn fit_recommender(
    recommender: &mut dyn Recommender,
    split: &str,
    behaviors: &[BehaviorRecord],
) -> Result<TrainingSummary> {
    let start = Instant::now();
    recommender.fit(behaviors)?;

    let summary = TrainingSummary {
        model: recommender.name().to_string(),
        split: split.to_string(),
        impressions: behaviors.len(),
        interactions: behaviors.iter().map(|b| b.candidates.len()).sum(),
        clicks: behaviors.iter().map(BehaviorRecord::clicks).sum(),
        elapsed_ms: start.elapsed().as_millis(),
    };

    info!(
        "Trained '{}' on split '{}': {} impressions, {} interactions, {} clicks in {}ms",
        summary.model, summary.split, summary.impressions, summary.interactions, summary.clicks, summary.elapsed_ms
    );
    Ok(summary)
}
