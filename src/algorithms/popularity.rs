use super::Recommender;
use crate::dataset::expansion::click_counts;
use crate::error::{MindError, Result};
use crate::models::BehaviorRecord;
use std::collections::HashMap;
use tracing::info;

/// Scores a candidate by how often it was clicked in the training impressions.
#[derive(Debug, Clone, Default)]
pub struct PopularityRecommender {
    top_k: Option<usize>,
    popularity: Option<HashMap<String, u64>>,
}

impl PopularityRecommender {
    /// `top_k` keeps only the most clicked items; everything else scores 0.
    pub fn new(top_k: Option<usize>) -> Self {
        Self {
            top_k,
            popularity: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.popularity.is_some()
    }

    /// Highest click counts first, ties by news id.
    pub fn most_popular(&self, n: usize) -> Vec<(String, u64)> {
        match &self.popularity {
            Some(popularity) => {
                let mut ranked = rank_by_clicks(popularity.iter().map(|(id, &c)| (id.clone(), c)).collect());
                ranked.truncate(n);
                ranked
            }
            None => Vec::new(),
        }
    }
}

fn rank_by_clicks(mut counts: Vec<(String, u64)>) -> Vec<(String, u64)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

impl Recommender for PopularityRecommender {
    fn name(&self) -> &str {
        "popular"
    }

    fn fit(&mut self, behaviors: &[BehaviorRecord]) -> Result<()> {
        let counts = click_counts(behaviors);
        let clicked_items = counts.len();

        let popularity = match self.top_k {
            Some(top_k) => {
                let mut ranked = rank_by_clicks(counts.into_iter().collect());
                ranked.truncate(top_k);
                ranked.into_iter().collect()
            }
            None => counts,
        };

        info!(
            "Fitted popularity table: {} clicked items, {} kept",
            clicked_items,
            popularity.len()
        );
        self.popularity = Some(popularity);
        Ok(())
    }

    fn score(&mut self, _user_id: &str, candidates: &[String]) -> Result<Vec<f32>> {
        let popularity = self
            .popularity
            .as_ref()
            .ok_or_else(|| MindError::NotFitted(self.name().to_string()))?;

        Ok(candidates
            .iter()
            .map(|news_id| popularity.get(news_id).copied().unwrap_or(0) as f32)
            .collect())
    }
}
