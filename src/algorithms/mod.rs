pub mod popularity;
pub mod random;

pub use popularity::PopularityRecommender;
pub use random::RandomRecommender;

use crate::config::RecommenderConfig;
use crate::error::{MindError, Result};
use crate::models::BehaviorRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A candidate-ranking strategy evaluated against impression logs.
pub trait Recommender: Send {
    fn name(&self) -> &str;

    fn fit(&mut self, behaviors: &[BehaviorRecord]) -> Result<()>;

    /// One score per candidate, in candidate order.
    fn score(&mut self, user_id: &str, candidates: &[String]) -> Result<Vec<f32>>;

    /// Top-`k` candidates by descending score; ties keep candidate order.
    fn recommend(&mut self, user_id: &str, candidates: &[String], k: usize) -> Result<Vec<String>> {
        let scores = self.score(user_id, candidates)?;
        crate::utils::validation::validate_scores(self.name(), candidates, &scores)?;
        Ok(crate::utils::top_k_indices(&scores, k)
            .into_iter()
            .map(|i| candidates[i].clone())
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommenderKind {
    Random,
    Popular,
}

impl RecommenderKind {
    pub const ALL: [RecommenderKind; 2] = [RecommenderKind::Random, RecommenderKind::Popular];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommenderKind::Random => "random",
            RecommenderKind::Popular => "popular",
        }
    }
}

impl fmt::Display for RecommenderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommenderKind {
    type Err = MindError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(RecommenderKind::Random),
            "popular" | "popularity" => Ok(RecommenderKind::Popular),
            _ => Err(MindError::UnknownModel {
                name: s.to_string(),
                valid: Self::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            }),
        }
    }
}

pub fn create_recommender(kind: RecommenderKind, config: &RecommenderConfig) -> Box<dyn Recommender> {
    match kind {
        RecommenderKind::Random => Box::new(RandomRecommender::new(config.random_seed)),
        RecommenderKind::Popular => Box::new(PopularityRecommender::new(config.popularity_top_k)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("popular".parse::<RecommenderKind>().unwrap(), RecommenderKind::Popular);
        assert_eq!("Popularity".parse::<RecommenderKind>().unwrap(), RecommenderKind::Popular);
        assert_eq!("random".parse::<RecommenderKind>().unwrap(), RecommenderKind::Random);

        let err = "baseline".parse::<RecommenderKind>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("\"popular\""));
    }

    #[test]
    fn test_create_recommender() {
        let config = RecommenderConfig::default();
        assert_eq!(create_recommender(RecommenderKind::Random, &config).name(), "random");
        assert_eq!(create_recommender(RecommenderKind::Popular, &config).name(), "popular");
    }
}
