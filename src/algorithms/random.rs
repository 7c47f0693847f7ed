use super::Recommender;
use crate::error::Result;
use crate::models::BehaviorRecord;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random scores from a seeded generator; the lower bound for any baseline.
#[derive(Debug, Clone)]
pub struct RandomRecommender {
    rng: StdRng,
}

impl RandomRecommender {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomRecommender {
    fn default() -> Self {
        Self::new(42)
    }
}

impl Recommender for RandomRecommender {
    fn name(&self) -> &str {
        "random"
    }

    // Nothing to learn; scoring works with or without a prior fit.
    fn fit(&mut self, _behaviors: &[BehaviorRecord]) -> Result<()> {
        Ok(())
    }

    fn score(&mut self, _user_id: &str, candidates: &[String]) -> Result<Vec<f32>> {
        Ok((0..candidates.len()).map(|_| self.rng.gen::<f32>()).collect())
    }
}
