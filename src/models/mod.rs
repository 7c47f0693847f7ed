use crate::error::{MindError, Result};
use serde::{Deserialize, Serialize};

/// Canonical article metadata; columns beyond these five are dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub news_id: String,
    pub category: String,
    pub subcategory: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// One impression log row.
///
/// `candidates` and `labels` are parallel: `labels[i]` is 1 when
/// `candidates[i]` was clicked. An empty `history` marks a cold-start user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub impression_id: String,
    pub user_id: String,
    pub time: String,
    pub history: Vec<String>,
    pub candidates: Vec<String>,
    pub labels: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandedInteraction {
    pub impression_id: String,
    pub user_id: String,
    pub news_id: String,
    pub label: i32,
}

/// Labels and scores for the candidates of a single impression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingInput {
    pub labels: Vec<i32>,
    pub scores: Vec<f64>,
}

/// The news and behaviors tables of one split.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitTables {
    pub news: Vec<NewsRecord>,
    pub behaviors: Vec<BehaviorRecord>,
}

impl BehaviorRecord {
    pub fn is_cold_start(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clicks(&self) -> i64 {
        self.labels.iter().map(|&l| l as i64).sum()
    }

    /// Candidates whose label is exactly 1.
    pub fn clicked(&self) -> impl Iterator<Item = &str> {
        self.candidates
            .iter()
            .zip(self.labels.iter())
            .filter(|(_, &label)| label == 1)
            .map(|(news_id, _)| news_id.as_str())
    }
}

impl RankingInput {
    pub fn new(labels: Vec<i32>, scores: Vec<f64>) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(MindError::InvalidInput(format!(
                "ranking input has {} labels but {} scores",
                labels.len(),
                scores.len()
            )));
        }
        Ok(Self { labels, scores })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl SplitTables {
    pub fn new(news: Vec<NewsRecord>, behaviors: Vec<BehaviorRecord>) -> Self {
        Self { news, behaviors }
    }
}
