//! Descriptive statistics over a behaviors table.

use super::expansion::{clicks_per_impression, iter_interactions};
use crate::models::BehaviorRecord;
use crate::utils::Summary;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub impressions: usize,
    pub users: usize,
    pub empty_user_ids: usize,
    pub empty_timestamps: usize,
    pub cold_start_impressions: usize,
    pub impressions_per_user: Summary,
    pub history_length: Summary,
    pub candidate_samples: usize,
    pub total_clicks: i64,
    pub click_through_rate: f64,
    /// Fraction of candidate samples carrying each label value
    pub label_distribution: BTreeMap<i32, f64>,
    pub clicks_per_impression: Summary,
}

impl DatasetStats {
    pub fn compute(behaviors: &[BehaviorRecord]) -> Self {
        let mut per_user: HashMap<&str, usize> = HashMap::new();
        for behavior in behaviors {
            *per_user.entry(behavior.user_id.as_str()).or_insert(0) += 1;
        }

        let mut label_counts: BTreeMap<i32, usize> = BTreeMap::new();
        let mut candidate_samples = 0;
        let mut total_clicks = 0i64;
        for interaction in iter_interactions(behaviors) {
            candidate_samples += 1;
            total_clicks += interaction.label as i64;
            *label_counts.entry(interaction.label).or_insert(0) += 1;
        }

        let click_through_rate = if candidate_samples > 0 {
            total_clicks as f64 / candidate_samples as f64
        } else {
            0.0
        };
        let label_distribution = label_counts
            .into_iter()
            .map(|(label, count)| (label, count as f64 / candidate_samples as f64))
            .collect();

        Self {
            impressions: behaviors.len(),
            users: per_user.len(),
            empty_user_ids: behaviors.iter().filter(|b| b.user_id.is_empty()).count(),
            empty_timestamps: behaviors.iter().filter(|b| b.time.is_empty()).count(),
            cold_start_impressions: behaviors.iter().filter(|b| b.is_cold_start()).count(),
            impressions_per_user: Summary::from_values(per_user.values().map(|&n| n as f64)),
            history_length: Summary::from_values(behaviors.iter().map(|b| b.history.len() as f64)),
            candidate_samples,
            total_clicks,
            click_through_rate,
            label_distribution,
            clicks_per_impression: Summary::from_values(
                clicks_per_impression(behaviors).into_iter().map(|c| c as f64),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn behavior(id: &str, user: &str, history: &[&str], labels: &[i32]) -> BehaviorRecord {
        BehaviorRecord {
            impression_id: id.to_string(),
            user_id: user.to_string(),
            time: "11/13/2019 8:36:57 AM".to_string(),
            history: history.iter().map(|s| s.to_string()).collect(),
            candidates: (0..labels.len()).map(|i| format!("N{}", i)).collect(),
            labels: labels.to_vec(),
        }
    }

    #[test]
    fn test_compute() {
        let behaviors = vec![
            behavior("1", "U1", &["N10", "N11"], &[1, 0, 0, 0]),
            behavior("2", "U1", &[], &[0, 1, 1, 0]),
            behavior("3", "U2", &["N12"], &[0, 0]),
        ];
        let stats = DatasetStats::compute(&behaviors);

        assert_eq!(stats.impressions, 3);
        assert_eq!(stats.users, 2);
        assert_eq!(stats.cold_start_impressions, 1);
        assert_eq!(stats.empty_user_ids, 0);
        assert_eq!(stats.candidate_samples, 10);
        assert_eq!(stats.total_clicks, 3);
        assert!((stats.click_through_rate - 0.3).abs() < 1e-12);
        assert!((stats.label_distribution[&0] - 0.7).abs() < 1e-12);
        assert!((stats.label_distribution[&1] - 0.3).abs() < 1e-12);
        assert_eq!(stats.impressions_per_user.max, 2.0);
        assert_eq!(stats.history_length.median, 1.0);
        assert!((stats.clicks_per_impression.mean - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compute_empty() {
        let stats = DatasetStats::compute(&[]);
        assert_eq!(stats.impressions, 0);
        assert_eq!(stats.click_through_rate, 0.0);
        assert!(stats.label_distribution.is_empty());
    }
}
