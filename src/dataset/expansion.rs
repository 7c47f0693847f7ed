use crate::models::{BehaviorRecord, ExpandedInteraction};
use std::collections::HashMap;

/// Iterates `(impression, candidate)` pairs in impression then candidate order.
pub fn iter_interactions(behaviors: &[BehaviorRecord]) -> impl Iterator<Item = ExpandedInteraction> + '_ {
    behaviors.iter().flat_map(|behavior| {
        behavior
            .candidates
            .iter()
            .zip(behavior.labels.iter())
            .map(move |(news_id, &label)| ExpandedInteraction {
                impression_id: behavior.impression_id.clone(),
                user_id: behavior.user_id.clone(),
                news_id: news_id.clone(),
                label,
            })
    })
}

pub fn expand_interactions(behaviors: &[BehaviorRecord]) -> Vec<ExpandedInteraction> {
    iter_interactions(behaviors).collect()
}

/// Number of `label == 1` rows per news id.
pub fn click_counts(behaviors: &[BehaviorRecord]) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for interaction in iter_interactions(behaviors).filter(|i| i.label == 1) {
        *counts.entry(interaction.news_id).or_insert(0) += 1;
    }
    counts
}

/// Sum of labels for each impression, in impression order.
pub fn clicks_per_impression(behaviors: &[BehaviorRecord]) -> Vec<i64> {
    behaviors.iter().map(BehaviorRecord::clicks).collect()
}
