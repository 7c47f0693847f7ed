use crate::error::{MindError, Result};
use crate::models::*;

pub fn validate_behavior_record(record: &BehaviorRecord) -> Result<()> {
    if record.candidates.len() != record.labels.len() {
        return Err(MindError::InvalidInput(format!(
            "impression {} has {} candidates but {} labels",
            record.impression_id,
            record.candidates.len(),
            record.labels.len()
        )));
    }
    Ok(())
}

pub fn validate_cutoff(k: usize) -> Result<()> {
    if k == 0 {
        return Err(MindError::InvalidInput("cutoff k must be greater than 0".to_string()));
    }
    Ok(())
}

/// Checks that scores line up with the candidate list they were produced for.
pub fn validate_scores(model: &str, candidates: &[String], scores: &[f32]) -> Result<()> {
    if candidates.len() != scores.len() {
        return Err(MindError::InvalidInput(format!(
            "model '{}' returned {} scores for {} candidates",
            model,
            scores.len(),
            candidates.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_behavior_record() {
        let mut record = BehaviorRecord {
            impression_id: "7".to_string(),
            user_id: "U7".to_string(),
            time: String::new(),
            history: vec![],
            candidates: vec!["N1".to_string()],
            labels: vec![1],
        };
        assert!(validate_behavior_record(&record).is_ok());

        record.labels.push(0);
        let err = validate_behavior_record(&record).unwrap_err();
        assert!(err.to_string().contains("impression 7"));
    }

    #[test]
    fn test_validate_cutoff() {
        assert!(validate_cutoff(1).is_ok());
        assert!(validate_cutoff(0).is_err());
    }

    #[test]
    fn test_validate_scores() {
        let candidates = vec!["N1".to_string(), "N2".to_string()];
        assert!(validate_scores("popular", &candidates, &[1.0, 0.0]).is_ok());
        assert!(validate_scores("popular", &candidates, &[1.0]).is_err());
    }
}
