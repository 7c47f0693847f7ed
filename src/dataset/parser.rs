//! Raw MIND TSV parsing.
//!
//! Malformed input is normalized rather than rejected: a blank history is an
//! empty sequence, an impression token without `-` is a bare news id with
//! label 0, and a label suffix that is not an integer becomes 0.

use crate::error::{MindError, Result};
use crate::models::{BehaviorRecord, NewsRecord};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

pub const NEWS_COLUMNS: [&str; 8] = [
    "news_id",
    "category",
    "subcategory",
    "title",
    "abstract",
    "url",
    "title_entities",
    "abstract_entities",
];

pub const BEHAVIORS_COLUMNS: [&str; 5] = ["impression_id", "user_id", "time", "history", "impressions"];

const LABEL_SEPARATOR: char = '-';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    MissingSeparator,
    InvalidLabel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpressionToken {
    pub news_id: String,
    pub label: i32,
    pub status: TokenStatus,
}

/// Counts of the leniency rules applied while parsing a behaviors file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub rows: usize,
    /// Rows with fewer than the five behaviors columns; missing fields read as blank.
    pub short_rows: usize,
    pub cold_start_rows: usize,
    pub missing_separator_tokens: usize,
    pub invalid_label_tokens: usize,
}

impl ParseReport {
    pub fn malformed_tokens(&self) -> usize {
        self.missing_separator_tokens + self.invalid_label_tokens
    }
}

/// `"N1 N2 "` -> `["N1", "N2"]`; blank input is a cold-start user.
pub fn parse_history(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

/// Splits one `news_id-label` token on its rightmost separator.
pub fn parse_impression_token(token: &str) -> ImpressionToken {
    match token.rsplit_once(LABEL_SEPARATOR) {
        Some((news_id, label)) => match label.parse::<i32>() {
            Ok(label) => ImpressionToken {
                news_id: news_id.to_string(),
                label,
                status: TokenStatus::Valid,
            },
            Err(_) => ImpressionToken {
                news_id: news_id.to_string(),
                label: 0,
                status: TokenStatus::InvalidLabel,
            },
        },
        None => ImpressionToken {
            news_id: token.to_string(),
            label: 0,
            status: TokenStatus::MissingSeparator,
        },
    }
}

/// `"N1-0 N2-1"` -> `(["N1", "N2"], [0, 1])`
pub fn parse_impressions(value: &str) -> (Vec<String>, Vec<i32>) {
    parse_impressions_with(value, &mut ParseReport::default())
}

fn parse_impressions_with(value: &str, report: &mut ParseReport) -> (Vec<String>, Vec<i32>) {
    let mut candidates = Vec::new();
    let mut labels = Vec::new();

    for token in value.split_whitespace() {
        let parsed = parse_impression_token(token);
        match parsed.status {
            TokenStatus::Valid => {}
            TokenStatus::MissingSeparator => report.missing_separator_tokens += 1,
            TokenStatus::InvalidLabel => report.invalid_label_tokens += 1,
        }
        candidates.push(parsed.news_id);
        labels.push(parsed.label);
    }

    (candidates, labels)
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or_default().to_string()
}

/// Maps a raw news row positionally; only the canonical five columns survive.
pub fn parse_news_record(record: &StringRecord) -> NewsRecord {
    NewsRecord {
        news_id: field(record, 0),
        category: field(record, 1),
        subcategory: field(record, 2),
        title: field(record, 3),
        abstract_text: field(record, 4),
    }
}

pub fn parse_behavior_record(record: &StringRecord) -> BehaviorRecord {
    parse_behavior_record_with(record, &mut ParseReport::default())
}

fn parse_behavior_record_with(record: &StringRecord, report: &mut ParseReport) -> BehaviorRecord {
    let history = parse_history(record.get(3).unwrap_or_default());
    let (candidates, labels) = parse_impressions_with(record.get(4).unwrap_or_default(), report);

    report.rows += 1;
    if record.len() < BEHAVIORS_COLUMNS.len() {
        report.short_rows += 1;
    }
    if history.is_empty() {
        report.cold_start_rows += 1;
    }

    BehaviorRecord {
        impression_id: field(record, 0),
        user_id: field(record, 1),
        time: field(record, 2),
        history,
        candidates,
        labels,
    }
}

/// Headerless, tab-separated, unquoted reader; short rows are allowed.
fn tsv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| MindError::from_io(path, e))?;
    Ok(csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(file))
}

pub fn read_news(path: &Path) -> Result<Vec<NewsRecord>> {
    let mut reader = tsv_reader(path)?;
    let mut news = Vec::new();
    let mut short_rows = 0;
    for record in reader.records() {
        let record = record?;
        if record.len() < NEWS_COLUMNS.len() {
            short_rows += 1;
        }
        news.push(parse_news_record(&record));
    }
    debug!(
        "Parsed {} news rows from {} ({} short rows)",
        news.len(),
        path.display(),
        short_rows
    );
    Ok(news)
}

pub fn read_behaviors(path: &Path) -> Result<(Vec<BehaviorRecord>, ParseReport)> {
    let mut reader = tsv_reader(path)?;
    let mut report = ParseReport::default();
    let mut behaviors = Vec::new();
    for record in reader.records() {
        behaviors.push(parse_behavior_record_with(&record?, &mut report));
    }
    debug!("Parsed {} behavior rows from {}", behaviors.len(), path.display());
    Ok((behaviors, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_history() {
        assert_eq!(parse_history("N1 N2 "), vec!["N1", "N2"]);
        assert!(parse_history("").is_empty());
        assert!(parse_history("   \t ").is_empty());
    }

    #[test]
    fn test_na_like_text_is_a_literal_id() {
        assert_eq!(parse_history("nan NA null"), vec!["nan", "NA", "null"]);
        let token = parse_impression_token("None-1");
        assert_eq!((token.news_id.as_str(), token.label), ("None", 1));
    }

    #[test]
    fn test_parse_impressions() {
        let (candidates, labels) = parse_impressions("N1-0 N2-1 ");
        assert_eq!(candidates, vec!["N1", "N2"]);
        assert_eq!(labels, vec![0, 1]);

        let (candidates, labels) = parse_impressions("  ");
        assert!(candidates.is_empty());
        assert!(labels.is_empty());
    }

    #[test]
    fn test_token_without_separator_is_kept() {
        let (candidates, labels) = parse_impressions("N1 N2-1");
        assert_eq!(candidates, vec!["N1", "N2"]);
        assert_eq!(labels, vec![0, 1]);
        assert_eq!(parse_impression_token("N1").status, TokenStatus::MissingSeparator);
    }

    #[test]
    fn test_rightmost_separator_and_bad_labels() {
        let token = parse_impression_token("N-12-1");
        assert_eq!(token.news_id, "N-12");
        assert_eq!(token.label, 1);

        let token = parse_impression_token("N5-x");
        assert_eq!((token.news_id.as_str(), token.label), ("N5", 0));
        assert_eq!(token.status, TokenStatus::InvalidLabel);

        let token = parse_impression_token("N6-");
        assert_eq!((token.news_id.as_str(), token.label), ("N6", 0));

        let token = parse_impression_token("N7-99999999999");
        assert_eq!(token.label, 0);
    }

    #[test]
    fn test_parse_behavior_record_pads_missing_fields() {
        let record = StringRecord::from(vec!["1", "U1", "11/15/2019 8:55:22 AM"]);
        let behavior = parse_behavior_record(&record);
        assert_eq!(behavior.impression_id, "1");
        assert!(behavior.history.is_empty());
        assert!(behavior.candidates.is_empty());
        assert_eq!(behavior.candidates.len(), behavior.labels.len());
    }

    #[test]
    fn test_parse_news_record_drops_extra_columns() {
        let record = StringRecord::from(vec![
            "N1", "sports", "football_nfl", "Title", "", "https://example.com", "[]", "[]",
        ]);
        let news = parse_news_record(&record);
        assert_eq!(news.news_id, "N1");
        assert_eq!(news.subcategory, "football_nfl");
        assert_eq!(news.abstract_text, "");
    }

    #[test]
    fn test_read_behaviors_reports_leniency() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\tU1\t11/15/2019 8:55:22 AM\tN9 N8\tN1-1 N2-0").unwrap();
        writeln!(file, "2\tU2\t11/15/2019 9:01:00 AM\t\tN3 N4-z \"N5\"-1").unwrap();

        let (behaviors, report) = read_behaviors(file.path()).unwrap();
        assert_eq!(behaviors.len(), 2);
        assert_eq!(behaviors[1].candidates, vec!["N3", "N4", "\"N5\""]);
        assert_eq!(behaviors[1].labels, vec![0, 0, 1]);
        assert_eq!(
            report,
            ParseReport {
                rows: 2,
                short_rows: 0,
                cold_start_rows: 1,
                missing_separator_tokens: 1,
                invalid_label_tokens: 1,
            }
        );
        assert_eq!(report.malformed_tokens(), 2);
    }

    #[test]
    fn test_short_rows_are_counted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1\tU1\t11/15/2019 8:55:22 AM").unwrap();
        writeln!(file, "2\tU2\t11/15/2019 9:01:00 AM\tN1\tN2-1").unwrap();

        let (behaviors, report) = read_behaviors(file.path()).unwrap();
        assert_eq!(behaviors.len(), 2);
        assert_eq!(report.rows, 2);
        assert_eq!(report.short_rows, 1);
        assert!(behaviors[0].candidates.is_empty());
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let err = read_news(Path::new("/nonexistent/news.tsv")).unwrap_err();
        assert!(matches!(err, MindError::NotFound { .. }));
    }
}
