//! MIND split loading and the processed two-table cache.
//!
//! Raw splits are parsed once by [`SplitStore::build`] and written as
//! `{split}_news.csv` / `{split}_behaviors.csv`; later runs call
//! [`SplitStore::load`]. The list-valued behavior columns are stored as JSON
//! arrays inside the CSV cells.

pub mod expansion;
pub mod parser;
pub mod stats;

use crate::config::DataConfig;
use crate::error::{MindError, Result};
use crate::models::*;
use crate::utils::validation::validate_behavior_record;
use csv::StringRecord;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CANONICAL_NEWS_COLUMNS: [&str; 5] = ["news_id", "category", "subcategory", "title", "abstract"];

pub const CANONICAL_BEHAVIORS_COLUMNS: [&str; 6] =
    ["impression_id", "user_id", "time", "history", "candidates", "labels"];

#[derive(Debug, Clone)]
pub struct SplitStore {
    config: DataConfig,
}

impl SplitStore {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn split_names(&self) -> Vec<String> {
        self.config.split_names()
    }

    fn check_split(&self, split: &str) -> Result<()> {
        self.config.split_dir(split).map(|_| ())
    }

    /// Parses the raw files of `split` and writes the processed cache.
    pub fn build(&self, split: &str) -> Result<SplitTables> {
        let split_dir = self.config.split_dir(split)?;
        std::fs::create_dir_all(&self.config.processed_dir)
            .map_err(|e| MindError::from_io(&self.config.processed_dir, e))?;

        let news = parser::read_news(&split_dir.join("news.tsv"))?;
        let (behaviors, report) = parser::read_behaviors(&split_dir.join("behaviors.tsv"))?;

        if report.malformed_tokens() > 0 {
            warn!(
                "Split '{}': {} impression tokens without a label separator, {} with an unparseable label (kept with label 0)",
                split, report.missing_separator_tokens, report.invalid_label_tokens
            );
        }

        if report.short_rows > 0 {
            warn!("Split '{}': {} behavior rows with missing columns read as blank", split, report.short_rows);
        }

        let news_out = self.config.processed_news_path(split);
        let behaviors_out = self.config.processed_behaviors_path(split);
        write_news(&news_out, &news)?;
        write_behaviors(&behaviors_out, &behaviors)?;

        info!(
            "Built split '{}': {} news, {} impressions ({} cold start) -> {}",
            split,
            news.len(),
            behaviors.len(),
            report.cold_start_rows,
            self.config.processed_dir.display()
        );

        Ok(SplitTables::new(news, behaviors))
    }

    /// Builds every configured split in name order.
    pub fn build_all(&self) -> Result<Vec<(String, SplitTables)>> {
        self.split_names()
            .into_iter()
            .map(|split| {
                let tables = self.build(&split)?;
                Ok((split, tables))
            })
            .collect()
    }

    /// Reads a previously built split from the processed cache.
    pub fn load(&self, split: &str) -> Result<SplitTables> {
        self.check_split(split)?;

        let news = read_news_table(&self.config.processed_news_path(split))?;
        let behaviors = read_behaviors_table(&self.config.processed_behaviors_path(split))?;

        info!(
            "Loaded split '{}': {} news, {} impressions",
            split,
            news.len(),
            behaviors.len()
        );
        Ok(SplitTables::new(news, behaviors))
    }
}

fn write_news(path: &Path, news: &[NewsRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CANONICAL_NEWS_COLUMNS)?;
    for record in news {
        writer.write_record([
            &record.news_id,
            &record.category,
            &record.subcategory,
            &record.title,
            &record.abstract_text,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_behaviors(path: &Path, behaviors: &[BehaviorRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CANONICAL_BEHAVIORS_COLUMNS)?;
    for record in behaviors {
        writer.write_record([
            record.impression_id.clone(),
            record.user_id.clone(),
            record.time.clone(),
            serde_json::to_string(&record.history)?,
            serde_json::to_string(&record.candidates)?,
            serde_json::to_string(&record.labels)?,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Header-addressed view over a cache table; absent cells read as "".
struct CacheTable {
    path: PathBuf,
    positions: Vec<usize>,
    reader: csv::Reader<File>,
}

impl CacheTable {
    fn open(path: &Path, columns: &[&str]) -> Result<Self> {
        let file = File::open(path).map_err(|e| MindError::from_io(path, e))?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader.headers()?.clone();

        let positions = columns
            .iter()
            .map(|column| {
                headers.iter().position(|h| h == *column).ok_or_else(|| MindError::Decode {
                    path: path.to_path_buf(),
                    row: 0,
                    message: format!("missing column '{}'", column),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            path: path.to_path_buf(),
            positions,
            reader,
        })
    }

    fn cell<'r>(&self, record: &'r StringRecord, column: usize) -> &'r str {
        record.get(self.positions[column]).unwrap_or_default()
    }
}

/// Decodes a JSON list cell. Text that does not open with `[` is an empty list.
pub fn decode_list<T: DeserializeOwned>(text: &str) -> std::result::Result<Vec<T>, serde_json::Error> {
    if text.starts_with('[') {
        serde_json::from_str(text)
    } else {
        Ok(Vec::new())
    }
}

fn read_news_table(path: &Path) -> Result<Vec<NewsRecord>> {
    let mut table = CacheTable::open(path, &CANONICAL_NEWS_COLUMNS)?;
    let mut news = Vec::new();
    let mut record = StringRecord::new();
    while table.reader.read_record(&mut record)? {
        news.push(NewsRecord {
            news_id: table.cell(&record, 0).to_string(),
            category: table.cell(&record, 1).to_string(),
            subcategory: table.cell(&record, 2).to_string(),
            title: table.cell(&record, 3).to_string(),
            abstract_text: table.cell(&record, 4).to_string(),
        });
    }
    Ok(news)
}

fn read_behaviors_table(path: &Path) -> Result<Vec<BehaviorRecord>> {
    let mut table = CacheTable::open(path, &CANONICAL_BEHAVIORS_COLUMNS)?;
    let mut behaviors = Vec::new();
    let mut record = StringRecord::new();
    let mut row = 0;
    while table.reader.read_record(&mut record)? {
        row += 1;
        let decode_error = |column: &str, e: serde_json::Error| MindError::Decode {
            path: table.path.clone(),
            row,
            message: format!("column '{}': {}", column, e),
        };

        let behavior = BehaviorRecord {
            impression_id: table.cell(&record, 0).to_string(),
            user_id: table.cell(&record, 1).to_string(),
            time: table.cell(&record, 2).to_string(),
            history: decode_list(table.cell(&record, 3)).map_err(|e| decode_error("history", e))?,
            candidates: decode_list(table.cell(&record, 4)).map_err(|e| decode_error("candidates", e))?,
            labels: decode_list(table.cell(&record, 5)).map_err(|e| decode_error("labels", e))?,
        };
        validate_behavior_record(&behavior).map_err(|e| MindError::Decode {
            path: table.path.clone(),
            row,
            message: e.to_string(),
        })?;
        behaviors.push(behavior);
    }
    Ok(behaviors)
}
