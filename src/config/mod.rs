use crate::error::{MindError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub evaluation: EvaluationConfig,
    pub recommender: RecommenderConfig,
}

/// Where raw MIND splits live and where the processed cache is written.
///
/// `splits` maps a logical split name (`train`, `test`) to the directory
/// under `raw_dir` holding that split's `news.tsv` and `behaviors.tsv`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub splits: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub k: usize,
    pub split: String,
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub random_seed: u64,
    pub popularity_top_k: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        let mut splits = BTreeMap::new();
        splits.insert("train".to_string(), "MINDsmall_train".to_string());
        splits.insert("test".to_string(), "MINDsmall_dev".to_string());

        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            splits,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            k: 10,
            split: "test".to_string(),
            workers: num_cpus::get(),
        }
    }
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            random_seed: 42,
            popularity_top_k: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            evaluation: EvaluationConfig::default(),
            recommender: RecommenderConfig::default(),
        }
    }
}

impl DataConfig {
    pub fn split_names(&self) -> Vec<String> {
        self.splits.keys().cloned().collect()
    }

    pub fn split_dir(&self, split: &str) -> Result<PathBuf> {
        match self.splits.get(split) {
            Some(dir) => Ok(self.raw_dir.join(dir)),
            None => Err(MindError::UnknownSplit {
                split: split.to_string(),
                valid: self.split_names(),
            }),
        }
    }

    pub fn processed_news_path(&self, split: &str) -> PathBuf {
        self.processed_dir.join(format!("{}_news.csv", split))
    }

    pub fn processed_behaviors_path(&self, split: &str) -> PathBuf {
        self.processed_dir.join(format!("{}_behaviors.csv", split))
    }
}

impl Config {
    /// Layers `path` and `MINDREC_*` environment variables over the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| MindError::InvalidConfig(e.to_string()))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("MINDREC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(|e| MindError::InvalidConfig(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| MindError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.splits.is_empty() {
            return Err(MindError::InvalidConfig("at least one split must be configured".to_string()));
        }
        if self.evaluation.k == 0 {
            return Err(MindError::InvalidConfig("evaluation.k must be greater than 0".to_string()));
        }
        if self.evaluation.workers == 0 {
            return Err(MindError::InvalidConfig("evaluation.workers must be greater than 0".to_string()));
        }
        Ok(())
    }
}
