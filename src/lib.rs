//! MIND news-recommendation benchmark tooling: raw split parsing and caching,
//! candidate expansion, baseline recommenders and top-k ranking metrics.

pub mod algorithms;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{MindError, Result};
pub use models::*;

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber; `RUST_LOG` wins over `default_level` when set.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
