use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mindrec::algorithms::{create_recommender, PopularityRecommender, Recommender, RecommenderKind};
use mindrec::dataset::stats::DatasetStats;
use mindrec::dataset::SplitStore;
use mindrec::services::evaluation::Evaluator;
use mindrec::services::training::{fit_recommender, TrainingService};
use mindrec::{init_tracing, Config};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "MIND news recommender runner", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every configured raw split and write the processed cache
    Preprocess,
    /// Fit a baseline on the train split
    Train {
        #[arg(long)]
        model: String,
    },
    /// Fit on train, then score an evaluation split
    Eval {
        #[arg(long)]
        model: String,
        #[arg(long)]
        split: Option<String>,
        #[arg(long)]
        k: Option<usize>,
        /// Also write the JSON report here
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print descriptive statistics for a cached split
    Stats {
        #[arg(long, default_value = "train")]
        split: String,
    },
}

const TRAIN_SPLIT: &str = "train";

fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::from_file(path).with_context(|| format!("failed to load config {}", path.display()))
    } else {
        info!("Config file not found, using default configuration");
        Ok(Config::default())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = load_config(&args.config)?;
    let store = SplitStore::new(config.data.clone());

    match args.command {
        Command::Preprocess => {
            for (split, tables) in store.build_all().context("preprocessing failed")? {
                info!(
                    "Cached split '{}' ({} news, {} impressions)",
                    split,
                    tables.news.len(),
                    tables.behaviors.len()
                );
            }
        }
        Command::Train { model } => {
            let kind: RecommenderKind = model.parse()?;
            let tables = store.load(TRAIN_SPLIT)?;

            let mut popular = PopularityRecommender::new(config.recommender.popularity_top_k);
            let mut other: Box<dyn Recommender>;
            let recommender: &mut dyn Recommender = if kind == RecommenderKind::Popular {
                &mut popular
            } else {
                other = create_recommender(kind, &config.recommender);
                other.as_mut()
            };

            let summary = fit_recommender(recommender, TRAIN_SPLIT, &tables.behaviors)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if kind == RecommenderKind::Popular {
                for (rank, (news_id, clicks)) in popular.most_popular(10).into_iter().enumerate() {
                    println!("{:>2}. {} ({} clicks)", rank + 1, news_id, clicks);
                }
            }
        }
        Command::Eval { model, split, k, output } => {
            let kind: RecommenderKind = model.parse()?;
            if let Some(k) = k {
                config.evaluation.k = k;
            }
            let split = split.unwrap_or_else(|| config.evaluation.split.clone());
            let evaluator = Evaluator::new(&config.evaluation)?;

            let trainer = TrainingService::new(store, config.recommender.clone());
            let eval_tables = trainer.store().load(&split)?;
            let (mut recommender, _) = trainer.train(kind, TRAIN_SPLIT)?;
            let report = evaluator.evaluate(recommender.as_mut(), &split, &eval_tables.behaviors)?;

            let json = serde_json::to_string_pretty(&report)?;
            if let Some(path) = output {
                std::fs::write(&path, &json)
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
                info!("Report written to {}", path.display());
            }
            println!("{}", json);
        }
        Command::Stats { split } => {
            let tables = store.load(&split)?;
            let stats = DatasetStats::compute(&tables.behaviors);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }

    Ok(())
}
