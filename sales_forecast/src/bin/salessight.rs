//! # salessight
//!
//! Command-line front end: training runs, recommendation queries and
//! synthetic demo data.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sales_forecast::config::PipelineConfig;
use sales_forecast::inference::{placeholder_recommendations, Availability, InferenceService};
use sales_forecast::ingest::{get_preprocessed, DataSources};
use sales_forecast::logging::{self, LogFormat};
use sales_forecast::models::FittedHandle;
use sales_forecast::pipeline::{PipelineOutcome, TrainingPipeline};
use sales_forecast::store::ArtifactStore;
use sales_forecast::synthetic::{generate_store_sales, write_store_sales_csv};
use sales_forecast::Result;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "salessight")]
#[command(about = "Per-product sales forecasting and recommendations", long_about = None)]
struct Cli {
    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit and save one model per product, without evaluation
    Train {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only train the first N products
        #[arg(long)]
        max_products: Option<usize>,
    },

    /// Train, evaluate, rank and write the output documents
    Pipeline {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only train the first N products
        #[arg(long)]
        max_products: Option<usize>,
    },

    /// Print ranked recommendations from saved models
    Recommend {
        /// Directory holding the saved models
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,
    },

    /// Print the products that have a saved model
    Products {
        /// Directory holding the saved models
        #[arg(short, long, default_value = "models")]
        models_dir: PathBuf,
    },

    /// Write a synthetic store-sales dataset under a data root
    Demo {
        /// Data root to write into
        #[arg(short, long)]
        out: PathBuf,

        /// Number of products
        #[arg(long, default_value = "5")]
        products: usize,

        /// Number of days per product
        #[arg(long, default_value = "180")]
        days: usize,

        /// First day of the data
        #[arg(long, default_value = "2017-01-01")]
        start: NaiveDate,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn load_config(path: Option<&Path>, max_products: Option<usize>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    let config = match max_products {
        Some(max) => config.with_max_products(Some(max)),
        None => config,
    };
    config.validate()?;
    Ok(config)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Train {
            config,
            max_products,
        } => {
            let config = load_config(config.as_deref(), max_products)?;
            let table = get_preprocessed(&config)?;
            let pipeline = TrainingPipeline::from_config(config)?;
            let meta = pipeline.run_training_only(&table)?;
            println!(
                "Trained {} products into {}",
                meta.len(),
                pipeline.store().dir().display()
            );
        }
        Commands::Pipeline {
            config,
            max_products,
        } => {
            let config = load_config(config.as_deref(), max_products)?;
            let table = get_preprocessed(&config)?;
            match TrainingPipeline::from_config(config)?.run(&table)? {
                PipelineOutcome::Completed(report) => print_json(&json!({
                    "message": "Pipeline complete",
                    "products_trained": report.products_trained,
                    "recommendations": report.recommendations.len(),
                    "output_dir": report.output_dir,
                }))?,
                PipelineOutcome::NoData(message) => print_json(&json!({ "message": message }))?,
            }
        }
        Commands::Recommend { models_dir } => {
            let service: InferenceService<FittedHandle> =
                InferenceService::load(&ArtifactStore::new(models_dir));
            let body = match service.recommendations() {
                Availability::Loaded(rows) => json!({ "status": "success", "recommendations": rows }),
                Availability::Unavailable => json!({
                    "status": "mock",
                    "recommendations": placeholder_recommendations(),
                }),
            };
            print_json(&body)?;
        }
        Commands::Products { models_dir } => {
            let service: InferenceService<FittedHandle> =
                InferenceService::load(&ArtifactStore::new(models_dir));
            print_json(&json!({ "products": service.list_products() }))?;
        }
        Commands::Demo {
            out,
            products,
            days,
            start,
            seed,
        } => {
            let table = generate_store_sales(products, days, start, seed)?;
            let path = DataSources::under(&out).store_sales;
            write_store_sales_csv(&path, &table)?;
            println!("Wrote {} rows to {}", table.len(), path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
