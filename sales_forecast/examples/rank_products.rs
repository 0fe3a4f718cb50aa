use chrono::NaiveDate;
use sales_forecast::config::PipelineConfig;
use sales_forecast::inference::InferenceService;
use sales_forecast::logging::{self, LogFormat};
use sales_forecast::models::FittedHandle;
use sales_forecast::pipeline::{PipelineOutcome, TrainingPipeline};
use sales_forecast::store::ArtifactStore;
use sales_forecast::synthetic::generate_store_sales;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogFormat::Plain);

    let workdir = std::env::temp_dir().join("salessight_rank_products");
    let config = PipelineConfig::default()
        .with_models_dir(workdir.join("models"))
        .with_output_dir(workdir.join("output"));

    // Six months of data for eight products
    let start = NaiveDate::from_ymd_opt(2017, 1, 1).ok_or("invalid start date")?;
    let table = generate_store_sales(8, 180, start, 7)?;
    println!("Generated {} rows for {} products", table.len(), table.products().len());

    match TrainingPipeline::from_config(config.clone())?.run(&table)? {
        PipelineOutcome::Completed(report) => {
            println!("Validation metrics:");
            for (product, record) in &report.metrics {
                println!("  {:<16} {}", product, record.evaluation());
            }
        }
        PipelineOutcome::NoData(message) => {
            println!("{message}");
            return Ok(());
        }
    }

    // Query the saved models the way a serving process would
    let service: InferenceService<FittedHandle> =
        InferenceService::load(&ArtifactStore::new(&config.models_dir));

    println!("Recommendations for the next 30 days:");
    for (i, row) in service.list_recommendations().iter().enumerate() {
        println!(
            "{:>2}. {:<16} sales {:>10.2}  growth {:>7.2}%  score {:.4}",
            i + 1,
            row.product,
            row.predicted_sales,
            row.growth_rate,
            row.recommendation_score
        );
    }

    Ok(())
}
