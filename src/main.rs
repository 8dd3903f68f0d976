mod api;
mod server;

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use view_forecast::batch::{read_rows_jsonl, write_rows_jsonl, DatasetCleaner, Recency, TrainingMatrix};
use view_forecast::config::ForecastConfig;
use view_forecast::evaluation::evaluate;
use view_forecast::features::content::parse_tag_list;
use view_forecast::model::{LinearArtifact, ModelContext, ModelMetadata};
use view_forecast::{format_number, format_percent, forecast, synthetic, ForecastError, VideoRecord};

#[derive(Parser)]
#[command(name = "view-forecast", about = "First-week video view forecaster")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Predict(PredictArgs),
    Engineer(EngineerArgs),
    Evaluate(EvaluateArgs),
    Synthesize(SynthesizeArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct PredictArgs {
    #[arg(long, default_value = "")]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    publish_date: Option<String>,
    #[arg(long)]
    publish_hour: Option<u8>,
    #[arg(long, default_value_t = 10.0)]
    duration_minutes: f64,
    #[arg(long, default_value = "")]
    tags: String,
    #[arg(long)]
    tag_count: Option<u32>,
    #[arg(long, default_value_t = 100_000)]
    channel_subscribers: u64,
    #[arg(long, default_value_t = 100)]
    channel_video_count: u64,
    #[arg(long, default_value_t = 1_000_000)]
    channel_view_count: u64,
}

#[derive(Args, Debug, Clone)]
struct EngineerArgs {
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    output: PathBuf,
    #[arg(long)]
    recent_only: bool,
}

#[derive(Args, Debug, Clone)]
struct EvaluateArgs {
    #[arg(long)]
    matrix: PathBuf,
    #[arg(long)]
    artifact: Option<PathBuf>,
    #[arg(long)]
    metadata: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct SynthesizeArgs {
    #[arg(long, default_value_t = 500)]
    count: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value = "raw_data/videos.jsonl")]
    output: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> view_forecast::Result<()> {
    let cli = Cli::parse();
    let (config, config_path) = ForecastConfig::load(cli.config)?;
    if let Some(path) = config_path.filter(|path| path.exists()) {
        tracing::debug!(path = %path.display(), "config loaded");
    }

    match cli.command {
        Command::Predict(args) => run_predict(&config, args).await,
        Command::Engineer(args) => run_engineer(&config, args),
        Command::Evaluate(args) => run_evaluate(&config, args),
        Command::Synthesize(args) => run_synthesize(args),
        Command::Serve(args) => {
            let host = args.host.unwrap_or_else(|| config.server.host.clone());
            let port = args.port.unwrap_or(config.server.port);
            server::serve(config, host, port).await
        }
    }
}

async fn run_predict(config: &ForecastConfig, args: PredictArgs) -> view_forecast::Result<()> {
    let record = build_record(args)?;
    let context = ModelContext::load(config)?;
    let result = forecast(&context, &record, &config.inference).await?;
    let prediction = &result.prediction;

    println!(
        "First-week views: {} (range {} - {})",
        format_number(prediction.first_week_views as f64),
        format_number(prediction.interval.min),
        format_number(prediction.interval.max)
    );
    println!(
        "Confidence: {} | accuracy estimate: {:.0}%",
        format_percent(prediction.confidence),
        prediction.accuracy
    );
    println!(
        "Model: {} (cv {:.3}, {} features, {} defaulted)",
        result.model_name, result.cv_score, result.features_used, result.missing_features
    );

    if !prediction.recommendations.is_empty() {
        println!("\nRecommendations:");
        for item in &prediction.recommendations {
            println!(
                "- [{}] {} {}",
                item.priority.label(),
                item.message,
                item.suggestion
            );
        }
    }

    Ok(())
}

fn build_record(args: PredictArgs) -> view_forecast::Result<VideoRecord> {
    let publish_hour = args.publish_hour.map(validate_hour).transpose()?;
    if !args.duration_minutes.is_finite() || args.duration_minutes < 0.0 {
        return Err(ForecastError::InvalidInput(format!(
            "invalid duration: {}",
            args.duration_minutes
        )));
    }

    let mut record = VideoRecord {
        title: args.title,
        description: args.description,
        published_at: args.publish_date,
        publish_hour,
        tags: parse_tag_list(&args.tags),
        tag_count: args.tag_count,
        channel_subscribers: args.channel_subscribers,
        channel_video_count: args.channel_video_count,
        channel_view_count: args.channel_view_count,
        ..VideoRecord::default()
    };
    record.set_duration_minutes(args.duration_minutes);
    Ok(record)
}

fn validate_hour(value: u8) -> view_forecast::Result<u8> {
    if value > 23 {
        return Err(ForecastError::InvalidInput(format!(
            "invalid hour (0-23): {}",
            value
        )));
    }
    Ok(value)
}

fn run_engineer(config: &ForecastConfig, args: EngineerArgs) -> view_forecast::Result<()> {
    let now = Local::now().naive_local();
    let rows = read_rows_jsonl(&args.input)?;

    let mut cleaner = DatasetCleaner::standard(&config.batch);
    if args.recent_only {
        cleaner = cleaner.with_filter(Box::new(Recency {
            now,
            max_age: chrono::Duration::days(config.batch.max_age_days),
        }));
    }
    let rows = cleaner.clean(rows);
    if rows.is_empty() {
        return Err(ForecastError::InvalidInput(
            "no rows survived cleaning".to_string(),
        ));
    }

    let matrix = TrainingMatrix::build(&rows, now);
    matrix.write(&args.output)?;
    println!(
        "Wrote {} rows x {} features to {} (schema {})",
        matrix.len(),
        matrix.schema.len(),
        args.output.display(),
        matrix.schema.fingerprint()
    );
    Ok(())
}

fn run_evaluate(config: &ForecastConfig, args: EvaluateArgs) -> view_forecast::Result<()> {
    let artifact_path = args.artifact.unwrap_or_else(|| config.model.artifact_path());
    let metadata_path = args.metadata.unwrap_or_else(|| config.model.metadata_path());

    let artifact = LinearArtifact::load(&artifact_path)?;
    let matrix = TrainingMatrix::load(&args.matrix)?;
    let metrics = evaluate(&artifact, &matrix)?;

    let mut metadata = load_metadata_or_default(&metadata_path, &artifact)?;
    metrics.apply_to(&mut metadata);
    metadata.write(&metadata_path)?;

    println!(
        "R2 {:.3} | MAE {} | RMSE {} | residual std {} | ranking {} over {} rows",
        metrics.r2,
        format_number(metrics.mae),
        format_number(metrics.rmse),
        format_number(metrics.residual_std),
        format_percent(metrics.pairwise_ranking_accuracy),
        metrics.sample_count
    );
    println!("Metadata written to {}", metadata_path.display());
    Ok(())
}

fn load_metadata_or_default(
    path: &Path,
    artifact: &LinearArtifact,
) -> view_forecast::Result<ModelMetadata> {
    if path.exists() {
        return ModelMetadata::load(path);
    }
    Ok(ModelMetadata {
        model_name: artifact.model_name.clone(),
        training_date: Some(Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()),
        feature_count: artifact.feature_names.len(),
        ..ModelMetadata::default()
    })
}

fn run_synthesize(args: SynthesizeArgs) -> view_forecast::Result<()> {
    let rows = synthetic::generate_rows(args.count, args.seed, Local::now().naive_local());
    write_rows_jsonl(&args.output, &rows)?;
    println!("Wrote {} sample rows to {}", rows.len(), args.output.display());
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
