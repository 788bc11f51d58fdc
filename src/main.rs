use anyhow::{Context, Result};
use clap::Parser;
use factorec::utils::dataset::{load_ratings, load_targets, train_validation_split};
use factorec::{init_tracing, CollaborativeRecommender, Config};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines file of {UserId, ItemId, Rating} records
    ratings: PathBuf,

    /// CSV file with UserId and ItemId columns
    targets: PathBuf,

    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Where to write the predictions CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print UserId,ItemId pairs to stdout
    #[arg(long)]
    print: bool,

    /// Skip writing the predictions file
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    let started = Instant::now();
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing();

    let mut config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)
            .with_context(|| format!("loading config from {}", args.config))?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    if let Some(path) = args.output {
        config.output.path = path;
    }
    config.output.print_on_console |= args.print;
    config.output.save_to_file &= !args.no_save;
    config.output.return_predictions = false;

    info!("Training configuration: {:?}", config.training);

    let ratings = load_ratings(&args.ratings, &config.rating)
        .with_context(|| format!("reading ratings from {}", args.ratings.display()))?;
    let targets = load_targets(&args.targets)
        .with_context(|| format!("reading targets from {}", args.targets.display()))?;

    let (training, validation) =
        train_validation_split(&ratings, config.data.train_fraction, config.data.split_seed);
    info!(
        training = training.len(),
        validation = validation.len(),
        targets = targets.len(),
        "inputs loaded"
    );

    let recommender = CollaborativeRecommender::new(config)?;
    let run = recommender.run(&training, &validation, &targets)?;

    info!("Training report: {}", serde_json::to_string(&run.report)?);
    info!("Time: {:.3} seconds", started.elapsed().as_secs_f64());

    Ok(())
}
