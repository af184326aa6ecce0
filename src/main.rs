//! Command-line front end: train a network from a CSV file and a JSON
//! architecture spec, run predictions with a saved model, or print a saved
//! model's layout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dense_trainer::{
    data::{load_dataset, read_csv},
    ExecutionMode, Network, NetworkSpec, TrainConfig,
};

#[derive(Parser)]
#[command(name = "dense-trainer")]
#[command(about = "Train and run dense feed-forward neural networks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log filter (overridden by RUST_LOG)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network and save it
    Train {
        /// Architecture spec (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Training data (CSV, labels in the trailing columns)
        #[arg(short, long)]
        data: PathBuf,

        /// Number of trailing label columns
        #[arg(long, default_value = "1")]
        labels: usize,

        #[arg(short, long, default_value = "100")]
        epochs: usize,

        #[arg(short, long, default_value = "1")]
        batch_size: usize,

        /// Compute batch errors concurrently and update once per epoch
        #[arg(long)]
        parallel: bool,

        /// Keep training through NaN/inf costs
        #[arg(long)]
        no_nan_guard: bool,

        /// Log every N epochs
        #[arg(long, default_value = "100")]
        log_interval: usize,

        /// Where to write the trained model
        #[arg(short, long, default_value = "model.json")]
        out: PathBuf,

        /// Optional path for the per-epoch cost curve (JSON)
        #[arg(long)]
        curve: Option<PathBuf>,
    },

    /// Print predictions for every row of a CSV file
    Predict {
        #[arg(short, long)]
        model: PathBuf,

        /// Feature rows (CSV, no label columns)
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Print the layout of a saved model
    Inspect {
        #[arg(short, long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Train {
            spec,
            data,
            labels,
            epochs,
            batch_size,
            parallel,
            no_nan_guard,
            log_interval,
            out,
            curve,
        } => {
            let spec = NetworkSpec::load_json(&spec)
                .with_context(|| format!("loading spec {}", spec.display()))?;
            let dataset = load_dataset(&data, labels)
                .with_context(|| format!("loading dataset {}", data.display()))?;
            info!(rows = dataset.len(), features = dataset.input_dim(), labels = dataset.output_dim(), "dataset loaded");

            let mut network = Network::from_spec(&spec)?;
            let mode = if parallel { ExecutionMode::Parallel } else { ExecutionMode::Sequential };
            let config = TrainConfig::new(epochs, batch_size)
                .with_mode(mode)
                .with_nan_guard(!no_nan_guard)
                .with_log_interval(log_interval);

            let costs = network.train_with(&dataset, &config)?;
            network.save_json(&out)?;

            if let Some(path) = curve {
                costs.save_json(&path)?;
                info!(path = %path.display(), "cost curve written");
            }
        }

        Commands::Predict { model, data } => {
            let network = Network::load_json(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let inputs = read_csv(&data)?;
            let predictions = network.predict(&inputs)?;
            for row in predictions.data() {
                let cells: Vec<String> = row.iter().map(|x| format!("{:.6}", x)).collect();
                println!("{}", cells.join(","));
            }
        }

        Commands::Inspect { model } => {
            let network = Network::load_json(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            println!("learning rate: {}", network.learning_rate());
            for (i, layer) in network.layers().iter().enumerate() {
                println!(
                    "layer {}: {} -> {} ({:?})",
                    i,
                    layer.input_size(),
                    layer.output_size(),
                    layer.activation()
                );
            }
        }
    }

    Ok(())
}
