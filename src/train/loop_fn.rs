use std::sync::atomic::Ordering;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, error, info};

use crate::data::batcher::Batcher;
use crate::data::dataset::DataSet;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;
use crate::network::network::{LayerDelta, Network, StepResult};
use crate::train::epoch_stats::EpochStats;
use crate::train::history::CostCurve;
use crate::train::train_config::{ExecutionMode, TrainConfig};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` for `config.epochs` epochs and returns one cost value per
/// completed epoch (the sum of that epoch's batch costs).
///
/// The dataset is cut into `floor(n / batch_size)` batches once, up front;
/// trailing rows that do not fill a batch never take part.
///
/// # Early termination
/// The loop stops before the next epoch if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
///
/// # Errors
/// - `Error::Config` when the epoch count or batch size breaks the contract
/// - `Error::Dimension` when the dataset's widths do not match the network
/// - `Error::NonFinite` when `nan_guard` is on and a batch cost is NaN/inf
pub fn train_loop(network: &mut Network, dataset: &DataSet, config: &TrainConfig) -> Result<CostCurve> {
    config.validate(dataset.len())?;
    if dataset.input_dim() != network.input_size() {
        return Err(Error::Dimension {
            expected: network.input_size(),
            actual: dataset.input_dim(),
        });
    }
    if dataset.output_dim() != network.output_size() {
        return Err(Error::Dimension {
            expected: network.output_size(),
            actual: dataset.output_dim(),
        });
    }

    let batches = Batcher::batch(dataset, config.batch_size)?;
    let mut curve = CostCurve::new();

    info!(
        epochs = config.epochs,
        batches = batches.len(),
        batch_size = config.batch_size,
        mode = ?config.mode,
        learning_rate = network.learning_rate(),
        "training started"
    );
    let run_start = Instant::now();

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            info!(epoch, "stop requested");
            break;
        }

        let t_start = Instant::now();

        let cost = match config.mode {
            ExecutionMode::Sequential => run_sequential_epoch(network, &batches, epoch, config.nan_guard)?,
            ExecutionMode::Parallel => run_parallel_epoch(network, &batches, epoch, config.nan_guard)?,
        };
        curve.push(cost);

        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        if config.log_interval > 0 && (epoch % config.log_interval == 0 || epoch == config.epochs) {
            info!(epoch, total = config.epochs, cost, elapsed_ms, "epoch complete");
        }

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                cost,
                batches: batches.len(),
                elapsed_ms,
            };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                info!(epoch, "progress receiver dropped");
                break;
            }
        }
    }

    info!(
        epochs_run = curve.len(),
        final_cost = curve.last().unwrap_or(f64::NAN),
        elapsed_ms = run_start.elapsed().as_millis() as u64,
        "training finished"
    );

    Ok(curve)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

fn check_cost(cost: f64, epoch: usize, batch: usize, guard: bool) -> Result<()> {
    if guard && !cost.is_finite() {
        error!(epoch, batch, cost, "batch cost is not finite");
        return Err(Error::NonFinite { epoch, batch });
    }
    Ok(())
}

/// One complete forward/backward/update step per batch, in order.
fn run_sequential_epoch(network: &mut Network, batches: &[DataSet], epoch: usize, guard: bool) -> Result<f64> {
    let mut total = 0.0;
    for (b, batch) in batches.iter().enumerate() {
        let cost = network.train_step(batch)?;
        check_cost(cost, epoch, b, guard)?;
        debug!(epoch, batch = b, cost, "batch");
        total += cost;
    }
    Ok(total)
}

/// Fans batches out over the rayon pool for the read-only part of the step,
/// joins, averages errors and deltas, and applies a single update.
fn run_parallel_epoch(network: &mut Network, batches: &[DataSet], epoch: usize, guard: bool) -> Result<f64> {
    let shared: &Network = network;
    let results: Vec<StepResult> = batches
        .par_iter()
        .map(|batch| shared.compute_step(batch))
        .collect::<Result<Vec<_>>>()?;

    let mut total = 0.0;
    for (b, step) in results.iter().enumerate() {
        check_cost(step.cost, epoch, b, guard)?;
        debug!(epoch, batch = b, cost = step.cost, "batch");
        total += step.cost;
    }

    let (errors, deltas) = average_steps(&results)?;
    network.apply_step(errors, &deltas)?;
    Ok(total)
}

/// Element-wise mean of each layer's error and delta across all steps.
fn average_steps(steps: &[StepResult]) -> Result<(Vec<Matrix>, Vec<LayerDelta>)> {
    let first = match steps.first() {
        Some(first) => first,
        None => return Err(Error::Dataset("no batches to average".into())),
    };
    let layers = first.errors.len();

    let mut errors = Vec::with_capacity(layers);
    let mut deltas = Vec::with_capacity(layers);

    for i in 0..layers {
        errors.push(mean(steps.iter().map(|s| &s.errors[i]))?);
        deltas.push(LayerDelta {
            weights: mean(steps.iter().map(|s| &s.deltas[i].weights))?,
            bias: mean(steps.iter().map(|s| &s.deltas[i].bias))?,
        });
    }

    Ok((errors, deltas))
}

fn mean<'a, I>(matrices: I) -> Result<Matrix>
where
    I: Iterator<Item = &'a Matrix>,
{
    let mut count = 0usize;
    let mut acc: Option<Matrix> = None;
    for m in matrices {
        acc = Some(match acc {
            None => m.clone(),
            Some(sum) => sum.add(m)?,
        });
        count += 1;
    }
    Ok(acc.unwrap_or_default().mul_scalar(1.0 / count.max(1) as f64))
}
