use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::train::epoch_stats::EpochStats;

/// How the batches of one epoch are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Forward, backward and update run to completion for each batch in turn.
    #[default]
    Sequential,
    /// Every batch computes its errors concurrently against the same
    /// parameters; the averaged deltas are applied once per epoch.
    Parallel,
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`      : total number of full passes over the training data
/// - `batch_size`  : rows per mini-batch; `floor(n / batch_size)` batches run per epoch
/// - `mode`        : sequential or parallel batch scheduling
/// - `nan_guard`   : fail with `Error::NonFinite` as soon as a batch cost is NaN/inf
/// - `log_interval`: emit an `info!` line every this many epochs (0 disables)
/// - `progress_tx` : optional channel sender; one `EpochStats` is sent per
///                    completed epoch.  If the receiver is dropped the loop
///                    terminates early.
/// - `stop_flag`   : optional atomic flag; when set to `true` from another
///                    thread the loop terminates after the current epoch.
#[derive(Debug)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub mode: ExecutionMode,
    pub nan_guard: bool,
    pub log_interval: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Sequential training with the NaN guard on and no channel or stop flag.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            mode: ExecutionMode::Sequential,
            nan_guard: true,
            log_interval: 100,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_nan_guard(mut self, enabled: bool) -> Self {
        self.nan_guard = enabled;
        self
    }

    pub fn with_log_interval(mut self, interval: usize) -> Self {
        self.log_interval = interval;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    /// Checks the contract against a dataset of `rows` rows.
    pub fn validate(&self, rows: usize) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::Config("epochs must be at least 1".into()));
        }
        if self.batch_size == 0 || self.batch_size > rows {
            return Err(Error::Config(format!(
                "batch size must be in 1..={}, got {}",
                rows, self.batch_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sequential_and_guarded() {
        let c = TrainConfig::new(10, 4);
        assert_eq!(c.mode, ExecutionMode::Sequential);
        assert!(c.nan_guard);
        assert!(c.progress_tx.is_none());
    }

    #[test]
    fn validate_enforces_entry_contract() {
        assert!(TrainConfig::new(0, 1).validate(4).is_err());
        assert!(TrainConfig::new(1, 0).validate(4).is_err());
        assert!(TrainConfig::new(1, 5).validate(4).is_err());
        assert!(TrainConfig::new(1, 4).validate(4).is_ok());
    }
}
