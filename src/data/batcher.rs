use tracing::warn;

use crate::data::dataset::DataSet;
use crate::error::{Error, Result};

/// Partitions a dataset into fixed-size mini-batches.
pub struct Batcher;

impl Batcher {
    /// Returns `floor(n / batch_size)` batches of exactly `batch_size` rows,
    /// taken in order. Trailing rows that do not fill a batch are dropped.
    pub fn batch(dataset: &DataSet, batch_size: usize) -> Result<Vec<DataSet>> {
        let n = dataset.len();
        if batch_size == 0 || batch_size > n {
            return Err(Error::Config(format!(
                "batch size must be in 1..={}, got {}",
                n, batch_size
            )));
        }

        let total_batches = n / batch_size;
        let dropped = n - total_batches * batch_size;
        if dropped > 0 {
            warn!(dropped, batch_size, "dropping remainder rows that do not fill a batch");
        }

        let indices: Vec<usize> = (0..total_batches * batch_size).collect();
        indices
            .chunks(batch_size)
            .map(|chunk| dataset.select(chunk))
            .collect()
    }
}
