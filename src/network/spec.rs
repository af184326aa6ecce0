use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::init::WeightInit;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `input_size` : width of the incoming activations (the previous layer's
///                   `output_size`, or the raw feature count for the first layer)
/// - `output_size`: number of neurons in this layer
/// - `activation` : activation function applied after the affine transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub input_size: usize,
    pub output_size: usize,
    pub activation: ActivationFunction,
}

impl LayerSpec {
    pub fn new(input_size: usize, output_size: usize, activation: ActivationFunction) -> LayerSpec {
        LayerSpec {
            input_size,
            output_size,
            activation,
        }
    }
}

/// A serializable description of a network architecture and the
/// hyperparameters needed to construct it.
///
/// Stored as JSON; the CLI reads one of these before training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name, used as the default model file stem.
    #[serde(default)]
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    pub learning_rate: f64,
    #[serde(default)]
    pub init: WeightInit,
    /// Seed for weight initialization; `None` draws from the thread RNG.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn new(layers: Vec<LayerSpec>, learning_rate: f64) -> NetworkSpec {
        NetworkSpec {
            name: String::new(),
            layers,
            learning_rate,
            init: WeightInit::default(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> NetworkSpec {
        self.seed = Some(seed);
        self
    }

    pub fn with_init(mut self, init: WeightInit) -> NetworkSpec {
        self.init = init;
        self
    }

    /// Checks the layer chain and learning rate.
    pub fn validate(&self) -> Result<()> {
        validate_learning_rate(self.learning_rate)?;
        validate_chain(self.layers.iter().map(|l| (l.input_size, l.output_size)))
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}

pub(crate) fn validate_learning_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(Error::Config(format!(
            "learning rate must be positive and finite, got {}",
            learning_rate
        )));
    }
    Ok(())
}

/// `(input_size, output_size)` pairs must be non-empty, non-zero and chained.
pub(crate) fn validate_chain<I>(sizes: I) -> Result<()>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut previous: Option<usize> = None;
    let mut count = 0;

    for (i, (input_size, output_size)) in sizes.into_iter().enumerate() {
        if input_size == 0 || output_size == 0 {
            return Err(Error::Config(format!("layer {} has a zero-sized dimension", i)));
        }
        if let Some(prev) = previous {
            if prev != input_size {
                return Err(Error::Config(format!(
                    "layer {} expects {} inputs but layer {} produces {}",
                    i,
                    input_size,
                    i - 1,
                    prev
                )));
            }
        }
        previous = Some(output_size);
        count += 1;
    }

    if count == 0 {
        return Err(Error::Config("a network needs at least one layer".into()));
    }
    Ok(())
}
