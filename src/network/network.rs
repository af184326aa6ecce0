use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    data::dataset::DataSet,
    error::{Error, Result},
    layers::dense::{Layer, LayerOutput},
    loss::mse::MseLoss,
    math::matrix::Matrix,
    network::spec::{validate_chain, validate_learning_rate, LayerSpec, NetworkSpec},
    train::{history::CostCurve, loop_fn::train_loop, train_config::TrainConfig},
};

/// Parameter change for one layer, already pointing downhill:
/// `weights = error · a_prev`, `bias = averageColumnVector(error)`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDelta {
    pub weights: Matrix,
    pub bias: Matrix,
}

/// Everything one training step computes before touching any parameter.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub cost: f64,
    /// Per-layer error, `[output_size, batch_rows]`, input side first.
    pub errors: Vec<Matrix>,
    pub deltas: Vec<LayerDelta>,
}

/// An ordered stack of dense layers trained with mean-squared error.
///
/// The last layer is the output layer by position only.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    learning_rate: f64,
}

impl Network {
    /// Builds a network from layer specs with symmetric-uniform weights drawn
    /// from the thread RNG.
    pub fn new(layer_specs: Vec<LayerSpec>, learning_rate: f64) -> Result<Network> {
        Network::from_spec(&NetworkSpec::new(layer_specs, learning_rate))
    }

    /// Builds a network from a full spec, honouring its initializer and seed.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Network> {
        spec.validate()?;

        let mut rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let layers = spec
            .layers
            .iter()
            .map(|l| Layer::with_init(l.input_size, l.output_size, l.activation, spec.init, &mut rng))
            .collect();

        Ok(Network {
            layers,
            learning_rate: spec.learning_rate,
        })
    }

    /// Wraps already-built layers; sizes must chain.
    pub fn from_layers(layers: Vec<Layer>, learning_rate: f64) -> Result<Network> {
        validate_learning_rate(learning_rate)?;
        validate_chain(layers.iter().map(|l| (l.input_size(), l.output_size())))?;
        Ok(Network {
            layers,
            learning_rate,
        })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |l| l.input_size())
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |l| l.output_size())
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    /// Runs every layer in order. Entry 0 is the input itself (`z == a == x`),
    /// entry `i + 1` is layer `i`'s output.
    pub fn forward(&self, input: &Matrix) -> Result<Vec<LayerOutput>> {
        if input.cols() != self.input_size() {
            return Err(Error::Dimension {
                expected: self.input_size(),
                actual: input.cols(),
            });
        }

        let mut outputs = Vec::with_capacity(self.layers.len() + 1);
        outputs.push(LayerOutput::input(input.clone()));

        for layer in &self.layers {
            let next = layer.forward(&outputs[outputs.len() - 1].a)?;
            outputs.push(next);
        }

        Ok(outputs)
    }

    /// Forward pass only; returns the last layer's activation `[n, outputs]`.
    pub fn predict(&self, input: &Matrix) -> Result<Matrix> {
        let mut outputs = self.forward(input)?;
        Ok(outputs.pop().map(|o| o.a).unwrap_or_default())
    }

    /// Backpropagates the cost of `labels` against a completed forward pass.
    ///
    /// Output layer: `error_L = ((2/m)(Y - A) ⊙ f'(z_L))ᵀ`.
    /// Hidden layers: `error_i = (W_{i+1}ᵀ · error_{i+1}) ⊙ f_i'(z_i)ᵀ`.
    pub fn backward(&self, outputs: &[LayerOutput], labels: &Matrix) -> Result<Vec<Matrix>> {
        let count = self.layers.len();
        if outputs.len() != count + 1 {
            return Err(Error::Config(format!(
                "expected {} forward outputs, got {}",
                count + 1,
                outputs.len()
            )));
        }
        if labels.cols() != self.output_size() {
            return Err(Error::Dimension {
                expected: self.output_size(),
                actual: labels.cols(),
            });
        }

        let mut errors: Vec<Matrix> = vec![Matrix::default(); count];

        let last = &outputs[count];
        let output_layer = &self.layers[count - 1];
        errors[count - 1] = MseLoss::negative_gradient(labels, &last.a)?
            .mul(&last.z.apply_gradient(&output_layer.activation()))?
            .transpose();

        for i in (0..count - 1).rev() {
            let next = &self.layers[i + 1];
            let local = outputs[i + 1]
                .z
                .apply_gradient(&self.layers[i].activation())
                .transpose();
            errors[i] = next
                .weights()
                .transpose()
                .dot(&errors[i + 1])?
                .mul(&local)?;
        }

        Ok(errors)
    }

    /// Turns per-layer errors into parameter deltas using the activations
    /// that fed each layer.
    pub fn deltas(outputs: &[LayerOutput], errors: &[Matrix]) -> Result<Vec<LayerDelta>> {
        errors
            .iter()
            .zip(outputs.iter())
            .map(|(error, input)| {
                Ok(LayerDelta {
                    weights: error.dot(&input.a)?,
                    bias: error.average_column_vector(),
                })
            })
            .collect()
    }

    /// Steps 1–3 of a training step plus cost reporting. Reads parameters
    /// only, so several batches may run this concurrently.
    pub fn compute_step(&self, batch: &DataSet) -> Result<StepResult> {
        let outputs = self.forward(batch.x())?;
        let errors = self.backward(&outputs, batch.y())?;
        let deltas = Network::deltas(&outputs, &errors)?;
        let prediction = &outputs[outputs.len() - 1].a;
        let cost = MseLoss::cost(batch.y(), prediction)?;

        Ok(StepResult {
            cost,
            errors,
            deltas,
        })
    }

    /// Records `errors` in each layer's error slot, then applies every delta.
    ///
    /// All deltas must be computed before this is called; no layer is
    /// updated while errors are still being propagated.
    pub fn apply_step(&mut self, errors: Vec<Matrix>, deltas: &[LayerDelta]) -> Result<()> {
        if errors.len() != self.layers.len() || deltas.len() != self.layers.len() {
            return Err(Error::Config(format!(
                "expected {} layer updates, got {} errors and {} deltas",
                self.layers.len(),
                errors.len(),
                deltas.len()
            )));
        }

        let learning_rate = self.learning_rate;
        for ((layer, error), delta) in self.layers.iter_mut().zip(errors).zip(deltas) {
            layer.set_error(error);
            layer.apply_update(&delta.weights, &delta.bias, learning_rate)?;
        }
        Ok(())
    }

    /// One full training step on a mini-batch. Returns the batch cost
    /// measured before the update.
    pub fn train_step(&mut self, batch: &DataSet) -> Result<f64> {
        let step = self.compute_step(batch)?;
        self.apply_step(step.errors, &step.deltas)?;
        Ok(step.cost)
    }

    /// Mean-squared error of the current parameters over `dataset`.
    pub fn cost(&self, dataset: &DataSet) -> Result<f64> {
        MseLoss::cost(dataset.y(), &self.predict(dataset.x())?)
    }

    /// Trains sequentially for `epochs` passes over `floor(n / batch_size)`
    /// mini-batches and returns the per-epoch cost curve.
    pub fn train(&mut self, dataset: &DataSet, epochs: usize, batch_size: usize) -> Result<CostCurve> {
        train_loop(self, dataset, &TrainConfig::new(epochs, batch_size))
    }

    pub fn train_with(&mut self, dataset: &DataSet, config: &TrainConfig) -> Result<CostCurve> {
        train_loop(self, dataset, config)
    }
}
