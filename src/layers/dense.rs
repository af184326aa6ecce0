use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    error::{Error, Result},
    layers::init::WeightInit,
    math::matrix::Matrix,
};

/// Output of one forward step: pre-activation `z` and activation `a`,
/// both shaped `[n, output_size]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerOutput {
    pub z: Matrix,
    pub a: Matrix,
}

impl LayerOutput {
    /// The synthetic "layer 0" entry, where `z == a == input`.
    pub fn input(x: Matrix) -> LayerOutput {
        LayerOutput { z: x.clone(), a: x }
    }
}

/// A fully-connected layer.
///
/// `weights` is `[output_size, input_size]` and `bias` is `[output_size, 1]`.
/// `error` is written by the network during backpropagation and is
/// overwritten on every training step.
#[derive(Debug, Clone)]
pub struct Layer {
    weights: Matrix,
    bias: Matrix,
    activation: ActivationFunction,
    error: Option<Matrix>,
}

impl Layer {
    /// Builds a layer with symmetric-uniform weights from the thread RNG.
    pub fn new(input_size: usize, output_size: usize, activation: ActivationFunction) -> Layer {
        Layer::with_init(
            input_size,
            output_size,
            activation,
            WeightInit::SymmetricUniform,
            &mut rand::thread_rng(),
        )
    }

    pub fn with_init<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: ActivationFunction,
        init: WeightInit,
        rng: &mut R,
    ) -> Layer {
        let weights = init.sample(rng, input_size, output_size, output_size, input_size);
        let bias = init.sample(rng, input_size, output_size, output_size, 1);

        Layer {
            weights,
            bias,
            activation,
            error: None,
        }
    }

    /// Assembles a layer from explicit parameters. `bias` must be
    /// `[weights.rows(), 1]`.
    pub fn from_parts(weights: Matrix, bias: Matrix, activation: ActivationFunction) -> Result<Layer> {
        if bias.shape() != (weights.rows(), 1) {
            return Err(Error::shape("layer bias", (weights.rows(), 1), bias.shape()));
        }
        Ok(Layer {
            weights,
            bias,
            activation,
            error: None,
        })
    }

    pub fn input_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn output_size(&self) -> usize {
        self.weights.rows()
    }

    /// `z = (W · xᵀ + b)ᵀ`, `a = activation(z)`. Reads parameters only.
    pub fn forward(&self, input: &Matrix) -> Result<LayerOutput> {
        let z = self
            .weights
            .dot(&input.transpose())?
            .add_broadcast(&self.bias)?
            .transpose();
        let a = z.apply_activation(&self.activation);
        Ok(LayerOutput { z, a })
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn bias(&self) -> &Matrix {
        &self.bias
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        if weights.shape() != self.weights.shape() {
            return Err(Error::shape("set_weights", self.weights.shape(), weights.shape()));
        }
        self.weights = weights;
        Ok(())
    }

    pub fn set_bias(&mut self, bias: Matrix) -> Result<()> {
        if bias.shape() != self.bias.shape() {
            return Err(Error::shape("set_bias", self.bias.shape(), bias.shape()));
        }
        self.bias = bias;
        Ok(())
    }

    pub fn set_error(&mut self, error: Matrix) {
        self.error = Some(error);
    }

    /// Error from the most recent training step, `[output_size, n]`.
    pub fn error(&self) -> Option<&Matrix> {
        self.error.as_ref()
    }

    /// `weights += lr · weight_delta`, `bias += lr · bias_delta`.
    ///
    /// The deltas already point downhill, so the update is additive.
    pub fn apply_update(
        &mut self,
        weight_delta: &Matrix,
        bias_delta: &Matrix,
        learning_rate: f64,
    ) -> Result<()> {
        let weights = self.weights.add(&weight_delta.mul_scalar(learning_rate))?;
        let bias = self.bias.add(&bias_delta.mul_scalar(learning_rate))?;
        self.weights = weights;
        self.bias = bias;
        Ok(())
    }
}
