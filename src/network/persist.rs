//! Versioned on-disk model format.
//!
//! A saved model is a JSON document: a header (format version, learning rate,
//! layer count) followed by one record per layer holding its shape, its
//! activation tag and flat row-major weight and bias payloads.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activation::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::math::matrix::Matrix;
use crate::network::network::Network;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SavedModel {
    format_version: u32,
    learning_rate: f64,
    layer_count: usize,
    layers: Vec<SavedLayer>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedLayer {
    input_size: usize,
    output_size: usize,
    activation: ActivationFunction,
    weights: Vec<f64>,
    bias: Vec<f64>,
}

impl SavedLayer {
    fn into_layer(self) -> Result<Layer> {
        let weights = Matrix::from_flat(self.output_size, self.input_size, self.weights)?;
        let bias = Matrix::from_flat(self.output_size, 1, self.bias)?;
        Layer::from_parts(weights, bias, self.activation)
    }
}

impl Network {
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        let saved = SavedModel {
            format_version: FORMAT_VERSION,
            learning_rate: self.learning_rate(),
            layer_count: self.layer_count(),
            layers: self
                .layers()
                .iter()
                .map(|l| SavedLayer {
                    input_size: l.input_size(),
                    output_size: l.output_size(),
                    activation: l.activation(),
                    weights: l.weights().to_flat(),
                    bias: l.bias().to_flat(),
                })
                .collect(),
        };
        serde_json::to_writer_pretty(writer, &saved)?;
        Ok(())
    }

    pub fn read_json<R: Read>(reader: R) -> Result<Network> {
        let saved: SavedModel = serde_json::from_reader(reader)?;

        if saved.format_version != FORMAT_VERSION {
            return Err(Error::UnsupportedFormat {
                found: saved.format_version,
                expected: FORMAT_VERSION,
            });
        }
        if saved.layer_count != saved.layers.len() {
            return Err(Error::Config(format!(
                "model header declares {} layers but contains {}",
                saved.layer_count,
                saved.layers.len()
            )));
        }

        let layers = saved
            .layers
            .into_iter()
            .map(SavedLayer::into_layer)
            .collect::<Result<Vec<_>>>()?;
        Network::from_layers(layers, saved.learning_rate)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_json(&mut writer)?;
        writer.flush()?;
        info!(path = %path.as_ref().display(), layers = self.layer_count(), "saved model");
        Ok(())
    }

    /// Deserializes a network from a file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let file = std::fs::File::open(path.as_ref())?;
        let network = Network::read_json(std::io::BufReader::new(file))?;
        info!(path = %path.as_ref().display(), layers = network.layer_count(), "loaded model");
        Ok(network)
    }
}
