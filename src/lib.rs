pub mod activation;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use data::{batcher::Batcher, dataset::DataSet};
pub use error::{Error, Result};
pub use layers::{dense::Layer, dense::LayerOutput, init::WeightInit};
pub use loss::mse::MseLoss;
pub use math::matrix::{Axis, Matrix};
pub use network::{network::Network, spec::LayerSpec, spec::NetworkSpec};
pub use train::{history::CostCurve, loop_fn::train_loop, train_config::ExecutionMode, train_config::TrainConfig};
