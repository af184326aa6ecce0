pub mod dense;
pub mod init;

pub use dense::{Layer, LayerOutput};
pub use init::WeightInit;
