pub mod network;
pub mod persist;
pub mod spec;

pub use network::{LayerDelta, Network, StepResult};
pub use spec::{LayerSpec, NetworkSpec};
