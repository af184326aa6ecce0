pub mod epoch_stats;
pub mod history;
pub mod loop_fn;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use history::CostCurve;
pub use loop_fn::train_loop;
pub use train_config::{ExecutionMode, TrainConfig};
