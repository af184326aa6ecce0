pub mod batcher;
pub mod csv;
pub mod dataset;

pub use batcher::Batcher;
pub use csv::{load_dataset, parse_csv, read_csv};
pub use dataset::DataSet;
