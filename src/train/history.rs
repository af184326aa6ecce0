use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Ordered per-epoch cost values plus the labels a plotter needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCurve {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub values: Vec<f64>,
}

impl CostCurve {
    pub fn new() -> CostCurve {
        CostCurve {
            title: "Cost".into(),
            x_label: "Epochs".into(),
            y_label: "Cost".into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, cost: f64) {
        self.values.push(cost);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Option<f64> {
        self.values.first().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Default for CostCurve {
    fn default() -> Self {
        CostCurve::new()
    }
}
