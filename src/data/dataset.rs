use crate::error::{Error, Result};
use crate::math::matrix::{Axis, Matrix};

/// Features `x: [n, input_dim]` paired with labels `y: [n, output_dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    x: Matrix,
    y: Matrix,
}

impl DataSet {
    /// Fails with [`Error::Dataset`] when `x` and `y` disagree on row count.
    pub fn new(x: Matrix, y: Matrix) -> Result<DataSet> {
        if x.rows() != y.rows() {
            return Err(Error::Dataset(format!(
                "features have {} rows but labels have {}",
                x.rows(),
                y.rows()
            )));
        }
        Ok(DataSet { x, y })
    }

    /// Splits a table into features and labels: the last `label_size`
    /// columns become `y` (in their original order), the rest become `x`.
    ///
    /// Header rows must already be stripped.
    pub fn split(data: &Matrix, label_size: usize) -> Result<DataSet> {
        if label_size == 0 || label_size >= data.cols() {
            return Err(Error::Dataset(format!(
                "cannot take {} label columns from a table with {} columns",
                label_size,
                data.cols()
            )));
        }

        let mut features = data.clone();
        let mut labels: Option<Matrix> = None;

        for _ in 0..label_size {
            let last = features.cols() - 1;
            let column = features.get_column(last)?;
            labels = Some(match labels {
                None => column,
                Some(rest) => column.concat(&rest, Axis::Columns)?,
            });
            features = features.remove_column(last)?;
        }

        let labels = labels.unwrap_or_default();
        DataSet::new(features, labels)
    }

    pub fn x(&self) -> &Matrix {
        &self.x
    }

    pub fn y(&self) -> &Matrix {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn input_dim(&self) -> usize {
        self.x.cols()
    }

    pub fn output_dim(&self) -> usize {
        self.y.cols()
    }

    /// Materializes the listed rows as an independent dataset.
    pub fn select(&self, indices: &[usize]) -> Result<DataSet> {
        Ok(DataSet {
            x: self.x.select_rows(indices)?,
            y: self.y.select_rows(indices)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_rows_are_rejected() {
        let res = DataSet::new(Matrix::ones(4, 2), Matrix::ones(3, 1));
        assert!(matches!(res, Err(Error::Dataset(_))));
    }

    #[test]
    fn split_takes_trailing_label_columns_in_order() {
        let table = Matrix::from_rows(vec![
            vec![1.0, 2.0, 3.0, 4.0],
            vec![5.0, 6.0, 7.0, 8.0],
        ])
        .unwrap();

        let ds = DataSet::split(&table, 2).unwrap();
        assert_eq!(ds.x(), &Matrix::from_rows(vec![vec![1.0, 2.0], vec![5.0, 6.0]]).unwrap());
        assert_eq!(ds.y(), &Matrix::from_rows(vec![vec![3.0, 4.0], vec![7.0, 8.0]]).unwrap());
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.input_dim(), 2);
        assert_eq!(ds.output_dim(), 2);
    }

    #[test]
    fn split_needs_at_least_one_feature_column() {
        let table = Matrix::ones(3, 2);
        assert!(DataSet::split(&table, 2).is_err());
        assert!(DataSet::split(&table, 0).is_err());
        assert!(DataSet::split(&table, 1).is_ok());
    }
}
