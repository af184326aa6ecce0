use std::fmt;

use rand::prelude::*;

use crate::activation::ActivationFunction;
use crate::error::{Error, Result};

/// Direction used by [`Matrix::concat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Stack `other` below `self`; column counts must match.
    Rows,
    /// Place `other` to the right of `self`; row counts must match.
    Columns,
}

/// A dense, row-major 2-D matrix of `f64`.
///
/// Every operation returns a fresh `Matrix`; nothing mutates its receiver or
/// its arguments. Binary operations check shapes before computing anything and
/// return [`Error::Shape`] on mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 0.0)
    }

    pub fn ones(rows: usize, cols: usize) -> Matrix {
        Matrix::filled(rows, cols, 1.0)
    }

    fn filled(rows: usize, cols: usize, value: f64) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![value; cols]; rows],
        }
    }

    /// Uniform samples in `[0, 1)` from the thread-local RNG.
    pub fn uniform_random(rows: usize, cols: usize) -> Matrix {
        Matrix::uniform_random_with(&mut rand::thread_rng(), rows, cols)
    }

    pub fn uniform_random_with<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.gen::<f64>();
            }
        }
        res
    }

    /// Uniform samples in `[-epsilon/2, epsilon/2)` from the thread-local RNG.
    pub fn uniform_random_bounded(epsilon: f64, rows: usize, cols: usize) -> Matrix {
        Matrix::uniform_random_bounded_with(&mut rand::thread_rng(), epsilon, rows, cols)
    }

    pub fn uniform_random_bounded_with<R: Rng + ?Sized>(
        rng: &mut R,
        epsilon: f64,
        rows: usize,
        cols: usize,
    ) -> Matrix {
        Matrix::uniform_random_with(rng, rows, cols).map(|x| x * epsilon - epsilon / 2.0)
    }

    /// Builds a matrix from nested rows. Every row must have the same length.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, |r| r.len());
        if let Some(bad) = data.iter().find(|r| r.len() != cols) {
            return Err(Error::shape("from_rows", (rows, cols), (1, bad.len())));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from a flat row-major buffer of length `rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, flat: Vec<f64>) -> Result<Matrix> {
        if flat.len() != rows * cols {
            return Err(Error::shape("from_flat", (rows, cols), (1, flat.len())));
        }
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            flat.chunks(cols).map(|c| c.to_vec()).collect()
        };
        Ok(Matrix { rows, cols, data })
    }

    /// A `(1, n)` matrix holding `values`.
    pub fn row_vector(values: Vec<f64>) -> Matrix {
        Matrix {
            rows: 1,
            cols: values.len(),
            data: vec![values],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    /// Row-major copy of every element.
    pub fn to_flat(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    /// Standard matrix product, `(r, k) x (k, c) -> (r, c)`.
    pub fn dot(&self, other: &Matrix) -> Result<Matrix> {
        if self.cols != other.rows {
            return Err(Error::shape("dot", self.shape(), other.shape()));
        }

        let mut res = Matrix::zeros(self.rows, other.cols);

        // i-k-j order walks both operands row-wise.
        for i in 0..self.rows {
            let out = &mut res.data[i];
            for (k, &lhs) in self.data[i].iter().enumerate() {
                for (o, &rhs) in out.iter_mut().zip(other.data[k].iter()) {
                    *o += lhs * rhs;
                }
            }
        }

        Ok(res)
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with("add", other, |a, b| a + b)
    }

    /// `self - other`, defined as `self.add(other.mul_scalar(-1))`.
    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.add(&other.mul_scalar(-1.0))
    }

    /// Element-wise (Hadamard) product.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        self.zip_with("mul", other, |a, b| a * b)
    }

    pub fn mul_scalar(&self, scalar: f64) -> Matrix {
        self.map(|x| x * scalar)
    }

    pub fn pow(&self, exponent: i32) -> Matrix {
        self.map(|x| x.powi(exponent))
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    /// Adds a row vector `(1, cols)` to every row, or a column vector
    /// `(rows, 1)` to every column.
    pub fn add_broadcast(&self, vector: &Matrix) -> Result<Matrix> {
        if vector.rows != 1 && vector.cols != 1 {
            return Err(Error::shape("add_broadcast", self.shape(), vector.shape()));
        }

        if vector.rows == 1 && vector.cols == self.cols {
            let v = &vector.data[0];
            return Ok(self.map_indexed(|_, j, x| x + v[j]));
        }

        if vector.cols == 1 && vector.rows == self.rows {
            return Ok(self.map_indexed(|i, _, x| x + vector.data[i][0]));
        }

        Err(Error::shape("add_broadcast", self.shape(), vector.shape()))
    }

    /// Mean of each row, as a `(rows, 1)` column vector.
    pub fn average_column_vector(&self) -> Matrix {
        let n = self.cols as f64;
        let data = self
            .data
            .iter()
            .map(|row| vec![if self.cols == 0 { 0.0 } else { row.iter().sum::<f64>() / n }])
            .collect();
        Matrix {
            rows: self.rows,
            cols: 1,
            data,
        }
    }

    pub fn apply_activation(&self, function: &ActivationFunction) -> Matrix {
        self.map(|x| function.value(x))
    }

    pub fn apply_gradient(&self, function: &ActivationFunction) -> Matrix {
        self.map(|x| function.derivative(x))
    }

    pub fn get_row(&self, row: usize) -> Result<Matrix> {
        self.check_row(row, "get_row")?;
        Ok(Matrix::row_vector(self.data[row].clone()))
    }

    pub fn get_column(&self, col: usize) -> Result<Matrix> {
        self.check_col(col, "get_column")?;
        Ok(Matrix {
            rows: self.rows,
            cols: 1,
            data: self.data.iter().map(|r| vec![r[col]]).collect(),
        })
    }

    pub fn remove_row(&self, row: usize) -> Result<Matrix> {
        self.check_row(row, "remove_row")?;
        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != row)
            .map(|(_, r)| r.clone())
            .collect();
        Ok(Matrix {
            rows: self.rows - 1,
            cols: self.cols,
            data,
        })
    }

    pub fn remove_column(&self, col: usize) -> Result<Matrix> {
        self.check_col(col, "remove_column")?;
        let data = self
            .data
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .filter(|&(j, _)| j != col)
                    .map(|(_, &x)| x)
                    .collect()
            })
            .collect();
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols - 1,
            data,
        })
    }

    pub fn concat(&self, other: &Matrix, axis: Axis) -> Result<Matrix> {
        match axis {
            Axis::Rows => {
                if self.cols != other.cols {
                    return Err(Error::shape("concat(rows)", self.shape(), other.shape()));
                }
                let mut data = self.data.clone();
                data.extend(other.data.iter().cloned());
                Ok(Matrix {
                    rows: self.rows + other.rows,
                    cols: self.cols,
                    data,
                })
            }
            Axis::Columns => {
                if self.rows != other.rows {
                    return Err(Error::shape("concat(columns)", self.shape(), other.shape()));
                }
                let data = self
                    .data
                    .iter()
                    .zip(other.data.iter())
                    .map(|(a, b)| a.iter().chain(b.iter()).copied().collect())
                    .collect();
                Ok(Matrix {
                    rows: self.rows,
                    cols: self.cols + other.cols,
                    data,
                })
            }
        }
    }

    /// Copies the listed rows, in order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Matrix> {
        let mut data = Vec::with_capacity(indices.len());
        for &i in indices {
            self.check_row(i, "select_rows")?;
            data.push(self.data[i].clone());
        }
        Ok(Matrix {
            rows: indices.len(),
            cols: self.cols,
            data,
        })
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        self.map_indexed(|_, _, x| functor(x))
    }

    fn map_indexed<F>(&self, functor: F) -> Matrix
    where
        F: Fn(usize, usize, f64) -> f64,
    {
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, row)| row.iter().enumerate().map(|(j, &x)| functor(i, j, x)).collect())
            .collect();
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    fn zip_with<F>(&self, op: &'static str, other: &Matrix, functor: F) -> Result<Matrix>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(Error::shape(op, self.shape(), other.shape()));
        }
        Ok(self.map_indexed(|i, j, x| functor(x, other.data[i][j])))
    }

    fn check_row(&self, row: usize, op: &'static str) -> Result<()> {
        if row >= self.rows {
            return Err(Error::shape(op, self.shape(), (row, 0)));
        }
        Ok(())
    }

    fn check_col(&self, col: usize, op: &'static str) -> Result<()> {
        if col >= self.cols {
            return Err(Error::shape(op, self.shape(), (0, col)));
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shape=[{}, {}]", self.rows, self.cols)?;
        write!(f, "[")?;
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            write!(f, "{:?}", row)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn dot_matches_known_product() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let b = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let c = a.dot(&b).unwrap();
        assert_eq!(c, m(vec![vec![58.0, 64.0], vec![139.0, 154.0]]));
    }

    #[test]
    fn dot_rejects_inner_mismatch() {
        let a = Matrix::ones(2, 3);
        let b = Matrix::ones(2, 3);
        assert!(matches!(a.dot(&b), Err(Error::Shape { op: "dot", .. })));
    }

    #[test]
    fn dot_and_transpose_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        for (r, k, c) in [(1, 1, 1), (2, 5, 3), (4, 1, 6), (3, 3, 3)] {
            let a = Matrix::uniform_random_with(&mut rng, r, k);
            let b = Matrix::uniform_random_with(&mut rng, k, c);
            assert_eq!(a.dot(&b).unwrap().shape(), (r, c));
            assert_eq!(a.transpose().shape(), (k, r));
            assert_eq!(a.transpose().transpose(), a);
        }
    }

    #[test]
    fn elementwise_ops_check_shapes() {
        let a = Matrix::ones(2, 2);
        let b = Matrix::ones(2, 3);
        assert!(a.add(&b).is_err());
        assert!(a.sub(&b).is_err());
        assert!(a.mul(&b).is_err());
    }

    #[test]
    fn sub_is_add_of_negation() {
        let a = m(vec![vec![1.0, -2.0], vec![3.5, 0.0]]);
        let b = m(vec![vec![0.5, 4.0], vec![-1.0, 2.0]]);
        assert_eq!(a.sub(&b).unwrap(), a.add(&b.mul_scalar(-1.0)).unwrap());
        assert_eq!(a.sub(&b).unwrap(), m(vec![vec![0.5, -6.0], vec![4.5, -2.0]]));
    }

    #[test]
    fn pow_sum_and_hadamard() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(a.pow(2).sum(), 30.0);
        assert_eq!(a.mul(&a).unwrap(), a.pow(2));
    }

    #[test]
    fn broadcast_row_and_column_vectors() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);

        let row = Matrix::row_vector(vec![10.0, 20.0, 30.0]);
        assert_eq!(
            a.add_broadcast(&row).unwrap(),
            m(vec![vec![11.0, 22.0, 33.0], vec![14.0, 25.0, 36.0]])
        );

        let col = m(vec![vec![100.0], vec![200.0]]);
        assert_eq!(
            a.add_broadcast(&col).unwrap(),
            m(vec![vec![101.0, 102.0, 103.0], vec![204.0, 205.0, 206.0]])
        );

        assert_eq!(a.add_broadcast(&Matrix::zeros(1, 3)).unwrap(), a);
    }

    #[test]
    fn broadcast_rejects_incompatible_vectors() {
        let a = Matrix::ones(2, 3);
        assert!(a.add_broadcast(&Matrix::ones(2, 2)).is_err());
        assert!(a.add_broadcast(&Matrix::ones(1, 2)).is_err());
        assert!(a.add_broadcast(&Matrix::ones(3, 1)).is_err());
    }

    #[test]
    fn average_column_vector_takes_row_means() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![-4.0, 0.0, 1.0]]);
        let avg = a.average_column_vector();
        assert_eq!(avg.shape(), (2, 1));
        assert_abs_diff_eq!(avg.get(0, 0).unwrap(), 2.0);
        assert_abs_diff_eq!(avg.get(1, 0).unwrap(), -1.0);
    }

    #[test]
    fn structural_helpers() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]]);

        assert_eq!(a.get_row(1).unwrap(), Matrix::row_vector(vec![4.0, 5.0, 6.0]));
        assert_eq!(a.get_column(2).unwrap(), m(vec![vec![3.0], vec![6.0], vec![9.0]]));
        assert_eq!(
            a.remove_row(0).unwrap(),
            m(vec![vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]])
        );
        assert_eq!(
            a.remove_column(1).unwrap(),
            m(vec![vec![1.0, 3.0], vec![4.0, 6.0], vec![7.0, 9.0]])
        );
        assert!(a.get_row(3).is_err());
        assert!(a.remove_column(3).is_err());
    }

    #[test]
    fn concat_along_both_axes() {
        let a = m(vec![vec![1.0, 2.0]]);
        let b = m(vec![vec![3.0, 4.0]]);
        assert_eq!(
            a.concat(&b, Axis::Rows).unwrap(),
            m(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
        );
        assert_eq!(
            a.concat(&b, Axis::Columns).unwrap(),
            Matrix::row_vector(vec![1.0, 2.0, 3.0, 4.0])
        );
        assert!(a.concat(&Matrix::ones(1, 3), Axis::Rows).is_err());
        assert!(a.concat(&Matrix::ones(2, 1), Axis::Columns).is_err());
    }

    #[test]
    fn constant_constructors_and_display() {
        assert_eq!(Matrix::zeros(2, 3).sum(), 0.0);
        assert_eq!(Matrix::ones(2, 3).sum(), 6.0);
        let shown = Matrix::ones(2, 1).to_string();
        assert!(shown.starts_with("shape=[2, 1]"));
    }

    #[test]
    fn from_rows_rejects_ragged_data() {
        assert!(Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).is_err());
        assert_eq!(Matrix::from_rows(vec![]).unwrap().shape(), (0, 0));
    }

    #[test]
    fn flat_round_trip_preserves_layout() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(Matrix::from_flat(2, 3, a.to_flat()).unwrap(), a);
        assert!(Matrix::from_flat(2, 2, vec![1.0]).is_err());
    }

    #[test]
    fn random_initializers_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let u = Matrix::uniform_random_with(&mut rng, 20, 20);
        assert!(u.to_flat().iter().all(|&x| (0.0..1.0).contains(&x)));

        let b = Matrix::uniform_random_bounded_with(&mut rng, 0.8, 20, 20);
        assert!(b.to_flat().iter().all(|&x| (-0.4..0.4).contains(&x)));
        assert!(b.to_flat().iter().any(|&x| x < 0.0));

        assert_eq!(Matrix::uniform_random(3, 2).shape(), (3, 2));
        assert!(Matrix::uniform_random_bounded(2.0, 4, 4)
            .to_flat()
            .iter()
            .all(|x| x.abs() <= 1.0));
    }

    #[test]
    fn activation_maps_apply_elementwise() {
        let z = m(vec![vec![-1.0, 0.0, 2.0]]);
        assert_eq!(
            z.apply_activation(&ActivationFunction::ReLU),
            m(vec![vec![0.0, 0.0, 2.0]])
        );
        assert_eq!(
            z.apply_gradient(&ActivationFunction::ReLU),
            m(vec![vec![0.0, 0.0, 1.0]])
        );
    }
}
