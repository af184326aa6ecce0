use crate::error::Result;
use crate::math::matrix::Matrix;

/// Mean-squared error over a batch of `m` rows.
pub struct MseLoss;

impl MseLoss {
    /// Scalar cost: `(1/m) · sum((expected - predicted)²)`.
    pub fn cost(expected: &Matrix, predicted: &Matrix) -> Result<f64> {
        let m = expected.rows().max(1) as f64;
        Ok(expected.sub(predicted)?.pow(2).sum() / m)
    }

    /// Negative gradient of `cost` with respect to `predicted`:
    /// `(2/m) · (expected - predicted)`, shape `[m, outputs]`.
    pub fn negative_gradient(expected: &Matrix, predicted: &Matrix) -> Result<Matrix> {
        let m = expected.rows().max(1) as f64;
        Ok(expected.sub(predicted)?.mul_scalar(2.0 / m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cost_is_mean_of_squared_errors() {
        let y = Matrix::from_rows(vec![vec![1.0], vec![0.0]]).unwrap();
        let a = Matrix::from_rows(vec![vec![0.5], vec![0.5]]).unwrap();
        assert_abs_diff_eq!(MseLoss::cost(&y, &a).unwrap(), 0.25);
        assert_abs_diff_eq!(MseLoss::cost(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn negative_gradient_matches_finite_difference() {
        let y = Matrix::from_rows(vec![vec![1.0, -1.0], vec![0.0, 2.0]]).unwrap();
        let a = Matrix::from_rows(vec![vec![0.3, 0.1], vec![0.2, 1.5]]).unwrap();
        let g = MseLoss::negative_gradient(&y, &a).unwrap();

        let h = 1e-6;
        let base = MseLoss::cost(&y, &a).unwrap();
        let mut bumped = a.data().to_vec();
        bumped[1][0] += h;
        let bumped = Matrix::from_rows(bumped).unwrap();
        let numeric = (MseLoss::cost(&y, &bumped).unwrap() - base) / h;
        assert_abs_diff_eq!(g.get(1, 0).unwrap(), -numeric, epsilon = 1e-5);
    }

    #[test]
    fn mismatched_shapes_fail() {
        assert!(MseLoss::cost(&Matrix::ones(2, 1), &Matrix::ones(1, 2)).is_err());
    }
}
