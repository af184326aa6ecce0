use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::matrix::Matrix;

/// How a freshly constructed layer draws its weights and bias.
/// The two variants are not interchangeable: `Uniform` starts every weight
/// positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform on `[-eps/2, eps/2)` with `eps = sqrt(6 / (fan_in + fan_out))`.
    #[default]
    SymmetricUniform,
    /// Uniform on `[0, 1)`. Every weight starts positive.
    Uniform,
}

impl WeightInit {
    /// Xavier-style bound for a layer with the given fan-in and fan-out.
    pub fn epsilon(input_size: usize, output_size: usize) -> f64 {
        (6.0 / (input_size + output_size) as f64).sqrt()
    }

    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        input_size: usize,
        output_size: usize,
        rows: usize,
        cols: usize,
    ) -> Matrix {
        match self {
            WeightInit::SymmetricUniform => {
                let eps = WeightInit::epsilon(input_size, output_size);
                Matrix::uniform_random_bounded_with(rng, eps, rows, cols)
            }
            WeightInit::Uniform => Matrix::uniform_random_with(rng, rows, cols),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn symmetric_init_stays_within_half_epsilon() {
        let mut rng = StdRng::seed_from_u64(3);
        let eps = WeightInit::epsilon(4, 2);
        let w = WeightInit::SymmetricUniform.sample(&mut rng, 4, 2, 2, 4);
        assert_eq!(w.shape(), (2, 4));
        assert!(w.to_flat().iter().all(|x| x.abs() <= eps / 2.0));
    }

    #[test]
    fn uniform_init_is_non_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WeightInit::Uniform.sample(&mut rng, 4, 2, 2, 4);
        assert!(w.to_flat().iter().all(|&x| x >= 0.0 && x < 1.0));
    }
}
