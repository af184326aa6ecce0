use serde::{Deserialize, Serialize};
use std::f64::consts::E;

/// Slope used by [`ActivationFunction::leaky_relu`].
pub const DEFAULT_LEAKY_SLOPE: f64 = 0.01;

/// Element-wise nonlinearity applied to a layer's pre-activation output.
///
/// Stateless; the serialized tag doubles as the activation identifier in
/// saved models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    #[serde(rename = "relu")]
    ReLU,
    #[serde(rename = "leaky_relu")]
    LeakyReLU { alpha: f64 },
    Tanh,
    Linear,
}

impl ActivationFunction {
    pub fn leaky_relu() -> ActivationFunction {
        ActivationFunction::LeakyReLU { alpha: DEFAULT_LEAKY_SLOPE }
    }

    pub fn value(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Linear => x,
        }
    }

    /// Derivative with respect to the pre-activation input `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.value(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::Linear => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SAMPLES: [f64; 9] = [-8.0, -2.5, -1.0, -0.1, 0.0, 0.1, 1.0, 2.5, 8.0];

    #[test]
    fn sigmoid_derivative_is_value_times_complement() {
        let f = ActivationFunction::Sigmoid;
        for x in SAMPLES {
            let v = f.value(x);
            assert_abs_diff_eq!(f.derivative(x), v * (1.0 - v), epsilon = 1e-15);
        }
        assert_abs_diff_eq!(f.value(0.0), 0.5);
    }

    #[test]
    fn relu_derivative_is_step() {
        let f = ActivationFunction::ReLU;
        for x in SAMPLES {
            let expected = if x > 0.0 { 1.0 } else { 0.0 };
            assert_eq!(f.derivative(x), expected);
            assert_eq!(f.value(x), x.max(0.0));
        }
    }

    #[test]
    fn leaky_relu_keeps_small_negative_slope() {
        let f = ActivationFunction::leaky_relu();
        assert_abs_diff_eq!(f.value(-2.0), -0.02);
        assert_eq!(f.derivative(-2.0), DEFAULT_LEAKY_SLOPE);
        assert_eq!(f.derivative(3.0), 1.0);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for f in [
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
            ActivationFunction::Linear,
        ] {
            for x in SAMPLES {
                let numeric = (f.value(x + h) - f.value(x - h)) / (2.0 * h);
                assert_abs_diff_eq!(f.derivative(x), numeric, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn serializes_with_stable_tags() {
        let json = serde_json::to_string(&ActivationFunction::ReLU).unwrap();
        assert_eq!(json, r#"{"kind":"relu"}"#);
        let leaky: ActivationFunction =
            serde_json::from_str(r#"{"kind":"leaky_relu","alpha":0.2}"#).unwrap();
        assert_eq!(leaky, ActivationFunction::LeakyReLU { alpha: 0.2 });
    }
}
