//! Saved models must reproduce the original network's predictions exactly.

use std::path::PathBuf;

use dense_trainer::{
    ActivationFunction, DataSet, Error, LayerSpec, Matrix, Network, NetworkSpec, WeightInit,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dense_trainer_{}_{}", std::process::id(), name))
}

fn trained_network() -> Network {
    let spec = NetworkSpec::new(
        vec![
            LayerSpec::new(3, 5, ActivationFunction::Tanh),
            LayerSpec::new(5, 4, ActivationFunction::leaky_relu()),
            LayerSpec::new(4, 2, ActivationFunction::Linear),
        ],
        0.05,
    )
    .with_seed(99);
    let mut network = Network::from_spec(&spec).unwrap();

    let x = Matrix::from_rows(vec![
        vec![0.1, 0.2, 0.3],
        vec![-0.4, 0.5, 0.9],
        vec![1.0, -1.0, 0.0],
        vec![0.3, 0.3, -0.7],
    ])
    .unwrap();
    let y = Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5], vec![-1.0, 2.0]]).unwrap();
    network.train(&DataSet::new(x, y).unwrap(), 20, 2).unwrap();
    network
}

fn probe() -> Matrix {
    Matrix::from_rows(vec![vec![0.25, -0.125, 3.0], vec![1e-3, 7.5, -2.25]]).unwrap()
}

#[test]
fn file_round_trip_preserves_predictions() {
    let network = trained_network();
    let path = temp_path("model.json");

    network.save_json(&path).unwrap();
    let loaded = Network::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.predict(&probe()).unwrap(), network.predict(&probe()).unwrap());
    assert_eq!(loaded.learning_rate(), network.learning_rate());
    assert_eq!(loaded.layer_count(), 3);
    for (a, b) in loaded.layers().iter().zip(network.layers()) {
        assert_eq!(a.activation(), b.activation());
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }
}

#[test]
fn writer_round_trip_preserves_predictions() {
    let network = trained_network();
    let mut buf = Vec::new();
    network.write_json(&mut buf).unwrap();
    let loaded = Network::read_json(buf.as_slice()).unwrap();
    assert_eq!(loaded.predict(&probe()).unwrap(), network.predict(&probe()).unwrap());
}

#[test]
fn loading_a_missing_file_is_an_io_error() {
    let err = Network::load_json(temp_path("does_not_exist.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn garbage_is_a_json_error() {
    let err = Network::read_json(&b"not a model"[..]).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn spec_file_round_trip() {
    let spec = NetworkSpec {
        name: "and-gate".into(),
        ..NetworkSpec::new(
            vec![
                LayerSpec::new(2, 4, ActivationFunction::Sigmoid),
                LayerSpec::new(4, 1, ActivationFunction::Sigmoid),
            ],
            0.1,
        )
    }
    .with_init(WeightInit::Uniform)
    .with_seed(5);

    let path = temp_path("spec.json");
    spec.save_json(&path).unwrap();
    let loaded = NetworkSpec::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, spec);
    let a = Network::from_spec(&spec).unwrap();
    let b = Network::from_spec(&loaded).unwrap();
    assert_eq!(a.layers()[0].weights(), b.layers()[0].weights());
    assert!(a.layers()[0].weights().to_flat().iter().all(|&w| w >= 0.0));
}
