use dense_trainer::{ActivationFunction, DataSet, LayerSpec, Matrix, Network, NetworkSpec, TrainConfig};

fn main() -> dense_trainer::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let spec = NetworkSpec::new(
        vec![
            LayerSpec::new(2, 4, ActivationFunction::Tanh),
            LayerSpec::new(4, 1, ActivationFunction::Sigmoid),
        ],
        0.5,
    )
    .with_seed(7);
    let mut network = Network::from_spec(&spec)?;

    let inputs = Matrix::from_rows(vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ])?;
    let expected_outputs = Matrix::from_rows(vec![vec![1.0], vec![0.0], vec![1.0], vec![0.0]])?;
    let dataset = DataSet::new(inputs.clone(), expected_outputs)?;

    let config = TrainConfig::new(10_000, 4).with_log_interval(1000);
    network.train_with(&dataset, &config)?;

    let predictions = network.predict(&inputs)?;
    for (input, output) in inputs.data().iter().zip(predictions.data()) {
        println!("Input: {:?} -> Output: {:.4}", input, output[0]);
    }
    Ok(())
}
