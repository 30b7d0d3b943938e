// Tests for loading and building layer stacks from JSON configuration.

use std::io::Write;

use tempfile::NamedTempFile;
use tensornet::architecture::{build_layers, load_architecture, ArchitectureConfig};
use tensornet::{Cost, Error, Layer, NeuralNetwork, Optimizer, Tensor};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_valid_architecture() {
    let file = write_config(
        r#"{
  "layers": [
    {
      "layer_type": "fully_connected",
      "activation": "relu",
      "units": 4,
      "input_dim": 2
    },
    {
      "layer_type": "dropout",
      "keep_probability": 0.8
    },
    {
      "layer_type": "fully_connected",
      "activation": "sigmoid",
      "units": 1,
      "input_dim": 4
    }
  ]
}"#,
    );

    let config = load_architecture(file.path().to_str().unwrap()).unwrap();
    assert_eq!(config.layers.len(), 3);
    assert_eq!(config.layers[0].layer_type, "fully_connected");
    assert_eq!(config.layers[0].units, Some(4));
    assert_eq!(config.layers[1].keep_probability, Some(0.8));
}

#[test]
fn test_load_missing_file() {
    assert!(matches!(
        load_architecture("does/not/exist.json"),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_load_invalid_json() {
    let file = write_config("{ not json ]");
    assert!(matches!(
        load_architecture(file.path().to_str().unwrap()),
        Err(Error::Parse(_))
    ));
}

#[test]
fn test_load_rejects_unknown_layer_type() {
    let file = write_config(
        r#"{ "layers": [ { "layer_type": "recurrent" } ] }"#,
    );
    assert!(matches!(
        load_architecture(file.path().to_str().unwrap()),
        Err(Error::InvalidArchitecture(_))
    ));
}

#[test]
fn test_load_rejects_missing_required_field() {
    let file = write_config(
        r#"{
  "layers": [
    { "layer_type": "fully_connected", "activation": "relu", "units": 4 }
  ]
}"#,
    );
    let error = load_architecture(file.path().to_str().unwrap()).unwrap_err();
    assert!(error.to_string().contains("input_dim"));
}

#[test]
fn test_build_and_train_configured_stack() {
    let file = write_config(
        r#"{
  "layers": [
    {
      "layer_type": "fully_connected",
      "activation": "sigmoid",
      "units": 1,
      "input_dim": 2,
      "seed": 2019
    }
  ]
}"#,
    );

    let config = load_architecture(file.path().to_str().unwrap()).unwrap();
    let layers = build_layers(&config).unwrap();
    let mut network = NeuralNetwork::new(
        layers,
        Cost::CrossEntropy,
        Optimizer::gradient_descent(0.12),
    );

    let features = Tensor::from_rows(&[vec![-5.0, -5.0], vec![5.0, 5.0]]).unwrap();
    let labels = Tensor::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
    let costs = network.train(&features, &labels, 50).unwrap();
    assert!(costs[49] < costs[0]);
}

#[test]
fn test_build_pool_defaults_padding() {
    let json = r#"{
  "layers": [
    {
      "layer_type": "pool",
      "pool_type": "average",
      "size": [1, 2, 2],
      "stride": [1, 2, 2]
    }
  ]
}"#;
    let config: ArchitectureConfig = serde_json::from_str(json).unwrap();
    let layers = build_layers(&config).unwrap();
    assert!(matches!(layers[0], Layer::Pool(_)));

    // A padded-by-default pool layer still pools correctly.
    let input = Tensor::new(vec![1, 1, 2, 2], vec![2.0, 4.0, 6.0, 8.0]).unwrap();
    let result = layers[0].forward(&input, true).unwrap();
    assert_eq!(result.activation.values(), &[5.0]);
}
