//! Architecture configuration structures.
//!
//! Layer stacks can be described in JSON configuration files, enabling
//! architecture experimentation without code changes. A configuration is
//! parsed with serde, validated with descriptive per-layer messages, and
//! turned into a `Vec<Layer>` ready to hand to
//! [`NeuralNetwork::new`](crate::NeuralNetwork::new).

use serde::Deserialize;
use std::fs;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layer::{Dropout, Flatten, FullyConnected, Layer, Pool, PoolKind};

/// Configuration for a single layer.
///
/// `layer_type` selects the variant; the remaining fields are required or
/// ignored depending on it:
///
/// - **fully_connected**: requires `activation`, `units`, `input_dim`;
///   optional `seed`
/// - **dropout**: requires `keep_probability`; optional `seed`
/// - **flatten**: no parameters
/// - **pool**: requires `pool_type` ("max" or "average"), `size`, `stride`;
///   optional `padding` (default `[0, 0, 0]`)
///
/// # Example
///
/// ```json
/// {
///   "layer_type": "fully_connected",
///   "activation": "relu",
///   "units": 16,
///   "input_dim": 8
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LayerConfig {
    /// Type of layer: "fully_connected", "dropout", "flatten", or "pool".
    pub layer_type: String,

    /// Activation name for fully connected layers: "identity", "relu",
    /// "sigmoid", "softmax", or "tanh".
    pub activation: Option<String>,
    /// Number of units in a fully connected layer.
    pub units: Option<usize>,
    /// Input feature count of a fully connected layer.
    pub input_dim: Option<usize>,
    /// Seed for weight initialization or dropout masks.
    pub seed: Option<u64>,

    /// Keep probability for dropout layers, in (0.0, 1.0].
    pub keep_probability: Option<f64>,

    /// Pooling flavor: "max" or "average".
    pub pool_type: Option<String>,
    /// Pooling window extents along the three non-batch axes.
    pub size: Option<[usize; 3]>,
    /// Pooling strides along the three non-batch axes.
    pub stride: Option<[usize; 3]>,
    /// Pooling padding along the three non-batch axes (default 0).
    pub padding: Option<[usize; 3]>,
}

/// Configuration for an entire layer stack, applied in order.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchitectureConfig {
    /// Sequence of layer configurations defining the network structure.
    pub layers: Vec<LayerConfig>,
}

/// Load an architecture configuration from a JSON file and validate it.
pub fn load_architecture(path: &str) -> Result<ArchitectureConfig> {
    let contents = fs::read_to_string(path)?;
    let config: ArchitectureConfig = serde_json::from_str(&contents)?;
    validate_architecture(&config)?;
    Ok(config)
}

fn invalid(message: String) -> Error {
    Error::InvalidArchitecture(message)
}

fn parse_activation(name: &str, index: usize) -> Result<Activation> {
    match name.to_lowercase().as_str() {
        "identity" => Ok(Activation::Identity),
        "relu" => Ok(Activation::ReLU),
        "sigmoid" => Ok(Activation::Sigmoid),
        "softmax" => Ok(Activation::Softmax),
        "tanh" => Ok(Activation::Tanh),
        other => Err(invalid(format!(
            "Layer {}: unknown activation '{}'",
            index, other
        ))),
    }
}

fn parse_pool_kind(name: &str, index: usize) -> Result<PoolKind> {
    match name.to_lowercase().as_str() {
        "max" => Ok(PoolKind::Max),
        "average" => Ok(PoolKind::Average),
        other => Err(invalid(format!(
            "Layer {}: unknown pool type '{}'",
            index, other
        ))),
    }
}

/// Validate a configuration: at least one layer, every layer carries the
/// fields its type requires, and values are within range.
fn validate_architecture(config: &ArchitectureConfig) -> Result<()> {
    if config.layers.is_empty() {
        return Err(invalid(
            "architecture must have at least one layer".to_string(),
        ));
    }
    for (index, layer) in config.layers.iter().enumerate() {
        validate_layer(layer, index)?;
    }
    Ok(())
}

fn validate_layer(layer: &LayerConfig, index: usize) -> Result<()> {
    match layer.layer_type.to_lowercase().as_str() {
        "fully_connected" => {
            let activation = layer.activation.as_deref().ok_or_else(|| {
                invalid(format!(
                    "Layer {}: fully_connected layer requires 'activation'",
                    index
                ))
            })?;
            parse_activation(activation, index)?;
            match layer.units {
                None => {
                    return Err(invalid(format!(
                        "Layer {}: fully_connected layer requires 'units'",
                        index
                    )))
                }
                Some(0) => {
                    return Err(invalid(format!(
                        "Layer {}: units must be greater than 0",
                        index
                    )))
                }
                Some(_) => {}
            }
            match layer.input_dim {
                None => {
                    return Err(invalid(format!(
                        "Layer {}: fully_connected layer requires 'input_dim'",
                        index
                    )))
                }
                Some(0) => {
                    return Err(invalid(format!(
                        "Layer {}: input_dim must be greater than 0",
                        index
                    )))
                }
                Some(_) => {}
            }
        }
        "dropout" => match layer.keep_probability {
            None => {
                return Err(invalid(format!(
                    "Layer {}: dropout layer requires 'keep_probability'",
                    index
                )))
            }
            Some(p) if !(p > 0.0 && p <= 1.0) => {
                return Err(invalid(format!(
                    "Layer {}: keep_probability must be in (0.0, 1.0]",
                    index
                )))
            }
            Some(_) => {}
        },
        "flatten" => {}
        "pool" => {
            let pool_type = layer.pool_type.as_deref().ok_or_else(|| {
                invalid(format!("Layer {}: pool layer requires 'pool_type'", index))
            })?;
            parse_pool_kind(pool_type, index)?;
            let size = layer
                .size
                .ok_or_else(|| invalid(format!("Layer {}: pool layer requires 'size'", index)))?;
            let stride = layer
                .stride
                .ok_or_else(|| invalid(format!("Layer {}: pool layer requires 'stride'", index)))?;
            if size.contains(&0) || stride.contains(&0) {
                return Err(invalid(format!(
                    "Layer {}: pool size and stride must be greater than 0",
                    index
                )));
            }
        }
        other => {
            return Err(invalid(format!(
                "Layer {}: invalid layer type '{}'. Must be one of: fully_connected, dropout, flatten, pool",
                index, other
            )));
        }
    }
    Ok(())
}

/// Build the layer stack described by `config`.
pub fn build_layers(config: &ArchitectureConfig) -> Result<Vec<Layer>> {
    validate_architecture(config)?;

    let mut layers = Vec::with_capacity(config.layers.len());
    for (index, layer_config) in config.layers.iter().enumerate() {
        let layer = match layer_config.layer_type.to_lowercase().as_str() {
            "fully_connected" => {
                let activation = parse_activation(
                    layer_config.activation.as_deref().unwrap_or_default(),
                    index,
                )?;
                let units = layer_config.units.unwrap_or_default();
                let input_dim = layer_config.input_dim.unwrap_or_default();
                let layer = match layer_config.seed {
                    Some(seed) => FullyConnected::with_seed(activation, units, input_dim, seed)?,
                    None => FullyConnected::new(activation, units, input_dim)?,
                };
                Layer::from(layer)
            }
            "dropout" => {
                let keep = layer_config.keep_probability.unwrap_or_default();
                let layer = match layer_config.seed {
                    Some(seed) => Dropout::with_seed(keep, seed)?,
                    None => Dropout::new(keep)?,
                };
                Layer::from(layer)
            }
            "flatten" => Layer::from(Flatten::new()),
            _ => {
                let kind =
                    parse_pool_kind(layer_config.pool_type.as_deref().unwrap_or_default(), index)?;
                let size = layer_config.size.unwrap_or_default();
                let stride = layer_config.stride.unwrap_or_default();
                let padding = layer_config.padding.unwrap_or([0, 0, 0]);
                Layer::from(Pool::new(kind, size, stride, padding)?)
            }
        };
        layers.push(layer);
    }
    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fully_connected_config(units: Option<usize>, input_dim: Option<usize>) -> LayerConfig {
        LayerConfig {
            layer_type: "fully_connected".to_string(),
            activation: Some("relu".to_string()),
            units,
            input_dim,
            seed: None,
            keep_probability: None,
            pool_type: None,
            size: None,
            stride: None,
            padding: None,
        }
    }

    #[test]
    fn test_validate_fully_connected() {
        let config = ArchitectureConfig {
            layers: vec![fully_connected_config(Some(4), Some(8))],
        };
        assert!(validate_architecture(&config).is_ok());
    }

    #[test]
    fn test_validate_missing_units() {
        let config = ArchitectureConfig {
            layers: vec![fully_connected_config(None, Some(8))],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_empty_architecture() {
        let config = ArchitectureConfig { layers: vec![] };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_validate_unknown_layer_type() {
        let mut layer = fully_connected_config(Some(4), Some(8));
        layer.layer_type = "convolution".to_string();
        let config = ArchitectureConfig {
            layers: vec![layer],
        };
        assert!(matches!(
            validate_architecture(&config),
            Err(Error::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn test_validate_dropout_probability_range() {
        let layer = LayerConfig {
            layer_type: "dropout".to_string(),
            activation: None,
            units: None,
            input_dim: None,
            seed: None,
            keep_probability: Some(0.0),
            pool_type: None,
            size: None,
            stride: None,
            padding: None,
        };
        let config = ArchitectureConfig {
            layers: vec![layer],
        };
        assert!(validate_architecture(&config).is_err());
    }

    #[test]
    fn test_build_layers_mixed_stack() {
        let json = r#"{
  "layers": [
    {
      "layer_type": "pool",
      "pool_type": "max",
      "size": [1, 2, 2],
      "stride": [1, 2, 2]
    },
    { "layer_type": "flatten" },
    {
      "layer_type": "fully_connected",
      "activation": "sigmoid",
      "units": 1,
      "input_dim": 4,
      "seed": 7
    }
  ]
}"#;
        let config: ArchitectureConfig = serde_json::from_str(json).unwrap();
        let layers = build_layers(&config).unwrap();

        assert_eq!(layers.len(), 3);
        assert!(matches!(layers[0], Layer::Pool(_)));
        assert!(matches!(layers[1], Layer::Flatten(_)));
        assert!(matches!(layers[2], Layer::FullyConnected(_)));
    }

    #[test]
    fn test_build_layers_same_seed_reproducible() {
        let mut layer = fully_connected_config(Some(4), Some(8));
        layer.seed = Some(11);
        let config = ArchitectureConfig {
            layers: vec![layer],
        };

        let a = build_layers(&config).unwrap();
        let b = build_layers(&config).unwrap();
        match (&a[0], &b[0]) {
            (Layer::FullyConnected(x), Layer::FullyConnected(y)) => {
                assert_eq!(x.weights(), y.weights());
            }
            _ => panic!("expected fully connected layers"),
        }
    }
}
