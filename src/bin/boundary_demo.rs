//! Demo: a one-unit sigmoid classifier for the boundary x0 + 2*x1 - 3 >= 0.
//!
//! Builds the fixed-parameter layer, evaluates it on a small grid of points,
//! then trains the same architecture from scratch and prints the epoch cost
//! series and the learned parameters.

use tensornet::{
    Activation, Cost, FullyConnected, Layer, NeuralNetwork, Optimizer, Result, Tensor,
};

fn main() -> Result<()> {
    // A 3x3 grid of points around the decision boundary, one point per row.
    let features = Tensor::from_rows(&[
        vec![-5.0, -5.0],
        vec![-5.0, 0.0],
        vec![-5.0, 5.0],
        vec![0.0, -5.0],
        vec![0.0, 0.0],
        vec![0.0, 5.0],
        vec![5.0, -5.0],
        vec![5.0, 0.0],
        vec![5.0, 5.0],
    ])?;
    let labels = Tensor::from_rows(&[
        vec![0.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![1.0],
    ])?;

    // Fixed parameters modeling the boundary exactly.
    let weights = Tensor::from_rows(&[vec![1.0], vec![2.0]])?;
    let bias = Tensor::constant(-3.0);
    let fixed = FullyConnected::from_parameters(Activation::Sigmoid, weights, bias)?;
    let network = NeuralNetwork::new(
        vec![Layer::from(fixed)],
        Cost::CrossEntropy,
        Optimizer::gradient_descent(0.12),
    );

    println!("Fixed-parameter network");
    println!("-----------------------");
    println!("Labels:");
    println!("{}", labels.transpose()?);
    println!("Predictions:");
    println!("{}", network.predict(&features)?.transpose()?);
    println!("Cost: {:.6}", network.evaluate(&features, &labels)?);
    println!();

    // The same architecture trained from scratch.
    let untrained = FullyConnected::new(Activation::Sigmoid, 1, 2)?;
    let mut trainable = NeuralNetwork::new(
        vec![Layer::from(untrained)],
        Cost::CrossEntropy,
        Optimizer::adam(0.06, 0.9, 0.999)?,
    );

    let epochs = 100;
    let costs = trainable.train(&features, &labels, epochs)?;

    println!("Trained network");
    println!("---------------");
    println!("Cost at epoch 0:   {:.6}", costs[0]);
    println!("Cost at epoch {}: {:.6}", epochs - 1, costs[epochs - 1]);
    println!("Predictions:");
    println!("{}", trainable.predict(&features)?.transpose()?);
    println!("Cost: {:.6}", trainable.evaluate(&features, &labels)?);
    println!();
    println!("{}", trainable);

    Ok(())
}
