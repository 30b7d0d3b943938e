// Finite-difference checks of the cost derivatives.
//
// Each prediction entry is nudged by +/- epsilon and the resulting central
// difference of the scalar cost is compared against the corresponding entry
// of the derivative tensor. The derivative tensors deliberately drop the
// 1/m batch factor, so the comparison multiplies it back in.

use approx::assert_relative_eq;
use tensornet::{Cost, Tensor};

const EPSILON: f64 = 1e-6;

fn numerical_gradient(cost: Cost, prediction: &Tensor, truth: &Tensor, row: usize, col: usize) -> f64 {
    let perturb = |delta: f64| {
        let values: Vec<f64> = prediction
            .values()
            .iter()
            .enumerate()
            .map(|(position, &v)| {
                if position == row * prediction.shape()[1] + col {
                    v + delta
                } else {
                    v
                }
            })
            .collect();
        let perturbed = Tensor::new(prediction.shape().to_vec(), values).unwrap();
        cost.cost(&perturbed, truth).unwrap()
    };
    (perturb(EPSILON) - perturb(-EPSILON)) / (2.0 * EPSILON)
}

fn check_gradients(cost: Cost, prediction: &Tensor, truth: &Tensor) {
    let m = prediction.shape()[0] as f64;
    let analytical = cost.derivative(prediction, truth).unwrap();

    for row in 0..prediction.shape()[0] {
        for col in 0..prediction.shape()[1] {
            let numerical = numerical_gradient(cost, prediction, truth, row, col);
            let expected = analytical.value(&[row, col]).unwrap() / m;
            assert_relative_eq!(numerical, expected, epsilon = 1e-4, max_relative = 1e-4);
        }
    }
}

#[test]
fn test_least_squares_gradient_matches_finite_difference() {
    let prediction =
        Tensor::from_rows(&[vec![0.2, -1.3], vec![2.5, 0.0], vec![-0.7, 1.1]]).unwrap();
    let truth = Tensor::from_rows(&[vec![0.0, -1.0], vec![2.0, 0.5], vec![-1.0, 1.0]]).unwrap();

    check_gradients(Cost::LeastSquares, &prediction, &truth);
}

#[test]
fn test_cross_entropy_gradient_matches_finite_difference() {
    // Probabilities kept away from 0 and 1 so the finite differences stay
    // well conditioned.
    let prediction = Tensor::from_rows(&[vec![0.3], vec![0.8], vec![0.55]]).unwrap();
    let truth = Tensor::from_rows(&[vec![0.0], vec![1.0], vec![1.0]]).unwrap();

    check_gradients(Cost::CrossEntropy, &prediction, &truth);
}

#[test]
fn test_cross_entropy_gradient_multicolumn() {
    let prediction = Tensor::from_rows(&[vec![0.25, 0.75], vec![0.6, 0.4]]).unwrap();
    let truth = Tensor::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();

    check_gradients(Cost::CrossEntropy, &prediction, &truth);
}
