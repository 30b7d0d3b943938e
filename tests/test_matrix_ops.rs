// Tests for the rank-2 matrix kernels: multiply, transpose, and axis sums.

use approx::assert_relative_eq;
use tensornet::tensor::init;
use tensornet::Tensor;

#[test]
fn test_matrix_multiply_known_product() {
    // 2x3 * 3x2 = 2x2
    let a = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let b = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();

    let c = a.matrix_multiply(&b).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_eq!(c.values(), &[22.0, 28.0, 49.0, 64.0]);
}

#[test]
fn test_matrix_multiply_identity() {
    let a = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    let identity = Tensor::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    assert_eq!(a.matrix_multiply(&identity).unwrap(), a);
}

#[test]
fn test_product_transpose_identity() {
    // (A * B)^T == B^T * A^T for random matrices.
    let a = init::gaussian(4, 6, 1.0, 101).unwrap();
    let b = init::gaussian(6, 3, 1.0, 202).unwrap();

    let left = a.matrix_multiply(&b).unwrap().transpose().unwrap();
    let right = b
        .transpose()
        .unwrap()
        .matrix_multiply(&a.transpose().unwrap())
        .unwrap();

    assert_eq!(left.shape(), right.shape());
    for (&x, &y) in left.values().iter().zip(right.values()) {
        assert_relative_eq!(x, y, epsilon = 1e-9);
    }
}

#[test]
fn test_matrix_multiply_associates_with_sums() {
    // column_sum(A * B) == column_sum over rows of per-row products; a cheap
    // sanity check tying the kernels together: 1^T (A B) = (1^T A) B.
    let a = init::gaussian(5, 4, 1.0, 7).unwrap();
    let b = init::gaussian(4, 2, 1.0, 8).unwrap();

    let direct = a.matrix_multiply(&b).unwrap().column_sum().unwrap();
    let folded = a.column_sum().unwrap().matrix_multiply(&b).unwrap();

    for (&x, &y) in direct.values().iter().zip(folded.values()) {
        assert_relative_eq!(x, y, epsilon = 1e-9);
    }
}

#[test]
fn test_row_sum_collapses_columns() {
    let t = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let sums = t.row_sum().unwrap();
    assert_eq!(sums.shape(), &[2, 1]);
    assert_eq!(sums.values(), &[6.0, 15.0]);
}

#[test]
fn test_column_sum_collapses_rows() {
    let t = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let sums = t.column_sum().unwrap();
    assert_eq!(sums.shape(), &[1, 3]);
    assert_eq!(sums.values(), &[5.0, 7.0, 9.0]);
}

#[test]
fn test_transpose_swaps_axes() {
    let t = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    let tt = t.transpose().unwrap();

    assert_eq!(tt.shape(), &[3, 2]);
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(t.value(&[i, j]).unwrap(), tt.value(&[j, i]).unwrap());
        }
    }
}

#[test]
fn test_matrix_multiply_shape_errors() {
    let a = Tensor::zeros(vec![2, 3]).unwrap();
    let b = Tensor::zeros(vec![4, 2]).unwrap();
    assert!(a.matrix_multiply(&b).is_err());

    let rank4 = Tensor::zeros(vec![1, 1, 2, 2]).unwrap();
    assert!(a.matrix_multiply(&rank4).is_err());
}
