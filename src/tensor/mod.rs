//! Dense tensor values and their arithmetic.
//!
//! [`Tensor`] is an immutable multi-dimensional container of `f64` values in
//! a flat row-major buffer. Rank-2 tensors (batch rows x feature columns)
//! carry ordinary network data; rank-4 tensors (batch x three spatial-style
//! axes) carry data for flatten/pool layers.
//!
//! Element-wise binary operations broadcast in the numpy style: shapes are
//! aligned from the trailing dimension, and a dimension of 1 stretches to
//! match its partner. Instead of materializing broadcasted copies, both
//! operands are read through modulo addressing ([`Tensor::value_broadcast`]),
//! which sources the right element whenever the shapes passed the
//! compatibility check.
//!
//! Every operation returns a freshly allocated tensor; inputs are never
//! mutated and result buffers never alias input buffers.

pub mod init;

use std::fmt;

use crate::error::{Error, Result};

/// Immutable dense tensor of `f64` values.
///
/// # Invariants
///
/// * Every dimension is strictly positive.
/// * `values().len()` equals the product of the dimensions.
/// * Only ranks 2 and 4 can be constructed.
///
/// # Example
///
/// ```
/// use tensornet::Tensor;
///
/// let a = Tensor::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// let b = Tensor::constant(10.0);
/// let sum = a.add(&b).unwrap();
/// assert_eq!(sum.values(), &[11.0, 12.0, 13.0, 14.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    /// Construct a tensor from a shape and a flat row-major value buffer.
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        validate_shape(&shape)?;
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(Error::Construction(format!(
                "shape {:?} requires {} values, found {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            shape,
            data: values,
        })
    }

    /// Construct a rank-2 tensor from nested rows.
    ///
    /// Fails if there are no rows, a row is empty, or the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(Error::Construction(
                "tensor dimensions must be positive".to_string(),
            ));
        }
        let ncols = rows[0].len();
        let mut data = Vec::with_capacity(rows.len() * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(Error::Construction(
                    "tensor input rows must be rectangular".to_string(),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: vec![rows.len(), ncols],
            data,
        })
    }

    /// Construct a zero-filled tensor of the given shape.
    pub fn zeros(shape: Vec<usize>) -> Result<Self> {
        validate_shape(&shape)?;
        let len = shape.iter().product();
        Ok(Self {
            shape,
            data: vec![0.0; len],
        })
    }

    /// A 1x1 tensor holding `value`; broadcasts against any shape.
    pub fn constant(value: f64) -> Self {
        Self {
            shape: vec![1, 1],
            data: vec![value],
        }
    }

    /// A 1x1 tensor holding 0.0.
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    /// A 1x1 tensor holding 1.0.
    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// The tensor's dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions (2 or 4).
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The flat row-major value buffer.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Bounds-checked read at an exact position.
    pub fn value(&self, index: &[usize]) -> Result<f64> {
        if index.len() != self.rank() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return Err(Error::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(self.data[flat_offset(&self.shape, index)])
    }

    /// Tolerant read used for broadcast-compatible access.
    ///
    /// The trailing `rank()` entries of `index` are taken modulo the
    /// corresponding dimension sizes, so a size-1 axis repeats its single
    /// element and a lower-rank tensor can be read with the coordinates of a
    /// higher-rank result without allocating a broadcasted copy. Missing
    /// leading coordinates are treated as 0.
    pub fn value_broadcast(&self, index: &[usize]) -> f64 {
        let rank = self.rank();
        let mut offset = 0;
        for (axis, &dim) in self.shape.iter().enumerate() {
            let position = if index.len() + axis >= rank {
                index[index.len() + axis - rank]
            } else {
                0
            };
            offset = offset * dim + position % dim;
        }
        self.data[offset]
    }

    // ---- element-wise binary operations ----

    /// Broadcasted element-wise addition.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "add", |a, b| a + b)
    }

    /// Broadcasted element-wise subtraction.
    pub fn subtract(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "subtract", |a, b| a - b)
    }

    /// Broadcasted element-wise multiplication.
    pub fn multiply(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "multiply", |a, b| a * b)
    }

    /// Broadcasted element-wise division.
    pub fn divide(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "divide", |a, b| a / b)
    }

    /// Broadcasted element-wise exponentiation (`self ^ other`).
    pub fn power(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "power", f64::powf)
    }

    /// Broadcasted element-wise `>=` indicator: 1.0 where
    /// `self >= other`, otherwise 0.0.
    pub fn at_least(&self, other: &Tensor) -> Result<Tensor> {
        self.broadcast_with(other, "at_least", |a, b| if a >= b { 1.0 } else { 0.0 })
    }

    // ---- element-wise unary operations ----

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Element-wise `e^x`.
    pub fn exp(&self) -> Tensor {
        self.map(f64::exp)
    }

    /// Element-wise natural logarithm.
    pub fn log(&self) -> Tensor {
        self.map(f64::ln)
    }

    /// Element-wise negation.
    pub fn negate(&self) -> Tensor {
        self.map(|v| -v)
    }

    /// Element-wise `max(0, x)`.
    pub fn relu(&self) -> Tensor {
        self.map(|v| v.max(0.0))
    }

    /// Element-wise logistic function `1 / (1 + e^-x)`.
    pub fn sigmoid(&self) -> Tensor {
        self.map(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Element-wise hyperbolic tangent.
    pub fn tanh(&self) -> Tensor {
        self.map(f64::tanh)
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Tensor {
        self.map(f64::abs)
    }

    // ---- shape-specific kernels ----

    /// Matrix product of two rank-2 tensors.
    ///
    /// Requires `self.cols == other.rows`.
    pub fn matrix_multiply(&self, other: &Tensor) -> Result<Tensor> {
        self.expect_rank(2, "matrix_multiply")?;
        other.expect_rank(2, "matrix_multiply")?;
        let (m, k) = (self.shape[0], self.shape[1]);
        let (k2, n) = (other.shape[0], other.shape[1]);
        if k != k2 {
            return Err(Error::IncompatibleShapes {
                op: "matrix_multiply",
                left: self.shape.clone(),
                right: other.shape.clone(),
            });
        }

        let mut data = vec![0.0; m * n];
        for i in 0..m {
            for p in 0..k {
                let a = self.data[i * k + p];
                let row = &other.data[p * n..(p + 1) * n];
                let out = &mut data[i * n..(i + 1) * n];
                for (o, &b) in out.iter_mut().zip(row) {
                    *o += a * b;
                }
            }
        }
        Ok(Tensor {
            shape: vec![m, n],
            data,
        })
    }

    /// Transpose of a rank-2 tensor.
    pub fn transpose(&self) -> Result<Tensor> {
        self.expect_rank(2, "transpose")?;
        let (m, n) = (self.shape[0], self.shape[1]);
        let mut data = vec![0.0; m * n];
        for i in 0..m {
            for j in 0..n {
                data[j * m + i] = self.data[i * n + j];
            }
        }
        Ok(Tensor {
            shape: vec![n, m],
            data,
        })
    }

    /// Sum each row of a rank-2 tensor, producing an `m x 1` tensor.
    pub fn row_sum(&self) -> Result<Tensor> {
        self.expect_rank(2, "row_sum")?;
        let (m, n) = (self.shape[0], self.shape[1]);
        let data = (0..m)
            .map(|i| self.data[i * n..(i + 1) * n].iter().sum())
            .collect();
        Ok(Tensor {
            shape: vec![m, 1],
            data,
        })
    }

    /// Sum each column of a rank-2 tensor, producing a `1 x n` tensor.
    pub fn column_sum(&self) -> Result<Tensor> {
        self.expect_rank(2, "column_sum")?;
        let (m, n) = (self.shape[0], self.shape[1]);
        let mut data = vec![0.0; n];
        for i in 0..m {
            for (sum, &v) in data.iter_mut().zip(&self.data[i * n..(i + 1) * n]) {
                *sum += v;
            }
        }
        Ok(Tensor {
            shape: vec![1, n],
            data,
        })
    }

    /// Sum of every element.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Reinterpret the buffer under a new shape of equal element count.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Tensor> {
        validate_shape(&shape)?;
        let expected: usize = shape.iter().product();
        if expected != self.data.len() {
            return Err(Error::Construction(format!(
                "cannot reshape {} values into shape {:?}",
                self.data.len(),
                shape
            )));
        }
        Ok(Tensor {
            shape,
            data: self.data.clone(),
        })
    }

    // ---- internals ----

    fn expect_rank(&self, expected: usize, op: &'static str) -> Result<()> {
        if self.rank() != expected {
            return Err(Error::RankMismatch {
                op,
                expected,
                found: self.shape.clone(),
            });
        }
        Ok(())
    }

    fn broadcast_with(
        &self,
        other: &Tensor,
        op: &'static str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Tensor> {
        let shape = broadcast_shape(&self.shape, &other.shape).ok_or_else(|| {
            Error::IncompatibleShapes {
                op,
                left: self.shape.clone(),
                right: other.shape.clone(),
            }
        })?;

        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        let mut index = vec![0usize; shape.len()];
        loop {
            data.push(f(self.value_broadcast(&index), other.value_broadcast(&index)));
            if !advance_index(&mut index, &shape) {
                break;
            }
        }
        Ok(Tensor { shape, data })
    }
}

/// Compute the broadcast result shape, or `None` when the shapes clash.
///
/// Shapes align from the trailing dimension; two dimensions are compatible
/// when they are equal or either is 1, and the result takes the larger one.
fn broadcast_shape(left: &[usize], right: &[usize]) -> Option<Vec<usize>> {
    let rank = left.len().max(right.len());
    let mut shape = vec![1; rank];
    for i in 0..rank {
        let l = if i < left.len() {
            left[left.len() - 1 - i]
        } else {
            1
        };
        let r = if i < right.len() {
            right[right.len() - 1 - i]
        } else {
            1
        };
        if l != r && l != 1 && r != 1 {
            return None;
        }
        shape[rank - 1 - i] = l.max(r);
    }
    Some(shape)
}

/// Advance a multi-dimensional index in row-major order.
///
/// Returns false once the index has wrapped past the final position.
fn advance_index(index: &mut [usize], shape: &[usize]) -> bool {
    for axis in (0..shape.len()).rev() {
        index[axis] += 1;
        if index[axis] < shape[axis] {
            return true;
        }
        index[axis] = 0;
    }
    false
}

fn flat_offset(shape: &[usize], index: &[usize]) -> usize {
    let mut offset = 0;
    for (&dim, &position) in shape.iter().zip(index) {
        offset = offset * dim + position;
    }
    offset
}

fn validate_shape(shape: &[usize]) -> Result<()> {
    if shape.len() != 2 && shape.len() != 4 {
        return Err(Error::Construction(format!(
            "only rank-2 and rank-4 tensors are supported, found shape {:?}",
            shape
        )));
    }
    if shape.iter().any(|&d| d == 0) {
        return Err(Error::Construction(format!(
            "tensor dimensions must be positive, found shape {:?}",
            shape
        )));
    }
    Ok(())
}

impl fmt::Display for Tensor {
    /// Fixed three-decimal rendering; rank-4 tensors print one spatial block
    /// per (batch, channel) pair.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape.len() {
            2 => {
                let (m, n) = (self.shape[0], self.shape[1]);
                for i in 0..m {
                    for j in 0..n {
                        write!(f, "{:.3} ", self.data[i * n + j])?;
                    }
                    if i != m - 1 {
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
            _ => {
                let (d0, d1, d2, d3) = (self.shape[0], self.shape[1], self.shape[2], self.shape[3]);
                for i in 0..d0 {
                    for j in 0..d1 {
                        writeln!(f, "({}, {})", i, j)?;
                        for k in 0..d2 {
                            for l in 0..d3 {
                                write!(f, "{:.3} ", self.data[((i * d1 + j) * d2 + k) * d3 + l])?;
                            }
                            writeln!(f)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
