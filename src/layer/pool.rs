//! Pooling layer over rank-4 data.

use std::fmt;

use crate::error::{Error, Result};
use crate::layer::{BackpropResult, ForwardResult, GradientMap, LayerCache};
use crate::tensor::Tensor;

/// Pooling flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Max,
    Average,
}

/// Pooling layer parameterized by window size, stride, and padding along the
/// three non-batch axes of a rank-4 tensor.
///
/// Each output cell covers the window
/// `[j*stride - padding, j*stride - padding + size)` on its axis, clipped to
/// the input bounds. Max pooling takes the window maximum; average pooling
/// takes the window sum scaled by the nominal window volume (clipping does
/// not shrink the divisor).
#[derive(Debug, Clone)]
pub struct Pool {
    kind: PoolKind,
    size: [usize; 3],
    stride: [usize; 3],
    padding: [usize; 3],
}

impl Pool {
    /// Create a pooling layer. Every window and stride extent must be
    /// positive.
    pub fn new(
        kind: PoolKind,
        size: [usize; 3],
        stride: [usize; 3],
        padding: [usize; 3],
    ) -> Result<Self> {
        if size.contains(&0) || stride.contains(&0) {
            return Err(Error::Construction(format!(
                "pool size and stride must be positive, found size {:?}, stride {:?}",
                size, stride
            )));
        }
        Ok(Self {
            kind,
            size,
            stride,
            padding,
        })
    }

    /// The pooling flavor.
    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    fn output_shape(&self, input_shape: &[usize]) -> Result<[usize; 4]> {
        let mut shape = [input_shape[0], 0, 0, 0];
        for axis in 0..3 {
            let padded = input_shape[axis + 1] + 2 * self.padding[axis];
            if padded < self.size[axis] {
                return Err(Error::IncompatibleShapes {
                    op: "pool",
                    left: input_shape.to_vec(),
                    right: self.size.to_vec(),
                });
            }
            shape[axis + 1] = 1 + (padded - self.size[axis]) / self.stride[axis];
        }
        Ok(shape)
    }

    /// Clipped window bounds for output position `j` along `axis`.
    fn window(&self, axis: usize, j: usize, input_extent: usize) -> (usize, usize) {
        let start = j as isize * self.stride[axis] as isize - self.padding[axis] as isize;
        let lo = start.max(0) as usize;
        let hi = ((start + self.size[axis] as isize).max(0) as usize).min(input_extent);
        (lo, hi)
    }

    pub(crate) fn forward(&self, input: &Tensor) -> Result<ForwardResult> {
        if input.rank() != 4 {
            return Err(Error::RankMismatch {
                op: "pool forward",
                expected: 4,
                found: input.shape().to_vec(),
            });
        }
        let in_shape = [
            input.shape()[0],
            input.shape()[1],
            input.shape()[2],
            input.shape()[3],
        ];
        let out_shape = self.output_shape(input.shape())?;
        let factor = 1.0 / (self.size[0] * self.size[1] * self.size[2]) as f64;

        let mut data = vec![0.0; out_shape.iter().product()];
        let source = input.values();
        let mut position = 0;
        for i in 0..out_shape[0] {
            for j in 0..out_shape[1] {
                let (a1, a2) = self.window(0, j, in_shape[1]);
                for k in 0..out_shape[2] {
                    let (b1, b2) = self.window(1, k, in_shape[2]);
                    for l in 0..out_shape[3] {
                        let (c1, c2) = self.window(2, l, in_shape[3]);

                        let mut cell = 0.0;
                        match self.kind {
                            PoolKind::Max => {
                                let mut best = f64::NEG_INFINITY;
                                for a in a1..a2 {
                                    for b in b1..b2 {
                                        for c in c1..c2 {
                                            best = best.max(source[offset4(&in_shape, i, a, b, c)]);
                                        }
                                    }
                                }
                                if best > f64::NEG_INFINITY {
                                    cell = best;
                                }
                            }
                            PoolKind::Average => {
                                for a in a1..a2 {
                                    for b in b1..b2 {
                                        for c in c1..c2 {
                                            cell += source[offset4(&in_shape, i, a, b, c)];
                                        }
                                    }
                                }
                                cell *= factor;
                            }
                        }
                        data[position] = cell;
                        position += 1;
                    }
                }
            }
        }

        let cache = match self.kind {
            PoolKind::Max => LayerCache::MaxPool {
                input: input.clone(),
            },
            PoolKind::Average => LayerCache::AveragePool {
                input_shape: in_shape,
            },
        };

        Ok(ForwardResult {
            activation: Tensor::new(out_shape.to_vec(), data)?,
            cache,
        })
    }

    /// Backward pass.
    ///
    /// Average pooling spreads each upstream value uniformly over its
    /// (clipped) source window, scaled by the nominal window volume. Max
    /// pooling routes each upstream value to the first position holding the
    /// window maximum (strict `>` scan order); overlapping windows
    /// accumulate into the same input cell.
    pub(crate) fn backward(&self, upstream: &Tensor, cache: &LayerCache) -> Result<BackpropResult> {
        let (in_shape, input) = match (self.kind, cache) {
            (PoolKind::Max, LayerCache::MaxPool { input }) => {
                let s = input.shape();
                ([s[0], s[1], s[2], s[3]], Some(input))
            }
            (PoolKind::Average, LayerCache::AveragePool { input_shape }) => (*input_shape, None),
            _ => return Err(Error::CacheMismatch { expected: "pool" }),
        };

        let out_shape = self.output_shape(&in_shape)?;
        if upstream.shape() != out_shape.as_slice() {
            return Err(Error::IncompatibleShapes {
                op: "pool backward",
                left: upstream.shape().to_vec(),
                right: out_shape.to_vec(),
            });
        }

        let factor = 1.0 / (self.size[0] * self.size[1] * self.size[2]) as f64;
        let mut data = vec![0.0; in_shape.iter().product()];
        let gradient = upstream.values();
        let mut position = 0;
        for i in 0..out_shape[0] {
            for j in 0..out_shape[1] {
                let (a1, a2) = self.window(0, j, in_shape[1]);
                for k in 0..out_shape[2] {
                    let (b1, b2) = self.window(1, k, in_shape[2]);
                    for l in 0..out_shape[3] {
                        let (c1, c2) = self.window(2, l, in_shape[3]);
                        let g = gradient[position];
                        position += 1;

                        match (self.kind, input) {
                            (PoolKind::Max, Some(input)) => {
                                let source = input.values();
                                let mut best = f64::NEG_INFINITY;
                                let mut best_offset = None;
                                for a in a1..a2 {
                                    for b in b1..b2 {
                                        for c in c1..c2 {
                                            let offset = offset4(&in_shape, i, a, b, c);
                                            if source[offset] > best {
                                                best = source[offset];
                                                best_offset = Some(offset);
                                            }
                                        }
                                    }
                                }
                                if let Some(offset) = best_offset {
                                    data[offset] += g;
                                }
                            }
                            _ => {
                                for a in a1..a2 {
                                    for b in b1..b2 {
                                        for c in c1..c2 {
                                            data[offset4(&in_shape, i, a, b, c)] += g * factor;
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(BackpropResult {
            input_gradient: Tensor::new(in_shape.to_vec(), data)?,
            parameter_gradients: GradientMap::new(),
        })
    }
}

fn offset4(shape: &[usize; 4], i: usize, j: usize, k: usize, l: usize) -> usize {
    ((i * shape[1] + j) * shape[2] + k) * shape[3] + l
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            PoolKind::Max => "Max Pool Layer",
            PoolKind::Average => "Average Pool Layer",
        };
        write!(
            f,
            "{} (size {:?}, stride {:?}, padding {:?})",
            name, self.size, self.stride, self.padding
        )
    }
}
