//! Shape broadcasting with the numpy convention.
//!
//! Shapes are aligned on their trailing axes and missing leading axes count as size 1.
//! Two sizes are compatible if they are equal or one of them is 1, and the output takes
//! the larger size.

use crate::array::shape_len;
use crate::error::{GeoShapeError, Result};

/// Compute the broadcast shape of two operands.
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut shape = vec![0; ndim];
    for axis in 0..ndim {
        let lhs_dim = aligned_dim(lhs, ndim, axis);
        let rhs_dim = aligned_dim(rhs, ndim, axis);
        shape[axis] = match (lhs_dim, rhs_dim) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            (lhs_dim, rhs_dim) => {
                return Err(GeoShapeError::Broadcast {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                    axis,
                    lhs_dim,
                    rhs_dim,
                })
            }
        };
    }
    Ok(shape)
}

fn aligned_dim(shape: &[usize], ndim: usize, axis: usize) -> usize {
    let offset = ndim - shape.len();
    if axis < offset {
        1
    } else {
        shape[axis - offset]
    }
}

/// Row-major strides of `shape` viewed as `out_shape`, with stride 0 on broadcast axes.
fn broadcast_strides(shape: &[usize], out_shape: &[usize]) -> Vec<usize> {
    let ndim = out_shape.len();
    let mut strides = vec![0; ndim];
    let mut stride = 1;
    for axis in (0..ndim).rev() {
        let dim = aligned_dim(shape, ndim, axis);
        if dim != 1 {
            strides[axis] = stride;
        }
        stride *= dim;
    }
    strides
}

/// Maps every output position of a broadcast call back to the slot of each operand.
#[derive(Debug, Clone)]
pub struct BroadcastPlan {
    shape: Vec<usize>,
    operands: Vec<OperandLayout>,
}

#[derive(Debug, Clone)]
struct OperandLayout {
    len: usize,
    strides: Vec<usize>,
}

impl BroadcastPlan {
    /// Plan a unary call. The output has the input's shape.
    pub fn unary(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            operands: vec![OperandLayout {
                len: shape_len(shape),
                strides: broadcast_strides(shape, shape),
            }],
        }
    }

    /// Plan a binary call, failing before any element is touched if the shapes are
    /// incompatible.
    pub fn binary(lhs: &[usize], rhs: &[usize]) -> Result<Self> {
        let shape = broadcast_shapes(lhs, rhs)?;
        let operands = [lhs, rhs]
            .into_iter()
            .map(|operand| OperandLayout {
                len: shape_len(operand),
                strides: broadcast_strides(operand, &shape),
            })
            .collect();
        Ok(Self { shape, operands })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of output elements.
    pub fn len(&self) -> usize {
        shape_len(&self.shape)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index into operand `operand` for the flat output index `index`.
    pub fn source_index(&self, operand: usize, index: usize) -> usize {
        let layout = &self.operands[operand];
        let mut remaining = index;
        let mut source = 0;
        for (dim, stride) in self.shape.iter().zip(&layout.strides).rev() {
            source += (remaining % dim) * stride;
            remaining /= dim;
        }
        source
    }

    /// How many output positions read each element of an operand.
    pub fn reuse(&self, operand: usize) -> usize {
        match self.operands[operand].len {
            0 => 0,
            len => self.len() / len,
        }
    }
}
