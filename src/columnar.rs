//! Thin adaptation layer over the columnar array framework
//!
//! Storage, elementwise arithmetic and reductions are entirely delegated to
//! `ndarray`; this module only pins down the broadcasting and axis
//! conventions shared by every behavior implementation, and converts the
//! framework's failure modes into this crate's error kinds.

use crate::{
    error::{BehaviorError, Result},
    numeric::Float,
};
use ndarray::{ArrayD, Axis, IxDyn, Zip};
use num_traits::Zero;

/// A single named column of a record array
pub type Column = ArrayD<Float>;

/// Compute the common broadcast shape of two column shapes
///
/// Shapes are aligned on their trailing axes; each aligned pair of extents
/// must be equal, or one of them must be 1 and is stretched to the other.
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut shape = Vec::with_capacity(ndim);
    for axis in 0..ndim {
        let l = if axis < lhs.len() {
            lhs[lhs.len() - 1 - axis]
        } else {
            1
        };
        let r = if axis < rhs.len() {
            rhs[rhs.len() - 1 - axis]
        } else {
            1
        };
        if l == r || r == 1 {
            shape.push(l);
        } else if l == 1 {
            shape.push(r);
        } else {
            return Err(BehaviorError::ShapeMismatch {
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            });
        }
    }
    shape.reverse();
    Ok(shape)
}

/// Combine two columns elementwise after broadcasting them to a common shape
pub fn broadcast_with<F>(lhs: &Column, rhs: &Column, f: F) -> Result<Column>
where
    F: Fn(Float, Float) -> Float,
{
    let shape = broadcast_shape(lhs.shape(), rhs.shape())?;
    let mismatch = || BehaviorError::ShapeMismatch {
        lhs: lhs.shape().to_vec(),
        rhs: rhs.shape().to_vec(),
    };
    let lhs = lhs.broadcast(IxDyn(&shape)).ok_or_else(mismatch)?;
    let rhs = rhs.broadcast(IxDyn(&shape)).ok_or_else(mismatch)?;
    Ok(Zip::from(&lhs).and(&rhs).map_collect(|&l, &r| f(l, r)))
}

/// Derive a new column by mapping a function over each element
pub fn map<F>(values: &Column, f: F) -> Column
where
    F: Fn(Float) -> Float,
{
    values.mapv(f)
}

/// Resolve a signed axis index against a column rank
///
/// Negative axes count from the end, so -1 denotes the last axis.
pub fn resolve_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis < 0 { axis + ndim as isize } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(BehaviorError::AxisOutOfBounds { axis, ndim });
    }
    Ok(resolved as usize)
}

/// Sum a column along one axis, lowering its rank by one
pub fn sum_axis<T>(values: &ArrayD<T>, axis: isize) -> Result<ArrayD<T>>
where
    T: Clone + Zero,
{
    let axis = resolve_axis(axis, values.ndim())?;
    Ok(values.sum_axis(Axis(axis)))
}
