//! Error kinds surfaced by record construction and operator dispatch
//!
//! Deep numeric validation (NaN propagation, division by zero in derived
//! coordinates) stays with the array framework; the kinds below cover the
//! schema and registry lookups this crate performs itself.

use crate::vector::BinaryOp;
use thiserror::Error;

/// We'll use this result type throughout the crate
pub type Result<T, E = BehaviorError> = std::result::Result<T, E>;

/// Errors produced when building or combining columnar vector records
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    /// A record construction or lookup used a tag nobody registered
    #[error("no behavior class is registered under tag `{0}`")]
    UnknownTag(String),

    /// A record does not carry a field which its behavior class requires
    #[error("record tagged `{tag}` is missing required field `{field}`")]
    MissingField {
        /// Tag of the offending record
        tag: &'static str,
        /// Name of the absent field
        field: String,
    },

    /// The dispatch table has no entry for an operator and operand pair
    #[error("no `{op}` implementation registered for operand tags `{lhs}` and `{rhs}`")]
    NoDispatchEntry {
        /// Operator that was requested
        op: BinaryOp,
        /// Tag of the left operand
        lhs: &'static str,
        /// Tag of the right operand
        rhs: &'static str,
    },

    /// Two column shapes cannot be broadcast together
    #[error("shapes {lhs:?} and {rhs:?} cannot be broadcast together")]
    ShapeMismatch {
        /// Shape of the left column
        lhs: Vec<usize>,
        /// Shape of the right column
        rhs: Vec<usize>,
    },

    /// A reduction axis lies outside the rank of the reduced column
    #[error("axis {axis} is out of bounds for a rank-{ndim} column")]
    AxisOutOfBounds {
        /// Requested axis, possibly negative
        axis: isize,
        /// Rank of the column being reduced
        ndim: usize,
    },

    /// A projection was requested for a tag without projection classes
    #[error("no projection classes registered for tag `{0}`")]
    NoProjection(&'static str),

    /// A point lookup went past the end of a column
    #[error("record index {index} is out of bounds for {len} records")]
    IndexOutOfBounds {
        /// Requested record index
        index: usize,
        /// Number of records actually stored
        len: usize,
    },
}
