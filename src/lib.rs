//! Candidate behaviors for columnar Lorentz-vector records
//!
//!
//! # Introduction (for the physicist)
//!
//! Analyses keep reconstructed objects (leptons, photons, jets...) in
//! columnar arrays: one named column per kinematic quantity, one row per
//! object. A "candidate" is such an object seen as a relativistic
//! 4-momentum plus an electric charge. Composing two candidates into a
//! heavier hypothesis sums the momenta relativistically and the charges
//! arithmetically, so a Z → e⁺e⁻ hypothesis comes out neutral by
//! construction.
//!
//!
//! # Introduction (for the numerical guy)
//!
//! Columns are `ndarray` arrays. All elementwise arithmetic, broadcasting
//! and axis reductions are the array framework's business; this crate only
//! decides which columns to combine for which flavor of record, and with
//! which output tag.
//!
//!
//! # Introduction (for the computer guy)
//!
//! Generic operator resolution works from an explicit [`BehaviorRegistry`]:
//! a table mapping (operator, left tag, right tag) to an implementation,
//! plus a precedence list used to pick the implementation when the two tags
//! differ. The registry is populated once at start-up — the standard vector
//! flavors by [`vector::register_vector_behaviors`], the charged flavors by
//! [`candidate::register`] — and is read-only afterwards. Record arrays
//! borrow the registry they were built against and hand it down to every
//! derived array.
//!
//! ```
//! use candidate_vectors::{standard_registry, RecordArray};
//! use indexmap::IndexMap;
//! use ndarray::arr1;
//!
//! let registry = standard_registry();
//! let electrons = RecordArray::zip(
//!     "Candidate",
//!     IndexMap::from([
//!         ("x".to_owned(), arr1(&[1.0]).into_dyn()),
//!         ("y".to_owned(), arr1(&[0.0]).into_dyn()),
//!         ("z".to_owned(), arr1(&[0.0]).into_dyn()),
//!         ("t".to_owned(), arr1(&[1.0]).into_dyn()),
//!         ("charge".to_owned(), arr1(&[-1.0]).into_dyn()),
//!     ]),
//!     &registry,
//! )?;
//! let pairs = electrons.add(&electrons)?;
//! assert_eq!(pairs.charge_at(0)?, -2.0);
//! # Ok::<(), candidate_vectors::BehaviorError>(())
//! ```

#![warn(missing_docs)]

pub mod candidate;
pub mod columnar;
pub mod error;
pub mod momentum;
pub mod numeric;
pub mod record;
pub mod vector;

pub use crate::{
    error::{BehaviorError, Result},
    momentum::{ChargedMomentum, Momentum},
    numeric::Float,
    record::RecordArray,
    vector::{BehaviorClass, BehaviorRegistry, BinaryOp, Coordinates, Projections},
};

/// Build a registry carrying the standard vector and candidate behaviors
pub fn standard_registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::with_vector_behaviors();
    candidate::register(&mut registry);
    registry
}
