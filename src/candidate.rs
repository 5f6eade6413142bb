//! Physics object candidate behaviors
//!
//! A candidate is just a Lorentz vector with charge: enough to compose
//! reconstructed decay products into heavier objects, with the electric
//! charge bookkeeping coming along for free. A composite candidate builder
//! that resolves duplicates along a decay chain could later build on top of
//! this.

use crate::{
    error::Result,
    record::RecordArray,
    vector::{
        self, Accessor, BehaviorClass, BehaviorRegistry, BinaryOp, Coordinates, Projections,
    },
};
use log::debug;

/// Components combined by candidate arithmetic and reduction
const CANDIDATE_COMPONENTS: &[(&str, Accessor)] = &[
    ("x", vector::comp_x),
    ("y", vector::comp_y),
    ("z", vector::comp_z),
    ("t", vector::comp_t),
    ("charge", vector::comp_charge),
];

/// A Lorentz vector with charge
///
/// Records carrying this tag must provide fields `x`, `y`, `z`, `t` and
/// `charge`.
pub static CANDIDATE: BehaviorClass = BehaviorClass {
    name: "Candidate",
    required_fields: &["x", "y", "z", "t", "charge"],
    coordinates: Coordinates::Cartesian4,
    add,
    subtract: vector::subtract_lorentz_vectors,
    sum,
};

/// A candidate in eta, mass coordinates
///
/// Records carrying this tag must provide fields `pt`, `eta`, `phi`,
/// `mass` and `charge`. No new behavior: candidate semantics apply on top
/// of the mass-based coordinate schema.
pub static PT_ETA_PHI_M_CANDIDATE: BehaviorClass = BehaviorClass {
    name: "PtEtaPhiMCandidate",
    required_fields: &["pt", "eta", "phi", "mass", "charge"],
    coordinates: Coordinates::PtEtaPhiM,
    add,
    subtract: vector::subtract_lorentz_vectors,
    sum,
};

/// A candidate in eta, energy coordinates
///
/// Records carrying this tag must provide fields `pt`, `eta`, `phi`,
/// `energy` and `charge`.
pub static PT_ETA_PHI_E_CANDIDATE: BehaviorClass = BehaviorClass {
    name: "PtEtaPhiECandidate",
    required_fields: &["pt", "eta", "phi", "energy", "charge"],
    coordinates: Coordinates::PtEtaPhiE,
    add,
    subtract: vector::subtract_lorentz_vectors,
    sum,
};

/// Add two candidates together elementwise using `x`, `y`, `z`, `t` and
/// `charge` components
fn add<'l>(lhs: &RecordArray<'l>, rhs: &RecordArray<'_>) -> Result<RecordArray<'l>> {
    vector::combine(lhs, rhs, CANDIDATE_COMPONENTS, CANDIDATE.name, |l, r| l + r)
}

/// Sum an array of candidates elementwise using `x`, `y`, `z`, `t` and
/// `charge` components
fn sum<'a>(values: &RecordArray<'a>, axis: isize) -> Result<RecordArray<'a>> {
    vector::reduce(values, CANDIDATE_COMPONENTS, CANDIDATE.name, axis)
}

/// Wire the candidate behaviors into a registry
///
/// Existing entries for non-candidate pairs are left untouched, and
/// re-applying the registration overwrites every entry with an identical
/// value, so repeating it is harmless.
pub fn register(registry: &mut BehaviorRegistry) {
    debug!("registering candidate behaviors");

    // ### BEHAVIOR CLASSES ###

    registry.register_class(&CANDIDATE);
    registry.register_class(&PT_ETA_PHI_M_CANDIDATE);
    registry.register_class(&PT_ETA_PHI_E_CANDIDATE);

    // ### DISPATCH ELIGIBILITY AND PRECEDENCE ###

    registry.register_binary_dispatch_class(CANDIDATE.name, &CANDIDATE);
    registry.push_rank(&CANDIDATE);

    // ### CROSS-FLAVOR DISPATCH ###

    // Revisit every pair of dispatch-eligible tags with a candidate on
    // either side; the minimal-rank class provides the implementation, so
    // mixing a candidate with a plain vector falls back to the plain
    // vector's arithmetic
    let pairs: Vec<_> = registry.binary_dispatch_classes().collect();
    for &(lhs_tag, lhs_class) in &pairs {
        for &(rhs_tag, rhs_class) in &pairs {
            if lhs_tag != CANDIDATE.name && rhs_tag != CANDIDATE.name {
                continue;
            }
            let out = registry.winner(lhs_class, rhs_class);
            registry.insert_binary(BinaryOp::Add, lhs_tag, rhs_tag, out.add);
            registry.insert_binary(BinaryOp::Subtract, lhs_tag, rhs_tag, out.subtract);
        }
    }

    // ### PROJECTIONS ###

    registry.set_projections(
        CANDIDATE.name,
        Projections {
            two_d: &vector::TWO_VECTOR,
            three_d: &vector::THREE_VECTOR,
            four_d: &vector::LORENTZ_VECTOR,
            momentum: &CANDIDATE,
        },
    );
    registry.set_projections(
        PT_ETA_PHI_M_CANDIDATE.name,
        Projections {
            two_d: &vector::TWO_VECTOR,
            three_d: &vector::THREE_VECTOR,
            four_d: &vector::LORENTZ_VECTOR,
            momentum: &PT_ETA_PHI_M_CANDIDATE,
        },
    );
    registry.set_projections(
        PT_ETA_PHI_E_CANDIDATE.name,
        Projections {
            two_d: &vector::TWO_VECTOR,
            three_d: &vector::THREE_VECTOR,
            four_d: &vector::LORENTZ_VECTOR,
            momentum: &PT_ETA_PHI_E_CANDIDATE,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        columnar::Column,
        error::BehaviorError,
        numeric::Float,
        vector::{LORENTZ_VECTOR, TWO_VECTOR},
    };
    use indexmap::IndexMap;
    use ndarray::{arr1, arr2};

    fn registry() -> BehaviorRegistry {
        let mut registry = BehaviorRegistry::with_vector_behaviors();
        register(&mut registry);
        registry
    }

    fn column(values: &[Float]) -> Column {
        arr1(values).into_dyn()
    }

    fn candidate<'reg>(
        registry: &'reg BehaviorRegistry,
        x: &[Float],
        y: &[Float],
        z: &[Float],
        t: &[Float],
        charge: &[Float],
    ) -> RecordArray<'reg> {
        let fields = IndexMap::from([
            ("x".to_owned(), column(x)),
            ("y".to_owned(), column(y)),
            ("z".to_owned(), column(z)),
            ("t".to_owned(), column(t)),
            ("charge".to_owned(), column(charge)),
        ]);
        RecordArray::zip(CANDIDATE.name, fields, registry).unwrap()
    }

    #[test_log::test]
    fn addition_sums_momentum_and_charge() {
        let registry = registry();
        let lhs = candidate(&registry, &[1.], &[0.], &[0.], &[1.], &[1.]);
        let rhs = candidate(&registry, &[0.], &[1.], &[0.], &[1.], &[-1.]);

        let pair = lhs.add(&rhs).unwrap();
        assert_eq!(pair.tag(), CANDIDATE.name);
        assert_eq!(*pair.field("x").unwrap(), column(&[1.]));
        assert_eq!(*pair.field("y").unwrap(), column(&[1.]));
        assert_eq!(*pair.field("z").unwrap(), column(&[0.]));
        assert_eq!(*pair.field("t").unwrap(), column(&[2.]));
        assert_eq!(*pair.field("charge").unwrap(), column(&[0.]));
    }

    #[test]
    fn addition_commutes() {
        let registry = registry();
        let lhs = candidate(&registry, &[1., 2.], &[0., 3.], &[2., 0.], &[4., 5.], &[1., 1.]);
        let rhs = candidate(&registry, &[5., 1.], &[1., 2.], &[0., 1.], &[6., 3.], &[-1., 0.]);
        assert_eq!(lhs.add(&rhs).unwrap(), rhs.add(&lhs).unwrap());
    }

    #[test]
    fn summing_the_last_axis_accumulates_candidates() {
        let registry = registry();
        // Two events of three candidates each
        let fields = IndexMap::from([
            ("x".to_owned(), arr2(&[[1., 2., 3.], [0., 0., 1.]]).into_dyn()),
            ("y".to_owned(), arr2(&[[0., 1., 0.], [2., 2., 2.]]).into_dyn()),
            ("z".to_owned(), arr2(&[[0., 0., 0.], [1., 1., 1.]]).into_dyn()),
            ("t".to_owned(), arr2(&[[2., 3., 4.], [3., 3., 3.]]).into_dyn()),
            (
                "charge".to_owned(),
                arr2(&[[1., -1., 1.], [1., 1., 1.]]).into_dyn(),
            ),
        ]);
        let values = RecordArray::zip(CANDIDATE.name, fields, &registry).unwrap();

        let per_event = values.sum(-1).unwrap();
        assert_eq!(per_event.tag(), CANDIDATE.name);
        assert_eq!(*per_event.field("x").unwrap(), column(&[6., 1.]));
        assert_eq!(*per_event.field("t").unwrap(), column(&[9., 9.]));
        assert_eq!(*per_event.field("charge").unwrap(), column(&[1., 3.]));

        // Leading-axis reduction follows the same convention
        let across_events = values.sum(0).unwrap();
        assert_eq!(*across_events.field("charge").unwrap(), column(&[2., 0., 2.]));
    }

    #[test]
    fn candidates_in_polar_coordinates_share_the_arithmetic() {
        let registry = registry();
        // Two massless candidates along +x and -x, each with pt = 1
        let fields = IndexMap::from([
            ("pt".to_owned(), column(&[1., 1.])),
            ("eta".to_owned(), column(&[0., 0.])),
            ("phi".to_owned(), column(&[0., std::f64::consts::PI as Float])),
            ("mass".to_owned(), column(&[0., 0.])),
            ("charge".to_owned(), column(&[1., -1.])),
        ]);
        let values = RecordArray::zip(PT_ETA_PHI_M_CANDIDATE.name, fields, &registry).unwrap();

        let total = values.sum(-1).unwrap();
        assert_eq!(total.tag(), CANDIDATE.name);
        let momentum = total.momentum_at(0).unwrap();
        assert!(momentum[crate::momentum::X].abs() < 1e-12);
        assert!((momentum[crate::momentum::T] - 2.).abs() < 1e-12);
        assert_eq!(total.charge_at(0).unwrap(), 0.);
    }

    #[test]
    fn subtraction_returns_a_plain_lorentz_vector() {
        let registry = registry();
        let lhs = candidate(&registry, &[2.], &[1.], &[0.], &[5.], &[1.]);
        let rhs = candidate(&registry, &[1.], &[1.], &[0.], &[2.], &[1.]);

        let difference = lhs.subtract(&rhs).unwrap();
        assert_eq!(difference.tag(), LORENTZ_VECTOR.name);
        assert_eq!(*difference.field("x").unwrap(), column(&[1.]));
        assert_eq!(*difference.field("t").unwrap(), column(&[3.]));
        assert!(!difference.has_field("charge"));
    }

    #[test]
    fn mixing_with_a_plain_vector_picks_the_lower_rank() {
        let registry = registry();
        let charged = candidate(&registry, &[1.], &[2.], &[3.], &[10.], &[1.]);
        let plain = RecordArray::zip(
            LORENTZ_VECTOR.name,
            IndexMap::from([
                ("x".to_owned(), column(&[1.])),
                ("y".to_owned(), column(&[1.])),
                ("z".to_owned(), column(&[1.])),
                ("t".to_owned(), column(&[1.])),
            ]),
            &registry,
        )
        .unwrap();

        // Both operand orders resolve to the Lorentz implementation, which
        // does not carry charge
        for sum in [charged.add(&plain).unwrap(), plain.add(&charged).unwrap()] {
            assert_eq!(sum.tag(), LORENTZ_VECTOR.name);
            assert_eq!(*sum.field("x").unwrap(), column(&[2.]));
            assert_eq!(*sum.field("t").unwrap(), column(&[11.]));
            assert!(!sum.has_field("charge"));
        }
    }

    #[test]
    fn registration_preserves_existing_entries() {
        let mut registry = BehaviorRegistry::with_vector_behaviors();
        let before = registry
            .binary(BinaryOp::Add, TWO_VECTOR.name, LORENTZ_VECTOR.name)
            .unwrap();
        let entries_before = registry.num_binary_entries();

        register(&mut registry);

        let after = registry
            .binary(BinaryOp::Add, TWO_VECTOR.name, LORENTZ_VECTOR.name)
            .unwrap();
        assert_eq!(before as usize, after as usize);

        // Same-tag add/subtract entries for the three candidate tags, plus
        // entries for the cross pairs involving `Candidate`: 11 pairs over
        // the 6 dispatch-eligible tags, of which the same-tag pair is
        // already counted
        assert_eq!(
            registry.num_binary_entries(),
            entries_before + 3 * 2 + (11 - 1) * 2
        );
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = BehaviorRegistry::with_vector_behaviors();
        register(&mut registry);
        let entries = registry.num_binary_entries();

        register(&mut registry);
        assert_eq!(registry.num_binary_entries(), entries);
        assert_eq!(registry.rank_of(&CANDIDATE), Some(3));
    }

    #[test]
    fn zipping_a_candidate_requires_a_charge() {
        let registry = registry();
        let fields = IndexMap::from([
            ("x".to_owned(), column(&[1.])),
            ("y".to_owned(), column(&[0.])),
            ("z".to_owned(), column(&[0.])),
            ("t".to_owned(), column(&[1.])),
        ]);
        let error = RecordArray::zip(CANDIDATE.name, fields, &registry).unwrap_err();
        assert_eq!(
            error,
            BehaviorError::MissingField {
                tag: CANDIDATE.name,
                field: "charge".to_owned(),
            }
        );
    }

    #[test]
    fn candidates_re_tag_to_themselves_as_momenta() {
        let registry = registry();
        let charged = candidate(&registry, &[1.], &[2.], &[3.], &[10.], &[1.]);

        let momentum = charged.to_momentum().unwrap();
        assert_eq!(momentum.tag(), CANDIDATE.name);
        assert_eq!(momentum, charged);

        let planar = charged.project_2d().unwrap();
        assert_eq!(planar.tag(), TWO_VECTOR.name);
        assert!(!planar.has_field("charge"));
    }
}
