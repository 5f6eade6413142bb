//! Columnar record arrays and their component access
//!
//! A record array is a set of equally-shaped (or broadcastable) named
//! columns zipped together under a type tag. The tag resolves, at
//! construction time, to the behavior class that drives operator dispatch
//! and component derivation for the array. Arrays also carry a reference to
//! the behavior registry they were built against, and hand it down to every
//! derived array.

use crate::{
    columnar::{self, Column},
    error::{BehaviorError, Result},
    momentum::{ChargedMomentum, Momentum},
    numeric::{functions::*, Float},
    vector::{BehaviorClass, BehaviorRegistry, BinaryOp, Coordinates, Projections},
};
use indexmap::IndexMap;
use std::fmt::{self, Display};

/// Columnar array of vector-flavored records
pub struct RecordArray<'reg> {
    /// Behavior class resolved from the type tag at construction time
    class: &'static BehaviorClass,

    /// Named columns, in insertion order
    fields: IndexMap<String, Column>,

    /// Behavior registry consulted for dispatch and projections
    behavior: &'reg BehaviorRegistry,
}
//
impl<'reg> RecordArray<'reg> {
    /// Build a record array by zipping named columns under a type tag
    ///
    /// This is the construct primitive every operation funnels through. The
    /// tag must name a registered behavior class, and the columns must cover
    /// the class's required fields; each violation is reported as a typed
    /// error rather than left for arithmetic to trip over later.
    pub fn zip(
        tag: &str,
        fields: IndexMap<String, Column>,
        behavior: &'reg BehaviorRegistry,
    ) -> Result<Self> {
        let class = behavior
            .class_for(tag)
            .ok_or_else(|| BehaviorError::UnknownTag(tag.to_owned()))?;
        for &field in class.required_fields {
            if !fields.contains_key(field) {
                return Err(BehaviorError::MissingField {
                    tag: class.name,
                    field: field.to_owned(),
                });
            }
        }
        Ok(Self {
            class,
            fields,
            behavior,
        })
    }

    /// Type tag of the records
    pub fn tag(&self) -> &'static str {
        self.class.name
    }

    /// Behavior class driving this array's operations
    pub fn class(&self) -> &'static BehaviorClass {
        self.class
    }

    /// Behavior registry this array was built against
    pub fn behavior(&self) -> &'reg BehaviorRegistry {
        self.behavior
    }

    /// Borrow a named column
    pub fn field(&self, name: &str) -> Result<&Column> {
        self.fields.get(name).ok_or_else(|| BehaviorError::MissingField {
            tag: self.class.name,
            field: name.to_owned(),
        })
    }

    /// Check whether a named column is stored in this array
    ///
    /// Derived components (such as `x` on a transverse-polar record) are
    /// not stored and do not count.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of the stored columns, in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Number of records along the leading axis
    ///
    /// Scalar (rank-0) columns count as a single record.
    pub fn len(&self) -> usize {
        self.fields
            .values()
            .next()
            .map_or(0, |column| column.shape().first().copied().unwrap_or(1))
    }

    /// Check whether the array holds no record
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ### COMPONENT ACCESS ###

    /// Cartesian x component
    ///
    /// For transverse-polar records this is a derived column.
    pub fn x(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::Cartesian2 | Coordinates::Cartesian3 | Coordinates::Cartesian4 => {
                self.field("x").cloned()
            }
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => {
                columnar::broadcast_with(self.field("pt")?, self.field("phi")?, |pt, phi| {
                    pt * cos(phi)
                })
            }
        }
    }

    /// Cartesian y component
    pub fn y(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::Cartesian2 | Coordinates::Cartesian3 | Coordinates::Cartesian4 => {
                self.field("y").cloned()
            }
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => {
                columnar::broadcast_with(self.field("pt")?, self.field("phi")?, |pt, phi| {
                    pt * sin(phi)
                })
            }
        }
    }

    /// Cartesian z component
    ///
    /// Planar records have no z component, which surfaces as a missing
    /// field.
    pub fn z(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::Cartesian2 => Err(self.no_component("z")),
            Coordinates::Cartesian3 | Coordinates::Cartesian4 => self.field("z").cloned(),
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => {
                columnar::broadcast_with(self.field("pt")?, self.field("eta")?, |pt, eta| {
                    pt * sinh(eta)
                })
            }
        }
    }

    /// Cartesian time component (total energy, in natural units)
    pub fn t(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::Cartesian2 | Coordinates::Cartesian3 => Err(self.no_component("t")),
            Coordinates::Cartesian4 => self.field("t").cloned(),
            Coordinates::PtEtaPhiM => {
                let p = columnar::broadcast_with(
                    self.field("pt")?,
                    self.field("eta")?,
                    |pt, eta| pt * cosh(eta),
                )?;
                columnar::broadcast_with(&p, self.field("mass")?, hypot)
            }
            Coordinates::PtEtaPhiE => self.field("energy").cloned(),
        }
    }

    /// Electric charge
    ///
    /// Only candidate-flavored records carry one; on anything else this
    /// surfaces as a missing field.
    pub fn charge(&self) -> Result<Column> {
        self.field("charge").cloned()
    }

    /// Momentum component transverse to the beam axis
    pub fn pt(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => self.field("pt").cloned(),
            _ => columnar::broadcast_with(&self.x()?, &self.y()?, hypot),
        }
    }

    /// Azimuthal angle, in (-pi, pi]
    pub fn phi(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => self.field("phi").cloned(),
            _ => columnar::broadcast_with(&self.y()?, &self.x()?, atan2),
        }
    }

    /// Pseudorapidity
    ///
    /// Not defined for planar records; diverges for records along the beam
    /// axis, which is left to the arithmetic to report as infinities.
    pub fn eta(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::Cartesian2 => Err(self.no_component("eta")),
            Coordinates::Cartesian3 | Coordinates::Cartesian4 => {
                columnar::broadcast_with(&self.z()?, &self.pt()?, |z, pt| asinh(z / pt))
            }
            Coordinates::PtEtaPhiM | Coordinates::PtEtaPhiE => self.field("eta").cloned(),
        }
    }

    /// Squared invariant mass, from the Minkowski metric
    pub fn mass2(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::PtEtaPhiM => Ok(columnar::map(self.field("mass")?, sqr)),
            _ => {
                let m2 =
                    columnar::broadcast_with(&self.t()?, &self.x()?, |t, x| sqr(t) - sqr(x))?;
                let m2 = columnar::broadcast_with(&m2, &self.y()?, |m2, y| m2 - sqr(y))?;
                columnar::broadcast_with(&m2, &self.z()?, |m2, z| m2 - sqr(z))
            }
        }
    }

    /// Invariant mass (NaN for space-like records)
    pub fn mass(&self) -> Result<Column> {
        match self.class.coordinates {
            Coordinates::PtEtaPhiM => self.field("mass").cloned(),
            _ => Ok(columnar::map(&self.mass2()?, sqrt)),
        }
    }

    /// Total energy, an alias of the time component
    pub fn energy(&self) -> Result<Column> {
        self.t()
    }

    // ### POINT LOOKUPS ###

    /// Extract the 4-momentum of a single record
    ///
    /// Components are derived first, so this works in any coordinate
    /// system. Indices enumerate records in row-major order.
    pub fn momentum_at(&self, index: usize) -> Result<Momentum> {
        let x = self.point(&self.x()?, index)?;
        let y = self.point(&self.y()?, index)?;
        let z = self.point(&self.z()?, index)?;
        let t = self.point(&self.t()?, index)?;
        Ok(Momentum::new(x, y, z, t))
    }

    /// Extract the charge of a single record
    pub fn charge_at(&self, index: usize) -> Result<Float> {
        self.point(&self.charge()?, index)
    }

    /// Extract a full candidate record
    pub fn candidate_at(&self, index: usize) -> Result<ChargedMomentum> {
        Ok(ChargedMomentum {
            momentum: self.momentum_at(index)?,
            charge: self.charge_at(index)?,
        })
    }

    /// Fetch one element of a column in row-major order
    fn point(&self, column: &Column, index: usize) -> Result<Float> {
        column
            .iter()
            .nth(index)
            .copied()
            .ok_or(BehaviorError::IndexOutOfBounds {
                index,
                len: column.len(),
            })
    }

    // ### GENERIC OPERATIONS ###

    /// Add another record array elementwise, through the dispatch table
    pub fn add(&self, other: &RecordArray<'_>) -> Result<RecordArray<'reg>> {
        self.dispatch(BinaryOp::Add, other)
    }

    /// Subtract another record array elementwise, through the dispatch table
    pub fn subtract(&self, other: &RecordArray<'_>) -> Result<RecordArray<'reg>> {
        self.dispatch(BinaryOp::Subtract, other)
    }

    /// Sum the records along an axis, one component at a time
    ///
    /// Negative axes follow the usual convention: -1 is the last axis.
    pub fn sum(&self, axis: isize) -> Result<RecordArray<'reg>> {
        (self.class.sum)(self, axis)
    }

    /// Resolve a binary operator for this pair of tags and apply it
    fn dispatch(&self, op: BinaryOp, other: &RecordArray<'_>) -> Result<RecordArray<'reg>> {
        let implementation = self
            .behavior
            .binary(op, self.tag(), other.tag())
            .ok_or(BehaviorError::NoDispatchEntry {
                op,
                lhs: self.tag(),
                rhs: other.tag(),
            })?;
        implementation(self, other)
    }

    // ### PROJECTIONS ###

    /// Project onto the transverse plane
    pub fn project_2d(&self) -> Result<RecordArray<'reg>> {
        self.retag(self.projections()?.two_d)
    }

    /// Project onto 3-dimensional space
    pub fn project_3d(&self) -> Result<RecordArray<'reg>> {
        self.retag(self.projections()?.three_d)
    }

    /// Project onto Cartesian space-time
    pub fn project_4d(&self) -> Result<RecordArray<'reg>> {
        self.retag(self.projections()?.four_d)
    }

    /// Re-tag the array as its momentum class
    pub fn to_momentum(&self) -> Result<RecordArray<'reg>> {
        self.retag(self.projections()?.momentum)
    }

    /// Projection classes registered for this array's tag
    fn projections(&self) -> Result<Projections> {
        self.behavior
            .projections(self.tag())
            .ok_or(BehaviorError::NoProjection(self.tag()))
    }

    /// Zip the fields required by a target class, derived from this array
    fn retag(&self, target: &'static BehaviorClass) -> Result<RecordArray<'reg>> {
        let mut fields = IndexMap::new();
        for &field in target.required_fields {
            fields.insert(field.to_owned(), self.derived(field)?);
        }
        RecordArray::zip(target.name, fields, self.behavior)
    }

    /// Derive a column by name, falling back to stored fields
    fn derived(&self, name: &str) -> Result<Column> {
        match name {
            "x" => self.x(),
            "y" => self.y(),
            "z" => self.z(),
            "t" => self.t(),
            "charge" => self.charge(),
            "pt" => self.pt(),
            "eta" => self.eta(),
            "phi" => self.phi(),
            "mass" => self.mass(),
            "energy" => self.energy(),
            other => self.field(other).cloned(),
        }
    }

    /// Error for a Cartesian component this flavor does not have
    fn no_component(&self, name: &str) -> BehaviorError {
        BehaviorError::MissingField {
            tag: self.class.name,
            field: name.to_owned(),
        }
    }
}

impl fmt::Debug for RecordArray<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("RecordArray")
            .field("tag", &self.tag())
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl PartialEq for RecordArray<'_> {
    /// Two record arrays are equal when their tags and all columns match
    fn eq(&self, other: &Self) -> bool {
        BehaviorClass::same(self.class, other.class) && self.fields == other.fields
    }
}

impl Display for RecordArray<'_> {
    /// Dump the tag and the named columns, one per line
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(fmt, "{}", self.tag())?;
        for (name, column) in &self.fields {
            writeln!(fmt, "{}\t{}", name, column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{LORENTZ_VECTOR, PT_ETA_PHI_E_LORENTZ_VECTOR, TWO_VECTOR};
    use ndarray::arr1;

    fn column(values: &[Float]) -> Column {
        arr1(values).into_dyn()
    }

    #[test]
    fn zipping_an_unknown_tag_is_refused() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let error = RecordArray::zip("Unheard0f", IndexMap::new(), &registry).unwrap_err();
        assert_eq!(error, BehaviorError::UnknownTag("Unheard0f".to_owned()));
    }

    #[test]
    fn zipping_checks_the_field_schema() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let fields = IndexMap::from([("x".to_owned(), column(&[1.]))]);
        let error = RecordArray::zip(TWO_VECTOR.name, fields, &registry).unwrap_err();
        assert_eq!(
            error,
            BehaviorError::MissingField {
                tag: TWO_VECTOR.name,
                field: "y".to_owned(),
            }
        );
    }

    #[test]
    fn polar_components_derive_cartesian_ones() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        // pt = 2 along phi = 0, at eta = 0, carrying energy 5
        let fields = IndexMap::from([
            ("pt".to_owned(), column(&[2.])),
            ("eta".to_owned(), column(&[0.])),
            ("phi".to_owned(), column(&[0.])),
            ("energy".to_owned(), column(&[5.])),
        ]);
        let values =
            RecordArray::zip(PT_ETA_PHI_E_LORENTZ_VECTOR.name, fields, &registry).unwrap();

        let x = values.x().unwrap();
        let y = values.y().unwrap();
        let z = values.z().unwrap();
        let t = values.t().unwrap();
        assert!((x[[0]] - 2.).abs() < 1e-12);
        assert!(y[[0]].abs() < 1e-12);
        assert!(z[[0]].abs() < 1e-12);
        assert_eq!(t[[0]], 5.);
    }

    #[test]
    fn planar_records_have_no_time_component() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let fields = IndexMap::from([
            ("x".to_owned(), column(&[1.])),
            ("y".to_owned(), column(&[0.])),
        ]);
        let values = RecordArray::zip(TWO_VECTOR.name, fields, &registry).unwrap();
        assert_eq!(
            values.t().unwrap_err(),
            BehaviorError::MissingField {
                tag: TWO_VECTOR.name,
                field: "t".to_owned(),
            }
        );
    }

    #[test]
    fn point_lookups_extract_single_records() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let fields = IndexMap::from([
            ("x".to_owned(), column(&[1., 4.])),
            ("y".to_owned(), column(&[2., 5.])),
            ("z".to_owned(), column(&[3., 6.])),
            ("t".to_owned(), column(&[10., 20.])),
        ]);
        let values = RecordArray::zip(LORENTZ_VECTOR.name, fields, &registry).unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values.momentum_at(1).unwrap(), Momentum::new(4., 5., 6., 20.));
        assert!(matches!(
            values.momentum_at(2),
            Err(BehaviorError::IndexOutOfBounds { index: 2, len: 2 })
        ));
    }

    #[test]
    fn derived_kinematics_match_their_definitions() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let fields = IndexMap::from([
            ("x".to_owned(), column(&[3.])),
            ("y".to_owned(), column(&[4.])),
            ("z".to_owned(), column(&[0.])),
            ("t".to_owned(), column(&[13.])),
        ]);
        let values = RecordArray::zip(LORENTZ_VECTOR.name, fields, &registry).unwrap();

        assert_eq!(values.pt().unwrap()[[0]], 5.);
        assert_eq!(values.mass2().unwrap()[[0]], 144.);
        assert_eq!(values.mass().unwrap()[[0]], 12.);
    }

    #[test]
    fn projections_drop_the_higher_components() {
        let registry = BehaviorRegistry::with_vector_behaviors();
        let fields = IndexMap::from([
            ("x".to_owned(), column(&[1.])),
            ("y".to_owned(), column(&[2.])),
            ("z".to_owned(), column(&[3.])),
            ("t".to_owned(), column(&[4.])),
        ]);
        let values = RecordArray::zip(LORENTZ_VECTOR.name, fields, &registry).unwrap();

        let planar = values.project_2d().unwrap();
        assert_eq!(planar.tag(), TWO_VECTOR.name);
        assert_eq!(*planar.field("x").unwrap(), column(&[1.]));
        assert!(!planar.has_field("z"));

        let spatial = values.project_3d().unwrap();
        assert_eq!(spatial.tag(), "ThreeVector");
        assert_eq!(*spatial.field("z").unwrap(), column(&[3.]));
    }
}
