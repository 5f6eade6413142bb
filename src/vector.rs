//! Generic vector behaviors for columnar records
//!
//! This module defines the behavior registry which generic operator
//! resolution works from, together with the standard vector flavors: planar
//! and spatial vectors plus Lorentz vectors in Cartesian and two
//! transverse-polar coordinate systems.
//!
//! A flavor used to be a class in an inheritance lattice; here it is a
//! static [`BehaviorClass`] descriptor composing a field schema, a
//! coordinate system and operator implementations. The registry is an
//! explicit context object: it is populated once during program
//! initialization and read-only afterwards, so no locking is needed around
//! the dispatch tables.

use crate::{
    columnar::{self, Column},
    error::Result,
    numeric::Float,
    record::RecordArray,
};
use indexmap::IndexMap;
use log::{debug, trace};
use std::{collections::HashMap, fmt};

/// Elementwise binary operators subject to dispatch
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinaryOp {
    /// Elementwise addition
    Add,

    /// Elementwise subtraction
    Subtract,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(fmt, "add"),
            BinaryOp::Subtract => write!(fmt, "subtract"),
        }
    }
}

/// Coordinate system in which a behavior class stores its records
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coordinates {
    /// Cartesian planar records, with fields `x` and `y`
    Cartesian2,

    /// Cartesian spatial records, with fields `x`, `y` and `z`
    Cartesian3,

    /// Cartesian space-time records, with fields `x`, `y`, `z` and `t`
    Cartesian4,

    /// Transverse-polar records, with fields `pt`, `eta`, `phi` and `mass`
    PtEtaPhiM,

    /// Transverse-polar records, with fields `pt`, `eta`, `phi` and `energy`
    PtEtaPhiE,
}

/// Implementation of a binary operator between two record arrays
pub type BinaryFn =
    for<'l, 'r> fn(&RecordArray<'l>, &RecordArray<'r>) -> Result<RecordArray<'l>>;

/// Implementation of an axis reduction over one record array
pub type ReduceFn = for<'a> fn(&RecordArray<'a>, isize) -> Result<RecordArray<'a>>;

/// Derivation of one Cartesian component from a record array
pub(crate) type Accessor = for<'a> fn(&RecordArray<'a>) -> Result<Column>;

/// Behavior of one vector flavor
///
/// Two classes are the same class when they are the same `static`: identity
/// is pointer identity, checked through [`BehaviorClass::same`].
pub struct BehaviorClass {
    /// Type tag this class registers under
    pub name: &'static str,

    /// Fields a record must provide to carry this tag
    pub required_fields: &'static [&'static str],

    /// Coordinate system used to derive Cartesian components
    pub coordinates: Coordinates,

    /// Elementwise addition of two arrays of this flavor
    pub add: BinaryFn,

    /// Elementwise subtraction of two arrays of this flavor
    pub subtract: BinaryFn,

    /// Axis reduction summing each component independently
    pub sum: ReduceFn,
}
//
impl BehaviorClass {
    /// Check whether two class references denote the same class
    pub fn same(lhs: &'static BehaviorClass, rhs: &'static BehaviorClass) -> bool {
        std::ptr::eq(lhs, rhs)
    }
}

impl fmt::Debug for BehaviorClass {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("BehaviorClass")
            .field("name", &self.name)
            .field("required_fields", &self.required_fields)
            .field("coordinates", &self.coordinates)
            .finish_non_exhaustive()
    }
}

/// Projection and re-tagging targets associated with one type tag
#[derive(Clone, Copy, Debug)]
pub struct Projections {
    /// Class produced by projecting onto the transverse plane
    pub two_d: &'static BehaviorClass,

    /// Class produced by projecting onto 3-dimensional space
    pub three_d: &'static BehaviorClass,

    /// Class produced by projecting onto Cartesian space-time
    pub four_d: &'static BehaviorClass,

    /// Class used when the array is re-tagged as a plain momentum
    pub momentum: &'static BehaviorClass,
}

/// Shared behavior registry consulted by generic operator resolution
///
/// This bundles the tag-to-class behavior map, the operator-dispatch table,
/// the precedence ranking used to combine two differently-flavored arrays,
/// and the per-tag projection classes. Mutation happens through the
/// registration functions, which overwrite entries with identical values
/// when re-applied, so repeating a registration is harmless.
#[derive(Default)]
pub struct BehaviorRegistry {
    /// Known behavior classes, keyed by type tag
    classes: IndexMap<&'static str, &'static BehaviorClass>,

    /// Classes visited by the cross-flavor dispatch registration loops
    binary_dispatch_classes: IndexMap<&'static str, &'static BehaviorClass>,

    /// Precedence list: when combining two flavors, the one whose class
    /// sits at the lower index provides the implementation
    rank: Vec<&'static BehaviorClass>,

    /// Operator-dispatch table, keyed by operator and operand tags
    table: HashMap<(BinaryOp, &'static str, &'static str), BinaryFn>,

    /// Projection classes, keyed by type tag
    projections: HashMap<&'static str, Projections>,
}
//
impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the standard vector behaviors
    pub fn with_vector_behaviors() -> Self {
        let mut registry = Self::new();
        register_vector_behaviors(&mut registry);
        registry
    }

    /// Register a behavior class under its tag
    ///
    /// This also installs the class's same-tag operator entries, so that
    /// two arrays sharing the tag can be combined without further wiring.
    pub fn register_class(&mut self, class: &'static BehaviorClass) {
        trace!("registering behavior class `{}`", class.name);
        self.classes.insert(class.name, class);
        self.table
            .insert((BinaryOp::Add, class.name, class.name), class.add);
        self.table
            .insert((BinaryOp::Subtract, class.name, class.name), class.subtract);
    }

    /// Look up the behavior class registered under a tag
    pub fn class_for(&self, tag: &str) -> Option<&'static BehaviorClass> {
        self.classes.get(tag).copied()
    }

    /// Declare a tag eligible for cross-flavor binary dispatch
    ///
    /// Coordinate-system variants usually map their tag to the Cartesian
    /// class which implements their arithmetic.
    pub fn register_binary_dispatch_class(
        &mut self,
        tag: &'static str,
        class: &'static BehaviorClass,
    ) {
        self.binary_dispatch_classes.insert(tag, class);
    }

    /// Tags currently eligible for cross-flavor binary dispatch, in
    /// registration order
    pub fn binary_dispatch_classes(
        &self,
    ) -> impl Iterator<Item = (&'static str, &'static BehaviorClass)> + '_ {
        self.binary_dispatch_classes
            .iter()
            .map(|(&tag, &class)| (tag, class))
    }

    /// Append a class to the precedence list, unless it is already ranked
    pub fn push_rank(&mut self, class: &'static BehaviorClass) {
        if self.rank_of(class).is_none() {
            self.rank.push(class);
        }
    }

    /// Position of a class in the precedence list (lower index wins)
    pub fn rank_of(&self, class: &'static BehaviorClass) -> Option<usize> {
        self.rank
            .iter()
            .position(|&ranked| BehaviorClass::same(ranked, class))
    }

    /// Pick the higher-precedence of two classes
    ///
    /// Ties resolve to the left operand. A class absent from the precedence
    /// list loses to any ranked class.
    pub fn winner(
        &self,
        lhs: &'static BehaviorClass,
        rhs: &'static BehaviorClass,
    ) -> &'static BehaviorClass {
        let lhs_rank = self.rank_of(lhs).unwrap_or(usize::MAX);
        let rhs_rank = self.rank_of(rhs).unwrap_or(usize::MAX);
        if rhs_rank < lhs_rank {
            rhs
        } else {
            lhs
        }
    }

    /// Install a binary operator implementation for a pair of tags
    pub fn insert_binary(
        &mut self,
        op: BinaryOp,
        lhs: &'static str,
        rhs: &'static str,
        implementation: BinaryFn,
    ) {
        trace!("installing `{op}` dispatch entry for (`{lhs}`, `{rhs}`)");
        self.table.insert((op, lhs, rhs), implementation);
    }

    /// Look up the implementation of an operator for a pair of tags
    pub fn binary(&self, op: BinaryOp, lhs: &'static str, rhs: &'static str) -> Option<BinaryFn> {
        self.table.get(&(op, lhs, rhs)).copied()
    }

    /// Number of installed dispatch entries
    pub fn num_binary_entries(&self) -> usize {
        self.table.len()
    }

    /// Associate projection classes with a tag
    pub fn set_projections(&mut self, tag: &'static str, projections: Projections) {
        self.projections.insert(tag, projections);
    }

    /// Look up the projection classes of a tag
    pub fn projections(&self, tag: &'static str) -> Option<Projections> {
        self.projections.get(tag).copied()
    }
}

impl fmt::Debug for BehaviorRegistry {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("BehaviorRegistry")
            .field("classes", &self.classes.keys().collect::<Vec<_>>())
            .field(
                "rank",
                &self.rank.iter().map(|class| class.name).collect::<Vec<_>>(),
            )
            .field("num_binary_entries", &self.table.len())
            .finish_non_exhaustive()
    }
}

// ### STANDARD VECTOR FLAVORS ###

/// Planar vector behavior
///
/// Records carrying this tag must provide fields `x` and `y`.
pub static TWO_VECTOR: BehaviorClass = BehaviorClass {
    name: "TwoVector",
    required_fields: &["x", "y"],
    coordinates: Coordinates::Cartesian2,
    add: add_two_vectors,
    subtract: subtract_two_vectors,
    sum: sum_two_vectors,
};

/// Spatial vector behavior
///
/// Records carrying this tag must provide fields `x`, `y` and `z`.
pub static THREE_VECTOR: BehaviorClass = BehaviorClass {
    name: "ThreeVector",
    required_fields: &["x", "y", "z"],
    coordinates: Coordinates::Cartesian3,
    add: add_three_vectors,
    subtract: subtract_three_vectors,
    sum: sum_three_vectors,
};

/// Cartesian Lorentz vector behavior
///
/// Records carrying this tag must provide fields `x`, `y`, `z` and `t`.
pub static LORENTZ_VECTOR: BehaviorClass = BehaviorClass {
    name: "LorentzVector",
    required_fields: &["x", "y", "z", "t"],
    coordinates: Coordinates::Cartesian4,
    add: add_lorentz_vectors,
    subtract: subtract_lorentz_vectors,
    sum: sum_lorentz_vectors,
};

/// Lorentz vector behavior in eta, mass coordinates
///
/// Records carrying this tag must provide fields `pt`, `eta`, `phi` and
/// `mass`. Arithmetic derives Cartesian components first, so combining two
/// such arrays produces a Cartesian Lorentz vector.
pub static PT_ETA_PHI_M_LORENTZ_VECTOR: BehaviorClass = BehaviorClass {
    name: "PtEtaPhiMLorentzVector",
    required_fields: &["pt", "eta", "phi", "mass"],
    coordinates: Coordinates::PtEtaPhiM,
    add: add_lorentz_vectors,
    subtract: subtract_lorentz_vectors,
    sum: sum_lorentz_vectors,
};

/// Lorentz vector behavior in eta, energy coordinates
///
/// Records carrying this tag must provide fields `pt`, `eta`, `phi` and
/// `energy`.
pub static PT_ETA_PHI_E_LORENTZ_VECTOR: BehaviorClass = BehaviorClass {
    name: "PtEtaPhiELorentzVector",
    required_fields: &["pt", "eta", "phi", "energy"],
    coordinates: Coordinates::PtEtaPhiE,
    add: add_lorentz_vectors,
    subtract: subtract_lorentz_vectors,
    sum: sum_lorentz_vectors,
};

/// Register the standard vector behaviors into a registry
///
/// Classes, dispatch eligibility, precedence, the cross-flavor dispatch
/// table and projection classes are all installed here. Re-applying this
/// registration overwrites every entry with an identical value.
pub fn register_vector_behaviors(registry: &mut BehaviorRegistry) {
    debug!("registering standard vector behaviors");

    // ### BEHAVIOR CLASSES ###

    registry.register_class(&TWO_VECTOR);
    registry.register_class(&THREE_VECTOR);
    registry.register_class(&LORENTZ_VECTOR);
    registry.register_class(&PT_ETA_PHI_M_LORENTZ_VECTOR);
    registry.register_class(&PT_ETA_PHI_E_LORENTZ_VECTOR);

    // ### DISPATCH ELIGIBILITY ###

    // Coordinate variants dispatch through the Cartesian class which
    // implements their arithmetic
    registry.register_binary_dispatch_class(TWO_VECTOR.name, &TWO_VECTOR);
    registry.register_binary_dispatch_class(THREE_VECTOR.name, &THREE_VECTOR);
    registry.register_binary_dispatch_class(LORENTZ_VECTOR.name, &LORENTZ_VECTOR);
    registry.register_binary_dispatch_class(PT_ETA_PHI_M_LORENTZ_VECTOR.name, &LORENTZ_VECTOR);
    registry.register_binary_dispatch_class(PT_ETA_PHI_E_LORENTZ_VECTOR.name, &LORENTZ_VECTOR);

    // ### PRECEDENCE ###

    // Lower dimensionality wins: only the common components of two mixed
    // operands can be combined
    registry.push_rank(&TWO_VECTOR);
    registry.push_rank(&THREE_VECTOR);
    registry.push_rank(&LORENTZ_VECTOR);

    // ### CROSS-FLAVOR DISPATCH ###

    let pairs: Vec<_> = registry.binary_dispatch_classes().collect();
    for &(lhs_tag, lhs_class) in &pairs {
        for &(rhs_tag, rhs_class) in &pairs {
            let out = registry.winner(lhs_class, rhs_class);
            registry.insert_binary(BinaryOp::Add, lhs_tag, rhs_tag, out.add);
            registry.insert_binary(BinaryOp::Subtract, lhs_tag, rhs_tag, out.subtract);
        }
    }

    // ### PROJECTIONS ###

    registry.set_projections(
        TWO_VECTOR.name,
        Projections {
            two_d: &TWO_VECTOR,
            three_d: &THREE_VECTOR,
            four_d: &LORENTZ_VECTOR,
            momentum: &TWO_VECTOR,
        },
    );
    registry.set_projections(
        THREE_VECTOR.name,
        Projections {
            two_d: &TWO_VECTOR,
            three_d: &THREE_VECTOR,
            four_d: &LORENTZ_VECTOR,
            momentum: &THREE_VECTOR,
        },
    );
    for tag in [
        LORENTZ_VECTOR.name,
        PT_ETA_PHI_M_LORENTZ_VECTOR.name,
        PT_ETA_PHI_E_LORENTZ_VECTOR.name,
    ] {
        registry.set_projections(
            tag,
            Projections {
                two_d: &TWO_VECTOR,
                three_d: &THREE_VECTOR,
                four_d: &LORENTZ_VECTOR,
                momentum: &LORENTZ_VECTOR,
            },
        );
    }
}

// ### COMPONENT ACCESS ###

/// Cartesian x component of a record array
pub(crate) fn comp_x(values: &RecordArray<'_>) -> Result<Column> {
    values.x()
}

/// Cartesian y component of a record array
pub(crate) fn comp_y(values: &RecordArray<'_>) -> Result<Column> {
    values.y()
}

/// Cartesian z component of a record array
pub(crate) fn comp_z(values: &RecordArray<'_>) -> Result<Column> {
    values.z()
}

/// Cartesian t component of a record array
pub(crate) fn comp_t(values: &RecordArray<'_>) -> Result<Column> {
    values.t()
}

/// Electric charge of a record array
pub(crate) fn comp_charge(values: &RecordArray<'_>) -> Result<Column> {
    values.charge()
}

/// Components combined by planar vector arithmetic
pub(crate) const PLANAR_COMPONENTS: &[(&str, Accessor)] = &[("x", comp_x), ("y", comp_y)];

/// Components combined by spatial vector arithmetic
pub(crate) const SPATIAL_COMPONENTS: &[(&str, Accessor)] =
    &[("x", comp_x), ("y", comp_y), ("z", comp_z)];

/// Components combined by Lorentz vector arithmetic
pub(crate) const SPACETIME_COMPONENTS: &[(&str, Accessor)] =
    &[("x", comp_x), ("y", comp_y), ("z", comp_z), ("t", comp_t)];

// ### OPERATOR IMPLEMENTATIONS ###

/// Zip an elementwise combination of two records' components under a tag
pub(crate) fn combine<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
    components: &[(&str, Accessor)],
    out_tag: &str,
    op: fn(Float, Float) -> Float,
) -> Result<RecordArray<'l>> {
    let mut fields = IndexMap::new();
    for &(name, accessor) in components {
        let l = accessor(lhs)?;
        let r = accessor(rhs)?;
        fields.insert(name.to_owned(), columnar::broadcast_with(&l, &r, op)?);
    }
    RecordArray::zip(out_tag, fields, lhs.behavior())
}

/// Zip an axis reduction of each of a record's components under a tag
pub(crate) fn reduce<'a>(
    values: &RecordArray<'a>,
    components: &[(&str, Accessor)],
    out_tag: &str,
    axis: isize,
) -> Result<RecordArray<'a>> {
    let mut fields = IndexMap::new();
    for &(name, accessor) in components {
        fields.insert(
            name.to_owned(),
            columnar::sum_axis(&accessor(values)?, axis)?,
        );
    }
    RecordArray::zip(out_tag, fields, values.behavior())
}

/// Add two planar vectors elementwise using `x` and `y` components
fn add_two_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, PLANAR_COMPONENTS, TWO_VECTOR.name, |l, r| l + r)
}

/// Subtract two planar vectors elementwise using `x` and `y` components
fn subtract_two_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, PLANAR_COMPONENTS, TWO_VECTOR.name, |l, r| l - r)
}

/// Sum an array of planar vectors along an axis
fn sum_two_vectors<'a>(values: &RecordArray<'a>, axis: isize) -> Result<RecordArray<'a>> {
    reduce(values, PLANAR_COMPONENTS, TWO_VECTOR.name, axis)
}

/// Add two spatial vectors elementwise using `x`, `y` and `z` components
fn add_three_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, SPATIAL_COMPONENTS, THREE_VECTOR.name, |l, r| l + r)
}

/// Subtract two spatial vectors elementwise using `x`, `y` and `z` components
fn subtract_three_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, SPATIAL_COMPONENTS, THREE_VECTOR.name, |l, r| l - r)
}

/// Sum an array of spatial vectors along an axis
fn sum_three_vectors<'a>(values: &RecordArray<'a>, axis: isize) -> Result<RecordArray<'a>> {
    reduce(values, SPATIAL_COMPONENTS, THREE_VECTOR.name, axis)
}

/// Add two Lorentz vectors elementwise using `x`, `y`, `z` and `t` components
fn add_lorentz_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, SPACETIME_COMPONENTS, LORENTZ_VECTOR.name, |l, r| {
        l + r
    })
}

/// Subtract two Lorentz vectors elementwise using `x`, `y`, `z` and `t`
/// components
pub(crate) fn subtract_lorentz_vectors<'l>(
    lhs: &RecordArray<'l>,
    rhs: &RecordArray<'_>,
) -> Result<RecordArray<'l>> {
    combine(lhs, rhs, SPACETIME_COMPONENTS, LORENTZ_VECTOR.name, |l, r| {
        l - r
    })
}

/// Sum an array of Lorentz vectors along an axis
fn sum_lorentz_vectors<'a>(values: &RecordArray<'a>, axis: isize) -> Result<RecordArray<'a>> {
    reduce(values, SPACETIME_COMPONENTS, LORENTZ_VECTOR.name, axis)
}
