//! Runtime conformance checks.
//!
//! For Rust types, conformance is a compile-time fact: a type either implements [`Dimension`],
//! [`Unit`], [`Quantity`] or it does not. Objects whose shape is only known at run time (plugin
//! handles, values bridged in from another language) instead report the operations they provide
//! as a [`CapabilitySet`], and [`Protocol::check`] compares that set against the protocol's
//! required surface.
//!
//! ```rust
//! use metrology_apis_core::{CapabilitySet, Operation, Protocol};
//!
//! let caps: CapabilitySet = [Operation::Mul, Operation::Div, Operation::Pow].into_iter().collect();
//! let err = Protocol::Dimension.check(&caps).unwrap_err();
//! assert_eq!(err.missing, vec![Operation::RMul, Operation::RDiv]);
//! ```
//!
//! [`Dimension`]: crate::Dimension
//! [`Unit`]: crate::Unit
//! [`Quantity`]: crate::Quantity

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::dimension::Dimension;
use crate::error::ConformanceError;
use crate::namespace::{HasMetrologyNamespace, MetrologyNamespace};
use crate::ops::ValueCapabilities;
use crate::quantity::Quantity;
use crate::unit::Unit;

/// A single operation or property a protocol may require.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Namespace discovery.
    MetrologyNamespace,
    /// `dimension` property of a unit.
    Dimension,
    /// `value` property of a quantity.
    Value,
    /// `unit` property of a quantity.
    Unit,
    /// Equality.
    Eq,
    /// Inequality.
    Ne,
    /// Less-than.
    Lt,
    /// Less-or-equal.
    Le,
    /// Greater-than.
    Gt,
    /// Greater-or-equal.
    Ge,
    /// Unary plus.
    Pos,
    /// Negation.
    Neg,
    /// Absolute value.
    Abs,
    /// Addition.
    Add,
    /// Reflected addition.
    RAdd,
    /// Subtraction.
    Sub,
    /// Reflected subtraction.
    RSub,
    /// Multiplication.
    Mul,
    /// Reflected multiplication.
    RMul,
    /// Division.
    Div,
    /// Reflected division.
    RDiv,
    /// Exponentiation.
    Pow,
    /// Reflected exponentiation.
    RPow,
    /// `asdimension` coercion.
    AsDimension,
    /// `asunit` coercion.
    AsUnit,
    /// `asquantity` coercion.
    AsQuantity,
}

impl Operation {
    /// Short lowercase name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::MetrologyNamespace => "metrology_namespace",
            Self::Dimension => "dimension",
            Self::Value => "value",
            Self::Unit => "unit",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Pos => "pos",
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Add => "add",
            Self::RAdd => "radd",
            Self::Sub => "sub",
            Self::RSub => "rsub",
            Self::Mul => "mul",
            Self::RMul => "rmul",
            Self::Div => "div",
            Self::RDiv => "rdiv",
            Self::Pow => "pow",
            Self::RPow => "rpow",
            Self::AsDimension => "asdimension",
            Self::AsUnit => "asunit",
            Self::AsQuantity => "asquantity",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// The protocols an object can be checked against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// [`Dimension`](crate::Dimension).
    Dimension,
    /// [`Unit`](crate::Unit).
    Unit,
    /// [`Quantity`](crate::Quantity).
    Quantity,
    /// [`MetrologyNamespace`](crate::MetrologyNamespace).
    MetrologyNamespace,
    /// [`HasMetrologyNamespace`](crate::HasMetrologyNamespace).
    HasMetrologyNamespace,
}

const DIMENSION_OPS: &[Operation] = &[
    Operation::Mul,
    Operation::Div,
    Operation::Pow,
    Operation::RMul,
    Operation::RDiv,
];

const UNIT_OPS: &[Operation] = &[
    Operation::Dimension,
    Operation::Mul,
    Operation::Div,
    Operation::Pow,
    Operation::RMul,
    Operation::RDiv,
];

const QUANTITY_OPS: &[Operation] = &[
    Operation::Value,
    Operation::Unit,
    Operation::Eq,
    Operation::Ne,
    Operation::Lt,
    Operation::Le,
    Operation::Gt,
    Operation::Ge,
    Operation::Pos,
    Operation::Neg,
    Operation::Abs,
    Operation::Add,
    Operation::RAdd,
    Operation::Sub,
    Operation::RSub,
    Operation::Mul,
    Operation::RMul,
    Operation::Div,
    Operation::RDiv,
    Operation::Pow,
    Operation::RPow,
];

const NAMESPACE_OPS: &[Operation] = &[
    Operation::AsDimension,
    Operation::AsUnit,
    Operation::AsQuantity,
];

const DISCOVERY_OPS: &[Operation] = &[Operation::MetrologyNamespace];

impl Protocol {
    /// Operations an object must provide, in declaration order.
    pub const fn required(self) -> &'static [Operation] {
        match self {
            Self::Dimension => DIMENSION_OPS,
            Self::Unit => UNIT_OPS,
            Self::Quantity => QUANTITY_OPS,
            Self::MetrologyNamespace => NAMESPACE_OPS,
            Self::HasMetrologyNamespace => DISCOVERY_OPS,
        }
    }

    /// Fails with every missing operation when `caps` does not cover the protocol.
    pub fn check(self, caps: &CapabilitySet) -> Result<(), ConformanceError> {
        let missing: Vec<Operation> = self
            .required()
            .iter()
            .copied()
            .filter(|op| !caps.contains(*op))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            log::debug!("conformance check against {self} failed: {} missing", missing.len());
            Err(ConformanceError {
                protocol: self,
                missing,
            })
        }
    }

    /// Boolean form of [`Protocol::check`].
    pub fn conforms(self, caps: &CapabilitySet) -> bool {
        self.check(caps).is_ok()
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Dimension => "Dimension",
            Self::Unit => "Unit",
            Self::Quantity => "Quantity",
            Self::MetrologyNamespace => "MetrologyNamespace",
            Self::HasMetrologyNamespace => "HasMetrologyNamespace",
        })
    }
}

/// Set of operations an object reports to provide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapabilitySet(BTreeSet<Operation>);

impl CapabilitySet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, op: Operation) -> Self {
        self.0.insert(op);
        self
    }

    /// Builder-style removal.
    pub fn without(mut self, op: Operation) -> Self {
        self.0.remove(&op);
        self
    }

    /// Adds one operation.
    pub fn insert(&mut self, op: Operation) -> bool {
        self.0.insert(op)
    }

    /// Whether `op` is provided.
    pub fn contains(&self, op: Operation) -> bool {
        self.0.contains(&op)
    }

    /// Provided operations in order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.0.iter().copied()
    }

    /// Number of provided operations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when nothing is provided.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of `self` and `other`.
    pub fn union(mut self, other: &CapabilitySet) -> Self {
        self.0.extend(other.iter());
        self
    }

    /// Full required surface of `protocol`.
    pub fn of_protocol(protocol: Protocol) -> Self {
        protocol.required().iter().copied().collect()
    }

    /// Capabilities of a [`Dimension`] implementor.
    ///
    /// The trait's `Mul`/`Div` supertraits and its provided methods cover the whole protocol, so
    /// every implementor reports the full surface.
    pub fn of_dimension<D: Dimension>() -> Self {
        Self::of_protocol(Protocol::Dimension)
    }

    /// Capabilities of a [`Unit`] implementor; the full surface, as for dimensions.
    pub fn of_unit<U: Unit>() -> Self {
        Self::of_protocol(Protocol::Unit)
    }

    /// Capabilities of a [`Quantity`] implementor.
    ///
    /// Every quantity has `value` and `unit`. Its operators are gated on the value type's `Can*`
    /// capabilities, so the rest of the set is whatever [`ValueCapabilities`] reports for
    /// `Q::Value`: a quantity over unsigned integers lacks `neg` and does not conform.
    pub fn of_quantity<Q>() -> Self
    where
        Q: Quantity,
        Q::Value: ValueCapabilities,
    {
        Self::new()
            .with(Operation::Value)
            .with(Operation::Unit)
            .union(&<Q::Value as ValueCapabilities>::value_capabilities())
    }

    /// Capabilities of a [`MetrologyNamespace`] implementor; its three coercions are required
    /// methods.
    pub fn of_namespace<N: MetrologyNamespace>() -> Self {
        Self::of_protocol(Protocol::MetrologyNamespace)
    }

    /// Capabilities of a [`HasMetrologyNamespace`] implementor.
    pub fn of_discoverable<T: HasMetrologyNamespace + ?Sized>() -> Self {
        Self::of_protocol(Protocol::HasMetrologyNamespace)
    }
}

impl FromIterator<Operation> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Operation> for CapabilitySet {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Objects that can report their own operation surface at run time.
pub trait Introspect {
    /// Operations this object provides.
    fn capabilities(&self) -> CapabilitySet;

    /// Checks this object against `protocol`.
    fn check_conformance(&self, protocol: Protocol) -> Result<(), ConformanceError> {
        protocol.check(&self.capabilities())
    }
}
