//! Interoperability contracts for dimensions, units and quantities.
//!
//! `metrology-apis-core` defines *what* a metrology library must provide so that generic code can
//! consume it, without choosing *how* any of it is computed:
//!
//! - A *dimension* is any type implementing [`Dimension`]: closed under `*`, `/` and integer powers.
//! - A *unit* implements [`Unit`]: it composes like a dimension and reports the dimension it belongs to.
//! - A *quantity* implements [`Quantity`]: a value tagged with a unit, with comparison, unary,
//!   binary and power operators whose value semantics come from the capabilities in [`ops`].
//! - A *namespace* implements [`MetrologyNamespace`]: the coercion functions `asdimension`,
//!   `asunit` and `asquantity` of one implementation.
//! - Any object may implement [`HasMetrologyNamespace`] to hand out that namespace for a
//!   requested API version.
//!
//! Most users should depend on `metrology-apis` (the facade crate), which also ships a reference SI
//! implementation.
//!
//! # What this crate solves
//!
//! - One vocabulary for writing code generic over metrology libraries.
//! - Version-aware discovery of an implementation's coercion functions.
//! - Run-time conformance checks ([`Protocol::check`]) for objects whose shape is not known to the
//!   type system.
//!
//! # What this crate does not try to solve
//!
//! - Unit conversion, unit-string grammars, registries or formatting; those belong to implementations.
//! - Numeric semantics of values; a quantity's operators defer to the value type.
//!
//! # Quick start
//!
//! Generic code only names the contracts:
//!
//! ```rust
//! use metrology_apis_core::{Dimension, Unit};
//!
//! fn same_kind<U: Unit>(a: &U, b: &U) -> bool {
//!     a.dimension() == b.dimension()
//! }
//!
//! fn is_identity<D: Dimension>(d: &D) -> bool {
//!     d.divide(d).is_dimensionless()
//! }
//! # let _ = (same_kind::<NoUnit>, is_identity::<NoDim>);
//! # #[derive(Clone, Debug, PartialEq)] struct NoDim;
//! # impl core::ops::Mul for NoDim { type Output = Self; fn mul(self, _: Self) -> Self { NoDim } }
//! # impl core::ops::Div for NoDim { type Output = Self; fn div(self, _: Self) -> Self { NoDim } }
//! # impl Dimension for NoDim { fn dimensionless() -> Self { NoDim } }
//! # #[derive(Clone, Debug, PartialEq)] struct NoUnit;
//! # impl core::ops::Mul for NoUnit { type Output = Self; fn mul(self, _: Self) -> Self { NoUnit } }
//! # impl core::ops::Div for NoUnit { type Output = Self; fn div(self, _: Self) -> Self { NoUnit } }
//! # impl Unit for NoUnit {
//! #     type Dimension = NoDim;
//! #     fn dimension(&self) -> NoDim { NoDim }
//! #     fn pow(&self, _: metrology_apis_core::Exponent) -> Result<Self, metrology_apis_core::ConversionError> { Ok(NoUnit) }
//! # }
//! ```
//!
//! # Panics and errors
//!
//! The contracts report failures through the types in [`error`]:
//! [`ConversionError`] from coercions, [`VersionError`] from discovery, [`IncompatibleOperandError`]
//! from quantity operators and [`ConformanceError`] from run-time checks. The only panics are the
//! arithmetic operators of [`Rational`] on `i64` overflow; their `checked_*` counterparts return
//! `None` instead.
//!
//! # SemVer and stability
//!
//! This crate is currently `0.0.x`. Expect breaking changes until the API version `1.0` is frozen.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

// ─────────────────────────────────────────────────────────────────────────────
// Core modules
// ─────────────────────────────────────────────────────────────────────────────

#[macro_use]
mod macros;

pub mod conformance;
pub mod error;
pub mod ops;

mod dimension;
mod exponent;
mod namespace;
mod quantity;
mod unit;
mod version;

#[cfg(test)]
mod fixtures;

// ─────────────────────────────────────────────────────────────────────────────
// Public re-exports of core types
// ─────────────────────────────────────────────────────────────────────────────

pub use conformance::{CapabilitySet, Introspect, Operation, Protocol};
pub use dimension::{Decomposition, Dimension};
pub use error::{
    ConformanceError, ConversionError, IncompatibleOperandError, MetrologyError, OpResult,
    VersionError,
};
pub use exponent::{Exponent, Rational};
pub use namespace::{
    DimensionArg, HasMetrologyNamespace, MetrologyNamespace, QuantityArg, UnitArg,
};
pub use quantity::Quantity;
pub use unit::Unit;
pub use version::{ApiVersion, SupportedVersions};

/// Version of the interoperability contracts this crate describes.
pub const API_VERSION: &str = "1.0";

#[cfg(test)]
mod tests {
    use super::ops::*;
    use super::*;
    use crate::fixtures::*;

    // ─────────────────────────────────────────────────────────────────────────────
    // Generic consumers
    // ─────────────────────────────────────────────────────────────────────────────

    fn sum_pair<T>(
        a: &T,
        b: &T::Rebind<T::Value>,
    ) -> OpResult<T::Rebind<<T::Value as CanAdd>::Output>>
    where
        T: Quantity,
        T::Value: CanAdd,
    {
        a.add(b)
    }

    #[test]
    fn generic_code_adds_compatible_quantities() {
        let sum = sum_pair(&q(1.0, METER), &q(2.5, METER)).unwrap();
        assert_eq!(*sum.value(), 3.5);
        assert_eq!(*sum.unit(), METER);
    }

    #[test]
    fn generic_code_surfaces_incompatible_units() {
        let err = sum_pair(&q(1.0, METER), &q(2.0, SECOND)).unwrap_err();
        assert_eq!(err.operation, "add");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Operator shapes
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn comparisons_defer_to_values() {
        let a = q(1.0_f64, METER);
        let b = q(2.0_f64, METER);
        assert_eq!(a.equals(&a), Ok(true));
        assert_eq!(a.not_equals(&b), Ok(true));
        assert_eq!(a.less_than(&b), Ok(true));
        assert_eq!(a.less_equal(&a), Ok(true));
        assert_eq!(a.greater_than(&b), Ok(false));
        assert_eq!(b.greater_equal(&a), Ok(true));
        assert!(a.equals(&q(1.0, SECOND)).is_err());
    }

    #[test]
    fn mul_and_div_compose_units() {
        let d = q(100.0_f64, METER);
        let t = q(20.0_f64, SECOND);
        let v = d.div(&t).unwrap();
        assert_eq!(v.value, 5.0);
        assert_eq!(v.unit.dimension(), Dim(1, -1));
        assert_eq!(t.rdiv(&d).unwrap(), v);
        assert_eq!(d.mul(&t).unwrap(), t.rmul(&d).unwrap());
    }

    #[test]
    fn reflected_sub_swaps_operands() {
        let a = q(5_i32, METER);
        let b = q(2_i32, METER);
        assert_eq!(a.sub(&b).unwrap().value, 3);
        assert_eq!(a.rsub(&b).unwrap().value, -3);
        assert_eq!(a.radd(&b).unwrap().value, 7);
    }

    #[test]
    fn unary_keeps_unit() {
        let a = q(-2.5_f64, SECOND);
        assert_eq!(a.neg(), q(2.5, SECOND));
        assert_eq!(a.abs(), q(2.5, SECOND));
        assert_eq!(a.pos(), a);
    }

    #[test]
    fn power_raises_value_and_unit() {
        let a = q(3.0_f64, METER);
        let sq = a.pow(2_i32).unwrap();
        assert_eq!(sq.value, 9.0);
        assert_eq!(sq.unit.dimension(), Dim(2, 0));
    }

    #[test]
    fn reflected_power_needs_dimensionless_exponent() {
        let e = q(3.0_f64, ONE);
        assert_eq!(e.rpow(2.0_f64).unwrap().value, 8.0);
        assert!(q(3.0_f64, METER).rpow(2.0_f64).is_err());
    }

    #[test]
    fn value_type_is_rebound() {
        // An integer quantity raised to a real power becomes a float quantity.
        let a: Q<i32> = q(4, ONE);
        let r: Q<f64> = a.pow(0.5_f64).unwrap();
        assert!((r.value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn api_version_constant_parses() {
        assert_eq!(ApiVersion::parse(API_VERSION).unwrap().components(), &[1, 0]);
    }
}
