//! Interoperability contracts for metrology libraries.
//!
//! `metrology-apis` is the user-facing crate in this workspace. It re-exports the contracts from
//! `metrology-apis-core` and ships `metrology-si` as [`si`], a reference implementation of them.
//!
//! Code written against the contracts never names a concrete library: it receives an object, asks
//! it for its namespace through [`HasMetrologyNamespace`], and coerces labels and values with that
//! namespace.
//!
//! # What this crate solves
//!
//! - Library-agnostic signatures: `fn f<Q: Quantity>(q: &Q)` accepts any conforming quantity type.
//! - Version-aware discovery of an implementation's coercion functions.
//! - Run-time conformance checks for objects whose shape is only known at run time.
//!
//! # What this crate does not try to solve
//!
//! - A single unit system for every library; each implementation keeps its own types.
//! - Cross-library conversion: a namespace only ever produces its own types.
//!
//! # Quick start
//!
//! ```rust
//! use metrology_apis::si::{SiNamespace, SiQuantity};
//! use metrology_apis::{HasMetrologyNamespace, MetrologyNamespace, Quantity, QuantityArg, Unit};
//!
//! fn in_metres<Q>(q: Q) -> f64
//! where
//!     Q: HasMetrologyNamespace<Namespace = SiNamespace<f64>>,
//!     SiQuantity<f64>: From<Q>,
//! {
//!     let ns = q.metrology_namespace(None).unwrap();
//!     let m = ns.asunit("m".into()).unwrap();
//!     *ns.asquantity(QuantityArg::Quantity(q.into()), &m).unwrap().value()
//! }
//!
//! let d = SiQuantity::new(3.5, "km".parse().unwrap());
//! assert_eq!(in_metres(d.clone()), 3500.0);
//! assert!(d.unit().is_compatible(&"ft".parse().unwrap()));
//! ```
//!
//! # Incorrect usage (type error)
//!
//! Quantities have no `+` operator; operand compatibility is checked at run time and reported
//! as an error from [`Quantity::add`].
//!
//! ```compile_fail
//! use metrology_apis::si::SiQuantity;
//!
//! let a = SiQuantity::new(1.0, "m".parse().unwrap());
//! let b = SiQuantity::new(1.0, "s".parse().unwrap());
//! let _ = a + b;
//! ```
//!
//! # Panics and errors
//!
//! Nothing panics on user input. Coercions return [`ConversionError`], discovery returns
//! [`VersionError`], quantity operators return [`IncompatibleOperandError`] and conformance checks
//! return [`ConformanceError`]; [`MetrologyError`] unifies them. The bare `*` and `/` operators on
//! [`Rational`] and on the reference dimensions and units panic when an exponent leaves the `i64`
//! range; their `checked_*` forms and the quantity operators report it instead.
//!
//! # SemVer and stability
//!
//! This workspace is currently `0.0.x`. Expect breaking changes until API version `1.0` is frozen.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub use metrology_apis_core::*;

/// Reference SI implementation.
pub use metrology_si as si;
