//! Reference SI implementation of the `metrology-apis` contracts.
//!
//! `metrology-si` provides run-time dimensions, units and quantities that satisfy every contract of
//! [`metrology_apis_core`]:
//!
//! - [`SiDimension`]: rational exponents over the seven SI base dimensions.
//! - [`SiUnit`]: a scale to the coherent SI unit plus a printable expression.
//! - [`SiQuantity`]: any value tagged with an [`SiUnit`].
//! - [`SiNamespace`]: the coercion functions, parsing labels through a [`UnitRegistry`].
//!
//! # Unit expressions
//!
//! Units parse from expressions over registered symbols and names, SI prefixes included:
//! `"km/h"`, `"kg*m/s**2"`, `"kilometers"`, `"m^(1/2)"`. The built-in registry can be extended from
//! a TOML file of `[[unit]]` tables, see [`UnitRegistry::from_file`].
//!
//! # Quick start
//!
//! ```rust
//! use metrology_apis_core::{HasMetrologyNamespace, MetrologyNamespace, Quantity, QuantityArg};
//! use metrology_si::{SiDimension, SiQuantity};
//!
//! let distance = SiQuantity::new(42.195_f64, "km".parse().unwrap());
//!
//! // Generic code discovers the namespace from the object itself.
//! let ns = distance.metrology_namespace(None).unwrap();
//! let m = ns.asunit("m".into()).unwrap();
//! let metres = ns.asquantity(QuantityArg::Quantity(distance), &m).unwrap();
//! assert!((metres.value() - 42_195.0).abs() < 1e-9);
//!
//! let speed = ns.asunit("m/s".into()).unwrap();
//! assert_eq!(ns.asdimension("velocity".into()).unwrap(), SiDimension::VELOCITY);
//! assert_eq!(metrology_apis_core::Unit::dimension(&speed), SiDimension::VELOCITY);
//! ```
//!
//! # Operators
//!
//! [`SiQuantity`] implements [`Quantity`](metrology_apis_core::Quantity): `add`, `sub` and the
//! comparisons require equal units and never convert implicitly; `mul`, `div` and `pow` compose
//! units. Convert explicitly with [`SiQuantity::to`] or
//! [`MetrologyNamespace::asquantity`](metrology_apis_core::MetrologyNamespace::asquantity).

#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod dimension;
mod expr;
mod namespace;
mod quantity;
mod registry;
mod unit;

pub use dimension::{BaseDimension, SiDimension};
pub use namespace::{SiNamespace, SUPPORTED_VERSIONS};
pub use quantity::{Rescale, SiQuantity};
pub use registry::{default_registry, RegistryError, UnitDef, UnitRegistry};
pub use unit::SiUnit;
