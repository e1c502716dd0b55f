//! Namespace discovery and coercion contracts.
//!
//! A consumer never depends on a concrete metrology library. It receives some object, asks it for
//! its [`MetrologyNamespace`] through [`HasMetrologyNamespace`], and uses the namespace's three
//! coercion functions to turn labels and raw values into that library's dimensions, units and
//! quantities.

use core::any::Any;

use crate::dimension::Dimension;
use crate::error::{ConversionError, VersionError};
use crate::quantity::Quantity;
use crate::unit::Unit;
use crate::version::ApiVersion;

/// Input accepted by [`MetrologyNamespace::asdimension`].
#[derive(Clone, Debug, PartialEq)]
pub enum DimensionArg<'a, D> {
    /// A label in the implementation's grammar (e.g. `"length"`).
    Label(&'a str),
    /// An already-conforming dimension, passed through.
    Dimension(D),
}

impl<'a, D> From<&'a str> for DimensionArg<'a, D> {
    fn from(label: &'a str) -> Self {
        Self::Label(label)
    }
}

impl<'a, D> From<&'a String> for DimensionArg<'a, D> {
    fn from(label: &'a String) -> Self {
        Self::Label(label.as_str())
    }
}

/// Input accepted by [`MetrologyNamespace::asunit`].
#[derive(Clone, Debug, PartialEq)]
pub enum UnitArg<'a, U> {
    /// A unit expression in the implementation's grammar (e.g. `"kg*m/s**2"`).
    Label(&'a str),
    /// An already-conforming unit, passed through.
    Unit(U),
}

impl<'a, U> From<&'a str> for UnitArg<'a, U> {
    fn from(label: &'a str) -> Self {
        Self::Label(label)
    }
}

impl<'a, U> From<&'a String> for UnitArg<'a, U> {
    fn from(label: &'a String) -> Self {
        Self::Label(label.as_str())
    }
}

/// Input accepted by [`MetrologyNamespace::asquantity`].
#[derive(Clone, Debug, PartialEq)]
pub enum QuantityArg<Q, V> {
    /// A raw value to tag with the unit.
    Value(V),
    /// An existing quantity to re-express in the unit.
    Quantity(Q),
}

/// A bundle of coercion functions scoped to one implementation's concrete types.
///
/// All three functions are pure. They never reach across implementations: `asunit` of one
/// namespace never yields another library's unit.
pub trait MetrologyNamespace {
    /// Value type of the implementation's quantities.
    type Value;
    /// Dimension type.
    type Dimension: Dimension;
    /// Unit type.
    type Unit: Unit<Dimension = Self::Dimension>;
    /// Quantity type.
    type Quantity: Quantity<Value = Self::Value, Unit = Self::Unit>;

    /// API version this namespace implements.
    fn api_version(&self) -> ApiVersion;

    /// Parses a dimension label or passes a dimension through.
    fn asdimension(
        &self,
        obj: DimensionArg<'_, Self::Dimension>,
    ) -> Result<Self::Dimension, ConversionError>;

    /// Parses a unit expression or passes a unit through.
    fn asunit(&self, obj: UnitArg<'_, Self::Unit>) -> Result<Self::Unit, ConversionError>;

    /// Tags a raw value with `unit`, or re-expresses an existing quantity in `unit`.
    ///
    /// Whether re-expressing converts the value or merely re-tags it is implementation-defined.
    fn asquantity(
        &self,
        obj: QuantityArg<Self::Quantity, Self::Value>,
        unit: &Self::Unit,
    ) -> Result<Self::Quantity, ConversionError>;

    /// [`MetrologyNamespace::asdimension`] for an object of unknown type.
    ///
    /// Accepts `&'static str`, `String` or `Self::Dimension`; anything else is a
    /// [`ConversionError::UnsupportedType`].
    fn asdimension_any(&self, obj: &dyn Any) -> Result<Self::Dimension, ConversionError>
    where
        Self::Dimension: 'static,
    {
        if let Some(label) = obj.downcast_ref::<&'static str>() {
            self.asdimension(DimensionArg::Label(*label))
        } else if let Some(label) = obj.downcast_ref::<String>() {
            self.asdimension(DimensionArg::Label(label.as_str()))
        } else if let Some(dim) = obj.downcast_ref::<Self::Dimension>() {
            self.asdimension(DimensionArg::Dimension(dim.clone()))
        } else {
            Err(ConversionError::UnsupportedType { target: "dimension" })
        }
    }

    /// [`MetrologyNamespace::asunit`] for an object of unknown type.
    fn asunit_any(&self, obj: &dyn Any) -> Result<Self::Unit, ConversionError>
    where
        Self::Unit: 'static,
    {
        if let Some(label) = obj.downcast_ref::<&'static str>() {
            self.asunit(UnitArg::Label(*label))
        } else if let Some(label) = obj.downcast_ref::<String>() {
            self.asunit(UnitArg::Label(label.as_str()))
        } else if let Some(unit) = obj.downcast_ref::<Self::Unit>() {
            self.asunit(UnitArg::Unit(unit.clone()))
        } else {
            Err(ConversionError::UnsupportedType { target: "unit" })
        }
    }

    /// [`MetrologyNamespace::asquantity`] for an object of unknown type.
    ///
    /// Accepts `Self::Value` or `Self::Quantity`.
    fn asquantity_any(
        &self,
        obj: &dyn Any,
        unit: &Self::Unit,
    ) -> Result<Self::Quantity, ConversionError>
    where
        Self::Value: Clone + 'static,
        Self::Quantity: Clone + 'static,
    {
        if let Some(value) = obj.downcast_ref::<Self::Value>() {
            self.asquantity(QuantityArg::Value(value.clone()), unit)
        } else if let Some(quantity) = obj.downcast_ref::<Self::Quantity>() {
            self.asquantity(QuantityArg::Quantity(quantity.clone()), unit)
        } else {
            Err(ConversionError::UnsupportedType { target: "quantity" })
        }
    }
}

/// Entry point for version-aware, duck-typed discovery.
///
/// Any type may implement this, including the dimension, unit and quantity types of an
/// implementation or objects unrelated to them.
pub trait HasMetrologyNamespace {
    /// Namespace type returned by discovery.
    type Namespace: MetrologyNamespace;

    /// Returns the namespace for `api_version`, or for the latest version when `None`.
    ///
    /// # Errors
    ///
    /// [`VersionError`] when the requested version is malformed or not implemented.
    fn metrology_namespace(
        &self,
        api_version: Option<&str>,
    ) -> Result<Self::Namespace, VersionError>;
}
