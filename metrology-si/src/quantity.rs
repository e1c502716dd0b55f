//! Value + unit pairs.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::marker::PhantomData;

use metrology_apis_core::ops::{
    CanAbs, CanAdd, CanDiv, CanEq, CanGe, CanGt, CanLe, CanLt, CanMul, CanNe, CanNeg, CanPos,
    CanPow, CanRPow, CanSub, ValueCapabilities,
};
use metrology_apis_core::{
    CapabilitySet, ConversionError, Exponent, HasMetrologyNamespace, IncompatibleOperandError,
    Introspect, OpResult, Quantity, Unit, VersionError,
};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

use crate::namespace::SiNamespace;
use crate::unit::SiUnit;

/// Values that can be multiplied by a conversion factor.
///
/// Implemented for `f32`, `f64` and element-wise for `Vec<T>`.
pub trait Rescale {
    /// `self * factor`.
    fn rescale(&self, factor: f64) -> Self;
}

impl Rescale for f64 {
    #[inline]
    fn rescale(&self, factor: f64) -> f64 {
        self * factor
    }
}

impl Rescale for f32 {
    #[inline]
    fn rescale(&self, factor: f64) -> f32 {
        (f64::from(*self) * factor) as f32
    }
}

impl<T: Rescale> Rescale for Vec<T> {
    fn rescale(&self, factor: f64) -> Vec<T> {
        self.iter().map(|v| v.rescale(factor)).collect()
    }
}

/// A value tagged with an [`SiUnit`].
///
/// Additive operators and comparisons require equal units (see [`SiUnit::approx_eq`]) and never
/// convert implicitly: `1 km` plus `1 m` is an [`IncompatibleOperandError`]. The operators accept
/// any value type, including ones that cannot be rescaled, so conversion is a separate step:
/// [`SiQuantity::to`] or [`SiQuantity::to_unit_of`].
///
/// ```rust
/// use metrology_apis_core::Quantity;
/// use metrology_si::{SiQuantity, SiUnit};
///
/// let km: SiUnit = "km".parse().unwrap();
/// let m: SiUnit = "m".parse().unwrap();
///
/// let a = SiQuantity::new(1.5, km);
/// let b = SiQuantity::new(250.0, m.clone());
/// assert!(a.add(&b).is_err());
///
/// let sum = a.to(&m).unwrap().add(&b).unwrap();
/// assert_eq!(*sum.value(), 1750.0);
/// assert_eq!(sum.to_string(), "1750 m");
///
/// let sum = a.add(&b.to_unit_of(&a).unwrap()).unwrap();
/// assert_eq!(sum.to_string(), "1.75 km");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SiQuantity<V = f64> {
    value: V,
    unit: SiUnit,
}

impl<V> SiQuantity<V> {
    /// Tags `value` with `unit`.
    pub fn new(value: V, unit: SiUnit) -> Self {
        Self { value, unit }
    }

    /// The value, dropping the unit.
    pub fn into_value(self) -> V {
        self.value
    }

    /// Value and unit.
    pub fn into_parts(self) -> (V, SiUnit) {
        (self.value, self.unit)
    }

    /// Applies `f` to the value, keeping the unit.
    pub fn map<W>(self, f: impl FnOnce(V) -> W) -> SiQuantity<W> {
        SiQuantity {
            value: f(self.value),
            unit: self.unit,
        }
    }

    fn with_value<W>(&self, value: W) -> SiQuantity<W> {
        SiQuantity {
            value,
            unit: self.unit.clone(),
        }
    }

    fn same_unit<W>(&self, other: &SiQuantity<W>, operation: &'static str) -> OpResult<()> {
        if self.unit.approx_eq(&other.unit) {
            Ok(())
        } else {
            Err(IncompatibleOperandError::new(
                operation,
                &self.unit,
                &other.unit,
            ))
        }
    }
}

impl<V: Rescale> SiQuantity<V> {
    /// The same amount expressed in `unit`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::IncompatibleUnit`] when the dimensions differ.
    pub fn to(&self, unit: &SiUnit) -> Result<SiQuantity<V>, ConversionError> {
        let factor = self.unit.conversion_factor(unit)?;
        Ok(SiQuantity {
            value: self.value.rescale(factor),
            unit: unit.clone(),
        })
    }

    /// The same amount expressed in the unit of `other`, ready for its additive operators and
    /// comparisons.
    ///
    /// # Errors
    ///
    /// [`ConversionError::IncompatibleUnit`] when the dimensions differ.
    pub fn to_unit_of<W>(&self, other: &SiQuantity<W>) -> Result<SiQuantity<V>, ConversionError> {
        self.to(&other.unit)
    }
}

impl<V: Display> Display for SiQuantity<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Unit of a product or quotient; exponent overflow is an incompatible pair of operands.
fn compose(
    lhs: &SiUnit,
    rhs: &SiUnit,
    operation: &'static str,
    op: fn(&SiUnit, &SiUnit) -> Option<SiUnit>,
) -> OpResult<SiUnit> {
    op(lhs, rhs).ok_or_else(|| IncompatibleOperandError::new(operation, lhs, rhs))
}

impl<V> Quantity for SiQuantity<V> {
    type Value = V;
    type Unit = SiUnit;
    type Rebind<W> = SiQuantity<W>;

    fn value(&self) -> &V {
        &self.value
    }

    fn unit(&self) -> &SiUnit {
        &self.unit
    }

    fn equals<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanEq<W>>::Output>
    where
        V: CanEq<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_eq(&other.value))
    }

    fn not_equals<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanNe<W>>::Output>
    where
        V: CanNe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_ne(&other.value))
    }

    fn less_than<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanLt<W>>::Output>
    where
        V: CanLt<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_lt(&other.value))
    }

    fn less_equal<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanLe<W>>::Output>
    where
        V: CanLe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_le(&other.value))
    }

    fn greater_than<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanGt<W>>::Output>
    where
        V: CanGt<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_gt(&other.value))
    }

    fn greater_equal<W>(&self, other: &SiQuantity<W>) -> OpResult<<V as CanGe<W>>::Output>
    where
        V: CanGe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_ge(&other.value))
    }

    fn pos(&self) -> SiQuantity<<V as CanPos>::Output>
    where
        V: CanPos,
    {
        self.with_value(self.value.value_pos())
    }

    fn neg(&self) -> SiQuantity<<V as CanNeg>::Output>
    where
        V: CanNeg,
    {
        self.with_value(self.value.value_neg())
    }

    fn abs(&self) -> SiQuantity<<V as CanAbs>::Output>
    where
        V: CanAbs,
    {
        self.with_value(self.value.value_abs())
    }

    fn add<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<V as CanAdd<W>>::Output>>
    where
        V: CanAdd<W>,
    {
        self.same_unit(other, "add")?;
        Ok(self.with_value(self.value.value_add(&other.value)))
    }

    fn radd<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<W as CanAdd<V>>::Output>>
    where
        W: CanAdd<V>,
    {
        self.same_unit(other, "add")?;
        Ok(self.with_value(other.value.value_add(&self.value)))
    }

    fn sub<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<V as CanSub<W>>::Output>>
    where
        V: CanSub<W>,
    {
        self.same_unit(other, "subtract")?;
        Ok(self.with_value(self.value.value_sub(&other.value)))
    }

    fn rsub<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<W as CanSub<V>>::Output>>
    where
        W: CanSub<V>,
    {
        self.same_unit(other, "subtract")?;
        Ok(self.with_value(other.value.value_sub(&self.value)))
    }

    fn mul<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<V as CanMul<W>>::Output>>
    where
        V: CanMul<W>,
    {
        Ok(SiQuantity {
            value: self.value.value_mul(&other.value),
            unit: compose(&self.unit, &other.unit, "multiply", SiUnit::checked_mul)?,
        })
    }

    fn rmul<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<W as CanMul<V>>::Output>>
    where
        W: CanMul<V>,
    {
        Ok(SiQuantity {
            value: other.value.value_mul(&self.value),
            unit: compose(&other.unit, &self.unit, "multiply", SiUnit::checked_mul)?,
        })
    }

    fn div<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<V as CanDiv<W>>::Output>>
    where
        V: CanDiv<W>,
    {
        Ok(SiQuantity {
            value: self.value.value_div(&other.value),
            unit: compose(&self.unit, &other.unit, "divide", SiUnit::checked_div)?,
        })
    }

    fn rdiv<W>(&self, other: &SiQuantity<W>) -> OpResult<SiQuantity<<W as CanDiv<V>>::Output>>
    where
        W: CanDiv<V>,
    {
        Ok(SiQuantity {
            value: other.value.value_div(&self.value),
            unit: compose(&other.unit, &self.unit, "divide", SiUnit::checked_div)?,
        })
    }

    fn pow<E>(&self, exponent: E) -> OpResult<SiQuantity<<V as CanPow<E>>::Output>>
    where
        E: Into<Exponent> + Copy,
        V: CanPow<E>,
    {
        let power: Exponent = exponent.into();
        let unit = Unit::pow(&self.unit, power)
            .map_err(|_| IncompatibleOperandError::new("exponentiate", &self.unit, power))?;
        Ok(SiQuantity {
            value: self.value.value_pow(exponent),
            unit,
        })
    }

    /// Only a plain number can be an exponent: the unit must equal `1`.
    fn rpow<E>(&self, base: E) -> OpResult<SiQuantity<<V as CanRPow<E>>::Output>>
    where
        V: CanRPow<E>,
    {
        let one = SiUnit::one();
        if !self.unit.approx_eq(&one) {
            return Err(IncompatibleOperandError::new(
                "exponentiate",
                "a scalar",
                &self.unit,
            ));
        }
        Ok(SiQuantity {
            value: self.value.value_rpow(base),
            unit: one,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde
// ─────────────────────────────────────────────────────────────────────────────

/// Serialized as `{"value": ..., "unit": "<expression>"}`.
impl<V: Serialize> Serialize for SiQuantity<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SiQuantity", 2)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("unit", &self.unit)?;
        state.end()
    }
}

/// The `unit` field is parsed against the default registry; a missing `unit` is `1`.
impl<'de, V: Deserialize<'de>> Deserialize<'de> for SiQuantity<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "lowercase")]
        enum Field {
            Value,
            Unit,
        }

        struct QuantityVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for QuantityVisitor<V> {
            type Value = SiQuantity<V>;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("struct SiQuantity with value and unit fields")
            }

            fn visit_map<M>(self, mut map: M) -> Result<SiQuantity<V>, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut value: Option<V> = None;
                let mut unit: Option<SiUnit> = None;

                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Value => {
                            if value.is_some() {
                                return Err(de::Error::duplicate_field("value"));
                            }
                            value = Some(map.next_value()?);
                        }
                        Field::Unit => {
                            if unit.is_some() {
                                return Err(de::Error::duplicate_field("unit"));
                            }
                            unit = Some(map.next_value()?);
                        }
                    }
                }

                let value = value.ok_or_else(|| de::Error::missing_field("value"))?;
                Ok(SiQuantity::new(value, unit.unwrap_or_else(SiUnit::one)))
            }
        }

        deserializer.deserialize_struct(
            "SiQuantity",
            &["value", "unit"],
            QuantityVisitor(PhantomData),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Discovery
// ─────────────────────────────────────────────────────────────────────────────

impl<V: Rescale> HasMetrologyNamespace for SiQuantity<V> {
    type Namespace = SiNamespace<V>;

    fn metrology_namespace(&self, api_version: Option<&str>) -> Result<SiNamespace<V>, VersionError> {
        SiNamespace::for_version(api_version)
    }
}

impl<V: Rescale + ValueCapabilities> Introspect for SiQuantity<V> {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of_quantity::<Self>().union(&CapabilitySet::of_discoverable::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use metrology_apis_core::{MetrologyNamespace, Protocol};
    use proptest::prelude::*;

    fn u(expr: &str) -> SiUnit {
        expr.parse().unwrap()
    }

    fn q(value: f64, unit: &str) -> SiQuantity {
        SiQuantity::new(value, u(unit))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Additive operators and comparisons
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn equal_units_add_and_compare() {
        let a = q(2.0, "m");
        let b = q(3.0, "m");
        assert_eq!(a.add(&b).unwrap(), q(5.0, "m"));
        assert_eq!(a.sub(&b).unwrap(), q(-1.0, "m"));
        assert_eq!(a.rsub(&b).unwrap(), q(1.0, "m"));
        assert_eq!(a.radd(&b).unwrap(), q(5.0, "m"));
        assert_eq!(a.less_than(&b), Ok(true));
        assert_eq!(a.greater_equal(&b), Ok(false));
        assert_eq!(a.equals(&a.clone()), Ok(true));
        assert_eq!(a.not_equals(&b), Ok(true));
    }

    #[test]
    fn equivalent_spellings_are_the_same_unit() {
        let a = q(1.0, "N");
        let b = q(1.0, "kg*m/s**2");
        assert_eq!(a.equals(&b), Ok(true));
        assert!(a.add(&b).is_ok());
    }

    #[test]
    fn different_units_are_incompatible() {
        let err = q(1.0, "m").add(&q(1.0, "s")).unwrap_err();
        assert_eq!(err.operation, "add");
        assert_eq!(err.lhs, "m");
        assert_eq!(err.rhs, "s");

        let err = q(1.0, "km").less_than(&q(1.0, "m")).unwrap_err();
        assert_eq!(err.operation, "compare");
        assert!(q(1.0, "km").sub(&q(1.0, "m")).is_err());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Multiplicative operators and powers
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn products_compose_units() {
        let d = q(100.0, "m");
        let t = q(20.0, "s");
        let v = d.div(&t).unwrap();
        assert_eq!(*v.value(), 5.0);
        assert_eq!(v.unit().to_string(), "m/s");

        let back = v.mul(&t).unwrap();
        assert_eq!(back.unit(), &u("m"));
        assert_eq!(*back.value(), 100.0);

        let inv = t.rdiv(&d).unwrap();
        assert_eq!(inv.unit(), &u("m/s"));
        assert_eq!(t.rmul(&d).unwrap().unit().to_string(), "m·s");
    }

    #[test]
    fn unary_operators_keep_unit() {
        let a = q(-2.5, "km");
        assert_eq!(a.neg(), q(2.5, "km"));
        assert_eq!(a.abs(), q(2.5, "km"));
        assert_eq!(a.pos(), a);
    }

    #[test]
    fn powers() {
        let side = q(3.0, "m");
        let area = side.pow(2).unwrap();
        assert_eq!(*area.value(), 9.0);
        assert_eq!(area.unit(), &u("m**2"));

        let root = area.pow(0.5).unwrap();
        assert_relative_eq!(*root.value(), 3.0);
        assert_eq!(root.unit(), &u("m"));
    }

    #[test]
    fn rpow_needs_a_plain_number() {
        let x = SiQuantity::new(3.0, SiUnit::one());
        let r = x.rpow(2.0).unwrap();
        assert_eq!(*r.value(), 8.0);
        assert!(r.unit().is_dimensionless());

        let err = q(3.0, "m").rpow(2.0).unwrap_err();
        assert_eq!(err.operation, "exponentiate");
        assert!(q(3.0, "%").rpow(2.0).is_err());
    }

    #[test]
    fn value_types_follow_capabilities() {
        let n = SiQuantity::new(4_i32, u("m"));
        let sq = n.pow(2_u32).unwrap();
        assert_eq!(*sq.value(), 16);
        assert_eq!(sq.unit(), &u("m**2"));

        let root: SiQuantity<f64> = n.pow(0.5_f64).unwrap();
        assert_eq!(*root.value(), 2.0);
        assert_eq!(root.unit(), &u("m**(1/2)"));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Conversion
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn to_converts_between_compatible_units() {
        let d = q(1.5, "km").to(&u("m")).unwrap();
        assert_relative_eq!(*d.value(), 1500.0);
        assert_eq!(d.unit(), &u("m"));

        let v = q(36.0, "km/h").to(&u("m/s")).unwrap();
        assert_relative_eq!(*v.value(), 10.0, max_relative = 1e-12);

        let samples = SiQuantity::new(vec![1.0, 2.0], u("km")).to(&u("m")).unwrap();
        assert_eq!(samples.into_value(), vec![1000.0, 2000.0]);
    }

    #[test]
    fn compatible_operands_line_up_through_to_unit_of() {
        let a = q(1.0, "km");
        let b = q(1000.0, "m");
        assert!(a.add(&b).is_err());

        let sum = a.add(&b.to_unit_of(&a).unwrap()).unwrap();
        assert_relative_eq!(*sum.value(), 2.0);
        assert_eq!(sum.unit(), &u("km"));
        assert_eq!(a.equals(&b.to_unit_of(&a).unwrap()), Ok(true));
        assert!(q(1.0, "s").to_unit_of(&a).is_err());
    }

    #[test]
    fn unrepresentable_powers_are_incompatible_operands() {
        let err = q(2.0, "m").pow(f64::NAN).unwrap_err();
        assert_eq!(err.operation, "exponentiate");
        assert_eq!(err.lhs, "m");
        assert!(q(2.0, "m").pow(0.0004_f64).is_err());
        assert!(q(2.0, "1").pow(0.0004_f64).is_ok());
    }

    #[test]
    fn exponent_overflow_is_an_incompatible_operand() {
        let huge = u("m^(1/999999999999989)");
        let other = u("m^(1/999999999999947)");
        let err = SiQuantity::new(1.0, huge.clone()).mul(&SiQuantity::new(1.0, other.clone()));
        assert_eq!(err.unwrap_err().operation, "multiply");
        let err = SiQuantity::new(1.0, huge).div(&SiQuantity::new(1.0, other));
        assert_eq!(err.unwrap_err().operation, "divide");
    }

    #[test]
    fn quantities_key_maps() {
        use std::collections::HashMap;

        let mut counts: HashMap<SiQuantity<i64>, u32> = HashMap::new();
        for unit in ["km", "1000*m", "m"] {
            *counts.entry(SiQuantity::new(3, u(unit))).or_default() += 1;
        }
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&SiQuantity::new(3, u("km"))], 2);
    }

    #[test]
    fn to_rejects_other_dimensions() {
        assert!(matches!(
            q(1.0, "m").to(&u("s")),
            Err(ConversionError::IncompatibleUnit { .. })
        ));
    }

    #[test]
    fn map_and_parts() {
        let (value, unit) = q(2.0, "s").map(|v| v * 10.0).into_parts();
        assert_eq!(value, 20.0);
        assert_eq!(unit, u("s"));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Serde and discovery
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn serde_uses_value_and_unit_fields() {
        let a = q(42.5, "km/h");
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"value":42.5,"unit":"km/h"}"#);
        let back: SiQuantity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);

        let bare: SiQuantity = serde_json::from_str(r#"{"value":1.0}"#).unwrap();
        assert_eq!(bare.unit(), &SiUnit::one());

        assert!(serde_json::from_str::<SiQuantity>(r#"{"unit":"m"}"#).is_err());
        assert!(serde_json::from_str::<SiQuantity>(r#"{"value":1.0,"unit":"furlong"}"#).is_err());
    }

    #[test]
    fn discovers_namespace_with_matching_value_type() {
        let a = q(1.0, "m");
        let ns = a.metrology_namespace(None).unwrap();
        assert_eq!(ns.api_version().to_string(), "1.0");
        assert!(a.metrology_namespace(Some("2.0")).is_err());
    }

    #[test]
    fn reports_quantity_surface() {
        let a = q(1.0, "m");
        assert!(a.check_conformance(Protocol::Quantity).is_ok());
        assert!(a.check_conformance(Protocol::HasMetrologyNamespace).is_ok());
        assert!(a.check_conformance(Protocol::Unit).is_err());

        let float32 = SiQuantity::new(1.0_f32, u("m"));
        assert!(float32.check_conformance(Protocol::Quantity).is_ok());
        let samples = SiQuantity::new(vec![1.0_f64], u("m"));
        assert!(samples.check_conformance(Protocol::Quantity).is_err());
    }

    proptest! {
        #[test]
        fn prop_conversion_roundtrips(value in -1e6f64..1e6) {
            let a = q(value, "mi");
            let back = a.to(&u("km")).unwrap().to(&u("mi")).unwrap();
            prop_assert!((back.value() - value).abs() <= 1e-9 * value.abs().max(1.0));
        }

        #[test]
        fn prop_addition_commutes(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let x = q(a, "s");
            let y = q(b, "s");
            prop_assert_eq!(x.add(&y).unwrap(), y.add(&x).unwrap());
        }
    }
}
