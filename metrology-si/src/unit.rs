//! Runtime SI units: a scale to the coherent SI unit, a dimension and a printable expression.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::hash::{Hash, Hasher};
use core::ops::{Div, Mul};
use core::str::FromStr;

use metrology_apis_core::{
    CapabilitySet, ConversionError, Dimension, Exponent, HasMetrologyNamespace, Introspect,
    Rational, Unit, VersionError,
};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::dimension::SiDimension;
use crate::expr::Term;
use crate::namespace::SiNamespace;
use crate::registry::default_registry;

/// Largest denominator used when a real exponent is mapped onto a dimension.
const MAX_EXPONENT_DENOM: i64 = 1000;

/// Largest gap between a real exponent and its rational form.
const EXPONENT_TOLERANCE: f64 = 1e-9;

/// Relative tolerance of [`SiUnit::approx_eq`].
const SCALE_TOLERANCE: f64 = 1e-12;

/// Low mantissa bits dropped before scales are compared for equality.
const SCALE_ROUNDING_BITS: u32 = 12;

/// Symbolic form of a unit: a numeric factor times symbols raised to exact powers.
#[derive(Clone, Debug, PartialEq)]
struct UnitExpr {
    factor: f64,
    terms: Vec<(String, Rational)>,
}

impl UnitExpr {
    fn one() -> Self {
        Self {
            factor: 1.0,
            terms: Vec::new(),
        }
    }

    fn symbol(symbol: String) -> Self {
        Self {
            factor: 1.0,
            terms: vec![(symbol, Rational::ONE)],
        }
    }

    fn combine(mut self, other: &Self, sign: Rational) -> Option<Self> {
        for (symbol, e) in &other.terms {
            let delta = e.checked_mul(sign)?;
            match self.terms.iter_mut().find(|(s, _)| s == symbol) {
                Some((_, existing)) => *existing = existing.checked_add(delta)?,
                None => self.terms.push((symbol.clone(), delta)),
            }
        }
        self.terms.retain(|(_, e)| !e.is_zero());
        Some(self)
    }

    fn times(mut self, other: &Self) -> Option<Self> {
        self.factor *= other.factor;
        self.combine(other, Rational::ONE)
    }

    fn over(mut self, other: &Self) -> Option<Self> {
        self.factor /= other.factor;
        self.combine(other, -Rational::ONE)
    }

    fn pow(self, exact: Rational, real: f64) -> Option<Self> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (s, e) in self.terms {
            let e = e.checked_mul(exact)?;
            if !e.is_zero() {
                terms.push((s, e));
            }
        }
        Some(Self {
            factor: self.factor.powf(real),
            terms,
        })
    }
}

fn write_term(f: &mut Formatter<'_>, symbol: &str, e: Rational) -> FmtResult {
    f.write_str(symbol)?;
    if e.is_integer() {
        if e != Rational::ONE {
            write!(f, "^{e}")?;
        }
        Ok(())
    } else {
        write!(f, "^({e})")
    }
}

impl Display for UnitExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let numer: Vec<_> = self.terms.iter().filter(|(_, e)| *e > Rational::ZERO).collect();
        let denom: Vec<_> = self.terms.iter().filter(|(_, e)| *e < Rational::ZERO).collect();

        let mut first = true;
        if self.factor != 1.0 {
            write!(f, "{}", self.factor)?;
            first = false;
        }
        for (symbol, e) in &numer {
            if !first {
                f.write_str("·")?;
            }
            first = false;
            write_term(f, symbol, *e)?;
        }
        if first {
            f.write_str("1")?;
        }

        if denom.is_empty() {
            return Ok(());
        }
        f.write_str("/")?;
        if denom.len() > 1 {
            f.write_str("(")?;
        }
        for (i, (symbol, e)) in denom.iter().enumerate() {
            if i > 0 {
                f.write_str("·")?;
            }
            write_term(f, symbol, -*e)?;
        }
        if denom.len() > 1 {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// A unit of the SI system.
///
/// A unit is a positive `scale` relative to the coherent SI unit of its [`SiDimension`], plus a
/// normalized expression used for display (`"m/s"`, `"kg·m/s^2"`). Two units are equal when their
/// dimensions are equal and their scales round to the same 40-bit mantissa; the expression is
/// presentation only, so `N` equals `kg·m/s^2`. Equality is an equivalence relation and agrees with
/// [`Hash`], so units and quantities can key maps. [`SiUnit::approx_eq`] compares scales with a
/// relative tolerance instead.
///
/// ```rust
/// use metrology_apis_core::Unit;
/// use metrology_si::{SiDimension, SiUnit};
///
/// let m: SiUnit = "m".parse().unwrap();
/// let s: SiUnit = "s".parse().unwrap();
/// let v = m.clone() / s;
/// assert_eq!(v.to_string(), "m/s");
/// assert_eq!(v.dimension(), SiDimension::VELOCITY);
///
/// let km: SiUnit = "km".parse().unwrap();
/// assert_eq!(km.conversion_factor(&m).unwrap(), 1000.0);
/// ```
#[derive(Clone, Debug)]
pub struct SiUnit {
    scale: f64,
    dimension: SiDimension,
    expr: UnitExpr,
}

impl SiUnit {
    /// A named unit: `1 symbol == scale` coherent SI units of `dimension`.
    pub fn new(symbol: impl Into<String>, scale: f64, dimension: SiDimension) -> Self {
        Self {
            scale,
            dimension,
            expr: UnitExpr::symbol(symbol.into()),
        }
    }

    /// The dimensionless unit `1`.
    pub fn one() -> Self {
        Self {
            scale: 1.0,
            dimension: SiDimension::DIMENSIONLESS,
            expr: UnitExpr::one(),
        }
    }

    /// A dimensionless pure number, e.g. the `1000` of `1000*m`.
    pub fn factor(value: f64) -> Self {
        Self {
            scale: value,
            dimension: SiDimension::DIMENSIONLESS,
            expr: UnitExpr {
                factor: value,
                terms: Vec::new(),
            },
        }
    }

    /// Scale relative to the coherent SI unit of the same dimension.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Normalized symbolic expression.
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// `true` for any unit of the dimensionless dimension (`1`, `rad`, `%`, …).
    pub fn is_dimensionless(&self) -> bool {
        self.dimension.is_dimensionless()
    }

    /// Factor converting a value in `self` to a value in `target`.
    ///
    /// # Errors
    ///
    /// [`ConversionError::IncompatibleUnit`] when the dimensions differ.
    pub fn conversion_factor(&self, target: &SiUnit) -> Result<f64, ConversionError> {
        if self.dimension != target.dimension {
            return Err(ConversionError::IncompatibleUnit {
                from: self.to_string(),
                to: target.to_string(),
            });
        }
        Ok(self.scale / target.scale)
    }

    /// Same dimension, and scales within a relative `1e-12` of each other.
    ///
    /// Unlike `==` this is not transitive; use it to decide whether operands line up, not to
    /// key collections.
    pub fn approx_eq(&self, other: &SiUnit) -> bool {
        let (a, b) = (self.scale, other.scale);
        self.dimension == other.dimension
            && (a == b || (a - b).abs() <= SCALE_TOLERANCE * a.abs().max(b.abs()))
    }

    /// `self * rhs`, or `None` when an exponent leaves the `i64` range.
    pub fn checked_mul(&self, rhs: &SiUnit) -> Option<SiUnit> {
        Some(Self {
            scale: self.scale * rhs.scale,
            dimension: self.dimension.checked_mul(&rhs.dimension)?,
            expr: self.expr.clone().times(&rhs.expr)?,
        })
    }

    /// `self / rhs`, or `None` when an exponent leaves the `i64` range.
    pub fn checked_div(&self, rhs: &SiUnit) -> Option<SiUnit> {
        Some(Self {
            scale: self.scale / rhs.scale,
            dimension: self.dimension.checked_div(&rhs.dimension)?,
            expr: self.expr.clone().over(&rhs.expr)?,
        })
    }
}

/// Scale with the low mantissa bits rounded away; NaN scales share one key.
fn scale_key(scale: f64) -> u64 {
    if scale == 0.0 {
        0
    } else if scale.is_nan() {
        u64::MAX
    } else {
        scale
            .to_bits()
            .wrapping_add(1 << (SCALE_ROUNDING_BITS - 1))
            >> SCALE_ROUNDING_BITS
    }
}

impl PartialEq for SiUnit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && scale_key(self.scale) == scale_key(other.scale)
    }
}

impl Eq for SiUnit {}

impl Hash for SiUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        scale_key(self.scale).hash(state);
    }
}

/// Panics when an exponent overflows; see [`SiUnit::checked_mul`].
impl Mul for SiUnit {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self.checked_mul(&rhs) {
            Some(unit) => unit,
            None => panic!("exponent overflow in `({self}) * ({rhs})`"),
        }
    }
}

/// Panics when an exponent overflows; see [`SiUnit::checked_div`].
impl Div for SiUnit {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(&rhs) {
            Some(unit) => unit,
            None => panic!("exponent overflow in `({self}) / ({rhs})`"),
        }
    }
}

impl Unit for SiUnit {
    type Dimension = SiDimension;

    fn dimension(&self) -> SiDimension {
        self.dimension
    }

    /// Real exponents are mapped onto the dimension through the closest rational with a
    /// denominator up to 1000 and must lie within `1e-9` of it; the scale uses the real value.
    /// A dimensionless unit accepts any finite real exponent and collapses to a pure factor.
    fn pow(&self, exponent: Exponent) -> Result<Self, ConversionError> {
        let invalid = |reason: &str| {
            log::warn!("refusing to raise `{}` to `{}`: {}", self, exponent, reason);
            ConversionError::InvalidExponent {
                unit: self.to_string(),
                exponent: exponent.to_string(),
                reason: reason.to_string(),
            }
        };

        let real = exponent.to_f64();
        if !real.is_finite() {
            return Err(invalid("exponent is not finite"));
        }
        let close =
            |r: Rational| (r.to_f64() - real).abs() <= EXPONENT_TOLERANCE * real.abs().max(1.0);
        let exact = match exponent.as_rational() {
            Some(r) => r,
            None => match Rational::approximate(real, MAX_EXPONENT_DENOM) {
                Some(r) if close(r) => r,
                _ if self.is_dimensionless() => return Ok(Self::factor(self.scale.powf(real))),
                _ => return Err(invalid("exponent has no exact rational form")),
            },
        };
        let dimension = self
            .dimension
            .checked_pow(exact)
            .ok_or_else(|| invalid("exponent out of range"))?;
        let expr = self
            .expr
            .clone()
            .pow(exact, real)
            .ok_or_else(|| invalid("exponent out of range"))?;
        Ok(Self {
            scale: self.scale.powf(real),
            dimension,
            expr,
        })
    }
}

impl Term for SiUnit {
    fn one() -> Self {
        Self::one()
    }

    fn number(value: f64) -> Result<Self, String> {
        if value.is_finite() && value > 0.0 {
            Ok(Self::factor(value))
        } else {
            Err(format!("numeric factor `{value}` must be positive and finite"))
        }
    }

    fn times(self, rhs: Self) -> Result<Self, String> {
        self.checked_mul(&rhs)
            .ok_or_else(|| "unit exponent out of range".to_string())
    }

    fn over(self, rhs: Self) -> Result<Self, String> {
        self.checked_div(&rhs)
            .ok_or_else(|| "unit exponent out of range".to_string())
    }

    fn raised(self, exponent: Exponent) -> Result<Self, String> {
        Unit::pow(&self, exponent).map_err(|err| err.to_string())
    }
}

impl Display for SiUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        self.expr.fmt(f)
    }
}

/// Parses against the default registry.
impl FromStr for SiUnit {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        default_registry().parse_unit(s)
    }
}

impl Serialize for SiUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SiUnit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UnitVisitor;

        impl<'de> Visitor<'de> for UnitVisitor {
            type Value = SiUnit;

            fn expecting(&self, formatter: &mut Formatter) -> FmtResult {
                formatter.write_str("a unit expression such as \"m/s\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<SiUnit, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(UnitVisitor)
    }
}

impl HasMetrologyNamespace for SiUnit {
    type Namespace = SiNamespace<f64>;

    fn metrology_namespace(
        &self,
        api_version: Option<&str>,
    ) -> Result<SiNamespace<f64>, VersionError> {
        SiNamespace::for_version(api_version)
    }
}

impl Introspect for SiUnit {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of_unit::<Self>().union(&CapabilitySet::of_discoverable::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use metrology_apis_core::Protocol;
    use proptest::prelude::*;

    fn u(expr: &str) -> SiUnit {
        expr.parse().unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Composition
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn composition_tracks_dimension() {
        let force = u("kg") * u("m") / u("s").powi(2).unwrap();
        assert_eq!(force.dimension(), SiDimension::FORCE);
        assert_eq!(force, u("N"));
        assert_eq!(force.to_string(), "kg·m/s^2");
    }

    #[test]
    fn expression_normalizes_repeated_symbols() {
        assert_eq!((u("m") * u("m")).to_string(), "m^2");
        assert_eq!((u("m") / u("m")).to_string(), "1");
        assert_eq!(u("m/s/s").to_string(), "m/s^2");
        assert_eq!((u("J") / (u("kg") * u("K"))).to_string(), "J/(kg·K)");
        assert_eq!((u("1") / u("s")).to_string(), "1/s");
    }

    #[test]
    fn rational_and_real_powers() {
        let root = u("m").powf(0.5).unwrap();
        assert_eq!(root.to_string(), "m^(1/2)");
        assert_eq!(root.pow(Exponent::from(2)).unwrap(), u("m"));
        let area = u("km").powi(2).unwrap();
        assert_relative_eq!(area.scale(), 1e6, max_relative = 1e-12);
        assert_eq!(area.dimension(), SiDimension::AREA);
        assert_eq!(u("m").powf(1.0 / 3.0).unwrap().to_string(), "m^(1/3)");
    }

    #[test]
    fn non_finite_exponents_are_refused() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                u("m").powf(bad),
                Err(ConversionError::InvalidExponent { .. })
            ));
        }
        assert!(u("1").powf(f64::NAN).is_err());
    }

    #[test]
    fn inexact_real_exponents_keep_the_dimension() {
        match u("m").pow(Exponent::from(0.0004)) {
            Err(ConversionError::InvalidExponent { unit, exponent, .. }) => {
                assert_eq!(unit, "m");
                assert_eq!(exponent, "0.0004");
            }
            other => panic!("expected an invalid exponent, got {other:?}"),
        }
        assert!(u("m/s").powf(std::f64::consts::PI).is_err());

        let scaled = u("%").powf(0.0004).unwrap();
        assert!(scaled.is_dimensionless());
        assert_relative_eq!(scaled.scale(), 0.01_f64.powf(0.0004), max_relative = 1e-12);
        assert_eq!(u(&scaled.to_string()), scaled);
    }

    #[test]
    fn oversized_exponents_are_parse_errors() {
        let label = "m^(1/999999999999989)*m^(1/999999999999947)";
        match label.parse::<SiUnit>() {
            Err(ConversionError::Parse { input, .. }) => assert_eq!(input, label),
            other => panic!("expected a parse error, got {other:?}"),
        }
        assert!("(m^(1/999999999999989))^(1/999999999999947)"
            .parse::<SiUnit>()
            .is_err());

        let a = u("m^(1/999999999999989)");
        let b = u("m^(1/999999999999947)");
        assert!(a.checked_mul(&b).is_none());
        assert!(a.checked_div(&b).is_none());
        assert!(matches!(
            a.pow(Exponent::from(Rational::new(1, 999_999_999_999_947).unwrap())),
            Err(ConversionError::InvalidExponent { .. })
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Equality and conversion
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn equality_ignores_presentation() {
        assert_eq!(u("kg*m/s**2"), u("N"));
        assert_eq!(u("1000*m"), u("km"));
        assert_ne!(u("km"), u("m"));
        assert_ne!(u("m"), u("s"));
        assert_eq!(u("mm") * u("km"), u("m") * u("m"));
    }

    #[test]
    fn equality_is_transitive_and_hash_consistent() {
        use std::collections::HashSet;

        let scaled = |scale: f64| SiUnit::new("x", scale, SiDimension::LENGTH);
        let steps: Vec<SiUnit> = (0..64).map(|i| scaled(1.0 + f64::from(i) * 0.9e-12)).collect();
        for a in &steps {
            for b in &steps {
                for c in &steps {
                    if a == b && b == c {
                        assert_eq!(a, c);
                    }
                }
            }
        }

        let (a, b, c) = (&steps[0], &steps[1], &steps[2]);
        assert!(a.approx_eq(b) && b.approx_eq(c));
        assert!(!a.approx_eq(&steps[3]));

        let set: HashSet<SiUnit> = steps.iter().cloned().collect();
        for unit in &steps {
            assert!(set.contains(unit));
        }
        let km: HashSet<SiUnit> = [u("km"), u("1000*m")].into_iter().collect();
        assert_eq!(km.len(), 1);
    }

    #[test]
    fn nan_scale_equals_itself() {
        let odd = SiUnit::new("odd", f64::NAN, SiDimension::LENGTH);
        assert_eq!(odd, odd.clone());
        assert_ne!(odd, u("m"));
    }

    #[test]
    fn conversion_factor_between_compatible_units() {
        assert_relative_eq!(u("h").conversion_factor(&u("min")).unwrap(), 60.0);
        assert_relative_eq!(
            u("km/h").conversion_factor(&u("m/s")).unwrap(),
            1.0 / 3.6,
            max_relative = 1e-12
        );
        assert!(matches!(
            u("m").conversion_factor(&u("s")),
            Err(ConversionError::IncompatibleUnit { .. })
        ));
    }

    #[test]
    fn display_is_reparseable() {
        for expr in ["m/s", "kg·m/s^2", "1000·m", "J/(kg·K)", "m^(1/2)", "1/s"] {
            let unit = u(expr);
            assert_eq!(u(&unit.to_string()), unit, "{expr}");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Serde and discovery
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn serde_uses_the_expression() {
        let json = serde_json::to_string(&u("km/h")).unwrap();
        assert_eq!(json, "\"km/h\"");
        let back: SiUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u("km/h"));
        assert!(serde_json::from_str::<SiUnit>("\"furlongs\"").is_err());
    }

    #[test]
    fn conforms_and_discovers() {
        let caps = u("m").capabilities();
        assert!(Protocol::Unit.conforms(&caps));
        assert!(Protocol::HasMetrologyNamespace.conforms(&caps));
        assert!(u("m").metrology_namespace(Some("1.0")).is_ok());
    }

    fn arb_unit() -> impl Strategy<Value = SiUnit> {
        let symbols = prop::sample::select(vec!["m", "s", "kg", "A", "K", "km", "h", "N", "J"]);
        (symbols.clone(), symbols, -3i32..3).prop_map(|(a, b, n)| u(a) * u(b).powi(n).unwrap())
    }

    proptest! {
        #[test]
        fn prop_product_dimension_is_product_of_dimensions(a in arb_unit(), b in arb_unit()) {
            prop_assert_eq!((a.clone() * b.clone()).dimension(), a.dimension() * b.dimension());
            prop_assert_eq!((a.clone() / b.clone()).dimension(), a.dimension() / b.dimension());
        }

        #[test]
        fn prop_power_dimension(a in arb_unit(), n in -3i32..4) {
            prop_assert_eq!(a.powi(n).unwrap().dimension(), a.dimension().powi(n));
        }
    }
}
