//! SI dimensions as exact exponent vectors.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::ops::{Div, Mul};

use metrology_apis_core::{
    CapabilitySet, ConversionError, Decomposition, Dimension, Exponent, HasMetrologyNamespace,
    Introspect, Rational, VersionError,
};

use crate::expr::{self, Term};
use crate::namespace::SiNamespace;

/// The seven SI base quantities, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseDimension {
    /// Length, `L` (metre).
    Length,
    /// Mass, `M` (kilogram).
    Mass,
    /// Time, `T` (second).
    Time,
    /// Electric current, `I` (ampere).
    Current,
    /// Thermodynamic temperature, `Θ` (kelvin).
    Temperature,
    /// Amount of substance, `N` (mole).
    Amount,
    /// Luminous intensity, `J` (candela).
    Luminosity,
}

impl BaseDimension {
    /// All base dimensions in canonical order.
    pub const ALL: [BaseDimension; 7] = [
        Self::Length,
        Self::Mass,
        Self::Time,
        Self::Current,
        Self::Temperature,
        Self::Amount,
        Self::Luminosity,
    ];

    /// Conventional symbol.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Length => "L",
            Self::Mass => "M",
            Self::Time => "T",
            Self::Current => "I",
            Self::Temperature => "Θ",
            Self::Amount => "N",
            Self::Luminosity => "J",
        }
    }

    /// Lowercase name accepted by [`SiDimension::from_label`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Mass => "mass",
            Self::Time => "time",
            Self::Current => "current",
            Self::Temperature => "temperature",
            Self::Amount => "amount",
            Self::Luminosity => "luminosity",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// A dimension of the SI system: one exact exponent per [`BaseDimension`].
///
/// ```rust
/// use metrology_apis_core::Dimension;
/// use metrology_si::SiDimension;
///
/// let v = SiDimension::LENGTH / SiDimension::TIME;
/// assert_eq!(v, SiDimension::VELOCITY);
/// assert_eq!(v.to_string(), "L·T^-1");
/// assert_eq!(SiDimension::from_label("length/time").unwrap(), v);
/// assert!(v.powi(0).is_dimensionless());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SiDimension {
    exponents: [Rational; 7],
}

impl Default for SiDimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}

impl SiDimension {
    // ==========================================================================
    // Base Dimensions
    // ==========================================================================

    /// Dimensionless (pure number).
    pub const DIMENSIONLESS: Self = Self::from_ints([0, 0, 0, 0, 0, 0, 0]);

    /// Length [L].
    pub const LENGTH: Self = Self::from_ints([1, 0, 0, 0, 0, 0, 0]);

    /// Mass [M].
    pub const MASS: Self = Self::from_ints([0, 1, 0, 0, 0, 0, 0]);

    /// Time [T].
    pub const TIME: Self = Self::from_ints([0, 0, 1, 0, 0, 0, 0]);

    /// Electric current [I].
    pub const CURRENT: Self = Self::from_ints([0, 0, 0, 1, 0, 0, 0]);

    /// Temperature [Θ].
    pub const TEMPERATURE: Self = Self::from_ints([0, 0, 0, 0, 1, 0, 0]);

    /// Amount of substance [N].
    pub const AMOUNT: Self = Self::from_ints([0, 0, 0, 0, 0, 1, 0]);

    /// Luminous intensity [J].
    pub const LUMINOSITY: Self = Self::from_ints([0, 0, 0, 0, 0, 0, 1]);

    // ==========================================================================
    // Common Derived Dimensions
    // ==========================================================================

    /// Area [L²].
    pub const AREA: Self = Self::from_ints([2, 0, 0, 0, 0, 0, 0]);

    /// Volume [L³].
    pub const VOLUME: Self = Self::from_ints([3, 0, 0, 0, 0, 0, 0]);

    /// Velocity [L T⁻¹].
    pub const VELOCITY: Self = Self::from_ints([1, 0, -1, 0, 0, 0, 0]);

    /// Acceleration [L T⁻²].
    pub const ACCELERATION: Self = Self::from_ints([1, 0, -2, 0, 0, 0, 0]);

    /// Momentum [M L T⁻¹].
    pub const MOMENTUM: Self = Self::from_ints([1, 1, -1, 0, 0, 0, 0]);

    /// Force [M L T⁻²] (newton).
    pub const FORCE: Self = Self::from_ints([1, 1, -2, 0, 0, 0, 0]);

    /// Energy [M L² T⁻²] (joule).
    pub const ENERGY: Self = Self::from_ints([2, 1, -2, 0, 0, 0, 0]);

    /// Power [M L² T⁻³] (watt).
    pub const POWER: Self = Self::from_ints([2, 1, -3, 0, 0, 0, 0]);

    /// Pressure [M L⁻¹ T⁻²] (pascal).
    pub const PRESSURE: Self = Self::from_ints([-1, 1, -2, 0, 0, 0, 0]);

    /// Frequency [T⁻¹] (hertz).
    pub const FREQUENCY: Self = Self::from_ints([0, 0, -1, 0, 0, 0, 0]);

    /// Density [M L⁻³].
    pub const DENSITY: Self = Self::from_ints([-3, 1, 0, 0, 0, 0, 0]);

    /// Electric charge [I T] (coulomb).
    pub const CHARGE: Self = Self::from_ints([0, 0, 1, 1, 0, 0, 0]);

    /// Voltage [M L² T⁻³ I⁻¹] (volt).
    pub const VOLTAGE: Self = Self::from_ints([2, 1, -3, -1, 0, 0, 0]);

    /// Resistance [M L² T⁻³ I⁻²] (ohm).
    pub const RESISTANCE: Self = Self::from_ints([2, 1, -3, -2, 0, 0, 0]);

    /// Builds a dimension from integer exponents in canonical order (L, M, T, I, Θ, N, J).
    pub const fn from_ints(e: [i64; 7]) -> Self {
        Self {
            exponents: [
                Rational::integer(e[0]),
                Rational::integer(e[1]),
                Rational::integer(e[2]),
                Rational::integer(e[3]),
                Rational::integer(e[4]),
                Rational::integer(e[5]),
                Rational::integer(e[6]),
            ],
        }
    }

    /// Builds a dimension from exact exponents in canonical order.
    pub const fn from_exponents(exponents: [Rational; 7]) -> Self {
        Self { exponents }
    }

    /// Single base dimension.
    pub fn base(base: BaseDimension) -> Self {
        let mut exponents = [Rational::ZERO; 7];
        exponents[base.index()] = Rational::ONE;
        Self { exponents }
    }

    /// Exponent of one base dimension.
    #[inline]
    pub fn exponent(&self, base: BaseDimension) -> Rational {
        self.exponents[base.index()]
    }

    /// All exponents in canonical order.
    #[inline]
    pub fn exponents(&self) -> &[Rational; 7] {
        &self.exponents
    }

    /// Exact rational power.
    ///
    /// # Panics
    ///
    /// When an exponent overflows; see [`SiDimension::checked_pow`].
    pub fn pow(&self, exponent: Rational) -> Self {
        match self.checked_pow(exponent) {
            Some(dim) => dim,
            None => panic!("exponent overflow in `({self})^({exponent})`"),
        }
    }

    /// Exact rational power, or `None` when an exponent leaves the `i64` range.
    pub fn checked_pow(&self, exponent: Rational) -> Option<Self> {
        let mut exponents = self.exponents;
        for e in exponents.iter_mut() {
            *e = e.checked_mul(exponent)?;
        }
        Some(Self { exponents })
    }

    /// `self * rhs`, or `None` when an exponent leaves the `i64` range.
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e = e.checked_add(r)?;
        }
        Some(Self { exponents })
    }

    /// `self / rhs`, or `None` when an exponent leaves the `i64` range.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        let mut exponents = self.exponents;
        for (e, r) in exponents.iter_mut().zip(rhs.exponents) {
            *e = e.checked_sub(r)?;
        }
        Some(Self { exponents })
    }

    /// Parses a dimension label.
    ///
    /// Accepts base names (`length`, `mass`, …), base symbols (`L`, `M`, `Θ`, …), derived names
    /// (`velocity`, `force`, …) and `*`, `/`, `**`/`^` expressions over them. `""` and `"1"` are
    /// dimensionless. Names are case-insensitive; symbols are not.
    pub fn from_label(label: &str) -> Result<Self, ConversionError> {
        expr::parse(label, |token| {
            lookup(token).ok_or_else(|| ConversionError::UnknownDimension(token.to_string()))
        })
    }
}

const NAMED: &[(&str, SiDimension)] = &[
    ("dimensionless", SiDimension::DIMENSIONLESS),
    ("length", SiDimension::LENGTH),
    ("mass", SiDimension::MASS),
    ("time", SiDimension::TIME),
    ("current", SiDimension::CURRENT),
    ("temperature", SiDimension::TEMPERATURE),
    ("amount", SiDimension::AMOUNT),
    ("substance", SiDimension::AMOUNT),
    ("luminosity", SiDimension::LUMINOSITY),
    ("luminous_intensity", SiDimension::LUMINOSITY),
    ("area", SiDimension::AREA),
    ("volume", SiDimension::VOLUME),
    ("velocity", SiDimension::VELOCITY),
    ("speed", SiDimension::VELOCITY),
    ("acceleration", SiDimension::ACCELERATION),
    ("momentum", SiDimension::MOMENTUM),
    ("force", SiDimension::FORCE),
    ("energy", SiDimension::ENERGY),
    ("power", SiDimension::POWER),
    ("pressure", SiDimension::PRESSURE),
    ("frequency", SiDimension::FREQUENCY),
    ("density", SiDimension::DENSITY),
    ("charge", SiDimension::CHARGE),
    ("voltage", SiDimension::VOLTAGE),
    ("resistance", SiDimension::RESISTANCE),
];

fn lookup(token: &str) -> Option<SiDimension> {
    if let Some(base) = BaseDimension::ALL
        .iter()
        .find(|b| b.symbol() == token || (token == "Theta" && **b == BaseDimension::Temperature))
    {
        return Some(SiDimension::base(*base));
    }
    let lower = token.to_lowercase();
    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, dim)| *dim)
}

/// Panics when an exponent overflows; see [`SiDimension::checked_mul`].
impl Mul for SiDimension {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self.checked_mul(&rhs) {
            Some(dim) => dim,
            None => panic!("exponent overflow in `({self}) * ({rhs})`"),
        }
    }
}

/// Panics when an exponent overflows; see [`SiDimension::checked_div`].
impl Div for SiDimension {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        match self.checked_div(&rhs) {
            Some(dim) => dim,
            None => panic!("exponent overflow in `({self}) / ({rhs})`"),
        }
    }
}

impl Dimension for SiDimension {
    fn dimensionless() -> Self {
        Self::DIMENSIONLESS
    }

    fn powi(&self, exponent: i32) -> Self {
        self.pow(Rational::from(exponent))
    }

    fn decompose(&self) -> Option<Decomposition> {
        Some(
            BaseDimension::ALL
                .iter()
                .fold(Decomposition::new(), |acc, b| {
                    acc.with(b.symbol(), self.exponent(*b))
                }),
        )
    }
}

impl Term for SiDimension {
    fn one() -> Self {
        Self::DIMENSIONLESS
    }

    fn number(value: f64) -> Result<Self, String> {
        if value == 1.0 {
            Ok(Self::DIMENSIONLESS)
        } else {
            Err(format!("numeric factor `{value}` in a dimension label"))
        }
    }

    fn times(self, rhs: Self) -> Result<Self, String> {
        self.checked_mul(&rhs)
            .ok_or_else(|| "dimension exponent out of range".to_string())
    }

    fn over(self, rhs: Self) -> Result<Self, String> {
        self.checked_div(&rhs)
            .ok_or_else(|| "dimension exponent out of range".to_string())
    }

    fn raised(self, exponent: Exponent) -> Result<Self, String> {
        let r = exponent
            .as_rational()
            .ok_or_else(|| format!("dimension exponent `{exponent}` is not rational"))?;
        self.checked_pow(r)
            .ok_or_else(|| "dimension exponent out of range".to_string())
    }
}

impl Display for SiDimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut first = true;
        for base in BaseDimension::ALL {
            let e = self.exponent(base);
            if e.is_zero() {
                continue;
            }
            if !first {
                f.write_str("·")?;
            }
            first = false;
            f.write_str(base.symbol())?;
            if e.is_integer() {
                if e != Rational::ONE {
                    write!(f, "^{e}")?;
                }
            } else {
                write!(f, "^({e})")?;
            }
        }
        if first {
            f.write_str("1")?;
        }
        Ok(())
    }
}

impl core::str::FromStr for SiDimension {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl HasMetrologyNamespace for SiDimension {
    type Namespace = SiNamespace<f64>;

    fn metrology_namespace(
        &self,
        api_version: Option<&str>,
    ) -> Result<SiNamespace<f64>, VersionError> {
        SiNamespace::for_version(api_version)
    }
}

impl Introspect for SiDimension {
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of_dimension::<Self>().union(&CapabilitySet::of_discoverable::<Self>())
    }
}
