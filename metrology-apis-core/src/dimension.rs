//! Dimension contract.

use core::fmt::{Debug, Display, Formatter, Result as FmtResult};
use core::ops::{Div, Mul};
use std::collections::BTreeMap;

use crate::exponent::Rational;

/// Contract for **dimensions** (length, mass/time, …).
///
/// The set of values of a `Dimension` type is closed under multiplication, division and integer
/// exponentiation, with [`Dimension::dimensionless`] as the two-sided identity. Values are
/// immutable; every operation returns a new value.
///
/// Implementors provide `*`, `/` and the identity; everything else has a default.
///
/// ```rust
/// use core::ops::{Div, Mul};
/// use metrology_apis_core::Dimension;
///
/// /// Exponents of (length, time).
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// struct Dim(i32, i32);
///
/// impl Mul for Dim {
///     type Output = Dim;
///     fn mul(self, rhs: Dim) -> Dim {
///         Dim(self.0 + rhs.0, self.1 + rhs.1)
///     }
/// }
///
/// impl Div for Dim {
///     type Output = Dim;
///     fn div(self, rhs: Dim) -> Dim {
///         Dim(self.0 - rhs.0, self.1 - rhs.1)
///     }
/// }
///
/// impl Dimension for Dim {
///     fn dimensionless() -> Self {
///         Dim(0, 0)
///     }
/// }
///
/// let length = Dim(1, 0);
/// let time = Dim(0, 1);
/// assert_eq!(length.divide(&time), Dim(1, -1));
/// assert_eq!(length.power(3), Dim(3, 0));
/// assert_eq!(time.power(-2), Dim(0, -2));
/// assert!(length.power(0).is_dimensionless());
/// ```
pub trait Dimension: Clone + PartialEq + Debug + Mul<Output = Self> + Div<Output = Self> {
    /// The dimensionless identity.
    fn dimensionless() -> Self;

    /// Integer power; `0` yields the identity and negative powers invert.
    ///
    /// The default uses exponentiation by squaring over `*`.
    fn powi(&self, exponent: i32) -> Self {
        let mut result = Self::dimensionless();
        let mut base = self.clone();
        let mut n = exponent.unsigned_abs();
        while n > 0 {
            if n & 1 == 1 {
                result = result * base.clone();
            }
            base = base.clone() * base;
            n >>= 1;
        }
        if exponent < 0 {
            Self::dimensionless() / result
        } else {
            result
        }
    }

    /// Canonical decomposition into base dimensions, if the implementation has one.
    fn decompose(&self) -> Option<Decomposition> {
        None
    }

    /// `self * other`.
    fn multiply(&self, other: &Self) -> Self {
        self.clone() * other.clone()
    }

    /// `self / other`.
    fn divide(&self, other: &Self) -> Self {
        self.clone() / other.clone()
    }

    /// Reflected multiplication: `lhs * self`.
    fn rmultiply(&self, lhs: &Self) -> Self {
        lhs.clone() * self.clone()
    }

    /// Reflected division: `lhs / self`.
    fn rdivide(&self, lhs: &Self) -> Self {
        lhs.clone() / self.clone()
    }

    /// Named form of [`Dimension::powi`].
    fn power(&self, exponent: i32) -> Self {
        self.powi(exponent)
    }

    /// Whether this is the identity.
    fn is_dimensionless(&self) -> bool {
        *self == Self::dimensionless()
    }
}

/// Base-dimension symbol → exact exponent, zero exponents never stored.
///
/// Used to compare composite dimensions built along different paths, and as a printable
/// canonical form:
///
/// ```rust
/// use metrology_apis_core::{Decomposition, Rational};
///
/// let speed = Decomposition::new()
///     .with("L", Rational::ONE)
///     .with("T", Rational::integer(-1));
/// assert_eq!(speed.to_string(), "L·T^-1");
///
/// let back = speed.multiply(&Decomposition::base("T"));
/// assert_eq!(back, Decomposition::base("L"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decomposition(BTreeMap<String, Rational>);

impl Decomposition {
    /// The dimensionless decomposition.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single base dimension with exponent one.
    pub fn base(symbol: impl Into<String>) -> Self {
        Self::new().with(symbol, Rational::ONE)
    }

    /// Builder-style [`Decomposition::insert`].
    pub fn with(mut self, symbol: impl Into<String>, exponent: Rational) -> Self {
        self.insert(symbol, exponent);
        self
    }

    /// Sets the exponent of `symbol`; a zero exponent removes it.
    pub fn insert(&mut self, symbol: impl Into<String>, exponent: Rational) {
        let symbol = symbol.into();
        if exponent.is_zero() {
            self.0.remove(&symbol);
        } else {
            self.0.insert(symbol, exponent);
        }
    }

    /// Exponent of `symbol` (zero when absent).
    pub fn exponent(&self, symbol: &str) -> Rational {
        self.0.get(symbol).copied().unwrap_or(Rational::ZERO)
    }

    /// Non-zero entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rational)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of base dimensions with non-zero exponent.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` for the dimensionless decomposition.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds exponents.
    pub fn multiply(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a + b)
    }

    /// Subtracts exponents.
    pub fn divide(&self, other: &Self) -> Self {
        self.combine(other, |a, b| a - b)
    }

    /// Scales every exponent.
    pub fn pow(&self, exponent: Rational) -> Self {
        let mut out = Self::new();
        for (symbol, e) in self.iter() {
            out.insert(symbol, e * exponent);
        }
        out
    }

    fn combine(&self, other: &Self, op: impl Fn(Rational, Rational) -> Rational) -> Self {
        let mut out = self.clone();
        for (symbol, e) in other.iter() {
            out.insert(symbol, op(self.exponent(symbol), e));
        }
        out
    }
}

impl FromIterator<(String, Rational)> for Decomposition {
    fn from_iter<I: IntoIterator<Item = (String, Rational)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (symbol, e) in iter {
            let total = out.exponent(&symbol) + e;
            out.insert(symbol, total);
        }
        out
    }
}

impl Display for Decomposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return f.write_str("1");
        }
        for (i, (symbol, e)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("·")?;
            }
            if e == Rational::ONE {
                write!(f, "{symbol}")?;
            } else {
                write!(f, "{symbol}^{e}")?;
            }
        }
        Ok(())
    }
}
