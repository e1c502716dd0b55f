//! Exact and real exponents.
//!
//! Dimensions decompose into base dimensions raised to exact rational powers (`L^1/2` is a valid
//! exponent for e.g. noise spectral densities), while units may additionally be raised to real
//! powers. [`Rational`] covers the former, [`Exponent`] the union of both.

use core::cmp::Ordering;
use core::fmt::{Display, Formatter, Result as FmtResult};
use core::ops::{Add, Div, Mul, Neg, Sub};
use core::str::FromStr;

use crate::error::ConversionError;

/// An exact rational number kept in lowest terms with a strictly positive denominator.
///
/// ```rust
/// use metrology_apis_core::Rational;
///
/// let half = Rational::new(2, 4).unwrap();
/// assert_eq!(half.numer(), 1);
/// assert_eq!(half.denom(), 2);
/// assert_eq!(half + half, Rational::ONE);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: i64,
    denom: i64,
}

impl Rational {
    /// Zero.
    pub const ZERO: Self = Self::integer(0);
    /// One.
    pub const ONE: Self = Self::integer(1);

    /// Builds an integer-valued rational.
    #[inline]
    pub const fn integer(value: i64) -> Self {
        Self {
            numer: value,
            denom: 1,
        }
    }

    /// Builds `numer / denom` in lowest terms; `None` when `denom` is zero or the reduced form
    /// does not fit in `i64`.
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        Self::from_wide(i128::from(numer), i128::from(denom))
    }

    fn from_wide(numer: i128, denom: i128) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let g = gcd(numer, denom).max(1);
        let sign = if denom < 0 { -1 } else { 1 };
        Some(Self {
            numer: i64::try_from(sign * numer / g).ok()?,
            denom: i64::try_from(sign * denom / g).ok()?,
        })
    }

    /// Numerator (carries the sign).
    #[inline]
    pub const fn numer(self) -> i64 {
        self.numer
    }

    /// Denominator (always positive).
    #[inline]
    pub const fn denom(self) -> i64 {
        self.denom
    }

    /// `true` for zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.numer == 0
    }

    /// `true` when the denominator is one.
    #[inline]
    pub const fn is_integer(self) -> bool {
        self.denom == 1
    }

    /// Lossy conversion to `f64`.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// `self + rhs`, or `None` on overflow.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        let (a, b) = (i128::from(self.numer), i128::from(self.denom));
        let (c, d) = (i128::from(rhs.numer), i128::from(rhs.denom));
        Self::from_wide(a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?, b.checked_mul(d)?)
    }

    /// `self - rhs`, or `None` on overflow.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    /// `self * rhs`, or `None` on overflow.
    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            i128::from(self.numer) * i128::from(rhs.numer),
            i128::from(self.denom) * i128::from(rhs.denom),
        )
    }

    /// `self / rhs`, or `None` when `rhs` is zero or on overflow.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.checked_mul(rhs.recip()?)
    }

    /// `-self`, or `None` for a numerator of `i64::MIN`.
    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            numer: self.numer.checked_neg()?,
            denom: self.denom,
        })
    }

    /// Multiplicative inverse; `None` for zero.
    pub fn recip(self) -> Option<Self> {
        Self::new(self.denom, self.numer)
    }

    /// Closest rational to `value` whose denominator does not exceed `max_denom`.
    ///
    /// Walks the continued-fraction convergents of `value`. Returns `None` for non-finite input,
    /// magnitudes outside `i64`, or a `max_denom` below one.
    ///
    /// ```rust
    /// use metrology_apis_core::Rational;
    ///
    /// assert_eq!(Rational::approximate(0.5, 1000), Rational::new(1, 2));
    /// assert_eq!(Rational::approximate(1.0 / 3.0, 1000), Rational::new(1, 3));
    /// assert_eq!(Rational::approximate(f64::NAN, 1000), None);
    /// ```
    pub fn approximate(value: f64, max_denom: i64) -> Option<Self> {
        if !value.is_finite() || value.abs() >= i64::MAX as f64 || max_denom < 1 {
            return None;
        }
        let (mut h_prev, mut h) = (0_i64, 1_i64);
        let (mut k_prev, mut k) = (1_i64, 0_i64);
        let mut rest = value;
        for _ in 0..64 {
            let whole = rest.floor();
            let a = whole as i64;
            let h_next = a.checked_mul(h)?.checked_add(h_prev)?;
            let k_next = match a.checked_mul(k).and_then(|v| v.checked_add(k_prev)) {
                Some(k_next) if k_next <= max_denom => k_next,
                _ => break,
            };
            (h_prev, h) = (h, h_next);
            (k_prev, k) = (k, k_next);
            let frac = rest - whole;
            if frac.abs() < 1e-12 {
                break;
            }
            rest = frac.recip();
        }
        Self::new(h, k)
    }
}

fn gcd(a: i128, b: i128) -> i128 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::integer(i64::from(value))
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::integer(value)
    }
}

// The operators panic when a result leaves the `i64` range, like integer arithmetic in debug
// builds. Input-driven code uses the `checked_*` forms.

impl Add for Rational {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("rational overflow in `{self} + {rhs}`"),
        }
    }
}

impl Sub for Rational {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        match self.checked_sub(rhs) {
            Some(diff) => diff,
            None => panic!("rational overflow in `{self} - {rhs}`"),
        }
    }
}

impl Mul for Rational {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        match self.checked_mul(rhs) {
            Some(product) => product,
            None => panic!("rational overflow in `{self} * {rhs}`"),
        }
    }
}

impl Mul<i32> for Rational {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        self * Rational::from(rhs)
    }
}

/// Division by zero yields zero; exponent arithmetic never divides by a zero exponent.
impl Div for Rational {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        match rhs.recip() {
            Some(inv) => self * inv,
            None => Self::ZERO,
        }
    }
}

impl Neg for Rational {
    type Output = Self;
    fn neg(self) -> Self {
        match self.checked_neg() {
            Some(neg) => neg,
            None => panic!("rational overflow in `-{self}`"),
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (i128::from(self.numer) * i128::from(other.denom))
            .cmp(&(i128::from(other.numer) * i128::from(self.denom)))
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_integer() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl FromStr for Rational {
    type Err = ConversionError;

    /// Parses `"3"`, `"-2"` or `"1/2"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |reason: &str| ConversionError::Parse {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((n, d)) => {
                let numer: i64 = n.trim().parse().map_err(|_| parse_err("invalid numerator"))?;
                let denom: i64 = d
                    .trim()
                    .parse()
                    .map_err(|_| parse_err("invalid denominator"))?;
                if denom == 0 {
                    return Err(parse_err("zero denominator"));
                }
                Self::new(numer, denom).ok_or_else(|| parse_err("ratio out of range"))
            }
            None => trimmed
                .parse::<i64>()
                .map(Self::integer)
                .map_err(|_| parse_err("not an integer or ratio")),
        }
    }
}

/// Power a unit may be raised to: exact where possible, real otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Exponent {
    /// Integer or exact rational power.
    Rational(Rational),
    /// Real-valued power.
    Real(f64),
}

impl Exponent {
    /// Returns the exact form, recovering integral reals (`2.0` → `2`).
    pub fn as_rational(self) -> Option<Rational> {
        match self {
            Self::Rational(r) => Some(r),
            Self::Real(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                Some(Rational::integer(x as i64))
            }
            Self::Real(_) => None,
        }
    }

    /// Lossy conversion to `f64`.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Rational(r) => r.to_f64(),
            Self::Real(x) => x,
        }
    }
}

impl From<Rational> for Exponent {
    fn from(value: Rational) -> Self {
        Self::Rational(value)
    }
}

impl From<i32> for Exponent {
    fn from(value: i32) -> Self {
        Self::Rational(value.into())
    }
}

impl From<u32> for Exponent {
    fn from(value: u32) -> Self {
        Self::Rational(Rational::integer(i64::from(value)))
    }
}

impl From<i64> for Exponent {
    fn from(value: i64) -> Self {
        Self::Rational(value.into())
    }
}

impl From<f32> for Exponent {
    fn from(value: f32) -> Self {
        Self::Real(f64::from(value))
    }
}

impl From<f64> for Exponent {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl Display for Exponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Rational(r) => write!(f, "{r}"),
            Self::Real(x) => write!(f, "{x}"),
        }
    }
}
