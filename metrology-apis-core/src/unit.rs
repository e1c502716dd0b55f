//! Unit contract.

use core::fmt::Debug;
use core::ops::{Div, Mul};

use crate::dimension::Dimension;
use crate::error::ConversionError;
use crate::exponent::Exponent;

/// Contract implemented by every **unit** type.
///
/// * `Dimension` ties the unit to its underlying [`Dimension`]; every unit has exactly one.
/// * `*`, `/` and [`Unit::pow`] compose both the unit identity and its dimension:
///   `(a * b).dimension() == a.dimension() * b.dimension()`.
///
/// # Invariants
///
/// - Values are immutable; operators return new units.
/// - [`Unit::dimension`] is a pure function of the unit.
pub trait Unit: Clone + PartialEq + Debug + Mul<Output = Self> + Div<Output = Self> {
    /// Dimension to which this unit belongs.
    type Dimension: Dimension;

    /// The unit's dimension.
    fn dimension(&self) -> Self::Dimension;

    /// Raises the unit to an integer, rational or real power.
    ///
    /// # Errors
    ///
    /// [`ConversionError::InvalidExponent`] when the implementation cannot represent the result,
    /// e.g. for a non-finite exponent.
    fn pow(&self, exponent: Exponent) -> Result<Self, ConversionError>;

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

    /// Integer power.
    fn powi(&self, exponent: i32) -> Result<Self, ConversionError> {
        self.pow(Exponent::from(exponent))
    }

    /// Real power.
    fn powf(&self, exponent: f64) -> Result<Self, ConversionError> {
        self.pow(Exponent::from(exponent))
    }

    /// Whether both units measure the same dimension.
    fn is_compatible(&self, other: &Self) -> bool {
        self.dimension() == other.dimension()
    }
}
