//! Quantity contract.

use crate::error::OpResult;
use crate::exponent::Exponent;
use crate::ops::{
    CanAbs, CanAdd, CanDiv, CanEq, CanGe, CanGt, CanLe, CanLt, CanMul, CanNe, CanNeg, CanPos,
    CanPow, CanRPow, CanSub,
};
use crate::unit::Unit;

/// A value tagged with a unit.
///
/// `Quantity` pairs an arbitrary `Value` (a scalar, an array, anything) with a [`Unit`]. Its
/// operators do not fix numeric semantics: each one is generic over the matching value
/// capability from [`crate::ops`] and returns a quantity of the *same family* re-bound to that
/// capability's output type. [`Quantity::Rebind`] names that family.
///
/// Operators are fallible because operand compatibility depends on units known only at run time:
/// adding metres to seconds must surface an
/// [`IncompatibleOperandError`](crate::IncompatibleOperandError), never a nonsensical value.
/// `add`/`sub` and the comparisons work on compatible units and keep the common unit; `mul`/`div`
/// compose units. Whether compatible-but-different units are converted is up to the
/// implementation.
///
/// Implementations that also implement `Eq + Hash` must hash equal quantities identically so that
/// quantities are interchangeable as map keys.
pub trait Quantity: Sized {
    /// Payload type.
    type Value;

    /// Unit type.
    type Unit: Unit;

    /// The same quantity family carrying a `W` value.
    type Rebind<W>: Quantity<Value = W, Unit = Self::Unit>;

    /// The value, read-only.
    fn value(&self) -> &Self::Value;

    /// The unit, read-only.
    fn unit(&self) -> &Self::Unit;

    // ─────────────────────────────────────────────────────────────────────────
    // Comparisons
    // ─────────────────────────────────────────────────────────────────────────

    /// `self == other`.
    fn equals<W>(&self, other: &Self::Rebind<W>) -> OpResult<<Self::Value as CanEq<W>>::Output>
    where
        Self::Value: CanEq<W>;

    /// `self != other`.
    fn not_equals<W>(&self, other: &Self::Rebind<W>) -> OpResult<<Self::Value as CanNe<W>>::Output>
    where
        Self::Value: CanNe<W>;

    /// `self < other`.
    fn less_than<W>(&self, other: &Self::Rebind<W>) -> OpResult<<Self::Value as CanLt<W>>::Output>
    where
        Self::Value: CanLt<W>;

    /// `self <= other`.
    fn less_equal<W>(&self, other: &Self::Rebind<W>) -> OpResult<<Self::Value as CanLe<W>>::Output>
    where
        Self::Value: CanLe<W>;

    /// `self > other`.
    fn greater_than<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanGt<W>>::Output>
    where
        Self::Value: CanGt<W>;

    /// `self >= other`.
    fn greater_equal<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanGe<W>>::Output>
    where
        Self::Value: CanGe<W>;

    // ─────────────────────────────────────────────────────────────────────────
    // Unary arithmetic
    // ─────────────────────────────────────────────────────────────────────────

    /// `+self`.
    fn pos(&self) -> Self::Rebind<<Self::Value as CanPos>::Output>
    where
        Self::Value: CanPos;

    /// `-self`.
    fn neg(&self) -> Self::Rebind<<Self::Value as CanNeg>::Output>
    where
        Self::Value: CanNeg;

    /// `|self|`.
    fn abs(&self) -> Self::Rebind<<Self::Value as CanAbs>::Output>
    where
        Self::Value: CanAbs;

    // ─────────────────────────────────────────────────────────────────────────
    // Binary arithmetic
    // ─────────────────────────────────────────────────────────────────────────

    /// `self + other`.
    fn add<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanAdd<W>>::Output>>
    where
        Self::Value: CanAdd<W>;

    /// Reflected addition: `other + self`.
    fn radd<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanAdd<Self::Value>>::Output>>
    where
        W: CanAdd<Self::Value>;

    /// `self - other`.
    fn sub<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanSub<W>>::Output>>
    where
        Self::Value: CanSub<W>;

    /// Reflected subtraction: `other - self`.
    fn rsub<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanSub<Self::Value>>::Output>>
    where
        W: CanSub<Self::Value>;

    /// `self * other`; units compose.
    fn mul<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanMul<W>>::Output>>
    where
        Self::Value: CanMul<W>;

    /// Reflected multiplication: `other * self`.
    fn rmul<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanMul<Self::Value>>::Output>>
    where
        W: CanMul<Self::Value>;

    /// `self / other`; units compose.
    fn div<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanDiv<W>>::Output>>
    where
        Self::Value: CanDiv<W>;

    /// Reflected division: `other / self`.
    fn rdiv<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanDiv<Self::Value>>::Output>>
    where
        W: CanDiv<Self::Value>;

    // ─────────────────────────────────────────────────────────────────────────
    // Powers
    // ─────────────────────────────────────────────────────────────────────────

    /// `self ** exponent` for an integer or real scalar exponent.
    fn pow<E>(&self, exponent: E) -> OpResult<Self::Rebind<<Self::Value as CanPow<E>>::Output>>
    where
        E: Into<Exponent> + Copy,
        Self::Value: CanPow<E>;

    /// Reflected power: `base ** self`.
    fn rpow<E>(&self, base: E) -> OpResult<Self::Rebind<<Self::Value as CanRPow<E>>::Output>>
    where
        Self::Value: CanRPow<E>;
}
