//! Value capabilities threaded through the [`Quantity`](crate::Quantity) operators.
//!
//! A quantity's operator does not fix numeric semantics: adding two quantities adds their values
//! with whatever the value type's own addition produces, comparing them yields whatever the value
//! comparison yields. Each capability names one such operation together with its output type.
//!
//! - Arithmetic capabilities (`CanAdd`, `CanSub`, `CanMul`, `CanDiv`, `CanNeg`) are blanket
//!   implemented over the `core::ops` traits, so any value type with operator overloads (including
//!   array types whose operators are element-wise) participates automatically.
//! - Comparison capabilities (`CanEq`, `CanLt`, …) are implemented for the primitive numeric types
//!   with a `bool` output. They are deliberately not blanket-implemented over `PartialEq` /
//!   `PartialOrd`, so that array-like value types can implement them with an element-wise output.
//! - `CanPos`, `CanAbs`, `CanPow`, `CanRPow` have no `core` counterpart and are implemented for
//!   the primitive numeric types.
//!
//! [`ValueCapabilities`] mirrors the same facts at run time for conformance reports.

use core::ops::{Add, Div, Mul, Neg, Sub};

use crate::conformance::{CapabilitySet, Operation, Protocol};

/// Equality with output `Self::Output`.
pub trait CanEq<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self == rhs`.
    fn value_eq(&self, rhs: &Rhs) -> Self::Output;
}

/// Inequality with output `Self::Output`.
pub trait CanNe<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self != rhs`.
    fn value_ne(&self, rhs: &Rhs) -> Self::Output;
}

/// Less-than with output `Self::Output`.
pub trait CanLt<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self < rhs`.
    fn value_lt(&self, rhs: &Rhs) -> Self::Output;
}

/// Less-or-equal with output `Self::Output`.
pub trait CanLe<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self <= rhs`.
    fn value_le(&self, rhs: &Rhs) -> Self::Output;
}

/// Greater-than with output `Self::Output`.
pub trait CanGt<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self > rhs`.
    fn value_gt(&self, rhs: &Rhs) -> Self::Output;
}

/// Greater-or-equal with output `Self::Output`.
pub trait CanGe<Rhs = Self> {
    /// Result of the comparison.
    type Output;
    /// `self >= rhs`.
    fn value_ge(&self, rhs: &Rhs) -> Self::Output;
}

/// Unary plus.
pub trait CanPos {
    /// Result type.
    type Output;
    /// `+self`.
    fn value_pos(&self) -> Self::Output;
}

/// Negation.
pub trait CanNeg {
    /// Result type.
    type Output;
    /// `-self`.
    fn value_neg(&self) -> Self::Output;
}

/// Absolute value.
pub trait CanAbs {
    /// Result type.
    type Output;
    /// `|self|`.
    fn value_abs(&self) -> Self::Output;
}

/// Addition.
pub trait CanAdd<Rhs = Self> {
    /// Result type.
    type Output;
    /// `self + rhs`.
    fn value_add(&self, rhs: &Rhs) -> Self::Output;
}

/// Subtraction.
pub trait CanSub<Rhs = Self> {
    /// Result type.
    type Output;
    /// `self - rhs`.
    fn value_sub(&self, rhs: &Rhs) -> Self::Output;
}

/// Multiplication.
pub trait CanMul<Rhs = Self> {
    /// Result type.
    type Output;
    /// `self * rhs`.
    fn value_mul(&self, rhs: &Rhs) -> Self::Output;
}

/// Division.
pub trait CanDiv<Rhs = Self> {
    /// Result type.
    type Output;
    /// `self / rhs`.
    fn value_div(&self, rhs: &Rhs) -> Self::Output;
}

/// Exponentiation by a scalar `E`.
pub trait CanPow<E> {
    /// Result type.
    type Output;
    /// `self ** exponent`.
    fn value_pow(&self, exponent: E) -> Self::Output;
}

/// Reflected exponentiation: a scalar base raised to `self`.
pub trait CanRPow<E> {
    /// Result type.
    type Output;
    /// `base ** self`.
    fn value_rpow(&self, base: E) -> Self::Output;
}

/// Run-time report of the quantity operations a value type supports.
///
/// The `Can*` traits decide at compile time which operators a quantity over this value type
/// accepts; this trait lists the same operations so that [`CapabilitySet::of_quantity`] can report
/// them. Implementations must only list operations whose capability trait the type implements.
pub trait ValueCapabilities {
    /// Value-level operations: comparisons, unary and binary arithmetic, and powers.
    fn value_capabilities() -> CapabilitySet;
}

/// Every value-level operation a quantity forwards to its value.
pub(crate) fn numeric_capabilities() -> CapabilitySet {
    Protocol::Quantity
        .required()
        .iter()
        .copied()
        .filter(|op| !matches!(op, Operation::Value | Operation::Unit))
        .collect()
}

/// Sequences have no arithmetic or comparison operators of their own.
impl<T> ValueCapabilities for Vec<T> {
    fn value_capabilities() -> CapabilitySet {
        CapabilitySet::new()
    }
}

impl<T, Rhs> CanAdd<Rhs> for T
where
    T: Clone + Add<Rhs>,
    Rhs: Clone,
{
    type Output = <T as Add<Rhs>>::Output;
    #[inline]
    fn value_add(&self, rhs: &Rhs) -> Self::Output {
        self.clone() + rhs.clone()
    }
}

impl<T, Rhs> CanSub<Rhs> for T
where
    T: Clone + Sub<Rhs>,
    Rhs: Clone,
{
    type Output = <T as Sub<Rhs>>::Output;
    #[inline]
    fn value_sub(&self, rhs: &Rhs) -> Self::Output {
        self.clone() - rhs.clone()
    }
}

impl<T, Rhs> CanMul<Rhs> for T
where
    T: Clone + Mul<Rhs>,
    Rhs: Clone,
{
    type Output = <T as Mul<Rhs>>::Output;
    #[inline]
    fn value_mul(&self, rhs: &Rhs) -> Self::Output {
        self.clone() * rhs.clone()
    }
}

impl<T, Rhs> CanDiv<Rhs> for T
where
    T: Clone + Div<Rhs>,
    Rhs: Clone,
{
    type Output = <T as Div<Rhs>>::Output;
    #[inline]
    fn value_div(&self, rhs: &Rhs) -> Self::Output {
        self.clone() / rhs.clone()
    }
}

impl<T> CanNeg for T
where
    T: Clone + Neg,
{
    type Output = <T as Neg>::Output;
    #[inline]
    fn value_neg(&self) -> Self::Output {
        -self.clone()
    }
}

impl_value_comparisons!(f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_float_capabilities!(f32, f64);
impl_int_capabilities!(signed: i8, i16, i32, i64, i128, isize);
impl_int_capabilities!(unsigned: u8, u16, u32, u64, u128, usize);
impl_value_capabilities!(signed: f32, f64, i8, i16, i32, i64, i128, isize);
impl_value_capabilities!(unsigned: u8, u16, u32, u64, u128, usize);
