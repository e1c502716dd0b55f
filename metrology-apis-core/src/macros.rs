//! Macros implementing value capabilities for the primitive numeric types.

/// Implements the comparison capabilities (`bool` output) for each listed type.
#[macro_export]
macro_rules! impl_value_comparisons {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::CanEq for $t {
                type Output = bool;
                #[inline]
                fn value_eq(&self, rhs: &Self) -> bool {
                    self == rhs
                }
            }

            impl $crate::ops::CanNe for $t {
                type Output = bool;
                #[inline]
                fn value_ne(&self, rhs: &Self) -> bool {
                    self != rhs
                }
            }

            impl $crate::ops::CanLt for $t {
                type Output = bool;
                #[inline]
                fn value_lt(&self, rhs: &Self) -> bool {
                    self < rhs
                }
            }

            impl $crate::ops::CanLe for $t {
                type Output = bool;
                #[inline]
                fn value_le(&self, rhs: &Self) -> bool {
                    self <= rhs
                }
            }

            impl $crate::ops::CanGt for $t {
                type Output = bool;
                #[inline]
                fn value_gt(&self, rhs: &Self) -> bool {
                    self > rhs
                }
            }

            impl $crate::ops::CanGe for $t {
                type Output = bool;
                #[inline]
                fn value_ge(&self, rhs: &Self) -> bool {
                    self >= rhs
                }
            }

            impl $crate::ops::CanPos for $t {
                type Output = $t;
                #[inline]
                fn value_pos(&self) -> $t {
                    *self
                }
            }
        )+
    };
}

/// Float `abs`, `powi`/`powf` and reflected powers.
macro_rules! impl_float_capabilities {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::CanAbs for $t {
                type Output = $t;
                #[inline]
                fn value_abs(&self) -> $t {
                    <$t>::abs(*self)
                }
            }

            impl $crate::ops::CanPow<i32> for $t {
                type Output = $t;
                #[inline]
                fn value_pow(&self, exponent: i32) -> $t {
                    <$t>::powi(*self, exponent)
                }
            }

            impl $crate::ops::CanPow<$t> for $t {
                type Output = $t;
                #[inline]
                fn value_pow(&self, exponent: $t) -> $t {
                    <$t>::powf(*self, exponent)
                }
            }

            impl $crate::ops::CanRPow<i32> for $t {
                type Output = $t;
                #[inline]
                fn value_rpow(&self, base: i32) -> $t {
                    <$t>::powf(base as $t, *self)
                }
            }

            impl $crate::ops::CanRPow<$t> for $t {
                type Output = $t;
                #[inline]
                fn value_rpow(&self, base: $t) -> $t {
                    <$t>::powf(base, *self)
                }
            }
        )+
    };
}

/// Integer `abs` (wrapping for signed types, identity for unsigned) and powers.
macro_rules! impl_int_capabilities {
    (signed: $($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::CanAbs for $t {
                type Output = $t;
                #[inline]
                fn value_abs(&self) -> $t {
                    self.wrapping_abs()
                }
            }
        )+
        impl_int_capabilities!(@pow $($t),+);
    };
    (unsigned: $($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::CanAbs for $t {
                type Output = $t;
                #[inline]
                fn value_abs(&self) -> $t {
                    *self
                }
            }
        )+
        impl_int_capabilities!(@pow $($t),+);
    };
    (@pow $($t:ty),+) => {
        $(
            impl $crate::ops::CanPow<u32> for $t {
                type Output = $t;
                #[inline]
                fn value_pow(&self, exponent: u32) -> $t {
                    self.wrapping_pow(exponent)
                }
            }

            impl $crate::ops::CanPow<f64> for $t {
                type Output = f64;
                #[inline]
                fn value_pow(&self, exponent: f64) -> f64 {
                    (*self as f64).powf(exponent)
                }
            }

            impl $crate::ops::CanRPow<f64> for $t {
                type Output = f64;
                #[inline]
                fn value_rpow(&self, base: f64) -> f64 {
                    base.powf(*self as f64)
                }
            }
        )+
    };
}

/// Reports the value-level operations of each listed type; unsigned types lack negation.
macro_rules! impl_value_capabilities {
    (signed: $($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::ValueCapabilities for $t {
                fn value_capabilities() -> $crate::conformance::CapabilitySet {
                    $crate::ops::numeric_capabilities()
                }
            }
        )+
    };
    (unsigned: $($t:ty),+ $(,)?) => {
        $(
            impl $crate::ops::ValueCapabilities for $t {
                fn value_capabilities() -> $crate::conformance::CapabilitySet {
                    $crate::ops::numeric_capabilities().without($crate::conformance::Operation::Neg)
                }
            }
        )+
    };
}
