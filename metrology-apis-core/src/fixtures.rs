//! Minimal dimension, unit, quantity and namespace shared by the in-crate tests.

use core::fmt::{Display, Formatter, Result as FmtResult};
use core::ops::{Div, Mul};

use crate::ops::*;
use crate::*;

// ─────────────────────────────────────────────────────────────────────────────
// Dimension, unit and quantity
// ─────────────────────────────────────────────────────────────────────────────

/// Exponents of (length, time).
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Dim(pub(crate) i32, pub(crate) i32);

impl Mul for Dim {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Dim(self.0 + rhs.0, self.1 + rhs.1)
    }
}

impl Div for Dim {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        Dim(self.0 - rhs.0, self.1 - rhs.1)
    }
}

impl Dimension for Dim {
    fn dimensionless() -> Self {
        Dim(0, 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TestUnit {
    pub(crate) scale: f64,
    pub(crate) dim: Dim,
}

pub(crate) const METER: TestUnit = TestUnit {
    scale: 1.0,
    dim: Dim(1, 0),
};
pub(crate) const SECOND: TestUnit = TestUnit {
    scale: 1.0,
    dim: Dim(0, 1),
};
pub(crate) const ONE: TestUnit = TestUnit {
    scale: 1.0,
    dim: Dim(0, 0),
};

impl Display for TestUnit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}·m^{}·s^{}", self.scale, self.dim.0, self.dim.1)
    }
}

impl Mul for TestUnit {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        TestUnit {
            scale: self.scale * rhs.scale,
            dim: self.dim * rhs.dim,
        }
    }
}

impl Div for TestUnit {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        TestUnit {
            scale: self.scale / rhs.scale,
            dim: self.dim / rhs.dim,
        }
    }
}

impl Unit for TestUnit {
    type Dimension = Dim;

    fn dimension(&self) -> Dim {
        self.dim
    }

    fn pow(&self, exponent: Exponent) -> Result<Self, ConversionError> {
        let real = exponent.to_f64();
        let whole = real.round();
        if !real.is_finite() || (whole != real && self.dim != Dim(0, 0)) {
            return Err(ConversionError::InvalidExponent {
                unit: self.to_string(),
                exponent: exponent.to_string(),
                reason: "dimensioned units take integer powers only".into(),
            });
        }
        Ok(TestUnit {
            scale: self.scale.powf(real),
            dim: self.dim.powi(whole as i32),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Q<V> {
    pub(crate) value: V,
    pub(crate) unit: TestUnit,
}

impl<V> Q<V> {
    fn same_unit<W>(&self, other: &Q<W>, operation: &'static str) -> OpResult<()> {
        if self.unit == other.unit {
            Ok(())
        } else {
            Err(IncompatibleOperandError::new(
                operation, self.unit, other.unit,
            ))
        }
    }
}

impl<V> Quantity for Q<V> {
    type Value = V;
    type Unit = TestUnit;
    type Rebind<W> = Q<W>;

    fn value(&self) -> &V {
        &self.value
    }

    fn unit(&self) -> &TestUnit {
        &self.unit
    }

    fn equals<W>(&self, other: &Self::Rebind<W>) -> OpResult<<Self::Value as CanEq<W>>::Output>
    where
        Self::Value: CanEq<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_eq(&other.value))
    }

    fn not_equals<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanNe<W>>::Output>
    where
        Self::Value: CanNe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_ne(&other.value))
    }

    fn less_than<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanLt<W>>::Output>
    where
        Self::Value: CanLt<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_lt(&other.value))
    }

    fn less_equal<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanLe<W>>::Output>
    where
        Self::Value: CanLe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_le(&other.value))
    }

    fn greater_than<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanGt<W>>::Output>
    where
        Self::Value: CanGt<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_gt(&other.value))
    }

    fn greater_equal<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<<Self::Value as CanGe<W>>::Output>
    where
        Self::Value: CanGe<W>,
    {
        self.same_unit(other, "compare")?;
        Ok(self.value.value_ge(&other.value))
    }

    fn pos(&self) -> Self::Rebind<<Self::Value as CanPos>::Output>
    where
        Self::Value: CanPos,
    {
        Q {
            value: self.value.value_pos(),
            unit: self.unit,
        }
    }

    fn neg(&self) -> Self::Rebind<<Self::Value as CanNeg>::Output>
    where
        Self::Value: CanNeg,
    {
        Q {
            value: self.value.value_neg(),
            unit: self.unit,
        }
    }

    fn abs(&self) -> Self::Rebind<<Self::Value as CanAbs>::Output>
    where
        Self::Value: CanAbs,
    {
        Q {
            value: self.value.value_abs(),
            unit: self.unit,
        }
    }

    fn add<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanAdd<W>>::Output>>
    where
        Self::Value: CanAdd<W>,
    {
        self.same_unit(other, "add")?;
        Ok(Q {
            value: self.value.value_add(&other.value),
            unit: self.unit,
        })
    }

    fn radd<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanAdd<Self::Value>>::Output>>
    where
        W: CanAdd<Self::Value>,
    {
        self.same_unit(other, "add")?;
        Ok(Q {
            value: other.value.value_add(&self.value),
            unit: self.unit,
        })
    }

    fn sub<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanSub<W>>::Output>>
    where
        Self::Value: CanSub<W>,
    {
        self.same_unit(other, "subtract")?;
        Ok(Q {
            value: self.value.value_sub(&other.value),
            unit: self.unit,
        })
    }

    fn rsub<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanSub<Self::Value>>::Output>>
    where
        W: CanSub<Self::Value>,
    {
        self.same_unit(other, "subtract")?;
        Ok(Q {
            value: other.value.value_sub(&self.value),
            unit: self.unit,
        })
    }

    fn mul<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanMul<W>>::Output>>
    where
        Self::Value: CanMul<W>,
    {
        Ok(Q {
            value: self.value.value_mul(&other.value),
            unit: self.unit * other.unit,
        })
    }

    fn rmul<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanMul<Self::Value>>::Output>>
    where
        W: CanMul<Self::Value>,
    {
        Ok(Q {
            value: other.value.value_mul(&self.value),
            unit: other.unit * self.unit,
        })
    }

    fn div<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<Self::Value as CanDiv<W>>::Output>>
    where
        Self::Value: CanDiv<W>,
    {
        Ok(Q {
            value: self.value.value_div(&other.value),
            unit: self.unit / other.unit,
        })
    }

    fn rdiv<W>(
        &self,
        other: &Self::Rebind<W>,
    ) -> OpResult<Self::Rebind<<W as CanDiv<Self::Value>>::Output>>
    where
        W: CanDiv<Self::Value>,
    {
        Ok(Q {
            value: other.value.value_div(&self.value),
            unit: other.unit / self.unit,
        })
    }

    fn pow<E>(
        &self,
        exponent: E,
    ) -> OpResult<Self::Rebind<<Self::Value as CanPow<E>>::Output>>
    where
        E: Into<Exponent> + Copy,
        Self::Value: CanPow<E>,
    {
        let power: Exponent = exponent.into();
        let unit = self
            .unit
            .pow(power)
            .map_err(|_| IncompatibleOperandError::new("exponentiate", self.unit, power))?;
        Ok(Q {
            value: self.value.value_pow(exponent),
            unit,
        })
    }

    fn rpow<E>(&self, base: E) -> OpResult<Self::Rebind<<Self::Value as CanRPow<E>>::Output>>
    where
        Self::Value: CanRPow<E>,
    {
        if self.unit != ONE {
            return Err(IncompatibleOperandError::new(
                "exponentiate",
                "a scalar",
                self.unit,
            ));
        }
        Ok(Q {
            value: self.value.value_rpow(base),
            unit: ONE,
        })
    }
}

pub(crate) fn q<V>(value: V, unit: TestUnit) -> Q<V> {
    Q { value, unit }
}


// ─────────────────────────────────────────────────────────────────────────────
// Namespace
// ─────────────────────────────────────────────────────────────────────────────

/// Knows the labels `length`, `time` and `1` and the symbols `m`, `s` and `1`.
pub(crate) struct TestNamespace;

impl MetrologyNamespace for TestNamespace {
    type Value = f64;
    type Dimension = Dim;
    type Unit = TestUnit;
    type Quantity = Q<f64>;

    fn api_version(&self) -> ApiVersion {
        ApiVersion::from_components([1, 0])
    }

    fn asdimension(&self, obj: DimensionArg<'_, Dim>) -> Result<Dim, ConversionError> {
        match obj {
            DimensionArg::Label("length") => Ok(METER.dim),
            DimensionArg::Label("time") => Ok(SECOND.dim),
            DimensionArg::Label("1") => Ok(Dim::dimensionless()),
            DimensionArg::Label(other) => Err(ConversionError::UnknownDimension(other.into())),
            DimensionArg::Dimension(dim) => Ok(dim),
        }
    }

    fn asunit(&self, obj: UnitArg<'_, TestUnit>) -> Result<TestUnit, ConversionError> {
        match obj {
            UnitArg::Label("m") => Ok(METER),
            UnitArg::Label("s") => Ok(SECOND),
            UnitArg::Label("1") => Ok(ONE),
            UnitArg::Label(other) => Err(ConversionError::UnknownUnit(other.into())),
            UnitArg::Unit(unit) => Ok(unit),
        }
    }

    fn asquantity(
        &self,
        obj: QuantityArg<Q<f64>, f64>,
        unit: &TestUnit,
    ) -> Result<Q<f64>, ConversionError> {
        match obj {
            QuantityArg::Value(value) => Ok(q(value, *unit)),
            QuantityArg::Quantity(quantity) if quantity.unit.is_compatible(unit) => Ok(q(
                quantity.value * quantity.unit.scale / unit.scale,
                *unit,
            )),
            QuantityArg::Quantity(quantity) => Err(ConversionError::IncompatibleUnit {
                from: quantity.unit.to_string(),
                to: unit.to_string(),
            }),
        }
    }
}
