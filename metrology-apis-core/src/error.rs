//! Error types shared by every contract.
//!
//! Each failure family has its own type so that generic code can match on exactly what it
//! expects; [`MetrologyError`] unifies them for callers that just propagate.

use crate::conformance::{Operation, Protocol};

/// An object fails a structural-conformance check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("object does not conform to the `{protocol}` protocol: missing {}", join_ops(.missing))]
pub struct ConformanceError {
    /// Protocol that was checked.
    pub protocol: Protocol,
    /// Required operations the object lacks, in declaration order.
    pub missing: Vec<Operation>,
}

fn join_ops(ops: &[Operation]) -> String {
    ops.iter()
        .map(|op| op.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `asdimension`, `asunit` or `asquantity` cannot coerce its input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Input is neither a string label nor a native value of the target type.
    #[error("cannot convert object to a {target}: expected a string label or a native {target}")]
    UnsupportedType {
        /// Target kind (`"dimension"`, `"unit"`, `"quantity"`).
        target: &'static str,
    },

    /// Label does not name a dimension known to the implementation.
    #[error("unknown dimension `{0}`")]
    UnknownDimension(String),

    /// Symbol does not name a unit known to the implementation.
    #[error("unknown unit `{0}`")]
    UnknownUnit(String),

    /// Input does not follow the implementation's grammar.
    #[error("cannot parse `{input}`: {reason}")]
    Parse {
        /// Offending input.
        input: String,
        /// What went wrong.
        reason: String,
    },

    /// A unit cannot be raised to the requested power.
    #[error("cannot raise `{unit}` to the power `{exponent}`: {reason}")]
    InvalidExponent {
        /// Unit being raised.
        unit: String,
        /// Requested exponent.
        exponent: String,
        /// What went wrong.
        reason: String,
    },

    /// An existing quantity cannot be re-expressed in the requested unit.
    #[error("cannot express a quantity in `{from}` as `{to}`: dimensions differ")]
    IncompatibleUnit {
        /// Unit the quantity carries.
        from: String,
        /// Unit that was requested.
        to: String,
    },
}

/// Namespace discovery was asked for an API version it does not provide.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Well-formed token that the implementation does not support.
    #[error("metrology API version `{requested}` is not supported (supported: {supported})")]
    Unsupported {
        /// Requested token.
        requested: String,
        /// Comma-separated supported tokens.
        supported: String,
    },

    /// Token that is not a dot-separated list of integers.
    #[error("malformed metrology API version `{0}`")]
    Malformed(String),
}

/// An operator received operands whose units make the operation meaningless.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {operation} `{lhs}` and `{rhs}`")]
pub struct IncompatibleOperandError {
    /// Operation name (`"add"`, `"compare"`, …).
    pub operation: &'static str,
    /// Left operand's unit.
    pub lhs: String,
    /// Right operand's unit.
    pub rhs: String,
}

impl IncompatibleOperandError {
    /// Builds the error from anything printable.
    pub fn new(
        operation: &'static str,
        lhs: impl core::fmt::Display,
        rhs: impl core::fmt::Display,
    ) -> Self {
        Self {
            operation,
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }
    }
}

/// Any error raised by the metrology contracts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetrologyError {
    /// See [`ConformanceError`].
    #[error(transparent)]
    Conformance(#[from] ConformanceError),
    /// See [`ConversionError`].
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// See [`VersionError`].
    #[error(transparent)]
    Version(#[from] VersionError),
    /// See [`IncompatibleOperandError`].
    #[error(transparent)]
    IncompatibleOperand(#[from] IncompatibleOperandError),
}

/// Result of a quantity operator.
pub type OpResult<T> = Result<T, IncompatibleOperandError>;
