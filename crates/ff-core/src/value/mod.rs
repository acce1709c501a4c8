//! Compile-time scalar values, one kernel module per intrinsic type
//! category. Kernels report faults (overflow, division by zero, IEEE
//! exception flags) in their return values; they never touch the
//! diagnostic channel themselves.

mod boz;
mod character;
mod complex;
mod integer;
mod logical;
mod real;

pub use boz::BozValue;
pub use character::CharValue;
pub use complex::ComplexValue;
pub use integer::IntValue;
pub use logical::LogicalValue;
pub use real::{RealValue, Rounding};

use crate::types::DynamicType;

/// Result of a three-way signed comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Ordering {
    Less,
    Equal,
    Greater,
}

impl From<std::cmp::Ordering> for Ordering {
    fn from(ord: std::cmp::Ordering) -> Self {
        match ord {
            std::cmp::Ordering::Less => Ordering::Less,
            std::cmp::Ordering::Equal => Ordering::Equal,
            std::cmp::Ordering::Greater => Ordering::Greater,
        }
    }
}

/// Result of an IEEE comparison, where NaN operands compare Unordered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Relation {
    Less,
    Equal,
    Greater,
    Unordered,
}

impl From<Ordering> for Relation {
    fn from(ord: Ordering) -> Self {
        match ord {
            Ordering::Less => Relation::Less,
            Ordering::Equal => Relation::Equal,
            Ordering::Greater => Relation::Greater,
        }
    }
}

/// IEEE exception flags raised by a real operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub struct RealFlags {
    pub overflow: bool,
    pub underflow: bool,
    pub inexact: bool,
    pub invalid_argument: bool,
    pub divide_by_zero: bool,
}

impl RealFlags {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.overflow
            || self.underflow
            || self.inexact
            || self.invalid_argument
            || self.divide_by_zero
    }

    pub fn merge(&mut self, other: RealFlags) {
        self.overflow |= other.overflow;
        self.underflow |= other.underflow;
        self.inexact |= other.inexact;
        self.invalid_argument |= other.invalid_argument;
        self.divide_by_zero |= other.divide_by_zero;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueWithOverflow<T> {
    pub value: T,
    pub overflow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueWithRealFlags<T> {
    pub value: T,
    pub flags: RealFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuotientWithRemainder {
    pub quotient: IntValue,
    pub remainder: IntValue,
    pub division_by_zero: bool,
    pub overflow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PowerWithErrors {
    pub power: IntValue,
    pub zero_to_zero: bool,
    pub division_by_zero: bool,
    pub overflow: bool,
}

common_enum! {
    /// A typed compile-time value. `Constant` stores a flat sequence of
    /// these in column-major element order.
    pub enum Scalar {
        Int(IntValue),
        Real(RealValue),
        Complex(ComplexValue),
        Char(CharValue),
        Logical(LogicalValue),
    }
}

impl Scalar {
    /// The specific type of this value, including the CHARACTER length.
    pub fn get_type(&self) -> DynamicType {
        match self {
            Scalar::Int(x) => DynamicType::integer(x.kind()),
            Scalar::Real(x) => DynamicType::real(x.kind()),
            Scalar::Complex(x) => DynamicType::complex(x.kind()),
            Scalar::Char(x) => {
                DynamicType::character_with_len(x.kind(), x.len())
            }
            Scalar::Logical(x) => DynamicType::logical(x.kind),
        }
    }

    pub fn as_int(&self) -> Option<&IntValue> {
        match self {
            Scalar::Int(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<&RealValue> {
        match self {
            Scalar::Real(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexValue> {
        match self {
            Scalar::Complex(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&CharValue> {
        match self {
            Scalar::Char(x) => Some(x),
            _ => None,
        }
    }

    pub fn as_logical(&self) -> Option<&LogicalValue> {
        match self {
            Scalar::Logical(x) => Some(x),
            _ => None,
        }
    }

    pub fn to_int64(&self) -> Option<i64> {
        self.as_int().and_then(IntValue::to_int64)
    }
}
