//! IEEE binary floating point at the kinds the host can round exactly:
//! kind 4 (single) and kind 8 (double). Arithmetic is computed in double
//! and rounded once to the result kind under the active rounding mode;
//! the bit pattern is stored so that expression equality stays
//! structural. Other real kinds remain valid types whose operations are
//! simply never folded.

use super::{IntValue, RealFlags, Relation, ValueWithRealFlags};
use crate::types::Kind;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Rounding {
    TiesToEven,
    ToZero,
    Up,
    Down,
}

impl Default for Rounding {
    fn default() -> Self {
        Rounding::TiesToEven
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RealValue {
    kind: Kind,
    bits: u64,
}

pub(crate) const FOLDABLE_REAL_KINDS: &[Kind] = &[4, 8];

impl RealValue {
    pub fn is_foldable_kind(kind: Kind) -> bool {
        FOLDABLE_REAL_KINDS.contains(&kind)
    }

    /// Rounds `value` to nearest at `kind`.
    pub fn new(kind: Kind, value: f64) -> Self {
        let value = match kind {
            4 => value as f32 as f64,
            _ => value,
        };
        Self {
            kind,
            bits: value.to_bits(),
        }
    }

    pub fn zero(kind: Kind) -> Self {
        Self::new(kind, 0.0)
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits)
    }

    pub fn is_nan(&self) -> bool {
        self.value().is_nan()
    }

    pub fn is_infinite(&self) -> bool {
        self.value().is_infinite()
    }

    pub fn is_negative(&self) -> bool {
        self.value().is_sign_negative()
    }

    pub fn negate(&self) -> RealValue {
        Self {
            kind: self.kind,
            bits: self.bits ^ (1u64 << 63),
        }
    }

    pub fn abs(&self) -> RealValue {
        Self {
            kind: self.kind,
            bits: self.bits & !(1u64 << 63),
        }
    }

    pub fn add(&self, that: &RealValue, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        self.binary_op(that, rounding, |a, b| a + b, |_, _| false)
    }

    pub fn subtract(&self, that: &RealValue, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        self.binary_op(that, rounding, |a, b| a - b, |_, _| false)
    }

    pub fn multiply(&self, that: &RealValue, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        self.binary_op(that, rounding, |a, b| a * b, |_, _| false)
    }

    pub fn divide(&self, that: &RealValue, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        self.binary_op(
            that,
            rounding,
            |a, b| a / b,
            |a, b| b == 0.0 && a != 0.0 && a.is_finite(),
        )
    }

    fn binary_op(
        &self,
        that: &RealValue,
        rounding: Rounding,
        op: impl Fn(f64, f64) -> f64,
        divides_by_zero: impl Fn(f64, f64) -> bool,
    ) -> ValueWithRealFlags<RealValue> {
        let a = self.value();
        let b = that.value();
        let exact = op(a, b);
        let mut flags = RealFlags::empty();
        flags.invalid_argument = exact.is_nan() && !a.is_nan() && !b.is_nan();
        flags.divide_by_zero = divides_by_zero(a, b);
        flags.overflow =
            exact.is_infinite() && a.is_finite() && b.is_finite() && !flags.divide_by_zero;
        let (value, round_flags) = round_to_kind(self.kind, exact, rounding);
        flags.merge(round_flags);
        ValueWithRealFlags {
            value: Self {
                kind: self.kind,
                bits: value.to_bits(),
            },
            flags,
        }
    }

    pub fn compare(&self, that: &RealValue) -> Relation {
        match self.value().partial_cmp(&that.value()) {
            Some(std::cmp::Ordering::Less) => Relation::Less,
            Some(std::cmp::Ordering::Equal) => Relation::Equal,
            Some(std::cmp::Ordering::Greater) => Relation::Greater,
            None => Relation::Unordered,
        }
    }

    /// Conversion to integer in the manner of INT(): truncation toward
    /// zero, with InvalidArgument for NaN and Overflow outside the
    /// target's range (the result saturates so callers have a value).
    pub fn to_integer(&self, to_kind: Kind) -> ValueWithRealFlags<IntValue> {
        let mut flags = RealFlags::empty();
        let v = self.value();
        if v.is_nan() {
            flags.invalid_argument = true;
            return ValueWithRealFlags {
                value: IntValue::zero(to_kind),
                flags,
            };
        }
        let truncated = v.trunc();
        // 2**(bits-1) is exactly representable as f64 for every kind.
        let bound = 2f64.powi(to_kind as i32 * 8 - 1);
        if truncated >= bound {
            flags.overflow = true;
            return ValueWithRealFlags {
                value: IntValue::max_value(to_kind),
                flags,
            };
        }
        if truncated < -bound {
            flags.overflow = true;
            return ValueWithRealFlags {
                value: IntValue::min_value(to_kind),
                flags,
            };
        }
        ValueWithRealFlags {
            value: IntValue::new(to_kind, truncated as i128),
            flags,
        }
    }

    pub fn from_integer(
        kind: Kind,
        n: &IntValue,
        rounding: Rounding,
    ) -> ValueWithRealFlags<RealValue> {
        let exact = n.value() as f64;
        let mut flags = RealFlags::empty();
        // i128 -> f64 is itself a rounding step for values beyond 2**53.
        if exact.is_finite() && exact.abs() < 2f64.powi(127) && exact as i128 != n.value() {
            flags.inexact = true;
        }
        let (value, round_flags) = round_to_kind(kind, exact, rounding);
        flags.merge(round_flags);
        ValueWithRealFlags {
            value: Self {
                kind,
                bits: value.to_bits(),
            },
            flags,
        }
    }

    /// REAL(kind-to-kind) conversion.
    pub fn convert(&self, to_kind: Kind, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        let exact = self.value();
        let (value, mut flags) = round_to_kind(to_kind, exact, rounding);
        flags.overflow |= value.is_infinite() && exact.is_finite();
        ValueWithRealFlags {
            value: Self {
                kind: to_kind,
                bits: value.to_bits(),
            },
            flags,
        }
    }

    /// Exponentiation by squaring for an integer exponent; a negative
    /// exponent inverts the positive power.
    pub fn pow_int(&self, exponent: i64, rounding: Rounding) -> ValueWithRealFlags<RealValue> {
        let one = Self::new(self.kind, 1.0);
        let mut flags = RealFlags::empty();
        let mut result = one;
        let mut base = *self;
        let negative = exponent < 0;
        let mut remaining = exponent.unsigned_abs();
        while remaining != 0 {
            if remaining & 1 != 0 {
                let product = result.multiply(&base, rounding);
                flags.merge(product.flags);
                result = product.value;
            }
            remaining >>= 1;
            if remaining != 0 {
                let squared = base.multiply(&base, rounding);
                flags.merge(squared.flags);
                base = squared.value;
            }
        }
        if negative {
            let inverted = one.divide(&result, rounding);
            flags.merge(inverted.flags);
            result = inverted.value;
        }
        ValueWithRealFlags {
            value: result,
            flags,
        }
    }

    /// EXPONENT(): the model exponent, such that the value is
    /// fraction * 2**e with 0.5 <= |fraction| < 1; zero yields 0.
    pub fn exponent(&self) -> i64 {
        let v = self.value();
        if v == 0.0 || !v.is_finite() {
            0
        } else {
            let bits = v.abs().to_bits();
            let biased = (bits >> 52) as i64 & 0x7ff;
            if biased == 0 {
                // subnormal as f64; recover via log2
                v.abs().log2().floor() as i64 + 1
            } else {
                biased - 1023 + 1
            }
        }
    }

    /// AINT(): truncation to a whole number at the same kind.
    pub fn aint(&self) -> ValueWithRealFlags<RealValue> {
        ValueWithRealFlags {
            value: Self::new(self.kind, self.value().trunc()),
            flags: RealFlags::empty(),
        }
    }

    pub fn epsilon(kind: Kind) -> Option<RealValue> {
        match kind {
            4 => Some(Self::new(4, f32::EPSILON as f64)),
            8 => Some(Self::new(8, f64::EPSILON)),
            _ => None,
        }
    }

    pub fn flush_subnormal_to_zero(&self) -> RealValue {
        let v = self.value();
        let tiny = match self.kind {
            4 => (f32::MIN_POSITIVE as f64) > v.abs(),
            8 => f64::MIN_POSITIVE > v.abs(),
            _ => false,
        };
        if v != 0.0 && v.is_finite() && tiny {
            Self::new(self.kind, if v.is_sign_negative() { -0.0 } else { 0.0 })
        } else {
            *self
        }
    }

    /// Width of the kind's IEEE interchange format, when supported.
    pub fn format_width(kind: Kind) -> Option<u32> {
        match kind {
            4 => Some(32),
            8 => Some(64),
            _ => None,
        }
    }

    /// The kind-width IEEE bit pattern, zero-extended.
    pub fn ieee_bits(&self) -> u128 {
        match self.kind {
            4 => (self.value() as f32).to_bits() as u128,
            _ => self.bits as u128,
        }
    }

    /// Reinterprets a kind-width bit pattern as a value of `kind`.
    pub fn from_ieee_bits(kind: Kind, bits: u128) -> Option<RealValue> {
        match kind {
            4 => Some(Self {
                kind,
                bits: (f32::from_bits(bits as u32) as f64).to_bits(),
            }),
            8 => Some(Self {
                kind,
                bits: bits as u64,
            }),
            _ => None,
        }
    }
}

/// Rounds an exact double result to `kind` under `rounding`, reporting
/// Inexact, Overflow, and Underflow as observed during the rounding.
fn round_to_kind(kind: Kind, exact: f64, rounding: Rounding) -> (f64, RealFlags) {
    let mut flags = RealFlags::empty();
    if kind != 4 {
        return (exact, flags);
    }
    if exact.is_nan() {
        return (f32::NAN as f64, flags);
    }
    let mut rounded = exact as f32;
    if rounded as f64 != exact {
        flags.inexact = true;
        match rounding {
            Rounding::TiesToEven => {}
            Rounding::ToZero => {
                if (rounded as f64).abs() > exact.abs() {
                    rounded = next_toward_zero(rounded);
                }
            }
            Rounding::Up => {
                if (rounded as f64) < exact {
                    rounded = next_up(rounded);
                }
            }
            Rounding::Down => {
                if (rounded as f64) > exact {
                    rounded = next_down(rounded);
                }
            }
        }
        flags.overflow = rounded.is_infinite() && exact.is_finite();
        flags.underflow = (rounded.is_finite()
            && rounded != 0.0
            && rounded.abs() < f32::MIN_POSITIVE)
            || (rounded == 0.0 && exact != 0.0);
    }
    (rounded as f64, flags)
}

fn next_up(x: f32) -> f32 {
    if x.is_nan() || x == f32::INFINITY {
        x
    } else if x == 0.0 {
        f32::from_bits(1)
    } else if x > 0.0 {
        f32::from_bits(x.to_bits() + 1)
    } else {
        f32::from_bits(x.to_bits() - 1)
    }
}

fn next_down(x: f32) -> f32 {
    -next_up(-x)
}

fn next_toward_zero(x: f32) -> f32 {
    if x > 0.0 {
        next_down(x)
    } else if x < 0.0 {
        next_up(x)
    } else {
        x
    }
}
