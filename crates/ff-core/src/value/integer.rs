//! Fixed-width signed integer arithmetic for kinds 1, 2, 4, 8, and 16.
//! Values are stored sign-extended in an i128; every operation wraps its
//! result to the kind's width and reports signed semantics (overflow is
//! "the mathematically exact result exceeds the signed range").

use super::{Ordering, PowerWithErrors, QuotientWithRemainder, ValueWithOverflow};
use crate::types::Kind;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct IntValue {
    kind: Kind,
    raw: i128,
}

impl IntValue {
    /// Wraps `value` to the two's-complement range of `kind`.
    pub fn new(kind: Kind, value: i128) -> Self {
        Self {
            kind,
            raw: wrap(kind, value),
        }
    }

    pub fn zero(kind: Kind) -> Self {
        Self { kind, raw: 0 }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn bits(&self) -> u32 {
        bits_of(self.kind)
    }

    /// Sign-extended value; exact for every kind including 16.
    pub fn value(&self) -> i128 {
        self.raw
    }

    pub fn to_int64(&self) -> Option<i64> {
        i64::try_from(self.raw).ok()
    }

    /// The kind-width bit pattern, zero-extended into a u128.
    pub fn unsigned_bits(&self) -> u128 {
        let bits = self.bits();
        if bits == 128 {
            self.raw as u128
        } else {
            (self.raw as u128) & ((1u128 << bits) - 1)
        }
    }

    pub fn min_value(kind: Kind) -> Self {
        let bits = bits_of(kind);
        Self {
            kind,
            raw: if bits == 128 {
                i128::MIN
            } else {
                -(1i128 << (bits - 1))
            },
        }
    }

    pub fn max_value(kind: Kind) -> Self {
        let bits = bits_of(kind);
        Self {
            kind,
            raw: if bits == 128 {
                i128::MAX
            } else {
                (1i128 << (bits - 1)) - 1
            },
        }
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn is_negative(&self) -> bool {
        self.raw < 0
    }

    fn wrapped(&self, exact: i128, exact_overflowed: bool) -> ValueWithOverflow<IntValue> {
        let wrapped = wrap(self.kind, exact);
        ValueWithOverflow {
            value: Self {
                kind: self.kind,
                raw: wrapped,
            },
            overflow: exact_overflowed || wrapped != exact,
        }
    }

    pub fn add_signed(&self, that: &IntValue) -> ValueWithOverflow<IntValue> {
        let (exact, over) = self.raw.overflowing_add(that.raw);
        self.wrapped(exact, over)
    }

    pub fn subtract_signed(&self, that: &IntValue) -> ValueWithOverflow<IntValue> {
        let (exact, over) = self.raw.overflowing_sub(that.raw);
        self.wrapped(exact, over)
    }

    pub fn multiply_signed(&self, that: &IntValue) -> ValueWithOverflow<IntValue> {
        let (exact, over) = self.raw.overflowing_mul(that.raw);
        self.wrapped(exact, over)
    }

    pub fn negate(&self) -> ValueWithOverflow<IntValue> {
        let (exact, over) = self.raw.overflowing_neg();
        self.wrapped(exact, over)
    }

    pub fn abs(&self) -> ValueWithOverflow<IntValue> {
        if self.raw < 0 {
            self.negate()
        } else {
            ValueWithOverflow {
                value: *self,
                overflow: false,
            }
        }
    }

    /// DIM(a, b) = MAX(a - b, 0).
    pub fn dim(&self, that: &IntValue) -> ValueWithOverflow<IntValue> {
        if self.compare_signed(that) == Ordering::Greater {
            self.subtract_signed(that)
        } else {
            ValueWithOverflow {
                value: Self::zero(self.kind),
                overflow: false,
            }
        }
    }

    pub fn divide_signed(&self, that: &IntValue) -> QuotientWithRemainder {
        if that.is_zero() {
            return QuotientWithRemainder {
                quotient: Self::zero(self.kind),
                remainder: Self::zero(self.kind),
                division_by_zero: true,
                overflow: false,
            };
        }
        // INT_MIN / -1 is the only overflowing case.
        if self.raw == Self::min_value(self.kind).raw && that.raw == -1 {
            return QuotientWithRemainder {
                quotient: *self,
                remainder: Self::zero(self.kind),
                division_by_zero: false,
                overflow: true,
            };
        }
        QuotientWithRemainder {
            quotient: Self::new(self.kind, self.raw / that.raw),
            remainder: Self::new(self.kind, self.raw % that.raw),
            division_by_zero: false,
            overflow: false,
        }
    }

    /// Integer exponentiation by squaring. `0**0` is 1 with the
    /// zeroToZero flag; zero to a negative power raises divisionByZero.
    pub fn power(&self, exponent: &IntValue) -> PowerWithErrors {
        let mut result = PowerWithErrors {
            power: Self::new(self.kind, 1),
            zero_to_zero: false,
            division_by_zero: false,
            overflow: false,
        };
        if exponent.is_zero() {
            result.zero_to_zero = self.is_zero();
            return result;
        }
        if exponent.is_negative() {
            if self.is_zero() {
                result.power = Self::zero(self.kind);
                result.division_by_zero = true;
            } else if self.raw == 1 {
                // already 1
            } else if self.raw == -1 {
                if exponent.raw & 1 != 0 {
                    result.power = Self::new(self.kind, -1);
                }
            } else {
                result.power = Self::zero(self.kind);
            }
            return result;
        }
        let mut base = *self;
        let mut remaining = exponent.raw;
        loop {
            if remaining & 1 != 0 {
                let product = result.power.multiply_signed(&base);
                result.overflow |= product.overflow;
                result.power = product.value;
            }
            remaining >>= 1;
            if remaining == 0 {
                break;
            }
            let squared = base.multiply_signed(&base);
            result.overflow |= squared.overflow;
            base = squared.value;
        }
        result
    }

    pub fn compare_signed(&self, that: &IntValue) -> Ordering {
        self.raw.cmp(&that.raw).into()
    }

    pub fn iand(&self, that: &IntValue) -> IntValue {
        Self::new(self.kind, self.raw & that.raw)
    }

    pub fn ior(&self, that: &IntValue) -> IntValue {
        Self::new(self.kind, self.raw | that.raw)
    }

    pub fn ieor(&self, that: &IntValue) -> IntValue {
        Self::new(self.kind, self.raw ^ that.raw)
    }

    pub fn not(&self) -> IntValue {
        Self::new(self.kind, !self.raw)
    }

    pub fn ibset(&self, pos: i32) -> IntValue {
        if pos < 0 || pos as u32 >= self.bits() {
            return *self;
        }
        Self::new(self.kind, (self.unsigned_bits() | (1u128 << pos)) as i128)
    }

    pub fn ibclr(&self, pos: i32) -> IntValue {
        if pos < 0 || pos as u32 >= self.bits() {
            return *self;
        }
        Self::new(self.kind, (self.unsigned_bits() & !(1u128 << pos)) as i128)
    }

    /// ISHFT: logical shift, left for positive counts, right for
    /// negative; counts at or beyond the bit width yield zero.
    pub fn ishft(&self, count: i32) -> IntValue {
        if count >= 0 {
            self.shiftl(count)
        } else {
            self.shiftr(-count)
        }
    }

    /// ISHFTC with no SIZE=: circular shift of the whole kind width.
    pub fn ishftc(&self, count: i32) -> IntValue {
        let bits = self.bits();
        let count = count.rem_euclid(bits as i32) as u32;
        if count == 0 {
            return *self;
        }
        let word = self.unsigned_bits();
        let mask = width_mask(bits);
        let rotated = ((word << count) | (word >> (bits - count))) & mask;
        Self::new(self.kind, rotated as i128)
    }

    pub fn shiftl(&self, count: i32) -> IntValue {
        if count < 0 || count as u32 >= self.bits() {
            return Self::zero(self.kind);
        }
        Self::new(self.kind, (self.unsigned_bits() << count) as i128)
    }

    pub fn shiftr(&self, count: i32) -> IntValue {
        if count < 0 || count as u32 >= self.bits() {
            return Self::zero(self.kind);
        }
        Self::new(self.kind, (self.unsigned_bits() >> count) as i128)
    }

    /// Arithmetic right shift (sign extension).
    pub fn shifta(&self, count: i32) -> IntValue {
        if count < 0 {
            return Self::zero(self.kind);
        }
        let count = (count as u32).min(self.bits() - 1);
        Self::new(self.kind, self.raw >> count)
    }

    /// DSHIFTL(a, b, shift): the leftmost bits of a followed by the
    /// leftmost bits of b.
    pub fn dshiftl(&self, that: &IntValue, shift: i32) -> IntValue {
        let bits = self.bits() as i32;
        if shift <= 0 {
            return *self;
        }
        if shift >= bits {
            return *that;
        }
        let high = self.unsigned_bits() << shift;
        let low = that.unsigned_bits() >> (bits - shift);
        Self::new(self.kind, ((high | low) & width_mask(self.bits())) as i128)
    }

    /// DSHIFTR(a, b, shift): the rightmost bits of a followed by the
    /// rightmost bits of b.
    pub fn dshiftr(&self, that: &IntValue, shift: i32) -> IntValue {
        let bits = self.bits() as i32;
        if shift <= 0 {
            return *that;
        }
        if shift >= bits {
            return *self;
        }
        let high = self.unsigned_bits() << (bits - shift);
        let low = that.unsigned_bits() >> shift;
        Self::new(self.kind, ((high | low) & width_mask(self.bits())) as i128)
    }

    /// MASKL(places): the leftmost `places` bits set.
    pub fn maskl(kind: Kind, places: i32) -> IntValue {
        let bits = bits_of(kind);
        let places = places.clamp(0, bits as i32) as u32;
        let mask = width_mask(bits) & !(width_mask(bits) >> places);
        Self::new(kind, mask as i128)
    }

    /// MASKR(places): the rightmost `places` bits set.
    pub fn maskr(kind: Kind, places: i32) -> IntValue {
        let bits = bits_of(kind);
        let places = places.clamp(0, bits as i32) as u32;
        let mask = if places == 0 {
            0
        } else {
            width_mask(bits) >> (bits - places)
        };
        Self::new(kind, mask as i128)
    }

    /// MERGE_BITS(a, b, mask) = IOR(IAND(a, mask), IAND(b, NOT(mask))).
    pub fn merge_bits(&self, that: &IntValue, mask: &IntValue) -> IntValue {
        self.iand(mask).ior(&that.iand(&mask.not()))
    }

    pub fn pop_count(&self) -> i32 {
        self.unsigned_bits().count_ones() as i32
    }

    pub fn pop_parity(&self) -> bool {
        self.pop_count() & 1 != 0
    }

    pub fn leading_zeros(&self) -> i32 {
        let bits = self.bits();
        let word = self.unsigned_bits();
        if word == 0 {
            bits as i32
        } else {
            (word.leading_zeros() - (128 - bits)) as i32
        }
    }

    pub fn trailing_zeros(&self) -> i32 {
        let word = self.unsigned_bits();
        if word == 0 {
            self.bits() as i32
        } else {
            word.trailing_zeros() as i32
        }
    }

    /// Sign-preserving conversion to another kind; narrowing reports
    /// overflow when the value is outside the target's range.
    pub fn convert_signed(&self, to_kind: Kind) -> ValueWithOverflow<IntValue> {
        let wrapped = wrap(to_kind, self.raw);
        ValueWithOverflow {
            value: Self {
                kind: to_kind,
                raw: wrapped,
            },
            overflow: wrapped != self.raw,
        }
    }
}

fn bits_of(kind: Kind) -> u32 {
    kind as u32 * 8
}

fn width_mask(bits: u32) -> u128 {
    if bits == 128 {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// Sign-extends the low `8 * kind` bits of `value`.
fn wrap(kind: Kind, value: i128) -> i128 {
    let bits = bits_of(kind);
    if bits == 128 {
        value
    } else {
        (value << (128 - bits)) >> (128 - bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn addition_wraps_and_reports_overflow() {
        let max = IntValue::max_value(4);
        let one = IntValue::new(4, 1);
        let sum = max.add_signed(&one);
        assert!(sum.overflow);
        assert_eq!(sum.value, IntValue::min_value(4));

        let ok = IntValue::new(4, 2).add_signed(&IntValue::new(4, 3));
        assert!(!ok.overflow);
        assert_eq!(ok.value.value(), 5);
    }

    #[test]
    fn widest_kind_addition_overflows_via_i128() {
        let max = IntValue::max_value(16);
        let sum = max.add_signed(&IntValue::new(16, 1));
        assert!(sum.overflow);
        assert_eq!(sum.value, IntValue::min_value(16));
    }

    #[test]
    fn division_flags_zero_divisor_and_int_min_by_minus_one() {
        let q = IntValue::new(4, 7).divide_signed(&IntValue::zero(4));
        assert!(q.division_by_zero);

        let q = IntValue::min_value(4).divide_signed(&IntValue::new(4, -1));
        assert!(q.overflow);
        assert_eq!(q.quotient, IntValue::min_value(4));

        let q = IntValue::new(4, 7).divide_signed(&IntValue::new(4, 2));
        assert_eq!(q.quotient.value(), 3);
        assert_eq!(q.remainder.value(), 1);
    }

    #[test]
    fn power_identities_and_flags() {
        let zero = IntValue::zero(4);
        let p = zero.power(&zero);
        assert!(p.zero_to_zero);
        assert_eq!(p.power.value(), 1);

        let p = zero.power(&IntValue::new(4, -2));
        assert!(p.division_by_zero);

        let p = IntValue::new(4, -1).power(&IntValue::new(4, -3));
        assert_eq!(p.power.value(), -1);

        let p = IntValue::new(4, 3).power(&IntValue::new(4, 4));
        assert!(!p.overflow);
        assert_eq!(p.power.value(), 81);

        let p = IntValue::new(4, 2).power(&IntValue::new(4, 31));
        assert!(p.overflow);
    }

    #[test]
    fn shifts_masks_and_bit_counts_work_at_kind_width() {
        let x = IntValue::new(1, 0b0110_1001u8 as i128);
        assert_eq!(x.pop_count(), 4);
        assert!(!x.pop_parity());
        assert_eq!(x.leading_zeros(), 1);
        assert_eq!(x.trailing_zeros(), 0);

        assert_eq!(x.ishft(2).unsigned_bits(), 0b1010_0100);
        assert_eq!(x.ishft(-2).unsigned_bits(), 0b0001_1010);
        assert_eq!(x.ishft(9).unsigned_bits(), 0);
        assert_eq!(x.ishftc(4).unsigned_bits(), 0b1001_0110);

        let neg = IntValue::new(1, -16);
        assert_eq!(neg.shifta(2).value(), -4);
        assert_eq!(neg.shiftr(2).unsigned_bits(), 0b0011_1100);

        assert_eq!(IntValue::maskl(1, 3).unsigned_bits(), 0b1110_0000);
        assert_eq!(IntValue::maskr(1, 3).unsigned_bits(), 0b0000_0111);
        assert_eq!(IntValue::maskr(1, 0).unsigned_bits(), 0);
    }

    #[test]
    fn double_shifts_combine_both_words() {
        let a = IntValue::new(1, 0b1111_0000u8 as i128);
        let b = IntValue::new(1, 0b0000_1111u8 as i128);
        assert_eq!(a.dshiftl(&b, 4).unsigned_bits(), 0b0000_0000);
        assert_eq!(a.dshiftr(&b, 4).unsigned_bits(), 0b0000_0000);
        let a = IntValue::new(1, 0b1010_1010u8 as i128);
        let b = IntValue::new(1, 0b0101_0101u8 as i128);
        assert_eq!(a.dshiftl(&b, 4).unsigned_bits(), 0b1010_0101);
        assert_eq!(a.dshiftr(&b, 4).unsigned_bits(), 0b1010_0101);
    }

    #[test]
    fn merge_bits_selects_by_mask() {
        let a = IntValue::new(1, 0b1100_1100u8 as i128);
        let b = IntValue::new(1, 0b0011_0011u8 as i128);
        let mask = IntValue::new(1, 0b1111_0000u8 as i128);
        assert_eq!(a.merge_bits(&b, &mask).unsigned_bits(), 0b1100_0011);
    }

    #[test]
    fn narrowing_conversion_round_trips_when_in_range() {
        let v = IntValue::new(8, 1000);
        let narrowed = v.convert_signed(2);
        assert!(!narrowed.overflow);
        assert_eq!(narrowed.value.convert_signed(8).value, v);

        let wide = IntValue::new(8, 1 << 40);
        assert!(wide.convert_signed(4).overflow);

        let neg = IntValue::new(4, -1);
        let narrowed = neg.convert_signed(1);
        assert!(!narrowed.overflow);
        assert_eq!(narrowed.value.value(), -1);
    }
}
