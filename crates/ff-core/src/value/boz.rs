//! BOZ literal constants: typeless bit strings wide enough for any
//! supported INTEGER or REAL kind (128 bits). A BOZ value acquires a
//! type only when consumed; numeric contexts convert it to the
//! surrounding integer type, REAL() reinterprets its bit pattern.

use super::{IntValue, RealValue, ValueWithOverflow};
use crate::types::Kind;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct BozValue {
    bits: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReinterpretedReal {
    pub value: RealValue,
    /// Nonzero bits above the target format's width were dropped (C1601).
    pub truncated: bool,
}

impl BozValue {
    pub fn new(bits: u128) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn is_zero(&self) -> bool {
        self.bits == 0
    }

    /// Truncation or zero extension to an integer of `kind`; overflow
    /// reports dropped nonzero bits.
    pub fn to_integer(&self, kind: Kind) -> ValueWithOverflow<IntValue> {
        let width = kind as u32 * 8;
        let dropped = if width == 128 {
            0
        } else {
            self.bits >> width
        };
        ValueWithOverflow {
            value: IntValue::new(kind, self.bits as i128),
            overflow: dropped != 0,
        }
    }

    /// Captures an integer's bit pattern back into a typeless word.
    pub fn from_integer(n: &IntValue) -> Self {
        Self {
            bits: n.unsigned_bits(),
        }
    }

    /// Bit-pattern reinterpretation as a REAL of `kind` (no value
    /// conversion). Returns None for real kinds with no host format.
    pub fn to_real(&self, kind: Kind) -> Option<ReinterpretedReal> {
        let width = RealValue::format_width(kind)?;
        let dropped = if width == 128 { 0 } else { self.bits >> width };
        let value = RealValue::from_ieee_bits(kind, self.bits)?;
        Some(ReinterpretedReal {
            value,
            truncated: dropped != 0,
        })
    }
}

impl std::fmt::Display for BozValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z\"{:X}\"", self.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversion_zero_extends_and_flags_truncation() {
        let boz = BozValue::new(0xFF);
        let n = boz.to_integer(4);
        assert!(!n.overflow);
        assert_eq!(n.value.value(), 255);

        // The same bits land as -1 in a one-byte integer; no bits dropped.
        let narrow = boz.to_integer(1);
        assert!(!narrow.overflow);
        assert_eq!(narrow.value.value(), -1);

        let wide = BozValue::new(0x1_0000_0000);
        assert!(wide.to_integer(4).overflow);
    }

    #[test]
    fn real_reinterpretation_checks_dropped_bits() {
        let one_bits = BozValue::new(0x3f80_0000);
        let r = one_bits.to_real(4).unwrap();
        assert!(!r.truncated);
        assert_eq!(r.value.value(), 1.0);

        let too_wide = BozValue::new(0x1_3f80_0000);
        assert!(too_wide.to_real(4).unwrap().truncated);
        assert_eq!(too_wide.to_real(4).unwrap().value.value(), 1.0);

        assert!(one_bits.to_real(10).is_none());
    }

    #[test]
    fn round_trip_through_integer_preserves_bits() {
        let n = IntValue::new(2, -2);
        let boz = BozValue::from_integer(&n);
        assert_eq!(boz.bits(), 0xFFFE);
        assert_eq!(boz.to_integer(2).value, n);
    }
}
