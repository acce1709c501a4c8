//! COMPLEX values: two reals of one kind. Addition, subtraction, and
//! negation fold piecewise through the real kernel; multiplication,
//! division, and integer powers are atomic operations here.

use super::{RealFlags, RealValue, Rounding, ValueWithRealFlags};
use crate::types::Kind;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ComplexValue {
    re: RealValue,
    im: RealValue,
}

impl ComplexValue {
    pub fn new(re: RealValue, im: RealValue) -> Self {
        debug_assert_eq!(re.kind(), im.kind());
        Self { re, im }
    }

    pub fn kind(&self) -> Kind {
        self.re.kind()
    }

    pub fn re(&self) -> &RealValue {
        &self.re
    }

    pub fn im(&self) -> &RealValue {
        &self.im
    }

    pub fn negate(&self) -> ComplexValue {
        Self {
            re: self.re.negate(),
            im: self.im.negate(),
        }
    }

    pub fn conjugate(&self) -> ComplexValue {
        Self {
            re: self.re,
            im: self.im.negate(),
        }
    }

    pub fn add(&self, that: &ComplexValue, rounding: Rounding) -> ValueWithRealFlags<ComplexValue> {
        let re = self.re.add(&that.re, rounding);
        let im = self.im.add(&that.im, rounding);
        combine(re, im)
    }

    pub fn subtract(
        &self,
        that: &ComplexValue,
        rounding: Rounding,
    ) -> ValueWithRealFlags<ComplexValue> {
        let re = self.re.subtract(&that.re, rounding);
        let im = self.im.subtract(&that.im, rounding);
        combine(re, im)
    }

    pub fn multiply(
        &self,
        that: &ComplexValue,
        rounding: Rounding,
    ) -> ValueWithRealFlags<ComplexValue> {
        // (a+bi)(c+di) = (ac - bd) + (ad + bc)i
        let ac = self.re.multiply(&that.re, rounding);
        let bd = self.im.multiply(&that.im, rounding);
        let ad = self.re.multiply(&that.im, rounding);
        let bc = self.im.multiply(&that.re, rounding);
        let mut flags = ac.flags;
        flags.merge(bd.flags);
        flags.merge(ad.flags);
        flags.merge(bc.flags);
        let re = ac.value.subtract(&bd.value, rounding);
        let im = ad.value.add(&bc.value, rounding);
        flags.merge(re.flags);
        flags.merge(im.flags);
        ValueWithRealFlags {
            value: Self {
                re: re.value,
                im: im.value,
            },
            flags,
        }
    }

    pub fn divide(
        &self,
        that: &ComplexValue,
        rounding: Rounding,
    ) -> ValueWithRealFlags<ComplexValue> {
        // (a+bi)/(c+di) = ((ac+bd) + (bc-ad)i) / (cc+dd)
        let cc = that.re.multiply(&that.re, rounding);
        let dd = that.im.multiply(&that.im, rounding);
        let denom = cc.value.add(&dd.value, rounding);
        let ac = self.re.multiply(&that.re, rounding);
        let bd = self.im.multiply(&that.im, rounding);
        let bc = self.im.multiply(&that.re, rounding);
        let ad = self.re.multiply(&that.im, rounding);
        let re_num = ac.value.add(&bd.value, rounding);
        let im_num = bc.value.subtract(&ad.value, rounding);
        let re = re_num.value.divide(&denom.value, rounding);
        let im = im_num.value.divide(&denom.value, rounding);
        let mut flags = re.flags;
        flags.merge(im.flags);
        ValueWithRealFlags {
            value: Self {
                re: re.value,
                im: im.value,
            },
            flags,
        }
    }

    /// Exponentiation by squaring for an integer exponent.
    pub fn pow_int(&self, exponent: i64, rounding: Rounding) -> ValueWithRealFlags<ComplexValue> {
        let kind = self.kind();
        let one = Self::new(RealValue::new(kind, 1.0), RealValue::zero(kind));
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

    pub fn flush_subnormal_to_zero(&self) -> ComplexValue {
        Self {
            re: self.re.flush_subnormal_to_zero(),
            im: self.im.flush_subnormal_to_zero(),
        }
    }
}

fn combine(
    re: ValueWithRealFlags<RealValue>,
    im: ValueWithRealFlags<RealValue>,
) -> ValueWithRealFlags<ComplexValue> {
    let mut flags = re.flags;
    flags.merge(im.flags);
    ValueWithRealFlags {
        value: ComplexValue {
            re: re.value,
            im: im.value,
        },
        flags,
    }
}
