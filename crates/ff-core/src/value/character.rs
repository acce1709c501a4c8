//! CHARACTER values: a sequence of code units at kind 1, 2, or 4.
//! Comparison follows Fortran semantics (the shorter operand is blank
//! padded); conversion between kinds is defined only for 7-bit ASCII.

use super::Ordering;
use crate::types::Kind;

const BLANK: u32 = b' ' as u32;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CharValue {
    kind: Kind,
    units: Vec<u32>,
}

impl CharValue {
    pub fn new(kind: Kind, units: Vec<u32>) -> Self {
        Self { kind, units }
    }

    pub fn empty(kind: Kind) -> Self {
        Self {
            kind,
            units: Vec::new(),
        }
    }

    pub fn from_str(kind: Kind, s: &str) -> Self {
        Self {
            kind,
            units: s.chars().map(|c| c as u32).collect(),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn units(&self) -> &[u32] {
        &self.units
    }

    pub fn len(&self) -> i64 {
        self.units.len() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn concat(&self, that: &CharValue) -> CharValue {
        debug_assert_eq!(self.kind, that.kind);
        let mut units = self.units.clone();
        units.extend_from_slice(&that.units);
        Self {
            kind: self.kind,
            units,
        }
    }

    /// Truncates or blank-pads to exactly `new_len` code units.
    pub fn set_length(&self, new_len: i64) -> CharValue {
        let new_len = new_len.max(0) as usize;
        let mut units = self.units.clone();
        units.resize(new_len, BLANK);
        Self {
            kind: self.kind,
            units,
        }
    }

    /// Code-point comparison with blank padding of the shorter operand.
    pub fn compare(&self, that: &CharValue) -> Ordering {
        let n = self.units.len().max(that.units.len());
        for i in 0..n {
            let a = self.units.get(i).copied().unwrap_or(BLANK);
            let b = that.units.get(i).copied().unwrap_or(BLANK);
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => continue,
                other => return other.into(),
            }
        }
        Ordering::Equal
    }

    /// Conversion between CHARACTER kinds is well defined only when the
    /// data are 7-bit ASCII.
    pub fn convert_kind(&self, to_kind: Kind) -> Option<CharValue> {
        if to_kind == self.kind {
            return Some(self.clone());
        }
        if self.units.iter().any(|&u| u > 127) {
            return None;
        }
        Some(Self {
            kind: to_kind,
            units: self.units.clone(),
        })
    }

    /// SUBSTRING with 1-based inclusive bounds; an empty range yields
    /// the empty value.
    pub fn substring(&self, lower: i64, upper: i64) -> Option<CharValue> {
        if lower > upper {
            return Some(Self::empty(self.kind));
        }
        if lower < 1 || upper > self.len() {
            return None;
        }
        Some(Self {
            kind: self.kind,
            units: self.units[lower as usize - 1..upper as usize].to_vec(),
        })
    }
}

impl std::fmt::Display for CharValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &u in &self.units {
            match char::from_u32(u) {
                Some(c) => write!(f, "{}", c)?,
                None => write!(f, "\\u{{{:x}}}", u)?,
            }
        }
        Ok(())
    }
}
