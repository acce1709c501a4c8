//! The type algebra of Fortran's intrinsic types: a category, a kind
//! within the category, and (for CHARACTER) a length. Operations carry
//! their result type on the expression node; conversions are explicit
//! nodes, never implicit coercions.

use crate::symbol::DerivedTypeSpec;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum TypeCategory {
    Integer,
    Real,
    Complex,
    Character,
    Logical,
    Derived,
}

impl Display for TypeCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeCategory::Integer => "INTEGER",
            TypeCategory::Real => "REAL",
            TypeCategory::Complex => "COMPLEX",
            TypeCategory::Character => "CHARACTER",
            TypeCategory::Logical => "LOGICAL",
            TypeCategory::Derived => "TYPE",
        };
        write!(f, "{}", name)
    }
}

/// Kind type parameter value. For INTEGER and LOGICAL this is the width
/// in bytes; for REAL/COMPLEX it selects the IEEE format; for CHARACTER
/// the code-unit width.
pub type Kind = u8;

/// Kind of the integer type used for subscripts, extents, and lengths.
pub const SUBSCRIPT_INTEGER_KIND: Kind = 8;
/// Kind of the LOGICAL type produced by relational operations.
pub const LOGICAL_RESULT_KIND: Kind = 1;
/// The widest supported INTEGER kind (128 bits); BOZ literals and the
/// bitwise comparison intrinsics work at this width.
pub const LARGEST_INTEGER_KIND: Kind = 16;

pub const INTEGER_KINDS: &[Kind] = &[1, 2, 4, 8, 16];
pub const REAL_KINDS: &[Kind] = &[2, 3, 4, 8, 10, 16];
pub const CHARACTER_KINDS: &[Kind] = &[1, 2, 4];
pub const LOGICAL_KINDS: &[Kind] = &[1, 2, 4, 8];

/// A specific Fortran type: category, kind, and for CHARACTER an
/// optional constant length. Derived types carry their specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicType {
    pub category: TypeCategory,
    pub kind: Kind,
    pub char_len: Option<i64>,
    pub derived: Option<Arc<DerivedTypeSpec>>,
}

impl DynamicType {
    pub fn new(category: TypeCategory, kind: Kind) -> Self {
        Self {
            category,
            kind,
            char_len: None,
            derived: None,
        }
    }

    pub fn integer(kind: Kind) -> Self {
        Self::new(TypeCategory::Integer, kind)
    }

    pub fn real(kind: Kind) -> Self {
        Self::new(TypeCategory::Real, kind)
    }

    pub fn complex(kind: Kind) -> Self {
        Self::new(TypeCategory::Complex, kind)
    }

    pub fn character(kind: Kind) -> Self {
        Self::new(TypeCategory::Character, kind)
    }

    pub fn character_with_len(kind: Kind, len: i64) -> Self {
        Self {
            char_len: Some(len),
            ..Self::character(kind)
        }
    }

    pub fn logical(kind: Kind) -> Self {
        Self::new(TypeCategory::Logical, kind)
    }

    pub fn derived(spec: Arc<DerivedTypeSpec>) -> Self {
        Self {
            category: TypeCategory::Derived,
            kind: 0,
            char_len: None,
            derived: Some(spec),
        }
    }

    pub fn subscript_integer() -> Self {
        Self::integer(SUBSCRIPT_INTEGER_KIND)
    }

    pub fn logical_result() -> Self {
        Self::logical(LOGICAL_RESULT_KIND)
    }

    pub fn largest_integer() -> Self {
        Self::integer(LARGEST_INTEGER_KIND)
    }

    pub fn is_integer(&self) -> bool {
        self.category == TypeCategory::Integer
    }

    pub fn is_real(&self) -> bool {
        self.category == TypeCategory::Real
    }

    pub fn is_complex(&self) -> bool {
        self.category == TypeCategory::Complex
    }

    pub fn is_character(&self) -> bool {
        self.category == TypeCategory::Character
    }

    pub fn is_logical(&self) -> bool {
        self.category == TypeCategory::Logical
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.category,
            TypeCategory::Integer | TypeCategory::Real | TypeCategory::Complex
        )
    }

    pub fn with_char_len(mut self, len: i64) -> Self {
        self.char_len = Some(len);
        self
    }
}

impl Display for DynamicType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.category {
            TypeCategory::Derived => match &self.derived {
                Some(spec) => write!(f, "TYPE({})", spec.name),
                None => write!(f, "TYPE(*)"),
            },
            TypeCategory::Character => match self.char_len {
                Some(len) => write!(f, "CHARACTER(KIND={},LEN={})", self.kind, len),
                None => write!(f, "CHARACTER({})", self.kind),
            },
            _ => write!(f, "{}({})", self.category, self.kind),
        }
    }
}

fn numeric_rank(category: TypeCategory) -> Option<u8> {
    match category {
        TypeCategory::Integer => Some(0),
        TypeCategory::Real => Some(1),
        TypeCategory::Complex => Some(2),
        _ => None,
    }
}

/// The result type of a mixed-mode numeric operation per Fortran's
/// conversion rules: COMPLEX dominates REAL dominates INTEGER, and the
/// kind of the dominant operand wins (max kind when categories agree).
pub fn promoted(a: &DynamicType, b: &DynamicType) -> Option<DynamicType> {
    let ra = numeric_rank(a.category)?;
    let rb = numeric_rank(b.category)?;
    let ty = if ra > rb {
        a.clone()
    } else if rb > ra {
        b.clone()
    } else {
        DynamicType::new(a.category, a.kind.max(b.kind))
    };
    Some(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_mode_promotion_follows_category_then_kind() {
        let i4 = DynamicType::integer(4);
        let i8 = DynamicType::integer(8);
        let r4 = DynamicType::real(4);
        let r8 = DynamicType::real(8);
        let z4 = DynamicType::complex(4);

        assert_eq!(promoted(&i4, &i8), Some(DynamicType::integer(8)));
        assert_eq!(promoted(&i8, &r4), Some(r4.clone()));
        assert_eq!(promoted(&r4, &r8), Some(DynamicType::real(8)));
        assert_eq!(promoted(&r8, &z4), Some(z4));
        assert_eq!(promoted(&i4, &DynamicType::logical(4)), None);
    }
}
