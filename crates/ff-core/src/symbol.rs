//! Read-only view of the symbol table and derived-type specifications
//! consumed by the folder. The semantic analyzer owns the real store;
//! expressions hold shared references into it and never mutate it.

use crate::expr::Expr;
use crate::types::DynamicType;
use std::sync::Arc;

common_enum! {
    pub enum TypeParamAttr {
        Kind,
        Len,
    }
}

common_enum! {
    pub enum SymbolKind {
        /// A named constant; `value` is its initialization expression.
        Parameter { value: Option<Box<Expr>> },
        Variable,
        /// A kind or length type parameter of a derived type.
        TypeParam {
            attr: TypeParamAttr,
            init: Option<Box<Expr>>,
        },
        /// A derived-type component.
        Component,
        Procedure,
    }
}

common_struct! {
    pub struct Symbol {
        pub name: String,
        pub ty: Option<DynamicType>,
        /// Declared array dimensions; empty for scalars.
        pub dims: Vec<ShapeSpec>,
        pub kind: SymbolKind,
    }
}

common_struct! {
    /// One declared dimension. `None` bounds are deferred or assumed.
    pub struct ShapeSpec {
        pub lower: Option<Box<Expr>>,
        pub upper: Option<Box<Expr>>,
    }
}

impl Symbol {
    pub fn parameter(name: impl Into<String>, ty: DynamicType, value: Expr) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            dims: Vec::new(),
            kind: SymbolKind::Parameter {
                value: Some(Box::new(value)),
            },
        }
    }

    pub fn variable(name: impl Into<String>, ty: DynamicType, dims: Vec<ShapeSpec>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            dims,
            kind: SymbolKind::Variable,
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind, SymbolKind::Parameter { .. })
    }

    pub fn parameter_value(&self) -> Option<&Expr> {
        match &self.kind {
            SymbolKind::Parameter { value } => value.as_deref(),
            _ => None,
        }
    }
}

common_struct! {
    /// A parameterized-derived-type instance: the type's components in
    /// declaration order plus any explicit type parameter values
    /// recorded on the specification (including those of parent types).
    pub struct DerivedTypeSpec {
        pub name: String,
        pub components: Vec<Arc<Symbol>>,
        pub param_symbols: Vec<Arc<Symbol>>,
        pub param_values: Vec<(String, Expr)>,
    }
}

impl DerivedTypeSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
            param_symbols: Vec::new(),
            param_values: Vec::new(),
        }
    }

    /// An explicit value for `name` recorded on this instance.
    pub fn explicit_param(&self, name: &str) -> Option<&Expr> {
        self.param_values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// The type-parameter symbol declared under `name`.
    pub fn param_symbol(&self, name: &str) -> Option<&Arc<Symbol>> {
        self.param_symbols.iter().find(|sym| sym.name == name)
    }
}
