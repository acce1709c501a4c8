//! Typed Fortran expression trees. Every node carries its result type
//! (`None` for the typeless BOZ literal and null pointer cases); every
//! child is exclusively owned by its parent, so the tree supports deep
//! copy and move but no sharing. Equality is structural: `(x)` and `x`
//! are different expressions.

mod tools;

pub use tools::*;

use crate::symbol::{DerivedTypeSpec, Symbol};
use crate::types::DynamicType;
use crate::value::{BozValue, Relation, Scalar};
use std::sync::Arc;

pub use crate::value::Ordering;

common_enum! {
    pub enum UnaryOp {
        Negate,
        /// Parentheses are semantically significant in Fortran (they pin
        /// IEEE evaluation order) and are preserved even around constants.
        Parentheses,
        Not,
        /// %RE / %IM access on a complex operand.
        ComplexComponent { imaginary: bool },
        /// Conversion to the node's result type; the only implicit-free
        /// way a kind or category change appears in a tree.
        Convert,
    }
}

common_enum! {
    pub enum LogicalOperator {
        And,
        Or,
        Eqv,
        Neqv,
    }
}

common_enum! {
    pub enum BinaryOp {
        Add,
        Subtract,
        Multiply,
        Divide,
        Power,
        /// REAL or COMPLEX base with an INTEGER exponent of any kind.
        RealToIntPower,
        /// MAX when ordering is Greater, MIN when Less.
        Extremum { ordering: Ordering },
        Concat,
        /// Builds a COMPLEX from two REAL operands of the same kind.
        ComplexConstructor,
        Logical { op: LogicalOperator },
        /// Adjusts a CHARACTER value to a context-imposed length.
        SetLength,
    }
}

common_enum! {
    pub enum RelationalOperator {
        Lt,
        Le,
        Eq,
        Ne,
        Ge,
        Gt,
    }
}

impl RelationalOperator {
    pub fn satisfies(&self, ordering: Ordering) -> bool {
        match ordering {
            Ordering::Less => matches!(self, Self::Lt | Self::Le | Self::Ne),
            Ordering::Equal => matches!(self, Self::Le | Self::Eq | Self::Ge),
            Ordering::Greater => matches!(self, Self::Ne | Self::Ge | Self::Gt),
        }
    }

    /// IEEE semantics: an Unordered comparison satisfies only .NE..
    pub fn satisfies_relation(&self, relation: Relation) -> bool {
        match relation {
            Relation::Less => self.satisfies(Ordering::Less),
            Relation::Equal => self.satisfies(Ordering::Equal),
            Relation::Greater => self.satisfies(Ordering::Greater),
            Relation::Unordered => matches!(self, Self::Ne),
        }
    }
}

common_struct! {
    /// Homogeneous constant: a scalar, or an array in column-major
    /// element order with `values.len() == product(shape)`. CHARACTER
    /// constants record their common length on the type.
    pub struct Constant {
        pub ty: DynamicType,
        pub shape: Vec<i64>,
        pub values: Vec<Scalar>,
    }
}

impl Constant {
    pub fn scalar(value: Scalar) -> Self {
        Self {
            ty: value.get_type(),
            shape: Vec::new(),
            values: vec![value],
        }
    }

    pub fn array(ty: DynamicType, shape: Vec<i64>, values: Vec<Scalar>) -> Self {
        debug_assert_eq!(total_element_count(&shape), values.len() as i64);
        Self { ty, shape, values }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    pub fn scalar_value(&self) -> Option<&Scalar> {
        if self.is_scalar() {
            self.values.first()
        } else {
            None
        }
    }

    /// Element at 1-based subscripts, column-major.
    pub fn at(&self, index: &[i64]) -> &Scalar {
        debug_assert_eq!(index.len(), self.shape.len());
        let mut linear = 0i64;
        let mut stride = 1i64;
        for (i, extent) in index.iter().zip(&self.shape) {
            linear += (i - 1) * stride;
            stride *= extent;
        }
        &self.values[linear as usize]
    }
}

pub fn total_element_count(shape: &[i64]) -> i64 {
    shape.iter().product()
}

pub fn initial_subscripts(rank: usize) -> Vec<i64> {
    vec![1; rank]
}

/// Advances 1-based column-major subscripts; false on wraparound.
pub fn increment_subscripts(index: &mut [i64], shape: &[i64]) -> bool {
    for (i, extent) in index.iter_mut().zip(shape) {
        *i += 1;
        if *i <= *extent {
            return true;
        }
        *i = 1;
    }
    false
}

common_struct! {
    pub struct Triplet {
        pub lower: Option<Box<Expr>>,
        pub upper: Option<Box<Expr>>,
        pub stride: Option<Box<Expr>>,
    }
}

common_enum! {
    pub enum Subscript {
        /// A scalar element subscript, or a rank-1 vector subscript.
        Index(Expr),
        Triplet(Triplet),
    }
}

common_enum! {
    pub enum Selector {
        Component(Arc<Symbol>),
        ArrayElement(Vec<Subscript>),
        CoarrayImage(Vec<Expr>),
        Substring {
            lower: Option<Box<Expr>>,
            upper: Option<Box<Expr>>,
        },
    }
}

common_struct! {
    /// A reference to a named object with an optional
    /// component/array/coarray/substring path.
    pub struct Designator {
        pub base: Arc<Symbol>,
        pub selectors: Vec<Selector>,
    }
}

impl Designator {
    pub fn bare(base: Arc<Symbol>) -> Self {
        Self {
            base,
            selectors: Vec::new(),
        }
    }

    pub fn rank(&self) -> usize {
        for selector in self.selectors.iter().rev() {
            if let Selector::ArrayElement(subscripts) = selector {
                return subscripts
                    .iter()
                    .filter(|s| match s {
                        Subscript::Triplet(_) => true,
                        Subscript::Index(expr) => expr.rank() > 0,
                    })
                    .count();
            }
        }
        self.base.rank()
    }
}

common_enum! {
    pub enum ProcedureDesignator {
        /// A specific intrinsic, dispatched by name during folding.
        Intrinsic(String),
        Symbol(Arc<Symbol>),
    }
}

common_struct! {
    pub struct FunctionRef {
        pub proc: ProcedureDesignator,
        /// Actual arguments in dummy order; absent optionals are None.
        pub args: Vec<Option<Expr>>,
    }
}

impl FunctionRef {
    pub fn intrinsic(name: impl Into<String>, args: Vec<Option<Expr>>) -> Self {
        Self {
            proc: ProcedureDesignator::Intrinsic(name.into()),
            args,
        }
    }

    pub fn intrinsic_name(&self) -> Option<&str> {
        match &self.proc {
            ProcedureDesignator::Intrinsic(name) => Some(name),
            ProcedureDesignator::Symbol(_) => None,
        }
    }
}

common_struct! {
    /// An inquiry such as `t%kind_param`; with no base it refers to a
    /// parameter of the derived type instance being analyzed.
    pub struct TypeParamInquiry {
        pub base: Option<Designator>,
        pub parameter: Arc<Symbol>,
    }
}

common_struct! {
    pub struct ImpliedDoIndex {
        pub name: String,
    }
}

common_enum! {
    pub enum DescriptorField {
        LowerBound,
        Extent,
        Len,
    }
}

common_struct! {
    /// A runtime descriptor inquiry; always scalar, never folded here.
    pub struct DescriptorInquiry {
        pub base: Designator,
        pub field: DescriptorField,
        pub dimension: usize,
    }
}

common_enum! {
    pub enum ArrayItem {
        Expr(Expr),
        ImpliedDo(ImpliedDo),
    }
}

common_struct! {
    /// `(values, name = lower, upper [, stride])`. Nested implied DOs
    /// must use distinct index names.
    pub struct ImpliedDo {
        pub name: String,
        pub lower: Box<Expr>,
        pub upper: Box<Expr>,
        pub stride: Box<Expr>,
        pub values: Vec<ArrayItem>,
    }
}

common_struct! {
    /// Rank-1 array builder. CHARACTER constructors carry the common
    /// length expression their elements are adjusted to.
    pub struct ArrayConstructor {
        pub ty: DynamicType,
        pub len: Option<Box<Expr>>,
        pub values: Vec<ArrayItem>,
    }
}

impl ArrayConstructor {
    /// True when every item is a scalar expression (no implied DOs).
    pub fn is_flat(&self) -> bool {
        self.values.iter().all(|item| match item {
            ArrayItem::Expr(expr) => expr.rank() == 0,
            ArrayItem::ImpliedDo(_) => false,
        })
    }
}

common_struct! {
    /// A derived-type value; the component map preserves insertion
    /// order. Never collapsed to a constant by the folder.
    pub struct StructureConstructor {
        pub spec: Arc<DerivedTypeSpec>,
        pub values: Vec<(Arc<Symbol>, Expr)>,
    }
}

common_enum! {
    pub enum ExprKind {
        Constant(Constant),
        BozLiteral(BozValue),
        NullPointer,
        Designator(Designator),
        TypeParamInquiry(TypeParamInquiry),
        ImpliedDoIndex(ImpliedDoIndex),
        DescriptorInquiry(DescriptorInquiry),
        FunctionRef(FunctionRef),
        Unary(UnaryExpr),
        Binary(BinaryExpr),
        Relational(RelationalExpr),
        ArrayConstructor(ArrayConstructor),
        StructureConstructor(StructureConstructor),
    }
}

common_struct! {
    pub struct UnaryExpr {
        pub op: UnaryOp,
        pub operand: Box<Expr>,
    }
}

common_struct! {
    pub struct BinaryExpr {
        pub op: BinaryOp,
        pub left: Box<Expr>,
        pub right: Box<Expr>,
    }
}

common_struct! {
    /// Comparison of two operands of one type; the result is always
    /// LOGICAL of the fixed relational-result kind.
    pub struct RelationalExpr {
        pub op: RelationalOperator,
        pub left: Box<Expr>,
        pub right: Box<Expr>,
    }
}

common_struct! {
    pub struct Expr {
        /// Result type; None for typeless nodes (BOZ, null pointer).
        pub ty: Option<DynamicType>,
        pub kind: ExprKind,
    }
}

impl Expr {
    pub fn new(ty: DynamicType, kind: ExprKind) -> Self {
        Self { ty: Some(ty), kind }
    }

    pub fn constant(constant: Constant) -> Self {
        Self {
            ty: Some(constant.ty.clone()),
            kind: ExprKind::Constant(constant),
        }
    }

    pub fn scalar(value: Scalar) -> Self {
        Self::constant(Constant::scalar(value))
    }

    pub fn integer(kind: crate::types::Kind, value: i128) -> Self {
        Self::scalar(Scalar::Int(crate::value::IntValue::new(kind, value)))
    }

    pub fn subscript_integer(value: i64) -> Self {
        Self::integer(crate::types::SUBSCRIPT_INTEGER_KIND, value as i128)
    }

    pub fn logical(kind: crate::types::Kind, value: bool) -> Self {
        Self::scalar(Scalar::Logical(crate::value::LogicalValue::new(kind, value)))
    }

    pub fn boz(value: BozValue) -> Self {
        Self {
            ty: None,
            kind: ExprKind::BozLiteral(value),
        }
    }

    pub fn null_pointer() -> Self {
        Self {
            ty: None,
            kind: ExprKind::NullPointer,
        }
    }

    pub fn unary(ty: DynamicType, op: UnaryOp, operand: Expr) -> Self {
        Self::new(
            ty,
            ExprKind::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
            }),
        )
    }

    pub fn binary(ty: DynamicType, op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(
            ty,
            ExprKind::Binary(BinaryExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
        )
    }

    pub fn relational(op: RelationalOperator, left: Expr, right: Expr) -> Self {
        Self::new(
            DynamicType::logical_result(),
            ExprKind::Relational(RelationalExpr {
                op,
                left: Box::new(left),
                right: Box::new(right),
            }),
        )
    }

    pub fn parenthesized(operand: Expr) -> Self {
        let ty = operand
            .ty
            .clone()
            .expect("parentheses require a typed operand");
        Self::unary(ty, UnaryOp::Parentheses, operand)
    }

    /// An explicit conversion of `operand` to `ty`.
    pub fn convert(ty: DynamicType, operand: Expr) -> Self {
        Self::unary(ty, UnaryOp::Convert, operand)
    }

    pub fn designator(ty: DynamicType, designator: Designator) -> Self {
        Self::new(ty, ExprKind::Designator(designator))
    }

    pub fn get_type(&self) -> Option<&DynamicType> {
        self.ty.as_ref()
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExprKind::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.kind, ExprKind::Constant(_))
    }

    /// Rank computed from the tree alone (declared shapes for
    /// designators, stored shapes for constants). Function results are
    /// treated as scalar, which is what the folder produces for the
    /// elemental intrinsics it reduces.
    pub fn rank(&self) -> usize {
        match &self.kind {
            ExprKind::Constant(c) => c.rank(),
            ExprKind::BozLiteral(_)
            | ExprKind::NullPointer
            | ExprKind::TypeParamInquiry(_)
            | ExprKind::ImpliedDoIndex(_)
            | ExprKind::DescriptorInquiry(_)
            | ExprKind::StructureConstructor(_)
            | ExprKind::FunctionRef(_) => 0,
            ExprKind::Designator(d) => d.rank(),
            ExprKind::Unary(u) => u.operand.rank(),
            ExprKind::Binary(b) => b.left.rank().max(b.right.rank()),
            ExprKind::Relational(r) => r.left.rank().max(r.right.rank()),
            ExprKind::ArrayConstructor(_) => 1,
        }
    }
}
