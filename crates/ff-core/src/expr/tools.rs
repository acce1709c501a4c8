//! Small queries over expression trees used throughout the folder.

use super::{
    ArrayItem, Designator, Expr, ExprKind, RelationalOperator, Selector, Subscript,
};
use crate::symbol::{SymbolKind, TypeParamAttr};
use crate::types::{promoted, DynamicType, TypeCategory};
use crate::value::Scalar;

/// The scalar value of a rank-0 constant expression.
pub fn scalar_constant_value(expr: &Expr) -> Option<&Scalar> {
    expr.as_constant().and_then(|c| c.scalar_value())
}

pub fn to_int64(expr: &Expr) -> Option<i64> {
    scalar_constant_value(expr)?.to_int64()
}

/// Applies `pred` to `expr` and every nested subexpression, returning
/// true as soon as any node satisfies it.
pub fn any_subexpression(expr: &Expr, pred: &mut impl FnMut(&Expr) -> bool) -> bool {
    if pred(expr) {
        return true;
    }
    match &expr.kind {
        ExprKind::Constant(_)
        | ExprKind::BozLiteral(_)
        | ExprKind::NullPointer
        | ExprKind::ImpliedDoIndex(_) => false,
        ExprKind::Designator(designator) => any_in_designator(designator, pred),
        ExprKind::TypeParamInquiry(inquiry) => inquiry
            .base
            .as_ref()
            .is_some_and(|base| any_in_designator(base, pred)),
        ExprKind::DescriptorInquiry(inquiry) => any_in_designator(&inquiry.base, pred),
        ExprKind::FunctionRef(call) => call
            .args
            .iter()
            .flatten()
            .any(|arg| any_subexpression(arg, pred)),
        ExprKind::Unary(unary) => any_subexpression(&unary.operand, pred),
        ExprKind::Binary(binary) => {
            any_subexpression(&binary.left, pred) || any_subexpression(&binary.right, pred)
        }
        ExprKind::Relational(relation) => {
            any_subexpression(&relation.left, pred) || any_subexpression(&relation.right, pred)
        }
        ExprKind::ArrayConstructor(array) => {
            array
                .len
                .as_deref()
                .is_some_and(|len| any_subexpression(len, pred))
                || array.values.iter().any(|item| any_in_item(item, pred))
        }
        ExprKind::StructureConstructor(structure) => structure
            .values
            .iter()
            .any(|(_, value)| any_subexpression(value, pred)),
    }
}

fn any_in_item(item: &ArrayItem, pred: &mut impl FnMut(&Expr) -> bool) -> bool {
    match item {
        ArrayItem::Expr(expr) => any_subexpression(expr, pred),
        ArrayItem::ImpliedDo(ido) => {
            any_subexpression(&ido.lower, pred)
                || any_subexpression(&ido.upper, pred)
                || any_subexpression(&ido.stride, pred)
                || ido.values.iter().any(|item| any_in_item(item, pred))
        }
    }
}

fn any_in_designator(designator: &Designator, pred: &mut impl FnMut(&Expr) -> bool) -> bool {
    designator.selectors.iter().any(|selector| match selector {
        Selector::Component(_) => false,
        Selector::ArrayElement(subscripts) => subscripts.iter().any(|s| match s {
            Subscript::Index(expr) => any_subexpression(expr, pred),
            Subscript::Triplet(triplet) => [&triplet.lower, &triplet.upper, &triplet.stride]
                .into_iter()
                .flatten()
                .any(|bound| any_subexpression(bound, pred)),
        }),
        Selector::CoarrayImage(images) => {
            images.iter().any(|image| any_subexpression(image, pred))
        }
        Selector::Substring { lower, upper } => [lower, upper]
            .into_iter()
            .flatten()
            .any(|bound| any_subexpression(bound, pred)),
    })
}

/// Does the expression reference any implied-DO index variable?
pub fn contains_any_implied_do_index(expr: &Expr) -> bool {
    any_subexpression(expr, &mut |e| {
        matches!(e.kind, ExprKind::ImpliedDoIndex(_))
    })
}

/// Is the expression a "constant expression" in the sense of Fortran
/// 10.1.12? This is weaker than being foldable: it may reference kind
/// type parameters whose values are not yet known.
pub fn is_constant_expr(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Constant(_) | ExprKind::BozLiteral(_) | ExprKind::NullPointer => true,
        ExprKind::ImpliedDoIndex(_) => true,
        ExprKind::DescriptorInquiry(_) => false,
        ExprKind::TypeParamInquiry(inquiry) => matches!(
            &inquiry.parameter.kind,
            SymbolKind::TypeParam {
                attr: TypeParamAttr::Kind,
                ..
            }
        ),
        ExprKind::Designator(designator) => {
            designator.base.is_parameter()
                && !designator
                    .selectors
                    .iter()
                    .any(|s| matches!(s, Selector::CoarrayImage(_)))
                && !any_in_designator(designator, &mut |e| !is_constant_expr_shallow(e))
        }
        ExprKind::FunctionRef(call) => call.intrinsic_name() == Some("kind"),
        ExprKind::Unary(unary) => is_constant_expr(&unary.operand),
        ExprKind::Binary(binary) => {
            is_constant_expr(&binary.left) && is_constant_expr(&binary.right)
        }
        ExprKind::Relational(relation) => {
            is_constant_expr(&relation.left) && is_constant_expr(&relation.right)
        }
        ExprKind::ArrayConstructor(array) => !array.values.iter().any(|item| {
            any_in_item(item, &mut |e| !is_constant_expr_shallow(e))
        }),
        ExprKind::StructureConstructor(structure) => structure
            .values
            .iter()
            .all(|(_, value)| is_constant_expr(value)),
    }
}

fn is_constant_expr_shallow(expr: &Expr) -> bool {
    // Used under any_* traversals that already recurse structurally.
    match &expr.kind {
        ExprKind::Designator(designator) => designator.base.is_parameter(),
        ExprKind::FunctionRef(call) => call.intrinsic_name() == Some("kind"),
        ExprKind::DescriptorInquiry(_) => false,
        _ => true,
    }
}

/// Builds a relational operation, inserting the Fortran mixed-mode
/// conversions so that both operands share one type. LOGICAL and
/// COMPLEX comparisons are rejected here, as is a CHARACTER comparison
/// across kinds.
pub fn relate(op: RelationalOperator, left: Expr, right: Expr) -> crate::Result<Expr> {
    let (Some(lt), Some(rt)) = (left.get_type().cloned(), right.get_type().cloned()) else {
        bail!("relational operands must be typed");
    };
    match (lt.category, rt.category) {
        (TypeCategory::Character, TypeCategory::Character) => {
            if lt.kind != rt.kind {
                bail!(
                    "CHARACTER operands of kinds {} and {} cannot be compared",
                    lt.kind,
                    rt.kind
                );
            }
            Ok(Expr::relational(op, left, right))
        }
        _ => {
            let Some(target) = promoted(&lt, &rt) else {
                bail!("no relation is defined between {} and {}", lt, rt);
            };
            if target.category == TypeCategory::Complex {
                bail!("COMPLEX operands may not be compared for order");
            }
            let left = convert_if_needed(target.clone(), lt, left);
            let right = convert_if_needed(target, rt, right);
            Ok(Expr::relational(op, left, right))
        }
    }
}

fn convert_if_needed(target: DynamicType, from: DynamicType, operand: Expr) -> Expr {
    if from.category == target.category && from.kind == target.kind {
        operand
    } else {
        Expr::convert(target, operand)
    }
}
