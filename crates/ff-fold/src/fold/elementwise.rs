//! Elemental application of scalar operations over conformable array
//! operands. An operand participates when it can be linearized into a
//! flat array constructor (a constant array enumerated in column-major
//! order, a constructor with no residual implied DOs, or parentheses
//! around either); scalars are broadcast when they are safe to
//! replicate (no function or coarray references).

use super::fold;
use crate::context::FoldingContext;
use crate::shape::{as_constant_extents, check_conformance, get_shape};
use ff_core::expr::{
    any_subexpression, ArrayConstructor, ArrayItem, Designator, Expr, ExprKind, Selector, UnaryOp,
};
use ff_core::types::DynamicType;
use itertools::Itertools;

/// The element expressions of a flat linearization of `expr`, if any.
pub(crate) fn as_flat_elements(expr: &Expr) -> Option<Vec<Expr>> {
    match &expr.kind {
        ExprKind::Constant(constant) if constant.rank() > 0 => Some(
            constant
                .values
                .iter()
                .cloned()
                .map(Expr::scalar)
                .collect(),
        ),
        ExprKind::ArrayConstructor(array) if array.is_flat() => Some(
            array
                .values
                .iter()
                .map(|item| match item {
                    ArrayItem::Expr(element) => element.clone(),
                    ArrayItem::ImpliedDo(_) => unreachable!("flat constructor"),
                })
                .collect(),
        ),
        ExprKind::Unary(unary) if unary.op == UnaryOp::Parentheses => {
            as_flat_elements(&unary.operand)
        }
        _ => None,
    }
}

/// Is a scalar expression suitable for naive expansion while
/// flattening an array operation?
pub(crate) fn is_expandable_scalar(expr: &Expr) -> bool {
    !any_subexpression(expr, &mut |e| match &e.kind {
        ExprKind::FunctionRef(_) => true,
        ExprKind::Designator(designator) => has_coarray_image(designator),
        _ => false,
    })
}

fn has_coarray_image(designator: &Designator) -> bool {
    designator
        .selectors
        .iter()
        .any(|selector| matches!(selector, Selector::CoarrayImage(_)))
}

/// Materializes mapped elements as a flat constructor, folds it (so a
/// fully constant result collapses), and restores the operand shape.
fn from_mapped_elements(
    ctx: &mut FoldingContext,
    result_ty: &DynamicType,
    extents: Vec<i64>,
    values: Vec<ArrayItem>,
) -> Expr {
    let array = ArrayConstructor {
        ty: result_ty.clone(),
        len: None,
        values,
    };
    let mut result = fold(
        ctx,
        Expr::new(result_ty.clone(), ExprKind::ArrayConstructor(array)),
    );
    if let ExprKind::Constant(constant) = &mut result.kind {
        debug_assert_eq!(
            constant.values.len() as i64,
            extents.iter().product::<i64>()
        );
        constant.shape = extents;
    }
    result
}

/// Maps `f` over the elements of an already-folded rank >= 1 operand.
/// None means the operand does not linearize; the operation node is
/// then preserved as written.
pub(crate) fn apply_elementwise_unary(
    ctx: &mut FoldingContext,
    result_ty: &DynamicType,
    operand: &Expr,
    f: &dyn Fn(Expr) -> Expr,
) -> Option<Expr> {
    if operand.rank() == 0 {
        return None;
    }
    let shape = get_shape(ctx, operand)?;
    let extents = as_constant_extents(&shape)?;
    let elements = as_flat_elements(operand)?;
    let values = elements
        .into_iter()
        .map(|element| ArrayItem::Expr(fold(ctx, f(element))))
        .collect();
    Some(from_mapped_elements(ctx, result_ty, extents, values))
}

/// Maps `f` pairwise over array/array or array/scalar operands.
/// Emits the "not conformable" diagnostic (and declines to map) when
/// two array operands disagree on a known extent.
pub(crate) fn apply_elementwise_binary(
    ctx: &mut FoldingContext,
    result_ty: &DynamicType,
    left: &Expr,
    right: &Expr,
    f: &dyn Fn(Expr, Expr) -> Expr,
) -> Option<Expr> {
    if left.rank() > 0 {
        let left_shape = get_shape(ctx, left)?;
        let left_elements = as_flat_elements(left)?;
        if right.rank() > 0 {
            let right_shape = get_shape(ctx, right)?;
            let right_elements = as_flat_elements(right)?;
            if !check_conformance(ctx, &left_shape, &right_shape, "left operand", "right operand")
            {
                return None;
            }
            let extents = as_constant_extents(&left_shape)?;
            let values = left_elements
                .into_iter()
                .zip_eq(right_elements)
                .map(|(a, b)| ArrayItem::Expr(fold(ctx, f(a, b))))
                .collect();
            return Some(from_mapped_elements(ctx, result_ty, extents, values));
        }
        if is_expandable_scalar(right) {
            let extents = as_constant_extents(&left_shape)?;
            let values = left_elements
                .into_iter()
                .map(|a| ArrayItem::Expr(fold(ctx, f(a, right.clone()))))
                .collect();
            return Some(from_mapped_elements(ctx, result_ty, extents, values));
        }
        return None;
    }
    if right.rank() > 0 && is_expandable_scalar(left) {
        let shape = get_shape(ctx, right)?;
        let extents = as_constant_extents(&shape)?;
        let elements = as_flat_elements(right)?;
        let values = elements
            .into_iter()
            .map(|b| ArrayItem::Expr(fold(ctx, f(left.clone(), b))))
            .collect();
        return Some(from_mapped_elements(ctx, result_ty, extents, values));
    }
    None
}
