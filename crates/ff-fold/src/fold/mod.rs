//! The recursive rewrite at the heart of the folder. Every node kind
//! folds its operands bottom-up, then attempts its own reduction;
//! failure to reduce is never an error, the node is simply rebuilt.

mod constructor;
mod convert;
mod elementwise;
mod intrinsic;
mod operation;

pub(crate) use convert::to_real;
pub(crate) use elementwise::{apply_elementwise_binary, apply_elementwise_unary};

use crate::context::FoldingContext;
use ff_core::expr::{Expr, ExprKind};
use ff_core::value::RealFlags;

/// Rewrites `expr` into its most reduced form under `ctx`. Folding is
/// idempotent and preserves the result type and rank of the input.
pub fn fold(ctx: &mut FoldingContext, expr: Expr) -> Expr {
    let Expr { ty, kind } = expr;
    match kind {
        ExprKind::Constant(_)
        | ExprKind::BozLiteral(_)
        | ExprKind::NullPointer
        | ExprKind::DescriptorInquiry(_) => Expr { ty, kind },
        ExprKind::ImpliedDoIndex(index) => constructor::fold_implied_do_index(ctx, ty, index),
        ExprKind::TypeParamInquiry(inquiry) => {
            constructor::fold_type_param_inquiry(ctx, ty, inquiry)
        }
        ExprKind::Designator(designator) => constructor::fold_designator(ctx, ty, designator),
        ExprKind::FunctionRef(call) => intrinsic::fold_function_ref(ctx, ty, call),
        ExprKind::Unary(unary) => operation::fold_unary(ctx, ty, unary),
        ExprKind::Binary(binary) => operation::fold_binary(ctx, ty, binary),
        ExprKind::Relational(relation) => operation::fold_relational(ctx, relation),
        ExprKind::ArrayConstructor(array) => constructor::fold_array_constructor(ctx, ty, array),
        ExprKind::StructureConstructor(structure) => {
            constructor::fold_structure_constructor(ctx, ty, structure)
        }
    }
}

/// Folds an expression that is held behind a mutable reference.
pub(crate) fn fold_in_place(ctx: &mut FoldingContext, expr: &mut Expr) {
    let owned = std::mem::replace(expr, Expr::null_pointer());
    *expr = fold(ctx, owned);
}

/// One warning per raised IEEE flag, in the manner of the diagnostics
/// the numeric conversion paths emit. Inexact is not diagnosed.
pub(crate) fn real_flag_warnings(ctx: &mut FoldingContext, flags: RealFlags, operation: &str) {
    if flags.invalid_argument {
        ctx.say_warning(format!("invalid argument on {}", operation));
    }
    if flags.divide_by_zero {
        ctx.say_warning(format!("division by zero on {}", operation));
    }
    if flags.overflow {
        ctx.say_warning(format!("overflow on {}", operation));
    }
    if flags.underflow {
        ctx.say_warning(format!("underflow on {}", operation));
    }
}
