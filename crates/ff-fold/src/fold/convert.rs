//! Folding of explicit conversions, including the BOZ reinterpretation
//! used by the REAL and CMPLX intrinsics (constraint C1601: nonzero
//! bits must not be silently truncated).

use super::{apply_elementwise_unary, fold, real_flag_warnings};
use crate::context::FoldingContext;
use ff_core::expr::{scalar_constant_value, Expr, ExprKind, UnaryExpr, UnaryOp};
use ff_core::types::{DynamicType, TypeCategory};
use ff_core::value::{BozValue, RealValue, Scalar};

pub(super) fn fold_convert(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    operand: Expr,
) -> Expr {
    let Some(to) = ty else {
        return rebuild(None, operand);
    };
    if operand.rank() > 0 {
        let target = to.clone();
        if let Some(array) = apply_elementwise_unary(ctx, &to, &operand, &|element| {
            Expr::convert(target.clone(), element)
        }) {
            return array;
        }
        return rebuild(Some(to), operand);
    }
    if let ExprKind::BozLiteral(boz) = &operand.kind {
        return match to.category {
            TypeCategory::Integer => {
                // Zero extension or truncation of the typeless word.
                let converted = boz.to_integer(to.kind);
                Expr::scalar(Scalar::Int(converted.value))
            }
            TypeCategory::Real => match reinterpret_boz_as_real(ctx, to.kind, *boz) {
                Some(value) => Expr::scalar(Scalar::Real(value)),
                None => rebuild(Some(to), operand),
            },
            _ => rebuild(Some(to), operand),
        };
    }
    let Some(value) = scalar_constant_value(&operand).cloned() else {
        return rebuild(Some(to), operand);
    };
    match (&value, to.category) {
        (Scalar::Int(n), TypeCategory::Integer) => {
            let converted = n.convert_signed(to.kind);
            if converted.overflow {
                ctx.say_warning(format!(
                    "INTEGER({}) to INTEGER({}) conversion overflowed",
                    n.kind(),
                    to.kind
                ));
            }
            Expr::scalar(Scalar::Int(converted.value))
        }
        (Scalar::Int(n), TypeCategory::Real) => {
            if !RealValue::is_foldable_kind(to.kind) {
                return rebuild(Some(to), operand);
            }
            let rounding = ctx.rounding;
            let converted = RealValue::from_integer(to.kind, n, rounding);
            if converted.flags.any() {
                real_flag_warnings(
                    ctx,
                    converted.flags,
                    &format!("INTEGER({}) to REAL({}) conversion", n.kind(), to.kind),
                );
            }
            Expr::scalar(Scalar::Real(converted.value))
        }
        (Scalar::Real(x), TypeCategory::Integer) => {
            let converted = x.to_integer(to.kind);
            if converted.flags.invalid_argument {
                ctx.say_warning(format!(
                    "REAL({}) to INTEGER({}) conversion: invalid argument",
                    x.kind(),
                    to.kind
                ));
            } else if converted.flags.overflow {
                ctx.say_warning(format!(
                    "REAL({}) to INTEGER({}) conversion overflowed",
                    x.kind(),
                    to.kind
                ));
            }
            Expr::scalar(Scalar::Int(converted.value))
        }
        (Scalar::Real(x), TypeCategory::Real) => {
            if !RealValue::is_foldable_kind(to.kind) {
                return rebuild(Some(to), operand);
            }
            let rounding = ctx.rounding;
            let mut converted = x.convert(to.kind, rounding);
            if converted.flags.any() {
                real_flag_warnings(
                    ctx,
                    converted.flags,
                    &format!("REAL({}) to REAL({}) conversion", x.kind(), to.kind),
                );
            }
            if ctx.flush_subnormals_to_zero {
                converted.value = converted.value.flush_subnormal_to_zero();
            }
            Expr::scalar(Scalar::Real(converted.value))
        }
        (Scalar::Complex(z), TypeCategory::Complex) => {
            // Conversions between COMPLEX kinds go part by part.
            if !RealValue::is_foldable_kind(to.kind) {
                return rebuild(Some(to), operand);
            }
            let rounding = ctx.rounding;
            let re = z.re().convert(to.kind, rounding);
            let im = z.im().convert(to.kind, rounding);
            let mut flags = re.flags;
            flags.merge(im.flags);
            if flags.any() {
                real_flag_warnings(
                    ctx,
                    flags,
                    &format!("COMPLEX({}) to COMPLEX({}) conversion", z.kind(), to.kind),
                );
            }
            Expr::scalar(Scalar::Complex(ff_core::value::ComplexValue::new(
                re.value, im.value,
            )))
        }
        (Scalar::Char(c), TypeCategory::Character) => {
            // Defined between kinds only for 7-bit ASCII data.
            match c.convert_kind(to.kind) {
                Some(converted) => Expr::scalar(Scalar::Char(converted)),
                None => rebuild(Some(to), operand),
            }
        }
        (Scalar::Logical(l), TypeCategory::Logical) => {
            Expr::logical(to.kind, l.is_true())
        }
        _ => rebuild(Some(to), operand),
    }
}

fn rebuild(ty: Option<DynamicType>, operand: Expr) -> Expr {
    Expr {
        ty,
        kind: ExprKind::Unary(UnaryExpr {
            op: UnaryOp::Convert,
            operand: Box::new(operand),
        }),
    }
}

/// Moves BOZ bits into a real of `kind` without numeric conversion,
/// diagnosing truncated nonzero bits per C1601.
fn reinterpret_boz_as_real(
    ctx: &mut FoldingContext,
    kind: ff_core::types::Kind,
    boz: BozValue,
) -> Option<RealValue> {
    let reinterpreted = boz.to_real(kind)?;
    if reinterpreted.truncated {
        ctx.say_warning(
            "Nonzero bits truncated from BOZ literal constant in REAL intrinsic".to_string(),
        );
    }
    Some(reinterpreted.value)
}

/// REAL()/CMPLX() argument handling: BOZ arguments are reinterpreted
/// bitwise, numeric arguments are converted by value. None means the
/// argument cannot be reduced here and the call should be left alone.
pub(crate) fn to_real(
    ctx: &mut FoldingContext,
    kind: ff_core::types::Kind,
    expr: Expr,
) -> Option<Expr> {
    match &expr.kind {
        ExprKind::BozLiteral(boz) => {
            let value = reinterpret_boz_as_real(ctx, kind, *boz)?;
            Some(Expr::scalar(Scalar::Real(value)))
        }
        _ => {
            let ty = expr.get_type()?.clone();
            if !ty.is_numeric() {
                return None;
            }
            if ty.category == TypeCategory::Complex {
                // CMPLX/REAL of a complex takes its real part first.
                let part = Expr::unary(
                    DynamicType::real(ty.kind),
                    UnaryOp::ComplexComponent { imaginary: false },
                    expr,
                );
                return Some(fold(ctx, Expr::convert(DynamicType::real(kind), part)));
            }
            Some(fold(ctx, Expr::convert(DynamicType::real(kind), expr)))
        }
    }
}
