//! Folding of unary, binary, relational, and logical operations over
//! scalar constants, after elementwise lifting has had its chance.

use super::convert::fold_convert;
use super::{apply_elementwise_binary, apply_elementwise_unary, fold, real_flag_warnings};
use crate::context::FoldingContext;
use ff_core::expr::{
    scalar_constant_value, BinaryExpr, BinaryOp, Expr, ExprKind, LogicalOperator, RelationalExpr,
    UnaryExpr, UnaryOp,
};
use ff_core::types::{DynamicType, LOGICAL_RESULT_KIND};
use ff_core::value::{ComplexValue, Ordering, Relation, Scalar};

pub(super) fn fold_unary(ctx: &mut FoldingContext, ty: Option<DynamicType>, unary: UnaryExpr) -> Expr {
    let UnaryExpr { op, operand } = unary;
    let operand = fold(ctx, *operand);
    if op == UnaryOp::Convert {
        return fold_convert(ctx, ty, operand);
    }
    if op == UnaryOp::Parentheses {
        // Parentheses pin IEEE evaluation order; keep them, even around
        // a constant.
        let ty = ty.or_else(|| operand.ty.clone());
        return rebuild_unary(ty, op, operand);
    }
    let Some(result_ty) = ty else {
        return rebuild_unary(None, op, operand);
    };
    if operand.rank() > 0 {
        let element_ty = result_ty.clone();
        let element_op = op.clone();
        if let Some(array) = apply_elementwise_unary(ctx, &result_ty, &operand, &|element| {
            Expr::unary(element_ty.clone(), element_op.clone(), element)
        }) {
            return array;
        }
        return rebuild_unary(Some(result_ty), op, operand);
    }
    let Some(value) = scalar_constant_value(&operand).cloned() else {
        return rebuild_unary(Some(result_ty), op, operand);
    };
    match (&op, value) {
        (UnaryOp::Negate, Scalar::Int(n)) => {
            let negated = n.negate();
            if negated.overflow {
                ctx.say_warning(format!("INTEGER({}) negation overflowed", n.kind()));
            }
            Expr::scalar(Scalar::Int(negated.value))
        }
        // REAL and COMPLEX negation cannot raise exceptions.
        (UnaryOp::Negate, Scalar::Real(x)) => Expr::scalar(Scalar::Real(x.negate())),
        (UnaryOp::Negate, Scalar::Complex(z)) => Expr::scalar(Scalar::Complex(z.negate())),
        (UnaryOp::Not, Scalar::Logical(l)) => Expr::scalar(Scalar::Logical(l.not())),
        (UnaryOp::ComplexComponent { imaginary }, Scalar::Complex(z)) => {
            let part = if *imaginary { *z.im() } else { *z.re() };
            Expr::scalar(Scalar::Real(part))
        }
        _ => rebuild_unary(Some(result_ty), op, operand),
    }
}

fn rebuild_unary(ty: Option<DynamicType>, op: UnaryOp, operand: Expr) -> Expr {
    Expr {
        ty,
        kind: ExprKind::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        }),
    }
}

pub(super) fn fold_binary(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    binary: BinaryExpr,
) -> Expr {
    let BinaryExpr { op, left, right } = binary;
    let left = fold(ctx, *left);
    let right = fold(ctx, *right);
    let Some(result_ty) = ty else {
        return rebuild_binary(None, op, left, right);
    };
    if left.rank() > 0 || right.rank() > 0 {
        let element_ty = result_ty.clone();
        let element_op = op.clone();
        if let Some(array) =
            apply_elementwise_binary(ctx, &result_ty, &left, &right, &|a, b| {
                Expr::binary(element_ty.clone(), element_op.clone(), a, b)
            })
        {
            return array;
        }
        return rebuild_binary(Some(result_ty), op, left, right);
    }
    let (Some(x), Some(y)) = (
        scalar_constant_value(&left).cloned(),
        scalar_constant_value(&right).cloned(),
    ) else {
        return rebuild_binary(Some(result_ty), op, left, right);
    };
    match fold_binary_scalars(ctx, &result_ty, &op, x, y) {
        Some(folded) => folded,
        None => rebuild_binary(Some(result_ty), op, left, right),
    }
}

fn rebuild_binary(ty: Option<DynamicType>, op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr {
        ty,
        kind: ExprKind::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }),
    }
}

fn fold_binary_scalars(
    ctx: &mut FoldingContext,
    ty: &DynamicType,
    op: &BinaryOp,
    x: Scalar,
    y: Scalar,
) -> Option<Expr> {
    let rounding = ctx.rounding;
    let flush = ctx.flush_subnormals_to_zero;
    match op {
        BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
            let name = match op {
                BinaryOp::Add => "addition",
                BinaryOp::Subtract => "subtraction",
                BinaryOp::Multiply => "multiplication",
                _ => "division",
            };
            match (x, y) {
                (Scalar::Int(a), Scalar::Int(b)) => {
                    if *op == BinaryOp::Divide {
                        let quotient = a.divide_signed(&b);
                        if quotient.division_by_zero {
                            ctx.say_warning(format!("INTEGER({}) division by zero", ty.kind));
                        }
                        if quotient.overflow {
                            ctx.say_warning(format!("INTEGER({}) division overflowed", ty.kind));
                        }
                        return Some(Expr::scalar(Scalar::Int(quotient.quotient)));
                    }
                    let result = match op {
                        BinaryOp::Add => a.add_signed(&b),
                        BinaryOp::Subtract => a.subtract_signed(&b),
                        _ => a.multiply_signed(&b),
                    };
                    if result.overflow {
                        ctx.say_warning(format!("INTEGER({}) {} overflowed", ty.kind, name));
                    }
                    Some(Expr::scalar(Scalar::Int(result.value)))
                }
                (Scalar::Real(a), Scalar::Real(b)) => {
                    let mut result = match op {
                        BinaryOp::Add => a.add(&b, rounding),
                        BinaryOp::Subtract => a.subtract(&b, rounding),
                        BinaryOp::Multiply => a.multiply(&b, rounding),
                        _ => a.divide(&b, rounding),
                    };
                    real_flag_warnings(ctx, result.flags, name);
                    if flush {
                        result.value = result.value.flush_subnormal_to_zero();
                    }
                    Some(Expr::scalar(Scalar::Real(result.value)))
                }
                (Scalar::Complex(a), Scalar::Complex(b)) => {
                    let mut result = match op {
                        BinaryOp::Add => a.add(&b, rounding),
                        BinaryOp::Subtract => a.subtract(&b, rounding),
                        BinaryOp::Multiply => a.multiply(&b, rounding),
                        _ => a.divide(&b, rounding),
                    };
                    real_flag_warnings(ctx, result.flags, name);
                    if flush {
                        result.value = result.value.flush_subnormal_to_zero();
                    }
                    Some(Expr::scalar(Scalar::Complex(result.value)))
                }
                _ => None,
            }
        }
        BinaryOp::Power => match (x, y) {
            (Scalar::Int(a), Scalar::Int(b)) => {
                let power = a.power(&b);
                if power.division_by_zero {
                    ctx.say_warning(format!("INTEGER({}) zero to negative power", ty.kind));
                } else if power.overflow {
                    ctx.say_warning(format!("INTEGER({}) power overflowed", ty.kind));
                } else if power.zero_to_zero {
                    ctx.say_warning(format!("INTEGER({}) 0**0 is not defined", ty.kind));
                }
                Some(Expr::scalar(Scalar::Int(power.power)))
            }
            // REAL and COMPLEX power with a non-integral exponent is
            // not folded here.
            _ => None,
        },
        BinaryOp::RealToIntPower => {
            let exponent = match &y {
                Scalar::Int(n) => n.to_int64()?,
                _ => return None,
            };
            match x {
                Scalar::Real(a) => {
                    let mut power = a.pow_int(exponent, rounding);
                    real_flag_warnings(ctx, power.flags, "power with INTEGER exponent");
                    if flush {
                        power.value = power.value.flush_subnormal_to_zero();
                    }
                    Some(Expr::scalar(Scalar::Real(power.value)))
                }
                Scalar::Complex(a) => {
                    let mut power = a.pow_int(exponent, rounding);
                    real_flag_warnings(ctx, power.flags, "power with INTEGER exponent");
                    if flush {
                        power.value = power.value.flush_subnormal_to_zero();
                    }
                    Some(Expr::scalar(Scalar::Complex(power.value)))
                }
                _ => None,
            }
        }
        BinaryOp::Extremum { ordering } => match (x, y) {
            (Scalar::Int(a), Scalar::Int(b)) => {
                let winner = if a.compare_signed(&b) == *ordering { a } else { b };
                Some(Expr::scalar(Scalar::Int(winner)))
            }
            (Scalar::Real(a), Scalar::Real(b)) => {
                let first_wins = a.is_nan()
                    || b.is_nan()
                    || (a.compare(&b) == Relation::Less) == (*ordering == Ordering::Less);
                Some(Expr::scalar(Scalar::Real(if first_wins { a } else { b })))
            }
            (Scalar::Char(a), Scalar::Char(b)) => {
                let winner = if a.compare(&b) == *ordering { a } else { b };
                Some(Expr::scalar(Scalar::Char(winner)))
            }
            _ => None,
        },
        BinaryOp::Concat => match (x, y) {
            (Scalar::Char(a), Scalar::Char(b)) if a.kind() == b.kind() => {
                Some(Expr::scalar(Scalar::Char(a.concat(&b))))
            }
            _ => None,
        },
        BinaryOp::ComplexConstructor => match (x, y) {
            (Scalar::Real(re), Scalar::Real(im)) => {
                Some(Expr::scalar(Scalar::Complex(ComplexValue::new(re, im))))
            }
            _ => None,
        },
        BinaryOp::Logical { op } => match (x, y) {
            (Scalar::Logical(a), Scalar::Logical(b)) => {
                let (p, q) = (a.is_true(), b.is_true());
                let value = match op {
                    LogicalOperator::And => p && q,
                    LogicalOperator::Or => p || q,
                    LogicalOperator::Eqv => p == q,
                    LogicalOperator::Neqv => p != q,
                };
                Some(Expr::logical(ty.kind, value))
            }
            _ => None,
        },
        BinaryOp::SetLength => match (x, y) {
            (Scalar::Char(a), Scalar::Int(n)) => {
                Some(Expr::scalar(Scalar::Char(a.set_length(n.to_int64()?))))
            }
            _ => None,
        },
    }
}

pub(super) fn fold_relational(ctx: &mut FoldingContext, relation: RelationalExpr) -> Expr {
    let RelationalExpr { op, left, right } = relation;
    let left = fold(ctx, *left);
    let right = fold(ctx, *right);
    let result_ty = DynamicType::logical_result();
    if left.rank() > 0 || right.rank() > 0 {
        let element_op = op.clone();
        if let Some(array) =
            apply_elementwise_binary(ctx, &result_ty, &left, &right, &|a, b| {
                Expr::relational(element_op.clone(), a, b)
            })
        {
            return array;
        }
        return rebuild_relational(op, left, right);
    }
    let (Some(x), Some(y)) = (scalar_constant_value(&left), scalar_constant_value(&right)) else {
        return rebuild_relational(op, left, right);
    };
    let satisfied = match (x, y) {
        (Scalar::Int(a), Scalar::Int(b)) => Some(op.satisfies(a.compare_signed(b))),
        (Scalar::Real(a), Scalar::Real(b)) => Some(op.satisfies_relation(a.compare(b))),
        (Scalar::Char(a), Scalar::Char(b)) if a.kind() == b.kind() => {
            Some(op.satisfies(a.compare(b)))
        }
        // LOGICAL and COMPLEX relations are rejected by the type layer.
        _ => None,
    };
    match satisfied {
        Some(value) => Expr::logical(LOGICAL_RESULT_KIND, value),
        None => rebuild_relational(op, left, right),
    }
}

fn rebuild_relational(op: ff_core::expr::RelationalOperator, left: Expr, right: Expr) -> Expr {
    Expr::relational(op, left, right)
}
