//! Partial evaluation of specific intrinsic function calls, dispatched
//! by name independently per result-type category. Unsupported names
//! are left as unreduced calls without any diagnostic; they may
//! legitimately need runtime evaluation.

use super::{fold, fold_in_place, to_real};
use crate::context::FoldingContext;
use crate::shape::{as_extent_array_expr, get_shape, get_size};
use ff_core::expr::{
    increment_subscripts, initial_subscripts, to_int64, total_element_count, Constant, Expr,
    ExprKind, FunctionRef,
};
use ff_core::types::{DynamicType, TypeCategory, LARGEST_INTEGER_KIND};
use ff_core::value::{CharValue, IntValue, RealValue, Scalar};

pub(super) fn fold_function_ref(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    mut call: FunctionRef,
) -> Expr {
    for arg in call.args.iter_mut().flatten() {
        fold_in_place(ctx, arg);
    }
    if call.intrinsic_name().is_none() {
        return rebuild(ty, call);
    }
    let Some(result_ty) = ty else {
        return rebuild(None, call);
    };
    match result_ty.category {
        TypeCategory::Integer => fold_integer_intrinsic(ctx, result_ty, call),
        TypeCategory::Real => fold_real_intrinsic(ctx, result_ty, call),
        TypeCategory::Complex => fold_complex_intrinsic(ctx, result_ty, call),
        TypeCategory::Logical => fold_logical_intrinsic(ctx, result_ty, call),
        _ => rebuild(Some(result_ty), call),
    }
}

fn rebuild(ty: Option<DynamicType>, call: FunctionRef) -> Expr {
    Expr {
        ty,
        kind: ExprKind::FunctionRef(call),
    }
}

/// Applies a scalar kernel elementwise. Every present argument must
/// already be a constant; array arguments must share one shape (a
/// "not conformable" diagnostic is emitted otherwise) and scalars are
/// broadcast. Results are assembled in column-major order.
fn fold_elemental(
    ctx: &mut FoldingContext,
    result_ty: &DynamicType,
    call: FunctionRef,
    f: &mut dyn FnMut(&mut FoldingContext, &[&Scalar]) -> Option<Scalar>,
) -> Expr {
    let constants: Option<Vec<Constant>> = call
        .args
        .iter()
        .flatten()
        .map(|arg| arg.as_constant().cloned())
        .collect();
    let Some(constants) = constants else {
        return rebuild(Some(result_ty.clone()), call);
    };
    if constants.is_empty() {
        return rebuild(Some(result_ty.clone()), call);
    }
    let mut shape: Vec<i64> = Vec::new();
    for constant in &constants {
        if constant.rank() > 0 {
            if shape.is_empty() {
                shape = constant.shape.clone();
            } else if shape != constant.shape {
                ctx.say_error("arguments in elemental intrinsic function are not conformable");
                return rebuild(Some(result_ty.clone()), call);
            }
        }
    }
    let mut results = Vec::new();
    if total_element_count(&shape) > 0 {
        let mut index = initial_subscripts(shape.len());
        loop {
            let scalars: Vec<&Scalar> = constants
                .iter()
                .map(|c| {
                    if c.rank() > 0 {
                        c.at(&index)
                    } else {
                        &c.values[0]
                    }
                })
                .collect();
            match f(ctx, &scalars) {
                Some(value) => results.push(value),
                None => return rebuild(Some(result_ty.clone()), call),
            }
            if !increment_subscripts(&mut index, &shape) {
                break;
            }
        }
    }
    let mut element_ty = result_ty.clone();
    if element_ty.category == TypeCategory::Character {
        element_ty.char_len = Some(
            results
                .first()
                .and_then(Scalar::as_char)
                .map(CharValue::len)
                .unwrap_or(0),
        );
    }
    Expr::constant(Constant::array(element_ty, shape, results))
}

/// Rewrites a BOZ actual argument as a constant of `target` before the
/// elemental kernel sees it.
fn convert_boz_arg(ctx: &mut FoldingContext, call: &mut FunctionRef, index: usize, target: &DynamicType) {
    if let Some(Some(arg)) = call.args.get_mut(index) {
        if matches!(arg.kind, ExprKind::BozLiteral(_)) {
            let owned = std::mem::replace(arg, Expr::null_pointer());
            *arg = fold(ctx, Expr::convert(target.clone(), owned));
        }
    }
}

/// A shift or position argument may be of any integer kind; it is
/// bounded by the bit size, so narrowing it to INTEGER(4) is safe and
/// keeps the kernels monomorphic.
fn normalize_int4_arg(ctx: &mut FoldingContext, call: &mut FunctionRef, index: usize) {
    convert_int_arg(ctx, call, index, 4);
}

fn convert_int_arg(ctx: &mut FoldingContext, call: &mut FunctionRef, index: usize, kind: u8) {
    if let Some(Some(arg)) = call.args.get_mut(index) {
        let needs = arg
            .get_type()
            .map(|t| t.is_integer() && t.kind != kind)
            .unwrap_or(false);
        if needs {
            let owned = std::mem::replace(arg, Expr::null_pointer());
            *arg = fold(ctx, Expr::convert(DynamicType::integer(kind), owned));
        }
    }
}

fn arg_expr<'a>(call: &'a FunctionRef, index: usize) -> Option<&'a Expr> {
    call.args.get(index).and_then(|arg| arg.as_ref())
}

fn fold_integer_intrinsic(ctx: &mut FoldingContext, ty: DynamicType, mut call: FunctionRef) -> Expr {
    let kind = ty.kind;
    let name = match call.intrinsic_name() {
        Some(name) => name.to_string(),
        None => return rebuild(Some(ty), call),
    };
    match name.as_str() {
        "abs" => fold_elemental(ctx, &ty, call, &mut |ctx, args| {
            let n = args.first()?.as_int()?;
            let result = n.abs();
            if result.overflow {
                ctx.say_warning(format!("abs(integer(kind={})) folding overflowed", kind));
            }
            Some(Scalar::Int(result.value))
        }),
        "dim" => fold_elemental(ctx, &ty, call, &mut |_, args| {
            let a = args.first()?.as_int()?;
            let b = args.get(1)?.as_int()?;
            Some(Scalar::Int(a.dim(b).value))
        }),
        "dshiftl" | "dshiftr" => {
            for i in 0..=1 {
                convert_boz_arg(ctx, &mut call, i, &ty);
            }
            // The shift count can be of any kind but is bounded by
            // BIT_SIZE; narrow it to INTEGER(4).
            normalize_int4_arg(ctx, &mut call, 2);
            let left = name == "dshiftl";
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let i = args.first()?.as_int()?;
                let j = args.get(1)?.as_int()?;
                let shift = args.get(2)?.as_int()?.to_int64()? as i32;
                Some(Scalar::Int(if left {
                    i.dshiftl(j, shift)
                } else {
                    i.dshiftr(j, shift)
                }))
            })
        }
        "exponent" => {
            let is_real = arg_expr(&call, 0)
                .and_then(Expr::get_type)
                .map(|t| t.is_real())
                .unwrap_or(false);
            if !is_real {
                panic!("exponent argument must be real");
            }
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let x = args.first()?.as_real()?;
                Some(Scalar::Int(IntValue::new(kind, x.exponent() as i128)))
            })
        }
        "iand" | "ior" | "ieor" => {
            for i in 0..=1 {
                convert_boz_arg(ctx, &mut call, i, &ty);
            }
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let a = args.first()?.as_int()?;
                let b = args.get(1)?.as_int()?;
                Some(Scalar::Int(match name.as_str() {
                    "iand" => a.iand(b),
                    "ior" => a.ior(b),
                    _ => a.ieor(b),
                }))
            })
        }
        "ibclr" | "ibset" | "ibshft" | "ishft" | "shifta" | "shiftr" | "shiftl" => {
            normalize_int4_arg(ctx, &mut call, 1);
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let i = args.first()?.as_int()?;
                let count = args.get(1)?.as_int()?.to_int64()? as i32;
                Some(Scalar::Int(match name.as_str() {
                    "ibclr" => i.ibclr(count),
                    "ibset" => i.ibset(count),
                    // "ibshft" is accepted alongside the standard
                    // spelling; both are the logical SHIFT.
                    "ibshft" | "ishft" => i.ishft(count),
                    "shifta" => i.shifta(count),
                    "shiftr" => i.shiftr(count),
                    _ => i.shiftl(count),
                }))
            })
        }
        "int" => {
            let convertible = arg_expr(&call, 0)
                .map(|arg| {
                    matches!(arg.kind, ExprKind::BozLiteral(_))
                        || arg.get_type().map(DynamicType::is_numeric).unwrap_or(false)
                })
                .unwrap_or(false);
            if !convertible {
                return rebuild(Some(ty), call);
            }
            let arg = call.args[0].take().expect("int() argument just probed");
            fold(ctx, Expr::convert(ty, arg))
        }
        "kind" => match arg_expr(&call, 0).and_then(Expr::get_type) {
            Some(arg_ty) => Expr::integer(kind, arg_ty.kind as i128),
            None => rebuild(Some(ty), call),
        },
        "leadz" | "trailz" | "poppar" | "popcnt" => {
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let n = args.first()?.as_int()?;
                let value = match name.as_str() {
                    "leadz" => n.leading_zeros(),
                    "trailz" => n.trailing_zeros(),
                    "poppar" => i32::from(n.pop_parity()),
                    _ => n.pop_count(),
                };
                Some(Scalar::Int(IntValue::new(kind, value as i128)))
            })
        }
        "len" => {
            let length = arg_expr(&call, 0).and_then(|arg| {
                arg.as_constant()
                    .and_then(|c| c.values.first())
                    .and_then(Scalar::as_char)
                    .map(CharValue::len)
                    .or_else(|| arg.get_type().and_then(|t| t.char_len))
            });
            match length {
                Some(length) => Expr::integer(kind, length as i128),
                None => rebuild(Some(ty), call),
            }
        }
        "maskl" | "maskr" => {
            normalize_int4_arg(ctx, &mut call, 0);
            let left = name == "maskl";
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let places = args.first()?.as_int()?.to_int64()? as i32;
                Some(Scalar::Int(if left {
                    IntValue::maskl(kind, places)
                } else {
                    IntValue::maskr(kind, places)
                }))
            })
        }
        "merge_bits" => {
            for i in 0..=2 {
                convert_boz_arg(ctx, &mut call, i, &ty);
            }
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let a = args.first()?.as_int()?;
                let b = args.get(1)?.as_int()?;
                let mask = args.get(2)?.as_int()?;
                Some(Scalar::Int(a.merge_bits(b, mask)))
            })
        }
        "rank" => match arg_expr(&call, 0) {
            Some(arg) => Expr::integer(kind, arg.rank() as i128),
            None => rebuild(Some(ty), call),
        },
        "shape" => {
            let arg_shape = match arg_expr(&call, 0).cloned() {
                Some(arg) => get_shape(ctx, &arg),
                None => None,
            };
            match arg_shape.as_ref().and_then(as_extent_array_expr) {
                Some(extents) => fold(ctx, Expr::convert(ty, extents)),
                None => rebuild(Some(ty), call),
            }
        }
        "size" => fold_size(ctx, ty, call),
        _ => rebuild(Some(ty), call),
    }
}

/// SIZE(A [, DIM]): one extent when DIM= is present (with a rank-bounds
/// check), else PRODUCT of the extents when they are all known.
fn fold_size(ctx: &mut FoldingContext, ty: DynamicType, call: FunctionRef) -> Expr {
    let Some(shape) = arg_expr(&call, 0).cloned().and_then(|arg| get_shape(ctx, &arg)) else {
        return rebuild(Some(ty), call);
    };
    if let Some(dim_arg) = arg_expr(&call, 1) {
        if let Some(dim) = to_int64(dim_arg) {
            let rank = shape.len() as i64;
            if dim >= 1 && dim <= rank {
                if let Some(dimension) = shape.into_iter().nth(dim as usize - 1).flatten() {
                    return fold(ctx, Expr::convert(ty, dimension));
                }
            } else {
                ctx.say_warning(format!(
                    "size(array,dim={}) dimension is out of range for rank-{} array",
                    dim, rank
                ));
            }
        }
        return rebuild(Some(ty), call);
    }
    match get_size(ctx, shape) {
        Some(product) => fold(ctx, Expr::convert(ty, product)),
        None => rebuild(Some(ty), call),
    }
}

const UNARY_REAL_TRANSCENDENTALS: &[&str] = &[
    "acos",
    "acosh",
    "asin",
    "asinh",
    "atanh",
    "bessel_j0",
    "bessel_j1",
    "bessel_y0",
    "bessel_y1",
    "cos",
    "cosh",
    "erf",
    "erfc",
    "erfc_scaled",
    "exp",
    "gamma",
    "log",
    "log10",
    "log_gamma",
    "sin",
    "sinh",
    "sqrt",
    "tan",
    "tanh",
];

fn fold_real_intrinsic(ctx: &mut FoldingContext, ty: DynamicType, mut call: FunctionRef) -> Expr {
    let kind = ty.kind;
    let name = match call.intrinsic_name() {
        Some(name) => name.to_string(),
        None => return rebuild(Some(ty), call),
    };
    let host = ctx.host.clone();
    let real = (TypeCategory::Real, kind);
    let complex = (TypeCategory::Complex, kind);
    if UNARY_REAL_TRANSCENDENTALS.contains(&name.as_str())
        || (name == "atan" && call.args.len() == 1)
    {
        return match host.procedure(&name, real, &[real]) {
            Some(callable) => fold_elemental(ctx, &ty, call, &mut |_, args| callable(args)),
            None => {
                ctx.say_warning(format!(
                    "{}(real(kind={})) cannot be folded on host",
                    name, kind
                ));
                rebuild(Some(ty), call)
            }
        };
    }
    match name.as_str() {
        "atan" | "atan2" | "hypot" | "mod" => {
            let local_name = if name == "atan2" { "atan" } else { name.as_str() };
            match host.procedure(local_name, real, &[real, real]) {
                Some(callable) => fold_elemental(ctx, &ty, call, &mut |_, args| callable(args)),
                None => {
                    ctx.say_warning(format!(
                        "{}(real(kind={}), real(kind={})) cannot be folded on host",
                        name, kind, kind
                    ));
                    rebuild(Some(ty), call)
                }
            }
        }
        "bessel_jn" | "bessel_yn" if call.args.len() == 2 => {
            // The elemental form; the runtime bindings take a default
            // integer order.
            normalize_int4_arg(ctx, &mut call, 0);
            match host.procedure(&name, real, &[(TypeCategory::Integer, 4), real]) {
                Some(callable) => fold_elemental(ctx, &ty, call, &mut |_, args| callable(args)),
                None => {
                    ctx.say_warning(format!(
                        "{}(integer(kind=4), real(kind={})) cannot be folded on host",
                        name, kind
                    ));
                    rebuild(Some(ty), call)
                }
            }
        }
        "abs" => {
            let category = arg_expr(&call, 0)
                .and_then(Expr::get_type)
                .map(|t| t.category);
            match category {
                Some(TypeCategory::Real) => fold_elemental(ctx, &ty, call, &mut |_, args| {
                    Some(Scalar::Real(args.first()?.as_real()?.abs()))
                }),
                Some(TypeCategory::Complex) => match host.procedure("abs", real, &[complex]) {
                    Some(callable) => fold_elemental(ctx, &ty, call, &mut |_, args| callable(args)),
                    None => {
                        ctx.say_warning(format!(
                            "abs(complex(kind={})) cannot be folded on host",
                            kind
                        ));
                        rebuild(Some(ty), call)
                    }
                },
                _ => rebuild(Some(ty), call),
            }
        }
        "aimag" => fold_elemental(ctx, &ty, call, &mut |_, args| {
            Some(Scalar::Real(*args.first()?.as_complex()?.im()))
        }),
        "aint" => {
            // Convert the argument to the result kind before truncating.
            let matches_kind = arg_expr(&call, 0)
                .and_then(Expr::get_type)
                .map(|t| t.kind == kind)
                .unwrap_or(false);
            if !matches_kind {
                if let Some(Some(arg)) = call.args.get_mut(0) {
                    let owned = std::mem::replace(arg, Expr::null_pointer());
                    *arg = fold(ctx, Expr::convert(DynamicType::real(kind), owned));
                }
            }
            fold_elemental(ctx, &ty, call, &mut |ctx, args| {
                let truncated = args.first()?.as_real()?.aint();
                if truncated.flags.overflow {
                    ctx.say_warning("aint intrinsic folding overflow".to_string());
                }
                Some(Scalar::Real(truncated.value))
            })
        }
        "dprod" => {
            let (Some(x), Some(y)) = (arg_expr(&call, 0).cloned(), arg_expr(&call, 1).cloned())
            else {
                return rebuild(Some(ty), call);
            };
            let product = Expr::binary(
                ty.clone(),
                ff_core::expr::BinaryOp::Multiply,
                Expr::convert(ty.clone(), x),
                Expr::convert(ty.clone(), y),
            );
            fold(ctx, product)
        }
        "epsilon" => match RealValue::epsilon(kind) {
            Some(value) => Expr::scalar(Scalar::Real(value)),
            None => rebuild(Some(ty), call),
        },
        "real" => match arg_expr(&call, 0).cloned() {
            Some(arg) => match to_real(ctx, kind, arg) {
                Some(converted) => converted,
                None => rebuild(Some(ty), call),
            },
            None => rebuild(Some(ty), call),
        },
        _ => rebuild(Some(ty), call),
    }
}

const COMPLEX_TRANSCENDENTALS: &[&str] = &[
    "acos", "acosh", "asin", "asinh", "atan", "atanh", "cos", "cosh", "exp", "log", "sin", "sinh",
    "sqrt", "tan", "tanh",
];

fn fold_complex_intrinsic(ctx: &mut FoldingContext, ty: DynamicType, call: FunctionRef) -> Expr {
    let kind = ty.kind;
    let name = match call.intrinsic_name() {
        Some(name) => name.to_string(),
        None => return rebuild(Some(ty), call),
    };
    let host = ctx.host.clone();
    let complex = (TypeCategory::Complex, kind);
    if COMPLEX_TRANSCENDENTALS.contains(&name.as_str()) {
        return match host.procedure(&name, complex, &[complex]) {
            Some(callable) => fold_elemental(ctx, &ty, call, &mut |_, args| callable(args)),
            None => {
                ctx.say_warning(format!(
                    "{}(complex(kind={})) cannot be folded on host",
                    name, kind
                ));
                rebuild(Some(ty), call)
            }
        };
    }
    match name.as_str() {
        "conjg" => fold_elemental(ctx, &ty, call, &mut |_, args| {
            Some(Scalar::Complex(args.first()?.as_complex()?.conjugate()))
        }),
        "cmplx" => {
            if call.args.len() == 2 {
                // cmplx(x [, kind]) with complex x: a kind conversion.
                match arg_expr(&call, 0).cloned() {
                    Some(x) if x.get_type().map(DynamicType::is_complex).unwrap_or(false) => {
                        fold(ctx, Expr::convert(ty, x))
                    }
                    _ => rebuild(Some(ty), call),
                }
            } else {
                // cmplx(re, im, kind): assemble from two reals.
                let Some(re) = arg_expr(&call, 0).cloned() else {
                    return rebuild(Some(ty), call);
                };
                let im = arg_expr(&call, 1)
                    .cloned()
                    .unwrap_or_else(|| Expr::scalar(Scalar::Real(RealValue::zero(kind))));
                let (Some(re), Some(im)) = (to_real(ctx, kind, re), to_real(ctx, kind, im)) else {
                    return rebuild(Some(ty), call);
                };
                fold(
                    ctx,
                    Expr::binary(
                        ty,
                        ff_core::expr::BinaryOp::ComplexConstructor,
                        re,
                        im,
                    ),
                )
            }
        }
        _ => rebuild(Some(ty), call),
    }
}

fn fold_logical_intrinsic(ctx: &mut FoldingContext, ty: DynamicType, mut call: FunctionRef) -> Expr {
    let kind = ty.kind;
    let name = match call.intrinsic_name() {
        Some(name) => name.to_string(),
        None => return rebuild(Some(ty), call),
    };
    match name.as_str() {
        "bge" | "bgt" | "ble" | "blt" => {
            // Operands may be of any integer kinds or BOZ; compare at
            // the widest width after conversion.
            let widest = DynamicType::largest_integer();
            for i in 0..=1 {
                convert_boz_arg(ctx, &mut call, i, &widest);
                convert_int_arg(ctx, &mut call, i, LARGEST_INTEGER_KIND);
            }
            fold_elemental(ctx, &ty, call, &mut |_, args| {
                let a = args.first()?.as_int()?;
                let b = args.get(1)?.as_int()?;
                let ordering = a.compare_signed(b);
                use ff_core::value::Ordering::*;
                let value = match name.as_str() {
                    "bge" => ordering != Less,
                    "bgt" => ordering == Greater,
                    "ble" => ordering != Greater,
                    _ => ordering == Less,
                };
                Some(Scalar::Logical(ff_core::value::LogicalValue::new(
                    kind, value,
                )))
            })
        }
        _ => rebuild(Some(ty), call),
    }
}
