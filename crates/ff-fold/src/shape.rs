//! Shape analysis: determine the per-dimension extents of an
//! expression as symbolic subscript-integer expressions, when possible.
//! An element of `None` means the extent is unknown; a result of `None`
//! means even the rank structure could not be determined.

use crate::context::FoldingContext;
use crate::fold::fold;
use ff_core::expr::{
    contains_any_implied_do_index, to_int64, ArrayItem, BinaryOp, Constant, Designator, Expr,
    ExprKind, ImpliedDo, Ordering, Selector, Subscript,
};
use ff_core::symbol::Symbol;
use ff_core::types::{DynamicType, SUBSCRIPT_INTEGER_KIND};
use ff_core::value::{IntValue, Scalar};

pub type Shape = Vec<Option<Expr>>;

fn extent(value: i64) -> Expr {
    Expr::subscript_integer(value)
}

/// MAX(0, (upper - lower + stride) / stride), folded under `ctx`.
pub fn count_trips(ctx: &mut FoldingContext, lower: Expr, upper: Expr, stride: Expr) -> Expr {
    let ty = DynamicType::subscript_integer();
    let span = Expr::binary(
        ty.clone(),
        BinaryOp::Add,
        Expr::binary(ty.clone(), BinaryOp::Subtract, upper, lower),
        stride.clone(),
    );
    let trips = Expr::binary(ty.clone(), BinaryOp::Divide, span, stride);
    let clamped = Expr::binary(
        ty,
        BinaryOp::Extremum {
            ordering: Ordering::Greater,
        },
        extent(0),
        trips,
    );
    fold(ctx, clamped)
}

/// SIZE() == PRODUCT(shape), when every extent is known.
pub fn get_size(ctx: &mut FoldingContext, shape: Shape) -> Option<Expr> {
    let mut product = extent(1);
    for dimension in shape {
        let dimension = dimension?;
        product = fold(
            ctx,
            Expr::binary(
                DynamicType::subscript_integer(),
                BinaryOp::Multiply,
                product,
                dimension,
            ),
        );
    }
    Some(product)
}

pub fn as_constant_extents(shape: &Shape) -> Option<Vec<i64>> {
    shape
        .iter()
        .map(|dimension| dimension.as_ref().and_then(to_int64))
        .collect()
}

/// The shape as a rank-1 subscript-integer constant, for SHAPE().
pub fn as_extent_array_expr(shape: &Shape) -> Option<Expr> {
    let extents = as_constant_extents(shape)?;
    let values: Vec<Scalar> = extents
        .iter()
        .map(|&e| Scalar::Int(IntValue::new(SUBSCRIPT_INTEGER_KIND, e as i128)))
        .collect();
    Some(Expr::constant(Constant::array(
        DynamicType::subscript_integer(),
        vec![values.len() as i64],
        values,
    )))
}

/// Compares corresponding known extents; on mismatch (or a rank
/// difference) emits one "not conformable" diagnostic and returns false.
pub fn check_conformance(
    ctx: &mut FoldingContext,
    left: &Shape,
    right: &Shape,
    left_name: &str,
    right_name: &str,
) -> bool {
    let conformable = left.len() == right.len()
        && left.iter().zip(right).all(|(a, b)| {
            match (
                a.as_ref().and_then(to_int64),
                b.as_ref().and_then(to_int64),
            ) {
                (Some(m), Some(n)) => m == n,
                _ => true,
            }
        });
    if !conformable {
        ctx.say_error(format!(
            "{} and {} are not conformable",
            left_name, right_name
        ));
    }
    conformable
}

pub fn get_shape(ctx: &mut FoldingContext, expr: &Expr) -> Option<Shape> {
    match &expr.kind {
        ExprKind::Constant(constant) => {
            Some(constant.shape.iter().map(|&e| Some(extent(e))).collect())
        }
        ExprKind::BozLiteral(_)
        | ExprKind::NullPointer
        | ExprKind::TypeParamInquiry(_)
        | ExprKind::ImpliedDoIndex(_)
        | ExprKind::DescriptorInquiry(_)
        | ExprKind::StructureConstructor(_) => Some(Shape::new()),
        ExprKind::Designator(designator) => designator_shape(ctx, designator),
        ExprKind::FunctionRef(_) => None,
        ExprKind::Unary(unary) => get_shape(ctx, &unary.operand),
        ExprKind::Binary(binary) => {
            if binary.right.rank() > 0 {
                get_shape(ctx, &binary.right)
            } else {
                get_shape(ctx, &binary.left)
            }
        }
        ExprKind::Relational(relation) => {
            if relation.right.rank() > 0 {
                get_shape(ctx, &relation.right)
            } else {
                get_shape(ctx, &relation.left)
            }
        }
        ExprKind::ArrayConstructor(array) => Some(vec![constructor_extent(ctx, &array.values)]),
    }
}

/// Extent of a rank-1 array constructor: the sum over items, where an
/// expression item contributes its linearized size and an implied DO
/// multiplies its body extent by the trip count. No triangular-nest
/// analysis: bounds referencing an implied-DO index give up.
fn constructor_extent(ctx: &mut FoldingContext, items: &[ArrayItem]) -> Option<Expr> {
    let mut total = extent(0);
    for item in items {
        let n = item_extent(ctx, item)?;
        total = fold(
            ctx,
            Expr::binary(
                DynamicType::subscript_integer(),
                BinaryOp::Add,
                total,
                n,
            ),
        );
    }
    Some(total)
}

fn item_extent(ctx: &mut FoldingContext, item: &ArrayItem) -> Option<Expr> {
    match item {
        ArrayItem::Expr(element) => {
            let shape = get_shape(ctx, element)?;
            get_size(ctx, shape)
        }
        ArrayItem::ImpliedDo(ido) => implied_do_extent(ctx, ido),
    }
}

fn implied_do_extent(ctx: &mut FoldingContext, ido: &ImpliedDo) -> Option<Expr> {
    if contains_any_implied_do_index(&ido.lower)
        || contains_any_implied_do_index(&ido.upper)
        || contains_any_implied_do_index(&ido.stride)
    {
        return None;
    }
    let body = constructor_extent(ctx, &ido.values)?;
    let trips = count_trips(
        ctx,
        (*ido.lower).clone(),
        (*ido.upper).clone(),
        (*ido.stride).clone(),
    );
    Some(fold(
        ctx,
        Expr::binary(
            DynamicType::subscript_integer(),
            BinaryOp::Multiply,
            body,
            trips,
        ),
    ))
}

fn designator_shape(ctx: &mut FoldingContext, designator: &Designator) -> Option<Shape> {
    let part = part_with_rank(designator);
    for selector in designator.selectors.iter().rev() {
        if let Selector::ArrayElement(subscripts) = selector {
            let mut shape = Shape::new();
            for (dimension, subscript) in subscripts.iter().enumerate() {
                match subscript {
                    Subscript::Index(index) => {
                        if index.rank() > 0 {
                            // A vector subscript contributes its own extent.
                            let vector_shape = get_shape(ctx, index)?;
                            shape.push(vector_shape.into_iter().next().flatten());
                        }
                    }
                    Subscript::Triplet(triplet) => {
                        shape.push(triplet_extent(ctx, part, dimension, triplet));
                    }
                }
            }
            return Some(shape);
        }
    }
    // Whole-object reference: the declared shape.
    Some(
        part.dims
            .iter()
            .map(|spec| {
                let lower = spec.lower.as_deref()?.clone();
                let upper = spec.upper.as_deref()?.clone();
                Some(count_trips(ctx, lower, upper, extent(1)))
            })
            .collect(),
    )
}

fn part_with_rank(designator: &Designator) -> &Symbol {
    for selector in designator.selectors.iter().rev() {
        if let Selector::Component(component) = selector {
            if component.rank() > 0 {
                return component;
            }
        }
    }
    &designator.base
}

fn triplet_extent(
    ctx: &mut FoldingContext,
    part: &Symbol,
    dimension: usize,
    triplet: &ff_core::expr::Triplet,
) -> Option<Expr> {
    let declared = part.dims.get(dimension);
    let lower = match &triplet.lower {
        Some(bound) => (**bound).clone(),
        None => declared?.lower.as_deref()?.clone(),
    };
    let upper = match &triplet.upper {
        Some(bound) => (**bound).clone(),
        None => declared?.upper.as_deref()?.clone(),
    };
    let stride = match &triplet.stride {
        Some(step) => (**step).clone(),
        None => extent(1),
    };
    Some(count_trips(ctx, lower, upper, stride))
}
