//! Folding of the "leaf-like" node kinds: designators (including
//! substrings of named constants), implied-DO indices, type-parameter
//! inquiries, array constructors, and structure constructors.

use super::{fold, fold_in_place};
use crate::context::FoldingContext;
use ff_core::expr::{
    scalar_constant_value, to_int64, ArrayConstructor, ArrayItem, Constant, Designator, Expr,
    ExprKind, ImpliedDo, ImpliedDoIndex, Selector, StructureConstructor, Subscript,
    TypeParamInquiry,
};
use ff_core::types::{DynamicType, TypeCategory, SUBSCRIPT_INTEGER_KIND};
use ff_core::value::{CharValue, IntValue, Scalar};

/// An active implied-DO index folds to its current iteration value.
pub(super) fn fold_implied_do_index(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    index: ImpliedDoIndex,
) -> Expr {
    if let Some(value) = ctx.implied_do(&index.name) {
        let kind = ty
            .as_ref()
            .map(|t| t.kind)
            .unwrap_or(SUBSCRIPT_INTEGER_KIND);
        return Expr::scalar(Scalar::Int(IntValue::new(kind, value as i128)));
    }
    Expr {
        ty,
        kind: ExprKind::ImpliedDoIndex(index),
    }
}

/// A bare type-parameter inquiry resolves against the parameterized
/// derived type instance being analyzed: an explicit value recorded on
/// the instance wins, else the parameter's declared initialization.
pub(super) fn fold_type_param_inquiry(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    mut inquiry: TypeParamInquiry,
) -> Expr {
    if let Some(base) = &mut inquiry.base {
        fold_designator_exprs(ctx, base);
        return Expr {
            ty,
            kind: ExprKind::TypeParamInquiry(inquiry),
        };
    }
    if let Some(instance) = ctx.pdt_instance.clone() {
        let name = inquiry.parameter.name.as_str();
        let resolved = instance.explicit_param(name).cloned().or_else(|| {
            instance
                .param_symbol(name)
                .and_then(|symbol| match &symbol.kind {
                    ff_core::symbol::SymbolKind::TypeParam { init, .. } => init.as_deref().cloned(),
                    _ => None,
                })
        });
        if let Some(value) = resolved {
            let target = ty.clone().unwrap_or_else(DynamicType::subscript_integer);
            return fold(ctx, Expr::convert(target, value));
        }
    }
    Expr {
        ty,
        kind: ExprKind::TypeParamInquiry(inquiry),
    }
}

/// Folds the expressions inside a reference path: subscripts, triplet
/// bounds, cosubscripts, and substring bounds.
fn fold_designator_exprs(ctx: &mut FoldingContext, designator: &mut Designator) {
    for selector in &mut designator.selectors {
        match selector {
            Selector::Component(_) => {}
            Selector::ArrayElement(subscripts) => {
                for subscript in subscripts {
                    match subscript {
                        Subscript::Index(index) => fold_in_place(ctx, index),
                        Subscript::Triplet(triplet) => {
                            for bound in [&mut triplet.lower, &mut triplet.upper, &mut triplet.stride]
                                .into_iter()
                                .flatten()
                            {
                                fold_in_place(ctx, bound);
                            }
                        }
                    }
                }
            }
            Selector::CoarrayImage(images) => {
                for image in images {
                    fold_in_place(ctx, image);
                }
            }
            Selector::Substring { lower, upper } => {
                for bound in [lower, upper].into_iter().flatten() {
                    fold_in_place(ctx, bound);
                }
            }
        }
    }
}

/// Designators stay opaque except for a CHARACTER substring of a named
/// constant, which reduces to the selected value (or to the empty
/// constant when the selection is empty).
pub(super) fn fold_designator(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    mut designator: Designator,
) -> Expr {
    fold_designator_exprs(ctx, &mut designator);
    if let Some(folded) = fold_constant_substring(ctx, ty.as_ref(), &designator) {
        return folded;
    }
    Expr {
        ty,
        kind: ExprKind::Designator(designator),
    }
}

fn fold_constant_substring(
    ctx: &mut FoldingContext,
    ty: Option<&DynamicType>,
    designator: &Designator,
) -> Option<Expr> {
    let ty = ty?;
    if ty.category != TypeCategory::Character {
        return None;
    }
    let [Selector::Substring { lower, upper }] = designator.selectors.as_slice() else {
        return None;
    };
    let lower = match lower {
        Some(bound) => to_int64(bound)?,
        None => 1,
    };
    let parent = designator
        .base
        .parameter_value()
        .map(|value| fold(ctx, value.clone()));
    let parent_char = parent
        .as_ref()
        .and_then(scalar_constant_value)
        .and_then(Scalar::as_char);
    let upper = match upper {
        Some(bound) => to_int64(bound)?,
        None => parent_char?.len(),
    };
    if upper < lower {
        return Some(Expr::scalar(Scalar::Char(CharValue::empty(ty.kind))));
    }
    let value = parent_char?.substring(lower, upper)?;
    Some(Expr::scalar(Scalar::Char(value)))
}

/// Array constructor folding: each item either contributes constant
/// elements in column-major order or the whole constructor is left
/// unchanged. Implied DOs iterate over freshly folded copies of their
/// bodies; a zero stride abandons folding.
pub(super) fn fold_array_constructor(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    mut array: ArrayConstructor,
) -> Expr {
    if let Some(len) = &mut array.len {
        fold_in_place(ctx, len);
    }
    let mut elements = Vec::new();
    if !fold_items(ctx, &mut elements, &array.values) {
        return Expr {
            ty,
            kind: ExprKind::ArrayConstructor(array),
        };
    }
    let mut element_ty = array.ty.clone();
    if element_ty.category == TypeCategory::Character {
        // The constructor imposes one length on all of its elements.
        let length = array
            .len
            .as_deref()
            .and_then(to_int64)
            .or(element_ty.char_len)
            .or_else(|| {
                elements
                    .first()
                    .and_then(Scalar::as_char)
                    .map(CharValue::len)
            });
        let Some(length) = length else {
            return Expr {
                ty,
                kind: ExprKind::ArrayConstructor(array),
            };
        };
        element_ty.char_len = Some(length);
        for element in &mut elements {
            if let Scalar::Char(c) = element {
                if c.len() != length {
                    *c = c.set_length(length);
                }
            }
        }
    }
    let n = elements.len() as i64;
    Expr::constant(Constant::array(element_ty, vec![n], elements))
}

fn fold_items(ctx: &mut FoldingContext, out: &mut Vec<Scalar>, items: &[ArrayItem]) -> bool {
    for item in items {
        match item {
            ArrayItem::Expr(element) => {
                let folded = fold(ctx, element.clone());
                match folded.kind {
                    ExprKind::Constant(constant) => out.extend(constant.values),
                    _ => return false,
                }
            }
            ArrayItem::ImpliedDo(ido) => {
                if !fold_implied_do(ctx, out, ido) {
                    return false;
                }
            }
        }
    }
    true
}

fn fold_implied_do(ctx: &mut FoldingContext, out: &mut Vec<Scalar>, ido: &ImpliedDo) -> bool {
    let lower = fold(ctx, (*ido.lower).clone());
    let upper = fold(ctx, (*ido.upper).clone());
    let stride = fold(ctx, (*ido.stride).clone());
    let (Some(start), Some(end), Some(step)) =
        (to_int64(&lower), to_int64(&upper), to_int64(&stride))
    else {
        return false;
    };
    if step == 0 {
        return false;
    }
    ctx.start_implied_do(&ido.name, start);
    let mut at = start;
    let mut ok = true;
    while (step > 0 && at <= end) || (step < 0 && at >= end) {
        ctx.set_implied_do(&ido.name, at);
        if !fold_items(ctx, out, &ido.values) {
            ok = false;
            break;
        }
        at += step;
    }
    // The pop balances the push on every exit, including abandonment.
    ctx.end_implied_do(&ido.name);
    ok
}

/// Structure constructors fold their component values in place but are
/// never collapsed into a derived-type constant here.
pub(super) fn fold_structure_constructor(
    ctx: &mut FoldingContext,
    ty: Option<DynamicType>,
    mut structure: StructureConstructor,
) -> Expr {
    for (_, value) in &mut structure.values {
        fold_in_place(ctx, value);
    }
    Expr {
        ty,
        kind: ExprKind::StructureConstructor(structure),
    }
}
