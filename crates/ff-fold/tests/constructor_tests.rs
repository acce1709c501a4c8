use ff_core::expr::{
    ArrayConstructor, ArrayItem, BinaryOp, Designator, Expr, ExprKind, Selector,
    StructureConstructor, TypeParamInquiry,
};
use ff_core::symbol::{DerivedTypeSpec, Symbol, SymbolKind, TypeParamAttr};
use ff_core::types::DynamicType;
use ff_core::value::{CharValue, Scalar};
use ff_fold::{fold, FoldingContext, FoldingOptions};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn char_scalar(s: &str) -> Expr {
    Expr::scalar(Scalar::Char(CharValue::from_str(1, s)))
}

fn named_constant(name: &str, value: &str) -> Arc<Symbol> {
    Arc::new(Symbol::parameter(
        name,
        DynamicType::character_with_len(1, value.len() as i64),
        char_scalar(value),
    ))
}

fn substring(base: Arc<Symbol>, lower: Option<i64>, upper: Option<i64>) -> Expr {
    let designator = Designator {
        base,
        selectors: vec![Selector::Substring {
            lower: lower.map(|v| Box::new(Expr::subscript_integer(v))),
            upper: upper.map(|v| Box::new(Expr::subscript_integer(v))),
        }],
    };
    Expr::designator(DynamicType::character(1), designator)
}

fn char_value(expr: &Expr) -> Option<String> {
    Some(
        expr.as_constant()?
            .scalar_value()?
            .as_char()?
            .to_string(),
    )
}

#[test]
fn substring_of_a_named_constant_folds_to_its_value() {
    let mut ctx = FoldingContext::default();
    let greeting = named_constant("greeting", "fortran");
    let folded = fold(&mut ctx, substring(greeting.clone(), Some(1), Some(4)));
    assert_eq!(char_value(&folded), Some("fort".to_string()));

    // Omitted bounds default to the full extent.
    let folded = fold(&mut ctx, substring(greeting, None, None));
    assert_eq!(char_value(&folded), Some("fortran".to_string()));
}

#[test]
fn empty_substring_folds_even_without_a_known_parent() {
    let mut ctx = FoldingContext::default();
    let variable = Arc::new(Symbol::variable(
        "buffer",
        DynamicType::character_with_len(1, 16),
        Vec::new(),
    ));
    let folded = fold(&mut ctx, substring(variable, Some(5), Some(4)));
    assert_eq!(char_value(&folded), Some(String::new()));
}

#[test]
fn variable_designators_stay_opaque() {
    let mut ctx = FoldingContext::default();
    let variable = Arc::new(Symbol::variable(
        "x",
        DynamicType::integer(4),
        Vec::new(),
    ));
    let expr = Expr::designator(DynamicType::integer(4), Designator::bare(variable));
    let folded = fold(&mut ctx, expr.clone());
    assert_eq!(folded, expr);
}

#[test]
fn bare_type_parameter_inquiries_resolve_through_the_pdt_instance() {
    let param = Arc::new(Symbol {
        name: "k".to_string(),
        ty: Some(DynamicType::integer(4)),
        dims: Vec::new(),
        kind: SymbolKind::TypeParam {
            attr: TypeParamAttr::Kind,
            init: Some(Box::new(Expr::integer(4, 2))),
        },
    });
    let mut spec = DerivedTypeSpec::new("matrix");
    spec.param_symbols.push(param.clone());
    spec.param_values
        .push(("k".to_string(), Expr::integer(4, 8)));

    let mut ctx =
        FoldingContext::new(FoldingOptions::default()).with_pdt_instance(Arc::new(spec));
    let inquiry = Expr::new(
        DynamicType::integer(4),
        ExprKind::TypeParamInquiry(TypeParamInquiry {
            base: None,
            parameter: param.clone(),
        }),
    );
    // The explicit instance value wins over the declared default.
    let folded = fold(&mut ctx, inquiry);
    assert_eq!(ff_core::expr::to_int64(&folded), Some(8));

    let mut spec = DerivedTypeSpec::new("matrix");
    spec.param_symbols.push(param.clone());
    let mut ctx =
        FoldingContext::new(FoldingOptions::default()).with_pdt_instance(Arc::new(spec));
    let inquiry = Expr::new(
        DynamicType::integer(4),
        ExprKind::TypeParamInquiry(TypeParamInquiry {
            base: None,
            parameter: param,
        }),
    );
    let folded = fold(&mut ctx, inquiry);
    assert_eq!(ff_core::expr::to_int64(&folded), Some(2));
}

#[test]
fn structure_constructors_fold_components_but_stay_constructors() {
    let component = Arc::new(Symbol {
        name: "n".to_string(),
        ty: Some(DynamicType::integer(4)),
        dims: Vec::new(),
        kind: SymbolKind::Component,
    });
    let mut spec = DerivedTypeSpec::new("point");
    spec.components.push(component.clone());
    let spec = Arc::new(spec);

    let mut ctx = FoldingContext::default();
    let value = Expr::binary(
        DynamicType::integer(4),
        BinaryOp::Add,
        Expr::integer(4, 1),
        Expr::integer(4, 2),
    );
    let expr = Expr::new(
        DynamicType::derived(spec.clone()),
        ExprKind::StructureConstructor(StructureConstructor {
            spec,
            values: vec![(component, value)],
        }),
    );
    let folded = fold(&mut ctx, expr);
    match &folded.kind {
        ExprKind::StructureConstructor(structure) => {
            assert_eq!(ff_core::expr::to_int64(&structure.values[0].1), Some(3));
        }
        other => panic!("structure constructor collapsed: {:?}", other),
    }
}

#[test]
fn character_constructors_normalize_elements_to_one_length() {
    let mut ctx = FoldingContext::default();
    let array = ArrayConstructor {
        ty: DynamicType::character(1),
        len: Some(Box::new(Expr::subscript_integer(3))),
        values: vec![
            ArrayItem::Expr(char_scalar("a")),
            ArrayItem::Expr(char_scalar("abcdef")),
        ],
    };
    let folded = fold(
        &mut ctx,
        Expr::new(DynamicType::character(1), ExprKind::ArrayConstructor(array)),
    );
    let constant = folded.as_constant().expect("constructor folds");
    assert_eq!(constant.ty.char_len, Some(3));
    let strings: Vec<String> = constant
        .values
        .iter()
        .map(|s| s.as_char().unwrap().to_string())
        .collect();
    assert_eq!(strings, vec!["a  ".to_string(), "abc".to_string()]);
}

#[test]
fn stray_implied_do_indices_outside_their_loop_stay_unreduced() {
    let mut ctx = FoldingContext::default();
    let loose = Expr::new(
        DynamicType::subscript_integer(),
        ExprKind::ImpliedDoIndex(ff_core::expr::ImpliedDoIndex {
            name: "i".to_string(),
        }),
    );
    let folded = fold(&mut ctx, loose.clone());
    assert_eq!(folded, loose);
}
