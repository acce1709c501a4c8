use ff_core::expr::{
    to_int64, ArrayConstructor, ArrayItem, BinaryOp, Designator, Expr, ExprKind, ImpliedDo,
    ImpliedDoIndex, Selector, Subscript, Triplet,
};
use ff_core::symbol::{ShapeSpec, Symbol};
use ff_core::types::DynamicType;
use ff_core::value::{IntValue, Scalar};
use ff_fold::shape::{as_constant_extents, count_trips, get_shape};
use ff_fold::FoldingContext;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn extent(value: i64) -> Expr {
    Expr::subscript_integer(value)
}

fn vector(name: &str, lower: i64, upper: i64) -> Arc<Symbol> {
    Arc::new(Symbol::variable(
        name,
        DynamicType::integer(4),
        vec![ShapeSpec {
            lower: Some(Box::new(extent(lower))),
            upper: Some(Box::new(extent(upper))),
        }],
    ))
}

#[test]
fn count_trips_clamps_to_zero_and_honors_strides() {
    let mut ctx = FoldingContext::default();
    let trips = count_trips(&mut ctx, extent(1), extent(10), extent(1));
    assert_eq!(to_int64(&trips), Some(10));

    let trips = count_trips(&mut ctx, extent(2), extent(8), extent(2));
    assert_eq!(to_int64(&trips), Some(4));

    let trips = count_trips(&mut ctx, extent(5), extent(1), extent(1));
    assert_eq!(to_int64(&trips), Some(0));

    let trips = count_trips(&mut ctx, extent(9), extent(1), extent(-3));
    assert_eq!(to_int64(&trips), Some(3));
}

#[test]
fn whole_array_designators_use_declared_bounds() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 10);
    let designator = Expr::designator(DynamicType::integer(4), Designator::bare(symbol));
    let shape = get_shape(&mut ctx, &designator).expect("declared shape is known");
    assert_eq!(as_constant_extents(&shape), Some(vec![10]));
}

#[test]
fn triplet_sections_count_their_trips() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 10);
    let section = Designator {
        base: symbol,
        selectors: vec![Selector::ArrayElement(vec![Subscript::Triplet(Triplet {
            lower: Some(Box::new(extent(2))),
            upper: Some(Box::new(extent(8))),
            stride: Some(Box::new(extent(2))),
        })])],
    };
    let expr = Expr::designator(DynamicType::integer(4), section);
    let shape = get_shape(&mut ctx, &expr).unwrap();
    assert_eq!(as_constant_extents(&shape), Some(vec![4]));
}

#[test]
fn omitted_triplet_bounds_default_to_the_declaration() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 10);
    let section = Designator {
        base: symbol,
        selectors: vec![Selector::ArrayElement(vec![Subscript::Triplet(Triplet {
            lower: None,
            upper: None,
            stride: None,
        })])],
    };
    let expr = Expr::designator(DynamicType::integer(4), section);
    let shape = get_shape(&mut ctx, &expr).unwrap();
    assert_eq!(as_constant_extents(&shape), Some(vec![10]));
}

#[test]
fn element_references_are_scalar() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 10);
    let element = Designator {
        base: symbol,
        selectors: vec![Selector::ArrayElement(vec![Subscript::Index(extent(3))])],
    };
    let expr = Expr::designator(DynamicType::integer(4), element);
    assert_eq!(expr.rank(), 0);
    let shape = get_shape(&mut ctx, &expr).unwrap();
    assert!(shape.is_empty());
}

#[test]
fn vector_subscripts_contribute_their_own_extent() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 10);
    let indices = Expr::constant(ff_core::expr::Constant::array(
        DynamicType::subscript_integer(),
        vec![4],
        (1..=4)
            .map(|v| Scalar::Int(IntValue::new(8, v)))
            .collect(),
    ));
    let gathered = Designator {
        base: symbol,
        selectors: vec![Selector::ArrayElement(vec![Subscript::Index(indices)])],
    };
    let expr = Expr::designator(DynamicType::integer(4), gathered);
    let shape = get_shape(&mut ctx, &expr).unwrap();
    assert_eq!(as_constant_extents(&shape), Some(vec![4]));
}

#[test]
fn operations_take_the_shape_of_their_array_operand() {
    let mut ctx = FoldingContext::default();
    let symbol = vector("a", 1, 7);
    let array = Expr::designator(DynamicType::integer(4), Designator::bare(symbol));
    let sum = Expr::binary(
        DynamicType::integer(4),
        BinaryOp::Add,
        Expr::integer(4, 1),
        array,
    );
    let shape = get_shape(&mut ctx, &sum).unwrap();
    assert_eq!(as_constant_extents(&shape), Some(vec![7]));
}

#[test]
fn constructor_extents_sum_items_and_multiply_trip_counts() {
    let mut ctx = FoldingContext::default();
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![
            ArrayItem::Expr(Expr::integer(4, 9)),
            ArrayItem::ImpliedDo(ImpliedDo {
                name: "i".to_string(),
                lower: Box::new(extent(1)),
                upper: Box::new(extent(5)),
                stride: Box::new(extent(2)),
                values: vec![ArrayItem::Expr(Expr::integer(4, 0))],
            }),
        ],
    };
    let expr = Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array));
    let shape = get_shape(&mut ctx, &expr).unwrap();
    // one leading element plus trips(1,5,2) = 3
    assert_eq!(as_constant_extents(&shape), Some(vec![4]));
}

#[test]
fn triangular_implied_do_bounds_give_an_unknown_extent() {
    let mut ctx = FoldingContext::default();
    let j = Expr::new(
        DynamicType::subscript_integer(),
        ExprKind::ImpliedDoIndex(ImpliedDoIndex {
            name: "j".to_string(),
        }),
    );
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![ArrayItem::ImpliedDo(ImpliedDo {
            name: "i".to_string(),
            lower: Box::new(extent(1)),
            upper: Box::new(j),
            stride: Box::new(extent(1)),
            values: vec![ArrayItem::Expr(Expr::integer(4, 0))],
        })],
    };
    let expr = Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array));
    let shape = get_shape(&mut ctx, &expr).unwrap();
    assert_eq!(shape.len(), 1);
    assert!(shape[0].is_none());
}
