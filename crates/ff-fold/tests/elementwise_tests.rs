use ff_core::expr::{
    ArrayConstructor, ArrayItem, BinaryOp, Constant, Expr, ExprKind, ImpliedDo, ImpliedDoIndex,
};
use ff_core::types::DynamicType;
use ff_core::value::{IntValue, Scalar};
use ff_fold::{fold, FoldingContext};
use pretty_assertions::assert_eq;

fn int4(value: i64) -> Expr {
    Expr::integer(4, value as i128)
}

fn int4_array(values: &[i64]) -> Expr {
    let scalars: Vec<Scalar> = values
        .iter()
        .map(|&v| Scalar::Int(IntValue::new(4, v as i128)))
        .collect();
    Expr::constant(Constant::array(
        DynamicType::integer(4),
        vec![values.len() as i64],
        scalars,
    ))
}

fn as_int_elements(expr: &Expr) -> Option<(Vec<i64>, Vec<i64>)> {
    let constant = expr.as_constant()?;
    let values = constant
        .values
        .iter()
        .map(|s| s.to_int64())
        .collect::<Option<Vec<_>>>()?;
    Some((constant.shape.clone(), values))
}

fn counted_sequence(name: &str, lower: i64, upper: i64) -> Expr {
    // [(name, name = lower, upper)]
    let index = Expr::new(
        DynamicType::integer(4),
        ExprKind::ImpliedDoIndex(ImpliedDoIndex {
            name: name.to_string(),
        }),
    );
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![ArrayItem::ImpliedDo(ImpliedDo {
            name: name.to_string(),
            lower: Box::new(Expr::subscript_integer(lower)),
            upper: Box::new(Expr::subscript_integer(upper)),
            stride: Box::new(Expr::subscript_integer(1)),
            values: vec![ArrayItem::Expr(index)],
        })],
    };
    Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array))
}

#[test]
fn conformable_arrays_add_elementwise() {
    let mut ctx = FoldingContext::default();
    let sum = fold(
        &mut ctx,
        Expr::binary(
            DynamicType::integer(4),
            BinaryOp::Add,
            int4_array(&[1, 2, 3]),
            int4_array(&[10, 20, 30]),
        ),
    );
    assert_eq!(as_int_elements(&sum), Some((vec![3], vec![11, 22, 33])));
    assert!(ctx.messages.is_empty());
}

#[test]
fn scalar_broadcast_preserves_the_array_shape() {
    let mut ctx = FoldingContext::default();
    let product = fold(
        &mut ctx,
        Expr::binary(
            DynamicType::integer(4),
            BinaryOp::Multiply,
            int4_array(&[1, 2, 3, 4]),
            int4(3),
        ),
    );
    assert_eq!(
        as_int_elements(&product),
        Some((vec![4], vec![3, 6, 9, 12]))
    );

    let flipped = fold(
        &mut ctx,
        Expr::binary(
            DynamicType::integer(4),
            BinaryOp::Subtract,
            int4(10),
            int4_array(&[1, 2, 3]),
        ),
    );
    assert_eq!(as_int_elements(&flipped), Some((vec![3], vec![9, 8, 7])));
}

#[test]
fn nonconformable_operands_stay_unreduced_with_one_diagnostic() {
    let mut ctx = FoldingContext::default();
    let folded = fold(
        &mut ctx,
        Expr::binary(
            DynamicType::integer(4),
            BinaryOp::Add,
            int4_array(&[1, 2, 3]),
            int4_array(&[10, 20]),
        ),
    );
    assert!(matches!(folded.kind, ExprKind::Binary(_)));
    assert_eq!(ctx.messages.count_containing("not conformable"), 1);
}

#[test]
fn implied_do_sequence_folds_and_broadcasts() {
    let mut ctx = FoldingContext::default();
    let doubled = fold(
        &mut ctx,
        Expr::binary(
            DynamicType::integer(4),
            BinaryOp::Multiply,
            counted_sequence("i", 1, 5),
            int4(2),
        ),
    );
    assert_eq!(
        as_int_elements(&doubled),
        Some((vec![5], vec![2, 4, 6, 8, 10]))
    );
    assert!(ctx.messages.is_empty());
}

#[test]
fn negative_stride_iterates_downward() {
    let mut ctx = FoldingContext::default();
    let index = Expr::new(
        DynamicType::integer(4),
        ExprKind::ImpliedDoIndex(ImpliedDoIndex {
            name: "k".to_string(),
        }),
    );
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![ArrayItem::ImpliedDo(ImpliedDo {
            name: "k".to_string(),
            lower: Box::new(Expr::subscript_integer(5)),
            upper: Box::new(Expr::subscript_integer(1)),
            stride: Box::new(Expr::subscript_integer(-2)),
            values: vec![ArrayItem::Expr(index)],
        })],
    };
    let folded = fold(
        &mut ctx,
        Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array)),
    );
    assert_eq!(as_int_elements(&folded), Some((vec![3], vec![5, 3, 1])));
}

#[test]
fn zero_stride_abandons_the_constructor() {
    let mut ctx = FoldingContext::default();
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![ArrayItem::ImpliedDo(ImpliedDo {
            name: "i".to_string(),
            lower: Box::new(Expr::subscript_integer(1)),
            upper: Box::new(Expr::subscript_integer(3)),
            stride: Box::new(Expr::subscript_integer(0)),
            values: vec![ArrayItem::Expr(int4(9))],
        })],
    };
    let folded = fold(
        &mut ctx,
        Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array)),
    );
    assert!(matches!(folded.kind, ExprKind::ArrayConstructor(_)));
}

#[test]
fn nested_implied_dos_fold_in_column_major_order() {
    let mut ctx = FoldingContext::default();
    // [((10*j + i, i = 1, 2), j = 1, 2)]
    let i = Expr::new(
        DynamicType::integer(4),
        ExprKind::ImpliedDoIndex(ImpliedDoIndex {
            name: "i".to_string(),
        }),
    );
    let j = Expr::new(
        DynamicType::integer(4),
        ExprKind::ImpliedDoIndex(ImpliedDoIndex {
            name: "j".to_string(),
        }),
    );
    let body = Expr::binary(
        DynamicType::integer(4),
        BinaryOp::Add,
        Expr::binary(DynamicType::integer(4), BinaryOp::Multiply, int4(10), j),
        i,
    );
    let inner = ImpliedDo {
        name: "i".to_string(),
        lower: Box::new(Expr::subscript_integer(1)),
        upper: Box::new(Expr::subscript_integer(2)),
        stride: Box::new(Expr::subscript_integer(1)),
        values: vec![ArrayItem::Expr(body)],
    };
    let outer = ImpliedDo {
        name: "j".to_string(),
        lower: Box::new(Expr::subscript_integer(1)),
        upper: Box::new(Expr::subscript_integer(2)),
        stride: Box::new(Expr::subscript_integer(1)),
        values: vec![ArrayItem::ImpliedDo(inner)],
    };
    let array = ArrayConstructor {
        ty: DynamicType::integer(4),
        len: None,
        values: vec![ArrayItem::ImpliedDo(outer)],
    };
    let folded = fold(
        &mut ctx,
        Expr::new(DynamicType::integer(4), ExprKind::ArrayConstructor(array)),
    );
    assert_eq!(
        as_int_elements(&folded),
        Some((vec![4], vec![11, 12, 21, 22]))
    );
}

#[test]
fn relational_on_arrays_folds_to_a_logical_array() {
    let mut ctx = FoldingContext::default();
    let relation = ff_core::expr::relate(
        ff_core::expr::RelationalOperator::Gt,
        int4_array(&[1, 5, 3]),
        int4_array(&[2, 4, 3]),
    )
    .unwrap();
    let folded = fold(&mut ctx, relation);
    let constant = folded.as_constant().expect("folded to a constant");
    let truth: Vec<bool> = constant
        .values
        .iter()
        .map(|s| s.as_logical().unwrap().is_true())
        .collect();
    assert_eq!(truth, vec![false, true, false]);
}
