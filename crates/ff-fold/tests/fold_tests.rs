use ff_core::expr::{BinaryOp, Expr, ExprKind, Ordering, RelationalOperator, UnaryOp};
use ff_core::types::DynamicType;
use ff_core::value::{IntValue, RealValue, Scalar};
use ff_fold::{fold, FoldingContext};
use pretty_assertions::assert_eq;

fn ctx() -> FoldingContext {
    FoldingContext::default()
}

fn int4(value: i64) -> Expr {
    Expr::integer(4, value as i128)
}

fn real4(value: f64) -> Expr {
    Expr::scalar(Scalar::Real(RealValue::new(4, value)))
}

fn iop(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::binary(DynamicType::integer(4), op, left, right)
}

fn int_value(expr: &Expr) -> Option<i64> {
    ff_core::expr::to_int64(expr)
}

#[test]
fn arithmetic_on_literals_reduces_to_a_constant() {
    let mut ctx = ctx();
    let expr = iop(
        BinaryOp::Multiply,
        iop(BinaryOp::Add, int4(2), int4(3)),
        int4(4),
    );
    let folded = fold(&mut ctx, expr);
    assert_eq!(int_value(&folded), Some(20));
    assert!(ctx.messages.is_empty());
}

#[test]
fn integer_overflow_wraps_and_is_diagnosed_once() {
    let mut ctx = ctx();
    let max = IntValue::max_value(4).value();
    let folded = fold(&mut ctx, iop(BinaryOp::Add, int4(max as i64), int4(1)));
    assert_eq!(
        int_value(&folded),
        Some(IntValue::min_value(4).value() as i64)
    );
    assert_eq!(
        ctx.messages.count_containing("INTEGER(4) addition overflowed"),
        1
    );
}

#[test]
fn division_hazards_are_reported_with_the_kind() {
    let mut ctx = ctx();
    fold(&mut ctx, iop(BinaryOp::Divide, int4(7), int4(0)));
    assert_eq!(ctx.messages.count_containing("INTEGER(4) division by zero"), 1);

    let mut ctx = FoldingContext::default();
    let min = IntValue::min_value(4).value() as i64;
    let folded = fold(&mut ctx, iop(BinaryOp::Divide, int4(min), int4(-1)));
    assert_eq!(int_value(&folded), Some(min));
    assert_eq!(
        ctx.messages.count_containing("INTEGER(4) division overflowed"),
        1
    );
}

#[test]
fn power_identities_have_their_own_diagnostics() {
    let mut ctx = ctx();
    fold(&mut ctx, iop(BinaryOp::Power, int4(0), int4(0)));
    assert_eq!(
        ctx.messages.count_containing("INTEGER(4) 0**0 is not defined"),
        1
    );

    let mut ctx = FoldingContext::default();
    fold(&mut ctx, iop(BinaryOp::Power, int4(0), int4(-1)));
    assert_eq!(
        ctx.messages
            .count_containing("INTEGER(4) zero to negative power"),
        1
    );
}

#[test]
fn real_division_by_zero_folds_to_infinity_with_one_flag_message() {
    let mut ctx = ctx();
    let expr = Expr::binary(DynamicType::real(4), BinaryOp::Divide, real4(1.0), real4(0.0));
    let folded = fold(&mut ctx, expr);
    let value = folded
        .as_constant()
        .and_then(|c| c.scalar_value())
        .and_then(Scalar::as_real)
        .expect("folded to a real constant");
    assert_eq!(value.value(), f64::INFINITY);
    assert_eq!(ctx.messages.count_containing("division by zero on division"), 1);
}

#[test]
fn folding_is_idempotent_and_preserves_the_type() {
    let mut ctx = ctx();
    let expr = iop(
        BinaryOp::Subtract,
        iop(BinaryOp::Multiply, int4(6), int4(7)),
        int4(2),
    );
    let ty = expr.ty.clone();
    let once = fold(&mut ctx, expr);
    assert_eq!(once.ty, ty);
    let twice = fold(&mut ctx, once.clone());
    assert_eq!(once, twice);
}

#[test]
fn parentheses_survive_folding_even_around_constants() {
    let mut ctx = ctx();
    let folded = fold(
        &mut ctx,
        Expr::parenthesized(iop(BinaryOp::Add, int4(1), int4(1))),
    );
    match &folded.kind {
        ExprKind::Unary(unary) => {
            assert_eq!(unary.op, UnaryOp::Parentheses);
            assert_eq!(int_value(&unary.operand), Some(2));
        }
        other => panic!("parentheses were dropped: {:?}", other),
    }
}

#[test]
fn negation_of_the_most_negative_value_is_flagged() {
    let mut ctx = ctx();
    let min = IntValue::min_value(4).value() as i64;
    let folded = fold(
        &mut ctx,
        Expr::unary(DynamicType::integer(4), UnaryOp::Negate, int4(min)),
    );
    assert_eq!(int_value(&folded), Some(min));
    assert_eq!(ctx.messages.count_containing("INTEGER(4) negation overflowed"), 1);
}

#[test]
fn extremum_prefers_the_first_operand_on_nan() {
    let mut ctx = ctx();
    let expr = Expr::binary(
        DynamicType::real(4),
        BinaryOp::Extremum {
            ordering: Ordering::Greater,
        },
        real4(f64::NAN),
        real4(1.0),
    );
    let folded = fold(&mut ctx, expr);
    let value = folded
        .as_constant()
        .and_then(|c| c.scalar_value())
        .and_then(Scalar::as_real)
        .unwrap();
    assert!(value.is_nan());

    let mut ctx = FoldingContext::default();
    let expr = Expr::binary(
        DynamicType::integer(4),
        BinaryOp::Extremum {
            ordering: Ordering::Less,
        },
        int4(5),
        int4(3),
    );
    assert_eq!(int_value(&fold(&mut ctx, expr)), Some(3));
}

#[test]
fn relational_comparison_yields_the_fixed_logical_kind() {
    let mut ctx = ctx();
    let folded = fold(&mut ctx, Expr::relational(RelationalOperator::Lt, int4(1), int4(2)));
    let value = folded
        .as_constant()
        .and_then(|c| c.scalar_value())
        .and_then(Scalar::as_logical)
        .expect("folded to a logical constant");
    assert!(value.is_true());
    assert_eq!(value.kind(), ff_core::types::LOGICAL_RESULT_KIND);
}

#[test]
fn unordered_comparison_satisfies_only_inequality() {
    let mut ctx = ctx();
    let eq = fold(
        &mut ctx,
        Expr::relational(RelationalOperator::Eq, real4(f64::NAN), real4(1.0)),
    );
    let ne = fold(
        &mut ctx,
        Expr::relational(RelationalOperator::Ne, real4(f64::NAN), real4(1.0)),
    );
    let truth = |e: &Expr| {
        e.as_constant()
            .and_then(|c| c.scalar_value())
            .and_then(Scalar::as_logical)
            .map(|l| l.is_true())
    };
    assert_eq!(truth(&eq), Some(false));
    assert_eq!(truth(&ne), Some(true));
}

#[test]
fn narrowing_conversion_round_trips_values_in_range() {
    let mut ctx = ctx();
    let wide = Expr::integer(8, 1000);
    let narrowed = Expr::convert(DynamicType::integer(2), wide.clone());
    let widened = Expr::convert(DynamicType::integer(8), narrowed);
    let folded = fold(&mut ctx, widened);
    assert_eq!(int_value(&folded), Some(1000));
    assert!(ctx.messages.is_empty());
}

#[test]
fn real_to_integer_conversion_reports_overflow_with_both_kinds() {
    let mut ctx = ctx();
    let expr = Expr::convert(DynamicType::integer(2), real4(1.0e9));
    fold(&mut ctx, expr);
    assert_eq!(
        ctx.messages
            .count_containing("REAL(4) to INTEGER(2) conversion overflowed"),
        1
    );
}

#[test]
fn concat_and_set_length_fold_character_constants() {
    use ff_core::value::CharValue;
    let mut ctx = ctx();
    let hello = Expr::scalar(Scalar::Char(CharValue::from_str(1, "Hello")));
    let world = Expr::scalar(Scalar::Char(CharValue::from_str(1, ", world")));
    let concat = Expr::binary(
        DynamicType::character_with_len(1, 12),
        BinaryOp::Concat,
        hello,
        world,
    );
    let padded = Expr::binary(
        DynamicType::character_with_len(1, 15),
        BinaryOp::SetLength,
        concat,
        Expr::subscript_integer(15),
    );
    let folded = fold(&mut ctx, padded);
    let value = folded
        .as_constant()
        .and_then(|c| c.scalar_value())
        .and_then(Scalar::as_char)
        .unwrap();
    assert_eq!(value.to_string(), "Hello, world   ");
    assert_eq!(value.len(), 15);
}
