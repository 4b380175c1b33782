//! Script parser tests
//!
//! Parsed expressions are compared through their fully parenthesized
//! rendering, which makes precedence and associativity visible.

use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use tabula_ast::{Expression, Literal, Span};
use tabula_parser::{MAX_NESTING, parse};

fn render(source: &str) -> String {
    parse(source)
        .unwrap_or_else(|e| panic!("{}: {}", source, e))
        .to_string()
}

// === Literals ===

#[rstest]
#[case("42", Literal::Integer(42))]
#[case("3.25", Literal::Decimal(Decimal::new(325, 2)))]
#[case("1e3", Literal::Decimal(Decimal::new(1000, 0)))]
#[case("'text'", Literal::String("text".to_string()))]
#[case("\"double\"", Literal::String("double".to_string()))]
#[case("true", Literal::Boolean(true))]
#[case("false", Literal::Boolean(false))]
#[case("null", Literal::Null)]
fn test_literals(#[case] source: &str, #[case] expected: Literal) {
    assert_eq!(parse(source).unwrap(), Expression::Literal(expected));
}

#[test]
fn test_this() {
    assert_eq!(parse(" this ").unwrap(), Expression::This);
}

// === Precedence ===

#[rstest]
#[case("1 + 2 * 3", "(1 + (2 * 3))")]
#[case("(1 + 2) * 3", "((1 + 2) * 3)")]
#[case("1 - 2 - 3", "((1 - 2) - 3)")]
#[case("10 / 2 % 3", "((10 / 2) % 3)")]
#[case("a() || b() && c()", "(a() || (b() && c()))")]
#[case("1 < 2 == true", "((1 < 2) == true)")]
#[case("1 <= 2 != 3 >= 4", "((1 <= 2) != (3 >= 4))")]
#[case("!weekend() && true", "((!weekend()) && true)")]
#[case("-1 + 2", "((-1) + 2)")]
#[case("a() ? 1 : b() ? 2 : 3", "(a() ? 1 : (b() ? 2 : 3))")]
#[case("x() == null ? 'none' : 'some'", "((x() == null) ? 'none' : 'some')")]
fn test_precedence(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(render(source), expected);
}

// === Calls ===

#[test]
fn test_method_chain() {
    assert_eq!(
        render("$('Participants:birth').dayOfYear().format('yyyy')"),
        "$('Participants:birth').dayOfYear().format('yyyy')"
    );
}

#[test]
fn test_call_arguments() {
    assert_eq!(
        render("after(newValue('2011-11-01', 'date'), now())"),
        "after(newValue('2011-11-01', 'date'), now())"
    );
    assert_eq!(render("now( )"), "now()");
    assert_eq!(render("1.year()"), "1.year()");
}

#[test]
fn test_call_span_points_at_name() {
    let Expression::Call(call) = parse("  now().year()").unwrap() else {
        panic!("expected a call");
    };
    assert_eq!(call.name, "year");
    assert_eq!(call.span, Span::new(8, 12));
    let Some(receiver) = call.receiver else {
        panic!("expected a receiver");
    };
    let Expression::Call(now) = *receiver else {
        panic!("expected a call receiver");
    };
    assert_eq!(now.span, Span::new(2, 5));
}

// === Errors ===

#[rstest]
#[case("")]
#[case("1 +")]
#[case("(1")]
#[case("foo")]
#[case("'open")]
#[case("1 2")]
#[case("a() = b()")]
#[case("x().")]
#[case("99999999999999999999")]
fn test_syntax_errors(#[case] source: &str) {
    assert!(parse(source).is_err(), "{:?} should not parse", source);
}

#[test]
fn test_error_location() {
    let err = parse("year() +\n  * 2").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.column, 3);
}

// === Nesting ===

fn parenthesized(depth: usize) -> String {
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_nesting_limit() {
    assert_eq!(render(&parenthesized(MAX_NESTING - 1)), "1");

    let err = parse(&parenthesized(MAX_NESTING)).unwrap_err();
    assert!(err.message.contains("nesting"), "{}", err.message);
    assert_eq!(err.offset, MAX_NESTING);
}

#[rstest]
#[case(parenthesized(10_000))]
#[case(format!("{}1", "-".repeat(10_000)))]
#[case(format!("{}true", "!".repeat(10_000)))]
#[case(format!("{}1{}", "year(".repeat(10_000), ")".repeat(10_000)))]
#[case(format!("1{}", ".year()".repeat(10_000)))]
#[case(format!("{}1", "true ? 1 : ".repeat(10_000)))]
fn test_deep_input_is_rejected(#[case] source: String) {
    let err = parse(&source).unwrap_err();
    assert!(err.message.contains("nesting"), "{}", err.message);
}
