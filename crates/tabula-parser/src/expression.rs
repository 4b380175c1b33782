//! Expression parser using recursive descent with precedence climbing
//!
//! Precedence, lowest first: `?:`, `||`, `&&`, `== !=`, `< <= > >=`, `+ -`,
//! `* / %`, unary `! -`, method calls. Binary operators are left-associative;
//! the conditional operator is right-associative.
//!
//! Parentheses, call arguments, conditional branches, unary operators and
//! method calls each count as one nesting level; input nested deeper than
//! [`crate::MAX_NESTING`] is rejected. Operator chains are parsed in a loop and
//! do not nest.

use crate::ParseError;
use crate::combinators::{
    Input, PResult, descend, expect, identifier, input, lit, nested, number, op, string_literal,
    ws,
};
use tabula_ast::{BinaryOp, Expression, Literal, Span, UnaryOp};
use winnow::combinator::{alt, cut_err, opt, separated};
use winnow::error::{StrContext, StrContextValue};
use winnow::prelude::*;

/// Parse a whole script into one expression
pub fn parse(source: &str) -> Result<Expression, ParseError> {
    script.parse(input(source)).map_err(|e| {
        let message = e.inner().to_string();
        let message = if message.is_empty() {
            "unexpected input".to_string()
        } else {
            message.replace('\n', "; ")
        };
        ParseError::at(source, e.offset(), message)
    })
}

fn script(input: &mut Input<'_>) -> PResult<Expression> {
    let expr = expression(input)?;
    ws(input)?;
    Ok(expr)
}

fn expression(input: &mut Input<'_>) -> PResult<Expression> {
    nested(input, conditional)
}

/// Parse `condition ? then : else` (lowest precedence, right-associative)
fn conditional(input: &mut Input<'_>) -> PResult<Expression> {
    let condition = or_expression(input)?;
    if opt(lit("?")).parse_next(input)?.is_none() {
        return Ok(condition);
    }
    let then_expr = cut_err(expression).parse_next(input)?;
    expect(':').parse_next(input)?;
    let else_expr = cut_err(expression).parse_next(input)?;
    Ok(Expression::conditional(condition, then_expr, else_expr))
}

/// Parse one left-associative precedence level
fn binary_level<'a>(
    input: &mut Input<'a>,
    operand: fn(&mut Input<'a>) -> PResult<Expression>,
    operators: &[(&'static str, BinaryOp)],
) -> PResult<Expression> {
    let mut left = operand(input)?;
    'operators: loop {
        for (token, op) in operators {
            if opt(lit(token)).parse_next(input)?.is_some() {
                let right = cut_err(operand)
                    .context(StrContext::Expected(StrContextValue::Description(
                        "right operand",
                    )))
                    .parse_next(input)?;
                left = Expression::binary(*op, left, right);
                continue 'operators;
            }
        }
        return Ok(left);
    }
}

fn or_expression(input: &mut Input<'_>) -> PResult<Expression> {
    binary_level(input, and_expression, &[("||", BinaryOp::Or)])
}

fn and_expression(input: &mut Input<'_>) -> PResult<Expression> {
    binary_level(input, equality_expression, &[("&&", BinaryOp::And)])
}

fn equality_expression(input: &mut Input<'_>) -> PResult<Expression> {
    binary_level(
        input,
        relational_expression,
        &[("==", BinaryOp::Equal), ("!=", BinaryOp::NotEqual)],
    )
}

fn relational_expression(input: &mut Input<'_>) -> PResult<Expression> {
    // Two-character operators first so `<=` is not read as `<`
    binary_level(
        input,
        additive_expression,
        &[
            ("<=", BinaryOp::LessOrEqual),
            (">=", BinaryOp::GreaterOrEqual),
            ("<", BinaryOp::Less),
            (">", BinaryOp::Greater),
        ],
    )
}

fn additive_expression(input: &mut Input<'_>) -> PResult<Expression> {
    binary_level(
        input,
        multiplicative_expression,
        &[("+", BinaryOp::Add), ("-", BinaryOp::Subtract)],
    )
}

fn multiplicative_expression(input: &mut Input<'_>) -> PResult<Expression> {
    binary_level(
        input,
        unary_expression,
        &[
            ("*", BinaryOp::Multiply),
            ("/", BinaryOp::Divide),
            ("%", BinaryOp::Modulo),
        ],
    )
}

fn unary_expression(input: &mut Input<'_>) -> PResult<Expression> {
    if opt(op("!", &['='])).parse_next(input)?.is_some() {
        let operand = nested(input, |input| cut_err(unary_expression).parse_next(input))?;
        return Ok(Expression::unary(UnaryOp::Not, operand));
    }
    if opt(lit("-")).parse_next(input)?.is_some() {
        let operand = nested(input, |input| cut_err(unary_expression).parse_next(input))?;
        return Ok(Expression::unary(UnaryOp::Negate, operand));
    }
    postfix_expression(input)
}

/// Parse a primary followed by any number of `.name(args)` method calls
fn postfix_expression(input: &mut Input<'_>) -> PResult<Expression> {
    let depth = input.state;
    let result = method_chain(input);
    input.state = depth;
    result
}

/// Each method call nests its receiver one level deeper
fn method_chain(input: &mut Input<'_>) -> PResult<Expression> {
    let mut expr = primary(input)?;
    while opt(lit(".")).parse_next(input)?.is_some() {
        descend(input)?;
        ws(input)?;
        let (name, span) = cut_err(identifier.with_span())
            .context(StrContext::Expected(StrContextValue::Description(
                "method name",
            )))
            .parse_next(input)?;
        expect('(').parse_next(input)?;
        let args = arguments(input)?;
        expr = Expression::method(expr, name, args, Span::new(span.start, span.end));
    }
    Ok(expr)
}

/// Parse call arguments after the opening parenthesis
fn arguments(input: &mut Input<'_>) -> PResult<Vec<Expression>> {
    if opt(lit(")")).parse_next(input)?.is_some() {
        return Ok(Vec::new());
    }
    let args: Vec<Expression> = separated(1.., expression, lit(",")).parse_next(input)?;
    expect(')').parse_next(input)?;
    Ok(args)
}

fn primary(input: &mut Input<'_>) -> PResult<Expression> {
    ws(input)?;
    alt((
        number.map(Expression::Literal),
        string_literal.map(|s| Expression::Literal(Literal::String(s))),
        parenthesized,
        identifier_expression,
    ))
    .context(StrContext::Expected(StrContextValue::Description(
        "expression",
    )))
    .parse_next(input)
}

fn parenthesized(input: &mut Input<'_>) -> PResult<Expression> {
    '('.parse_next(input)?;
    let expr = cut_err(expression).parse_next(input)?;
    expect(')').parse_next(input)?;
    Ok(expr)
}

/// Parse a keyword literal, `this`, or a function call
fn identifier_expression(input: &mut Input<'_>) -> PResult<Expression> {
    let (name, span) = identifier.with_span().parse_next(input)?;
    match name {
        "true" => Ok(Expression::Literal(Literal::Boolean(true))),
        "false" => Ok(Expression::Literal(Literal::Boolean(false))),
        "null" => Ok(Expression::Literal(Literal::Null)),
        "this" => Ok(Expression::This),
        _ => {
            expect('(').parse_next(input)?;
            let args = arguments(input)?;
            Ok(Expression::call(name, args, Span::new(span.start, span.end)))
        }
    }
}
