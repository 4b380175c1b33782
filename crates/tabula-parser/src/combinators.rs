//! Token-level parsers shared by the expression grammar

use rust_decimal::Decimal;
use std::str::FromStr;
use tabula_ast::Literal;
use winnow::ascii::{digit1, multispace0};
use winnow::combinator::{cut_err, opt};
use winnow::error::{ContextError, ErrMode, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::ModalResult;
use winnow::stream::{AsChar, LocatingSlice, Stateful, Stream};
use winnow::token::{any, one_of, take_while};

/// Deepest nesting of parentheses, calls, unary and conditional operators
pub const MAX_NESTING: usize = 64;

/// Parser input: the script source, tracking byte offsets and nesting depth
pub type Input<'a> = Stateful<LocatingSlice<&'a str>, Nesting>;

/// Current nesting depth of the parse
#[derive(Debug, Clone, Copy, Default)]
pub struct Nesting {
    depth: usize,
}

pub fn input(source: &str) -> Input<'_> {
    Stateful {
        input: LocatingSlice::new(source),
        state: Nesting::default(),
    }
}

/// Parser result type
pub type PResult<O> = ModalResult<O, ContextError>;

/// Enter one more nesting level, failing past [`MAX_NESTING`]
///
/// The caller restores the depth once the nested construct is parsed.
pub fn descend(input: &mut Input<'_>) -> PResult<()> {
    if input.state.depth >= MAX_NESTING {
        let mut error = ContextError::new();
        error.push(StrContext::Label("nesting"));
        error.push(StrContext::Expected(StrContextValue::Description(
            "at most 64 nested expressions",
        )));
        return Err(ErrMode::Cut(error));
    }
    input.state.depth += 1;
    Ok(())
}

/// Run a parser one nesting level deeper
pub fn nested<'a, O>(
    input: &mut Input<'a>,
    mut parser: impl FnMut(&mut Input<'a>) -> PResult<O>,
) -> PResult<O> {
    let depth = input.state.depth;
    let result = descend(input).and_then(|()| parser(input));
    input.state.depth = depth;
    result
}

/// Skip whitespace
pub fn ws(input: &mut Input<'_>) -> PResult<()> {
    multispace0.void().parse_next(input)
}

/// Match a literal token, after optional whitespace
pub fn lit<'a>(mut token: &'static str) -> impl FnMut(&mut Input<'a>) -> PResult<&'a str> {
    move |input: &mut Input<'a>| {
        ws(input)?;
        token.parse_next(input)
    }
}

/// Match a literal token that is not the prefix of a longer operator
pub fn op<'a>(mut token: &'static str, not_followed_by: &'static [char]) -> impl FnMut(&mut Input<'a>) -> PResult<&'a str> {
    move |input: &mut Input<'a>| {
        ws(input)?;
        let checkpoint = input.checkpoint();
        let matched = token.parse_next(input)?;
        if opt(one_of(not_followed_by)).parse_next(input)?.is_some() {
            input.reset(&checkpoint);
            return Err(ErrMode::Backtrack(ContextError::new()));
        }
        Ok(matched)
    }
}

/// Match a closing token once the construct is committed
pub fn expect<'a>(token: char) -> impl FnMut(&mut Input<'a>) -> PResult<char> {
    move |input: &mut Input<'a>| {
        ws(input)?;
        cut_err(token)
            .context(StrContext::Expected(StrContextValue::CharLiteral(token)))
            .parse_next(input)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Parse an identifier: `[A-Za-z_$][A-Za-z0-9_$]*`
pub fn identifier<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    (
        one_of(is_identifier_start),
        take_while(0.., is_identifier_part),
    )
        .take()
        .parse_next(input)
}

/// Parse an integer or decimal literal
///
/// Numbers with a fraction or an exponent are decimals.
pub fn number(input: &mut Input<'_>) -> PResult<Literal> {
    let text = (
        digit1,
        opt(('.', digit1)),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)?;

    // Out of range literals are syntax errors
    let invalid = || ErrMode::Cut(ContextError::new());

    if text.contains(['.', 'e', 'E']) {
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map(Literal::Decimal)
            .map_err(|_| invalid())
    } else {
        text.parse::<i64>()
            .map(Literal::Integer)
            .map_err(|_| invalid())
    }
}

/// Parse a `'...'` or `"..."` string with backslash escapes
pub fn string_literal(input: &mut Input<'_>) -> PResult<String> {
    let quote = one_of(['\'', '"']).parse_next(input)?;
    let mut text = String::new();
    loop {
        let c = cut_err(any)
            .context(StrContext::Expected(StrContextValue::CharLiteral(quote)))
            .parse_next(input)?;
        if c == quote {
            return Ok(text);
        }
        if c != '\\' {
            text.push(c);
            continue;
        }
        let escaped = cut_err(any)
            .context(StrContext::Label("escape sequence"))
            .parse_next(input)?;
        match escaped {
            'n' => text.push('\n'),
            't' => text.push('\t'),
            'r' => text.push('\r'),
            '0' => text.push('\0'),
            'u' => {
                let digits = cut_err(take_while(4, AsChar::is_hex_digit))
                    .context(StrContext::Label("unicode escape"))
                    .parse_next(input)?;
                let c = u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| ErrMode::Cut(ContextError::new()))?;
                text.push(c);
            }
            other => text.push(other),
        }
    }
}
