/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Expression parser.
//!
//! The grammar supports:
//! - numeric literals and identifiers
//! - reserved function calls (`sin(x)`, `sqrt(y)`, ...)
//! - reserved constants (`E`, `I`, `pi`)
//! - unary `+`/`-`
//! - binary `+ - * /`
//! - exponentiation as `**` or `^` (right-associative, binding tighter
//!   than unary minus, as in the source notation the formulas use)

use crate::ast::{Constant, Expr, Function, Span};
use nom::Parser;
use nom::{
    branch::alt,
    bytes::complete::tag,
    combinator::{map_res, opt},
    error::{VerboseError, VerboseErrorKind, context},
    number::complete::recognize_float,
    sequence::delimited,
};

use super::PResult;
use super::utils::{identifier, ws, ws_char};

/// Top-level expression parser.
pub(super) fn expr(input: Span<'_>) -> PResult<'_, Expr> {
    parse_add_sub(input)
}

/// Parses left-associative `+`/`-`.
fn parse_add_sub(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_mul_div(input)?;
    loop {
        let (next, op) = opt(alt((ws_char('+'), ws_char('-')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        // Left-associative fold: `a-b-c` becomes `(a-b)-c`.
        let (next, right) = parse_mul_div(next)?;
        left = if op_char == '+' {
            left + right
        } else {
            left - right
        };
        input = next;
    }
    Ok((input, left))
}

/// Parses left-associative `*`/`/`.
fn parse_mul_div(input: Span<'_>) -> PResult<'_, Expr> {
    let (mut input, mut left) = parse_unary(input)?;
    loop {
        let (next, op) = opt(alt((ws_char('*'), ws_char('/')))).parse(input)?;
        let Some(op_char) = op else {
            break;
        };

        // Left-associative fold: `a/b/c` becomes `(a/b)/c`.
        let (next, right) = parse_unary(next)?;
        left = if op_char == '*' {
            left * right
        } else {
            left / right
        };
        input = next;
    }
    Ok((input, left))
}

/// Parses unary signs.
fn parse_unary(input: Span<'_>) -> PResult<'_, Expr> {
    // Unary operators are parsed recursively to support chains like `--x`.
    if let Ok((input, _)) = ws_char('-').parse(input) {
        let (input, inner) = parse_unary(input)?;
        return Ok((input, -inner));
    }
    if let Ok((input, _)) = ws_char('+').parse(input) {
        return parse_unary(input);
    }
    parse_power(input)
}

/// Parses right-associative exponentiation.
fn parse_power(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, base) = parse_primary(input)?;
    let (input, op) = opt(ws(power_op)).parse(input)?;
    if op.is_none() {
        return Ok((input, base));
    }

    // The exponent re-enters the unary level so `x**-2` and `x**y**z`
    // parse the way the source notation groups them.
    let (input, exponent) = parse_unary(input)?;
    Ok((input, Expr::Pow(base.boxed(), exponent.boxed())))
}

fn power_op(input: Span<'_>) -> PResult<'_, Span<'_>> {
    alt((tag("**"), tag("^"))).parse(input)
}

/// Parses expression atoms.
fn parse_primary(input: Span<'_>) -> PResult<'_, Expr> {
    alt((parse_parenthesized, parse_number, parse_ident_or_call)).parse(input)
}

/// Parses parenthesized expressions.
fn parse_parenthesized(input: Span<'_>) -> PResult<'_, Expr> {
    delimited(ws_char('('), expr, context("')'", ws_char(')'))).parse(input)
}

/// Parses numeric literal expressions.
fn parse_number(input: Span<'_>) -> PResult<'_, Expr> {
    let (input, n) = ws(map_res(recognize_float, |s: Span<'_>| {
        s.fragment().parse::<f64>()
    }))
    .parse(input)?;
    Ok((input, Expr::Number(n)))
}

/// Parses either identifier, reserved constant, or reserved function call.
fn parse_ident_or_call(input: Span<'_>) -> PResult<'_, Expr> {
    let start = input;
    let (input, name) = ws(identifier).parse(input)?;
    let (input, call) = opt(delimited(
        ws_char('('),
        expr,
        context("')'", ws_char(')')),
    ))
    .parse(input)?;

    if let Some(argument) = call {
        // Only the fixed reserved registry is callable.
        let Some(function) = Function::from_name(&name) else {
            return Err(error_at(start, "reserved function name"));
        };
        return Ok((input, argument.apply(function)));
    }

    if let Some(constant) = Constant::from_name(&name) {
        return Ok((input, Expr::Constant(constant)));
    }
    // A bare reserved function name is not a value.
    if Function::from_name(&name).is_some() {
        return Err(error_at(start, "function applied to an argument"));
    }
    Ok((input, Expr::Symbol(name)))
}

// Builds a recoverable nom error anchored at `at`.
fn error_at<'a>(at: Span<'a>, expected: &'static str) -> nom::Err<VerboseError<Span<'a>>> {
    nom::Err::Error(VerboseError {
        errors: vec![(at, VerboseErrorKind::Context(expected))],
    })
}
