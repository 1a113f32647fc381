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

//! Formula validation and `nom` parsing.
//!
//! The pipeline is:
//! 1. [`validate_syntax`] rejects malformed or ambiguous notation with
//!    caret diagnostics before any symbolic work happens.
//! 2. [`parse_variables`] extracts the sorted, deduplicated variable set
//!    (reserved names excluded).
//! 3. [`build_equation`] parses both sides of the `=` into a symbolic
//!    [`Equation`]; grammar-level failures collapse into one generic
//!    "could not parse the formula" error so the error contract stays
//!    stable regardless of engine internals.

mod expr;
mod utils;

use crate::ast::{Equation, Expr, SourceSpan, Span, is_reserved};
use crate::diagnostics::FormulaError;
use nom::{
    IResult,
    combinator::all_consuming,
    error::{VerboseError, VerboseErrorKind},
    sequence::delimited,
};

use self::expr::expr;
use self::utils::{is_ident_continue, is_ident_start, ws0};

type PResult<'a, O> = IResult<Span<'a>, O, VerboseError<Span<'a>>>;

/// Checks formula shape before any symbolic parsing.
///
/// Rejects:
/// - anything but exactly one `=` with two non-empty sides;
/// - implied multiplication (`3a`, `3(`, `)(`, `)x`);
/// - `name(...)` calls where `name` is outside the reserved registry
///   (treated as implied multiplication, not as a function call).
///
/// # Errors
///
/// Returns [`FormulaError`] with a caret pointing at the offending
/// character where a position exists.
pub fn validate_syntax(raw: &str) -> Result<(), FormulaError> {
    check_equality_shape(raw)?;
    check_implied_multiplication(raw)?;
    check_function_calls(raw)?;
    Ok(())
}

/// Extracts the sorted, deduplicated variable set of a formula.
///
/// Identifiers match `[a-zA-Z_][a-zA-Z0-9_]*`; reserved function and
/// constant names are excluded. Sorting makes the set deterministic across
/// equivalent formulas regardless of term order.
pub fn parse_variables(raw: &str) -> Vec<String> {
    let mut variables: Vec<String> = scan_identifiers(raw)
        .into_iter()
        .filter(|(_, name)| !is_reserved(name))
        .map(|(_, name)| name.to_string())
        .collect();
    variables.sort();
    variables.dedup();
    variables
}

/// Splits a validated formula on `=` and parses both sides.
///
/// # Errors
///
/// Any grammar failure on either side yields the generic
/// "could not parse the formula" error; the specific engine reason is not
/// surfaced.
pub fn build_equation(raw: &str) -> Result<Equation, FormulaError> {
    let Some((lhs_text, rhs_text)) = raw.split_once('=') else {
        return Err(generic_parse_error());
    };

    let lhs = parse_expression(lhs_text).map_err(|_| generic_parse_error())?;
    let rhs = parse_expression(rhs_text).map_err(|_| generic_parse_error())?;
    Ok(Equation::new(lhs, rhs))
}

/// Parses one expression, consuming all input.
///
/// Used for equation sides and for re-reading persisted solution strings.
pub(crate) fn parse_expression(text: &str) -> Result<Expr, FormulaError> {
    let input = Span::new(text);
    // `all_consuming` ensures trailing garbage is treated as syntax error.
    match all_consuming(delimited(ws0, expr, ws0))(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(err) => Err(parse_error_to_diagnostic(err, text)),
    }
}

fn generic_parse_error() -> FormulaError {
    FormulaError::message_only("could not parse the formula")
}

/// Converts a `nom` verbose error to crate-level diagnostics.
fn parse_error_to_diagnostic(
    err: nom::Err<VerboseError<Span<'_>>>,
    source: &str,
) -> FormulaError {
    match err {
        nom::Err::Incomplete(_) => FormulaError::message_only("incomplete input"),
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            // Use the deepest recorded parser error as the diagnostic anchor.
            if let Some((span, kind)) = e.errors.last() {
                let span = SourceSpan::from_bounds(*span, *span);
                let detail = match kind {
                    VerboseErrorKind::Context(ctx) => format!("syntax error: expected {ctx}"),
                    VerboseErrorKind::Char(c) => format!("syntax error: expected '{c}'"),
                    VerboseErrorKind::Nom(kind) => format!("syntax error near {kind:?}"),
                };
                FormulaError::from_span(detail, source, &span)
            } else {
                FormulaError::message_only("syntax error")
            }
        }
    }
}

// Requires exactly one `=` separating two non-empty sides.
fn check_equality_shape(raw: &str) -> Result<(), FormulaError> {
    let mut positions = raw.char_indices().filter(|(_, c)| *c == '=');
    let Some((eq_offset, _)) = positions.next() else {
        return Err(FormulaError::message_only(
            "the formula must contain exactly one '='",
        ));
    };
    if let Some((second, _)) = positions.next() {
        return Err(FormulaError::from_span(
            "the formula must contain exactly one '='",
            raw,
            &span_at(raw, second, 1),
        ));
    }

    let (lhs, rhs) = (&raw[..eq_offset], &raw[eq_offset + 1..]);
    if lhs.trim().is_empty() || rhs.trim().is_empty() {
        return Err(FormulaError::from_span(
            "both sides of '=' must be non-empty",
            raw,
            &span_at(raw, eq_offset, 1),
        ));
    }
    Ok(())
}

// Rejects adjacency patterns the engine would read as implied
// multiplication: a digit or `)` immediately followed by a term.
fn check_implied_multiplication(raw: &str) -> Result<(), FormulaError> {
    let chars: Vec<(usize, char)> = raw.char_indices().collect();
    for window in chars.windows(2) {
        let (_, previous) = window[0];
        let (offset, current) = window[1];

        let after_digit =
            previous.is_ascii_digit() && (is_ident_start(current) || current == '(');
        let after_paren = previous == ')'
            && (is_ident_start(current) || current.is_ascii_digit() || current == '(');
        if after_digit || after_paren {
            return Err(FormulaError::from_span(
                "the formula contains implied multiplication like 3a or 3(a + b): \
                 use an explicit operator (e.g. 3*a)",
                raw,
                &span_at(raw, offset, current.len_utf8()),
            ));
        }
    }
    Ok(())
}

// Rejects `name(` where `name` is not reserved: user identifiers are
// variables, never callables, so the notation is implied multiplication.
fn check_function_calls(raw: &str) -> Result<(), FormulaError> {
    for (offset, name) in scan_identifiers(raw) {
        let next = raw[offset + name.len()..].chars().next();
        if next == Some('(') && !is_reserved(name) {
            return Err(FormulaError::from_span(
                format!(
                    "'{name}(...)' looks like implied multiplication: \
                     use an explicit operator (e.g. {name}*(...))"
                ),
                raw,
                &span_at(raw, offset, name.len()),
            ));
        }
    }
    Ok(())
}

// Maximal-munch identifier scan; an identifier may begin right after a
// digit (`3a` yields `a`), matching the variable-extraction contract.
fn scan_identifiers(raw: &str) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut rest = raw.char_indices().peekable();
    while let Some((start, c)) = rest.next() {
        if !is_ident_start(c) {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some((offset, c)) = rest.peek().copied() {
            if !is_ident_continue(c) {
                break;
            }
            end = offset + c.len_utf8();
            rest.next();
        }
        tokens.push((start, &raw[start..end]));
    }
    tokens
}

// Builds a byte-offset span with its 1-based column.
fn span_at(raw: &str, offset: usize, len: usize) -> SourceSpan {
    let column = raw[..offset].chars().count() + 1;
    SourceSpan::at(offset, offset + len, column)
}
