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

//! Symbolic root-finding for a single target variable.
//!
//! The equation is brought to `lhs - rhs = 0`, normalized to one rational
//! fraction (clearing denominators), and its numerator is read as a
//! polynomial in the target with symbolic coefficients. Linear and
//! quadratic forms have closed-form roots; the quadratic minus-branch root
//! comes first, matching the candidate ordering external callers index
//! into. Higher degrees and non-algebraic occurrences of the target are
//! reported as unsupported rather than guessed at.

use crate::ast::{Equation, Expr, Function};

use super::simplify::simplify;
use super::{Budget, EngineError, contains_symbol};

// Expansion guard: polynomial degree after clearing denominators.
const MAX_DEGREE: usize = 8;

/// Solves `equation` for `target`, returning ordered candidate roots.
///
/// Zero candidates means the equation has no (real) root for the target:
/// a constant residual, or a literal-negative discriminant.
///
/// # Errors
///
/// Returns [`EngineError`] when the target occurs non-algebraically, the
/// polynomial degree exceeds the supported range, or the work budget runs
/// out.
pub fn solve(
    equation: &Equation,
    target: &str,
    budget: &mut Budget,
) -> Result<Vec<Expr>, EngineError> {
    let difference = equation.lhs.clone() - equation.rhs.clone();
    let (numerator, _denominator) = as_fraction(&difference, budget)?;

    let raw = poly_coefficients(&numerator, target, budget)?;
    let mut coefficients = Vec::with_capacity(raw.len());
    for coefficient in &raw {
        coefficients.push(simplify(coefficient, budget)?);
    }
    // Trim literally-zero leading coefficients; symbolic coefficients stay
    // even when some binding could zero them.
    while coefficients.len() > 1 && coefficients[coefficients.len() - 1].is_zero() {
        coefficients.pop();
    }

    match coefficients.len() {
        // The target vanished: the residual is constant, so no roots.
        0 | 1 => Ok(Vec::new()),
        2 => {
            let root = simplify(
                &(-coefficients[0].clone() / coefficients[1].clone()),
                budget,
            )?;
            Ok(vec![root])
        }
        3 => quadratic_roots(
            coefficients[0].clone(),
            coefficients[1].clone(),
            coefficients[2].clone(),
            budget,
        ),
        n => Err(EngineError::UnsupportedDegree(n - 1)),
    }
}

/// Computes the roots of `c2*t**2 + c1*t + c0 = 0`, minus branch first.
fn quadratic_roots(
    c0: Expr,
    c1: Expr,
    c2: Expr,
    budget: &mut Budget,
) -> Result<Vec<Expr>, EngineError> {
    let discriminant = simplify(
        &(c1.clone() * c1.clone() - Expr::Number(4.0) * c2.clone() * c0),
        budget,
    )?;

    if let Some(d) = discriminant.as_number() {
        if d < 0.0 {
            // Real-valued engine: complex roots are not produced.
            return Ok(Vec::new());
        }
        if d == 0.0 {
            let root = simplify(&(-c1 / (Expr::Number(2.0) * c2)), budget)?;
            return Ok(vec![root]);
        }
        if let (Some(b), Some(a)) = (c1.as_number(), c2.as_number()) {
            if let Some(roots) = numeric_quadratic_roots(a, b, d, budget)? {
                return Ok(roots);
            }
        }
    }

    let radical = simplify(&discriminant.apply(Function::Sqrt), budget)?;
    let double_lead = Expr::Number(2.0) * c2;
    let minus = simplify(
        &((-c1.clone() - radical.clone()) / double_lead.clone()),
        budget,
    )?;
    let plus = simplify(&((-c1 + radical) / double_lead), budget)?;
    Ok(vec![minus, plus])
}

/// Roots of a fully numeric quadratic with positive discriminant `d`,
/// pulling perfect-square factors out of the radical so `sqrt(8)/2`
/// renders as `sqrt(2)`.
///
/// Returns `None` when the discriminant is not a small integer, in which
/// case the caller keeps the symbolic radical.
fn numeric_quadratic_roots(
    a: f64,
    b: f64,
    d: f64,
    budget: &mut Budget,
) -> Result<Option<Vec<Expr>>, EngineError> {
    if d.fract() != 0.0 || d > 1e12 {
        return Ok(None);
    }
    let d = d as u64;
    let mut square = (d as f64).sqrt().floor() as u64;
    while square > 1 && d % (square * square) != 0 {
        budget.charge(1)?;
        square -= 1;
    }
    let radicand = d / (square * square);

    let offset = -b / (2.0 * a);
    let scale = square as f64 / (2.0 * a);
    if radicand == 1 {
        let (low, high) = (offset - scale, offset + scale);
        return Ok(Some(vec![Expr::Number(low), Expr::Number(high)]));
    }

    let radical = Expr::number(radicand as f64).apply(Function::Sqrt);
    let term = Expr::Number(scale.abs()) * radical;
    let low = simplify(&(Expr::Number(offset) - term.clone()), budget)?;
    let high = simplify(&(Expr::Number(offset) + term), budget)?;
    // Branch order follows the sign of `2a`: minus branch first.
    if scale >= 0.0 {
        Ok(Some(vec![low, high]))
    } else {
        Ok(Some(vec![high, low]))
    }
}

/// Normalizes an expression into a single `(numerator, denominator)` pair.
fn as_fraction(expr: &Expr, budget: &mut Budget) -> Result<(Expr, Expr), EngineError> {
    budget.charge(1)?;
    let fraction = match expr {
        Expr::Add(left, right) => {
            let (n1, d1) = as_fraction(left, budget)?;
            let (n2, d2) = as_fraction(right, budget)?;
            (n1 * d2.clone() + n2 * d1.clone(), d1 * d2)
        }
        Expr::Sub(left, right) => {
            let (n1, d1) = as_fraction(left, budget)?;
            let (n2, d2) = as_fraction(right, budget)?;
            (n1 * d2.clone() - n2 * d1.clone(), d1 * d2)
        }
        Expr::Mul(left, right) => {
            let (n1, d1) = as_fraction(left, budget)?;
            let (n2, d2) = as_fraction(right, budget)?;
            (n1 * n2, d1 * d2)
        }
        Expr::Div(left, right) => {
            let (n1, d1) = as_fraction(left, budget)?;
            let (n2, d2) = as_fraction(right, budget)?;
            (n1 * d2, d1 * n2)
        }
        Expr::Neg(inner) => {
            let (n, d) = as_fraction(inner, budget)?;
            (-n, d)
        }
        Expr::Pow(base, exponent) => match integer_exponent(exponent) {
            Some(k) if k >= 0 => {
                let (n, d) = as_fraction(base, budget)?;
                (pow_expr(n, k as u32), pow_expr(d, k as u32))
            }
            Some(k) => {
                let (n, d) = as_fraction(base, budget)?;
                (pow_expr(d, k.unsigned_abs()), pow_expr(n, k.unsigned_abs()))
            }
            // Non-integer exponents stay atomic.
            None => (expr.clone(), Expr::Number(1.0)),
        },
        _ => (expr.clone(), Expr::Number(1.0)),
    };
    Ok(fraction)
}

/// Reads `expr` as a polynomial in `target`; index is the degree.
fn poly_coefficients(
    expr: &Expr,
    target: &str,
    budget: &mut Budget,
) -> Result<Vec<Expr>, EngineError> {
    budget.charge(1)?;
    // Target-free subtrees are opaque symbolic coefficients.
    if !contains_symbol(expr, target) {
        return Ok(vec![expr.clone()]);
    }

    match expr {
        Expr::Symbol(_) => Ok(vec![Expr::Number(0.0), Expr::Number(1.0)]),
        Expr::Add(left, right) => {
            let a = poly_coefficients(left, target, budget)?;
            let b = poly_coefficients(right, target, budget)?;
            Ok(merge(a, b, |x, y| x + y))
        }
        Expr::Sub(left, right) => {
            let a = poly_coefficients(left, target, budget)?;
            let b = poly_coefficients(right, target, budget)?;
            Ok(merge(a, b, |x, y| x - y))
        }
        Expr::Neg(inner) => {
            let coefficients = poly_coefficients(inner, target, budget)?;
            Ok(coefficients.into_iter().map(|c| -c).collect())
        }
        Expr::Mul(left, right) => {
            let a = poly_coefficients(left, target, budget)?;
            let b = poly_coefficients(right, target, budget)?;
            convolve(&a, &b, budget)
        }
        Expr::Div(left, right) => {
            if contains_symbol(right, target) {
                // `as_fraction` already cleared reachable denominators, so a
                // remaining one holds the target non-algebraically.
                return Err(EngineError::NonAlgebraic(target.to_string()));
            }
            let coefficients = poly_coefficients(left, target, budget)?;
            Ok(coefficients
                .into_iter()
                .map(|c| c / right.as_ref().clone())
                .collect())
        }
        Expr::Pow(base, exponent) => match integer_exponent(exponent) {
            Some(k) if k >= 0 => {
                let base_coefficients = poly_coefficients(base, target, budget)?;
                let mut acc = vec![Expr::Number(1.0)];
                for _ in 0..k {
                    acc = convolve(&acc, &base_coefficients, budget)?;
                }
                Ok(acc)
            }
            _ => Err(EngineError::NonAlgebraic(target.to_string())),
        },
        _ => Err(EngineError::NonAlgebraic(target.to_string())),
    }
}

// Degree-wise combination with zero padding.
fn merge(a: Vec<Expr>, b: Vec<Expr>, combine: impl Fn(Expr, Expr) -> Expr) -> Vec<Expr> {
    let len = a.len().max(b.len());
    let mut a = a;
    let mut b = b;
    a.resize(len, Expr::Number(0.0));
    b.resize(len, Expr::Number(0.0));
    a.into_iter().zip(b).map(|(x, y)| combine(x, y)).collect()
}

// Polynomial product with a degree cap.
fn convolve(a: &[Expr], b: &[Expr], budget: &mut Budget) -> Result<Vec<Expr>, EngineError> {
    let degree = a.len() + b.len() - 2;
    if degree > MAX_DEGREE {
        return Err(EngineError::UnsupportedDegree(degree));
    }
    budget.charge((a.len() * b.len()) as u64)?;

    let mut result = vec![Expr::Number(0.0); a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            let term = x.clone() * y.clone();
            result[i + j] = result[i + j].clone() + term;
        }
    }
    Ok(result)
}

// Recognizes literal integer exponents, including parsed `-2` forms.
fn integer_exponent(exponent: &Expr) -> Option<i32> {
    let value = match exponent {
        Expr::Number(value) => *value,
        Expr::Neg(inner) => -inner.as_number()?,
        _ => return None,
    };
    if value.fract() != 0.0 || value.abs() > MAX_DEGREE as f64 {
        return None;
    }
    Some(value as i32)
}

// `base**k` with trivial exponents collapsed.
fn pow_expr(base: Expr, k: u32) -> Expr {
    match k {
        0 => Expr::Number(1.0),
        1 => base,
        _ => Expr::Pow(base.boxed(), Expr::Number(f64::from(k)).boxed()),
    }
}
