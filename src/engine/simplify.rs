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

//! Constant folding and neutral-element identities.
//!
//! Folding is deliberately conservative: literals combine, neutral
//! elements vanish, and `sqrt` of a literal folds only when the root is
//! exact, so symbolic radicals keep their readable form (`sqrt(2)` stays
//! `sqrt(2)`, `sqrt(16)` becomes `4`).

use crate::ast::{Expr, Function};

use super::{Budget, EngineError};

/// Simplifies an expression bottom-up, charging the work budget per node.
pub fn simplify(expr: &Expr, budget: &mut Budget) -> Result<Expr, EngineError> {
    budget.charge(1)?;
    let folded = match expr {
        Expr::Number(_) | Expr::Symbol(_) | Expr::Constant(_) => expr.clone(),
        Expr::Add(left, right) => fold_add(simplify(left, budget)?, simplify(right, budget)?),
        Expr::Sub(left, right) => fold_sub(simplify(left, budget)?, simplify(right, budget)?),
        Expr::Mul(left, right) => fold_mul(simplify(left, budget)?, simplify(right, budget)?),
        Expr::Div(left, right) => fold_div(simplify(left, budget)?, simplify(right, budget)?),
        Expr::Pow(base, exponent) => {
            fold_pow(simplify(base, budget)?, simplify(exponent, budget)?)
        }
        Expr::Neg(inner) => fold_neg(simplify(inner, budget)?),
        Expr::Func(function, argument) => fold_func(*function, simplify(argument, budget)?),
    };
    Ok(folded)
}

fn fold_add(left: Expr, right: Expr) -> Expr {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Expr::Number(a + b),
        (Some(a), None) if a == 0.0 => right,
        (None, Some(b)) if b == 0.0 => left,
        // `x + (-c)` reads better as `x - c`.
        (None, Some(b)) if b < 0.0 => left - Expr::Number(-b),
        _ => left + right,
    }
}

fn fold_sub(left: Expr, right: Expr) -> Expr {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Expr::Number(a - b),
        (None, Some(b)) if b == 0.0 => left,
        (Some(a), None) if a == 0.0 => fold_neg(right),
        (None, Some(b)) if b < 0.0 => left + Expr::Number(-b),
        _ => left - right,
    }
}

fn fold_mul(left: Expr, right: Expr) -> Expr {
    match (left.as_number(), right.as_number()) {
        (Some(a), Some(b)) => Expr::Number(a * b),
        (Some(a), None) if a == 0.0 => Expr::Number(0.0),
        (None, Some(b)) if b == 0.0 => Expr::Number(0.0),
        (Some(a), None) if a == 1.0 => right,
        (None, Some(b)) if b == 1.0 => left,
        _ => left * right,
    }
}

fn fold_div(left: Expr, right: Expr) -> Expr {
    // `(-a)/(-b)` reads better as `a/b`.
    if let (Expr::Neg(a), Expr::Neg(b)) = (&left, &right) {
        return fold_div(a.as_ref().clone(), b.as_ref().clone());
    }
    match (left.as_number(), right.as_number()) {
        // Literal zero divisors are left intact for evaluation to reject.
        (Some(a), Some(b)) if b != 0.0 => Expr::Number(a / b),
        (Some(a), None) if a == 0.0 => Expr::Number(0.0),
        (None, Some(b)) if b == 1.0 => left,
        _ => left / right,
    }
}

fn fold_pow(base: Expr, exponent: Expr) -> Expr {
    match (base.as_number(), exponent.as_number()) {
        (Some(a), Some(b)) => {
            let value = a.powf(b);
            if value.is_finite() {
                Expr::Number(value)
            } else {
                Expr::Pow(base.boxed(), exponent.boxed())
            }
        }
        (None, Some(b)) if b == 1.0 => base,
        (None, Some(b)) if b == 0.0 => Expr::Number(1.0),
        _ => Expr::Pow(base.boxed(), exponent.boxed()),
    }
}

fn fold_neg(inner: Expr) -> Expr {
    match inner {
        // Keep `-0` out of rendered roots.
        Expr::Number(value) if value == 0.0 => Expr::Number(0.0),
        Expr::Number(value) => Expr::Number(-value),
        Expr::Neg(original) => *original,
        other => -other,
    }
}

fn fold_func(function: Function, argument: Expr) -> Expr {
    if let Some(value) = argument.as_number() {
        match function {
            Function::Sqrt if value >= 0.0 => {
                let root = value.sqrt();
                // Fold only exact roots; `sqrt(2)` keeps its symbolic form.
                if root * root == value {
                    return Expr::Number(root);
                }
            }
            Function::Abs => return Expr::Number(value.abs()),
            Function::Factorial if value >= 0.0 && value.fract() == 0.0 && value <= 18.0 => {
                let mut product = 1.0_f64;
                for k in 2..=(value as u64) {
                    product *= k as f64;
                }
                return Expr::Number(product);
            }
            _ => {}
        }
    }
    argument.apply(function)
}
