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

//! Numeric f64 evaluation with a domain-failure taxonomy.
//!
//! Every failure here is data, and during a sweep it is non-fatal: the
//! evaluator reports why a point is undefined and the sweep skips it.

use crate::ast::{Constant, Expr, Function};
use std::fmt;

/// Why a numeric evaluation failed at one point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A divisor evaluated to exactly zero.
    DivisionByZero,
    /// An argument fell outside a function's real domain.
    Domain(&'static str),
    /// The expression references the imaginary unit `I`.
    NonReal,
    /// The result is not a finite f64 (overflow or indeterminate form).
    NotFinite,
    /// A symbol had no binding at evaluation time.
    UnboundSymbol(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "division by zero"),
            EvalError::Domain(what) => write!(f, "domain error: {what}"),
            EvalError::NonReal => write!(f, "expression is not real-valued"),
            EvalError::NotFinite => write!(f, "result is not finite"),
            EvalError::UnboundSymbol(name) => write!(f, "unbound symbol '{name}'"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluates a fully bound expression to a finite f64.
///
/// f64 arithmetic carries just under 16 significant decimal digits, which
/// satisfies the 15-digit evaluation contract.
///
/// # Errors
///
/// Returns [`EvalError`] when the expression is undefined at this binding.
pub fn evaluate(expr: &Expr) -> Result<f64, EvalError> {
    let value = eval_node(expr)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NotFinite)
    }
}

fn eval_node(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(value) => Ok(*value),
        Expr::Symbol(name) => Err(EvalError::UnboundSymbol(name.clone())),
        Expr::Constant(constant) => constant.value().ok_or(EvalError::NonReal),
        Expr::Add(left, right) => Ok(eval_node(left)? + eval_node(right)?),
        Expr::Sub(left, right) => Ok(eval_node(left)? - eval_node(right)?),
        Expr::Mul(left, right) => Ok(eval_node(left)? * eval_node(right)?),
        Expr::Div(left, right) => {
            let divisor = eval_node(right)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(eval_node(left)? / divisor)
        }
        Expr::Pow(base, exponent) => {
            let result = eval_node(base)?.powf(eval_node(exponent)?);
            if result.is_nan() {
                return Err(EvalError::Domain("power of a negative base"));
            }
            Ok(result)
        }
        Expr::Neg(inner) => Ok(-eval_node(inner)?),
        Expr::Func(function, argument) => apply_function(*function, eval_node(argument)?),
    }
}

fn apply_function(function: Function, x: f64) -> Result<f64, EvalError> {
    let value = match function {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Cot => {
            if x.sin() == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            x.cos() / x.sin()
        }
        Function::Asin => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(EvalError::Domain("asin argument outside [-1, 1]"));
            }
            x.asin()
        }
        Function::Acos => {
            if !(-1.0..=1.0).contains(&x) {
                return Err(EvalError::Domain("acos argument outside [-1, 1]"));
            }
            x.acos()
        }
        Function::Atan => x.atan(),
        Function::Acot => {
            if x == 0.0 {
                std::f64::consts::FRAC_PI_2
            } else {
                (1.0 / x).atan()
            }
        }
        Function::Sinh => x.sinh(),
        Function::Cosh => x.cosh(),
        Function::Tanh => x.tanh(),
        Function::Asinh => x.asinh(),
        Function::Acosh => {
            if x < 1.0 {
                return Err(EvalError::Domain("acosh argument below 1"));
            }
            x.acosh()
        }
        Function::Atanh => {
            if x <= -1.0 || x >= 1.0 {
                return Err(EvalError::Domain("atanh argument outside (-1, 1)"));
            }
            x.atanh()
        }
        Function::Sqrt => {
            if x < 0.0 {
                return Err(EvalError::Domain("square root of a negative number"));
            }
            x.sqrt()
        }
        Function::Log | Function::Ln => {
            if x <= 0.0 {
                return Err(EvalError::Domain("logarithm of a non-positive number"));
            }
            x.ln()
        }
        Function::Exp => x.exp(),
        Function::Abs => x.abs(),
        Function::Factorial => return factorial(x),
    };
    Ok(value)
}

fn factorial(x: f64) -> Result<f64, EvalError> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(EvalError::Domain("factorial of a non-natural number"));
    }
    let n = x as u64;
    let mut product = 1.0_f64;
    for k in 2..=n {
        product *= k as f64;
        // 171! overflows f64; bail out instead of looping through infinities.
        if !product.is_finite() {
            return Err(EvalError::NotFinite);
        }
    }
    Ok(product)
}
