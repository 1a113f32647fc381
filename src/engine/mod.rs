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

//! The symbolic engine: simplification, root-finding, and numeric
//! evaluation over the expression tree in [`crate::ast`].
//!
//! All engine entry points charge against a [`Budget`] so a pathological
//! formula degrades into [`EngineError::BudgetExhausted`] instead of an
//! unbounded computation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::ast::Expr;

mod eval;
mod simplify;
mod solve;

pub use eval::{EvalError, evaluate};
pub use simplify::simplify;
pub use solve::solve;

/// Work allowance for one symbolic operation.
///
/// Each engine step charges a small cost; when the allowance runs out the
/// operation fails instead of running longer.
pub struct Budget {
    remaining: u64,
}

impl Budget {
    pub fn new(limit: u64) -> Self {
        Self { remaining: limit }
    }

    /// Consumes `cost` units, failing once the allowance is spent.
    pub fn charge(&mut self, cost: u64) -> Result<(), EngineError> {
        if self.remaining < cost {
            self.remaining = 0;
            return Err(EngineError::BudgetExhausted);
        }
        self.remaining -= cost;
        Ok(())
    }
}

/// Failure modes of the symbolic engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The equation reduces to a polynomial of a degree with no supported
    /// closed form.
    UnsupportedDegree(usize),
    /// The target variable appears inside a function call or other
    /// non-polynomial position.
    NonAlgebraic(String),
    /// The work budget ran out before the operation finished.
    BudgetExhausted,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDegree(degree) => {
                write!(f, "polynomial degree {} is not supported", degree)
            }
            Self::NonAlgebraic(target) => {
                write!(f, "'{}' appears in a non-algebraic position", target)
            }
            Self::BudgetExhausted => write!(f, "symbolic work budget exhausted"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Collects the free variable names of an expression, sorted.
pub fn free_symbols(expr: &Expr) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_symbols(expr, &mut names);
    names
}

fn collect_symbols(expr: &Expr, names: &mut BTreeSet<String>) {
    match expr {
        Expr::Symbol(name) => {
            names.insert(name.clone());
        }
        Expr::Number(_) | Expr::Constant(_) => {}
        Expr::Add(left, right)
        | Expr::Sub(left, right)
        | Expr::Mul(left, right)
        | Expr::Div(left, right)
        | Expr::Pow(left, right) => {
            collect_symbols(left, names);
            collect_symbols(right, names);
        }
        Expr::Neg(inner) => collect_symbols(inner, names),
        Expr::Func(_, argument) => collect_symbols(argument, names),
    }
}

/// Tests whether `name` occurs free in `expr`.
pub fn contains_symbol(expr: &Expr, name: &str) -> bool {
    match expr {
        Expr::Symbol(symbol) => symbol == name,
        Expr::Number(_) | Expr::Constant(_) => false,
        Expr::Add(left, right)
        | Expr::Sub(left, right)
        | Expr::Mul(left, right)
        | Expr::Div(left, right)
        | Expr::Pow(left, right) => {
            contains_symbol(left, name) || contains_symbol(right, name)
        }
        Expr::Neg(inner) => contains_symbol(inner, name),
        Expr::Func(_, argument) => contains_symbol(argument, name),
    }
}

/// Replaces every binding in `values` with a numeric literal.
pub fn substitute(expr: &Expr, values: &BTreeMap<String, f64>) -> Expr {
    rewrite(expr, &|name| values.get(name).copied())
}

/// Replaces one symbol with a numeric literal.
pub fn bind(expr: &Expr, name: &str, value: f64) -> Expr {
    rewrite(expr, &|symbol| (symbol == name).then_some(value))
}

fn rewrite(expr: &Expr, lookup: &impl Fn(&str) -> Option<f64>) -> Expr {
    match expr {
        Expr::Symbol(name) => match lookup(name) {
            Some(value) => Expr::Number(value),
            None => expr.clone(),
        },
        Expr::Number(_) | Expr::Constant(_) => expr.clone(),
        Expr::Add(left, right) => {
            Expr::Add(rewrite(left, lookup).boxed(), rewrite(right, lookup).boxed())
        }
        Expr::Sub(left, right) => {
            Expr::Sub(rewrite(left, lookup).boxed(), rewrite(right, lookup).boxed())
        }
        Expr::Mul(left, right) => {
            Expr::Mul(rewrite(left, lookup).boxed(), rewrite(right, lookup).boxed())
        }
        Expr::Div(left, right) => {
            Expr::Div(rewrite(left, lookup).boxed(), rewrite(right, lookup).boxed())
        }
        Expr::Pow(left, right) => {
            Expr::Pow(rewrite(left, lookup).boxed(), rewrite(right, lookup).boxed())
        }
        Expr::Neg(inner) => Expr::Neg(rewrite(inner, lookup).boxed()),
        Expr::Func(function, argument) => {
            Expr::Func(*function, rewrite(argument, lookup).boxed())
        }
    }
}
