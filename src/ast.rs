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

//! Symbolic expression AST and the reserved-name registry.
//!
//! The parser creates `Expr` trees from formula text. The solver and the
//! sweep evaluator rebuild and fold them freely, so nodes carry no source
//! spans; span bookkeeping stays in the parser and its diagnostics.
//!
//! `Display` prints a form the crate's own grammar re-reads. Session
//! snapshots persist expressions as these strings, so the rendering must
//! stay parseable.

use nom_locate::LocatedSpan;
use std::fmt;

/// Parser input span type carrying byte offsets and column info.
pub type Span<'a> = LocatedSpan<&'a str>;

/// Source range and anchor position for diagnostics.
///
/// Formulas are single-line, so only offsets and a 1-based column are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// 1-based UTF-8 column.
    pub column: usize,
}

impl SourceSpan {
    /// Creates a span from explicit offsets and a 1-based column.
    pub fn at(start: usize, end: usize, column: usize) -> Self {
        Self { start, end, column }
    }

    /// Creates a source span from parser start/end positions.
    pub fn from_bounds(start: Span<'_>, end: Span<'_>) -> Self {
        Self {
            start: start.location_offset(),
            end: end.location_offset(),
            column: start.get_utf8_column(),
        }
    }

    /// Returns span length in bytes.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns whether the span covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reserved mathematical constants, pre-bound in every symbol table.
///
/// These names can never become user variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    /// Euler's number (`E`).
    E,
    /// The circle constant (`pi`).
    Pi,
    /// The imaginary unit (`I`). Reserved but not numerically evaluable:
    /// the engine is real-valued.
    I,
}

impl Constant {
    /// Resolves a reserved constant name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "E" => Some(Constant::E),
            "pi" => Some(Constant::Pi),
            "I" => Some(Constant::I),
            _ => None,
        }
    }

    /// Returns the canonical source spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Constant::E => "E",
            Constant::Pi => "pi",
            Constant::I => "I",
        }
    }

    /// Returns the f64 value, or `None` for non-real constants.
    pub fn value(&self) -> Option<f64> {
        match self {
            Constant::E => Some(std::f64::consts::E),
            Constant::Pi => Some(std::f64::consts::PI),
            Constant::I => None,
        }
    }
}

/// Reserved single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Asin,
    Acos,
    Atan,
    Acot,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Sqrt,
    Log,
    Ln,
    Exp,
    Abs,
    Factorial,
}

impl Function {
    /// Resolves a reserved function name, including the `arc*` aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "cot" => Some(Function::Cot),
            "asin" | "arcsin" => Some(Function::Asin),
            "acos" | "arccos" => Some(Function::Acos),
            "atan" | "arctan" => Some(Function::Atan),
            "acot" | "arccot" => Some(Function::Acot),
            "sinh" => Some(Function::Sinh),
            "cosh" => Some(Function::Cosh),
            "tanh" => Some(Function::Tanh),
            "asinh" => Some(Function::Asinh),
            "acosh" => Some(Function::Acosh),
            "atanh" => Some(Function::Atanh),
            "sqrt" => Some(Function::Sqrt),
            "log" => Some(Function::Log),
            "ln" => Some(Function::Ln),
            "exp" => Some(Function::Exp),
            "abs" => Some(Function::Abs),
            "factorial" => Some(Function::Factorial),
            _ => None,
        }
    }

    /// Returns the canonical source spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Cot => "cot",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Acot => "acot",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Asinh => "asinh",
            Function::Acosh => "acosh",
            Function::Atanh => "atanh",
            Function::Sqrt => "sqrt",
            Function::Log => "log",
            Function::Ln => "ln",
            Function::Exp => "exp",
            Function::Abs => "abs",
            Function::Factorial => "factorial",
        }
    }
}

/// Returns whether a name belongs to the fixed reserved registry
/// (functions and constants alike).
///
/// Reserved names are consulted before a token is treated as a
/// user-definable variable and never appear in a formula's variable set.
pub fn is_reserved(name: &str) -> bool {
    Function::from_name(name).is_some() || Constant::from_name(name).is_some()
}

/// Symbolic expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal.
    Number(f64),
    /// User variable reference.
    Symbol(String),
    /// Reserved constant reference.
    Constant(Constant),
    /// Addition.
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction.
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication.
    Mul(Box<Expr>, Box<Expr>),
    /// Division.
    Div(Box<Expr>, Box<Expr>),
    /// Exponentiation (`**`).
    Pow(Box<Expr>, Box<Expr>),
    /// Unary negation.
    Neg(Box<Expr>),
    /// Reserved function application.
    Func(Function, Box<Expr>),
}

impl Expr {
    /// Boxes this expression.
    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// Creates a numeric literal node.
    pub fn number(value: f64) -> Expr {
        Expr::Number(value)
    }

    /// Creates a user-variable node.
    pub fn symbol(name: impl Into<String>) -> Expr {
        Expr::Symbol(name.into())
    }

    /// Applies a reserved function to this expression.
    pub fn apply(self, function: Function) -> Expr {
        Expr::Func(function, self.boxed())
    }

    /// Returns the literal value when this node is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns whether this node is the literal zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Number(value) if *value == 0.0)
    }

    // Binding strength used by `Display` parenthesization. Negative number
    // literals rank with unary negation so `(-2)**2` round-trips.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) | Expr::Neg(..) => 1,
            Expr::Number(value) if *value < 0.0 => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Pow(..) => 3,
            _ => 4,
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(self.boxed())
    }
}

// Writes `expr`, parenthesized when it binds looser than `min_prec`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min_prec: u8) -> fmt::Result {
    if expr.precedence() < min_prec {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{value}"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Constant(constant) => write!(f, "{}", constant.name()),
            Expr::Add(left, right) => {
                write_operand(f, left, 1)?;
                write!(f, " + ")?;
                write_operand(f, right, 1)
            }
            Expr::Sub(left, right) => {
                write_operand(f, left, 1)?;
                write!(f, " - ")?;
                // Right operand must bind tighter than subtraction itself:
                // `a - (b - c)` is not `a - b - c`.
                write_operand(f, right, 2)
            }
            Expr::Mul(left, right) => {
                write_operand(f, left, 2)?;
                write!(f, "*")?;
                write_operand(f, right, 2)
            }
            Expr::Div(left, right) => {
                write_operand(f, left, 2)?;
                write!(f, "/")?;
                write_operand(f, right, 3)
            }
            Expr::Pow(base, exponent) => {
                write_operand(f, base, 4)?;
                write!(f, "**")?;
                write_operand(f, exponent, 4)
            }
            Expr::Neg(inner) => {
                write!(f, "-")?;
                write_operand(f, inner, 2)
            }
            Expr::Func(function, argument) => {
                write!(f, "{}({argument})", function.name())
            }
        }
    }
}

/// Two symbolic expressions tied by equality.
///
/// Built once per formula and immutable thereafter.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    /// Left-hand side.
    pub lhs: Expr,
    /// Right-hand side.
    pub rhs: Expr,
}

impl Equation {
    /// Creates an equality constraint from both sides.
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}
