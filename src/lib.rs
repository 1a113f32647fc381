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

//! Formula solver and numeric sweeper for single-equation formulas.
//!
//! This crate provides:
//! - A formula parser with syntax validation and caret diagnostics.
//! - Variable extraction, with function and constant names reserved.
//! - A symbolic engine solving linear and quadratic forms for one target.
//! - A staged [`SolverSession`] from raw formula to numeric sweep.
//! - Flat serializable snapshots for persisting a session mid-flow.
//!
//! # Pipeline
//!
//! 1. `set_formula` validates the text and extracts its variables.
//! 2. `solve_for_target` produces one solution or a candidate list.
//! 3. `choose_solution` picks a candidate when several exist.
//! 4. `pass_sweeper` and `verify_fixed` bind the remaining variables.
//! 5. `perform_sweep` samples the solution over an inclusive range.
//!
//! Solutions are classified once, when finalized, by how many free
//! variables they keep: constant, one variable, or several. Constant
//! solutions skip the sweeper and fixing stages entirely.

pub mod ast;
mod diagnostics;
mod engine;
mod parser;
mod session;
mod sweep;

#[cfg(test)]
mod tests;

pub use diagnostics::FormulaError;
pub use engine::{EvalError, evaluate};
pub use session::{
    Classification, Formula, FormulaAccepted, ResolvedSolution, SessionError, SessionSnapshot,
    SessionState, SolveOptions, SolveOutcome, SolverSession, SweeperAccepted,
};
pub use sweep::SweepResult;

/// Extracts the sorted variable names of a formula without starting a
/// session.
///
/// # Errors
///
/// Returns [`SessionError::Syntax`] when the formula fails validation.
pub fn formula_variables(raw: &str) -> Result<Vec<String>, SessionError> {
    parser::validate_syntax(raw).map_err(SessionError::Syntax)?;
    Ok(parser::parse_variables(raw))
}
