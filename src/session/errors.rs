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

use std::fmt;

use crate::diagnostics::FormulaError;

use super::SessionState;

/// Every way a session operation can fail.
///
/// A failed operation never mutates the session, except for `set_formula`
/// which resets before validating.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The formula failed syntax validation.
    Syntax(FormulaError),
    /// The formula contains no variables to solve for.
    NoVariable,
    /// The requested solve target is not a variable of the formula.
    UnknownTarget {
        target: String,
        available: Vec<String>,
    },
    /// The formula passed validation but could not be parsed into an
    /// equation.
    Parse(FormulaError),
    /// The engine found no root for the target.
    NoSolution { target: String },
    /// `choose_solution` received an index outside the candidate list.
    IndexOutOfRange { index: usize, count: usize },
    /// The requested sweeper is not a free variable of the chosen
    /// solution. An empty `options` list means the solution is constant
    /// and accepts no sweeper at all.
    SweeperMismatch {
        requested: String,
        options: Vec<String>,
    },
    /// The fixed bindings do not cover exactly the non-sweeper free
    /// variables.
    FixedMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    /// A sweep range or step count is malformed.
    SweepParameter { reason: String },
    /// The symbolic work budget ran out.
    Timeout,
    /// The formula is outside what the engine can solve.
    Unsupported { reason: String },
    /// The operation is not valid in the session's current state.
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(error) => write!(f, "{}", error),
            Self::NoVariable => write!(f, "the formula contains no variables"),
            Self::UnknownTarget { target, available } => write!(
                f,
                "'{}' is not a variable of the formula (available: {})",
                target,
                available.join(", ")
            ),
            Self::Parse(error) => write!(f, "{}", error),
            Self::NoSolution { target } => {
                write!(f, "no solution exists for '{}'", target)
            }
            Self::IndexOutOfRange { index, count } => write!(
                f,
                "solution index {} is out of range for {} candidates",
                index, count
            ),
            Self::SweeperMismatch { requested, options } => {
                if options.is_empty() {
                    write!(
                        f,
                        "the solution is constant and cannot be swept over '{}'",
                        requested
                    )
                } else {
                    write!(
                        f,
                        "'{}' is not a free variable of the solution (options: {})",
                        requested,
                        options.join(", ")
                    )
                }
            }
            Self::FixedMismatch {
                missing,
                unexpected,
            } => {
                write!(f, "fixed values do not match the solution")?;
                if !missing.is_empty() {
                    write!(f, "; missing: {}", missing.join(", "))?;
                }
                if !unexpected.is_empty() {
                    write!(f, "; unexpected: {}", unexpected.join(", "))?;
                }
                Ok(())
            }
            Self::SweepParameter { reason } => write!(f, "invalid sweep: {}", reason),
            Self::Timeout => write!(f, "the solver ran out of time"),
            Self::Unsupported { reason } => write!(f, "unsupported formula: {}", reason),
            Self::InvalidState { operation, state } => write!(
                f,
                "'{}' is not allowed while the session is in the {:?} state",
                operation, state
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(error) | Self::Parse(error) => Some(error),
            _ => None,
        }
    }
}
