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

//! The solver session: a small state machine that walks one formula from
//! raw text to a numeric sweep.
//!
//! The stages are ordered: set a formula, solve for a target, (possibly)
//! choose among candidate solutions, declare the sweeper variable, fix the
//! remaining variables, then sweep. Each operation validates before it
//! mutates, so a failed call leaves the session exactly as it was. The one
//! exception is `set_formula`, which resets the session before validating;
//! a rejected formula therefore leaves an empty session.
//!
//! Constant solutions short-circuit the middle stages: they accept no
//! sweeper and need no fixed values, so `perform_sweep` (and an empty
//! `verify_fixed`) are allowed directly after the solution is finalized.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Equation, Expr};
use crate::engine::{self, Budget, EngineError, free_symbols};
use crate::parser;
use crate::sweep::{self, SweepGrid, SweepResult};

mod errors;
mod snapshot;

pub use errors::SessionError;
pub use snapshot::SessionSnapshot;

/// How many free variables remain in a finalized solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Constant,
    OneVar,
    MultiVar,
}

impl Classification {
    fn from_free_count(count: usize) -> Self {
        match count {
            0 => Self::Constant,
            1 => Self::OneVar,
            _ => Self::MultiVar,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::OneVar => write!(f, "one_var"),
            Self::MultiVar => write!(f, "multi_var"),
        }
    }
}

/// Where the session currently sits in the solve pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    FormulaSet,
    NeedsChoice,
    Resolved,
    SolutionChosen,
    SweeperSet,
    FixedVerified,
    Ready,
}

/// Tunables for one session.
#[derive(Debug, Clone, Copy)]
pub struct SolveOptions {
    /// Symbolic work allowance per solve call.
    pub work_budget: u64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            work_budget: 250_000,
        }
    }
}

/// A validated formula and its variables, sorted by name.
#[derive(Debug, Clone)]
pub struct Formula {
    pub raw: String,
    pub variables: Vec<String>,
}

/// Result of a successful `set_formula`.
#[derive(Debug, Clone)]
pub struct FormulaAccepted {
    pub variables: Vec<String>,
}

/// A finalized solution, reported on resolve and on choice.
#[derive(Debug, Clone)]
pub struct ResolvedSolution {
    /// The chosen root, rendered in the formula grammar.
    pub solution: String,
    /// Free variables of the root, sorted.
    pub free_variables: Vec<String>,
    pub classification: Classification,
}

/// Outcome of `solve_for_target`.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    /// Exactly one root; the session finalized it immediately.
    Resolved(ResolvedSolution),
    /// Several roots, in engine order; one must be chosen by index.
    NeedsChoice { candidates: Vec<String> },
}

/// Result of a successful `pass_sweeper`.
#[derive(Debug, Clone)]
pub struct SweeperAccepted {
    pub sweeper: String,
    /// Variables that still need fixed values, sorted.
    pub required_to_fix: Vec<String>,
}

/// Drives one formula through validation, solving, and sweeping.
pub struct SolverSession {
    state: SessionState,
    formula: Option<Formula>,
    equation: Option<Equation>,
    target: Option<String>,
    candidates: Vec<Expr>,
    chosen: Option<Expr>,
    free_variables: Vec<String>,
    classification: Option<Classification>,
    sweeper: Option<String>,
    required_to_fix: Vec<String>,
    fixed: BTreeMap<String, f64>,
    options: SolveOptions,
}

impl Default for SolverSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverSession {
    pub fn new() -> Self {
        Self::with_options(SolveOptions::default())
    }

    pub fn with_options(options: SolveOptions) -> Self {
        Self {
            state: SessionState::Empty,
            formula: None,
            equation: None,
            target: None,
            candidates: Vec::new(),
            chosen: None,
            free_variables: Vec::new(),
            classification: None,
            sweeper: None,
            required_to_fix: Vec::new(),
            fixed: BTreeMap::new(),
            options,
        }
    }

    /// Resets the session and installs a new formula.
    ///
    /// The reset happens before validation, so a rejected formula leaves
    /// an empty session rather than the previous one.
    pub fn set_formula(&mut self, raw: &str) -> Result<FormulaAccepted, SessionError> {
        self.reset();

        parser::validate_syntax(raw).map_err(SessionError::Syntax)?;
        let variables = parser::parse_variables(raw);
        if variables.is_empty() {
            return Err(SessionError::NoVariable);
        }
        let equation = parser::build_equation(raw).map_err(SessionError::Parse)?;

        log::debug!("formula accepted with variables [{}]", variables.join(", "));
        self.formula = Some(Formula {
            raw: raw.to_string(),
            variables: variables.clone(),
        });
        self.equation = Some(equation);
        self.state = SessionState::FormulaSet;
        Ok(FormulaAccepted { variables })
    }

    /// Solves the formula for `target`.
    ///
    /// A single root finalizes immediately; several roots park the session
    /// until `choose_solution` picks one. Re-solving is allowed from any
    /// state that has a formula, and discards prior solve results.
    pub fn solve_for_target(&mut self, target: &str) -> Result<SolveOutcome, SessionError> {
        let (formula, equation) = match (&self.formula, &self.equation) {
            (Some(formula), Some(equation)) => (formula, equation),
            _ => {
                return Err(SessionError::InvalidState {
                    operation: "solve_for_target",
                    state: self.state,
                });
            }
        };
        if !formula.variables.iter().any(|v| v == target) {
            return Err(SessionError::UnknownTarget {
                target: target.to_string(),
                available: formula.variables.clone(),
            });
        }

        let mut budget = Budget::new(self.options.work_budget);
        let roots = engine::solve(equation, target, &mut budget).map_err(map_engine_error)?;
        if roots.is_empty() {
            return Err(SessionError::NoSolution {
                target: target.to_string(),
            });
        }

        self.clear_solution();
        self.target = Some(target.to_string());
        if roots.len() == 1 {
            let root = roots.into_iter().next().ok_or(SessionError::NoSolution {
                target: target.to_string(),
            })?;
            let resolved = self.finalize(root, SessionState::Resolved);
            log::debug!("resolved '{}' to {}", target, resolved.solution);
            Ok(SolveOutcome::Resolved(resolved))
        } else {
            let candidates: Vec<String> = roots.iter().map(ToString::to_string).collect();
            log::debug!(
                "'{}' has {} candidate solutions",
                target,
                candidates.len()
            );
            self.candidates = roots;
            self.state = SessionState::NeedsChoice;
            Ok(SolveOutcome::NeedsChoice { candidates })
        }
    }

    /// Picks one of the candidate roots by its position in the candidate
    /// list.
    pub fn choose_solution(&mut self, index: usize) -> Result<ResolvedSolution, SessionError> {
        if self.state != SessionState::NeedsChoice {
            return Err(SessionError::InvalidState {
                operation: "choose_solution",
                state: self.state,
            });
        }
        if index >= self.candidates.len() {
            return Err(SessionError::IndexOutOfRange {
                index,
                count: self.candidates.len(),
            });
        }

        let root = self.candidates[index].clone();
        let resolved = self.finalize(root, SessionState::SolutionChosen);
        log::debug!("chose candidate {}: {}", index, resolved.solution);
        Ok(resolved)
    }

    /// Declares which free variable the sweep will vary.
    ///
    /// Allowed once a solution is finalized, and again to change an
    /// earlier choice. Constant solutions reject every sweeper.
    pub fn pass_sweeper(&mut self, name: &str) -> Result<SweeperAccepted, SessionError> {
        match self.state {
            SessionState::Resolved | SessionState::SolutionChosen | SessionState::SweeperSet => {}
            _ => {
                return Err(SessionError::InvalidState {
                    operation: "pass_sweeper",
                    state: self.state,
                });
            }
        }
        if self.classification == Some(Classification::Constant) {
            return Err(SessionError::SweeperMismatch {
                requested: name.to_string(),
                options: Vec::new(),
            });
        }
        if !self.free_variables.iter().any(|v| v == name) {
            return Err(SessionError::SweeperMismatch {
                requested: name.to_string(),
                options: self.free_variables.clone(),
            });
        }

        let required_to_fix: Vec<String> = self
            .free_variables
            .iter()
            .filter(|v| v.as_str() != name)
            .cloned()
            .collect();
        self.sweeper = Some(name.to_string());
        self.required_to_fix = required_to_fix.clone();
        self.fixed.clear();
        self.state = SessionState::SweeperSet;
        Ok(SweeperAccepted {
            sweeper: name.to_string(),
            required_to_fix,
        })
    }

    /// Supplies numeric values for every non-sweeper free variable.
    ///
    /// The bindings must cover exactly the required set; missing and
    /// unexpected names are reported separately. A constant solution
    /// accepts an empty map straight from its finalized state.
    pub fn verify_fixed(
        &mut self,
        bindings: BTreeMap<String, f64>,
    ) -> Result<(), SessionError> {
        let constant_shortcut = self.classification == Some(Classification::Constant)
            && matches!(
                self.state,
                SessionState::Resolved | SessionState::SolutionChosen
            );
        if self.state != SessionState::SweeperSet && !constant_shortcut {
            return Err(SessionError::InvalidState {
                operation: "verify_fixed",
                state: self.state,
            });
        }

        let missing: Vec<String> = self
            .required_to_fix
            .iter()
            .filter(|name| !bindings.contains_key(name.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = bindings
            .keys()
            .filter(|name| !self.required_to_fix.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(SessionError::FixedMismatch {
                missing,
                unexpected,
            });
        }

        self.fixed = bindings;
        self.state = SessionState::FixedVerified;
        Ok(())
    }

    /// Evaluates the solution over an inclusive, evenly spaced range of
    /// the sweeper variable.
    ///
    /// Positions where evaluation fails are reported in the result's
    /// `skipped` list rather than failing the sweep. Constant solutions
    /// may sweep directly from their finalized state.
    pub fn perform_sweep(
        &mut self,
        start: f64,
        end: f64,
        steps: usize,
    ) -> Result<SweepResult, SessionError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(SessionError::SweepParameter {
                reason: "range bounds must be finite".to_string(),
            });
        }
        if steps < 2 {
            return Err(SessionError::SweepParameter {
                reason: format!("at least 2 steps are required, got {}", steps),
            });
        }
        if start >= end {
            return Err(SessionError::SweepParameter {
                reason: format!("start {} must be below end {}", start, end),
            });
        }

        let constant_shortcut = self.classification == Some(Classification::Constant)
            && matches!(
                self.state,
                SessionState::Resolved | SessionState::SolutionChosen
            );
        let swept_before = self.state == SessionState::Ready;
        if self.state != SessionState::FixedVerified && !constant_shortcut && !swept_before {
            return Err(SessionError::InvalidState {
                operation: "perform_sweep",
                state: self.state,
            });
        }
        let (solution, classification) = match (&self.chosen, self.classification) {
            (Some(solution), Some(classification)) => (solution, classification),
            _ => {
                return Err(SessionError::InvalidState {
                    operation: "perform_sweep",
                    state: self.state,
                });
            }
        };

        let result = sweep::sweep(
            solution,
            classification,
            self.sweeper.as_deref(),
            &self.fixed,
            SweepGrid { start, end, steps },
        );
        self.state = SessionState::Ready;
        Ok(result)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Candidate roots awaiting a choice, rendered in the formula
    /// grammar.
    pub fn candidates(&self) -> Vec<String> {
        self.candidates.iter().map(ToString::to_string).collect()
    }

    /// The finalized solution, if any, rendered in the formula grammar.
    pub fn solution(&self) -> Option<String> {
        self.chosen.as_ref().map(ToString::to_string)
    }

    pub fn free_variables(&self) -> &[String] {
        &self.free_variables
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn sweeper(&self) -> Option<&str> {
        self.sweeper.as_deref()
    }

    pub fn required_to_fix(&self) -> &[String] {
        &self.required_to_fix
    }

    pub fn fixed(&self) -> &BTreeMap<String, f64> {
        &self.fixed
    }

    /// Installs a root as the session's solution. Classification happens
    /// here and nowhere else.
    fn finalize(&mut self, root: Expr, state: SessionState) -> ResolvedSolution {
        let free_variables: Vec<String> = free_symbols(&root).into_iter().collect();
        let classification = Classification::from_free_count(free_variables.len());
        let resolved = ResolvedSolution {
            solution: root.to_string(),
            free_variables: free_variables.clone(),
            classification,
        };
        self.chosen = Some(root);
        self.free_variables = free_variables;
        self.classification = Some(classification);
        self.state = state;
        resolved
    }

    /// Discards solve results while keeping the formula.
    fn clear_solution(&mut self) {
        self.target = None;
        self.candidates.clear();
        self.chosen = None;
        self.free_variables.clear();
        self.classification = None;
        self.sweeper = None;
        self.required_to_fix.clear();
        self.fixed.clear();
    }

    fn reset(&mut self) {
        self.clear_solution();
        self.formula = None;
        self.equation = None;
        self.state = SessionState::Empty;
    }
}

fn map_engine_error(error: EngineError) -> SessionError {
    match error {
        EngineError::BudgetExhausted => SessionError::Timeout,
        other => SessionError::Unsupported {
            reason: other.to_string(),
        },
    }
}
