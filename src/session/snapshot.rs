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

//! Flat, serializable snapshots of a session.
//!
//! Expressions are persisted as display strings in the formula grammar and
//! re-parsed on restore, so a snapshot stays a plain data record with no
//! tree structure inside it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::parser;

use super::{
    Classification, Formula, SessionError, SessionState, SolveOptions, SolverSession,
};

/// Everything needed to rebuild a [`SolverSession`], as plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub formula: Option<String>,
    pub target: Option<String>,
    pub candidates: Vec<String>,
    pub chosen_solution: Option<String>,
    pub free_variables: Vec<String>,
    pub classification: Option<Classification>,
    pub sweeper: Option<String>,
    pub required_to_fix: Vec<String>,
    pub fixed_bindings: BTreeMap<String, f64>,
}

impl SolverSession {
    /// Captures the session as a flat record.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            formula: self.formula.as_ref().map(|f| f.raw.clone()),
            target: self.target.clone(),
            candidates: self.candidates(),
            chosen_solution: self.solution(),
            free_variables: self.free_variables.clone(),
            classification: self.classification,
            sweeper: self.sweeper.clone(),
            required_to_fix: self.required_to_fix.clone(),
            fixed_bindings: self.fixed.clone(),
        }
    }

    /// Rebuilds a session from a snapshot, re-validating the formula and
    /// re-parsing the stored expressions.
    ///
    /// # Errors
    ///
    /// Fails with the usual formula errors when the snapshot's formula or
    /// expression strings no longer parse.
    pub fn restore(snapshot: &SessionSnapshot) -> Result<Self, SessionError> {
        let mut session = Self::with_options(SolveOptions::default());

        if let Some(raw) = &snapshot.formula {
            parser::validate_syntax(raw).map_err(SessionError::Syntax)?;
            let variables = parser::parse_variables(raw);
            if variables.is_empty() {
                return Err(SessionError::NoVariable);
            }
            session.equation = Some(parser::build_equation(raw).map_err(SessionError::Parse)?);
            session.formula = Some(Formula {
                raw: raw.clone(),
                variables,
            });
        }

        let mut candidates = Vec::with_capacity(snapshot.candidates.len());
        for candidate in &snapshot.candidates {
            candidates.push(parse_stored(candidate)?);
        }
        let chosen = match &snapshot.chosen_solution {
            Some(solution) => Some(parse_stored(solution)?),
            None => None,
        };

        session.target = snapshot.target.clone();
        session.candidates = candidates;
        session.chosen = chosen;
        session.free_variables = snapshot.free_variables.clone();
        session.classification = snapshot.classification;
        session.sweeper = snapshot.sweeper.clone();
        session.required_to_fix = snapshot.required_to_fix.clone();
        session.fixed = snapshot.fixed_bindings.clone();
        session.state = snapshot.state;
        Ok(session)
    }
}

fn parse_stored(text: &str) -> Result<Expr, SessionError> {
    parser::parse_expression(text).map_err(SessionError::Parse)
}
