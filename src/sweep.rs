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

//! Numeric sweep of a resolved solution over an inclusive, evenly spaced
//! range of the sweeper variable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::engine::{bind, evaluate, substitute};
use crate::session::Classification;

/// Inclusive evenly spaced sample positions over `[start, end]`.
///
/// Callers validate `steps >= 2` and `start < end` before constructing a
/// grid.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SweepGrid {
    pub start: f64,
    pub end: f64,
    pub steps: usize,
}

impl SweepGrid {
    /// Sample positions; the first is exactly `start` and the last exactly
    /// `end`.
    fn positions(&self) -> Vec<f64> {
        let step = (self.end - self.start) / (self.steps - 1) as f64;
        (0..self.steps)
            .map(|i| {
                if i == self.steps - 1 {
                    self.end
                } else {
                    self.start + step * i as f64
                }
            })
            .collect()
    }
}

/// Outcome of a sweep: parallel `x`/`y` samples plus the sweeper positions
/// that could not be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Sweeper positions that evaluated successfully.
    pub x: Vec<f64>,
    /// Solution values at the corresponding `x` positions.
    pub y: Vec<f64>,
    /// Sweeper positions dropped because evaluation failed there.
    pub skipped: Vec<f64>,
}

/// Evaluates `solution` across `grid`, keeping finite points and recording
/// the rest as skipped.
pub(crate) fn sweep(
    solution: &Expr,
    classification: Classification,
    sweeper: Option<&str>,
    fixed: &BTreeMap<String, f64>,
    grid: SweepGrid,
) -> SweepResult {
    let positions = grid.positions();
    let mut result = SweepResult {
        x: Vec::with_capacity(positions.len()),
        y: Vec::with_capacity(positions.len()),
        skipped: Vec::new(),
    };

    if classification == Classification::Constant {
        // One evaluation covers the whole grid.
        match evaluate(solution) {
            Ok(value) => {
                result.x = positions;
                result.y = vec![value; result.x.len()];
            }
            Err(error) => {
                log::debug!("constant solution failed to evaluate: {}", error);
                result.skipped = positions;
            }
        }
        return result;
    }

    let grounded = substitute(solution, fixed);
    for position in positions {
        let point = match sweeper {
            Some(name) => evaluate(&bind(&grounded, name, position)),
            None => evaluate(&grounded),
        };
        match point {
            Ok(value) => {
                result.x.push(position);
                result.y.push(value);
            }
            Err(_) => result.skipped.push(position),
        }
    }

    if !result.skipped.is_empty() {
        log::debug!(
            "sweep skipped {} of {} positions",
            result.skipped.len(),
            grid.steps
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_endpoints_are_exact() {
        let grid = SweepGrid {
            start: 0.0,
            end: 1.0,
            steps: 7,
        };
        let positions = grid.positions();
        assert_eq!(positions.len(), 7);
        assert_eq!(positions[0], 0.0);
        assert_eq!(positions[6], 1.0);
    }

    #[test]
    fn two_step_grid_is_just_the_endpoints() {
        let grid = SweepGrid {
            start: -3.0,
            end: 5.0,
            steps: 2,
        };
        assert_eq!(grid.positions(), vec![-3.0, 5.0]);
    }
}
