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

use super::*;
use crate::parser;
use approx::assert_relative_eq;
use std::collections::BTreeMap;

fn variables(raw: &str) -> Vec<String> {
    formula_variables(raw).unwrap()
}

fn session_with(raw: &str) -> SolverSession {
    let mut session = SolverSession::new();
    session.set_formula(raw).unwrap();
    session
}

// ---------------------------------------------------------------- variables

#[test]
fn variables_are_sorted_and_order_insensitive() {
    let expected = vec!["S".to_string(), "t".to_string(), "v".to_string()];
    assert_eq!(variables("S = v*t"), expected);
    assert_eq!(variables("t*v = S"), expected);
    assert_eq!(variables("S=v*t"), expected);
}

#[test]
fn variables_are_deduplicated() {
    assert_eq!(variables("x*x + x = y"), vec!["x", "y"]);
}

#[test]
fn reserved_constants_are_not_variables() {
    assert_eq!(variables("A = pi * r**2"), vec!["A", "r"]);
    assert_eq!(variables("y = E**x"), vec!["x", "y"]);
    assert_eq!(variables("z = I + x"), vec!["x", "z"]);
}

#[test]
fn reserved_functions_are_not_variables() {
    assert_eq!(variables("y = sin(x) + atanh(z)"), vec!["x", "y", "z"]);
    assert_eq!(variables("y = sqrt(log(n))"), vec!["n", "y"]);
}

// --------------------------------------------------------------- validation

#[test]
fn implied_multiplication_after_digit_is_rejected() {
    let error = formula_variables("3a = 6").unwrap_err();
    let SessionError::Syntax(diagnostic) = error else {
        panic!("expected a syntax error");
    };
    assert!(diagnostic.message.contains("implied multiplication"));
    assert_eq!(diagnostic.column, 2);
    assert_eq!(diagnostic.snippet, "3a = 6");
    assert_eq!(diagnostic.pointer, " ^");
}

#[test]
fn implied_multiplication_after_paren_is_rejected() {
    assert!(formula_variables("y = (x)(x)").is_err());
    assert!(formula_variables("y = (x)2").is_err());
    assert!(formula_variables("y = 3(x + 1)").is_err());
}

#[test]
fn unknown_function_call_is_rejected() {
    let error = formula_variables("foo(x) = 1").unwrap_err();
    let SessionError::Syntax(diagnostic) = error else {
        panic!("expected a syntax error");
    };
    assert!(diagnostic.message.contains("foo"));
    assert_eq!(diagnostic.column, 1);
}

#[test]
fn reserved_function_call_is_accepted() {
    assert!(formula_variables("y = sin(x)").is_ok());
}

#[test]
fn equals_sign_shape_is_enforced() {
    assert!(formula_variables("x + 1").is_err());
    assert!(formula_variables("x = 1 = 2").is_err());
    assert!(formula_variables(" = x").is_err());
    assert!(formula_variables("x = ").is_err());
}

#[test]
fn formula_without_variables_is_rejected_by_session() {
    let mut session = SolverSession::new();
    let error = session.set_formula("2 = 2").unwrap_err();
    assert_eq!(error, SessionError::NoVariable);
    assert_eq!(session.state(), SessionState::Empty);
}

// ------------------------------------------------------------------ solving

#[test]
fn linear_formula_resolves_immediately() {
    let mut session = session_with("S = v*t");
    let outcome = session.solve_for_target("S").unwrap();
    let SolveOutcome::Resolved(resolved) = outcome else {
        panic!("expected a unique solution");
    };
    assert_eq!(resolved.solution, "v*t");
    assert_eq!(resolved.free_variables, vec!["t", "v"]);
    assert_eq!(resolved.classification, Classification::MultiVar);
    assert_eq!(session.state(), SessionState::Resolved);
}

#[test]
fn linear_solve_isolates_the_target() {
    let mut session = session_with("S = v*t");
    let SolveOutcome::Resolved(resolved) = session.solve_for_target("t").unwrap() else {
        panic!("expected a unique solution");
    };
    assert_eq!(resolved.solution, "S/v");
    assert_eq!(resolved.classification, Classification::MultiVar);
}

#[test]
fn reciprocal_formula_clears_the_denominator() {
    let mut session = session_with("w = 1/v");
    let SolveOutcome::Resolved(resolved) = session.solve_for_target("w").unwrap() else {
        panic!("expected a unique solution");
    };
    assert_eq!(resolved.solution, "1/v");
    assert_eq!(resolved.classification, Classification::OneVar);
}

#[test]
fn quadratic_with_two_roots_needs_a_choice() {
    let mut session = session_with("x**2 = 4");
    let outcome = session.solve_for_target("x").unwrap();
    let SolveOutcome::NeedsChoice { candidates } = outcome else {
        panic!("expected candidates");
    };
    assert_eq!(candidates, vec!["-2", "2"]);
    assert_eq!(session.state(), SessionState::NeedsChoice);

    let resolved = session.choose_solution(0).unwrap();
    assert_eq!(resolved.solution, "-2");
    assert_eq!(resolved.classification, Classification::Constant);
    assert_eq!(session.state(), SessionState::SolutionChosen);
}

#[test]
fn irrational_roots_keep_a_reduced_radical() {
    let mut session = session_with("x**2 = 2");
    let SolveOutcome::NeedsChoice { candidates } = session.solve_for_target("x").unwrap()
    else {
        panic!("expected candidates");
    };
    assert_eq!(candidates, vec!["-sqrt(2)", "sqrt(2)"]);
}

#[test]
fn symbolic_quadratic_roots_carry_the_other_variable() {
    let mut session = session_with("x**2 + y = 4");
    let SolveOutcome::NeedsChoice { candidates } = session.solve_for_target("x").unwrap()
    else {
        panic!("expected candidates");
    };
    assert_eq!(candidates.len(), 2);
    assert!(candidates.iter().all(|c| c.contains('y')));

    let resolved = session.choose_solution(1).unwrap();
    assert_eq!(resolved.free_variables, vec!["y"]);
    assert_eq!(resolved.classification, Classification::OneVar);
}

#[test]
fn unknown_target_lists_available_variables() {
    let mut session = session_with("S = v*t");
    let error = session.solve_for_target("q").unwrap_err();
    assert_eq!(
        error,
        SessionError::UnknownTarget {
            target: "q".to_string(),
            available: vec!["S".to_string(), "t".to_string(), "v".to_string()],
        }
    );
    assert_eq!(session.state(), SessionState::FormulaSet);
}

#[test]
fn contradiction_has_no_solution() {
    let mut session = session_with("x = x + 1");
    let error = session.solve_for_target("x").unwrap_err();
    assert_eq!(
        error,
        SessionError::NoSolution {
            target: "x".to_string()
        }
    );
}

#[test]
fn negative_square_has_no_real_solution() {
    let mut session = session_with("x**2 = -4");
    assert!(matches!(
        session.solve_for_target("x"),
        Err(SessionError::NoSolution { .. })
    ));
}

#[test]
fn cubic_is_unsupported() {
    let mut session = session_with("x**3 = 8");
    assert!(matches!(
        session.solve_for_target("x"),
        Err(SessionError::Unsupported { .. })
    ));
}

#[test]
fn target_inside_a_function_is_unsupported() {
    let mut session = session_with("y = sin(x)");
    assert!(matches!(
        session.solve_for_target("x"),
        Err(SessionError::Unsupported { .. })
    ));

    // The other direction is a plain resolution.
    let SolveOutcome::Resolved(resolved) = session.solve_for_target("y").unwrap() else {
        panic!("expected a unique solution");
    };
    assert_eq!(resolved.solution, "sin(x)");
}

#[test]
fn tiny_work_budget_times_out() {
    let mut session = SolverSession::with_options(SolveOptions { work_budget: 3 });
    session.set_formula("x**2 = 4").unwrap();
    assert_eq!(session.solve_for_target("x").unwrap_err(), SessionError::Timeout);
}

#[test]
fn out_of_range_choice_keeps_the_candidates() {
    let mut session = session_with("x**2 = 4");
    session.solve_for_target("x").unwrap();
    let error = session.choose_solution(5).unwrap_err();
    assert_eq!(error, SessionError::IndexOutOfRange { index: 5, count: 2 });
    assert_eq!(session.state(), SessionState::NeedsChoice);

    let resolved = session.choose_solution(1).unwrap();
    assert_eq!(resolved.solution, "2");
}

// ------------------------------------------------------------ state machine

#[test]
fn operations_require_a_formula() {
    let mut session = SolverSession::new();
    assert!(matches!(
        session.solve_for_target("x"),
        Err(SessionError::InvalidState { state: SessionState::Empty, .. })
    ));
    assert!(matches!(
        session.choose_solution(0),
        Err(SessionError::InvalidState { .. })
    ));
    assert!(matches!(
        session.pass_sweeper("x"),
        Err(SessionError::InvalidState { .. })
    ));
    assert!(matches!(
        session.verify_fixed(BTreeMap::new()),
        Err(SessionError::InvalidState { .. })
    ));
    assert!(matches!(
        session.perform_sweep(0.0, 1.0, 2),
        Err(SessionError::InvalidState { .. })
    ));
}

#[test]
fn rejected_formula_leaves_an_empty_session() {
    let mut session = session_with("S = v*t");
    session.solve_for_target("S").unwrap();

    assert!(session.set_formula("3a = 6").is_err());
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.formula().is_none());
    assert!(session.solution().is_none());
}

#[test]
fn new_formula_discards_the_previous_solve() {
    let mut session = session_with("x**2 = 4");
    session.solve_for_target("x").unwrap();

    session.set_formula("w = 1/v").unwrap();
    assert_eq!(session.state(), SessionState::FormulaSet);
    assert!(session.candidates().is_empty());
    assert!(session.target().is_none());
}

#[test]
fn wrong_sweeper_leaves_the_session_untouched() {
    let mut session = session_with("S = v*t");
    session.solve_for_target("S").unwrap();

    let error = session.pass_sweeper("q").unwrap_err();
    assert_eq!(
        error,
        SessionError::SweeperMismatch {
            requested: "q".to_string(),
            options: vec!["t".to_string(), "v".to_string()],
        }
    );
    assert!(session.sweeper().is_none());
    assert_eq!(session.state(), SessionState::Resolved);
}

#[test]
fn fixed_values_must_match_exactly() {
    let mut session = session_with("S = v*t");
    session.solve_for_target("S").unwrap();
    session.pass_sweeper("v").unwrap();

    let error = session.verify_fixed(BTreeMap::new()).unwrap_err();
    assert_eq!(
        error,
        SessionError::FixedMismatch {
            missing: vec!["t".to_string()],
            unexpected: vec![],
        }
    );

    let mut surplus = BTreeMap::new();
    surplus.insert("t".to_string(), 2.0);
    surplus.insert("c".to_string(), 3.0);
    let error = session.verify_fixed(surplus).unwrap_err();
    assert_eq!(
        error,
        SessionError::FixedMismatch {
            missing: vec![],
            unexpected: vec!["c".to_string()],
        }
    );
    assert_eq!(session.state(), SessionState::SweeperSet);

    let mut exact = BTreeMap::new();
    exact.insert("t".to_string(), 2.0);
    session.verify_fixed(exact).unwrap();
    assert_eq!(session.state(), SessionState::FixedVerified);
}

// ----------------------------------------------------------------- sweeping

#[test]
fn multi_var_sweep_binds_fixed_values() {
    let mut session = session_with("S = v*t");
    session.solve_for_target("S").unwrap();
    let accepted = session.pass_sweeper("v").unwrap();
    assert_eq!(accepted.required_to_fix, vec!["t"]);

    let mut fixed = BTreeMap::new();
    fixed.insert("t".to_string(), 2.0);
    session.verify_fixed(fixed).unwrap();

    let result = session.perform_sweep(1.0, 3.0, 3).unwrap();
    assert_eq!(result.x, vec![1.0, 2.0, 3.0]);
    assert_eq!(result.y, vec![2.0, 4.0, 6.0]);
    assert!(result.skipped.is_empty());
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn undefined_points_are_skipped_not_fatal() {
    let mut session = session_with("w = 1/v");
    session.solve_for_target("w").unwrap();
    session.pass_sweeper("v").unwrap();
    session.verify_fixed(BTreeMap::new()).unwrap();

    let result = session.perform_sweep(0.0, 10.0, 11).unwrap();
    assert_eq!(result.skipped, vec![0.0]);
    assert_eq!(result.x.len(), 10);
    assert_eq!(result.y.len(), 10);
    for (x, y) in result.x.iter().zip(&result.y) {
        assert_relative_eq!(*y, 1.0 / *x);
    }
}

#[test]
fn constant_solution_skips_sweeper_and_fixing() {
    let mut session = session_with("x**2 = 4");
    session.solve_for_target("x").unwrap();
    session.choose_solution(0).unwrap();

    let error = session.pass_sweeper("x").unwrap_err();
    assert_eq!(
        error,
        SessionError::SweeperMismatch {
            requested: "x".to_string(),
            options: vec![],
        }
    );

    // Sweeping is allowed straight from the finalized state.
    let result = session.perform_sweep(0.0, 1.0, 3).unwrap();
    assert_eq!(result.x, vec![0.0, 0.5, 1.0]);
    assert_eq!(result.y, vec![-2.0, -2.0, -2.0]);
}

#[test]
fn constant_solution_accepts_an_empty_fixed_set() {
    let mut session = session_with("x**2 = 4");
    session.solve_for_target("x").unwrap();
    session.choose_solution(1).unwrap();

    session.verify_fixed(BTreeMap::new()).unwrap();
    assert_eq!(session.state(), SessionState::FixedVerified);
    let result = session.perform_sweep(-1.0, 1.0, 2).unwrap();
    assert_eq!(result.y, vec![2.0, 2.0]);
}

#[test]
fn unevaluable_constant_skips_every_point() {
    let mut session = session_with("x = I");
    session.solve_for_target("x").unwrap();

    let result = session.perform_sweep(0.0, 1.0, 3).unwrap();
    assert!(result.x.is_empty());
    assert_eq!(result.skipped, vec![0.0, 0.5, 1.0]);
}

#[test]
fn sweep_parameters_are_checked_first() {
    let mut session = SolverSession::new();
    // Parameter errors win over state errors.
    assert!(matches!(
        session.perform_sweep(0.0, 1.0, 1),
        Err(SessionError::SweepParameter { .. })
    ));
    assert!(matches!(
        session.perform_sweep(2.0, 1.0, 5),
        Err(SessionError::SweepParameter { .. })
    ));
    assert!(matches!(
        session.perform_sweep(f64::NAN, 1.0, 5),
        Err(SessionError::SweepParameter { .. })
    ));
    assert!(matches!(
        session.perform_sweep(0.0, f64::INFINITY, 5),
        Err(SessionError::SweepParameter { .. })
    ));
}

#[test]
fn sweeps_can_be_repeated_with_new_ranges() {
    let mut session = session_with("w = 1/v");
    session.solve_for_target("w").unwrap();
    session.pass_sweeper("v").unwrap();
    session.verify_fixed(BTreeMap::new()).unwrap();

    session.perform_sweep(1.0, 2.0, 2).unwrap();
    let second = session.perform_sweep(4.0, 8.0, 2).unwrap();
    assert_eq!(second.x, vec![4.0, 8.0]);
    assert_eq!(second.y, vec![0.25, 0.125]);
}

// ---------------------------------------------------------------- snapshots

#[test]
fn snapshot_round_trips_through_json() {
    let mut session = session_with("x**2 = 4");
    session.solve_for_target("x").unwrap();
    session.choose_solution(1).unwrap();

    let snapshot = session.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: SessionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let mut restored = SolverSession::restore(&parsed).unwrap();
    assert_eq!(restored.state(), SessionState::SolutionChosen);
    assert_eq!(restored.solution().as_deref(), Some("2"));
    assert_eq!(restored.classification(), Some(Classification::Constant));

    let original = session.perform_sweep(0.0, 1.0, 3).unwrap();
    let replayed = restored.perform_sweep(0.0, 1.0, 3).unwrap();
    assert_eq!(original, replayed);
}

#[test]
fn snapshot_json_is_flat() {
    let mut session = session_with("S = v*t");
    session.solve_for_target("S").unwrap();
    session.pass_sweeper("v").unwrap();

    let value = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(value["state"], "sweeper_set");
    assert_eq!(value["formula"], "S = v*t");
    assert_eq!(value["target"], "S");
    assert_eq!(value["chosen_solution"], "v*t");
    assert_eq!(value["classification"], "multi_var");
    assert_eq!(value["sweeper"], "v");
    assert_eq!(value["required_to_fix"][0], "t");
    assert!(value["fixed_bindings"].is_object());
}

#[test]
fn snapshot_with_stale_formula_fails_to_restore() {
    let mut snapshot = session_with("S = v*t").snapshot();
    snapshot.formula = Some("3a = 6".to_string());
    assert!(matches!(
        SolverSession::restore(&snapshot),
        Err(SessionError::Syntax(_))
    ));
}

// --------------------------------------------------------------- evaluation

#[test]
fn evaluation_covers_constants_and_functions() {
    let two_pi = parser::parse_expression("2*pi").unwrap();
    assert_relative_eq!(evaluate(&two_pi).unwrap(), std::f64::consts::TAU);

    let fact = parser::parse_expression("factorial(5)").unwrap();
    assert_eq!(evaluate(&fact).unwrap(), 120.0);

    let nested = parser::parse_expression("sqrt(abs(0 - 16))").unwrap();
    assert_eq!(evaluate(&nested).unwrap(), 4.0);
}

#[test]
fn evaluation_reports_domain_errors() {
    let division = parser::parse_expression("1/0").unwrap();
    assert_eq!(evaluate(&division).unwrap_err(), EvalError::DivisionByZero);

    let imaginary = parser::parse_expression("I + 1").unwrap();
    assert!(matches!(evaluate(&imaginary), Err(EvalError::NonReal)));

    let log_of_zero = parser::parse_expression("log(0)").unwrap();
    assert!(matches!(evaluate(&log_of_zero), Err(EvalError::Domain(_))));
}

#[test]
fn rendered_expressions_reparse_identically() {
    for text in [
        "(a + b)*c - d/(e - f)**2",
        "-sqrt(-4*(y - 4))/2",
        "x**2**3 - -x",
        "sin(pi/6) + E**2",
    ] {
        let first = parser::parse_expression(text).unwrap();
        let rendered = first.to_string();
        let second = parser::parse_expression(&rendered).unwrap();
        assert_eq!(rendered, second.to_string());
    }
}
