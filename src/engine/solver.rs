//! Deterministic long-division step decomposition
//!
//! Pure function of the problem: splits the dividend into digits, seeds
//! a working value from the leading digits, then cycles
//! divide -> multiply -> subtract -> bring-down until the digits run out.
//! The emitted quotient digits must reproduce the problem's quotient and
//! the final subtraction its remainder; anything else is an internal
//! fault, never a user-facing one.

use serde::{Deserialize, Serialize};

use crate::engine::problem::DivisionProblem;
use crate::error::{EngineError, Result};

/// The four kinds of cell a learner fills in, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    /// One digit of the quotient
    QuotientDigit,
    /// quotient digit * divisor
    MultiplyResult,
    /// working value - multiply result
    SubtractionResult,
    /// Next working value after appending the next dividend digit
    BringDown,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::QuotientDigit => "quotient-digit",
            StepKind::MultiplyResult => "multiply-result",
            StepKind::SubtractionResult => "subtraction-result",
            StepKind::BringDown => "bring-down",
        }
    }
}

/// One expected answer cell. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongDivisionStep {
    pub id: u32,
    pub problem_id: u32,
    pub kind: StepKind,
    pub sequence_index: usize,
    /// Canonical digit string the learner must produce
    pub expected_value: String,
    /// Stable UI binding key for the input cell
    pub input_target_id: String,
}

fn push_step(steps: &mut Vec<LongDivisionStep>, problem_id: u32, kind: StepKind, value: u32) {
    let sequence_index = steps.len();
    steps.push(LongDivisionStep {
        id: sequence_index as u32,
        problem_id,
        kind,
        sequence_index,
        expected_value: value.to_string(),
        input_target_id: format!("p{problem_id}-s{sequence_index}"),
    });
}

/// Decompose `problem` into its ordered step sequence.
///
/// Errors with `SolverSelfCheck` if the emitted steps do not reproduce
/// the problem's quotient and remainder.
pub fn solve(problem: &DivisionProblem) -> Result<Vec<LongDivisionStep>> {
    let digits: Vec<u32> = problem
        .dividend
        .to_string()
        .chars()
        .map(|c| c.to_digit(10).unwrap_or(0))
        .collect();

    let mut steps = Vec::new();
    let mut quotient_digits = String::new();

    // Seed the working value: take leading digits until it covers the
    // divisor (or the dividend is exhausted).
    let mut working = 0u32;
    let mut next = 0usize;
    while next < digits.len() {
        working = working * 10 + digits[next];
        next += 1;
        if working >= problem.divisor {
            break;
        }
    }

    let mut last_subtraction;
    loop {
        let quotient_digit = working / problem.divisor;
        let multiply = quotient_digit * problem.divisor;
        let subtraction = working - multiply;

        push_step(&mut steps, problem.id, StepKind::QuotientDigit, quotient_digit);
        push_step(&mut steps, problem.id, StepKind::MultiplyResult, multiply);
        push_step(&mut steps, problem.id, StepKind::SubtractionResult, subtraction);
        quotient_digits.push_str(&quotient_digit.to_string());
        last_subtraction = subtraction;

        if next >= digits.len() {
            break;
        }
        working = subtraction * 10 + digits[next];
        next += 1;
        push_step(&mut steps, problem.id, StepKind::BringDown, working);
    }

    // Hard contract with the generator: the step sequence must land on
    // the problem's own quotient and remainder.
    let rebuilt_quotient = quotient_digits
        .parse::<u32>()
        .map_err(|_| EngineError::SolverSelfCheck {
            problem_id: problem.id,
        })?;
    if rebuilt_quotient != problem.quotient || last_subtraction != problem.remainder {
        log::error!(
            "solver self-check failed for problem {}: got {rebuilt_quotient} r {last_subtraction}, \
             expected {} r {}",
            problem.id,
            problem.quotient,
            problem.remainder
        );
        return Err(EngineError::SolverSelfCheck {
            problem_id: problem.id,
        });
    }

    Ok(steps)
}
