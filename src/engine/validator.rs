//! Per-step answer validation
//!
//! Submitted text is normalized (trim, digits only, leading zeros
//! stripped) and compared against the expected value as a string, so
//! "007" matches an expected "7" and "0" stays "0". Non-digit input is
//! a validation error, never scored as an incorrect answer.

use serde::{Deserialize, Serialize};

use crate::engine::solver::{LongDivisionStep, StepKind};
use crate::error::{EngineError, Result};

/// What a submission did to the step cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Right answer, more steps remain
    Correct,
    /// Wrong answer, cursor unchanged
    Incorrect,
    /// Right answer on the final step
    Complete,
}

/// Caller-side messaging hook, keyed by the kind of step that missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepHint {
    QuotientDigitTooLarge,
    QuotientDigitTooSmall,
    CheckMultiplication,
    CheckSubtraction,
    CheckBringDown,
}

/// Result of validating one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepValidation {
    pub outcome: StepOutcome,
    pub did_advance: bool,
    /// Step the UI should focus next; None once the problem is complete
    pub focus_step_index: Option<usize>,
    pub normalized_value: String,
    /// Present only on an incorrect outcome
    pub hint: Option<StepHint>,
}

/// Trim, require `^\d+$`, strip leading zeros but keep a bare "0"
pub fn normalize_submission(submitted: &str) -> Result<String> {
    let trimmed = submitted.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(EngineError::MalformedInput(submitted.to_string()));
    }
    let stripped = trimmed.trim_start_matches('0');
    Ok(if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    })
}

fn hint_for(step: &LongDivisionStep, submitted: &str) -> StepHint {
    match step.kind {
        StepKind::QuotientDigit => {
            // Both strings are normalized digit strings; numeric compare
            // decides the direction of the nudge.
            let got: u64 = submitted.parse().unwrap_or(0);
            let want: u64 = step.expected_value.parse().unwrap_or(0);
            if got > want {
                StepHint::QuotientDigitTooLarge
            } else {
                StepHint::QuotientDigitTooSmall
            }
        }
        StepKind::MultiplyResult => StepHint::CheckMultiplication,
        StepKind::SubtractionResult => StepHint::CheckSubtraction,
        StepKind::BringDown => StepHint::CheckBringDown,
    }
}

/// Validate `submitted_text` against the step at `current_step_index`.
pub fn validate(
    steps: &[LongDivisionStep],
    current_step_index: usize,
    submitted_text: &str,
) -> Result<StepValidation> {
    if current_step_index >= steps.len() {
        return Err(EngineError::InvalidStepIndex {
            index: current_step_index,
            len: steps.len(),
        });
    }
    let normalized = normalize_submission(submitted_text)?;
    let step = &steps[current_step_index];

    if normalized != step.expected_value {
        return Ok(StepValidation {
            outcome: StepOutcome::Incorrect,
            did_advance: false,
            focus_step_index: Some(current_step_index),
            hint: Some(hint_for(step, &normalized)),
            normalized_value: normalized,
        });
    }

    let last = current_step_index + 1 == steps.len();
    Ok(StepValidation {
        outcome: if last {
            StepOutcome::Complete
        } else {
            StepOutcome::Correct
        },
        did_advance: true,
        focus_step_index: if last { None } else { Some(current_step_index + 1) },
        normalized_value: normalized,
        hint: None,
    })
}
