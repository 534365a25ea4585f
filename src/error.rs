//! Engine error taxonomy
//!
//! Three distinct classes, never conflated:
//! - Validation errors (`MalformedInput`, `InvalidStepIndex`): bad caller
//!   input, always surfaced. A wrong-but-well-formed answer is NOT an
//!   error; it is an ordinary `StepOutcome::Incorrect`.
//! - Precondition faults (`InvalidPhase`, `UnknownDifficulty`,
//!   `CorruptProgress`, bad config): programmer errors at call sites.
//! - `GenerationExhausted`: terminal for that call; the caller decides
//!   whether to retry with relaxed constraints.
//!
//! Reward-history corruption is deliberately absent: a non-conforming
//! unlock suffix is repaired, not raised.

use thiserror::Error;

use crate::engine::LoopPhase;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("submitted value {0:?} is not a digit string")]
    MalformedInput(String),

    #[error("step index {index} out of range for {len} steps")]
    InvalidStepIndex { index: usize, len: usize },

    #[error("no valid problem found after {attempts} attempts at difficulty {level}")]
    GenerationExhausted { attempts: u32, level: u8 },

    #[error("{operation} is not valid in phase {phase:?}")]
    InvalidPhase {
        operation: &'static str,
        phase: LoopPhase,
    },

    #[error("no difficulty tier configured for level {0}")]
    UnknownDifficulty(u8),

    #[error("progress counters inconsistent: {solved} solved > {attempted} attempted")]
    CorruptProgress { solved: u32, attempted: u32 },

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("long division self-check failed for problem {problem_id}")]
    SolverSelfCheck { problem_id: u32 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
