//! Dino Divide - a step-verified long division practice engine
//!
//! Core modules:
//! - `engine`: Deterministic division progression (generation, solving,
//!   validation, rewards, game loop)
//! - `config`: Injected difficulty/roster configuration
//! - `error`: Engine error taxonomy

pub mod config;
pub mod engine;
pub mod error;

pub use config::{DifficultyTier, DinosaurRoster, EngineConfig, ProgressionTable, RemainderMode};
pub use engine::{
    DivisionProblem, DivisionProblemCompletionSummary, GameLoop, GameLoopState, LifetimeProgress,
    LongDivisionStep, LoopPhase, MilestoneResolution, PlayerProgressState, SessionProgress,
    StepHint, StepInputResult, StepKind, StepOutcome, StepValidation, UnlockedReward,
};
pub use error::{EngineError, Result};

/// Engine-wide default constants
pub mod consts {
    /// Solved-problem interval between reward milestones
    pub const MILESTONE_INTERVAL: u32 = 5;
    /// Rejection-sampling budget per generation call
    pub const MAX_GENERATION_ATTEMPTS: u32 = 64;
    /// Largest dividend digit count any tier may configure.
    /// Keeps every intermediate product inside u32.
    pub const MAX_DIVIDEND_DIGITS: u32 = 6;
}

/// Number of decimal digits in `n` (1 for 0)
#[inline]
pub fn digit_count(n: u32) -> u32 {
    if n == 0 { 1 } else { n.ilog10() + 1 }
}

/// Numeric bounds `[lo, hi]` of values with exactly `digits` decimal digits
#[inline]
pub fn digit_bounds(digits: u32) -> (u32, u32) {
    debug_assert!((1..=consts::MAX_DIVIDEND_DIGITS).contains(&digits));
    let lo = if digits == 1 { 1 } else { 10u32.pow(digits - 1) };
    (lo, 10u32.pow(digits) - 1)
}
