//! Deterministic division progression engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, supplied by the caller
//! - No I/O, no clocks of its own (timestamps are injected)
//! - Every operation terminates synchronously; generation is bounded
//!   by an explicit attempt budget
//!
//! Callers are responsible for serializing calls (the engine performs
//! no locking); UI and persistence collaborators read state snapshots.

pub mod game_loop;
pub mod problem;
pub mod progress;
pub mod rewards;
pub mod solver;
pub mod validator;

pub use game_loop::{
    DivisionProblemCompletionSummary, GameLoop, GameLoopState, LoopPhase, StepInputResult,
};
pub use problem::{DivisionProblem, generate};
pub use progress::{LifetimeProgress, PlayerProgressState, SessionProgress};
pub use rewards::{MilestoneResolution, UnlockedReward, resolve};
pub use solver::{LongDivisionStep, StepKind, solve};
pub use validator::{StepHint, StepOutcome, StepValidation, validate};
