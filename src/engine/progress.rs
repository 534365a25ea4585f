//! Session and lifetime progress counters
//!
//! Mutated only by the game loop; everyone else reads snapshots.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Counters for the current sitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session_id: u64,
    /// Unix ms when the session opened
    pub started_at: f64,
    pub solved_problems: u32,
    pub attempted_problems: u32,
}

/// Counters that survive across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LifetimeProgress {
    pub total_problems_solved: u32,
    pub total_problems_attempted: u32,
    pub current_difficulty_level: u8,
    pub rewards_unlocked: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgressState {
    pub session: SessionProgress,
    pub lifetime: LifetimeProgress,
}

impl PlayerProgressState {
    pub fn new_session(session_id: u64, started_at: f64, lifetime: LifetimeProgress) -> Self {
        Self {
            session: SessionProgress {
                session_id,
                started_at,
                solved_problems: 0,
                attempted_problems: 0,
            },
            lifetime,
        }
    }

    /// Invariant: attempted >= solved at both scopes. A violation is a
    /// precondition fault (bad restore or bad call site), not gameplay.
    pub fn check_consistency(&self) -> Result<()> {
        if self.session.solved_problems > self.session.attempted_problems {
            return Err(EngineError::CorruptProgress {
                solved: self.session.solved_problems,
                attempted: self.session.attempted_problems,
            });
        }
        if self.lifetime.total_problems_solved > self.lifetime.total_problems_attempted {
            return Err(EngineError::CorruptProgress {
                solved: self.lifetime.total_problems_solved,
                attempted: self.lifetime.total_problems_attempted,
            });
        }
        Ok(())
    }

    pub fn record_attempt(&mut self) {
        self.session.attempted_problems += 1;
        self.lifetime.total_problems_attempted += 1;
    }

    pub fn record_solve(&mut self) {
        self.session.solved_problems += 1;
        self.lifetime.total_problems_solved += 1;
    }
}
