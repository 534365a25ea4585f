//! Game loop orchestration
//!
//! Owns the only mutable copy of the loop state and drives the
//! Idle -> Active -> Stepping -> Complete -> Active cycle. Completion
//! finalizes counters and rewards before the next problem is generated,
//! so a snapshot can never show an unlock behind the solved count.
//! Chaining is synchronous; pacing/animation is a UI concern layered on
//! the `chained_to_next_problem` flag.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::engine::problem::{self, DivisionProblem};
use crate::engine::progress::{LifetimeProgress, PlayerProgressState};
use crate::engine::rewards::{self, UnlockedReward};
use crate::engine::solver::{self, LongDivisionStep};
use crate::engine::validator::{self, StepOutcome, StepValidation};
use crate::error::{EngineError, Result};

/// Lifecycle phase of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoopPhase {
    /// No active problem yet
    #[default]
    Idle,
    /// Problem and steps installed, cursor at step 0
    Active,
    /// Cursor somewhere inside the step sequence
    Stepping,
    /// Transient: last step just validated; chaining runs immediately,
    /// so snapshots never observe this phase
    Complete,
}

/// Snapshot of everything a UI or persistence collaborator may read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameLoopState {
    pub phase: LoopPhase,
    pub active_problem: Option<DivisionProblem>,
    pub steps: Vec<LongDivisionStep>,
    pub active_step_index: usize,
    /// Input cell the UI should focus
    pub active_input_target: Option<String>,
    pub progress: PlayerProgressState,
    pub unlocked_rewards: Vec<UnlockedReward>,
}

/// Handed to the persistence collaborator when a problem completes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionProblemCompletionSummary {
    pub problem_id: u32,
    pub solved_problems_this_session: u32,
    pub total_problems_solved: u32,
}

/// Combined result of one submission, including everything the chain
/// produced when the submission finished the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct StepInputResult {
    pub validation: StepValidation,
    /// Present only when this submission completed the problem
    pub completion: Option<DivisionProblemCompletionSummary>,
    /// Rewards first unlocked by this submission (image generation keys
    /// off the dinosaur names)
    pub newly_unlocked: Vec<UnlockedReward>,
    pub chained_to_next_problem: bool,
    /// The already-started next problem, when chaining happened
    pub next_problem: Option<DivisionProblem>,
}

/// The orchestrator: composes generator, solver, validator and reward
/// resolver over a single owned state.
pub struct GameLoop {
    config: EngineConfig,
    rng: Pcg32,
    clock: Box<dyn FnMut() -> f64>,
    next_problem_id: u32,
    state: GameLoopState,
}

impl GameLoop {
    /// Fresh loop with zeroed lifetime progress.
    ///
    /// `seed` drives all problem generation (same seed + config = same
    /// problem sequence); `clock` supplies Unix-ms timestamps for
    /// session start and reward stamps.
    pub fn new(
        config: EngineConfig,
        seed: u64,
        clock: impl FnMut() -> f64 + 'static,
    ) -> Result<Self> {
        Self::resume(config, seed, clock, LifetimeProgress::default(), Vec::new())
    }

    /// Loop resumed from persisted lifetime counters and unlock history.
    /// The history is repaired against the milestone law immediately, so
    /// a tampered save never survives past load.
    pub fn resume(
        config: EngineConfig,
        seed: u64,
        clock: impl FnMut() -> f64 + 'static,
        lifetime: LifetimeProgress,
        previous_rewards: Vec<UnlockedReward>,
    ) -> Result<Self> {
        config.validate()?;
        let mut clock: Box<dyn FnMut() -> f64> = Box::new(clock);
        let now = clock();

        let mut lifetime = lifetime;
        lifetime.current_difficulty_level = config
            .progression
            .tier_for(lifetime.total_problems_solved)
            .level;

        let repaired = rewards::resolve(
            lifetime.total_problems_solved,
            &previous_rewards,
            now,
            config.milestone_interval,
            &config.roster,
        );
        lifetime.rewards_unlocked = repaired.unlocked_rewards.len() as u32;

        let progress = PlayerProgressState::new_session(seed, now, lifetime);
        progress.check_consistency()?;

        Ok(Self {
            config,
            rng: Pcg32::seed_from_u64(seed),
            clock,
            next_problem_id: 1,
            state: GameLoopState {
                phase: LoopPhase::Idle,
                active_problem: None,
                steps: Vec::new(),
                active_step_index: 0,
                active_input_target: None,
                progress,
                unlocked_rewards: repaired.unlocked_rewards,
            },
        })
    }

    /// Read-only snapshot for UI and persistence collaborators
    pub fn state(&self) -> &GameLoopState {
        &self.state
    }

    /// Start the next problem. Valid from Idle (first problem of a
    /// session) and Complete (chaining); anything else is a
    /// precondition fault.
    pub fn start_next_problem(&mut self) -> Result<&DivisionProblem> {
        match self.state.phase {
            LoopPhase::Idle | LoopPhase::Complete => {}
            phase => {
                return Err(EngineError::InvalidPhase {
                    operation: "start_next_problem",
                    phase,
                });
            }
        }
        self.state.progress.check_consistency()?;

        let tier = self
            .config
            .progression
            .tier_for(self.state.progress.lifetime.total_problems_solved);
        let problem_id = self.next_problem_id;
        self.next_problem_id += 1;

        let problem = problem::generate(
            tier,
            tier.remainder_mode,
            &mut self.rng,
            self.config.max_generation_attempts,
            problem_id,
        )?;
        let steps = solver::solve(&problem)?;

        log::info!(
            "problem {problem_id}: {} / {} at level {} ({} steps)",
            problem.dividend,
            problem.divisor,
            tier.level,
            steps.len()
        );

        self.state.progress.lifetime.current_difficulty_level = tier.level;
        self.state.progress.record_attempt();
        self.state.active_input_target = steps.first().map(|s| s.input_target_id.clone());
        self.state.steps = steps;
        self.state.active_step_index = 0;
        self.state.phase = LoopPhase::Active;
        Ok(&*self.state.active_problem.insert(problem))
    }

    /// Apply one submitted answer to the current step. Valid from
    /// Active/Stepping. An incorrect answer leaves state untouched; a
    /// completing answer finalizes counters, resolves rewards against
    /// the post-increment total, then chains to the next problem.
    pub fn apply_live_step_input(&mut self, submitted_text: &str) -> Result<StepInputResult> {
        let problem_id = match (self.state.phase, &self.state.active_problem) {
            (LoopPhase::Active | LoopPhase::Stepping, Some(problem)) => problem.id,
            (phase, _) => {
                return Err(EngineError::InvalidPhase {
                    operation: "apply_live_step_input",
                    phase,
                });
            }
        };

        let validation = validator::validate(
            &self.state.steps,
            self.state.active_step_index,
            submitted_text,
        )?;

        match validation.outcome {
            StepOutcome::Incorrect => {
                // Cursor and counters unchanged; caller re-prompts.
                log::debug!(
                    "problem {problem_id} step {}: incorrect ({:?})",
                    self.state.active_step_index,
                    validation.hint
                );
                Ok(StepInputResult {
                    validation,
                    completion: None,
                    newly_unlocked: Vec::new(),
                    chained_to_next_problem: false,
                    next_problem: None,
                })
            }
            StepOutcome::Correct => {
                if let Some(next) = validation.focus_step_index {
                    self.state.active_step_index = next;
                    self.state.active_input_target =
                        self.state.steps.get(next).map(|s| s.input_target_id.clone());
                }
                self.state.phase = LoopPhase::Stepping;
                Ok(StepInputResult {
                    validation,
                    completion: None,
                    newly_unlocked: Vec::new(),
                    chained_to_next_problem: false,
                    next_problem: None,
                })
            }
            StepOutcome::Complete => {
                self.state.progress.record_solve();
                let total = self.state.progress.lifetime.total_problems_solved;
                self.state.progress.lifetime.current_difficulty_level =
                    self.config.progression.tier_for(total).level;

                // Rewards observe the post-increment total.
                let now = (self.clock)();
                let resolution = rewards::resolve(
                    total,
                    &self.state.unlocked_rewards,
                    now,
                    self.config.milestone_interval,
                    &self.config.roster,
                );
                self.state.unlocked_rewards = resolution.unlocked_rewards;
                self.state.progress.lifetime.rewards_unlocked =
                    self.state.unlocked_rewards.len() as u32;

                let completion = DivisionProblemCompletionSummary {
                    problem_id,
                    solved_problems_this_session: self.state.progress.session.solved_problems,
                    total_problems_solved: total,
                };
                log::info!(
                    "problem {problem_id} complete: {total} solved lifetime, {} new rewards",
                    resolution.newly_unlocked.len()
                );

                // Progress and rewards are final; now chain.
                self.state.phase = LoopPhase::Complete;
                self.start_next_problem()?;

                Ok(StepInputResult {
                    validation,
                    completion: Some(completion),
                    newly_unlocked: resolution.newly_unlocked,
                    chained_to_next_problem: true,
                    next_problem: self.state.active_problem.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts;

    fn fixed_clock() -> impl FnMut() -> f64 {
        let mut t = 0.0;
        move || {
            t += 1000.0;
            t
        }
    }

    fn new_loop(seed: u64) -> GameLoop {
        GameLoop::new(EngineConfig::default(), seed, fixed_clock()).unwrap()
    }

    /// Feed every expected value in order; returns the final (completing)
    /// result.
    fn solve_current(game: &mut GameLoop) -> StepInputResult {
        loop {
            let expected = game.state().steps[game.state().active_step_index]
                .expected_value
                .clone();
            let result = game.apply_live_step_input(&expected).unwrap();
            assert_ne!(result.validation.outcome, StepOutcome::Incorrect);
            if result.validation.outcome == StepOutcome::Complete {
                return result;
            }
        }
    }

    #[test]
    fn test_apply_before_start_is_a_phase_fault() {
        let mut game = new_loop(1);
        assert!(matches!(
            game.apply_live_step_input("3"),
            Err(EngineError::InvalidPhase {
                operation: "apply_live_step_input",
                phase: LoopPhase::Idle,
            })
        ));
    }

    #[test]
    fn test_start_while_active_is_a_phase_fault() {
        let mut game = new_loop(1);
        game.start_next_problem().unwrap();
        assert!(matches!(
            game.start_next_problem(),
            Err(EngineError::InvalidPhase {
                operation: "start_next_problem",
                phase: LoopPhase::Active,
            })
        ));
    }

    #[test]
    fn test_start_installs_problem_and_counts_attempt() {
        let mut game = new_loop(2);
        game.start_next_problem().unwrap();
        let state = game.state();
        assert_eq!(state.phase, LoopPhase::Active);
        assert!(state.active_problem.is_some());
        assert!(!state.steps.is_empty());
        assert_eq!(state.active_step_index, 0);
        assert_eq!(
            state.active_input_target.as_deref(),
            Some(state.steps[0].input_target_id.as_str())
        );
        assert_eq!(state.progress.session.attempted_problems, 1);
        assert_eq!(state.progress.lifetime.total_problems_attempted, 1);
        assert_eq!(state.progress.session.solved_problems, 0);
    }

    #[test]
    fn test_incorrect_leaves_state_unchanged() {
        let mut game = new_loop(3);
        game.start_next_problem().unwrap();
        let before = game.state().clone();

        // Expected values are at most 6 digits; a 7-digit answer is
        // always wrong but well-formed.
        let result = game.apply_live_step_input("9999999").unwrap();
        assert_eq!(result.validation.outcome, StepOutcome::Incorrect);
        assert!(!result.chained_to_next_problem);
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_malformed_input_leaves_state_unchanged() {
        let mut game = new_loop(3);
        game.start_next_problem().unwrap();
        let before = game.state().clone();
        assert!(matches!(
            game.apply_live_step_input("abc"),
            Err(EngineError::MalformedInput(_))
        ));
        assert_eq!(game.state(), &before);
    }

    #[test]
    fn test_completion_chains_and_finalizes_in_order() {
        let mut game = new_loop(4);
        let first_id = game.start_next_problem().unwrap().id;

        let result = solve_current(&mut game);
        let completion = result.completion.unwrap();
        assert_eq!(completion.problem_id, first_id);
        assert_eq!(completion.solved_problems_this_session, 1);
        assert_eq!(completion.total_problems_solved, 1);
        assert!(result.chained_to_next_problem);

        let next = result.next_problem.unwrap();
        assert_ne!(next.id, first_id);
        let state = game.state();
        assert_eq!(state.phase, LoopPhase::Active);
        assert_eq!(state.active_problem.as_ref().unwrap().id, next.id);
        assert_eq!(state.active_step_index, 0);
        // Chained problem already counts as attempted
        assert_eq!(state.progress.session.attempted_problems, 2);
    }

    #[test]
    fn test_milestone_unlocks_on_post_increment_total() {
        let mut game = new_loop(5);
        game.start_next_problem().unwrap();

        for solved in 1..=consts::MILESTONE_INTERVAL {
            let result = solve_current(&mut game);
            if solved < consts::MILESTONE_INTERVAL {
                assert!(result.newly_unlocked.is_empty());
            } else {
                // 5th solve: reward 1, observed with total already at 5
                assert_eq!(result.newly_unlocked.len(), 1);
                let reward = &result.newly_unlocked[0];
                assert_eq!(reward.milestone_solved_count, consts::MILESTONE_INTERVAL);
                assert_eq!(reward.dinosaur_name, "Tyrannosaurus");
                assert_eq!(result.completion.unwrap().total_problems_solved, 5);
            }
        }
        let state = game.state();
        assert_eq!(state.unlocked_rewards.len(), 1);
        assert_eq!(state.progress.lifetime.rewards_unlocked, 1);
        // 5 solved moves the default table to level 2
        assert_eq!(state.progress.lifetime.current_difficulty_level, 2);
    }

    #[test]
    fn test_same_seed_same_problem_sequence() {
        let mut a = new_loop(99);
        let mut b = new_loop(99);
        a.start_next_problem().unwrap();
        b.start_next_problem().unwrap();
        for _ in 0..6 {
            assert_eq!(a.state().active_problem, b.state().active_problem);
            solve_current(&mut a);
            solve_current(&mut b);
        }
    }

    #[test]
    fn test_resume_repairs_tampered_history() {
        let lifetime = LifetimeProgress {
            total_problems_solved: 10,
            total_problems_attempted: 12,
            current_difficulty_level: 1,
            rewards_unlocked: 2,
        };
        let tampered = vec![UnlockedReward {
            reward_id: "reward-0001".into(),
            dinosaur_name: "Barney".into(),
            image_path: "rewards/barney.png".into(),
            earned_at: 1.0,
            milestone_solved_count: 5,
        }];
        let game = GameLoop::resume(
            EngineConfig::default(),
            7,
            fixed_clock(),
            lifetime,
            tampered,
        )
        .unwrap();
        let state = game.state();
        assert_eq!(state.unlocked_rewards.len(), 2);
        assert_eq!(state.unlocked_rewards[0].dinosaur_name, "Tyrannosaurus");
        assert_eq!(state.progress.lifetime.rewards_unlocked, 2);
        // Resumed level recomputed from the lifetime total
        assert_eq!(state.progress.lifetime.current_difficulty_level, 2);
    }

    #[test]
    fn test_resume_rejects_corrupt_counters() {
        let lifetime = LifetimeProgress {
            total_problems_solved: 5,
            total_problems_attempted: 3,
            ..Default::default()
        };
        assert!(matches!(
            GameLoop::resume(EngineConfig::default(), 7, fixed_clock(), lifetime, Vec::new()),
            Err(EngineError::CorruptProgress {
                solved: 5,
                attempted: 3
            })
        ));
    }
}
