//! Engine configuration
//!
//! Everything here is injected explicitly at construction time; the
//! engine holds no ambient/global tables. Callers usually start from
//! `EngineConfig::default()` and override pieces.

use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::{EngineError, Result};

/// Whether generated problems may, must, or must not leave a remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RemainderMode {
    /// Division is always exact
    #[default]
    Forbid,
    /// Coin flip per problem
    Allow,
    /// Every problem leaves a nonzero remainder
    Require,
}

impl RemainderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemainderMode::Forbid => "forbid",
            RemainderMode::Allow => "allow",
            RemainderMode::Require => "require",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "forbid" | "none" => Some(RemainderMode::Forbid),
            "allow" | "mixed" => Some(RemainderMode::Allow),
            "require" => Some(RemainderMode::Require),
            _ => None,
        }
    }
}

/// One difficulty bucket: digit-count ranges plus remainder policy,
/// unlocked once lifetime solved count reaches `min_total_solved`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTier {
    pub level: u8,
    /// Lifetime solved-count threshold at which this tier activates
    pub min_total_solved: u32,
    /// Inclusive (min, max) digit count of the dividend
    pub dividend_digits: (u32, u32),
    /// Inclusive (min, max) digit count of the divisor
    pub divisor_digits: (u32, u32),
    pub remainder_mode: RemainderMode,
}

impl DifficultyTier {
    fn validate(&self) -> Result<()> {
        let (dlo, dhi) = self.dividend_digits;
        let (vlo, vhi) = self.divisor_digits;
        if dlo == 0 || dlo > dhi || dhi > consts::MAX_DIVIDEND_DIGITS {
            return Err(EngineError::InvalidConfig(format!(
                "tier {}: dividend digit range {:?} invalid",
                self.level, self.dividend_digits
            )));
        }
        if vlo == 0 || vlo > vhi || vhi > dhi {
            return Err(EngineError::InvalidConfig(format!(
                "tier {}: divisor digit range {:?} invalid against dividend {:?}",
                self.level, self.divisor_digits, self.dividend_digits
            )));
        }
        Ok(())
    }
}

/// Monotonic lifetime-solved → tier mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionTable {
    tiers: Vec<DifficultyTier>,
}

impl ProgressionTable {
    /// Build a table, rejecting empty/non-monotonic/out-of-range input
    pub fn new(tiers: Vec<DifficultyTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(EngineError::InvalidConfig(
                "progression table must have at least one tier".into(),
            ));
        }
        if tiers[0].min_total_solved != 0 {
            return Err(EngineError::InvalidConfig(
                "first tier threshold must be 0".into(),
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].min_total_solved <= pair[0].min_total_solved {
                return Err(EngineError::InvalidConfig(format!(
                    "tier thresholds must strictly increase ({} then {})",
                    pair[0].min_total_solved, pair[1].min_total_solved
                )));
            }
        }
        for tier in &tiers {
            tier.validate()?;
        }
        Ok(Self { tiers })
    }

    /// Highest tier whose threshold has been reached
    pub fn tier_for(&self, total_solved: u32) -> &DifficultyTier {
        self.tiers
            .iter()
            .rev()
            .find(|t| t.min_total_solved <= total_solved)
            .unwrap_or(&self.tiers[0])
    }

    /// Look up a tier by its level number
    pub fn tier_by_level(&self, level: u8) -> Result<&DifficultyTier> {
        self.tiers
            .iter()
            .find(|t| t.level == level)
            .ok_or(EngineError::UnknownDifficulty(level))
    }

    pub fn tiers(&self) -> &[DifficultyTier] {
        &self.tiers
    }
}

impl Default for ProgressionTable {
    fn default() -> Self {
        // 2-digit warmup through 4-digit with remainders; thresholds
        // line up with the milestone interval so tier-ups land on
        // reward unlocks.
        Self {
            tiers: vec![
                DifficultyTier {
                    level: 1,
                    min_total_solved: 0,
                    dividend_digits: (2, 2),
                    divisor_digits: (1, 1),
                    remainder_mode: RemainderMode::Forbid,
                },
                DifficultyTier {
                    level: 2,
                    min_total_solved: 5,
                    dividend_digits: (3, 3),
                    divisor_digits: (1, 1),
                    remainder_mode: RemainderMode::Allow,
                },
                DifficultyTier {
                    level: 3,
                    min_total_solved: 15,
                    dividend_digits: (3, 4),
                    divisor_digits: (1, 2),
                    remainder_mode: RemainderMode::Allow,
                },
                DifficultyTier {
                    level: 4,
                    min_total_solved: 30,
                    dividend_digits: (4, 4),
                    divisor_digits: (2, 2),
                    remainder_mode: RemainderMode::Require,
                },
            ],
        }
    }
}

/// Fixed, duplicate-free list of reward creatures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DinosaurRoster {
    names: Vec<String>,
}

impl DinosaurRoster {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(EngineError::InvalidConfig("roster must not be empty".into()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(EngineError::InvalidConfig(format!(
                    "duplicate roster entry {name:?}"
                )));
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Creature for 1-based reward number `n`, wrapping around the roster
    pub fn name_for_reward(&self, n: u32) -> &str {
        debug_assert!(n >= 1);
        &self.names[((n - 1) as usize) % self.names.len()]
    }
}

impl Default for DinosaurRoster {
    fn default() -> Self {
        Self {
            names: [
                "Tyrannosaurus",
                "Triceratops",
                "Stegosaurus",
                "Velociraptor",
                "Brachiosaurus",
                "Ankylosaurus",
                "Spinosaurus",
                "Parasaurolophus",
                "Allosaurus",
                "Pteranodon",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Everything the game loop needs injected
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub progression: ProgressionTable,
    pub roster: DinosaurRoster,
    /// Solved problems per reward milestone
    pub milestone_interval: u32,
    /// Rejection-sampling budget per generation call
    pub max_generation_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            progression: ProgressionTable::default(),
            roster: DinosaurRoster::default(),
            milestone_interval: consts::MILESTONE_INTERVAL,
            max_generation_attempts: consts::MAX_GENERATION_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.milestone_interval == 0 {
            return Err(EngineError::InvalidConfig(
                "milestone interval must be >= 1".into(),
            ));
        }
        if self.max_generation_attempts == 0 {
            return Err(EngineError::InvalidConfig(
                "generation attempt budget must be >= 1".into(),
            ));
        }
        Ok(())
    }
}
