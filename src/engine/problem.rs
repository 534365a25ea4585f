//! Constrained random problem generation
//!
//! Rejection sampling: each attempt picks digit counts, a divisor, a
//! remainder policy and a quotient, then keeps the candidate only if the
//! resulting dividend lands in the sampled digit count. The budget is
//! explicit; the generator never loops unbounded.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DifficultyTier, RemainderMode};
use crate::error::{EngineError, Result};
use crate::{digit_bounds, digit_count};

/// A fully-determined division problem. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionProblem {
    pub id: u32,
    pub dividend: u32,
    pub divisor: u32,
    pub quotient: u32,
    pub remainder: u32,
    pub difficulty_level: u8,
    /// Whether the generating policy permitted a nonzero remainder
    pub allow_remainder: bool,
}

/// One candidate: divisor and remainder fixed, quotient sampled from the
/// range that keeps the dividend inside the target digit count.
/// Returns None when no quotient can reach that digit count.
fn sample_candidate<R: Rng + ?Sized>(
    rng: &mut R,
    dividend_digits: u32,
    divisor: u32,
    want_remainder: bool,
) -> Option<(u32, u32, u32)> {
    if want_remainder && divisor < 2 {
        return None;
    }
    let remainder = if want_remainder {
        rng.random_range(1..divisor)
    } else {
        0
    };

    let (d_lo, d_hi) = digit_bounds(dividend_digits);
    if remainder >= d_hi {
        return None;
    }
    // Feasible quotients: d_lo <= divisor*q + remainder <= d_hi, q >= 1
    let q_min = if remainder >= d_lo {
        1
    } else {
        (d_lo - remainder).div_ceil(divisor).max(1)
    };
    let q_max = (d_hi - remainder) / divisor;
    if q_min > q_max {
        return None;
    }

    let quotient = rng.random_range(q_min..=q_max);
    let dividend = divisor * quotient + remainder;
    Some((dividend, quotient, remainder))
}

/// Generate a problem for `tier` under `mode`, spending at most
/// `max_attempts` candidates before giving up with `GenerationExhausted`.
pub fn generate<R: Rng + ?Sized>(
    tier: &DifficultyTier,
    mode: RemainderMode,
    rng: &mut R,
    max_attempts: u32,
    problem_id: u32,
) -> Result<DivisionProblem> {
    let (dd_lo, dd_hi) = tier.dividend_digits;
    let (vd_lo, vd_hi) = tier.divisor_digits;

    for attempt in 1..=max_attempts {
        let dividend_digits = rng.random_range(dd_lo..=dd_hi);
        let divisor_digits = rng.random_range(vd_lo..=vd_hi);

        let (mut div_lo, div_hi) = digit_bounds(divisor_digits);
        if mode == RemainderMode::Require {
            // Single-digit divisors of 1 can never leave a remainder
            div_lo = div_lo.max(2);
        }
        let divisor = rng.random_range(div_lo..=div_hi);

        let want_remainder = match mode {
            RemainderMode::Require => true,
            RemainderMode::Forbid => false,
            RemainderMode::Allow => rng.random_bool(0.5),
        };

        let mut candidate = sample_candidate(rng, dividend_digits, divisor, want_remainder);
        if candidate.is_none() && mode == RemainderMode::Allow {
            // The coin flip picked an infeasible policy; try the other
            // side before this attempt counts as spent.
            candidate = sample_candidate(rng, dividend_digits, divisor, !want_remainder);
        }

        let Some((dividend, quotient, remainder)) = candidate else {
            log::debug!(
                "generation attempt {attempt}: no feasible quotient for divisor {divisor} \
                 at {dividend_digits} dividend digits"
            );
            continue;
        };

        if digit_count(dividend) != dividend_digits {
            log::debug!("generation attempt {attempt}: dividend {dividend} missed digit target");
            continue;
        }

        log::debug!(
            "generated {dividend} / {divisor} = {quotient} r {remainder} (attempt {attempt})"
        );
        return Ok(DivisionProblem {
            id: problem_id,
            dividend,
            divisor,
            quotient,
            remainder,
            difficulty_level: tier.level,
            allow_remainder: mode != RemainderMode::Forbid,
        });
    }

    log::warn!(
        "generation exhausted after {max_attempts} attempts at level {}",
        tier.level
    );
    Err(EngineError::GenerationExhausted {
        attempts: max_attempts,
        level: tier.level,
    })
}
