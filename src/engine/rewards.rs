//! Milestone reward resolution
//!
//! Rewards are fully derived from the lifetime solved count: reward N
//! (1-based) unlocks at N * interval and maps to roster[(N-1) mod len].
//! Saved unlock history is trusted only as far as it matches that law;
//! a corrupted suffix is discarded and re-synthesized, which makes
//! resolution idempotent and save-tamper tolerant.

use serde::{Deserialize, Serialize};

use crate::config::DinosaurRoster;

/// One earned collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockedReward {
    pub reward_id: String,
    pub dinosaur_name: String,
    /// Where the image-generation collaborator places the artwork
    pub image_path: String,
    /// Unix ms when first unlocked
    pub earned_at: f64,
    /// Lifetime solved count this reward was earned at
    pub milestone_solved_count: u32,
}

/// Outcome of one resolution pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneResolution {
    /// Full repaired list, reward numbers 1..=highest
    pub unlocked_rewards: Vec<UnlockedReward>,
    /// Rewards synthesized by this call (triggers image generation)
    pub newly_unlocked: Vec<UnlockedReward>,
    pub highest_earned_reward_number: u32,
    /// History entries dropped for breaking the unlock law
    pub discarded_out_of_order: usize,
}

fn synthesize(n: u32, interval: u32, roster: &DinosaurRoster, earned_at: f64) -> UnlockedReward {
    let name = roster.name_for_reward(n);
    UnlockedReward {
        reward_id: format!("reward-{n:04}"),
        dinosaur_name: name.to_string(),
        image_path: format!("rewards/{}.png", name.to_lowercase()),
        earned_at,
        milestone_solved_count: n * interval,
    }
}

/// True when `entry` is exactly what the law dictates for reward `n`
fn matches_law(entry: &UnlockedReward, n: u32, interval: u32, roster: &DinosaurRoster) -> bool {
    entry.milestone_solved_count == n * interval && entry.dinosaur_name == roster.name_for_reward(n)
}

/// Derive the unlock set for `total_solved`, repairing `previous` where
/// it diverges from the law. Stamps synthesized rewards with `earned_at`.
pub fn resolve(
    total_solved: u32,
    previous: &[UnlockedReward],
    earned_at: f64,
    interval: u32,
    roster: &DinosaurRoster,
) -> MilestoneResolution {
    let highest = total_solved / interval;

    // Longest contiguous prefix of history that satisfies the law.
    let mut prefix = 0usize;
    for (i, entry) in previous.iter().enumerate() {
        let n = i as u32 + 1;
        if n > highest || !matches_law(entry, n, interval, roster) {
            break;
        }
        prefix = i + 1;
    }
    let discarded = previous.len() - prefix;
    if discarded > 0 {
        log::warn!(
            "discarding {discarded} unlock entries beyond law-matching prefix of {prefix} \
             (total solved {total_solved})"
        );
    }

    let mut unlocked_rewards: Vec<UnlockedReward> = previous[..prefix].to_vec();
    let mut newly_unlocked = Vec::new();
    for n in (prefix as u32 + 1)..=highest {
        let reward = synthesize(n, interval, roster, earned_at);
        log::info!(
            "milestone {}: unlocked {} (reward {n})",
            reward.milestone_solved_count,
            reward.dinosaur_name
        );
        unlocked_rewards.push(reward.clone());
        newly_unlocked.push(reward);
    }

    MilestoneResolution {
        unlocked_rewards,
        newly_unlocked,
        highest_earned_reward_number: highest,
        discarded_out_of_order: discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: u32 = 5;

    fn roster() -> DinosaurRoster {
        DinosaurRoster::default()
    }

    #[test]
    fn test_highest_earned_reward_number() {
        let r = resolve(14, &[], 0.0, INTERVAL, &roster());
        assert_eq!(r.highest_earned_reward_number, 2);
        assert_eq!(
            r.unlocked_rewards
                .iter()
                .map(|u| u.milestone_solved_count)
                .collect::<Vec<_>>(),
            vec![5, 10]
        );
    }

    #[test]
    fn test_below_first_milestone_unlocks_nothing() {
        let r = resolve(4, &[], 0.0, INTERVAL, &roster());
        assert_eq!(r.highest_earned_reward_number, 0);
        assert!(r.unlocked_rewards.is_empty());
        assert!(r.newly_unlocked.is_empty());
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = resolve(23, &[], 123.0, INTERVAL, &roster());
        assert_eq!(first.newly_unlocked.len(), 4);

        let again = resolve(23, &first.unlocked_rewards, 456.0, INTERVAL, &roster());
        assert!(again.newly_unlocked.is_empty());
        assert_eq!(again.discarded_out_of_order, 0);
        assert_eq!(again.unlocked_rewards, first.unlocked_rewards);
    }

    #[test]
    fn test_corrupt_suffix_discarded_and_resynthesized() {
        let mut history = resolve(10, &[], 1.0, INTERVAL, &roster()).unlocked_rewards;
        history[1].dinosaur_name = "Barney".to_string();

        let r = resolve(12, &history, 99.0, INTERVAL, &roster());
        assert_eq!(r.discarded_out_of_order, 1);
        assert_eq!(r.highest_earned_reward_number, 2);
        assert_eq!(r.newly_unlocked.len(), 1);
        let fixed = &r.unlocked_rewards[1];
        assert_eq!(fixed.dinosaur_name, "Triceratops");
        assert_eq!(fixed.milestone_solved_count, 10);
        assert_eq!(fixed.earned_at, 99.0);
    }

    #[test]
    fn test_wrong_milestone_count_breaks_prefix() {
        let mut history = resolve(15, &[], 1.0, INTERVAL, &roster()).unlocked_rewards;
        history[0].milestone_solved_count = 6;

        let r = resolve(15, &history, 2.0, INTERVAL, &roster());
        // Entry 1 breaks the law, so the whole list is rebuilt
        assert_eq!(r.discarded_out_of_order, 3);
        assert_eq!(r.newly_unlocked.len(), 3);
        assert!(r.unlocked_rewards.iter().all(|u| u.earned_at == 2.0));
    }

    #[test]
    fn test_history_beyond_earned_total_is_discarded() {
        let history = resolve(20, &[], 1.0, INTERVAL, &roster()).unlocked_rewards;
        // Counter rolled back (fresh save, stale reward list)
        let r = resolve(10, &history, 2.0, INTERVAL, &roster());
        assert_eq!(r.highest_earned_reward_number, 2);
        assert_eq!(r.unlocked_rewards.len(), 2);
        assert_eq!(r.discarded_out_of_order, 2);
        assert!(r.newly_unlocked.is_empty());
    }

    #[test]
    fn test_roster_wraps_past_its_length() {
        let roster = roster();
        let total = (roster.len() as u32 + 2) * INTERVAL;
        let r = resolve(total, &[], 0.0, INTERVAL, &roster);
        let n = roster.len() as u32 + 1;
        assert_eq!(
            r.unlocked_rewards[n as usize - 1].dinosaur_name,
            "Tyrannosaurus"
        );
    }

    #[test]
    fn test_preserved_prefix_keeps_original_timestamps() {
        let first = resolve(5, &[], 10.0, INTERVAL, &roster());
        let second = resolve(10, &first.unlocked_rewards, 20.0, INTERVAL, &roster());
        assert_eq!(second.unlocked_rewards[0].earned_at, 10.0);
        assert_eq!(second.unlocked_rewards[1].earned_at, 20.0);
        assert_eq!(second.newly_unlocked.len(), 1);
    }
}
