//! Developer tier recalculation from project review history.
//!
//! Each developer receives at most one review per completed project, so the
//! review count doubles as the completed-project count.

use serde::Serialize;

use crate::error::CoreError;

string_enum! {
    /// Skill tier derived from review history, lowest first.
    pub enum Tier {
        Trainee => "TRAINEE",
        Junior => "JUNIOR",
        Mid => "MID",
        Senior => "SENIOR",
        Elite => "ELITE",
    }
}

/// Lowest accepted rating or sub-score.
pub const MIN_RATING: i16 = 1;

/// Highest accepted rating or sub-score.
pub const MAX_RATING: i16 = 5;

/// Minimums per tier as `(tier, completed_projects, average_rating)`,
/// scanned highest first.
pub const TIER_THRESHOLDS: &[(Tier, i64, f64)] = &[
    (Tier::Elite, 25, 4.5),
    (Tier::Senior, 15, 4.0),
    (Tier::Mid, 8, 3.5),
    (Tier::Junior, 3, 3.0),
    (Tier::Trainee, 0, 0.0),
];

impl Tier {
    /// Score bonus used by the developer suggestion scorer.
    pub fn bonus(self) -> i64 {
        match self {
            Tier::Trainee => 0,
            Tier::Junior => 5,
            Tier::Mid => 10,
            Tier::Senior => 15,
            Tier::Elite => 20,
        }
    }
}

/// The tier-related fields written back to a developer's user row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierStats {
    pub tier: Tier,
    pub completed_projects: i64,
    pub average_rating: f64,
    pub total_reviews: i64,
}

/// Highest tier whose project and rating floors are both met.
pub fn tier_for(completed_projects: i64, average_rating: f64) -> Tier {
    TIER_THRESHOLDS
        .iter()
        .find(|(_, min_projects, min_rating)| {
            completed_projects >= *min_projects && average_rating >= *min_rating
        })
        .map(|(tier, _, _)| *tier)
        .unwrap_or(Tier::Trainee)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recompute a developer's stats from the full set of review ratings.
///
/// Pure and idempotent: the same ratings always yield the same stats.
pub fn recalculate(ratings: &[i16]) -> TierStats {
    let total_reviews = ratings.len() as i64;
    let average_rating = if ratings.is_empty() {
        0.0
    } else {
        let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
        round2(sum as f64 / total_reviews as f64)
    };
    let completed_projects = total_reviews;

    TierStats {
        tier: tier_for(completed_projects, average_rating),
        completed_projects,
        average_rating,
        total_reviews,
    }
}

/// Validate a rating or sub-score on the 1–5 scale.
pub fn validate_rating(field: &str, value: i16) -> Result<(), CoreError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(CoreError::validation(format!(
            "{field} must be between {MIN_RATING} and {MAX_RATING} (got {value})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_developer_fails_senior_floor() {
        assert_eq!(tier_for(8, 3.6), Tier::Mid);
    }

    #[test]
    fn elite_rating_floor_is_enforced() {
        assert_eq!(tier_for(25, 4.4), Tier::Senior);
        assert_eq!(tier_for(25, 4.5), Tier::Elite);
    }

    #[test]
    fn defaults_to_trainee() {
        assert_eq!(tier_for(0, 0.0), Tier::Trainee);
        assert_eq!(tier_for(2, 5.0), Tier::Trainee);
        assert_eq!(tier_for(40, 2.9), Tier::Trainee);
    }

    #[test]
    fn empty_history_is_zeroed() {
        let stats = recalculate(&[]);
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.tier, Tier::Trainee);
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let stats = recalculate(&[5, 4, 4]);
        assert_eq!(stats.average_rating, 4.33);
        assert_eq!(stats.completed_projects, 3);
        assert_eq!(stats.tier, Tier::Junior);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let ratings = vec![5, 5, 4, 3, 5, 4, 4, 5];
        let first = recalculate(&ratings);
        let second = recalculate(&ratings);
        assert_eq!(first, second);
        assert_eq!(first.tier, Tier::Mid);
    }

    #[test]
    fn ratings_outside_scale_are_rejected() {
        assert!(validate_rating("rating", 0).is_err());
        assert!(validate_rating("rating", 6).is_err());
        assert!(validate_rating("rating", 3).is_ok());
    }

    #[test]
    fn bonuses_increase_with_tier() {
        let bonuses: Vec<_> = Tier::ALL.iter().map(|t| t.bonus()).collect();
        assert_eq!(bonuses, vec![0, 5, 10, 15, 20]);
    }
}
