//! Developer suggestion scorer for revision assignment.
//!
//! Score = familiarity (50 if the developer already has a task on the
//! project) + availability (`max(0, 30 - 5 * active tasks)`) + tier bonus.
//! Read-only and deterministic: ties keep candidate input order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::tier::Tier;
use crate::types::DbId;

/// Bonus for developers who already worked on the project.
pub const FAMILIARITY_BONUS: i64 = 50;

/// Availability score for a developer with no active tasks.
pub const AVAILABILITY_CEILING: i64 = 30;

/// Availability lost per active task.
pub const AVAILABILITY_STEP: i64 = 5;

/// Scorer input for one active developer.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub developer_id: DbId,
    pub name: String,
    pub tier: Tier,
    pub active_task_count: i64,
    pub has_project_history: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub developer_id: DbId,
    pub name: String,
    pub tier: Tier,
    pub active_task_count: i64,
    pub has_project_history: bool,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub candidates: Vec<ScoredCandidate>,
    pub recommended: Option<ScoredCandidate>,
}

pub fn score(candidate: &Candidate) -> i64 {
    let familiarity = if candidate.has_project_history {
        FAMILIARITY_BONUS
    } else {
        0
    };
    let availability =
        (AVAILABILITY_CEILING - AVAILABILITY_STEP * candidate.active_task_count).max(0);
    familiarity + availability + candidate.tier.bonus()
}

/// Assemble candidates from the active developer pool.
///
/// `project_assignees` may contain duplicates (one entry per task); it is
/// reduced to distinct developer ids. `active_counts` maps developer id to
/// ASSIGNED + IN_PROGRESS tasks across all projects; missing means zero.
pub fn build_candidates(
    developers: &[(DbId, String, Tier)],
    project_assignees: &[DbId],
    active_counts: &HashMap<DbId, i64>,
) -> Vec<Candidate> {
    let familiar: HashSet<DbId> = project_assignees.iter().copied().collect();
    developers
        .iter()
        .map(|(id, name, tier)| Candidate {
            developer_id: *id,
            name: name.clone(),
            tier: *tier,
            active_task_count: active_counts.get(id).copied().unwrap_or(0),
            has_project_history: familiar.contains(id),
        })
        .collect()
}

/// Rank candidates by descending score. `sort_by` is stable, so equal
/// scores keep input order.
pub fn rank(candidates: Vec<Candidate>) -> Ranking {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|c| {
            let score = score(&c);
            ScoredCandidate {
                developer_id: c.developer_id,
                name: c.name,
                tier: c.tier,
                active_task_count: c.active_task_count,
                has_project_history: c.has_project_history,
                score,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let recommended = scored.first().cloned();
    Ranking {
        candidates: scored,
        recommended,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: DbId, tier: Tier, active: i64, history: bool) -> Candidate {
        Candidate {
            developer_id: id,
            name: format!("dev-{id}"),
            tier,
            active_task_count: active,
            has_project_history: history,
        }
    }

    #[test]
    fn score_components_add_up() {
        assert_eq!(score(&candidate(1, Tier::Senior, 2, true)), 50 + 20 + 15);
        assert_eq!(score(&candidate(1, Tier::Trainee, 0, false)), 30);
    }

    #[test]
    fn availability_never_goes_negative() {
        assert_eq!(score(&candidate(1, Tier::Trainee, 6, false)), 0);
        assert_eq!(score(&candidate(1, Tier::Trainee, 20, false)), 0);
    }

    #[test]
    fn project_history_dominates_all_else_equal() {
        let with = score(&candidate(1, Tier::Mid, 3, true));
        let without = score(&candidate(2, Tier::Mid, 3, false));
        assert!(with >= 50 + Tier::Mid.bonus());
        assert!(with > without);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranking = rank(vec![
            candidate(3, Tier::Junior, 1, false),
            candidate(1, Tier::Junior, 1, false),
            candidate(2, Tier::Elite, 0, false),
        ]);
        let ids: Vec<_> = ranking.candidates.iter().map(|c| c.developer_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(ranking.recommended.map(|c| c.developer_id), Some(2));
    }

    #[test]
    fn empty_pool_has_no_recommendation() {
        let ranking = rank(Vec::new());
        assert!(ranking.candidates.is_empty());
        assert!(ranking.recommended.is_none());
    }

    #[test]
    fn build_deduplicates_task_history_and_defaults_load() {
        let devs = vec![(1, "a".to_string(), Tier::Mid), (2, "b".to_string(), Tier::Mid)];
        let counts = HashMap::from([(1, 2)]);
        let candidates = build_candidates(&devs, &[1, 1, 1], &counts);
        assert!(candidates[0].has_project_history);
        assert_eq!(candidates[0].active_task_count, 2);
        assert!(!candidates[1].has_project_history);
        assert_eq!(candidates[1].active_task_count, 0);
    }

    #[test]
    fn ranking_is_deterministic() {
        let input = vec![
            candidate(1, Tier::Mid, 1, true),
            candidate(2, Tier::Senior, 0, false),
            candidate(3, Tier::Mid, 1, true),
        ];
        assert_eq!(rank(input.clone()), rank(input));
    }
}
