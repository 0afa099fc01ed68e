use anyhow::Result;
use tracing::{debug, warn};

use crate::team_names::TeamNameMap;

/// Only the most recent results count towards form.
pub const FORM_WINDOW: usize = 5;

const WIN_POINTS: u32 = 3;
const DRAW_POINTS: u32 = 1;

pub type TeamId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentResult {
    pub home_id: TeamId,
    pub away_id: TeamId,
    // None when the provider has no final score (postponed, abandoned).
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

/// Source of team identities and match history. Implementations report
/// failures as errors; `FormEstimator` decides what they mean for a run.
pub trait TeamResolver: Send + Sync {
    fn resolve_team(&self, search_name: &str) -> Result<Option<TeamId>>;

    /// Most recent completed matches, newest first.
    fn recent_results(&self, team_id: TeamId) -> Result<Vec<RecentResult>>;
}

/// Momentum over the first `FORM_WINDOW` results: win 3, draw 1, loss 0.
/// A win counts whichever side the team played on.
pub fn estimate_form(results: &[RecentResult], team_id: TeamId) -> u32 {
    results
        .iter()
        .take(FORM_WINDOW)
        .map(|r| result_points(r, team_id))
        .sum()
}

fn result_points(r: &RecentResult, team_id: TeamId) -> u32 {
    let (Some(home), Some(away)) = (r.home_score, r.away_score) else {
        return 0;
    };
    if home == away {
        return DRAW_POINTS;
    }
    let won = (home > away && r.home_id == team_id) || (away > home && r.away_id == team_id);
    if won { WIN_POINTS } else { 0 }
}

pub struct FormEstimator<R> {
    resolver: R,
    names: TeamNameMap,
}

impl<R: TeamResolver> FormEstimator<R> {
    pub fn new(resolver: R, names: TeamNameMap) -> Self {
        Self { resolver, names }
    }

    /// Never fails: a missing team or a broken lookup degrades to 0 so the
    /// run can continue with less precision.
    pub fn team_form(&self, display_name: &str) -> u32 {
        let search = self.names.search_name(display_name);
        match self.lookup(search) {
            Ok(Some(score)) => {
                debug!(team = search, score, "form resolved");
                score
            }
            Ok(None) => {
                warn!(team = search, "team not found by statistics provider, form set to 0");
                0
            }
            Err(err) => {
                warn!(
                    team = search,
                    error = %format!("{err:#}"),
                    "form lookup failed, form set to 0"
                );
                0
            }
        }
    }

    fn lookup(&self, search_name: &str) -> Result<Option<u32>> {
        let Some(team_id) = self.resolver.resolve_team(search_name)? else {
            return Ok(None);
        };
        let results = self.resolver.recent_results(team_id)?;
        Ok(Some(estimate_form(&results, team_id)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use anyhow::{Result, anyhow};

    use super::{FormEstimator, RecentResult, TeamId, TeamResolver, estimate_form};
    use crate::team_names::TeamNameMap;

    fn res(home_id: TeamId, away_id: TeamId, hs: u32, aws: u32) -> RecentResult {
        RecentResult {
            home_id,
            away_id,
            home_score: Some(hs),
            away_score: Some(aws),
        }
    }

    #[test]
    fn wins_count_on_either_side() {
        let results = vec![res(7, 1, 2, 0), res(2, 7, 0, 3), res(7, 3, 1, 1)];
        assert_eq!(estimate_form(&results, 7), 3 + 3 + 1);
    }

    #[test]
    fn opponent_win_scores_nothing() {
        let results = vec![res(7, 1, 0, 2), res(2, 7, 4, 1)];
        assert_eq!(estimate_form(&results, 7), 0);
    }

    #[test]
    fn only_five_most_recent_count() {
        let results: Vec<RecentResult> = (0..8).map(|i| res(7, 100 + i, 1, 0)).collect();
        assert_eq!(estimate_form(&results, 7), 15);
    }

    #[test]
    fn missing_scores_contribute_nothing() {
        let results = vec![
            RecentResult {
                home_id: 7,
                away_id: 1,
                home_score: None,
                away_score: None,
            },
            res(7, 1, 0, 0),
        ];
        assert_eq!(estimate_form(&results, 7), 1);
        assert_eq!(estimate_form(&[], 7), 0);
    }

    struct StubResolver {
        ids: HashMap<&'static str, TeamId>,
        history: HashMap<TeamId, Vec<RecentResult>>,
    }

    impl TeamResolver for StubResolver {
        fn resolve_team(&self, search_name: &str) -> Result<Option<TeamId>> {
            if search_name == "Broken FC" {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.ids.get(search_name).copied())
        }

        fn recent_results(&self, team_id: TeamId) -> Result<Vec<RecentResult>> {
            self.history
                .get(&team_id)
                .cloned()
                .ok_or_else(|| anyhow!("no history for {team_id}"))
        }
    }

    fn estimator() -> FormEstimator<StubResolver> {
        let resolver = StubResolver {
            ids: HashMap::from([("Manchester United", 10), ("Arsenal", 11)]),
            history: HashMap::from([(10, vec![res(10, 3, 2, 1), res(4, 10, 1, 1)])]),
        };
        FormEstimator::new(resolver, TeamNameMap::builtin())
    }

    #[test]
    fn estimator_applies_name_map() {
        assert_eq!(estimator().team_form("Man U"), 4);
    }

    #[test]
    fn lookup_failures_degrade_to_zero() {
        let est = estimator();
        assert_eq!(est.team_form("Unknown Athletic"), 0);
        assert_eq!(est.team_form("Broken FC"), 0);
        // Resolved but history request failed.
        assert_eq!(est.team_form("Arsenal"), 0);
    }
}
