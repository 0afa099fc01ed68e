use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::form::{FormEstimator, TeamResolver};
use crate::outcome::{Outcome, outcomes_to_string};
use crate::signal::{MarketPercentages, MatchSignal, aggregate};

pub const MATCHES_PER_DRAW: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub market: f64,
    pub form: f64,
}

impl Default for Weights {
    // Market consensus dominates; recent form separates near-ties.
    fn default() -> Self {
        Self {
            market: 0.7,
            form: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    FullHedge,
    PartialHedge,
    Pinned,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::FullHedge => "Helgardering",
            Tier::PartialHedge => "Halvgardering",
            Tier::Pinned => "Spik",
        }
    }

    pub fn width(self) -> usize {
        match self {
            Tier::FullHedge => 3,
            Tier::PartialHedge => 2,
            Tier::Pinned => 1,
        }
    }

    /// Full hedges list outcomes in coupon order, the others in rank order.
    pub fn allowed(self, signal: &MatchSignal) -> Vec<Outcome> {
        match self {
            Tier::FullHedge => Outcome::ALL.to_vec(),
            Tier::PartialHedge | Tier::Pinned => signal.top(self.width()),
        }
    }
}

/// How many matches land in each tier, taken in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSizes {
    pub full_hedge: usize,
    pub partial_hedge: usize,
    pub pinned: usize,
}

impl Default for TierSizes {
    fn default() -> Self {
        Self {
            full_hedge: 4,
            partial_hedge: 4,
            pinned: 5,
        }
    }
}

impl TierSizes {
    pub fn total(&self) -> usize {
        self.full_hedge
            .saturating_add(self.partial_hedge)
            .saturating_add(self.pinned)
    }

    /// True when the three tiers add up to exactly one coupon.
    pub fn fits_coupon(&self) -> bool {
        self.full_hedge
            .checked_add(self.partial_hedge)
            .and_then(|n| n.checked_add(self.pinned))
            == Some(MATCHES_PER_DRAW)
    }

    pub fn row_count(&self) -> u64 {
        let full = u32::try_from(self.full_hedge).unwrap_or(u32::MAX);
        let partial = u32::try_from(self.partial_hedge).unwrap_or(u32::MAX);
        3u64.saturating_pow(full).saturating_mul(2u64.saturating_pow(partial))
    }

    pub fn tier_for_rank(&self, rank: usize) -> Tier {
        if rank < self.full_hedge {
            Tier::FullHedge
        } else if rank < self.full_hedge.saturating_add(self.partial_hedge) {
            Tier::PartialHedge
        } else {
            Tier::Pinned
        }
    }
}

/// One coupon match with both signals already gathered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub description: String,
    pub percentages: MarketPercentages,
    #[serde(default)]
    pub home_form: u32,
    #[serde(default)]
    pub away_form: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMatch {
    pub description: String,
    pub percentages: MarketPercentages,
    pub home_form: u32,
    pub away_form: u32,
    pub spread: f64,
    pub form_gap: u32,
    pub score: f64,
    pub ranked: [(Outcome, f64); 3],
    pub tier: Tier,
    pub allowed: Vec<Outcome>,
}

impl ClassifiedMatch {
    pub fn tip(&self) -> String {
        outcomes_to_string(&self.allowed)
    }
}

/// Scores, ranks and tiers the first `tiers.total()` matches. The returned
/// vector keeps input order; rank only decides the tier.
pub fn classify(
    matches: &[MatchInput],
    weights: Weights,
    tiers: TierSizes,
) -> Result<Vec<ClassifiedMatch>, GenerateError> {
    let required = tiers.total();
    if matches.len() < required {
        return Err(GenerateError::InsufficientMatches {
            found: matches.len(),
            required,
        });
    }
    let matches = &matches[..required];

    let scored: Vec<(MatchSignal, f64, u32)> = matches
        .iter()
        .map(|m| {
            let signal = aggregate(&m.percentages);
            let form_gap = m.home_form.abs_diff(m.away_form);
            let score = weights.market * signal.spread + weights.form * f64::from(form_gap);
            (signal, score, form_gap)
        })
        .collect();

    // Lowest score first. sort_by is stable, so equal scores keep input order.
    let mut by_rank: Vec<usize> = (0..matches.len()).collect();
    by_rank.sort_by(|&a, &b| scored[a].1.total_cmp(&scored[b].1));

    let mut tier_of = vec![Tier::Pinned; matches.len()];
    for (rank, idx) in by_rank.into_iter().enumerate() {
        tier_of[idx] = tiers.tier_for_rank(rank);
    }

    let out = matches
        .iter()
        .zip(scored)
        .zip(tier_of)
        .map(|((m, (signal, score, form_gap)), tier)| {
            let allowed = tier.allowed(&signal);
            debug!(
                description = %m.description,
                score,
                tier = tier.label(),
                "match classified"
            );
            ClassifiedMatch {
                description: m.description.clone(),
                percentages: m.percentages,
                home_form: m.home_form,
                away_form: m.away_form,
                spread: signal.spread,
                form_gap,
                score,
                ranked: signal.ranked,
                tier,
                allowed,
            }
        })
        .collect();

    Ok(out)
}

/// Splits a coupon description such as `"Arsenal - Chelsea"`.
pub fn split_description(description: &str) -> Option<(&str, &str)> {
    let (home, away) = description.split_once(" - ")?;
    let (home, away) = (home.trim(), away.trim());
    if home.is_empty() || away.is_empty() {
        return None;
    }
    Some((home, away))
}

/// Looks up home and away form for every description in parallel and
/// returns once every lookup has finished. Output order follows input order.
pub fn collect_forms<R: TeamResolver>(
    estimator: &FormEstimator<R>,
    descriptions: &[String],
    parallelism: usize,
) -> Vec<(u32, u32)> {
    let sides: Vec<Option<&str>> = descriptions
        .iter()
        .flat_map(|d| match split_description(d) {
            Some((home, away)) => [Some(home), Some(away)],
            None => {
                warn!(description = %d, "unrecognised match description, form set to 0");
                [None, None]
            }
        })
        .collect();

    let forms: Vec<u32> = with_fetch_pool(parallelism, || {
        sides
            .par_iter()
            .map(|side| side.map(|name| estimator.team_form(name)).unwrap_or(0))
            .collect()
    });

    forms.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        MATCHES_PER_DRAW, MatchInput, Tier, TierSizes, Weights, classify, split_description,
    };
    use crate::error::GenerateError;
    use crate::outcome::Outcome;
    use crate::signal::MarketPercentages;

    fn input(desc: &str, pct: (f64, f64, f64), home_form: u32, away_form: u32) -> MatchInput {
        MatchInput {
            description: desc.to_string(),
            percentages: MarketPercentages::new(pct.0, pct.1, pct.2),
            home_form,
            away_form,
        }
    }

    #[test]
    fn worked_score_example() {
        let mut matches: Vec<MatchInput> = (0..13)
            .map(|i| input(&format!("H{i} - A{i}"), (80.0, 10.0, 10.0), 0, 0))
            .collect();
        matches[0] = input("Home - Away", (40.0, 30.0, 30.0), 5, 0);

        let out = classify(&matches, Weights::default(), TierSizes::default()).expect("13 matches");
        let m = &out[0];
        assert!((m.spread - 10.0).abs() < 1e-9);
        assert_eq!(m.form_gap, 5);
        assert!((m.score - 8.5).abs() < 1e-9);
        assert_eq!(m.ranked[0], (Outcome::Home, 40.0));
        assert_eq!(m.ranked[1], (Outcome::Draw, 30.0));
        // Lowest score of the draw, so fully hedged.
        assert_eq!(m.tier, Tier::FullHedge);
        assert_eq!(m.tip(), "1X2");
    }

    #[test]
    fn too_few_matches_is_fatal() {
        let matches: Vec<MatchInput> = (0..12)
            .map(|i| input(&format!("H{i} - A{i}"), (50.0, 25.0, 25.0), 0, 0))
            .collect();
        let err = classify(&matches, Weights::default(), TierSizes::default()).unwrap_err();
        assert!(matches!(
            err,
            GenerateError::InsufficientMatches {
                found: 12,
                required: 13
            }
        ));
        assert_eq!(err.to_string(), "found only 12 matches, 13 required");
    }

    #[test]
    fn extra_matches_are_ignored() {
        let matches: Vec<MatchInput> = (0..15)
            .map(|i| input(&format!("H{i} - A{i}"), (50.0, 25.0, 25.0), 0, 0))
            .collect();
        let out = classify(&matches, Weights::default(), TierSizes::default()).expect("enough");
        assert_eq!(out.len(), 13);
        assert_eq!(out[12].description, "H12 - A12");
    }

    #[test]
    fn higher_spread_gets_pinned_on_favourite() {
        let mut matches: Vec<MatchInput> = (0..13)
            .map(|i| input(&format!("H{i} - A{i}"), (34.0, 33.0, 33.0), 0, 0))
            .collect();
        matches[5] = input("Fav - Dog", (10.0, 15.0, 75.0), 3, 3);
        let out = classify(&matches, Weights::default(), TierSizes::default()).expect("13 matches");
        assert_eq!(out[5].tier, Tier::Pinned);
        assert_eq!(out[5].allowed, vec![Outcome::Away]);
    }

    #[test]
    fn tier_for_rank_boundaries() {
        let tiers = TierSizes::default();
        assert_eq!(tiers.tier_for_rank(3), Tier::FullHedge);
        assert_eq!(tiers.tier_for_rank(4), Tier::PartialHedge);
        assert_eq!(tiers.tier_for_rank(7), Tier::PartialHedge);
        assert_eq!(tiers.tier_for_rank(8), Tier::Pinned);
        assert_eq!(tiers.total(), MATCHES_PER_DRAW);
        assert!(tiers.fits_coupon());
        assert_eq!(tiers.row_count(), 1296);
    }

    #[test]
    fn oversized_tiers_saturate_instead_of_overflowing() {
        let tiers = TierSizes {
            full_hedge: usize::MAX,
            partial_hedge: 4,
            pinned: 5,
        };
        assert_eq!(tiers.total(), usize::MAX);
        assert!(!tiers.fits_coupon());
        assert_eq!(tiers.row_count(), u64::MAX);
        assert_eq!(tiers.tier_for_rank(12), Tier::FullHedge);

        let matches: Vec<MatchInput> = (0..13)
            .map(|i| input(&format!("H{i} - A{i}"), (50.0, 25.0, 25.0), 0, 0))
            .collect();
        let err = classify(&matches, Weights::default(), tiers).unwrap_err();
        assert!(matches!(err, GenerateError::InsufficientMatches { found: 13, .. }));
    }

    #[test]
    fn only_thirteen_match_splits_fit_a_coupon() {
        let split = |full_hedge, partial_hedge, pinned| TierSizes {
            full_hedge,
            partial_hedge,
            pinned,
        };
        assert!(split(3, 5, 5).fits_coupon());
        assert!(split(0, 0, 13).fits_coupon());
        assert!(!split(4, 4, 6).fits_coupon());
        assert!(!split(0, 0, 0).fits_coupon());
    }

    #[test]
    fn custom_tier_sizes_change_required_count() {
        let tiers = TierSizes {
            full_hedge: 1,
            partial_hedge: 1,
            pinned: 1,
        };
        let matches = vec![
            input("A - B", (60.0, 20.0, 20.0), 0, 0),
            input("C - D", (35.0, 33.0, 32.0), 0, 0),
            input("E - F", (45.0, 30.0, 25.0), 0, 0),
        ];
        let out = classify(&matches, Weights::default(), tiers).expect("three matches");
        let got: Vec<Tier> = out.iter().map(|m| m.tier).collect();
        assert_eq!(got, vec![Tier::Pinned, Tier::FullHedge, Tier::PartialHedge]);
    }

    #[test]
    fn descriptions_split_on_spaced_dash() {
        assert_eq!(split_description("Man U - Wolves"), Some(("Man U", "Wolves")));
        assert_eq!(
            split_description("Wolverhampton-Wanderers - Aston V"),
            Some(("Wolverhampton-Wanderers", "Aston V"))
        );
        assert_eq!(split_description("Arsenal vs Chelsea"), None);
        assert_eq!(split_description(" - Chelsea"), None);
    }
}
