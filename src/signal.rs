use serde::{Deserialize, Serialize};

use crate::outcome::Outcome;

/// Public betting distribution ("svenska folket") for one match, in percent.
/// Values are compared relatively and need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketPercentages {
    pub one: f64,
    pub x: f64,
    pub two: f64,
}

impl MarketPercentages {
    pub fn new(one: f64, x: f64, two: f64) -> Self {
        Self { one, x, two }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.one,
            Outcome::Draw => self.x,
            Outcome::Away => self.two,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchSignal {
    pub spread: f64,
    pub ranked: [(Outcome, f64); 3],
}

impl MatchSignal {
    /// The `n` most backed outcomes, most backed first.
    pub fn top(&self, n: usize) -> Vec<Outcome> {
        self.ranked.iter().take(n).map(|(o, _)| *o).collect()
    }
}

pub fn aggregate(pct: &MarketPercentages) -> MatchSignal {
    let mut ranked = Outcome::ALL.map(|o| (o, pct.get(o)));
    // Stable sort over ALL keeps 1 > X > 2 among equal values.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let max = ranked.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
    let min = ranked.iter().map(|(_, v)| *v).fold(f64::MAX, f64::min);

    MatchSignal {
        spread: max - min,
        ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::{MarketPercentages, aggregate};
    use crate::outcome::Outcome;

    #[test]
    fn spread_and_ranking_with_tie() {
        let sig = aggregate(&MarketPercentages::new(40.0, 30.0, 30.0));
        assert!((sig.spread - 10.0).abs() < 1e-9);
        assert_eq!(
            sig.ranked,
            [
                (Outcome::Home, 40.0),
                (Outcome::Draw, 30.0),
                (Outcome::Away, 30.0)
            ]
        );
    }

    #[test]
    fn away_favourite_ranks_first() {
        let sig = aggregate(&MarketPercentages::new(20.0, 25.0, 55.0));
        assert_eq!(sig.top(1), vec![Outcome::Away]);
        assert_eq!(sig.top(2), vec![Outcome::Away, Outcome::Draw]);
        assert!((sig.spread - 35.0).abs() < 1e-9);
    }

    #[test]
    fn three_way_tie_uses_precedence() {
        let sig = aggregate(&MarketPercentages::new(33.0, 33.0, 33.0));
        assert_eq!(sig.spread, 0.0);
        assert_eq!(sig.top(3), Outcome::ALL.to_vec());
    }

    #[test]
    fn draw_and_away_tie_behind_home() {
        let sig = aggregate(&MarketPercentages::new(10.0, 45.0, 45.0));
        assert_eq!(sig.top(2), vec![Outcome::Draw, Outcome::Away]);
    }
}
