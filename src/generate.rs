use serde::Serialize;
use tracing::info;

use crate::classify::{ClassifiedMatch, MatchInput, TierSizes, Weights, classify, collect_forms};
use crate::config::GeneratorConfig;
use crate::draw_fetch::DrawSource;
use crate::error::GenerateError;
use crate::expand::{TicketRow, expand, expected_row_count, render_rows};
use crate::form::{FormEstimator, TeamResolver};

/// Everything one run produces. A new run builds a new value; nothing is
/// carried over from earlier runs.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    pub draw_number: Option<u32>,
    pub matches: Vec<ClassifiedMatch>,
    pub rows: Vec<TicketRow>,
}

impl GenerationResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows_text(&self) -> String {
        render_rows(&self.rows)
    }

    /// `tip - description (tier)` per match, in coupon order.
    pub fn breakdown(&self) -> Vec<String> {
        self.matches
            .iter()
            .map(|m| format!("{} - {} ({})", m.tip(), m.description, m.tier.label()))
            .collect()
    }
}

/// Classifies matches whose signals are already known and expands the rows.
pub fn build_result(
    draw_number: Option<u32>,
    inputs: &[MatchInput],
    weights: Weights,
    tiers: TierSizes,
) -> Result<GenerationResult, GenerateError> {
    let matches = classify(inputs, weights, tiers)?;
    let rows = expand(&matches);
    debug_assert_eq!(rows.len(), expected_row_count(&matches));
    Ok(GenerationResult {
        draw_number,
        matches,
        rows,
    })
}

/// Full run: fetch the draw, gather form for both sides of every match
/// (skipped when `estimator` is `None`), then classify and expand.
pub fn generate<D, R>(
    draws: &D,
    estimator: Option<&FormEstimator<R>>,
    cfg: &GeneratorConfig,
) -> Result<GenerationResult, GenerateError>
where
    D: DrawSource,
    R: TeamResolver,
{
    let draw = draws.fetch_draw(cfg.date)?;

    let required = cfg.tiers.total();
    if draw.events.len() < required {
        return Err(GenerateError::InsufficientMatches {
            found: draw.events.len(),
            required,
        });
    }
    let events = &draw.events[..required];

    let descriptions: Vec<String> = events.iter().map(|e| e.description.clone()).collect();
    let forms = match estimator {
        Some(estimator) => collect_forms(estimator, &descriptions, cfg.fetch_parallelism),
        None => vec![(0, 0); events.len()],
    };

    let inputs: Vec<MatchInput> = events
        .iter()
        .zip(forms)
        .map(|(event, (home_form, away_form))| MatchInput {
            description: event.description.clone(),
            percentages: event.percentages,
            home_form,
            away_form,
        })
        .collect();

    let result = build_result(draw.draw_number, &inputs, cfg.weights, cfg.tiers)?;
    info!(
        draw_number = ?result.draw_number,
        rows = result.row_count(),
        "system generated"
    );
    Ok(result)
}
