use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::error::GenerateError;
use crate::http_client::{get_text, http_client};
use crate::signal::MarketPercentages;

pub const SVENSKA_SPEL_DRAWS_URL: &str =
    "https://api.spela.svenskaspel.se/multifetch?urls=/draw/1/stryktipset/draws";

/// One coupon line as published by the pool operator.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEvent {
    pub description: String,
    pub percentages: MarketPercentages,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub draw_number: Option<u32>,
    pub close_date: Option<NaiveDate>,
    pub events: Vec<DrawEvent>,
}

/// Source of coupon events for a run.
pub trait DrawSource {
    fn fetch_draw(&self, date: Option<NaiveDate>) -> Result<Draw, GenerateError>;
}

pub struct SvenskaSpelDraws {
    url: String,
}

impl SvenskaSpelDraws {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl DrawSource for SvenskaSpelDraws {
    fn fetch_draw(&self, date: Option<NaiveDate>) -> Result<Draw, GenerateError> {
        let body = http_client()
            .and_then(|client| get_text(client, &self.url))
            .context("stryktipset draws request failed")
            .map_err(GenerateError::data_source)?;
        let draws = parse_draws_json(&body).map_err(GenerateError::data_source)?;
        let draw = select_draw(draws, date)?;
        info!(
            draw_number = ?draw.draw_number,
            events = draw.events.len(),
            "stryktipset draw loaded"
        );
        Ok(draw)
    }
}

#[derive(Debug, Deserialize)]
struct MultifetchResponse {
    #[serde(default)]
    responses: Vec<DrawsResponse>,
}

#[derive(Debug, Deserialize)]
struct DrawsResponse {
    #[serde(default)]
    draws: Option<Vec<RawDraw>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraw {
    draw_number: Option<u32>,
    reg_close_time: Option<String>,
    #[serde(default)]
    draw_events: Option<Vec<RawDrawEvent>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDrawEvent {
    event_description: String,
    svenska_folket: Option<RawPercentages>,
}

// The API sends these as strings ("45"), but numbers are tolerated.
#[derive(Debug, Deserialize)]
struct RawPercentages {
    one: Value,
    x: Value,
    two: Value,
}

pub fn parse_draws_json(raw: &str) -> Result<Vec<Draw>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let parsed: MultifetchResponse =
        serde_json::from_str(trimmed).context("invalid stryktipset json")?;

    let Some(first) = parsed.responses.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut out = Vec::new();
    for draw in first.draws.unwrap_or_default() {
        let mut events = Vec::new();
        for event in draw.draw_events.unwrap_or_default() {
            let pct = event.svenska_folket.with_context(|| {
                format!("missing svenskaFolket for {}", event.event_description)
            })?;
            let percentages = MarketPercentages::new(
                parse_percent(&pct.one).with_context(|| invalid_value(&event.event_description))?,
                parse_percent(&pct.x).with_context(|| invalid_value(&event.event_description))?,
                parse_percent(&pct.two).with_context(|| invalid_value(&event.event_description))?,
            );
            events.push(DrawEvent {
                description: event.event_description.trim().to_string(),
                percentages,
            });
        }
        out.push(Draw {
            draw_number: draw.draw_number,
            close_date: draw.reg_close_time.as_deref().and_then(parse_close_date),
            events,
        });
    }
    Ok(out)
}

/// Picks the first draw, or the first one closing on `date` when given.
pub fn select_draw(draws: Vec<Draw>, date: Option<NaiveDate>) -> Result<Draw, GenerateError> {
    let picked = match date {
        None => draws.into_iter().next(),
        Some(date) => {
            let found = draws
                .into_iter()
                .find(|d| d.close_date == Some(date))
                .ok_or_else(|| {
                    GenerateError::DataSourceUnavailable(format!(
                        "no stryktipset draw closes on {date}"
                    ))
                })?;
            Some(found)
        }
    };
    // An empty listing means nothing to play this round.
    Ok(picked.unwrap_or(Draw {
        draw_number: None,
        close_date: None,
        events: Vec::new(),
    }))
}

fn invalid_value(description: &str) -> String {
    format!("invalid svenskaFolket value for {description}")
}

fn parse_percent(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok()?,
        _ => return None,
    };
    (n.is_finite() && n >= 0.0).then_some(n)
}

fn parse_close_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        // Local date at the operator's offset.
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}
