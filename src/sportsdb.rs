use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::form::{RecentResult, TeamId, TeamResolver};
use crate::http_client::{get_text, http_client};

pub const SPORTSDB_BASE_URL: &str = "https://www.thesportsdb.com/api/v1/json";
pub const SPORTSDB_FREE_KEY: &str = "1";

/// TheSportsDB v1 lookups: team search by name and last results by id.
pub struct SportsDb {
    base_url: String,
    api_key: String,
}

impl SportsDb {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self, script: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/{}/{}", self.base_url, self.api_key, script);
        Url::parse_with_params(&raw, params).with_context(|| format!("invalid sportsdb url {raw}"))
    }
}

impl TeamResolver for SportsDb {
    fn resolve_team(&self, search_name: &str) -> Result<Option<TeamId>> {
        let url = self.endpoint("searchteams.php", &[("t", search_name)])?;
        let body = get_text(http_client()?, url.as_str()).context("team search request failed")?;
        parse_team_search_json(&body)
    }

    fn recent_results(&self, team_id: TeamId) -> Result<Vec<RecentResult>> {
        let id = team_id.to_string();
        let url = self.endpoint("eventslast.php", &[("id", id.as_str())])?;
        let body = get_text(http_client()?, url.as_str()).context("last events request failed")?;
        parse_last_events_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct TeamSearch {
    #[serde(default)]
    teams: Option<Vec<SearchTeam>>,
}

#[derive(Debug, Deserialize)]
struct SearchTeam {
    #[serde(rename = "idTeam")]
    id_team: Value,
}

#[derive(Debug, Deserialize)]
struct LastEvents {
    #[serde(default)]
    results: Option<Vec<LastEvent>>,
}

#[derive(Debug, Deserialize)]
struct LastEvent {
    #[serde(rename = "idHomeTeam", default)]
    id_home_team: Value,
    #[serde(rename = "idAwayTeam", default)]
    id_away_team: Value,
    #[serde(rename = "intHomeScore", default)]
    int_home_score: Value,
    #[serde(rename = "intAwayScore", default)]
    int_away_score: Value,
}

/// First search hit, or `None` when the provider knows no such team.
pub fn parse_team_search_json(raw: &str) -> Result<Option<TeamId>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let parsed: TeamSearch = serde_json::from_str(trimmed).context("invalid team search json")?;
    let Some(team) = parsed.teams.and_then(|t| t.into_iter().next()) else {
        return Ok(None);
    };
    let id = value_as_u32(&team.id_team).context("team search returned a non-numeric idTeam")?;
    Ok(Some(id))
}

/// Results in provider order (newest first). Events with unusable ids are
/// skipped; missing scores are kept as `None`.
pub fn parse_last_events_json(raw: &str) -> Result<Vec<RecentResult>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let parsed: LastEvents = serde_json::from_str(trimmed).context("invalid last events json")?;
    Ok(parsed
        .results
        .unwrap_or_default()
        .iter()
        .filter_map(|e| {
            Some(RecentResult {
                home_id: value_as_u32(&e.id_home_team)?,
                away_id: value_as_u32(&e.id_away_team)?,
                home_score: value_as_u32(&e.int_home_score),
                away_score: value_as_u32(&e.int_away_score),
            })
        })
        .collect())
}

fn value_as_u32(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
