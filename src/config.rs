use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tracing::debug;

use crate::classify::{MATCHES_PER_DRAW, TierSizes, Weights};
use crate::draw_fetch::SVENSKA_SPEL_DRAWS_URL;
use crate::sportsdb::{SPORTSDB_BASE_URL, SPORTSDB_FREE_KEY};
use crate::team_names::TeamNameMap;

const DEFAULT_FETCH_PARALLELISM: usize = 6;
const MAX_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub draws_url: String,
    pub sportsdb_base_url: String,
    pub sportsdb_api_key: String,
    pub form_enabled: bool,
    pub weights: Weights,
    pub tiers: TierSizes,
    pub fetch_parallelism: usize,
    pub team_names_path: Option<PathBuf>,
    pub date: Option<NaiveDate>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            draws_url: SVENSKA_SPEL_DRAWS_URL.to_string(),
            sportsdb_base_url: SPORTSDB_BASE_URL.to_string(),
            sportsdb_api_key: SPORTSDB_FREE_KEY.to_string(),
            form_enabled: true,
            weights: Weights::default(),
            tiers: TierSizes::default(),
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
            team_names_path: None,
            date: None,
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or blank keys keep
    /// their defaults, out-of-range numbers are clamped. Tier sizes that do
    /// not add up to one coupon are rejected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let d = Self::default();
        let dw = Weights::default();
        let dt = TierSizes::default();

        let date = match get("STRYKTIPS_DATE") {
            Some(raw) => Some(parse_date(&raw)?),
            None => None,
        };

        let tiers = TierSizes {
            full_hedge: parsed(get("TIER_FULL"), dt.full_hedge),
            partial_hedge: parsed(get("TIER_PARTIAL"), dt.partial_hedge),
            pinned: parsed(get("TIER_PINNED"), dt.pinned),
        };
        if !tiers.fits_coupon() {
            bail!(
                "tier sizes {}/{}/{} must add up to {MATCHES_PER_DRAW}",
                tiers.full_hedge,
                tiers.partial_hedge,
                tiers.pinned
            );
        }

        Ok(Self {
            draws_url: get("STRYKTIPS_DRAWS_URL").unwrap_or(d.draws_url),
            sportsdb_base_url: get("SPORTSDB_BASE_URL").unwrap_or(d.sportsdb_base_url),
            sportsdb_api_key: get("SPORTSDB_API_KEY").unwrap_or(d.sportsdb_api_key),
            form_enabled: get("FORM_ENABLED")
                .map(|v| parse_bool(&v))
                .unwrap_or(d.form_enabled),
            weights: Weights {
                market: parsed(get("MARKET_WEIGHT"), dw.market).clamp(0.0, MAX_WEIGHT),
                form: parsed(get("FORM_WEIGHT"), dw.form).clamp(0.0, MAX_WEIGHT),
            },
            tiers,
            fetch_parallelism: parsed(get("FETCH_PARALLELISM"), d.fetch_parallelism).clamp(2, 32),
            team_names_path: get("TEAM_NAMES_PATH").map(PathBuf::from),
            date,
        })
    }

    /// Built-in table, extended by `TEAM_NAMES_PATH` when set.
    pub fn team_names(&self) -> Result<TeamNameMap> {
        let mut names = TeamNameMap::builtin();
        if let Some(path) = self.team_names_path.as_ref() {
            names.extend(TeamNameMap::load(path)?);
            debug!(entries = names.len(), path = %path.display(), "team name table extended");
        }
        Ok(names)
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

fn parsed<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.parse::<T>().ok()).unwrap_or(default)
}

fn parse_bool(v: &str) -> bool {
    let t = v.to_ascii_lowercase();
    !(t == "0" || t == "false" || t == "off" || t == "no")
}
