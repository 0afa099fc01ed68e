use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Maps the abbreviated names printed on the coupon to names the statistics
/// provider can search for. Unknown names pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct TeamNameMap {
    names: HashMap<String, String>,
}

impl TeamNameMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let names = BUILTIN_NAMES
            .iter()
            .map(|(short, full)| (short.to_string(), full.to_string()))
            .collect();
        Self { names }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let names: HashMap<String, String> =
            serde_json::from_str(raw).context("invalid team name json")?;
        Ok(Self { names })
    }

    /// Loads a JSON object of `"coupon name": "search name"` pairs.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read team names {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    /// Entries from `other` win over existing ones.
    pub fn extend(&mut self, other: TeamNameMap) {
        self.names.extend(other.names);
    }

    pub fn search_name<'a>(&'a self, display_name: &'a str) -> &'a str {
        let key = display_name.trim();
        self.names.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

const BUILTIN_NAMES: &[(&str, &str)] = &[
    // Allsvenskan
    ("Halmstad", "Halmstads BK"),
    ("Sirius", "IK Sirius"),
    ("Kalmar", "Kalmar FF"),
    ("Elfsborg", "IF Elfsborg"),
    ("Malmö FF", "Malmö FF"),
    ("AIK", "AIK Fotboll"),
    ("Hammarby", "Hammarby IF"),
    ("Djurgårde", "Djurgårdens IF"),
    ("Göteborg", "IFK Göteborg"),
    ("Häcken", "BK Häcken"),
    ("Norrköpi", "IFK Norrköping"),
    ("Värnamo", "IFK Värnamo"),
    // Premier League
    ("Man City", "Manchester City"),
    ("Liverpool", "Liverpool"),
    ("Arsenal", "Arsenal"),
    ("Man U", "Manchester United"),
    ("Tottenham", "Tottenham Hotspur"),
    ("Newcastle", "Newcastle United"),
    ("Brighton", "Brighton & Hove Albion"),
    ("Chelsea", "Chelsea"),
    ("Aston V", "Aston Villa"),
    ("Crystal P", "Crystal Palace"),
    ("Wolves", "Wolverhampton Wanderers"),
    ("Fulham", "Fulham"),
    ("Brentford", "Brentford"),
    ("Everton", "Everton"),
    ("Nottingham", "Nottingham Forest"),
    ("West Ham", "West Ham United"),
    ("Bournemou", "AFC Bournemouth"),
    ("Luton", "Luton Town"),
    // Championship
    ("Middlesbr", "Middlesbrough"),
    ("Norwich", "Norwich City"),
    ("Leicester", "Leicester City"),
    ("Ipswich", "Ipswich Town"),
    ("Leeds", "Leeds United"),
    ("Southampt", "Southampton"),
    ("Coventry", "Coventry City"),
    ("Hull", "Hull City"),
    ("Sunderland", "Sunderland"),
    ("Cardiff", "Cardiff City"),
    ("Bristol C", "Bristol City"),
    ("Blackburn", "Blackburn Rovers"),
    ("Stoke", "Stoke City"),
    ("Swansea", "Swansea City"),
    ("Watford", "Watford"),
    ("Preston", "Preston North End"),
    ("Millwall", "Millwall"),
    ("Plymouth", "Plymouth Argyle"),
    ("West Brom", "West Bromwich Albion"),
    ("QPR", "Queens Park Rangers"),
    ("Sheff W", "Sheffield Wednesday"),
    ("Sheff U", "Sheffield United"),
    // League One / League Two
    ("Portsmout", "Portsmouth"),
    ("Derby", "Derby County"),
    ("Bolton", "Bolton Wanderers"),
    ("Peterboro", "Peterborough United"),
    ("Oxford", "Oxford United"),
    ("Barnsley", "Barnsley"),
    ("Blackpool", "Blackpool"),
    ("Stevenage", "Stevenage FC"),
    ("Wycombe", "Wycombe Wanderers"),
    ("Lincoln", "Lincoln City"),
    ("Burton", "Burton Albion"),
    ("Bristol R", "Bristol Rovers"),
    ("Exeter", "Exeter City"),
    ("Northampt", "Northampton Town"),
    ("Doncaster", "Doncaster Rovers"),
    ("Bradford", "Bradford City"),
    ("Stockport", "Stockport County"),
    ("Mansfield", "Mansfield Town"),
    ("Wrexham", "Wrexham"),
    ("Crewe", "Crewe Alexandra"),
    ("Barrow", "Barrow"),
    ("Rotherham", "Rotherham United"),
];
