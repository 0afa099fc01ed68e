use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};

use stryktips_gen::classify::{MATCHES_PER_DRAW, MatchInput, TierSizes, Weights};
use stryktips_gen::generate::build_result;

#[derive(Debug, serde::Deserialize)]
struct Snapshot {
    #[serde(default)]
    draw_number: Option<u32>,
    #[serde(default)]
    weights: Option<Weights>,
    #[serde(default)]
    tiers: Option<TierSizes>,
    matches: Vec<MatchInput>,
}

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/draw_snapshot.json"));

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let snap: Snapshot = serde_json::from_str(&raw).context("invalid snapshot json")?;

    let tiers = snap.tiers.unwrap_or_default();
    if !tiers.fits_coupon() {
        bail!("snapshot tiers must add up to {MATCHES_PER_DRAW}, got {tiers:?}");
    }

    // No network: forms come from the snapshot, for quick weight tuning.
    let result = build_result(
        snap.draw_number,
        &snap.matches,
        snap.weights.unwrap_or_default(),
        tiers,
    )?;

    for m in &result.matches {
        println!(
            "{:<4} {:<32} score {:>6.2}  spread {:>5.1}  form {}-{}  {}",
            m.tip(),
            m.description,
            m.score,
            m.spread,
            m.home_form,
            m.away_form,
            m.tier.label()
        );
    }
    println!("Rows: {}", result.row_count());

    Ok(())
}
