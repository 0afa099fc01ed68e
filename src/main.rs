use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stryktips_gen::config::{GeneratorConfig, parse_date};
use stryktips_gen::draw_fetch::SvenskaSpelDraws;
use stryktips_gen::form::FormEstimator;
use stryktips_gen::generate::{GenerationResult, generate};
use stryktips_gen::sportsdb::SportsDb;

const USAGE: &str = "usage: stryktips [--date YYYY-MM-DD] [--out PATH] [--json]";

#[derive(Debug, Default)]
struct Args {
    date: Option<String>,
    out: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--date" => args.date = Some(it.next().context("--date needs a value")?),
            "--out" => args.out = Some(PathBuf::from(it.next().context("--out needs a path")?)),
            "--json" => args.json = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}\n{USAGE}"),
        }
    }
    Ok(args)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("generation failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let mut cfg = GeneratorConfig::from_env()?;
    if let Some(raw) = args.date.as_deref() {
        cfg.date = Some(parse_date(raw)?);
    }

    let draws = SvenskaSpelDraws::new(cfg.draws_url.clone());
    let estimator = FormEstimator::new(
        SportsDb::new(cfg.sportsdb_base_url.clone(), cfg.sportsdb_api_key.clone()),
        cfg.team_names()?,
    );

    info!(
        "generating {} rows ({}H, {}h, {}S)",
        cfg.tiers.row_count(),
        cfg.tiers.full_hedge,
        cfg.tiers.partial_hedge,
        cfg.tiers.pinned
    );
    let result = generate(&draws, cfg.form_enabled.then_some(&estimator), &cfg)?;
    report(&result);
    write_output(&result, &args)
}

fn report(result: &GenerationResult) {
    info!("{} rows generated", result.row_count());
    for line in result.breakdown() {
        info!("{line}");
    }
}

fn write_output(result: &GenerationResult, args: &Args) -> Result<()> {
    let text = if args.json {
        serde_json::to_string_pretty(result).context("serialize result")?
    } else {
        result.rows_text()
    };

    if let Some(path) = args.out.as_ref() {
        fs::write(path, format!("{text}\n"))
            .with_context(|| format!("write {}", path.display()))?;
        info!("{} rows written to {}", result.row_count(), path.display());
        return Ok(());
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}").context("write rows")?;
    Ok(())
}
