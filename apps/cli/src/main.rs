#![deny(warnings)]

//! Headless runner: analyze one auction round and print it as JSON.
//!
//! ```text
//! cli --seed assets/scenarios/bundang-apartment.seed.json \
//!     --docs assets/scenarios/bundang-apartment.docs.json \
//!     --bid 610000000 [--policy-dir assets/policy] [--as-of 2024-06-01]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use auction_core::{CourtDocsRaw, PropertySeed};
use auction_econ::{analyze_with_store, AnalysisInput};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    seed: Option<PathBuf>,
    docs: Option<PathBuf>,
    bid: Decimal,
    policy_dir: Option<PathBuf>,
    as_of: Option<NaiveDate>,
    version: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("{arg} needs a value"));
        match arg.as_str() {
            "--seed" => args.seed = Some(value()?.into()),
            "--docs" => args.docs = Some(value()?.into()),
            "--bid" => {
                let raw = value()?;
                args.bid = raw.parse().with_context(|| format!("invalid --bid {raw}"))?;
            }
            "--policy-dir" => args.policy_dir = Some(value()?.into()),
            "--as-of" => {
                let raw = value()?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("invalid --as-of {raw}, expected YYYY-MM-DD"))?;
                args.as_of = Some(date);
            }
            "--version" => args.version = true,
            other => bail!("unknown argument {other}"),
        }
    }
    Ok(args)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn as_of(date: Option<NaiveDate>) -> Result<DateTime<Utc>> {
    match date {
        Some(d) => {
            let midnight = d
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| anyhow!("invalid date {d}"))?;
            Ok(Utc.from_utc_datetime(&midnight))
        }
        None => Ok(Utc::now()),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    if args.version {
        println!("cli {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_SHA"));
        return Ok(());
    }
    let seed_path = args.seed.as_deref().context("--seed <json> is required")?;
    info!(seed = %seed_path.display(), bid = %args.bid, "starting round");

    let store = policykit::load(args.policy_dir.as_deref())?;
    let seed: PropertySeed = read_json(seed_path)?;
    let court_docs: Option<CourtDocsRaw> = args
        .docs
        .as_deref()
        .map(read_json::<CourtDocsRaw>)
        .transpose()?;

    let input = AnalysisInput {
        seed,
        court_docs,
        user_bid: args.bid,
        as_of: as_of(args.as_of)?,
    };
    let (policy, analysis) = analyze_with_store(&input, &store)?;

    let round = auction_sim::play_round(&analysis, args.bid, &input.seed, &policy)?;
    let scored = auction_score::score_analysis(analysis, args.bid);

    let out = json!({
        "analysis": scored.analysis,
        "score": scored.score,
        "round": round,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
