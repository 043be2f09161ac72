//! score-runner: headless driver for the fraud risk scoring engine.
//!
//! Usage:
//!   score-runner --generate 500 --seed 7 --refit-every 200
//!   score-runner --input transactions.jsonl --config engine.json --db history.db
//!
//! Reads scoring requests (or generates a deterministic synthetic
//! workload), prints one JSON verdict per line, accumulates feature
//! history, and attempts a refit every `--refit-every` scores.

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use riskscore_core::{
    config::EngineConfig,
    engine::RiskEngine,
    error::ScoreError,
    history::FeatureHistory,
    rng::DetRng,
    transaction::{AccountContext, RiskTier, Transaction, TransactionType},
};
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use uuid::Uuid;

const HISTORY_WINDOW: usize = 10_000;

#[derive(serde::Deserialize)]
struct ScoreRequest {
    transaction: Transaction,
    context: AccountContext,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let generate = parse_arg(&args, "--generate", 0usize);
    let refit_every = parse_arg(&args, "--refit-every", 200usize);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let input = args
        .windows(2)
        .find(|w| w[0] == "--input")
        .map(|w| w[1].clone());
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].clone());

    let config = match config_path {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("loading engine config from {path}"))?,
        None => EngineConfig::default(),
    };
    let engine = RiskEngine::new(config).context("building risk engine")?;
    let history = FeatureHistory::open(db).context("opening feature history")?;

    let requests = match input {
        Some(path) => read_requests(&path)?,
        None => generate_requests(generate.max(1), seed)?,
    };
    log::info!("scoring {} transactions (history at {db})", requests.len());

    let mut tier_counts = [0usize; 4];
    let mut rejected = 0usize;

    for (i, request) in requests.iter().enumerate() {
        match engine.score(&request.transaction, &request.context) {
            Ok(verdict) => {
                println!("{}", serde_json::to_string(&verdict)?);
                tier_counts[tier_index(verdict.tier)] += 1;

                let features =
                    engine.extract_features(&request.transaction, &request.context)?;
                history.record(&features)?;
            }
            Err(ScoreError::InvalidInput(reason)) => {
                log::warn!(
                    "txn={} rejected: {reason}",
                    request.transaction.transaction_id
                );
                rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }

        if (i + 1) % refit_every == 0 {
            match engine.refit(&history.recent(HISTORY_WINDOW)?) {
                Ok(outcome) => log::info!(
                    "refit at txn {} from {} samples",
                    i + 1,
                    outcome.sample_count
                ),
                Err(ScoreError::InsufficientData { needed, got }) => {
                    log::info!("refit deferred: {got}/{needed} samples")
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    log::info!(
        "done: low={} medium={} high={} critical={} rejected={}",
        tier_counts[0],
        tier_counts[1],
        tier_counts[2],
        tier_counts[3],
        rejected
    );
    let stats = engine.model_stats();
    log::info!(
        "model: {} samples, fit at {:?}",
        stats.sample_count,
        stats.fit_timestamp
    );
    Ok(())
}

fn tier_index(tier: RiskTier) -> usize {
    match tier {
        RiskTier::Low => 0,
        RiskTier::Medium => 1,
        RiskTier::High => 2,
        RiskTier::Critical => 3,
    }
}

fn read_requests(path: &str) -> Result<Vec<ScoreRequest>> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    let mut requests = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        requests.push(serde_json::from_str(&line)?);
    }
    Ok(requests)
}

/// Deterministic synthetic workload: mostly ordinary daytime activity
/// with a small slice of late-night, high-value, fresh-account traffic.
fn generate_requests(n: usize, seed: u64) -> Result<Vec<ScoreRequest>> {
    const TYPES: [TransactionType; 8] = [
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::BillPayment,
        TransactionType::MobileBanking,
        TransactionType::Atm,
        TransactionType::Online,
        TransactionType::Cheque,
    ];
    const LOCATIONS: [&str; 5] = ["Punjab", "Sindh", "Karachi", "Lahore", "KPK"];

    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .context("building base timestamp")?;
    let mut rng = DetRng::new(seed, 0);
    let mut requests = Vec::with_capacity(n);

    for i in 0..n {
        let suspicious = rng.chance(0.05);

        let (amount, hour_shift, age, recent) = if suspicious {
            (
                rng.pareto(600_000.0, 1.2).min(9_500_000.0),
                17 + rng.next_u64_below(6) as i64, // pushes into the night
                rng.next_u64_below(25) as i64,
                8 + rng.next_u64_below(7) as u32,
            )
        } else {
            (
                rng.pareto(150.0, 1.6).min(50_000.0),
                rng.next_u64_below(8) as i64, // stays inside business hours
                30 + rng.next_u64_below(3600) as i64,
                rng.next_u64_below(5) as u32,
            )
        };

        let timestamp =
            base + Duration::days((i / 24) as i64) + Duration::hours(hour_shift);
        let location = if suspicious && rng.chance(0.4) {
            Some("Offshore".to_string())
        } else {
            Some(LOCATIONS[rng.next_u64_below(LOCATIONS.len() as u64) as usize].to_string())
        };

        let hex = Uuid::new_v4().simple().to_string();
        requests.push(ScoreRequest {
            transaction: Transaction {
                transaction_id: format!("TXN{}", hex[..12].to_uppercase()),
                account_id: format!("ACC{:08}", rng.next_u64_below(5_000)),
                txn_type: TYPES[i % TYPES.len()],
                amount,
                currency: "PKR".into(),
                timestamp,
                location,
                counterparty: None,
            },
            context: AccountContext {
                account_age_days: age,
                balance: rng.pareto(5_000.0, 1.3).min(50_000_000.0),
                recent_txn_count: recent,
                avg_txn_amount: rng.pareto(100.0, 1.5).min(100_000.0),
            },
        });
    }
    Ok(requests)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
