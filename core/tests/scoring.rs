//! End-to-end scoring scenarios: the blended verdict against a fitted
//! model, fallback policies, and cross-engine determinism.

use chrono::{DateTime, TimeZone, Utc};
use riskscore_core::{
    config::{EngineConfig, UnfitPolicy},
    engine::RiskEngine,
    error::ScoreError,
    features::FEATURE_COUNT,
    transaction::{AccountContext, RiskTier, Transaction, TransactionType},
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    // March 2024: the 4th is a Monday.
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn txn(
    id: &str,
    amount: f64,
    timestamp: DateTime<Utc>,
    txn_type: TransactionType,
    location: Option<&str>,
) -> Transaction {
    Transaction {
        transaction_id: id.into(),
        account_id: "ACC00000001".into(),
        txn_type,
        amount,
        currency: "PKR".into(),
        timestamp,
        location: location.map(Into::into),
        counterparty: None,
    }
}

fn ctx(age: i64, balance: f64, recent: u32, avg: f64) -> AccountContext {
    AccountContext {
        account_age_days: age,
        balance,
        recent_txn_count: recent,
        avg_txn_amount: avg,
    }
}

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

/// Ordinary business-day traffic: Mon-Thu, 09:00-15:00, small amounts
/// against healthy old accounts.
fn benign_corpus(engine: &RiskEngine) -> Vec<[f64; FEATURE_COUNT]> {
    let mut samples = Vec::with_capacity(200);
    for i in 0..200usize {
        let t = txn(
            &format!("TXN{i:010}"),
            100.0 + (i % 90) as f64 * 10.0,
            at(4 + (i % 4) as u32, 9 + (i % 7) as u32),
            TYPES[i % TYPES.len()],
            Some(if i % 2 == 0 { "Punjab" } else { "Sindh" }),
        );
        let c = ctx(
            365 + (i as i64 * 13) % 3000,
            20_000.0 + (i as f64 * 431.0) % 80_000.0,
            (i % 4) as u32,
            300.0 + (i % 40) as f64 * 5.0,
        );
        samples.push(engine.extract_features(&t, &c).unwrap().as_array());
    }
    samples
}

fn fitted_engine() -> RiskEngine {
    let engine = RiskEngine::new(EngineConfig::default_test()).unwrap();
    let corpus = benign_corpus(&engine);
    engine.refit(&corpus).unwrap();
    engine
}

#[test]
fn late_night_outlier_on_fresh_account_is_critical() {
    let engine = fitted_engine();

    // 5M transfer at 02:00 from a 2-day-old account holding 10k.
    let verdict = engine
        .score(
            &txn("TXN-HOT", 5_000_000.0, at(4, 2), TransactionType::Transfer, None),
            &ctx(2, 10_000.0, 2, 800.0),
        )
        .unwrap();

    assert_eq!(verdict.tier, RiskTier::Critical, "verdict: {verdict:?}");
    assert!((0.0..=1.0).contains(&verdict.final_score));
    assert!(verdict
        .factors
        .contains(&"high amount for new account".to_string()));
    assert!(verdict
        .factors
        .contains(&"transaction outside business hours".to_string()));
}

#[test]
fn routine_business_hours_payment_is_low() {
    let engine = fitted_engine();

    // 500 bill payment, Wednesday 14:00, ten-year-old account.
    let verdict = engine
        .score(
            &txn("TXN-OK", 500.0, at(6, 14), TransactionType::BillPayment, Some("Punjab")),
            &ctx(3650, 100_000.0, 1, 600.0),
        )
        .unwrap();

    assert_eq!(verdict.tier, RiskTier::Low, "verdict: {verdict:?}");
    assert_eq!(verdict.rule_score, 0.0);
    assert!(verdict.factors.is_empty());
}

#[test]
fn unfit_model_neutral_fallback() {
    // Default policy: score with a neutral anomaly value, confidence 0.
    let engine = RiskEngine::new(EngineConfig::default_test()).unwrap();

    let verdict = engine
        .score(
            &txn("TXN-1", 500.0, at(6, 14), TransactionType::BillPayment, Some("Punjab")),
            &ctx(3650, 100_000.0, 1, 600.0),
        )
        .unwrap();

    assert_eq!(verdict.anomaly_score, 0.5);
    assert_eq!(verdict.confidence, 0.0);
}

#[test]
fn unfit_model_reject_policy_surfaces_error() {
    let config = EngineConfig {
        unfit_policy: UnfitPolicy::Reject,
        ..EngineConfig::default_test()
    };
    let engine = RiskEngine::new(config).unwrap();

    let err = engine
        .score(
            &txn("TXN-1", 500.0, at(6, 14), TransactionType::BillPayment, None),
            &ctx(3650, 100_000.0, 1, 600.0),
        )
        .unwrap_err();
    assert!(matches!(err, ScoreError::ModelNotReady));
}

#[test]
fn scoring_errors_do_not_poison_subsequent_calls() {
    let engine = fitted_engine();

    let bad = engine.score(
        &txn("TXN-BAD", -5.0, at(6, 14), TransactionType::Deposit, None),
        &ctx(100, 1_000.0, 1, 100.0),
    );
    assert!(matches!(bad, Err(ScoreError::InvalidInput(_))));

    let good = engine
        .score(
            &txn("TXN-OK", 500.0, at(6, 14), TransactionType::BillPayment, Some("Punjab")),
            &ctx(3650, 100_000.0, 1, 600.0),
        )
        .unwrap();
    assert_eq!(good.tier, RiskTier::Low);
}

#[test]
fn scoring_is_idempotent() {
    let engine = fitted_engine();
    let t = txn("TXN-1", 42_000.0, at(5, 19), TransactionType::Online, Some("KPK"));
    let c = ctx(45, 30_000.0, 6, 900.0);

    let first = engine.score(&t, &c).unwrap();
    let second = engine.score(&t, &c).unwrap();
    assert_eq!(first, second);
}

#[test]
fn same_seed_same_corpus_same_verdicts() {
    let a = fitted_engine();
    let b = fitted_engine();

    let t = txn("TXN-1", 42_000.0, at(5, 19), TransactionType::Online, Some("KPK"));
    let c = ctx(45, 30_000.0, 6, 900.0);

    // Forest fitting is seeded; only the fit timestamp differs between
    // the two engines, and it is not part of the verdict.
    assert_eq!(a.score(&t, &c).unwrap(), b.score(&t, &c).unwrap());
}
