//! Feature extraction: determinism, time windows, validation.

use chrono::{DateTime, TimeZone, Utc};
use riskscore_core::{
    config::EngineConfig,
    error::ScoreError,
    features::{location_risk, FeatureExtractor},
    transaction::{AccountContext, Transaction, TransactionType},
};

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    // March 2024: the 4th is a Monday.
    Utc.with_ymd_and_hms(2024, 3, day, hour, 30, 0).unwrap()
}

fn txn(amount: f64, timestamp: DateTime<Utc>, txn_type: TransactionType) -> Transaction {
    Transaction {
        transaction_id: "TXN0000000001".into(),
        account_id: "ACC00000001".into(),
        txn_type,
        amount,
        currency: "PKR".into(),
        timestamp,
        location: Some("Punjab".into()),
        counterparty: None,
    }
}

fn ctx(age: i64, balance: f64, recent: u32) -> AccountContext {
    AccountContext {
        account_age_days: age,
        balance,
        recent_txn_count: recent,
        avg_txn_amount: 500.0,
    }
}

fn extractor() -> FeatureExtractor {
    FeatureExtractor::new(EngineConfig::default_test()).unwrap()
}

#[test]
fn weekday_business_hours_flags() {
    // Monday 14:30 — inside [9, 17), not in the Fri/Sat weekend set.
    let fv = extractor()
        .extract(&txn(500.0, at(4, 14), TransactionType::BillPayment), &ctx(3650, 100_000.0, 1))
        .unwrap();

    assert_eq!(fv.day_of_week, 0.0);
    assert_eq!(fv.hour, 14.0);
    assert_eq!(fv.is_business_hours, 1.0);
    assert_eq!(fv.is_weekend, 0.0);
    assert_eq!(fv.time_risk, 0.0);
}

#[test]
fn friday_is_a_weekend_day() {
    // March 8th 2024 is a Friday; the default weekend set is Fri/Sat.
    let fv = extractor()
        .extract(&txn(500.0, at(8, 14), TransactionType::BillPayment), &ctx(3650, 100_000.0, 1))
        .unwrap();

    assert_eq!(fv.day_of_week, 4.0);
    assert_eq!(fv.is_weekend, 1.0);
    assert!((fv.time_risk - 0.2).abs() < 1e-12);
}

#[test]
fn late_night_time_risk() {
    // 02:30 Monday: outside business hours (+0.3) and late night (+0.4).
    let fv = extractor()
        .extract(&txn(500.0, at(4, 2), TransactionType::Transfer), &ctx(3650, 100_000.0, 1))
        .unwrap();

    assert_eq!(fv.is_business_hours, 0.0);
    assert!((fv.time_risk - 0.7).abs() < 1e-12);
}

#[test]
fn non_wrapping_late_night_window_spares_midday() {
    // An evening window that stays on one side of midnight must not
    // flag every hour of the day.
    let config = EngineConfig {
        late_night_start: 20,
        late_night_end: 22,
        ..EngineConfig::default_test()
    };
    let ex = FeatureExtractor::new(config).unwrap();

    // Monday 14:30: business hours, nowhere near the window.
    let midday = ex
        .extract(&txn(500.0, at(4, 14), TransactionType::BillPayment), &ctx(3650, 100_000.0, 1))
        .unwrap();
    assert_eq!(midday.time_risk, 0.0);

    // Monday 21:30: inside the window and outside business hours.
    let evening = ex
        .extract(&txn(500.0, at(4, 21), TransactionType::BillPayment), &ctx(3650, 100_000.0, 1))
        .unwrap();
    assert!((evening.time_risk - 0.7).abs() < 1e-12);
}

#[test]
fn zero_balance_ratio_floors_denominator() {
    let fv = extractor()
        .extract(&txn(750.0, at(4, 14), TransactionType::Withdrawal), &ctx(100, 0.0, 1))
        .unwrap();

    assert_eq!(fv.amount_to_balance_ratio, 750.0);
}

#[test]
fn velocity_score_saturates_at_one() {
    let ex = extractor();
    let t = txn(500.0, at(4, 14), TransactionType::Atm);

    let low = ex.extract(&t, &ctx(3650, 100_000.0, 3)).unwrap();
    let high = ex.extract(&t, &ctx(3650, 100_000.0, 25)).unwrap();

    assert!((low.velocity_score - 0.3).abs() < 1e-12);
    assert_eq!(high.velocity_score, 1.0);
}

#[test]
fn extraction_is_deterministic() {
    let ex = extractor();
    let t = txn(1234.56, at(5, 11), TransactionType::Online);
    let c = ctx(200, 45_000.0, 4);

    assert_eq!(ex.extract(&t, &c).unwrap(), ex.extract(&t, &c).unwrap());
}

#[test]
fn transaction_type_encoding_is_stable() {
    let expected = [
        (TransactionType::Deposit, 0),
        (TransactionType::Withdrawal, 1),
        (TransactionType::Transfer, 2),
        (TransactionType::BillPayment, 3),
        (TransactionType::MobileBanking, 4),
        (TransactionType::Atm, 5),
        (TransactionType::Online, 6),
        (TransactionType::Cheque, 7),
    ];
    for (ty, code) in expected {
        assert_eq!(ty.encoded(), code, "encoding drifted for {ty:?}");
    }
}

#[test]
fn location_risk_table() {
    assert_eq!(location_risk(Some("Punjab")), 0.05);
    assert_eq!(location_risk(Some("karachi")), 0.10);
    assert_eq!(location_risk(Some("Balochistan")), 0.30);
    // Hostile markers dominate regardless of surrounding text.
    assert_eq!(location_risk(Some("Offshore account center")), 0.60);
    // Unknown and missing both get the mid-level default.
    assert_eq!(location_risk(Some("Atlantis")), 0.25);
    assert_eq!(location_risk(None), 0.25);
    assert_eq!(location_risk(Some("   ")), 0.25);
}

#[test]
fn non_positive_amount_rejected() {
    let ex = extractor();
    for amount in [0.0, -10.0, f64::NAN] {
        let err = ex
            .extract(&txn(amount, at(4, 14), TransactionType::Deposit), &ctx(100, 1_000.0, 1))
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput(_)), "amount {amount}");
    }
}

#[test]
fn over_limit_amount_rejected() {
    let err = extractor()
        .extract(
            &txn(20_000_000.0, at(4, 14), TransactionType::Transfer),
            &ctx(100, 1_000.0, 1),
        )
        .unwrap_err();
    assert!(matches!(err, ScoreError::InvalidInput(_)));
}

#[test]
fn negative_account_age_rejected() {
    let err = extractor()
        .extract(&txn(500.0, at(4, 14), TransactionType::Deposit), &ctx(-1, 1_000.0, 1))
        .unwrap_err();
    assert!(matches!(err, ScoreError::InvalidInput(_)));
}
