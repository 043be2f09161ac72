//! Deterministic domain rules.
//!
//! An ordered set of independent, additive heuristics. Each rule is a
//! pure predicate over (transaction, context, features) paired with a
//! bounded increment and a human-readable factor string; the total is
//! capped at 1.0. No rule holds state, so unrelated transactions can
//! be scored concurrently without coordination.

use crate::{
    config::EngineConfig,
    features::FeatureVector,
    transaction::{AccountContext, Transaction},
};

pub type RulePredicate =
    fn(&Transaction, &AccountContext, &FeatureVector, &EngineConfig) -> bool;

pub struct Rule {
    pub name: &'static str,
    pub weight: f64,
    pub factor: &'static str,
    predicate: RulePredicate,
}

impl Rule {
    pub fn new(
        name: &'static str,
        weight: f64,
        factor: &'static str,
        predicate: RulePredicate,
    ) -> Self {
        Self {
            name,
            weight,
            factor,
            predicate,
        }
    }

    pub fn fires(
        &self,
        txn: &Transaction,
        ctx: &AccountContext,
        features: &FeatureVector,
        config: &EngineConfig,
    ) -> bool {
        (self.predicate)(txn, ctx, features, config)
    }
}

/// Result of one rule-engine pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Additive score, capped at 1.0.
    pub score: f64,
    /// Factor strings of fired rules, in rule order.
    pub factors: Vec<String>,
    /// Names of fired rules, for logging and tests.
    pub fired: Vec<&'static str>,
}

/// The built-in rule set, in evaluation order.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            name: "high_value_amount",
            weight: 0.30,
            factor: "transaction amount exceeds high-value threshold",
            predicate: |txn, _, _, cfg| txn.amount > cfg.high_value_amount_threshold,
        },
        Rule {
            name: "new_account",
            weight: 0.25,
            factor: "recently opened account",
            predicate: |_, ctx, _, cfg| {
                ctx.account_age_days < cfg.new_account_day_threshold
            },
        },
        Rule {
            name: "high_amount_new_account",
            weight: 0.20,
            factor: "high amount for new account",
            predicate: |txn, ctx, _, cfg| {
                txn.amount > cfg.high_value_amount_threshold
                    && ctx.account_age_days < cfg.new_account_day_threshold
            },
        },
        Rule {
            name: "outside_business_hours",
            weight: 0.15,
            factor: "transaction outside business hours",
            predicate: |_, _, features, _| features.is_business_hours == 0.0,
        },
        Rule {
            name: "weekend",
            weight: 0.10,
            factor: "weekend transaction",
            predicate: |_, _, features, _| features.is_weekend == 1.0,
        },
        Rule {
            name: "over_balance",
            weight: 0.20,
            factor: "transaction amount exceeds account balance",
            predicate: |_, _, features, _| features.amount_to_balance_ratio > 1.0,
        },
        Rule {
            name: "high_velocity",
            weight: 0.20,
            factor: "high transaction velocity",
            predicate: |_, _, features, cfg| {
                features.velocity_score > cfg.velocity_threshold
            },
        },
    ]
}

pub struct RuleEngine {
    rules: Vec<Rule>,
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            rules: default_rules(),
            config,
        }
    }

    /// Compose a custom rule set. New rules slot in without touching
    /// combiner logic.
    pub fn with_rules(config: EngineConfig, rules: Vec<Rule>) -> Self {
        Self { rules, config }
    }

    pub fn evaluate(
        &self,
        txn: &Transaction,
        ctx: &AccountContext,
        features: &FeatureVector,
    ) -> RuleOutcome {
        let mut score = 0.0;
        let mut factors = Vec::new();
        let mut fired = Vec::new();

        for rule in &self.rules {
            if rule.fires(txn, ctx, features, &self.config) {
                score += rule.weight;
                factors.push(rule.factor.to_string());
                fired.push(rule.name);
            }
        }

        RuleOutcome {
            score: score.min(1.0),
            factors,
            fired,
        }
    }
}
