mod rules;

use super::domain::{ComponentScores, RiskCategory, RiskLevel};
use super::metrics::BuyerMetrics;
use serde::Serialize;

/// The communication sub-score is carried as a fixed baseline; no dedicated
/// scorer exists for it yet and it gets zero weight in the composition.
pub const COMMUNICATION_BASELINE: u8 = 50;

const WEIGHT_PAYMENT: f64 = 0.35;
const WEIGHT_DISPUTE: f64 = 0.30;
const WEIGHT_BEHAVIORAL: f64 = 0.20;
const WEIGHT_COMPLIANCE: f64 = 0.15;

/// A component below this threshold names the risk category.
const CATEGORY_CONCERN_THRESHOLD: u8 = 40;

/// Composed scoring result before persistence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub components: ComponentScores,
    pub overall: u8,
    pub risk_level: RiskLevel,
    pub risk_category: Option<RiskCategory>,
}

/// Stateless engine applying the component scorers and the fixed weights.
pub struct ScoreEngine;

impl ScoreEngine {
    pub fn score(metrics: &BuyerMetrics) -> ScoreOutcome {
        let components = ComponentScores {
            payment: rules::payment_reliability(metrics),
            dispute: rules::dispute_history(metrics),
            behavioral: rules::behavioral(metrics),
            compliance: rules::compliance(metrics),
            communication: COMMUNICATION_BASELINE,
        };

        let overall = compose_overall(&components);

        ScoreOutcome {
            components,
            overall,
            risk_level: RiskLevel::from_overall(overall),
            risk_category: weakest_category(&components),
        }
    }
}

fn compose_overall(components: &ComponentScores) -> u8 {
    let weighted = f64::from(components.payment) * WEIGHT_PAYMENT
        + f64::from(components.dispute) * WEIGHT_DISPUTE
        + f64::from(components.behavioral) * WEIGHT_BEHAVIORAL
        + f64::from(components.compliance) * WEIGHT_COMPLIANCE;
    weighted.round() as u8
}

/// Name the single weakest component when it sits below the concern
/// threshold. Ties resolve to the first in the fixed evaluation order.
fn weakest_category(components: &ComponentScores) -> Option<RiskCategory> {
    let ordered = [
        (components.payment, RiskCategory::HighPaymentRisk),
        (components.dispute, RiskCategory::HighDisputeHistory),
        (components.behavioral, RiskCategory::BehavioralConcerns),
        (components.compliance, RiskCategory::ComplianceIssues),
    ];

    let mut weakest = ordered[0];
    for candidate in &ordered[1..] {
        if candidate.0 < weakest.0 {
            weakest = *candidate;
        }
    }

    (weakest.0 < CATEGORY_CONCERN_THRESHOLD).then_some(weakest.1)
}
