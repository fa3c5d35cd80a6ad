use super::super::metrics::BuyerMetrics;

const BASE: f64 = 50.0;

/// Clamp to the valid range first, then round to the nearest integer.
fn finish(score: f64) -> u8 {
    score.clamp(0.0, 100.0).round() as u8
}

/// Payment reliability: on-time percentage bonus, late payment penalty,
/// purchase volume bonus (one point per $50,000, capped at 20).
pub(crate) fn payment_reliability(metrics: &BuyerMetrics) -> u8 {
    let mut score = BASE;
    score += (metrics.on_time_payment_pct * 0.3).min(30.0);
    score -= (metrics.late_payment_count as f64 * 2.0).min(20.0);
    score += (metrics.total_purchased / 10_000.0 * 0.2).min(20.0);
    finish(score)
}

/// Dispute history: dispute and chargeback penalties, an uncapped surcharge
/// once the chargeback rate exceeds 2%, and a seller-win-rate bonus.
pub(crate) fn dispute_history(metrics: &BuyerMetrics) -> u8 {
    let mut score = BASE;
    score -= (metrics.total_disputes as f64 * 5.0).min(30.0);
    score -= (metrics.chargeback_count as f64 * 10.0).min(50.0);
    if metrics.chargeback_rate_pct > 2.0 {
        score -= metrics.chargeback_rate_pct * 2.0;
    }
    score += (metrics.seller_win_rate_pct * 0.5).min(20.0);
    finish(score)
}

/// Behavioral: excess-return penalty above a 20% grace band, unreasonable
/// return and communication penalties, review-ratio bonus (0-1 fraction of
/// the 30-point cap).
pub(crate) fn behavioral(metrics: &BuyerMetrics) -> u8 {
    let mut score = BASE;
    if metrics.return_rate_pct > 20.0 {
        score -= (metrics.return_rate_pct - 20.0) * 3.0;
    }
    score -= metrics.unreasonable_return_count as f64 * 5.0;
    score += (metrics.positive_review_ratio * 30.0).min(30.0);
    score -= metrics.communication_issue_count as f64 * 2.0;
    finish(score)
}

/// Compliance: documentation and KYB issue penalties, a verified-KYB bonus,
/// and a heavy penalty per sanctions flag.
pub(crate) fn compliance(metrics: &BuyerMetrics) -> u8 {
    let mut score = BASE;
    score -= metrics.missing_documentation_count as f64 * 10.0;
    score -= metrics.kyb_issue_count as f64 * 15.0;
    if metrics.kyb_verified {
        score += 20.0;
    }
    score -= metrics.sanctions_flag_count as f64 * 30.0;
    finish(score)
}
