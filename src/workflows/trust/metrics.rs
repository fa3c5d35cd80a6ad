use std::sync::Arc;

use super::domain::{
    ActivityCounters, BuyerId, DisputeStanding, PaymentTiming, ReturnOutcome,
};
use super::repository::{BuyerActivitySource, RepositoryError};

/// Normalized input bundle consumed by the component scorers.
///
/// Percentages are expressed 0-100; `positive_review_ratio` is the one
/// exception and stays a 0-1 fraction because it directly scales the
/// 30-point review bonus.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyerMetrics {
    pub total_transactions: u64,
    pub on_time_payment_pct: f64,
    pub late_payment_count: u64,
    pub total_purchased: f64,
    pub total_disputes: u64,
    pub open_disputes: u64,
    pub resolved_disputes: u64,
    pub chargeback_count: u64,
    pub chargeback_rate_pct: f64,
    pub seller_win_rate_pct: f64,
    pub return_rate_pct: f64,
    pub unreasonable_return_count: u64,
    pub positive_review_ratio: f64,
    pub communication_issue_count: u64,
    pub kyb_verified: bool,
    pub kyb_issue_count: u64,
    pub missing_documentation_count: u64,
    pub sanctions_flag_count: u64,
}

impl BuyerMetrics {
    /// Neutral bundle for a buyer with no history. Zero-count categories
    /// default so that the absence of data never penalizes: 100% on-time
    /// with no transactions, zero rates and counts everywhere else.
    pub fn neutral() -> Self {
        Self {
            total_transactions: 0,
            on_time_payment_pct: 100.0,
            late_payment_count: 0,
            total_purchased: 0.0,
            total_disputes: 0,
            open_disputes: 0,
            resolved_disputes: 0,
            chargeback_count: 0,
            chargeback_rate_pct: 0.0,
            seller_win_rate_pct: 0.0,
            return_rate_pct: 0.0,
            unreasonable_return_count: 0,
            positive_review_ratio: 0.0,
            communication_issue_count: 0,
            kyb_verified: false,
            kyb_issue_count: 0,
            missing_documentation_count: 0,
            sanctions_flag_count: 0,
        }
    }

    pub fn counters(&self) -> ActivityCounters {
        ActivityCounters {
            total_transactions: self.total_transactions,
            total_disputes: self.total_disputes,
            chargeback_count: self.chargeback_count,
            late_payment_count: self.late_payment_count,
        }
    }
}

/// Reduces a buyer's raw transaction, dispute, review, and compliance
/// records to the metric bundle the scorers consume. Read-only.
pub struct MetricAggregator<S> {
    source: Arc<S>,
}

impl<S: BuyerActivitySource> MetricAggregator<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn aggregate(&self, buyer_id: &BuyerId) -> Result<BuyerMetrics, RepositoryError> {
        let transactions = self.source.transactions(buyer_id)?;
        let disputes = self.source.disputes(buyer_id)?;
        let reviews = self.source.reviews(buyer_id)?;
        let compliance = self.source.compliance_snapshot(buyer_id)?;

        let mut metrics = BuyerMetrics::neutral();

        metrics.total_transactions = transactions.len() as u64;
        metrics.total_purchased = transactions.iter().map(|tx| tx.amount).sum();

        let settled = transactions
            .iter()
            .filter(|tx| tx.payment != PaymentTiming::Outstanding)
            .count() as u64;
        let on_time = transactions
            .iter()
            .filter(|tx| tx.payment == PaymentTiming::OnTime)
            .count() as u64;
        metrics.late_payment_count = transactions
            .iter()
            .filter(|tx| tx.payment == PaymentTiming::Late)
            .count() as u64;
        if settled > 0 {
            metrics.on_time_payment_pct = on_time as f64 / settled as f64 * 100.0;
        }

        let returns = transactions
            .iter()
            .filter(|tx| tx.return_outcome != ReturnOutcome::None)
            .count() as u64;
        metrics.unreasonable_return_count = transactions
            .iter()
            .filter(|tx| tx.return_outcome == ReturnOutcome::Unreasonable)
            .count() as u64;
        if metrics.total_transactions > 0 {
            metrics.return_rate_pct = returns as f64 / metrics.total_transactions as f64 * 100.0;
        }

        metrics.total_disputes = disputes.len() as u64;
        metrics.open_disputes = disputes
            .iter()
            .filter(|d| d.standing == DisputeStanding::Open)
            .count() as u64;
        metrics.resolved_disputes = metrics.total_disputes - metrics.open_disputes;
        metrics.chargeback_count = disputes.iter().filter(|d| d.chargeback).count() as u64;
        if metrics.total_transactions > 0 {
            metrics.chargeback_rate_pct =
                metrics.chargeback_count as f64 / metrics.total_transactions as f64 * 100.0;
        }
        let seller_wins = disputes
            .iter()
            .filter(|d| d.standing == DisputeStanding::ResolvedSellerFavor)
            .count() as u64;
        if metrics.resolved_disputes > 0 {
            metrics.seller_win_rate_pct =
                seller_wins as f64 / metrics.resolved_disputes as f64 * 100.0;
        }

        if !reviews.is_empty() {
            let positive = reviews.iter().filter(|r| r.positive).count() as f64;
            metrics.positive_review_ratio = positive / reviews.len() as f64;
        }
        metrics.communication_issue_count =
            reviews.iter().filter(|r| r.communication_issue).count() as u64;

        metrics.kyb_verified = compliance.kyb_verified;
        metrics.kyb_issue_count = compliance.kyb_issue_count;
        metrics.missing_documentation_count = compliance.missing_documentation_count;
        metrics.sanctions_flag_count = compliance.sanctions_flag_count;

        Ok(metrics)
    }
}
