use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, warn};

use super::domain::{
    AlertKind, BuyerAlert, BuyerEvent, BuyerId, BuyerTrustScore, FlagContext, FlagSeverity,
    FlagStatus, FlagType, RiskFlag, ScoreChangeReason, ScoreHistoryEntry,
};
use super::metrics::MetricAggregator;
use super::repository::{BuyerActivitySource, RepositoryError, TrustScoreRepository};
use super::scoring::ScoreEngine;

/// A drop of this many points or more raises a SCORE_DROP alert.
const SCORE_DROP_ALERT_THRESHOLD: i16 = -15;
/// Payments overdue beyond this many days trigger a PAYMENT_DELAY flag.
const OVERDUE_DAYS_POLICY: u32 = 30;
/// Trailing window and trigger count for the dispute-rate flag.
const DISPUTE_WINDOW_DAYS: i64 = 30;
const DISPUTE_RATE_TRIGGER: usize = 3;
/// A chargeback on top of this many tracked ones raises a fraud flag.
const CHARGEBACK_FRAUD_THRESHOLD: u64 = 2;
/// Optimistic writes retry this many times before giving up.
const MAX_VERSION_RETRIES: usize = 3;

static FLAG_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_flag_id() -> String {
    let id = FLAG_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("flag-{id:06}")
}

/// Error raised by the trust score service.
#[derive(Debug, thiserror::Error)]
pub enum TrustServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("recalculation for buyer {0} kept losing version races")]
    Contention(String),
}

/// Service composing the metric aggregator, score engine, and trust store.
///
/// `recalculate` is the single write entry point for the score snapshot;
/// flags and events funnel back into it so downstream effects land
/// immediately.
pub struct TrustScoreService<S, R> {
    source: Arc<S>,
    repository: Arc<R>,
    aggregator: MetricAggregator<S>,
}

impl<S, R> TrustScoreService<S, R>
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    pub fn new(source: Arc<S>, repository: Arc<R>) -> Self {
        let aggregator = MetricAggregator::new(source.clone());
        Self {
            source,
            repository,
            aggregator,
        }
    }

    /// Fetch the current snapshot for API responses.
    pub fn get(&self, buyer_id: &BuyerId) -> Result<BuyerTrustScore, TrustServiceError> {
        let score = self
            .repository
            .score(buyer_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(score)
    }

    /// Recompute the buyer's trust score from current activity records.
    ///
    /// Idempotent given identical inputs: the version counter bumps on every
    /// call, but a history entry is appended only when the overall score
    /// actually changed, and the drop alert fires only on that transition.
    pub fn recalculate(&self, buyer_id: &BuyerId) -> Result<BuyerTrustScore, TrustServiceError> {
        for _ in 0..MAX_VERSION_RETRIES {
            let metrics = self.aggregator.aggregate(buyer_id)?;
            let outcome = ScoreEngine::score(&metrics);
            let now = Utc::now();

            let (mut record, expected_version) = match self.repository.score(buyer_id)? {
                Some(existing) => {
                    let version = existing.score_version;
                    (existing, Some(version))
                }
                None => (BuyerTrustScore::neutral(buyer_id.clone(), now), None),
            };

            let previous_overall = record.overall_score;
            record.components = outcome.components;
            record.overall_score = outcome.overall;
            record.risk_level = outcome.risk_level;
            record.risk_category = outcome.risk_category;
            record.counters = metrics.counters();
            record.score_version += 1;
            record.updated_at = now;

            match self.repository.persist_score(record.clone(), expected_version) {
                Ok(()) => {
                    if record.overall_score != previous_overall {
                        let delta =
                            i16::from(record.overall_score) - i16::from(previous_overall);
                        self.repository.append_history(ScoreHistoryEntry {
                            buyer_id: buyer_id.clone(),
                            previous_score: previous_overall,
                            new_score: record.overall_score,
                            delta,
                            reason: ScoreChangeReason::Recalculation,
                            components: record.components,
                            recorded_at: now,
                        })?;
                        if delta <= SCORE_DROP_ALERT_THRESHOLD {
                            self.raise_alert(
                                buyer_id,
                                AlertKind::ScoreDrop,
                                FlagSeverity::High,
                                format!("Trust score dropped {} points", -delta),
                                format!(
                                    "Overall trust score moved from {previous_overall} to {}",
                                    record.overall_score
                                ),
                            )?;
                        }
                    }
                    debug!(
                        buyer = %buyer_id.0,
                        overall = record.overall_score,
                        version = record.score_version,
                        "trust score recalculated"
                    );
                    return Ok(record);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(buyer = %buyer_id.0, "trust score version race, retrying");
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(TrustServiceError::Contention(buyer_id.0.clone()))
    }

    /// Record a risk flag and propagate its effects.
    ///
    /// Lazily creates the trust score row, inserts the flag as ACTIVE, stamps
    /// the snapshot, raises a NEW_FLAG alert at the flag's severity, and
    /// forces a recalculation.
    pub fn create_risk_flag(
        &self,
        buyer_id: &BuyerId,
        flag_type: FlagType,
        severity: FlagSeverity,
        description: impl Into<String>,
        context: FlagContext,
    ) -> Result<RiskFlag, TrustServiceError> {
        if self.repository.score(buyer_id)?.is_none() {
            self.recalculate(buyer_id)?;
        }

        let description = description.into();
        let flag = RiskFlag {
            flag_id: next_flag_id(),
            buyer_id: buyer_id.clone(),
            flag_type,
            severity,
            status: FlagStatus::Active,
            description: description.clone(),
            context,
            created_at: Utc::now(),
        };
        let stored = self.repository.append_flag(flag)?;

        self.stamp_last_flag(buyer_id)?;
        self.raise_alert(
            buyer_id,
            AlertKind::NewFlag,
            severity,
            format!("New risk flag: {}", flag_type.key()),
            description,
        )?;
        self.recalculate(buyer_id)?;

        Ok(stored)
    }

    /// Automatic flagging policy, evaluated per event type. Every branch
    /// ends in a recalculation (directly, or through `create_risk_flag`).
    pub fn handle_event(
        &self,
        buyer_id: &BuyerId,
        event: BuyerEvent,
    ) -> Result<Vec<RiskFlag>, TrustServiceError> {
        match event {
            BuyerEvent::PaymentOverdue {
                transaction_id,
                days_overdue,
            } => {
                if days_overdue > OVERDUE_DAYS_POLICY {
                    let flag = self.create_risk_flag(
                        buyer_id,
                        FlagType::PaymentDelay,
                        FlagSeverity::High,
                        format!("Payment overdue by {days_overdue} days"),
                        FlagContext {
                            transaction_id: Some(transaction_id),
                            ..FlagContext::default()
                        },
                    )?;
                    Ok(vec![flag])
                } else {
                    self.recalculate(buyer_id)?;
                    Ok(Vec::new())
                }
            }
            BuyerEvent::Chargeback { transaction_id } => {
                // Capture the count tracked before this event lands so the
                // fraud escalation keys off prior behavior.
                let tracked = match self.repository.score(buyer_id)? {
                    Some(score) => score.counters.chargeback_count,
                    None => self.recalculate(buyer_id)?.counters.chargeback_count,
                };

                let mut created = vec![self.create_risk_flag(
                    buyer_id,
                    FlagType::Chargeback,
                    FlagSeverity::Critical,
                    "Chargeback initiated through the payment processor",
                    FlagContext {
                        transaction_id: Some(transaction_id.clone()),
                        ..FlagContext::default()
                    },
                )?];

                if tracked >= CHARGEBACK_FRAUD_THRESHOLD {
                    created.push(self.create_risk_flag(
                        buyer_id,
                        FlagType::FraudSuspicion,
                        FlagSeverity::Critical,
                        format!("Repeated chargebacks ({tracked} prior) suggest fraud"),
                        FlagContext {
                            transaction_id: Some(transaction_id),
                            ..FlagContext::default()
                        },
                    )?);
                }
                Ok(created)
            }
            BuyerEvent::DisputeCreated { dispute_id } => {
                let window_start = Utc::now() - Duration::days(DISPUTE_WINDOW_DAYS);
                let recent = self
                    .source
                    .disputes(buyer_id)?
                    .iter()
                    .filter(|dispute| dispute.opened_at >= window_start)
                    .count();

                if recent > DISPUTE_RATE_TRIGGER {
                    let flag = self.create_risk_flag(
                        buyer_id,
                        FlagType::HighDisputeRate,
                        FlagSeverity::High,
                        format!("{recent} disputes filed in the trailing {DISPUTE_WINDOW_DAYS} days"),
                        FlagContext {
                            dispute_id: Some(dispute_id),
                            ..FlagContext::default()
                        },
                    )?;
                    Ok(vec![flag])
                } else {
                    self.recalculate(buyer_id)?;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn stamp_last_flag(&self, buyer_id: &BuyerId) -> Result<(), TrustServiceError> {
        for _ in 0..MAX_VERSION_RETRIES {
            let mut record = self
                .repository
                .score(buyer_id)?
                .ok_or(RepositoryError::NotFound)?;
            let expected = record.score_version;
            record.last_flag_at = Some(Utc::now());
            record.score_version += 1;
            match self.repository.persist_score(record, Some(expected)) {
                Ok(()) => return Ok(()),
                Err(RepositoryError::Conflict) => continue,
                Err(other) => return Err(other.into()),
            }
        }
        Err(TrustServiceError::Contention(buyer_id.0.clone()))
    }

    /// Queue an alert row addressed to every seller who has transacted with
    /// this buyer. Delivery is an external collaborator; high and critical
    /// severities additionally mark the admin team as notified.
    fn raise_alert(
        &self,
        buyer_id: &BuyerId,
        kind: AlertKind,
        severity: FlagSeverity,
        title: String,
        message: String,
    ) -> Result<(), TrustServiceError> {
        let audience: BTreeSet<_> = self
            .source
            .transactions(buyer_id)?
            .into_iter()
            .map(|tx| tx.seller_id)
            .collect();

        self.repository.append_alert(BuyerAlert {
            buyer_id: buyer_id.clone(),
            kind,
            severity,
            title,
            message,
            seller_audience: audience.into_iter().collect(),
            admin_notified: severity.escalates_to_admin(),
            created_at: Utc::now(),
        })?;
        Ok(())
    }
}
