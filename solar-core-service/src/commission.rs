use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use solar_core_api::domain::commission::{quote_commission, CommissionQuote, IneligibleReason};
use solar_core_api::domain::status::{CommissionStatus, ConsumerStatus};
use solar_core_api::error::{ApiError, ApiResult};
use solar_core_api::service::KwhPriceProvider;
use solar_core_db::models::commission::CommissionModel;
use solar_core_db::models::consumer::ConsumerModel;
use solar_core_db::repository::{CommissionRepository, ConsumerRepository, RepositoryError, Repositories};

const ACTIVE_COMMISSION_STATUSES: [CommissionStatus; 3] = [
    CommissionStatus::Pending,
    CommissionStatus::Calculated,
    CommissionStatus::Paid,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotGeneratedReason {
    AlreadyExists { commission_id: Uuid },
    Ineligible { ineligible: IneligibleReason },
}

/// Result of one generation request. Not generating is a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionGeneration {
    Generated(CommissionModel),
    NotGenerated(NotGeneratedReason),
}

impl CommissionGeneration {
    pub fn commission(&self) -> Option<&CommissionModel> {
        match self {
            CommissionGeneration::Generated(commission) => Some(commission),
            CommissionGeneration::NotGenerated(_) => None,
        }
    }

    /// Turns a non-generation into the matching error for callers that
    /// need a commission.
    pub fn into_result(self) -> ApiResult<CommissionModel> {
        match self {
            CommissionGeneration::Generated(commission) => Ok(commission),
            CommissionGeneration::NotGenerated(NotGeneratedReason::AlreadyExists { commission_id }) => Err(
                ApiError::Conflict(format!("Commission {commission_id} already exists for this consumer")),
            ),
            CommissionGeneration::NotGenerated(NotGeneratedReason::Ineligible { ineligible }) => {
                Err(ineligible.into())
            }
        }
    }
}

/// Outcome of a generation attempt whose failure must not propagate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionAttempt {
    Generated(CommissionModel),
    NotGenerated(NotGeneratedReason),
    Failed(String),
}

impl CommissionAttempt {
    pub fn is_generated(&self) -> bool {
        matches!(self, CommissionAttempt::Generated(_))
    }
}

impl From<ApiResult<CommissionGeneration>> for CommissionAttempt {
    fn from(result: ApiResult<CommissionGeneration>) -> Self {
        match result {
            Ok(CommissionGeneration::Generated(commission)) => CommissionAttempt::Generated(commission),
            Ok(CommissionGeneration::NotGenerated(reason)) => CommissionAttempt::NotGenerated(reason),
            Err(e) => CommissionAttempt::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItemResult {
    pub consumer_id: Uuid,
    #[serde(flatten)]
    pub attempt: CommissionAttempt,
}

/// `errors` counts every processed consumer that did not get a commission.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchGenerationReport {
    pub total_processed: usize,
    pub successful: usize,
    pub errors: usize,
    pub results: Vec<BatchItemResult>,
}

impl BatchGenerationReport {
    fn record(&mut self, consumer_id: Uuid, attempt: CommissionAttempt) {
        self.total_processed += 1;
        if attempt.is_generated() {
            self.successful += 1;
        } else {
            self.errors += 1;
        }
        self.results.push(BatchItemResult { consumer_id, attempt });
    }
}

/// Prices commissions and creates at most one active commission per consumer.
#[derive(Clone)]
pub struct CommissionCalculator {
    consumers: Arc<dyn ConsumerRepository>,
    commissions: Arc<dyn CommissionRepository>,
    prices: Arc<dyn KwhPriceProvider>,
}

impl CommissionCalculator {
    pub fn new(repositories: &Repositories, prices: Arc<dyn KwhPriceProvider>) -> Self {
        Self {
            consumers: repositories.consumers.clone(),
            commissions: repositories.commissions.clone(),
            prices,
        }
    }

    /// Prices a commission for `consumer` without persisting anything.
    pub fn calculate(
        consumer: &ConsumerModel,
        kwh_price: Option<Decimal>,
    ) -> Result<CommissionQuote, IneligibleReason> {
        quote_commission(&consumer.commission_candidate(), kwh_price)
    }

    /// Idempotent: a consumer with an active commission gets
    /// `NotGenerated(AlreadyExists)`, including the loser of a concurrent race.
    pub async fn generate_for_consumer(&self, consumer_id: Uuid) -> ApiResult<CommissionGeneration> {
        let consumer = self.consumers.load(consumer_id).await?;
        let kwh_price = self.prices.current_kwh_price().await?;
        self.generate(&consumer, kwh_price).await
    }

    /// One sequential pass over approved consumers with a representative and
    /// no active commission. Item failures are recorded, never raised.
    pub async fn generate_for_all_eligible(&self) -> ApiResult<BatchGenerationReport> {
        let kwh_price = self.prices.current_kwh_price().await?;
        let with_commission: HashSet<Uuid> = self
            .commissions
            .find_by_status(&ACTIVE_COMMISSION_STATUSES)
            .await?
            .into_iter()
            .map(|c| c.consumer_id)
            .collect();
        let candidates: Vec<ConsumerModel> = self
            .consumers
            .find_by_status(&[ConsumerStatus::Available, ConsumerStatus::Allocated])
            .await?
            .into_iter()
            .filter(|c| c.representative_id.is_some() && !with_commission.contains(&c.id))
            .collect();

        let mut report = BatchGenerationReport::default();
        for consumer in candidates {
            let attempt = CommissionAttempt::from(self.generate(&consumer, kwh_price).await);
            if let CommissionAttempt::Failed(message) = &attempt {
                warn!(consumer_id = %consumer.id, error = %message, "commission generation failed");
            }
            report.record(consumer.id, attempt);
        }

        info!(
            total_processed = report.total_processed,
            successful = report.successful,
            errors = report.errors,
            "batch commission generation finished"
        );
        Ok(report)
    }

    async fn generate(&self, consumer: &ConsumerModel, kwh_price: Option<Decimal>) -> ApiResult<CommissionGeneration> {
        if let Some(existing) = self.active_commission(consumer.id).await? {
            return Ok(CommissionGeneration::NotGenerated(NotGeneratedReason::AlreadyExists {
                commission_id: existing.id,
            }));
        }

        let quote = match Self::calculate(consumer, kwh_price) {
            Ok(quote) => quote,
            Err(ineligible) => {
                info!(consumer_id = %consumer.id, reason = %ineligible, "consumer not eligible for a commission");
                return Ok(CommissionGeneration::NotGenerated(NotGeneratedReason::Ineligible { ineligible }));
            }
        };

        match self
            .commissions
            .create_active_commission(CommissionModel::calculated(&quote, Utc::now()))
            .await
        {
            Ok(commission) => {
                info!(
                    consumer_id = %consumer.id,
                    commission_id = %commission.id,
                    commission_value = %commission.commission_value,
                    "commission generated"
                );
                Ok(CommissionGeneration::Generated(commission))
            }
            Err(RepositoryError::UniqueViolation(_)) => {
                let winner = self.active_commission(consumer.id).await?.ok_or_else(|| {
                    ApiError::Conflict(format!("Commission for consumer {} changed concurrently", consumer.id))
                })?;
                Ok(CommissionGeneration::NotGenerated(NotGeneratedReason::AlreadyExists {
                    commission_id: winner.id,
                }))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn active_commission(&self, consumer_id: Uuid) -> ApiResult<Option<CommissionModel>> {
        Ok(self
            .commissions
            .find_by_consumer_id(consumer_id)
            .await?
            .into_iter()
            .find(CommissionModel::is_active))
    }
}
