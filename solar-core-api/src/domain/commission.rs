use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::percentage::round2;
use super::status::ConsumerStatus;
use crate::error::ApiError;

/// Share of the billed energy the commission is computed on.
pub const COMMISSION_ENERGY_FACTOR: Decimal = Decimal::from_parts(865, 0, 0, false, 3);

/// The representative receives half of the adjusted energy value.
pub const COMMISSION_SPLIT: Decimal = Decimal::TWO;

/// `round2(kwh * 0.865 * kwh_price / 2)`
pub fn calculate_commission_value(kwh: Decimal, kwh_price: Decimal) -> Decimal {
    round2(kwh * COMMISSION_ENERGY_FACTOR * kwh_price / COMMISSION_SPLIT)
}

/// Why a consumer cannot produce a commission right now.
///
/// This is reported, not raised: an ineligible consumer is a normal outcome
/// of approval and of the batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IneligibleReason {
    #[error("consumer has no representative")]
    MissingRepresentative,
    #[error("kWh price is not configured")]
    KwhPriceNotConfigured,
    #[error("kWh price must be greater than zero")]
    NonPositiveKwhPrice,
    #[error("average monthly consumption must be greater than zero")]
    NonPositiveConsumption,
    #[error("consumer has not been approved")]
    ConsumerNotApproved,
}

impl From<IneligibleReason> for ApiError {
    fn from(reason: IneligibleReason) -> Self {
        match reason {
            IneligibleReason::KwhPriceNotConfigured | IneligibleReason::NonPositiveKwhPrice => {
                ApiError::ConfigurationError(reason.to_string())
            }
            IneligibleReason::ConsumerNotApproved => ApiError::InvalidState(reason.to_string()),
            IneligibleReason::MissingRepresentative | IneligibleReason::NonPositiveConsumption => {
                ApiError::ValidationError(reason.to_string())
            }
        }
    }
}

/// The consumer fields the calculator looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionCandidate {
    pub consumer_id: Uuid,
    pub representative_id: Option<Uuid>,
    pub average_monthly_consumption: Decimal,
    pub status: ConsumerStatus,
}

/// A priced commission, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionQuote {
    pub consumer_id: Uuid,
    pub representative_id: Uuid,
    pub kwh: Decimal,
    pub kwh_price: Decimal,
    pub commission_value: Decimal,
}

/// Checks eligibility and prices the commission in one step.
///
/// `kwh_price` is `None` when the system setting has never been configured.
pub fn quote_commission(
    candidate: &CommissionCandidate,
    kwh_price: Option<Decimal>,
) -> Result<CommissionQuote, IneligibleReason> {
    if !candidate.status.is_approved() {
        return Err(IneligibleReason::ConsumerNotApproved);
    }
    let representative_id = candidate
        .representative_id
        .ok_or(IneligibleReason::MissingRepresentative)?;
    let kwh_price = kwh_price.ok_or(IneligibleReason::KwhPriceNotConfigured)?;
    if kwh_price <= Decimal::ZERO {
        return Err(IneligibleReason::NonPositiveKwhPrice);
    }
    let kwh = candidate.average_monthly_consumption;
    if kwh <= Decimal::ZERO {
        return Err(IneligibleReason::NonPositiveConsumption);
    }

    Ok(CommissionQuote {
        consumer_id: candidate.consumer_id,
        representative_id,
        kwh,
        kwh_price,
        commission_value: calculate_commission_value(kwh, kwh_price),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn candidate(representative_id: Option<Uuid>, kwh: &str) -> CommissionCandidate {
        CommissionCandidate {
            consumer_id: Uuid::new_v4(),
            representative_id,
            average_monthly_consumption: dec(kwh),
            status: ConsumerStatus::Available,
        }
    }

    #[test]
    fn test_formula_example() {
        assert_eq!(calculate_commission_value(dec("500"), dec("0.90")), dec("194.63"));
    }

    #[test]
    fn test_formula_rounds_to_cents() {
        // 1234 * 0.865 * 0.95 / 2 = 507.01975
        assert_eq!(calculate_commission_value(dec("1234"), dec("0.95")), dec("507.02"));
    }

    #[test]
    fn test_quote_snapshots_inputs() {
        let rep = Uuid::new_v4();
        let c = candidate(Some(rep), "500");
        let quote = quote_commission(&c, Some(dec("0.90"))).unwrap();
        assert_eq!(quote.representative_id, rep);
        assert_eq!(quote.consumer_id, c.consumer_id);
        assert_eq!(quote.kwh, dec("500"));
        assert_eq!(quote.kwh_price, dec("0.90"));
        assert_eq!(quote.commission_value, dec("194.63"));
    }

    #[test]
    fn test_ineligibility_reasons() {
        let rep = Some(Uuid::new_v4());
        assert_eq!(
            quote_commission(&candidate(None, "500"), Some(dec("0.9"))),
            Err(IneligibleReason::MissingRepresentative)
        );
        assert_eq!(
            quote_commission(&candidate(rep, "500"), None),
            Err(IneligibleReason::KwhPriceNotConfigured)
        );
        assert_eq!(
            quote_commission(&candidate(rep, "500"), Some(Decimal::ZERO)),
            Err(IneligibleReason::NonPositiveKwhPrice)
        );
        assert_eq!(
            quote_commission(&candidate(rep, "0"), Some(dec("0.9"))),
            Err(IneligibleReason::NonPositiveConsumption)
        );

        let mut pending = candidate(rep, "500");
        pending.status = ConsumerStatus::PendingApproval;
        assert_eq!(
            quote_commission(&pending, Some(dec("0.9"))),
            Err(IneligibleReason::ConsumerNotApproved)
        );
    }

    #[test]
    fn test_missing_price_maps_to_configuration_error() {
        let err: ApiError = IneligibleReason::KwhPriceNotConfigured.into();
        assert!(matches!(err, ApiError::ConfigurationError(_)));
    }
}
