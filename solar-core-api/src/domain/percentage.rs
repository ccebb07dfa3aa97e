use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ApiError, ApiResult};

/// Tolerance used whenever a percentage is compared against the 100% boundary.
///
/// Capacity checks and the FULLY_ALLOCATED projection both go through this
/// constant so that they can never disagree about the same sum.
pub const PERCENTAGE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Upper bound of a generator's capacity, in percent.
pub const FULL_CAPACITY: Decimal = Decimal::ONE_HUNDRED;

/// Rounds half away from zero to two decimal places.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks `0 < percentage <= 100`.
pub fn validate_percentage(percentage: Decimal) -> ApiResult<Decimal> {
    if percentage <= Decimal::ZERO {
        return Err(ApiError::ValidationError(format!(
            "Allocated percentage must be greater than 0, got {percentage}"
        )));
    }
    if percentage > FULL_CAPACITY {
        return Err(ApiError::ValidationError(format!(
            "Allocated percentage must not exceed 100, got {percentage}"
        )));
    }
    Ok(percentage)
}

/// Share of a generator needed to cover a consumer's monthly consumption.
///
/// Returns `None` when the installed power is not positive; callers must then
/// ask for an explicit percentage.
pub fn auto_percentage(average_monthly_consumption: Decimal, installed_power: Decimal) -> Option<Decimal> {
    if installed_power <= Decimal::ZERO {
        return None;
    }
    let ratio = average_monthly_consumption.checked_div(installed_power)?;
    ratio.checked_mul(FULL_CAPACITY).map(round2)
}
