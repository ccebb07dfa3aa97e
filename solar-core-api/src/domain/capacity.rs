use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::percentage::{FULL_CAPACITY, PERCENTAGE_EPSILON};

/// How much of a generator is already promised to consumers.
///
/// Built from the allocated percentages of the generator's ALLOCATED
/// consumers; the caller is responsible for that filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacitySnapshot {
    pub generator_id: Uuid,
    pub allocated_percentage: Decimal,
    pub available_percentage: Decimal,
    pub consumer_count: usize,
}

impl CapacitySnapshot {
    pub fn from_allocations<I>(generator_id: Uuid, allocations: I) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        let (allocated_percentage, consumer_count) = allocations
            .into_iter()
            .fold((Decimal::ZERO, 0usize), |(sum, count), pct| (sum + pct, count + 1));

        let available_percentage = (FULL_CAPACITY - allocated_percentage).max(Decimal::ZERO);

        Self {
            generator_id,
            allocated_percentage,
            available_percentage,
            consumer_count,
        }
    }

    pub fn empty(generator_id: Uuid) -> Self {
        Self::from_allocations(generator_id, std::iter::empty())
    }

    pub fn is_fully_allocated(&self) -> bool {
        self.allocated_percentage >= FULL_CAPACITY - PERCENTAGE_EPSILON
    }

    pub fn can_accommodate(&self, requested: Decimal) -> bool {
        self.available_percentage + PERCENTAGE_EPSILON >= requested
    }
}
