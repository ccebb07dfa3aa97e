use serde::{Deserialize, Serialize};

use super::capacity::CapacitySnapshot;

/// Status an operator sets on a generator by hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "generator_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneratorStatus {
    UnderAnalysis,
    AwaitingAllocation,
}

/// Status shown to readers of a generator.
///
/// Never persisted: it is recomputed from the manual status and the current
/// allocations every time it is read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeneratorDisplayStatus {
    UnderAnalysis,
    AwaitingAllocation,
    FullyAllocated,
}

impl From<GeneratorStatus> for GeneratorDisplayStatus {
    fn from(status: GeneratorStatus) -> Self {
        match status {
            GeneratorStatus::UnderAnalysis => GeneratorDisplayStatus::UnderAnalysis,
            GeneratorStatus::AwaitingAllocation => GeneratorDisplayStatus::AwaitingAllocation,
        }
    }
}

/// Projects the display status of a generator.
pub fn derive_generator_status(
    manually_set_status: GeneratorStatus,
    capacity: &CapacitySnapshot,
) -> GeneratorDisplayStatus {
    if capacity.is_fully_allocated() {
        GeneratorDisplayStatus::FullyAllocated
    } else {
        manually_set_status.into()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "consumer_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumerStatus {
    PendingApproval,
    Available,
    Allocated,
    Rejected,
}

impl ConsumerStatus {
    /// `PENDING_APPROVAL -> AVAILABLE -> ALLOCATED`, `ALLOCATED -> AVAILABLE`
    /// and `PENDING_APPROVAL -> REJECTED`. Nothing re-enters `PENDING_APPROVAL`
    /// and `REJECTED` is terminal.
    ///
    /// `ALLOCATED -> ALLOCATED` is a reallocation to another generator.
    pub fn can_transition_to(self, next: ConsumerStatus) -> bool {
        use ConsumerStatus::*;
        matches!(
            (self, next),
            (PendingApproval, Available)
                | (PendingApproval, Rejected)
                | (Available, Allocated)
                | (Allocated, Available)
                | (Allocated, Allocated)
        )
    }

    /// Approved consumers are the ones that went through the approval gate.
    pub fn is_approved(self) -> bool {
        matches!(self, ConsumerStatus::Available | ConsumerStatus::Allocated)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsumerStatus::PendingApproval => "PENDING_APPROVAL",
            ConsumerStatus::Available => "AVAILABLE",
            ConsumerStatus::Allocated => "ALLOCATED",
            ConsumerStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "commission_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Calculated,
    Paid,
    Cancelled,
}

impl CommissionStatus {
    pub fn can_transition_to(self, next: CommissionStatus) -> bool {
        use CommissionStatus::*;
        matches!(
            (self, next),
            (Pending, Calculated) | (Pending, Paid) | (Calculated, Paid) | (Pending, Cancelled) | (Calculated, Cancelled)
        )
    }

    /// Every status except `CANCELLED` counts against the one-commission-per-consumer rule.
    pub fn is_active(self) -> bool {
        !matches!(self, CommissionStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommissionStatus::Pending => "PENDING",
            CommissionStatus::Calculated => "CALCULATED",
            CommissionStatus::Paid => "PAID",
            CommissionStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "change_request_status", rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl ChangeRequestStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, ChangeRequestStatus::Pending)
    }
}
