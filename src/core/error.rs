use crate::core::contract::{ContractId, ContractStatus};
use crate::core::job::JobId;
use crate::core::profile::ProfileId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Profile,
    Contract,
    Job,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Profile => write!(f, "profile"),
            Entity::Contract => write!(f, "contract"),
            Entity::Job => write!(f, "job"),
        }
    }
}

/// Errors raised by the store, the settlement engine and the reports.
///
/// None of these are fatal: every variant maps to a rejection at the
/// request boundary. Insufficient funds is not an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: u64 },

    #[error("profile {caller} is not allowed to access {entity} {id}")]
    Forbidden {
        caller: ProfileId,
        entity: Entity,
        id: u64,
    },

    #[error("deposit of {requested} exceeds cap of {cap} (outstanding obligations {outstanding})")]
    DepositExceedsCap {
        requested: Decimal,
        cap: Decimal,
        outstanding: Decimal,
    },

    #[error("no paid jobs between {start} and {end}")]
    NoData {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("job {0} has already been paid")]
    Conflict(JobId),

    #[error("contract {id} is {status}, only in_progress contracts are payable")]
    ContractNotActive { id: ContractId, status: ContractStatus },

    #[error("profile {0} is not a client")]
    NotAClient(ProfileId),

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("invalid date range: {0}")]
    InvalidRange(String),

    #[error("balance of profile {profile} would become {balance}")]
    NegativeBalance { profile: ProfileId, balance: Decimal },

    #[error("amount overflow: {0}")]
    Overflow(String),

    #[error("invalid {entity} {id}: {reason}")]
    InvalidRecord {
        entity: Entity,
        id: u64,
        reason: String,
    },

    #[error("entity store unavailable: {0}")]
    StoreUnavailable(String),
}

impl SettlementError {
    pub fn profile_not_found(id: ProfileId) -> Self {
        Self::NotFound {
            entity: Entity::Profile,
            id: id.get(),
        }
    }

    pub fn contract_not_found(id: ContractId) -> Self {
        Self::NotFound {
            entity: Entity::Contract,
            id: id.get(),
        }
    }

    pub fn job_not_found(id: JobId) -> Self {
        Self::NotFound {
            entity: Entity::Job,
            id: id.get(),
        }
    }
}

pub type Result<T, E = SettlementError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_not_found_message() {
        let err = SettlementError::job_not_found(JobId::new(12));
        assert_eq!(err.to_string(), "job 12 not found");
    }

    #[test]
    fn test_cap_message_carries_figures() {
        let err = SettlementError::DepositExceedsCap {
            requested: dec!(51),
            cap: dec!(50),
            outstanding: dec!(200),
        };
        let msg = err.to_string();
        assert!(msg.contains("51"));
        assert!(msg.contains("50"));
        assert!(msg.contains("200"));
    }
}
