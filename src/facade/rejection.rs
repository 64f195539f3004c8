use crate::core::error::SettlementError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse category of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    NotFound,
    Forbidden,
    Conflict,
    DepositExceedsCap,
    NoData,
    BadRequest,
    Unprocessable,
    Unavailable,
}

impl RejectionKind {
    /// HTTP-style status code the request layer should answer with.
    pub fn status(&self) -> u16 {
        match self {
            RejectionKind::NotFound | RejectionKind::NoData => 404,
            RejectionKind::Forbidden => 403,
            RejectionKind::Conflict => 409,
            RejectionKind::DepositExceedsCap | RejectionKind::Unprocessable => 422,
            RejectionKind::BadRequest => 400,
            RejectionKind::Unavailable => 503,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, RejectionKind::Unavailable | RejectionKind::Conflict)
    }
}

/// A domain error translated for the request boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub status: u16,
    pub message: String,
}

impl From<SettlementError> for Rejection {
    fn from(err: SettlementError) -> Self {
        let kind = match &err {
            SettlementError::NotFound { .. } => RejectionKind::NotFound,
            SettlementError::Forbidden { .. } => RejectionKind::Forbidden,
            SettlementError::DepositExceedsCap { .. } => RejectionKind::DepositExceedsCap,
            SettlementError::NoData { .. } => RejectionKind::NoData,
            SettlementError::Conflict(_) | SettlementError::ContractNotActive { .. } => {
                RejectionKind::Conflict
            }
            SettlementError::NotAClient(_)
            | SettlementError::InvalidAmount(_)
            | SettlementError::InvalidRange(_)
            | SettlementError::InvalidRecord { .. } => RejectionKind::BadRequest,
            SettlementError::NegativeBalance { .. } | SettlementError::Overflow(_) => {
                RejectionKind::Unprocessable
            }
            SettlementError::StoreUnavailable(_) => RejectionKind::Unavailable,
        };
        Self {
            kind,
            status: kind.status(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for Rejection {}
