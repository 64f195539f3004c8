use crate::core::contract::ContractId;
use crate::core::job::JobId;
use crate::core::profile::ProfileId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof of one committed job payment.
///
/// Receipts are handed back to the caller and logged; they are not
/// persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub id: Uuid,
    pub job_id: JobId,
    pub contract_id: ContractId,
    /// Debited party.
    pub client_id: ProfileId,
    /// Credited party.
    pub contractor_id: ProfileId,
    pub amount: Decimal,
    pub settled_at: DateTime<Utc>,
    /// Client balance after the debit.
    pub client_balance: Decimal,
    /// Contractor balance after the credit.
    pub contractor_balance: Decimal,
}

/// What happened to a payment request that passed the ownership checks.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Funds moved and the job is now paid.
    Settled(SettlementReceipt),
    /// The job was paid earlier. Nothing changed.
    AlreadyPaid,
    /// The client cannot cover the price. Nothing changed.
    InsufficientFunds { balance: Decimal, price: Decimal },
}

impl PaymentOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentOutcome::Settled(_))
    }

    pub fn receipt(&self) -> Option<&SettlementReceipt> {
        match self {
            PaymentOutcome::Settled(receipt) => Some(receipt),
            _ => None,
        }
    }
}

impl std::fmt::Display for SettlementReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Settlement Receipt ===")?;
        writeln!(f, "Receipt:     {}", self.id)?;
        writeln!(f, "Job:         {} (contract {})", self.job_id, self.contract_id)?;
        writeln!(f, "Amount:      {}", self.amount)?;
        writeln!(f, "Client:      {} -> balance {}", self.client_id, self.client_balance)?;
        writeln!(f, "Contractor:  {} -> balance {}", self.contractor_id, self.contractor_balance)?;
        writeln!(f, "Settled at:  {}", self.settled_at.to_rfc3339())
    }
}
