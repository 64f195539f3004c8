use crate::core::contract::ContractId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(u64);

impl JobId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// A priced unit of work under a contract.
///
/// A job is paid at most once. After payment the price and payment date
/// are frozen; the store refuses to mark a paid job again.
///
/// # Examples
///
/// ```
/// use marketplace_settlement::core::contract::ContractId;
/// use marketplace_settlement::core::job::{Job, JobId};
/// use rust_decimal_macros::dec;
///
/// let job = Job::new(JobId::new(1), ContractId::new(1), dec!(200))
///     .with_description("work");
///
/// assert_eq!(job.price(), dec!(200));
/// assert!(!job.is_paid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    id: JobId,
    #[serde(default)]
    description: String,
    contract_id: ContractId,
    /// Must be positive.
    price: Decimal,
    #[serde(default)]
    paid: bool,
    #[serde(default)]
    payment_date: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new unpaid job.
    ///
    /// # Panics
    ///
    /// Panics if `price` is not positive.
    pub fn new(id: JobId, contract_id: ContractId, price: Decimal) -> Self {
        assert!(
            price > Decimal::ZERO,
            "Job price must be positive, got {}",
            price
        );
        Self {
            id,
            description: String::new(),
            contract_id,
            price,
            paid: false,
            payment_date: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Create the job in its paid state (useful for seeding history).
    pub fn paid_at(mut self, date: DateTime<Utc>) -> Self {
        self.paid = true;
        self.payment_date = Some(date);
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn contract_id(&self) -> ContractId {
        self.contract_id
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn is_paid(&self) -> bool {
        self.paid
    }

    pub fn payment_date(&self) -> Option<DateTime<Utc>> {
        self.payment_date
    }

    pub(crate) fn mark_paid(&mut self, date: DateTime<Utc>) {
        self.paid = true;
        self.payment_date = Some(date);
    }
}
