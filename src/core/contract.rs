use crate::core::profile::ProfileId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(u64);

impl ContractId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ContractId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of a contract. Only `InProgress` contracts admit payable jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    New,
    InProgress,
    Terminated,
}

impl ContractStatus {
    pub fn is_active(&self) -> bool {
        *self == ContractStatus::InProgress
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStatus::New => write!(f, "new"),
            ContractStatus::InProgress => write!(f, "in_progress"),
            ContractStatus::Terminated => write!(f, "terminated"),
        }
    }
}

/// An agreement between exactly one client and one contractor.
///
/// # Examples
///
/// ```
/// use marketplace_settlement::core::contract::{Contract, ContractId, ContractStatus};
/// use marketplace_settlement::core::profile::ProfileId;
///
/// let contract = Contract::new(
///     ContractId::new(1),
///     ProfileId::new(1),
///     ProfileId::new(5),
///     ContractStatus::InProgress,
/// );
/// assert!(contract.involves(ProfileId::new(5)));
/// assert!(!contract.involves(ProfileId::new(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    id: ContractId,
    #[serde(default)]
    terms: String,
    client_id: ProfileId,
    contractor_id: ProfileId,
    status: ContractStatus,
}

impl Contract {
    pub fn new(
        id: ContractId,
        client_id: ProfileId,
        contractor_id: ProfileId,
        status: ContractStatus,
    ) -> Self {
        Self {
            id,
            terms: String::new(),
            client_id,
            contractor_id,
            status,
        }
    }

    /// Set the free-form terms text.
    pub fn with_terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = terms.into();
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn terms(&self) -> &str {
        &self.terms
    }

    pub fn client_id(&self) -> ProfileId {
        self.client_id
    }

    pub fn contractor_id(&self) -> ProfileId {
        self.contractor_id
    }

    pub fn status(&self) -> ContractStatus {
        self.status
    }

    /// Whether `profile` is the client or the contractor on this contract.
    pub fn involves(&self, profile: ProfileId) -> bool {
        self.client_id == profile || self.contractor_id == profile
    }
}
