use crate::core::contract::{Contract, ContractId, ContractStatus};
use crate::core::job::Job;
use crate::core::profile::ProfileId;
use chrono::{DateTime, Utc};

/// Which side of a contract a profile must be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Client(ProfileId),
    Contractor(ProfileId),
    /// Either the client or the contractor.
    Any(ProfileId),
}

impl Party {
    pub fn matches(&self, contract: &Contract) -> bool {
        match *self {
            Party::Client(id) => contract.client_id() == id,
            Party::Contractor(id) => contract.contractor_id() == id,
            Party::Any(id) => contract.involves(id),
        }
    }
}

/// Predicates over contracts. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractFilter {
    party: Option<Party>,
    status: Option<ContractStatus>,
    excluded_status: Option<ContractStatus>,
}

impl ContractFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn party(mut self, party: Party) -> Self {
        self.party = Some(party);
        self
    }

    pub fn status(mut self, status: ContractStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn excluding(mut self, status: ContractStatus) -> Self {
        self.excluded_status = Some(status);
        self
    }

    pub fn matches(&self, contract: &Contract) -> bool {
        if let Some(party) = &self.party {
            if !party.matches(contract) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if contract.status() != status {
                return false;
            }
        }
        if let Some(excluded) = self.excluded_status {
            if contract.status() == excluded {
                return false;
            }
        }
        true
    }
}

/// Predicates over jobs, joined with their contract.
///
/// Job-level predicates (`paid`, `paid_between`) depend on mutable job
/// state; contract-level predicates do not. Units of work rely on this
/// split to overlay staged payments on top of the committed records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    contract: ContractFilter,
    contract_id: Option<ContractId>,
    paid: Option<bool>,
    paid_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to jobs whose contract matches `filter`.
    pub fn contract(mut self, filter: ContractFilter) -> Self {
        self.contract = filter;
        self
    }

    pub fn contract_id(mut self, id: ContractId) -> Self {
        self.contract_id = Some(id);
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = Some(paid);
        self
    }

    /// Paid jobs whose payment date lies in `[start, end]`, both inclusive.
    pub fn paid_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.paid = Some(true);
        self.paid_between = Some((start, end));
        self
    }

    /// The same filter with the job-level predicates dropped.
    pub fn contract_only(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            contract_id: self.contract_id,
            paid: None,
            paid_between: None,
        }
    }

    pub fn matches_contract(&self, contract: &Contract) -> bool {
        if let Some(id) = self.contract_id {
            if contract.id() != id {
                return false;
            }
        }
        self.contract.matches(contract)
    }

    pub fn matches_job(&self, job: &Job) -> bool {
        if let Some(paid) = self.paid {
            if job.is_paid() != paid {
                return false;
            }
        }
        if let Some((start, end)) = self.paid_between {
            match job.payment_date() {
                Some(date) if date >= start && date <= end => {}
                _ => return false,
            }
        }
        true
    }

    pub fn matches(&self, job: &Job, contract: &Contract) -> bool {
        job.contract_id() == contract.id() && self.matches_contract(contract) && self.matches_job(job)
    }
}
