use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a profile (client or contractor) in the marketplace.
///
/// # Examples
///
/// ```
/// use marketplace_settlement::core::profile::ProfileId;
///
/// let alice = ProfileId::new(1);
/// let bob = ProfileId::new(2);
/// assert_ne!(alice, bob);
/// assert!(alice < bob);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(u64);

impl ProfileId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProfileId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

/// Which side of the marketplace a profile sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Funds work and pays contractors.
    Client,
    /// Performs jobs and receives payment.
    Contractor,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::Client => write!(f, "client"),
            ProfileKind::Contractor => write!(f, "contractor"),
        }
    }
}

/// A marketplace participant with a spendable balance.
///
/// Balances are only ever changed by the settlement engine through a
/// unit of work, which refuses to commit a negative balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    id: ProfileId,
    first_name: String,
    last_name: String,
    profession: String,
    kind: ProfileKind,
    balance: Decimal,
}

impl Profile {
    /// Create a new profile with a zero balance.
    pub fn new(
        id: ProfileId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        profession: impl Into<String>,
        kind: ProfileKind,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            profession: profession.into(),
            kind,
            balance: Decimal::ZERO,
        }
    }

    /// Set the opening balance.
    ///
    /// # Panics
    ///
    /// Panics if `balance` is negative.
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        assert!(
            balance >= Decimal::ZERO,
            "Profile balance must not be negative, got {}",
            balance
        );
        self.balance = balance;
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> ProfileId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// First and last name separated by a single space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn profession(&self) -> &str {
        &self.profession
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn is_client(&self) -> bool {
        self.kind == ProfileKind::Client
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub(crate) fn set_balance(&mut self, balance: Decimal) {
        self.balance = balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profile_id_ordering() {
        assert!(ProfileId::new(1) < ProfileId::new(2));
        assert_eq!(ProfileId::from(7), ProfileId::new(7));
        assert_eq!(format!("{}", ProfileId::new(42)), "42");
    }

    #[test]
    fn test_full_name() {
        let p = Profile::new(ProfileId::new(1), "Harry", "Potter", "Wizard", ProfileKind::Client);
        assert_eq!(p.full_name(), "Harry Potter");
        assert_eq!(p.balance(), Decimal::ZERO);
        assert!(p.is_client());
    }

    #[test]
    #[should_panic(expected = "must not be negative")]
    fn test_negative_opening_balance() {
        Profile::new(ProfileId::new(1), "A", "B", "C", ProfileKind::Client).with_balance(dec!(-1));
    }

    #[test]
    fn test_profile_json_shape() {
        let p = Profile::new(ProfileId::new(3), "John", "Lenon", "Musician", ProfileKind::Contractor)
            .with_balance(dec!(64));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["kind"], "contractor");
        assert_eq!(json["balance"], "64");
    }
}
