use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tunables for the settlement engine and the reports.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use marketplace_settlement::core::config::SettlementConfig;
/// use rust_decimal_macros::dec;
///
/// let config: SettlementConfig =
///     serde_json::from_str(r#"{ "deposit_cap_ratio": "0.5" }"#).unwrap();
/// assert_eq!(config.deposit_cap_ratio, dec!(0.5));
/// assert_eq!(config.min_best_clients, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Fraction of a client's outstanding obligations a single deposit may reach.
    pub deposit_cap_ratio: Decimal,
    /// Fewest entries `best_clients` returns, whatever limit is requested.
    pub min_best_clients: usize,
    /// Limit used when the caller does not supply one.
    pub default_best_clients_limit: usize,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            deposit_cap_ratio: dec!(0.25),
            min_best_clients: 2,
            default_best_clients_limit: 2,
        }
    }
}

impl SettlementConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// The number of entries actually returned for a requested `limit`.
    pub fn effective_client_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_best_clients_limit)
            .max(self.min_best_clients)
    }
}
