use crate::core::error::{Result, SettlementError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::hash::Hash;

/// Running totals per group key, remembering the order keys were first seen.
///
/// Feeding rows in a deterministic order makes every derived ranking
/// deterministic too: among equal totals the earliest-seen key comes first.
#[derive(Debug, Clone)]
pub struct GroupTotals<K> {
    order: Vec<K>,
    totals: HashMap<K, Decimal>,
}

impl<K> Default for GroupTotals<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            totals: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> GroupTotals<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails with `Overflow` if the group's total no longer fits.
    pub fn add(&mut self, key: K, amount: Decimal) -> Result<()> {
        match self.totals.get_mut(&key) {
            Some(total) => {
                *total = total
                    .checked_add(amount)
                    .ok_or_else(|| SettlementError::Overflow(format!("group total plus {}", amount)))?;
            }
            None => {
                self.order.push(key.clone());
                self.totals.insert(key, amount);
            }
        }
        Ok(())
    }

    pub fn total(&self, key: &K) -> Decimal {
        self.totals.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum over all groups.
    pub fn grand_total(&self) -> Result<Decimal> {
        self.totals
            .values()
            .try_fold(Decimal::ZERO, |sum, total| sum.checked_add(*total))
            .ok_or_else(|| SettlementError::Overflow("grand total".to_string()))
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, Decimal)> + '_ {
        self.order.iter().map(move |k| (k, self.total(k)))
    }

    /// The group with the largest total; the earliest-seen one on ties.
    pub fn max(&self) -> Option<(&K, Decimal)> {
        let mut best: Option<(&K, Decimal)> = None;
        for (key, total) in self.iter() {
            match best {
                Some((_, best_total)) if total <= best_total => {}
                _ => best = Some((key, total)),
            }
        }
        best
    }

    /// All groups, largest total first, ties in first-seen order.
    pub fn ranked(&self) -> Vec<(K, Decimal)> {
        let mut rows: Vec<(K, Decimal)> = self.iter().map(|(k, t)| (k.clone(), t)).collect();
        // stable: equal totals keep first-seen order
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}
