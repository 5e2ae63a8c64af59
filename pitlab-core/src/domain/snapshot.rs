//! Portfolio snapshot — held quantities plus cash, valued against one
//! date-row of an ObservationMatrix.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A point-in-time statement of holdings.
///
/// `positions` maps entity id → held quantity (in lots). `lot_size` is the
/// share count per lot (1000 for Taiwan board lots, 1 for share-quoted
/// markets). `cash` covers settlement balances not held as positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub positions: BTreeMap<String, f64>,
    #[serde(default)]
    pub cash: f64,
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
}

fn default_lot_size() -> f64 {
    1.0
}

impl Snapshot {
    pub fn new(positions: BTreeMap<String, f64>) -> Self {
        Self {
            positions,
            cash: 0.0,
            lot_size: default_lot_size(),
        }
    }

    /// Total value = cash + sum of quantity × price × lot size.
    ///
    /// `prices` is one date's entity → price map (see
    /// [`ObservationMatrix::date_row`](crate::domain::ObservationMatrix::date_row)).
    /// Positions without a price on that date contribute nothing.
    pub fn market_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .filter_map(|(entity, qty)| prices.get(entity).map(|price| qty * price * self.lot_size))
            .sum();
        self.cash + position_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        let mut positions = BTreeMap::new();
        positions.insert("2330".to_string(), 2.0);
        positions.insert("0050".to_string(), 5.0);
        Snapshot {
            positions,
            cash: 10_000.0,
            lot_size: 1000.0,
        }
    }

    #[test]
    fn values_positions_against_price_row() {
        let mut prices = HashMap::new();
        prices.insert("2330".to_string(), 255.0);
        prices.insert("0050".to_string(), 81.0);
        // 10_000 + 2 * 255 * 1000 + 5 * 81 * 1000
        assert_eq!(snapshot().market_value(&prices), 10_000.0 + 510_000.0 + 405_000.0);
    }

    #[test]
    fn unpriced_position_contributes_nothing() {
        let mut prices = HashMap::new();
        prices.insert("2330".to_string(), 255.0);
        assert_eq!(snapshot().market_value(&prices), 10_000.0 + 510_000.0);
    }

    #[test]
    fn empty_snapshot_is_cash_only() {
        let snap = Snapshot::new(BTreeMap::new());
        assert_eq!(snap.market_value(&HashMap::new()), 0.0);
    }

    #[test]
    fn snapshot_toml_defaults() {
        let snap: Snapshot = toml::from_str(
            r#"
            [positions]
            "2330" = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(snap.cash, 0.0);
        assert_eq!(snap.lot_size, 1.0);
        assert_eq!(snap.positions["2330"], 2.0);
    }
}
