use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Shipment – one row of the dataset
// ---------------------------------------------------------------------------

/// A single shipment record (one row of the source table).
///
/// Numeric columns may be `NaN` when the source cell was missing or null;
/// aggregations that sum a column reject non-finite input at their own
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    /// Unique key (assumed unique, not validated).
    pub shipment_id: String,
    pub origin_country: String,
    pub destination_country: String,
    /// Transport mode, e.g. "Air", "Sea", "Road", "Rail".
    pub mode: String,
    /// Delivery status, e.g. "Delivered", "In Transit", "Pending".
    pub status: String,
    pub carrier: String,
    pub container_type: String,
    pub lead_time_days: f64,
    pub cargo_value_usd: f64,
    pub cargo_weight_kg: f64,
    pub distance_km: f64,
    pub departure_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// ShipmentDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed distinct-value indices for the
/// two filterable columns.
///
/// Loaded once per process and never mutated afterwards; every downstream
/// view (filtered indices, metrics, chart aggregations) is recomputed from
/// borrows of this structure.
#[derive(Debug, Clone, Default)]
pub struct ShipmentDataset {
    /// All shipments (rows).
    pub shipments: Vec<Shipment>,
    /// Sorted set of distinct transport modes.
    pub modes: BTreeSet<String>,
    /// Sorted set of distinct statuses.
    pub statuses: BTreeSet<String>,
}

impl ShipmentDataset {
    /// Build the distinct-value indices from the loaded rows.
    pub fn from_shipments(shipments: Vec<Shipment>) -> Self {
        let mut modes = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        for sh in &shipments {
            modes.insert(sh.mode.clone());
            statuses.insert(sh.status.clone());
        }
        ShipmentDataset {
            shipments,
            modes,
            statuses,
        }
    }

    /// Number of shipments.
    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Shorthand row constructor used across the data-layer tests.
    pub fn shipment(
        id: &str,
        origin: &str,
        destination: &str,
        mode: &str,
        status: &str,
        value: f64,
    ) -> Shipment {
        Shipment {
            shipment_id: id.to_string(),
            origin_country: origin.to_string(),
            destination_country: destination.to_string(),
            mode: mode.to_string(),
            status: status.to_string(),
            carrier: "Maersk".to_string(),
            container_type: "40ft".to_string(),
            lead_time_days: 10.0,
            cargo_value_usd: value,
            cargo_weight_kg: 1000.0,
            distance_km: 5000.0,
            departure_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::shipment;
    use super::*;

    #[test]
    fn indices_collect_distinct_modes_and_statuses() {
        let ds = ShipmentDataset::from_shipments(vec![
            shipment("S1", "USA", "Germany", "Air", "Delivered", 100.0),
            shipment("S2", "USA", "Japan", "Sea", "Pending", 200.0),
            shipment("S3", "China", "Germany", "Air", "Delivered", 300.0),
        ]);

        assert_eq!(ds.len(), 3);
        let modes: Vec<&str> = ds.modes.iter().map(String::as_str).collect();
        assert_eq!(modes, ["Air", "Sea"]);
        let statuses: Vec<&str> = ds.statuses.iter().map(String::as_str).collect();
        assert_eq!(statuses, ["Delivered", "Pending"]);
    }

    #[test]
    fn empty_dataset_has_empty_indices() {
        let ds = ShipmentDataset::from_shipments(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.modes.is_empty());
        assert!(ds.statuses.is_empty());
    }
}
