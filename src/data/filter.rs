use std::collections::BTreeSet;

use super::model::ShipmentDataset;

// ---------------------------------------------------------------------------
// Filter predicate: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Selection state for the two filterable dimensions.
///
/// A row passes when its mode AND its status are both selected.  An empty
/// set means "nothing selected" and hides every row; it does not mean
/// "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub modes: BTreeSet<String>,
    pub statuses: BTreeSet<String>,
}

impl FilterState {
    /// The startup default: every distinct value of both columns selected.
    pub fn all(dataset: &ShipmentDataset) -> Self {
        FilterState {
            modes: dataset.modes.clone(),
            statuses: dataset.statuses.clone(),
        }
    }
}

/// Return indices of shipments that pass the current selections.
///
/// Deterministic and side-effect free; indices come back in row order.
pub fn filtered_indices(dataset: &ShipmentDataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .shipments
        .iter()
        .enumerate()
        .filter(|(_, sh)| {
            filters.modes.contains(&sh.mode) && filters.statuses.contains(&sh.status)
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::shipment;

    fn dataset() -> ShipmentDataset {
        ShipmentDataset::from_shipments(vec![
            shipment("S1", "USA", "Germany", "Air", "Delivered", 100.0),
            shipment("S2", "USA", "Japan", "Sea", "Pending", 200.0),
            shipment("S3", "China", "Germany", "Air", "Delivered", 300.0),
            shipment("S4", "China", "USA", "Road", "In Transit", 400.0),
        ])
    }

    #[test]
    fn selecting_all_values_reproduces_the_full_table() {
        let ds = dataset();
        let filters = FilterState::all(&ds);
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 1, 2, 3]);
    }

    #[test]
    fn result_rows_match_both_selected_sets() {
        let ds = dataset();
        let filters = FilterState {
            modes: ["Air".to_string()].into(),
            statuses: ["Delivered".to_string()].into(),
        };
        let idx = filtered_indices(&ds, &filters);
        assert_eq!(idx, vec![0, 2]);
        for i in idx {
            let sh = &ds.shipments[i];
            assert!(filters.modes.contains(&sh.mode));
            assert!(filters.statuses.contains(&sh.status));
        }
    }

    #[test]
    fn empty_mode_selection_yields_empty_result() {
        let ds = dataset();
        let filters = FilterState {
            modes: BTreeSet::new(),
            statuses: ds.statuses.clone(),
        };
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn empty_status_selection_yields_empty_result() {
        let ds = dataset();
        let filters = FilterState {
            modes: ds.modes.clone(),
            statuses: BTreeSet::new(),
        };
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = dataset();
        let filters = FilterState {
            modes: ["Sea".to_string(), "Road".to_string()].into(),
            statuses: ds.statuses.clone(),
        };
        let first = filtered_indices(&ds, &filters);
        let second = filtered_indices(&ds, &filters);
        assert_eq!(first, second);
        assert_eq!(first, vec![1, 3]);
    }
}
