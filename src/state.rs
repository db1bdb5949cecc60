use std::collections::BTreeSet;

use crate::color::ColorMap;
use crate::data::filter::{FilterState, filtered_indices};
use crate::data::loader;
use crate::data::model::{Shipment, ShipmentDataset};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The two filterable dimensions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDim {
    Mode,
    Status,
}

/// The full UI state, independent of rendering.
///
/// The dataset itself lives in the loader's process-wide memo; this struct
/// only borrows it, so refiltering never touches the loaded table.
pub struct AppState {
    /// Loaded dataset (None when loading failed).
    pub dataset: Option<&'static ShipmentDataset>,

    /// Fatal loader failure, shown on the error screen.
    pub load_error: Option<String>,

    /// Current mode/status selections.
    pub filters: FilterState,

    /// Indices of shipments passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Colour per transport mode, shared by every mode-coloured chart.
    pub mode_colors: ColorMap,
}

impl AppState {
    /// Load the dataset through the memoized loader and initialise filters
    /// to "everything selected".
    pub fn from_loader() -> Self {
        match loader::load_cached() {
            Ok(dataset) => {
                log::info!(
                    "loaded {} shipments ({} modes, {} statuses)",
                    dataset.len(),
                    dataset.modes.len(),
                    dataset.statuses.len()
                );
                Self::with_dataset(dataset)
            }
            Err(e) => {
                log::error!("failed to load dataset: {e}");
                AppState {
                    dataset: None,
                    load_error: Some(e.to_string()),
                    filters: FilterState::default(),
                    visible_indices: Vec::new(),
                    mode_colors: ColorMap::default(),
                }
            }
        }
    }

    /// Build state over an already-loaded dataset.
    pub fn with_dataset(dataset: &'static ShipmentDataset) -> Self {
        AppState {
            dataset: Some(dataset),
            load_error: None,
            filters: FilterState::all(dataset),
            visible_indices: (0..dataset.len()).collect(),
            mode_colors: ColorMap::new(&dataset.modes),
        }
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(ds) = self.dataset {
            self.visible_indices = filtered_indices(ds, &self.filters);
        }
    }

    /// The filtered rows, in row order.
    pub fn visible_rows(&self) -> Vec<&'static Shipment> {
        match self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .map(|&i| &ds.shipments[i])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Toggle a single value in one dimension's selection.
    pub fn toggle_value(&mut self, dim: FilterDim, value: &str) {
        let selected = self.selected_set(dim);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every distinct value of one dimension.
    pub fn select_all(&mut self, dim: FilterDim) {
        if let Some(ds) = self.dataset {
            let all = match dim {
                FilterDim::Mode => ds.modes.clone(),
                FilterDim::Status => ds.statuses.clone(),
            };
            *self.selected_set(dim) = all;
            self.refilter();
        }
    }

    /// Deselect every value of one dimension (hides all rows).
    pub fn select_none(&mut self, dim: FilterDim) {
        self.selected_set(dim).clear();
        self.refilter();
    }

    fn selected_set(&mut self, dim: FilterDim) -> &mut BTreeSet<String> {
        match dim {
            FilterDim::Mode => &mut self.filters.modes,
            FilterDim::Status => &mut self.filters.statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::shipment;

    fn leaked_dataset() -> &'static ShipmentDataset {
        Box::leak(Box::new(ShipmentDataset::from_shipments(vec![
            shipment("S1", "USA", "Germany", "Air", "Delivered", 100.0),
            shipment("S2", "USA", "Japan", "Sea", "Pending", 200.0),
            shipment("S3", "China", "Germany", "Air", "Delivered", 300.0),
        ])))
    }

    #[test]
    fn starts_with_everything_selected_and_visible() {
        let state = AppState::with_dataset(leaked_dataset());
        assert_eq!(state.visible_indices.len(), 3);
        assert_eq!(state.filters.modes.len(), 2);
        assert_eq!(state.filters.statuses.len(), 2);
    }

    #[test]
    fn toggling_a_mode_refilters() {
        let mut state = AppState::with_dataset(leaked_dataset());
        state.toggle_value(FilterDim::Mode, "Sea");
        assert_eq!(state.visible_indices, vec![0, 2]);

        state.toggle_value(FilterDim::Mode, "Sea");
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn select_none_hides_every_row() {
        let mut state = AppState::with_dataset(leaked_dataset());
        state.select_none(FilterDim::Status);
        assert!(state.visible_indices.is_empty());
        assert!(state.visible_rows().is_empty());

        state.select_all(FilterDim::Status);
        assert_eq!(state.visible_indices.len(), 3);
    }
}
