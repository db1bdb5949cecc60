use std::collections::BTreeSet;

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::metrics::{self, Summary};
use crate::data::model::Shipment;
use crate::state::{AppState, FilterDim};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top bar: title plus loaded/visible row counts.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Global Logistics Intelligence");
        ui.separator();
        if let Some(ds) = state.dataset {
            ui.label(format!(
                "{} shipments loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel: one checkbox group per dimension.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            filter_group(ui, state, FilterDim::Mode, "Transport Mode", &dataset.modes);
            filter_group(ui, state, FilterDim::Status, "Status", &dataset.statuses);
        });
}

fn filter_group(
    ui: &mut Ui,
    state: &mut AppState,
    dim: FilterDim,
    title: &str,
    all_values: &'static BTreeSet<String>,
) {
    let n_selected = match dim {
        FilterDim::Mode => state.filters.modes.len(),
        FilterDim::Status => state.filters.statuses.len(),
    };
    let header_text = format!("{title}  ({n_selected}/{})", all_values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(dim);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(dim);
                }
            });

            for val in all_values {
                let is_selected = match dim {
                    FilterDim::Mode => state.filters.modes.contains(val),
                    FilterDim::Status => state.filters.statuses.contains(val),
                };

                // Mode labels carry their chart colour.
                let mut text = RichText::new(val);
                if dim == FilterDim::Mode {
                    text = text.color(state.mode_colors.color_for(val));
                }

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_value(dim, val);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// Render the four summary metrics as a card row.
pub fn metrics_row(ui: &mut Ui, summary: &Summary) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(
            &mut cols[0],
            "Total Shipments",
            summary.total_shipments.to_string(),
        );
        metric_card(
            &mut cols[1],
            "Delivered %",
            format!("{:.2}%", summary.delivered_pct),
        );
        metric_card(
            &mut cols[2],
            "Avg Lead Time (Days)",
            metrics::format_opt2(summary.avg_lead_time_days),
        );
        metric_card(
            &mut cols[3],
            "Total Cargo Value (USD)",
            metrics::format_usd(summary.total_cargo_value_usd),
        );
    });
}

fn metric_card(ui: &mut Ui, caption: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(value).heading());
            ui.small(caption);
        });
    });
}

// ---------------------------------------------------------------------------
// Shipment preview table
// ---------------------------------------------------------------------------

/// Longest preview the table renders; the rest of the rows stay filtered
/// but unlisted.
const PREVIEW_ROWS: usize = 200;

/// Render the filtered rows as a striped table.
pub fn shipment_table(ui: &mut Ui, rows: &[&Shipment]) {
    if rows.is_empty() {
        ui.label("No shipments match the current filters.");
        return;
    }

    let shown = rows.len().min(PREVIEW_ROWS);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(18.0, |mut header| {
            for title in [
                "Shipment",
                "Origin",
                "Destination",
                "Mode",
                "Status",
                "Carrier",
                "Departure",
                "Value (USD)",
            ] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, shown, |mut row| {
                let sh = rows[row.index()];
                row.col(|ui| {
                    ui.label(&sh.shipment_id);
                });
                row.col(|ui| {
                    ui.label(&sh.origin_country);
                });
                row.col(|ui| {
                    ui.label(&sh.destination_country);
                });
                row.col(|ui| {
                    ui.label(&sh.mode);
                });
                row.col(|ui| {
                    ui.label(&sh.status);
                });
                row.col(|ui| {
                    ui.label(&sh.carrier);
                });
                row.col(|ui| {
                    ui.label(sh.departure_date.format("%Y-%m-%d").to_string());
                });
                row.col(|ui| {
                    ui.label(metrics::format_usd(sh.cargo_value_usd));
                });
            });
        });

    if rows.len() > PREVIEW_ROWS {
        ui.small(format!("Showing first {PREVIEW_ROWS} of {} rows.", rows.len()));
    }
}
