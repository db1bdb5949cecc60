use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{self, AggregateError};
use crate::data::metrics;
use crate::state::AppState;
use crate::ui::{draw, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FreightlensApp {
    pub state: AppState,
}

impl FreightlensApp {
    pub fn new() -> Self {
        Self {
            state: AppState::from_loader(),
        }
    }
}

impl Default for FreightlensApp {
    fn default() -> Self {
        Self::new()
    }
}

impl eframe::App for FreightlensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // A loader failure is fatal: nothing renders without the dataset.
        if let Some(err) = &self.state.load_error {
            let message = err.clone();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.colored_label(Color32::RED, format!("Failed to load dataset\n\n{message}"));
                });
            });
            return;
        }

        // ---- Top panel: title + row counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metric cards + chart page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard_page(ui, &self.state);
        });
    }
}

// ---------------------------------------------------------------------------
// Dashboard page
// ---------------------------------------------------------------------------

/// The scrolling report: four metric cards followed by the eight charts,
/// recomputed from the filtered rows on every frame.
fn dashboard_page(ui: &mut Ui, state: &AppState) {
    let rows = state.visible_rows();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            panels::metrics_row(ui, &metrics::summary(&rows));
            ui.separator();

            chart_section(ui, "Flow: Origin → Mode → Destination", |ui| {
                draw::sankey(ui, &aggregate::flow_graph(&rows), &state.mode_colors);
                Ok(())
            });

            chart_section(ui, "Hierarchy: Mode → Carrier → Container Type", |ui| {
                let tree = aggregate::value_hierarchy(&rows)?;
                draw::treemap(ui, &tree, &state.mode_colors);
                Ok(())
            });

            chart_section(ui, "Trade Relationships (Origin vs Destination Matrix)", |ui| {
                draw::od_heatmap(ui, &aggregate::od_matrix(&rows));
                Ok(())
            });

            chart_section(ui, "Lead Time Distribution by Mode", |ui| {
                plot::lead_time_ridgeline(ui, &aggregate::lead_time_by_mode(&rows), &state.mode_colors);
                Ok(())
            });

            chart_section(ui, "Cargo Value Distribution", |ui| {
                plot::value_strip(ui, &aggregate::value_by_mode(&rows), &state.mode_colors);
                Ok(())
            });

            chart_section(ui, "Category Breakdown (Origin → Mode → Status)", |ui| {
                let tree = aggregate::weight_hierarchy(&rows)?;
                draw::sunburst(ui, &tree);
                Ok(())
            });

            chart_section(ui, "Shipment Trend (Monthly)", |ui| {
                plot::monthly_sparkline(ui, &aggregate::monthly_trend(&rows));
                Ok(())
            });

            chart_section(ui, "Density: Distance vs Value", |ui| {
                plot::distance_value_scatter(ui, &aggregate::distance_value_pairs(&rows));
                Ok(())
            });

            egui::CollapsingHeader::new(RichText::new("Filtered shipments").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    panels::shipment_table(ui, &rows);
                });
        });
}

/// One chart section with its own failure boundary: a bad aggregation
/// paints an inline notice and the remaining sections still render.
fn chart_section(
    ui: &mut Ui,
    title: &str,
    render: impl FnOnce(&mut Ui) -> Result<(), AggregateError>,
) {
    ui.add_space(8.0);
    ui.strong(title);
    ui.add_space(4.0);
    if let Err(e) = render(ui) {
        log::error!("chart '{title}' failed: {e}");
        ui.colored_label(Color32::RED, format!("Unable to render this chart: {e}"));
    }
    ui.separator();
}
