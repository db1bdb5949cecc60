use std::collections::BTreeMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{AxisHints, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Lead-time ridgeline (per-mode density curves)
// ---------------------------------------------------------------------------

/// Vertical spacing between the ridge baselines, in plot units.  Densities
/// are peak-normalised to 1.0 so neighbouring ridges overlap slightly,
/// which is the ridgeline look.
const RIDGE_STEP: f64 = 1.2;

/// One smoothed density curve per transport mode, vertically offset.
pub fn lead_time_ridgeline(ui: &mut Ui, samples: &BTreeMap<String, Vec<f64>>, colors: &ColorMap) {
    Plot::new("lead_time_ridgeline")
        .height(280.0)
        .legend(Legend::default())
        .show_axes([true, false])
        .x_axis_label("Lead time (days)")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (mode, values)) in samples.iter().enumerate() {
                let baseline = i as f64 * RIDGE_STEP;
                let color = colors.color_for(mode);

                let curve = density_curve(values);
                if curve.is_empty() {
                    continue;
                }

                let label_x = curve.first().map(|p| p[0]).unwrap_or(0.0);
                let points: PlotPoints = curve
                    .into_iter()
                    .map(|[x, d]| [x, baseline + d])
                    .collect();

                plot_ui.line(
                    Line::new(points)
                        .name(mode)
                        .color(color)
                        .width(1.5)
                        .fill(baseline as f32),
                );
                plot_ui.text(
                    Text::new(PlotPoint::new(label_x, baseline + 0.5), mode).color(color),
                );
            }
        });
}

/// Peak-normalised Gaussian kernel density estimate over the raw samples.
fn density_curve(samples: &[f64]) -> Vec<[f64; 2]> {
    if samples.is_empty() {
        return Vec::new();
    }

    let bandwidth = silverman_bandwidth(samples);
    let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lo = min - 3.0 * bandwidth;
    let hi = max + 3.0 * bandwidth;

    const STEPS: usize = 128;
    let n = samples.len() as f64;
    let mut curve: Vec<[f64; 2]> = (0..=STEPS)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / STEPS as f64;
            let density: f64 = samples
                .iter()
                .map(|&s| {
                    let z = (x - s) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
            [x, density]
        })
        .collect();

    let peak = curve.iter().map(|p| p[1]).fold(0.0, f64::max);
    if peak > 0.0 {
        for p in &mut curve {
            p[1] /= peak;
        }
    }
    curve
}

/// Silverman's rule of thumb, with a floor so a constant sample still
/// produces a visible bump.
fn silverman_bandwidth(samples: &[f64]) -> f64 {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    (0.9 * std_dev * n.powf(-0.2)).max(0.5)
}

// ---------------------------------------------------------------------------
// Cargo-value strip plot
// ---------------------------------------------------------------------------

/// Raw per-shipment values as jittered dots, one row per mode.
pub fn value_strip(ui: &mut Ui, samples: &BTreeMap<String, Vec<f64>>, colors: &ColorMap) {
    Plot::new("value_strip")
        .height(220.0)
        .legend(Legend::default())
        .show_axes([true, false])
        .x_axis_label("Cargo value (USD)")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (mode, values)) in samples.iter().enumerate() {
                let row = i as f64;
                let color = colors.color_for(mode);

                let points: PlotPoints = values
                    .iter()
                    .enumerate()
                    .map(|(j, &v)| [v, row + jitter(j)])
                    .collect();

                plot_ui.points(Points::new(points).name(mode).color(color).radius(2.0));

                if let Some(&first) = values.first() {
                    plot_ui.text(Text::new(PlotPoint::new(first, row + 0.35), mode).color(color));
                }
            }
        });
}

/// Deterministic pseudo-jitter in [-0.25, 0.25]; no RNG so a re-render of
/// the same filtered table paints identical dots.
fn jitter(j: usize) -> f64 {
    let h = j.wrapping_mul(2654435761) % 1000;
    (h as f64 / 1000.0 - 0.5) * 0.5
}

// ---------------------------------------------------------------------------
// Monthly trend sparkline
// ---------------------------------------------------------------------------

/// Shipment counts per departure month as a compact line.
pub fn monthly_sparkline(ui: &mut Ui, trend: &[(String, u64)]) {
    let months: Vec<String> = trend.iter().map(|(m, _)| m.clone()).collect();

    let x_axis = AxisHints::new_x().formatter(move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 0.01 || i < 0.0 {
            return String::new();
        }
        months.get(i as usize).cloned().unwrap_or_default()
    });

    let points: PlotPoints = trend
        .iter()
        .enumerate()
        .map(|(i, (_, count))| [i as f64, *count as f64])
        .collect();

    Plot::new("monthly_trend")
        .height(140.0)
        .custom_x_axes(vec![x_axis])
        .y_axis_label("Shipments")
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(Color32::LIGHT_BLUE).width(2.0));
        });
}

// ---------------------------------------------------------------------------
// Distance vs value scatter
// ---------------------------------------------------------------------------

/// Raw (distance, value) pairs with opacity blending so dense regions read
/// darker.
pub fn distance_value_scatter(ui: &mut Ui, pairs: &[[f64; 2]]) {
    let color = Color32::from_rgba_unmultiplied(100, 150, 250, 100);

    Plot::new("distance_value")
        .height(280.0)
        .x_axis_label("Distance (km)")
        .y_axis_label("Cargo value (USD)")
        .show(ui, |plot_ui| {
            plot_ui.points(Points::new(PlotPoints::from(pairs.to_vec())).color(color).radius(2.5));
        });
}
