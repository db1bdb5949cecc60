use std::collections::VecDeque;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, pos2, vec2,
};
use eframe::egui::epaint::PathShape;

use crate::color::{self, ColorMap};
use crate::data::aggregate::{FlowGraph, HierarchyNode, OdMatrix};

// ---------------------------------------------------------------------------
// Canvas helpers
// ---------------------------------------------------------------------------

fn canvas(ui: &mut Ui, height: f32) -> (Rect, egui::Painter) {
    let (rect, _response) =
        ui.allocate_exact_size(vec2(ui.available_width(), height), Sense::hover());
    (rect, ui.painter_at(rect))
}

fn empty_notice(ui: &Ui, painter: &egui::Painter, rect: Rect) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        "No shipments match the current filters",
        FontId::proportional(12.0),
        ui.visuals().weak_text_color(),
    );
}

const LABEL_FONT: f32 = 10.0;

// ---------------------------------------------------------------------------
// Sankey: origin → mode → destination
// ---------------------------------------------------------------------------

const SANKEY_NODE_WIDTH: f32 = 14.0;
const SANKEY_NODE_GAP: f32 = 8.0;

/// Three-column flow diagram.  Node heights and band thicknesses share one
/// pixels-per-shipment scale so weights are comparable across columns.
pub fn sankey(ui: &mut Ui, graph: &FlowGraph, colors: &ColorMap) {
    let (rect, painter) = canvas(ui, 320.0);
    if graph.links.is_empty() {
        empty_notice(ui, &painter, rect);
        return;
    }

    let n = graph.nodes.len();
    let mut in_w = vec![0u64; n];
    let mut out_w = vec![0u64; n];
    for link in &graph.links {
        out_w[link.source] += link.weight;
        in_w[link.target] += link.weight;
    }
    let throughput = |i: usize| in_w[i].max(out_w[i]) as f32;

    // Column assignment: breadth-first from the pure-source nodes, each node
    // placed once.  A label used as both origin and destination lands in the
    // column where it is first reached; its extra links just flow backwards.
    let mut level = vec![usize::MAX; n];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for i in 0..n {
        if in_w[i] == 0 {
            level[i] = 0;
            queue.push_back(i);
        }
    }
    while let Some(u) = queue.pop_front() {
        for link in graph.links.iter().filter(|l| l.source == u) {
            if level[link.target] == usize::MAX {
                level[link.target] = (level[u] + 1).min(2);
                queue.push_back(link.target);
            }
        }
    }
    for lv in &mut level {
        if *lv == usize::MAX {
            *lv = 0;
        }
    }

    let mut columns: [Vec<usize>; 3] = Default::default();
    for i in 0..n {
        columns[level[i]].push(i);
    }

    // One global scale keeps band widths honest across columns.
    let mut px_per_unit = f32::INFINITY;
    for col in &columns {
        if col.is_empty() {
            continue;
        }
        let total: f32 = col.iter().map(|&i| throughput(i)).sum();
        let gaps = SANKEY_NODE_GAP * col.len().saturating_sub(1) as f32;
        if total > 0.0 {
            px_per_unit = px_per_unit.min((rect.height() - gaps - 16.0) / total);
        }
    }
    if !px_per_unit.is_finite() {
        return;
    }

    let col_x = |c: usize| {
        rect.left() + 8.0 + (rect.width() - 16.0 - SANKEY_NODE_WIDTH) * c as f32 / 2.0
    };
    let mut node_rect = vec![Rect::NOTHING; n];
    for (c, col) in columns.iter().enumerate() {
        let total_h: f32 = col.iter().map(|&i| throughput(i) * px_per_unit).sum::<f32>()
            + SANKEY_NODE_GAP * col.len().saturating_sub(1) as f32;
        let mut y = rect.center().y - total_h / 2.0;
        for &i in col {
            let h = (throughput(i) * px_per_unit).max(1.0);
            node_rect[i] = Rect::from_min_size(pos2(col_x(c), y), vec2(SANKEY_NODE_WIDTH, h));
            y += h + SANKEY_NODE_GAP;
        }
    }

    // Bands, stacked top-down at both endpoints.
    let mut out_cursor = vec![0.0f32; n];
    let mut in_cursor = vec![0.0f32; n];
    for link in &graph.links {
        let thickness = link.weight as f32 * px_per_unit;
        let src = node_rect[link.source];
        let dst = node_rect[link.target];
        let y0 = src.top() + out_cursor[link.source];
        out_cursor[link.source] += thickness;
        let y1 = dst.top() + in_cursor[link.target];
        in_cursor[link.target] += thickness;

        let band_color = colors
            .get(&graph.nodes[link.source])
            .or_else(|| colors.get(&graph.nodes[link.target]))
            .unwrap_or(Color32::GRAY)
            .gamma_multiply(0.35);
        band(&painter, src.right(), y0, dst.left(), y1, thickness, band_color);
    }

    // Node bars and labels over the bands.
    let text_color = ui.visuals().text_color();
    for i in 0..n {
        let fill = colors.get(&graph.nodes[i]).unwrap_or(Color32::from_gray(120));
        painter.rect_filled(node_rect[i], 2.0, fill);

        if level[i] == 2 {
            painter.text(
                node_rect[i].left_center() + vec2(-4.0, 0.0),
                Align2::RIGHT_CENTER,
                &graph.nodes[i],
                FontId::proportional(LABEL_FONT),
                text_color,
            );
        } else {
            painter.text(
                node_rect[i].right_center() + vec2(4.0, 0.0),
                Align2::LEFT_CENTER,
                &graph.nodes[i],
                FontId::proportional(LABEL_FONT),
                text_color,
            );
        }
    }
}

/// A smooth horizontal band of constant thickness between two node edges.
fn band(painter: &egui::Painter, x0: f32, y0: f32, x1: f32, y1: f32, thickness: f32, color: Color32) {
    const SEGMENTS: usize = 24;
    let mut top: Vec<Pos2> = Vec::with_capacity(SEGMENTS + 1);
    let mut bottom: Vec<Pos2> = Vec::with_capacity(SEGMENTS + 1);
    for s in 0..=SEGMENTS {
        let u = s as f32 / SEGMENTS as f32;
        let ease = u * u * (3.0 - 2.0 * u);
        let x = x0 + (x1 - x0) * u;
        let y = y0 + (y1 - y0) * ease;
        top.push(pos2(x, y));
        bottom.push(pos2(x, y + thickness));
    }
    let mut points = top;
    points.extend(bottom.into_iter().rev());
    painter.add(Shape::Path(PathShape {
        points,
        closed: true,
        fill: color,
        stroke: Stroke::NONE.into(),
    }));
}

// ---------------------------------------------------------------------------
// Treemap: nested area chart
// ---------------------------------------------------------------------------

/// Slice-and-dice treemap over a three-level hierarchy.  Top-level groups
/// get a header strip and their palette colour; deeper levels lighten it.
pub fn treemap(ui: &mut Ui, roots: &[HierarchyNode], colors: &ColorMap) {
    let (rect, painter) = canvas(ui, 300.0);
    let total: f64 = roots.iter().map(|node| node.value.max(0.0)).sum();
    if total <= 0.0 {
        empty_notice(ui, &painter, rect);
        return;
    }

    let mut x = rect.left();
    for node in roots {
        if node.value <= 0.0 {
            continue;
        }
        let w = rect.width() * (node.value / total) as f32;
        let slice = Rect::from_min_max(pos2(x, rect.top()), pos2(x + w, rect.bottom()));
        x += w;

        let color = colors.color_for(&node.label);
        let header = Rect::from_min_max(slice.left_top(), pos2(slice.right(), slice.top() + 16.0));
        painter.rect_filled(header.shrink(1.0), 2.0, color);
        if header.width() > 30.0 {
            painter.text(
                header.center(),
                Align2::CENTER_CENTER,
                &node.label,
                FontId::proportional(LABEL_FONT),
                Color32::WHITE,
            );
        }

        let body = Rect::from_min_max(pos2(slice.left(), header.bottom()), slice.right_bottom());
        subdivide(&painter, body, &node.children, node.value, color, 1, false);
    }
}

/// Recursively split `rect` among `children`, alternating direction.
fn subdivide(
    painter: &egui::Painter,
    rect: Rect,
    children: &[HierarchyNode],
    parent_value: f64,
    branch_color: Color32,
    depth: usize,
    horizontal: bool,
) {
    if parent_value <= 0.0 {
        return;
    }
    if children.is_empty() {
        let fill = color::lighten(branch_color, 0.15 * depth as f32);
        painter.rect_filled(rect.shrink(1.0), 0.0, fill);
        return;
    }

    let mut cursor = if horizontal { rect.left() } else { rect.top() };
    for child in children {
        if child.value <= 0.0 {
            continue;
        }
        let share = (child.value / parent_value) as f32;
        let cell = if horizontal {
            let w = rect.width() * share;
            let r = Rect::from_min_max(pos2(cursor, rect.top()), pos2(cursor + w, rect.bottom()));
            cursor += w;
            r
        } else {
            let h = rect.height() * share;
            let r = Rect::from_min_max(pos2(rect.left(), cursor), pos2(rect.right(), cursor + h));
            cursor += h;
            r
        };

        if child.children.is_empty() {
            let fill = color::lighten(branch_color, 0.15 * depth as f32);
            painter.rect_filled(cell.shrink(1.0), 0.0, fill);
            if cell.width() > 44.0 && cell.height() > 14.0 {
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    &child.label,
                    FontId::proportional(LABEL_FONT - 1.0),
                    Color32::from_gray(40),
                );
            }
        } else {
            subdivide(
                painter,
                cell,
                &child.children,
                child.value,
                branch_color,
                depth + 1,
                !horizontal,
            );
            if cell.width() > 44.0 && cell.height() > 14.0 {
                painter.text(
                    cell.left_top() + vec2(3.0, 2.0),
                    Align2::LEFT_TOP,
                    &child.label,
                    FontId::proportional(LABEL_FONT - 1.0),
                    Color32::from_gray(40),
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Origin × destination heatmap
// ---------------------------------------------------------------------------

const HEATMAP_GUTTER_LEFT: f32 = 96.0;
const HEATMAP_GUTTER_TOP: f32 = 20.0;

/// Count matrix as a coloured grid with in-cell values.
pub fn od_heatmap(ui: &mut Ui, matrix: &OdMatrix) {
    let n_rows = matrix.origins.len();
    let n_cols = matrix.destinations.len();
    let height = (HEATMAP_GUTTER_TOP + 24.0 * n_rows as f32).clamp(80.0, 460.0);
    let (rect, painter) = canvas(ui, height);
    if matrix.is_empty() {
        empty_notice(ui, &painter, rect);
        return;
    }

    let cell_w = (rect.width() - HEATMAP_GUTTER_LEFT) / n_cols as f32;
    let cell_h = (rect.height() - HEATMAP_GUTTER_TOP) / n_rows as f32;
    let max = matrix.max_count().max(1) as f32;
    let text_color = ui.visuals().text_color();

    for (j, dest) in matrix.destinations.iter().enumerate() {
        painter.text(
            pos2(
                rect.left() + HEATMAP_GUTTER_LEFT + (j as f32 + 0.5) * cell_w,
                rect.top() + HEATMAP_GUTTER_TOP / 2.0,
            ),
            Align2::CENTER_CENTER,
            dest,
            FontId::proportional(LABEL_FONT - 1.0),
            text_color,
        );
    }

    for (i, origin) in matrix.origins.iter().enumerate() {
        let row_y = rect.top() + HEATMAP_GUTTER_TOP + i as f32 * cell_h;
        painter.text(
            pos2(rect.left() + HEATMAP_GUTTER_LEFT - 6.0, row_y + cell_h / 2.0),
            Align2::RIGHT_CENTER,
            origin,
            FontId::proportional(LABEL_FONT - 1.0),
            text_color,
        );

        for j in 0..n_cols {
            let count = matrix.counts[i][j];
            let t = count as f32 / max;
            let cell = Rect::from_min_size(
                pos2(rect.left() + HEATMAP_GUTTER_LEFT + j as f32 * cell_w, row_y),
                vec2(cell_w, cell_h),
            );
            painter.rect_filled(cell.shrink(0.5), 0.0, color::heat_color(t));

            if cell_w > 22.0 {
                let value_color = if t > 0.55 {
                    Color32::WHITE
                } else {
                    Color32::from_gray(60)
                };
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    count.to_string(),
                    FontId::proportional(LABEL_FONT - 1.0),
                    value_color,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Sunburst: radial category tree
// ---------------------------------------------------------------------------

/// Concentric rings over a nested hierarchy; angle spans are proportional
/// to subtree sums, children inherit a lightened parent colour.
pub fn sunburst(ui: &mut Ui, roots: &[HierarchyNode]) {
    let (rect, painter) = canvas(ui, 340.0);
    let total: f64 = roots.iter().map(|node| node.value.max(0.0)).sum();
    if total <= 0.0 {
        empty_notice(ui, &painter, rect);
        return;
    }

    let center = rect.center();
    let outer_radius = (rect.width().min(rect.height()) / 2.0 - 10.0).max(30.0);
    let hole = outer_radius * 0.18;
    let ring = (outer_radius - hole) / 3.0;
    let separator = ui.visuals().window_fill();
    let text_color = ui.visuals().text_color();

    let palette = color::generate_palette(roots.len());
    let full_turn = std::f64::consts::TAU;
    let mut angle = -std::f64::consts::FRAC_PI_2;
    for (node, base_color) in roots.iter().zip(palette) {
        if node.value <= 0.0 {
            continue;
        }
        let sweep = full_turn * node.value / total;
        draw_ring(
            &painter,
            center,
            hole,
            ring,
            0,
            angle,
            sweep,
            node,
            base_color,
            separator,
            text_color,
        );
        angle += sweep;
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_ring(
    painter: &egui::Painter,
    center: Pos2,
    hole: f32,
    ring: f32,
    depth: usize,
    start: f64,
    sweep: f64,
    node: &HierarchyNode,
    color: Color32,
    separator: Color32,
    text_color: Color32,
) {
    let r_in = hole + ring * depth as f32;
    let r_out = r_in + ring;
    annular_sector(painter, center, r_in, r_out, start, start + sweep, color, separator);

    let mid_radius = (r_in + r_out) / 2.0;
    if sweep * mid_radius as f64 > 26.0 {
        let mid = start + sweep / 2.0;
        let pos = center
            + vec2(
                mid_radius * mid.cos() as f32,
                mid_radius * mid.sin() as f32,
            );
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            &node.label,
            FontId::proportional(LABEL_FONT - 1.0),
            text_color,
        );
    }

    if depth >= 2 || node.value <= 0.0 {
        return;
    }
    let mut child_start = start;
    for child in &node.children {
        if child.value <= 0.0 {
            continue;
        }
        let child_sweep = sweep * child.value / node.value;
        draw_ring(
            painter,
            center,
            hole,
            ring,
            depth + 1,
            child_start,
            child_sweep,
            child,
            color::lighten(color, 0.22 * (depth + 1) as f32),
            separator,
            text_color,
        );
        child_start += child_sweep;
    }
}

#[allow(clippy::too_many_arguments)]
fn annular_sector(
    painter: &egui::Painter,
    center: Pos2,
    r_in: f32,
    r_out: f32,
    a0: f64,
    a1: f64,
    fill: Color32,
    separator: Color32,
) {
    let segments = (((a1 - a0).abs() / 0.06).ceil() as usize).max(2);
    let mut points: Vec<Pos2> = Vec::with_capacity(2 * (segments + 1));
    for s in 0..=segments {
        let a = a0 + (a1 - a0) * s as f64 / segments as f64;
        points.push(center + vec2(r_out * a.cos() as f32, r_out * a.sin() as f32));
    }
    for s in (0..=segments).rev() {
        let a = a0 + (a1 - a0) * s as f64 / segments as f64;
        points.push(center + vec2(r_in * a.cos() as f32, r_in * a.sin() as f32));
    }
    painter.add(Shape::Path(PathShape {
        points,
        closed: true,
        fill,
        stroke: Stroke::new(1.0, separator).into(),
    }));
}
