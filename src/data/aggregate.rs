use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use super::model::Shipment;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// A per-chart aggregation failure.  Contained to the owning chart section;
/// the other charts keep rendering.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("column '{column}' has a non-finite value (shipment {shipment_id})")]
    NonFinite {
        column: &'static str,
        shipment_id: String,
    },
}

// ---------------------------------------------------------------------------
// Flow graph: origin → mode → destination
// ---------------------------------------------------------------------------

/// One weighted edge between two flow-graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub weight: u64,
}

/// A three-tier flow graph.  `nodes` holds every distinct label across the
/// origin, mode, and destination columns exactly once; `links` holds the
/// origin→mode edge list followed by the mode→destination edge list, both
/// weighted by the (origin, mode, destination) group count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    pub nodes: Vec<String>,
    pub links: Vec<FlowLink>,
}

/// Group rows by (origin, mode, destination) and build the flow graph.
///
/// Labels appearing in more than one column (a country that is both origin
/// and destination) collapse to a single node: the node index is keyed by
/// label value, assigned in first-seen order over the grouped tuples.
pub fn flow_graph(rows: &[&Shipment]) -> FlowGraph {
    let mut groups: BTreeMap<(&str, &str, &str), u64> = BTreeMap::new();
    for sh in rows {
        *groups
            .entry((
                sh.origin_country.as_str(),
                sh.mode.as_str(),
                sh.destination_country.as_str(),
            ))
            .or_default() += 1;
    }

    let mut nodes: Vec<String> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for &(origin, mode, destination) in groups.keys() {
        for label in [origin, mode, destination] {
            index.entry(label).or_insert_with(|| {
                nodes.push(label.to_string());
                nodes.len() - 1
            });
        }
    }

    let mut links = Vec::with_capacity(groups.len() * 2);
    for ((origin, mode, _), &count) in &groups {
        links.push(FlowLink {
            source: index[origin],
            target: index[mode],
            weight: count,
        });
    }
    for ((_, mode, destination), &count) in &groups {
        links.push(FlowLink {
            source: index[mode],
            target: index[destination],
            weight: count,
        });
    }

    FlowGraph { nodes, links }
}

// ---------------------------------------------------------------------------
// Nested hierarchy sums
// ---------------------------------------------------------------------------

/// One node of a nested grouping; `value` is the subtree sum.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub label: String,
    pub value: f64,
    pub children: Vec<HierarchyNode>,
}

/// mode → carrier → container_type, summing cargo_value_usd per leaf.
pub fn value_hierarchy(rows: &[&Shipment]) -> Result<Vec<HierarchyNode>, AggregateError> {
    hierarchy(
        rows,
        &[mode_of, carrier_of, container_of],
        cargo_value_of,
        "cargo_value_usd",
    )
}

/// origin → mode → status, summing cargo_weight_kg per leaf.
pub fn weight_hierarchy(rows: &[&Shipment]) -> Result<Vec<HierarchyNode>, AggregateError> {
    hierarchy(
        rows,
        &[origin_of, mode_of, status_of],
        cargo_weight_of,
        "cargo_weight_kg",
    )
}

fn mode_of(sh: &Shipment) -> &str {
    &sh.mode
}
fn status_of(sh: &Shipment) -> &str {
    &sh.status
}
fn origin_of(sh: &Shipment) -> &str {
    &sh.origin_country
}
fn carrier_of(sh: &Shipment) -> &str {
    &sh.carrier
}
fn container_of(sh: &Shipment) -> &str {
    &sh.container_type
}
fn cargo_value_of(sh: &Shipment) -> f64 {
    sh.cargo_value_usd
}
fn cargo_weight_of(sh: &Shipment) -> f64 {
    sh.cargo_weight_kg
}

/// Group rows along the given key columns, summing `value` per subtree.
///
/// The summed column must be finite in every row; a NaN cell (null in the
/// source) fails the whole aggregation so the chart can show a notice
/// instead of silently mis-summing.
fn hierarchy(
    rows: &[&Shipment],
    levels: &[fn(&Shipment) -> &str],
    value: fn(&Shipment) -> f64,
    value_column: &'static str,
) -> Result<Vec<HierarchyNode>, AggregateError> {
    for sh in rows {
        if !value(sh).is_finite() {
            return Err(AggregateError::NonFinite {
                column: value_column,
                shipment_id: sh.shipment_id.clone(),
            });
        }
    }
    Ok(group_level(rows, levels, value))
}

fn group_level<'a>(
    rows: &[&'a Shipment],
    levels: &[fn(&Shipment) -> &str],
    value: fn(&Shipment) -> f64,
) -> Vec<HierarchyNode> {
    let Some((head, rest)) = levels.split_first() else {
        return Vec::new();
    };

    let mut groups: BTreeMap<&str, Vec<&'a Shipment>> = BTreeMap::new();
    for &sh in rows {
        groups.entry(head(sh)).or_default().push(sh);
    }

    groups
        .into_iter()
        .map(|(label, members)| HierarchyNode {
            label: label.to_string(),
            value: members.iter().map(|sh| value(sh)).sum(),
            children: group_level(&members, rest, value),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Origin × destination matrix
// ---------------------------------------------------------------------------

/// Cross-tabulation of shipment counts: origins as rows, destinations as
/// columns, absent pairs as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OdMatrix {
    pub origins: Vec<String>,
    pub destinations: Vec<String>,
    /// `counts[origin_idx][destination_idx]`
    pub counts: Vec<Vec<u64>>,
}

impl OdMatrix {
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Largest cell, used to scale the heat ramp.
    pub fn max_count(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flat_map(|row| row.iter()).sum()
    }
}

pub fn od_matrix(rows: &[&Shipment]) -> OdMatrix {
    let origins: BTreeSet<&str> = rows.iter().map(|sh| sh.origin_country.as_str()).collect();
    let destinations: BTreeSet<&str> = rows
        .iter()
        .map(|sh| sh.destination_country.as_str())
        .collect();

    let origin_idx: HashMap<&str, usize> =
        origins.iter().enumerate().map(|(i, &o)| (o, i)).collect();
    let dest_idx: HashMap<&str, usize> = destinations
        .iter()
        .enumerate()
        .map(|(i, &d)| (d, i))
        .collect();

    let mut counts = vec![vec![0u64; destinations.len()]; origins.len()];
    for sh in rows {
        counts[origin_idx[sh.origin_country.as_str()]][dest_idx[sh.destination_country.as_str()]] +=
            1;
    }

    OdMatrix {
        origins: origins.into_iter().map(String::from).collect(),
        destinations: destinations.into_iter().map(String::from).collect(),
        counts,
    }
}

// ---------------------------------------------------------------------------
// Raw per-mode distributions
// ---------------------------------------------------------------------------

/// Raw lead-time samples per mode; the density renderer bins nothing.
/// Non-finite cells are skipped.
pub fn lead_time_by_mode(rows: &[&Shipment]) -> BTreeMap<String, Vec<f64>> {
    samples_by_mode(rows, |sh| sh.lead_time_days)
}

/// Raw cargo-value samples per mode for the strip chart.
pub fn value_by_mode(rows: &[&Shipment]) -> BTreeMap<String, Vec<f64>> {
    samples_by_mode(rows, |sh| sh.cargo_value_usd)
}

fn samples_by_mode(rows: &[&Shipment], value: fn(&Shipment) -> f64) -> BTreeMap<String, Vec<f64>> {
    let mut by_mode: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for sh in rows {
        let v = value(sh);
        if v.is_finite() {
            by_mode.entry(sh.mode.clone()).or_default().push(v);
        }
    }
    by_mode
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Shipment counts per calendar month of departure, ascending.
///
/// Months are zero-padded `"YYYY-MM"` keys, so lexicographic order is
/// chronological order.
pub fn monthly_trend(rows: &[&Shipment]) -> Vec<(String, u64)> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for sh in rows {
        let month = sh.departure_date.format("%Y-%m").to_string();
        *counts.entry(month).or_default() += 1;
    }
    counts.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Distance vs value scatter pairs
// ---------------------------------------------------------------------------

/// Raw (distance_km, cargo_value_usd) pairs; rows with a non-finite
/// coordinate are skipped.
pub fn distance_value_pairs(rows: &[&Shipment]) -> Vec<[f64; 2]> {
    rows.iter()
        .filter(|sh| sh.distance_km.is_finite() && sh.cargo_value_usd.is_finite())
        .map(|sh| [sh.distance_km, sh.cargo_value_usd])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::test_support::shipment;
    use chrono::NaiveDate;

    fn rows() -> Vec<Shipment> {
        vec![
            shipment("S1", "USA", "Germany", "Air", "Delivered", 100.0),
            shipment("S2", "USA", "Japan", "Sea", "Pending", 200.0),
            shipment("S3", "China", "USA", "Air", "Delivered", 300.0),
            shipment("S4", "China", "USA", "Air", "Delivered", 400.0),
        ]
    }

    fn refs(rows: &[Shipment]) -> Vec<&Shipment> {
        rows.iter().collect()
    }

    // -- flow graph --

    #[test]
    fn flow_edge_weights_balance_across_tiers() {
        let rows = rows();
        let graph = flow_graph(&refs(&rows));

        let half = graph.links.len() / 2;
        let origin_to_mode: u64 = graph.links[..half].iter().map(|l| l.weight).sum();
        let mode_to_dest: u64 = graph.links[half..].iter().map(|l| l.weight).sum();
        assert_eq!(origin_to_mode, rows.len() as u64);
        assert_eq!(mode_to_dest, rows.len() as u64);
    }

    #[test]
    fn flow_nodes_collapse_shared_labels() {
        let rows = rows();
        let graph = flow_graph(&refs(&rows));

        // "USA" appears as both origin and destination: one node only.
        let usa_nodes = graph.nodes.iter().filter(|n| *n == "USA").count();
        assert_eq!(usa_nodes, 1);

        // Distinct labels: China, USA, Germany, Japan, Air, Sea.
        assert_eq!(graph.nodes.len(), 6);
    }

    #[test]
    fn flow_parallel_groups_keep_their_own_edges() {
        let rows = rows();
        let graph = flow_graph(&refs(&rows));

        // (China, Air, USA) occurs twice and must carry weight 2.
        let china = graph.nodes.iter().position(|n| n == "China").unwrap();
        let air = graph.nodes.iter().position(|n| n == "Air").unwrap();
        let edge = graph
            .links
            .iter()
            .find(|l| l.source == china && l.target == air)
            .unwrap();
        assert_eq!(edge.weight, 2);
    }

    #[test]
    fn flow_graph_of_empty_table_is_empty() {
        let graph = flow_graph(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    // -- hierarchies --

    #[test]
    fn hierarchy_parent_value_is_sum_of_children() {
        let rows = rows();
        let tree = weight_hierarchy(&refs(&rows)).unwrap();

        for root in &tree {
            let child_sum: f64 = root.children.iter().map(|c| c.value).sum();
            assert_eq!(root.value, child_sum);
        }
        let total: f64 = tree.iter().map(|n| n.value).sum();
        assert_eq!(total, 4000.0); // four rows × 1000 kg
    }

    #[test]
    fn hierarchy_groups_along_the_declared_levels() {
        let rows = rows();
        let tree = weight_hierarchy(&refs(&rows)).unwrap();

        // origin level: China, USA (sorted)
        let labels: Vec<&str> = tree.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["China", "USA"]);

        // China → Air → Delivered
        let china = &tree[0];
        assert_eq!(china.children[0].label, "Air");
        assert_eq!(china.children[0].children[0].label, "Delivered");
        assert_eq!(china.children[0].children[0].value, 2000.0);
    }

    #[test]
    fn hierarchy_rejects_non_finite_sum_column() {
        let mut bad = shipment("S9", "USA", "Germany", "Air", "Delivered", f64::NAN);
        bad.cargo_weight_kg = f64::NAN;
        let rows = vec![bad];

        match weight_hierarchy(&refs(&rows)) {
            Err(AggregateError::NonFinite {
                column,
                shipment_id,
            }) => {
                assert_eq!(column, "cargo_weight_kg");
                assert_eq!(shipment_id, "S9");
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }

    #[test]
    fn hierarchy_of_empty_table_is_empty() {
        assert!(value_hierarchy(&[]).unwrap().is_empty());
    }

    // -- origin × destination matrix --

    #[test]
    fn od_matrix_cells_sum_to_row_count() {
        let rows = rows();
        let matrix = od_matrix(&refs(&rows));
        assert_eq!(matrix.total(), rows.len() as u64);
    }

    #[test]
    fn od_matrix_fills_missing_pairs_with_zero() {
        let rows = rows();
        let matrix = od_matrix(&refs(&rows));

        let china = matrix.origins.iter().position(|o| o == "China").unwrap();
        let germany = matrix
            .destinations
            .iter()
            .position(|d| d == "Germany")
            .unwrap();
        assert_eq!(matrix.counts[china][germany], 0);

        let usa_row = matrix.origins.iter().position(|o| o == "USA").unwrap();
        assert_eq!(matrix.counts[usa_row][germany], 1);
        assert_eq!(matrix.max_count(), 2);
    }

    #[test]
    fn od_matrix_of_empty_table_is_empty() {
        let matrix = od_matrix(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.total(), 0);
    }

    // -- raw distributions --

    #[test]
    fn lead_time_samples_group_by_mode_and_skip_nan() {
        let mut rows = rows();
        rows[1].lead_time_days = f64::NAN;
        let samples = lead_time_by_mode(&refs(&rows));

        assert_eq!(samples["Air"].len(), 3);
        assert!(!samples.contains_key("Sea")); // its only sample was NaN
    }

    #[test]
    fn value_samples_keep_raw_per_row_values() {
        let rows = rows();
        let samples = value_by_mode(&refs(&rows));
        assert_eq!(samples["Air"], vec![100.0, 300.0, 400.0]);
        assert_eq!(samples["Sea"], vec![200.0]);
    }

    // -- monthly trend --

    #[test]
    fn monthly_trend_is_ascending_and_sums_to_row_count() {
        let mut rows = rows();
        rows[0].departure_date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        rows[1].departure_date = NaiveDate::from_ymd_opt(2023, 11, 28).unwrap();
        rows[2].departure_date = NaiveDate::from_ymd_opt(2024, 3, 30).unwrap();
        rows[3].departure_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let trend = monthly_trend(&refs(&rows));
        let months: Vec<&str> = trend.iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(months, ["2023-11", "2024-01", "2024-03"]);

        let total: u64 = trend.iter().map(|(_, c)| c).sum();
        assert_eq!(total, rows.len() as u64);
        assert_eq!(trend[2].1, 2); // both March departures in one bucket
    }

    #[test]
    fn monthly_trend_of_empty_table_is_empty() {
        assert!(monthly_trend(&[]).is_empty());
    }

    // -- scatter pairs --

    #[test]
    fn scatter_pairs_skip_non_finite_coordinates() {
        let mut rows = rows();
        rows[2].distance_km = f64::NAN;
        let pairs = distance_value_pairs(&refs(&rows));
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|p| p[0].is_finite() && p[1].is_finite()));
    }
}
