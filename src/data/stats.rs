use std::collections::BTreeMap;

use super::model::WsnDataset;

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Aggregates of the `Rest_Energy` column. Only exists when the dataset has
/// at least one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Dataset-level summary shown in the overview panel. An empty dataset is a
/// defined state: zero counts and `None` for the aggregates, never a panic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub total_records: usize,
    pub unique_nodes: usize,
    /// `(min, max)` of `Time`; `None` when there is no data.
    pub time_range: Option<(f64, f64)>,
    /// Class label → event count.
    pub class_distribution: BTreeMap<String, usize>,
    pub energy: Option<EnergySummary>,
}

/// Compute summary statistics in a single pass over the records.
pub fn summarize(dataset: &WsnDataset) -> DatasetStats {
    let mut class_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut energy_sum = 0.0;
    let mut energy_min = f64::INFINITY;
    let mut energy_max = f64::NEG_INFINITY;

    for rec in &dataset.records {
        *class_distribution.entry(rec.class.clone()).or_default() += 1;
        energy_sum += rec.rest_energy;
        energy_min = energy_min.min(rec.rest_energy);
        energy_max = energy_max.max(rec.rest_energy);
    }

    let energy = if dataset.is_empty() {
        None
    } else {
        Some(EnergySummary {
            mean: energy_sum / dataset.len() as f64,
            min: energy_min,
            max: energy_max,
        })
    };

    DatasetStats {
        total_records: dataset.len(),
        unique_nodes: dataset.node_ids.len(),
        time_range: dataset.time_bounds(),
        class_distribution,
        energy,
    }
}

// ---------------------------------------------------------------------------
// Node rankings
// ---------------------------------------------------------------------------

/// The `n` busiest nodes by event count, descending. Ties break by
/// ascending node id so the ranking is deterministic across runs.
pub fn top_nodes_by_volume(dataset: &WsnDataset, n: usize) -> Vec<i64> {
    let mut ranked: Vec<(i64, usize)> = node_volumes(dataset).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(n).map(|(id, _)| id).collect()
}

/// Event count per node, for the top-nodes bar chart.
pub fn node_volumes(dataset: &WsnDataset) -> BTreeMap<i64, usize> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for rec in &dataset.records {
        *counts.entry(rec.node_id).or_default() += 1;
    }
    counts
}

// ---------------------------------------------------------------------------
// Energy over time
// ---------------------------------------------------------------------------

/// Per-class mean remaining energy, bucketed into `bins` equal time slices.
/// Returns class → `[bucket midpoint, mean energy]` points, one per bucket
/// that actually holds samples of that class. Empty input or a single
/// instant collapses to at most one point per class.
pub fn energy_over_time(
    dataset: &WsnDataset,
    bins: usize,
) -> BTreeMap<String, Vec<[f64; 2]>> {
    let mut out: BTreeMap<String, Vec<[f64; 2]>> = BTreeMap::new();
    let Some((t_min, t_max)) = dataset.time_bounds() else {
        return out;
    };
    let bins = bins.max(1);
    let span = t_max - t_min;

    // (sum, count) per (class, bucket)
    let mut buckets: BTreeMap<(String, usize), (f64, usize)> = BTreeMap::new();
    for rec in &dataset.records {
        let bucket = if span > 0.0 {
            (((rec.time - t_min) / span * bins as f64) as usize).min(bins - 1)
        } else {
            0
        };
        let entry = buckets.entry((rec.class.clone(), bucket)).or_insert((0.0, 0));
        entry.0 += rec.rest_energy;
        entry.1 += 1;
    }

    for ((class, bucket), (sum, count)) in buckets {
        let midpoint = t_min + span * (bucket as f64 + 0.5) / bins as f64;
        out.entry(class)
            .or_default()
            .push([midpoint, sum / count as f64]);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;
    use std::collections::BTreeMap;

    fn rec(time: f64, node_id: i64, energy: f64, class: &str) -> Record {
        Record {
            event: 1,
            time,
            s_node: node_id,
            node_id,
            rest_energy: energy,
            class: class.to_string(),
            fields: BTreeMap::new(),
        }
    }

    fn dataset(records: Vec<Record>) -> WsnDataset {
        WsnDataset::from_records(records, vec!["Event".into()])
    }

    #[test]
    fn summarize_counts_and_ranges() {
        let ds = dataset(vec![
            rec(0.10, 79, 600.0, "normal"),
            rec(0.15, 78, 599.97, "Blackhole"),
        ]);
        let stats = summarize(&ds);
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.unique_nodes, 2);
        assert_eq!(stats.time_range, Some((0.10, 0.15)));
        assert_eq!(stats.class_distribution.get("normal"), Some(&1));
        assert_eq!(stats.class_distribution.get("Blackhole"), Some(&1));
        let energy = stats.energy.unwrap();
        assert!((energy.mean - 599.985).abs() < 1e-9);
        assert_eq!(energy.min, 599.97);
        assert_eq!(energy.max, 600.0);
    }

    #[test]
    fn summarize_empty_dataset_is_defined() {
        let stats = summarize(&dataset(Vec::new()));
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.unique_nodes, 0);
        assert_eq!(stats.time_range, None);
        assert!(stats.class_distribution.is_empty());
        assert_eq!(stats.energy, None);
    }

    #[test]
    fn top_nodes_ranked_by_event_count() {
        let ds = dataset(vec![
            rec(0.1, 79, 600.0, "normal"),
            rec(0.2, 78, 599.9, "normal"),
            rec(0.3, 79, 599.8, "normal"),
        ]);
        assert_eq!(top_nodes_by_volume(&ds, 1), vec![79]);
        assert_eq!(top_nodes_by_volume(&ds, 10), vec![79, 78]);
    }

    #[test]
    fn top_nodes_ties_break_by_ascending_id() {
        let ds = dataset(vec![
            rec(0.1, 90, 600.0, "normal"),
            rec(0.2, 12, 600.0, "normal"),
            rec(0.3, 45, 600.0, "normal"),
        ]);
        assert_eq!(top_nodes_by_volume(&ds, 3), vec![12, 45, 90]);
    }

    #[test]
    fn top_nodes_of_empty_dataset_is_empty() {
        assert!(top_nodes_by_volume(&dataset(Vec::new()), 5).is_empty());
    }

    #[test]
    fn energy_over_time_groups_by_class() {
        let ds = dataset(vec![
            rec(0.0, 1, 600.0, "normal"),
            rec(1.0, 1, 500.0, "normal"),
            rec(1.0, 2, 400.0, "Blackhole"),
        ]);
        let series = energy_over_time(&ds, 2);
        assert_eq!(series.len(), 2);
        let normal = &series["normal"];
        assert_eq!(normal.len(), 2);
        assert!((normal[0][1] - 600.0).abs() < 1e-9);
        assert!((normal[1][1] - 500.0).abs() < 1e-9);
        assert_eq!(series["Blackhole"].len(), 1);
    }

    #[test]
    fn energy_over_time_handles_single_instant() {
        let ds = dataset(vec![
            rec(0.5, 1, 600.0, "normal"),
            rec(0.5, 2, 400.0, "normal"),
        ]);
        let series = energy_over_time(&ds, 50);
        let normal = &series["normal"];
        assert_eq!(normal.len(), 1);
        assert!((normal[0][1] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn energy_over_time_empty_is_empty() {
        assert!(energy_over_time(&dataset(Vec::new()), 50).is_empty());
    }
}
