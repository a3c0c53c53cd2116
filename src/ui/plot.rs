use eframe::egui::{self, Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::data::export;
use crate::data::filter::{apply_filter, FilterPredicate};
use crate::data::model::WsnDataset;
use crate::data::stats;
use crate::state::{AppState, ViewTab};

/// Time buckets for the energy chart, matching the original dashboard.
const ENERGY_BINS: usize = 50;

/// Rows shown in the Data Preview table.
const PREVIEW_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the chart area: tab strip plus the active chart.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.view.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a WSN capture to begin  (File → Open…)");
        });
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        for tab in ViewTab::ALL {
            if ui
                .selectable_label(state.active_tab == tab, tab.label())
                .clicked()
            {
                state.active_tab = tab;
            }
        }
    });
    ui.separator();

    if view.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No records match the current filters.");
        });
        return;
    }

    match state.active_tab {
        ViewTab::Preview => data_preview(ui, &view),
        ViewTab::Classes => class_distribution(ui, state),
        ViewTab::Energy => energy_over_time(ui, state, &view),
        ViewTab::TopNodes => top_nodes(ui, state, &view),
        ViewTab::Node => node_analysis(ui, state, &view),
    }
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

/// Raw-records table: the first few rows of the current view, all columns
/// in their input order.
fn data_preview(ui: &mut Ui, view: &WsnDataset) {
    ui.label(format!(
        "Showing {} of {} records in view",
        view.len().min(PREVIEW_ROWS),
        view.len()
    ));
    ui.separator();

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("data_preview")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for col in &view.column_order {
                        ui.strong(col);
                    }
                    ui.end_row();

                    for rec in view.records.iter().take(PREVIEW_ROWS) {
                        for col in &view.column_order {
                            ui.label(export::cell_text(rec, col));
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Class distribution
// ---------------------------------------------------------------------------

fn class_distribution(ui: &mut Ui, state: &AppState) {
    let Some(stats) = &state.stats else {
        return;
    };

    Plot::new("class_distribution")
        .legend(Legend::default())
        .x_axis_label("Class")
        .y_axis_label("Event count")
        .show(ui, |plot_ui| {
            for (i, (class, count)) in stats.class_distribution.iter().enumerate() {
                let bar = Bar::new(i as f64, *count as f64).width(0.6);
                let chart = BarChart::new(vec![bar])
                    .name(class)
                    .color(state.palette.color_for(class));
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Energy over time
// ---------------------------------------------------------------------------

fn energy_over_time(ui: &mut Ui, state: &AppState, view: &WsnDataset) {
    let series = stats::energy_over_time(view, ENERGY_BINS);

    Plot::new("energy_over_time")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Mean remaining energy")
        .show(ui, |plot_ui| {
            for (class, points) in &series {
                let plot_points: PlotPoints =
                    points.iter().map(|&[x, y]| [x, y]).collect();
                let line = Line::new(plot_points)
                    .name(class)
                    .color(state.palette.color_for(class))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Top nodes by event volume
// ---------------------------------------------------------------------------

fn top_nodes(ui: &mut Ui, state: &mut AppState, view: &WsnDataset) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Nodes ranked:");
        ui.add(egui::Slider::new(&mut state.top_n, 5..=30));
    });

    let ranked = stats::top_nodes_by_volume(view, state.top_n);
    let volumes = stats::node_volumes(view);

    Plot::new("top_nodes")
        .x_axis_label("Rank")
        .y_axis_label("Event count")
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = ranked
                .iter()
                .enumerate()
                .map(|(i, node_id)| {
                    let count = volumes.get(node_id).copied().unwrap_or(0);
                    Bar::new(i as f64, count as f64)
                        .width(0.6)
                        .name(format!("Node {node_id}"))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Per-node drill-down
// ---------------------------------------------------------------------------

fn node_analysis(ui: &mut Ui, state: &mut AppState, view: &WsnDataset) {
    let node_ids: Vec<i64> = view.node_ids.iter().copied().collect();
    if node_ids.is_empty() {
        return;
    }

    let mut selected = state
        .selected_node
        .filter(|id| node_ids.contains(id))
        .unwrap_or(node_ids[0]);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Node:");
        egui::ComboBox::from_id_salt("node_select")
            .selected_text(format!("Node {selected}"))
            .show_ui(ui, |ui: &mut Ui| {
                for &id in &node_ids {
                    if ui
                        .selectable_label(selected == id, format!("Node {id}"))
                        .clicked()
                    {
                        selected = id;
                    }
                }
            });
    });
    state.selected_node = Some(selected);

    // Drill-down is just another filter application over the current view.
    let pred = FilterPredicate {
        node_ids: std::collections::BTreeSet::from([selected]),
        ..Default::default()
    };
    let node_view = apply_filter(view, &pred);
    let node_stats = stats::summarize(&node_view);

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Events: {}", node_stats.total_records));
        ui.separator();
        let dominant = node_stats
            .class_distribution
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(class, _)| class.as_str())
            .unwrap_or("unknown");
        ui.label(format!("Class: {dominant}"));
        ui.separator();
        if let Some(energy) = node_stats.energy {
            ui.label(format!("Avg energy: {:.2}", energy.mean));
        }
    });

    Plot::new("node_timeline")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Remaining energy")
        .show(ui, |plot_ui| {
            for class in &node_view.classes {
                let points: PlotPoints = node_view
                    .records
                    .iter()
                    .filter(|r| &r.class == class)
                    .map(|r| [r.time, r.rest_energy])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(class)
                        .color(state.palette.color_for(class))
                        .radius(2.5),
                );
            }
        });
}
