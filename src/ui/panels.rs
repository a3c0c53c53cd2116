use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::data::{export, loader};
use crate::state::{AppState, LEDGER_BATCH_LIMIT};

// ---------------------------------------------------------------------------
// Left side panel – filters and ledger
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the index data we need so we can mutate state inside the loop.
    let classes: Vec<String> = dataset.classes.iter().cloned().collect();
    let node_ids: Vec<i64> = dataset.node_ids.iter().copied().collect();
    let time_bounds = dataset.time_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            time_range_section(ui, state, time_bounds);
            ui.separator();
            class_section(ui, state, &classes);
            ui.separator();
            node_section(ui, state, &node_ids);
            ui.separator();
            if ui.button("Reset Filters").clicked() {
                state.reset_filters();
            }
            ui.separator();
            ledger_section(ui, state);
        });
}

/// Time-range clause: two drag values clamped to the observed bounds.
fn time_range_section(ui: &mut Ui, state: &mut AppState, bounds: Option<(f64, f64)>) {
    ui.strong("Time Range");
    let Some((t_min, t_max)) = bounds else {
        ui.label("No data.");
        return;
    };

    let (mut lo, mut hi) = state.predicate.time_range.unwrap_or((t_min, t_max));
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        ui.label("from");
        changed |= ui
            .add(DragValue::new(&mut lo).speed(0.01).range(t_min..=t_max))
            .changed();
        ui.label("to");
        changed |= ui
            .add(DragValue::new(&mut hi).speed(0.01).range(t_min..=t_max))
            .changed();
    });

    if changed {
        state.set_time_range(Some((lo, hi)));
    }
    if state.predicate.time_range.is_some() && ui.small_button("Clear range").clicked() {
        state.set_time_range(None);
    }
}

/// Class clause: one checkbox per observed label, coloured like the charts.
/// No checked boxes means no restriction.
fn class_section(ui: &mut Ui, state: &mut AppState, classes: &[String]) {
    ui.strong("Event Class");
    for class in classes {
        let selected = state.predicate.classes.contains(class);
        let text = RichText::new(class).color(state.palette.color_for(class));
        let mut checked = selected;
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_class(class);
        }
    }
}

/// Node clause, collapsed by default since captures can hold hundreds of
/// nodes. No checked boxes means no restriction.
fn node_section(ui: &mut Ui, state: &mut AppState, node_ids: &[i64]) {
    let n_selected = state.predicate.node_ids.len();
    let header = format!("Nodes  ({n_selected}/{} selected)", node_ids.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("node_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear selection").clicked() {
                state.clear_node_selection();
            }
            for &node_id in node_ids {
                let mut checked = state.predicate.node_ids.contains(&node_id);
                if ui.checkbox(&mut checked, format!("Node {node_id}")).changed() {
                    state.toggle_node(node_id);
                }
            }
        });
}

/// Simulated ledger controls. Everything here is fabricated locally; the
/// section exists so the panel exercises the same interface a real ledger
/// client would expose.
fn ledger_section(ui: &mut Ui, state: &mut AppState) {
    egui::CollapsingHeader::new(RichText::new("Ledger (simulated)").strong())
        .id_salt("ledger_panel")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            match &state.chain {
                Some(info) => {
                    ui.label(format!("{} (chain id {})", info.network, info.chain_id));
                    ui.label(format!("Latest block: {}", info.latest_block));
                    ui.label(format!("Gas: {:.1} gwei", info.gas_price_gwei));
                }
                None => {
                    if ui.button("Connect").clicked() {
                        state.ledger_connect();
                    }
                }
            }

            if state.ledger.is_connected() {
                match state.ledger.contract_address() {
                    Some(address) => {
                        ui.label(RichText::new(address).monospace().size(10.0));
                    }
                    None => {
                        if ui.button("Deploy contract").clicked() {
                            state.ledger_deploy();
                        }
                    }
                }
            }

            if state.ledger.contract_address().is_some() {
                ui.checkbox(&mut state.ledger_attacks_only, "Attack records only");
                if ui
                    .button(format!("Submit view (≤{LEDGER_BATCH_LIMIT} rows)"))
                    .clicked()
                {
                    state.ledger_submit_view();
                }
            }

            if !state.receipts.is_empty() {
                ui.label(format!("{} transactions recorded", state.receipts.len()));
                if let Some(last) = state.receipts.last() {
                    ui.label(RichText::new(&last.tx_hash).monospace().size(10.0));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_view = state.view.is_some();
            if ui
                .add_enabled(has_view, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} records loaded, {} in view",
                ds.len(),
                view.len()
            ));
        }

        if let Some(stats) = &state.stats {
            ui.separator();
            ui.label(format!("{} nodes", stats.unique_nodes));
            if let Some((lo, hi)) = stats.time_range {
                ui.label(format!("t = {lo:.2} – {hi:.2}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open WSN capture")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match loader::load_path(&path) {
            Ok(dataset) => {
                log::info!(
                    "loaded {} records across {} nodes",
                    dataset.len(),
                    dataset.node_ids.len()
                );
                state.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("failed to load capture: {e}");
                state.status_message = Some(format!("Error: {e}"));
                state.loading = false;
            }
        }
    }
}

fn export_file_dialog(state: &mut AppState) {
    let Some(view) = &state.view else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered view")
        .set_file_name("filtered_wsn_data.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export::export_path(view, &path) {
            Ok(()) => {
                log::info!("exported {} records to {}", view.len(), path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
