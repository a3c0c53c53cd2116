use crate::color::ClassPalette;
use crate::data::filter::{apply_filter, FilterPredicate};
use crate::data::model::WsnDataset;
use crate::data::stats::{summarize, DatasetStats};
use crate::ledger::{ChainInfo, LedgerClient, MockLedger, TelemetryPayload, TxReceipt};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTab {
    Preview,
    Classes,
    Energy,
    TopNodes,
    Node,
}

impl ViewTab {
    pub const ALL: [ViewTab; 5] = [
        ViewTab::Preview,
        ViewTab::Classes,
        ViewTab::Energy,
        ViewTab::TopNodes,
        ViewTab::Node,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewTab::Preview => "Data Preview",
            ViewTab::Classes => "Class Distribution",
            ViewTab::Energy => "Energy Over Time",
            ViewTab::TopNodes => "Top Nodes",
            ViewTab::Node => "Node Analysis",
        }
    }
}

/// At most this many records go to the ledger per submission, mirroring the
/// cap a metered backend would impose.
pub const LEDGER_BATCH_LIMIT: usize = 50;

/// The full UI state, independent of rendering. The loaded dataset is
/// immutable; every interaction re-derives `view` and `stats` from scratch.
pub struct AppState {
    /// Loaded dataset (None until the user opens a file).
    pub dataset: Option<WsnDataset>,

    /// Current filter clauses.
    pub predicate: FilterPredicate,

    /// Derived view after applying `predicate` (cached per interaction).
    pub view: Option<WsnDataset>,

    /// Summary of the derived view (cached alongside it).
    pub stats: Option<DatasetStats>,

    /// Stable class → colour mapping for the loaded dataset.
    pub palette: ClassPalette,

    /// Active chart tab.
    pub active_tab: ViewTab,

    /// Node under inspection in the Node Analysis tab.
    pub selected_node: Option<i64>,

    /// How many nodes the Top Nodes chart ranks.
    pub top_n: usize,

    /// Simulated ledger backend and its observed state.
    pub ledger: MockLedger,
    pub chain: Option<ChainInfo>,
    pub receipts: Vec<TxReceipt>,
    /// Restrict ledger submission to attack classes only.
    pub ledger_attacks_only: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            predicate: FilterPredicate::default(),
            view: None,
            stats: None,
            palette: ClassPalette::default(),
            active_tab: ViewTab::Preview,
            selected_node: None,
            top_n: 15,
            ledger: MockLedger::new(),
            chain: None,
            receipts: Vec::new(),
            ledger_attacks_only: false,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset: reset filters, rebuild the palette
    /// and the derived view.
    pub fn set_dataset(&mut self, dataset: WsnDataset) {
        self.predicate = FilterPredicate::pass_all();
        self.palette = ClassPalette::new(&dataset.classes);
        self.selected_node = dataset.node_ids.iter().next().copied();
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Recompute the derived view and its summary after a filter change.
    /// The source dataset is never touched.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            let view = apply_filter(ds, &self.predicate);
            self.stats = Some(summarize(&view));
            self.view = Some(view);
        } else {
            self.view = None;
            self.stats = None;
        }
    }

    /// Drop all filter clauses.
    pub fn reset_filters(&mut self) {
        self.predicate = FilterPredicate::pass_all();
        self.refilter();
    }

    /// Toggle one class label in the class clause.
    pub fn toggle_class(&mut self, class: &str) {
        if !self.predicate.classes.remove(class) {
            self.predicate.classes.insert(class.to_string());
        }
        self.refilter();
    }

    /// Toggle one node id in the node clause.
    pub fn toggle_node(&mut self, node_id: i64) {
        if !self.predicate.node_ids.remove(&node_id) {
            self.predicate.node_ids.insert(node_id);
        }
        self.refilter();
    }

    /// Clear the node clause (empty set = no restriction).
    pub fn clear_node_selection(&mut self) {
        self.predicate.node_ids.clear();
        self.refilter();
    }

    /// Set or clear the time-range clause, normalized so min ≤ max.
    pub fn set_time_range(&mut self, range: Option<(f64, f64)>) {
        self.predicate.time_range = range.map(|(lo, hi)| (lo.min(hi), lo.max(hi)));
        self.refilter();
    }

    // -- Ledger interactions (all simulated, all synchronous) --

    pub fn ledger_connect(&mut self) {
        match self.ledger.connect() {
            Ok(info) => {
                log::info!("connected to {} (chain id {})", info.network, info.chain_id);
                self.chain = Some(info);
            }
            Err(e) => self.status_message = Some(format!("Ledger error: {e:#}")),
        }
    }

    pub fn ledger_deploy(&mut self) {
        if let Err(e) = self.ledger.deploy_contract("WsnTelemetry") {
            self.status_message = Some(format!("Ledger error: {e:#}"));
        }
    }

    /// Submit the current view's records (capped at [`LEDGER_BATCH_LIMIT`])
    /// to the simulated ledger.
    pub fn ledger_submit_view(&mut self) {
        let Some(view) = &self.view else {
            self.status_message = Some("Load a dataset before submitting.".to_string());
            return;
        };

        let batch: Vec<TelemetryPayload> = view
            .records
            .iter()
            .filter(|rec| !self.ledger_attacks_only || rec.class != "normal")
            .take(LEDGER_BATCH_LIMIT)
            .map(|rec| TelemetryPayload {
                node_id: rec.node_id,
                energy: rec.rest_energy,
                class: rec.class.clone(),
                timestamp: rec.time,
            })
            .collect();

        if batch.is_empty() {
            self.status_message = Some("No records match the submission criteria.".to_string());
            return;
        }

        for payload in &batch {
            match self.ledger.submit(payload) {
                Ok(receipt) => self.receipts.push(receipt),
                Err(e) => {
                    self.status_message = Some(format!("Ledger error: {e:#}"));
                    return;
                }
            }
        }
        log::info!("submitted {} records to the ledger", batch.len());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_reader;

    fn sample_csv() -> String {
        let header = "Event,Time,S_Node,Node_id,Rest_Energy,Trace_Level,\
             Mac_Type_Pckt,Source_IP_Port,Des_IP_Port,Packet_Size,TTL,Hop_Count,\
             Broadcast_ID,Dest_Node_Num,Dest_Seq_Num,Src_Node_ID,Src_Seq_Num,Class";
        format!(
            "{header}\n\
             1,0.1,79,79,600,5,AODV,a,b,512,30,2,7,1,4,79,2,normal\n\
             2,0.15,78,78,599.97,5,AODV,a,b,512,30,2,7,1,4,78,2,Blackhole\n"
        )
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(load_reader(sample_csv().as_bytes()).unwrap());
        state
    }

    #[test]
    fn set_dataset_derives_unfiltered_view() {
        let state = loaded_state();
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
        assert_eq!(state.stats.as_ref().unwrap().total_records, 2);
        assert!(!state.predicate.is_active());
    }

    #[test]
    fn toggling_a_class_refilters() {
        let mut state = loaded_state();
        state.toggle_class("Blackhole");
        assert_eq!(state.view.as_ref().unwrap().len(), 1);
        assert_eq!(state.dataset.as_ref().unwrap().len(), 2);

        // Toggling back off clears the clause → everything visible again.
        state.toggle_class("Blackhole");
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn time_range_is_normalized() {
        let mut state = loaded_state();
        state.set_time_range(Some((0.2, 0.05)));
        assert_eq!(state.predicate.time_range, Some((0.05, 0.2)));
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn ledger_submission_goes_through_the_pipeline() {
        let mut state = loaded_state();
        state.ledger_connect();
        state.ledger_deploy();
        state.ledger_attacks_only = true;
        state.ledger_submit_view();
        assert_eq!(state.receipts.len(), 1);
        assert!(state.receipts[0].success);
    }
}
