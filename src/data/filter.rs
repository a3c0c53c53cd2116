use std::collections::BTreeSet;

use super::model::WsnDataset;

// ---------------------------------------------------------------------------
// Filter predicate: up to three independent clauses, each optional
// ---------------------------------------------------------------------------

/// Composite filter over a dataset. Clauses compose conjunctively: a record
/// survives iff it satisfies every active clause.
///
/// An empty `node_ids` / `classes` set means "no restriction", never "empty
/// result" — an un-interacted multiselect shows everything. Same for a
/// `None` time range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPredicate {
    /// Inclusive on both ends, compared against `Time`.
    pub time_range: Option<(f64, f64)>,
    /// Keep records whose `Node_id` is a member. Empty = no restriction.
    pub node_ids: BTreeSet<i64>,
    /// Keep records whose `Class` is a member. Empty = no restriction.
    pub classes: BTreeSet<String>,
}

impl FilterPredicate {
    /// A predicate with no active clause (passes everything).
    pub fn pass_all() -> Self {
        Self::default()
    }

    /// Whether any clause is active.
    pub fn is_active(&self) -> bool {
        self.time_range.is_some() || !self.node_ids.is_empty() || !self.classes.is_empty()
    }

    /// Whether a single record satisfies every active clause. Membership
    /// tests run before the range comparison; no observable difference,
    /// they are just cheaper.
    pub fn matches(&self, node_id: i64, time: f64, class: &str) -> bool {
        if !self.node_ids.is_empty() && !self.node_ids.contains(&node_id) {
            return false;
        }
        if !self.classes.is_empty() && !self.classes.contains(class) {
            return false;
        }
        if let Some((min, max)) = self.time_range {
            if time < min || time > max {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Apply a predicate to a dataset, producing a fresh derived dataset.
///
/// The source is never mutated; surviving records keep their relative input
/// order (stable filter, not a resort). Never fails: an empty result is a
/// valid, representable state.
pub fn apply_filter(dataset: &WsnDataset, predicate: &FilterPredicate) -> WsnDataset {
    let records = dataset
        .records
        .iter()
        .filter(|rec| predicate.matches(rec.node_id, rec.time, &rec.class))
        .cloned()
        .collect();
    WsnDataset::from_records(records, dataset.column_order.clone())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
