use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Required schema
// ---------------------------------------------------------------------------

/// Every column a WSN capture must declare, by name. Checked once at load
/// time; downstream code accesses typed fields instead of re-validating.
pub const REQUIRED_COLUMNS: [&str; 18] = [
    "Event",
    "Time",
    "S_Node",
    "Node_id",
    "Rest_Energy",
    "Trace_Level",
    "Mac_Type_Pckt",
    "Source_IP_Port",
    "Des_IP_Port",
    "Packet_Size",
    "TTL",
    "Hop_Count",
    "Broadcast_ID",
    "Dest_Node_Num",
    "Dest_Seq_Num",
    "Src_Node_ID",
    "Src_Seq_Num",
    "Class",
];

/// The subset of columns coerced to a fixed type by the loader. Everything
/// else passes through as an inferred [`FieldValue`].
pub const CORE_COLUMNS: [&str; 6] = [
    "Event",
    "Time",
    "S_Node",
    "Node_id",
    "Rest_Energy",
    "Class",
];

// ---------------------------------------------------------------------------
// FieldValue – a single passthrough cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell for the unvalidated passthrough columns
/// (Packet_Size, TTL, Mac_Type_Pckt, ...). Using `BTreeMap` / `BTreeSet`
/// downstream so `FieldValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put FieldValue in ordered collections --

impl Eq for FieldValue {}

impl PartialOrd for FieldValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use FieldValue::*;
        fn discriminant(v: &FieldValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            // Debug formatting keeps the trailing ".0" on integral floats,
            // so a re-exported cell parses back to Float, not Integer.
            FieldValue::Float(v) => write!(f, "{v:?}"),
            FieldValue::Null => Ok(()),
        }
    }
}

impl FieldValue {
    /// Infer the type of a raw CSV cell: integer, then float, else string.
    /// Empty cells become `Null`.
    pub fn infer(s: &str) -> FieldValue {
        let s = s.trim();
        if s.is_empty() {
            return FieldValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return FieldValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return FieldValue::Float(f);
        }
        FieldValue::String(s.to_string())
    }

    /// Interpret the value as an `f64` for numeric charts (packet size).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one observed network event (one CSV row)
// ---------------------------------------------------------------------------

/// A single network event. The six core fields are coerced at load time;
/// everything else lives in `fields`, unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub event: i64,
    /// Simulation clock. Not required sorted.
    pub time: f64,
    pub s_node: i64,
    pub node_id: i64,
    pub rest_energy: f64,
    /// Categorical label: "normal", "Blackhole", "Forwarding", ...open set.
    pub class: String,
    /// Passthrough columns (declared plus extras): column name → value.
    pub fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Numeric passthrough lookup, for charts keyed on e.g. "Packet_Size".
    pub fn field_f64(&self, column: &str) -> Option<f64> {
        self.fields.get(column).and_then(FieldValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// WsnDataset – the complete loaded capture
// ---------------------------------------------------------------------------

/// The full validated dataset with pre-computed indices. Immutable once
/// constructed; filtering always builds a fresh `WsnDataset`.
#[derive(Debug, Clone, PartialEq)]
pub struct WsnDataset {
    /// All records, in input order.
    pub records: Vec<Record>,
    /// Header columns in input order, kept for identical re-export layout.
    pub column_order: Vec<String>,
    /// Sorted set of distinct reporting node ids.
    pub node_ids: BTreeSet<i64>,
    /// Sorted set of distinct class labels.
    pub classes: BTreeSet<String>,
}

impl WsnDataset {
    /// Build indices from validated records.
    pub fn from_records(records: Vec<Record>, column_order: Vec<String>) -> Self {
        let mut node_ids = BTreeSet::new();
        let mut classes = BTreeSet::new();
        for rec in &records {
            node_ids.insert(rec.node_id);
            classes.insert(rec.class.clone());
        }
        WsnDataset {
            records,
            column_order,
            node_ids,
            classes,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed `(min, max)` of the `Time` column, `None` when empty.
    pub fn time_bounds(&self) -> Option<(f64, f64)> {
        let mut times = self.records.iter().map(|r| r.time);
        let first = times.next()?;
        let mut lo = first;
        let mut hi = first;
        for t in times {
            lo = lo.min(t);
            hi = hi.max(t);
        }
        Some((lo, hi))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_picks_the_narrowest_type() {
        assert_eq!(FieldValue::infer("512"), FieldValue::Integer(512));
        assert_eq!(FieldValue::infer("512.0"), FieldValue::Float(512.0));
        assert_eq!(FieldValue::infer("0.15"), FieldValue::Float(0.15));
        assert_eq!(
            FieldValue::infer("1.0.79.21"),
            FieldValue::String("1.0.79.21".into())
        );
        assert_eq!(FieldValue::infer(""), FieldValue::Null);
    }

    #[test]
    fn display_re_infers_to_the_same_value() {
        // Rendering a cell and inferring it back must not change its type:
        // integral floats keep their ".0" and stay Float.
        for value in [
            FieldValue::Integer(512),
            FieldValue::Float(512.0),
            FieldValue::Float(0.15),
            FieldValue::String("AODV".into()),
        ] {
            assert_eq!(FieldValue::infer(&value.to_string()), value);
        }
    }
}
