use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::model::{FieldValue, Record, WsnDataset, CORE_COLUMNS, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading a capture. Each kind carries
/// a distinct, actionable message; the UI surfaces it and lets the user
/// pick another source. Loading is one-shot, never retried automatically.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing or stream unreadable.
    #[error("unable to read source: {0}")]
    Unreadable(#[source] std::io::Error),

    /// Bytes were readable but not decodable as CSV.
    #[error("malformed CSV: {0}")]
    Malformed(#[source] csv::Error),

    /// One or more of the 18 required columns is absent from the header.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A core column held text incompatible with its declared type.
    /// Never silently defaulted. `line` is the 1-based file line, counting
    /// the header, so the message points at what the user sees.
    #[error("line {line}: column '{column}' value '{value}' is not {expected}")]
    Coercion {
        line: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a WSN capture from a CSV file on disk.
pub fn load_path(path: &Path) -> Result<WsnDataset, LoadError> {
    let file = File::open(path).map_err(LoadError::Unreadable)?;
    load_reader(file)
}

/// Load a WSN capture from any CSV byte stream (uploaded buffer, test
/// fixture, ...). The first row names the columns; order is free, presence
/// is not. Row order of the result is identical to input order.
pub fn load_reader<R: Read>(reader: R) -> Result<WsnDataset, LoadError> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(LoadError::Malformed)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Schema check: set difference against the required names, reported
    // all at once so the user can fix the file in one pass.
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::MissingColumns(missing));
    }

    let event_idx = column_index(&headers, "Event")?;
    let time_idx = column_index(&headers, "Time")?;
    let s_node_idx = column_index(&headers, "S_Node")?;
    let node_id_idx = column_index(&headers, "Node_id")?;
    let energy_idx = column_index(&headers, "Rest_Energy")?;
    let class_idx = column_index(&headers, "Class")?;

    let mut records = Vec::new();

    for (row_no, result) in rdr.records().enumerate() {
        let row = result.map_err(LoadError::Malformed)?;
        // Header is file line 1, first data row is line 2.
        let line = row_no + 2;

        let event = parse_int(row.get(event_idx).unwrap_or(""), "Event", line)?;
        let time = parse_float(row.get(time_idx).unwrap_or(""), "Time", line)?;
        let s_node = parse_int(row.get(s_node_idx).unwrap_or(""), "S_Node", line)?;
        let node_id = parse_int(row.get(node_id_idx).unwrap_or(""), "Node_id", line)?;
        let rest_energy = parse_float(row.get(energy_idx).unwrap_or(""), "Rest_Energy", line)?;
        let class = row.get(class_idx).unwrap_or("").trim().to_string();

        let mut fields = BTreeMap::new();
        for (col_idx, value) in row.iter().enumerate() {
            let Some(name) = headers.get(col_idx) else {
                continue;
            };
            if CORE_COLUMNS.contains(&name.as_str()) {
                continue;
            }
            fields.insert(name.clone(), FieldValue::infer(value));
        }

        records.push(Record {
            event,
            time,
            s_node,
            node_id,
            rest_energy,
            class,
            fields,
        });
    }

    Ok(WsnDataset::from_records(records, headers))
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

fn column_index(headers: &[String], name: &'static str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoadError::MissingColumns(vec![name.to_string()]))
}

/// Integer coercion. Integral floats ("3.0") are accepted and truncated,
/// matching how the capture tooling writes whole numbers.
fn parse_int(s: &str, column: &'static str, line: usize) -> Result<i64, LoadError> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Ok(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return Ok(f.trunc() as i64);
        }
    }
    Err(LoadError::Coercion {
        line,
        column,
        value: s.to_string(),
        expected: "an integer",
    })
}

fn parse_float(s: &str, column: &'static str, line: usize) -> Result<f64, LoadError> {
    let s = s.trim();
    s.parse::<f64>().map_err(|_| LoadError::Coercion {
        line,
        column,
        value: s.to_string(),
        expected: "a number",
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Event,Time,S_Node,Node_id,Rest_Energy,Trace_Level,\
         Mac_Type_Pckt,Source_IP_Port,Des_IP_Port,Packet_Size,TTL,Hop_Count,\
         Broadcast_ID,Dest_Node_Num,Dest_Seq_Num,Src_Node_ID,Src_Seq_Num,Class";

    fn row(event: i64, time: f64, node_id: i64, energy: f64, class: &str) -> String {
        format!(
            "{event},{time},{node_id},{node_id},{energy},5,AODV,1.0.{node_id}.21,1.0.1.21,512,30,2,7,1,4,{node_id},2,{class}"
        )
    }

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n{}\n{}\n{}\n",
            row(1, 0.10, 79, 600.0, "normal"),
            row(2, 0.15, 78, 599.97, "Blackhole"),
            row(3, 0.21, 79, 599.80, "normal"),
        )
    }

    #[test]
    fn load_counts_rows_and_preserves_order() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.records[0].node_id, 79);
        assert_eq!(ds.records[1].node_id, 78);
        assert_eq!(ds.records[1].class, "Blackhole");
        assert_eq!(ds.records[2].event, 3);
        assert_eq!(ds.column_order.len(), 18);
    }

    #[test]
    fn passthrough_columns_are_type_inferred() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.fields.get("TTL"), Some(&FieldValue::Integer(30)));
        assert_eq!(
            rec.fields.get("Mac_Type_Pckt"),
            Some(&FieldValue::String("AODV".into()))
        );
        assert_eq!(rec.field_f64("Packet_Size"), Some(512.0));
    }

    #[test]
    fn missing_columns_named_exactly() {
        let csv = "Event,Time,S_Node\n1,0.1,79\n";
        match load_reader(csv.as_bytes()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols.len(), 15);
                assert!(cols.contains(&"Node_id".to_string()));
                assert!(cols.contains(&"Class".to_string()));
                assert!(!cols.contains(&"Time".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn header_order_is_free() {
        // Same columns, reversed order.
        let header: Vec<&str> = HEADER.split(',').map(str::trim).rev().collect();
        let values = [
            "normal", "2", "79", "4", "1", "7", "2", "30", "512", "1.0.1.21",
            "1.0.79.21", "AODV", "5", "600.0", "79", "79", "0.1", "1",
        ];
        let csv = format!("{}\n{}\n", header.join(","), values.join(","));
        let ds = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].node_id, 79);
        assert_eq!(ds.records[0].class, "normal");
        assert!((ds.records[0].time - 0.1).abs() < 1e-12);
    }

    #[test]
    fn coercion_failure_names_the_column_and_file_line() {
        let bad = sample_csv().replace("599.97", "drained");
        let err = load_reader(bad.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
        match err {
            LoadError::Coercion { column, line, value, .. } => {
                assert_eq!(column, "Rest_Energy");
                // Second data row = third file line, counting the header.
                assert_eq!(line, 3);
                assert_eq!(value, "drained");
            }
            other => panic!("expected Coercion, got {other:?}"),
        }
    }

    #[test]
    fn integral_floats_coerce_to_int_columns() {
        let csv = sample_csv().replace("2,0.15", "2.0,0.15");
        let ds = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[1].event, 2);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load_path(Path::new("/nonexistent/capture.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Unreadable(_)));
    }

    #[test]
    fn empty_body_is_a_valid_empty_dataset() {
        let csv = format!("{HEADER}\n");
        let ds = load_reader(csv.as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.time_bounds(), None);
    }
}
