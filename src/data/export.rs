use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::{Record, WsnDataset};

// ---------------------------------------------------------------------------
// CSV re-export of a (usually filtered) view
// ---------------------------------------------------------------------------

/// Write a dataset as CSV with the exact column layout of the original
/// input, so a filtered export re-loads cleanly through the loader.
pub fn write_csv<W: Write>(dataset: &WsnDataset, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&dataset.column_order)
        .context("writing CSV header")?;

    for (row_no, rec) in dataset.records.iter().enumerate() {
        let cells: Vec<String> = dataset
            .column_order
            .iter()
            .map(|col| cell_text(rec, col))
            .collect();
        wtr.write_record(&cells)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export to a file path (the save-dialog path in the UI).
pub fn export_path(dataset: &WsnDataset, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(dataset, file)
}

/// Render one cell, shared by the CSV writer and the preview table. Core
/// fields come from the typed struct; everything else from the passthrough
/// map. Unknown columns (possible only on a dataset built outside the
/// loader) render empty.
pub fn cell_text(rec: &Record, column: &str) -> String {
    match column {
        "Event" => rec.event.to_string(),
        "Time" => rec.time.to_string(),
        "S_Node" => rec.s_node.to_string(),
        "Node_id" => rec.node_id.to_string(),
        "Rest_Energy" => rec.rest_energy.to_string(),
        "Class" => rec.class.clone(),
        other => rec
            .fields
            .get(other)
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, FilterPredicate};
    use crate::data::loader::load_reader;
    use crate::data::model::FieldValue;
    use std::collections::BTreeSet;

    const HEADER: &str = "Event,Time,S_Node,Node_id,Rest_Energy,Trace_Level,\
         Mac_Type_Pckt,Source_IP_Port,Des_IP_Port,Packet_Size,TTL,Hop_Count,\
         Broadcast_ID,Dest_Node_Num,Dest_Seq_Num,Src_Node_ID,Src_Seq_Num,Class";

    fn sample_csv() -> String {
        format!(
            "{HEADER}\n\
             1,0.1,79,79,600,5,AODV,1.0.79.21,1.0.1.21,512,30,2,7,1,4,79,2,normal\n\
             2,0.15,78,78,599.97,5,AODV,1.0.78.21,1.0.1.21,512,30,2,7,1,4,78,2,Blackhole\n"
        )
    }

    #[test]
    fn export_keeps_input_column_layout() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let first_line = text.lines().next().unwrap();
        assert_eq!(first_line, HEADER);
    }

    #[test]
    fn round_trip_preserves_content() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let reloaded = load_reader(buf.as_slice()).unwrap();
        assert_eq!(reloaded, ds);
    }

    #[test]
    fn filtered_export_round_trips() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        let pred = FilterPredicate {
            classes: BTreeSet::from(["Blackhole".to_string()]),
            ..Default::default()
        };
        let view = apply_filter(&ds, &pred);

        let mut buf = Vec::new();
        write_csv(&view, &mut buf).unwrap();
        let reloaded = load_reader(buf.as_slice()).unwrap();
        assert_eq!(reloaded, view);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.records[0].node_id, 78);
    }

    #[test]
    fn integral_float_passthrough_cells_survive_round_trip() {
        // "512.0" must stay Float through export and re-load; losing the
        // decimal marker would re-infer it as Integer.
        let csv = sample_csv().replace(",512,", ",512.0,");
        let ds = load_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            ds.records[0].fields.get("Packet_Size"),
            Some(&FieldValue::Float(512.0))
        );

        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let reloaded = load_reader(buf.as_slice()).unwrap();
        assert_eq!(
            reloaded.records[0].fields.get("Packet_Size"),
            Some(&FieldValue::Float(512.0))
        );
        assert_eq!(reloaded, ds);
    }

    #[test]
    fn cell_text_covers_every_declared_column() {
        let ds = load_reader(sample_csv().as_bytes()).unwrap();
        let rec = &ds.records[0];
        for col in &ds.column_order {
            assert!(!cell_text(rec, col).is_empty(), "empty cell for {col}");
        }
        assert_eq!(cell_text(rec, "Event"), "1");
        assert_eq!(cell_text(rec, "Class"), "normal");
        assert_eq!(cell_text(rec, "Mac_Type_Pckt"), "AODV");
    }

    #[test]
    fn empty_dataset_exports_header_only() {
        let ds = load_reader(format!("{HEADER}\n").as_bytes()).unwrap();
        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
