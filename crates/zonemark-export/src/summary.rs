//! Per-zone CSV summary

use std::io::Write;

use crate::document::label_slot;
use crate::error::ExportResult;
use zonemark_core::{dedupe_labels, Zone};

const HEADER: [&str; 8] = [
    "Zone ID",
    "Min Row",
    "Max Row",
    "Min Col",
    "Max Col",
    "Cell Count",
    "Label Count",
    "Label Values",
];

/// Write one summary row per zone
///
/// Columns are written as letters. Labels are counted and listed after
/// consolidation, each as `value (slot)`, joined by `; `.
pub fn write_zone_summary_csv<W: Write>(
    zones: &[Zone],
    pair_count: usize,
    writer: W,
) -> ExportResult<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(HEADER)?;

    for zone in zones {
        let labels = dedupe_labels(&zone.labels);
        let label_values = labels
            .iter()
            .map(|l| {
                format!(
                    "{} ({})",
                    l.value,
                    label_slot(l.pair_id, l.direction, pair_count)
                )
            })
            .collect::<Vec<_>>()
            .join("; ");

        csv_writer.write_record(&[
            zone.id.to_string(),
            zone.bounds.min_row.to_string(),
            zone.bounds.max_row.to_string(),
            zone.bounds.min_col_letter(),
            zone.bounds.max_col_letter(),
            zone.cell_count.to_string(),
            labels.len().to_string(),
            label_values,
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// [`write_zone_summary_csv`] into a string
pub fn zone_summary_csv(zones: &[Zone], pair_count: usize) -> ExportResult<String> {
    let mut buf = Vec::new();
    write_zone_summary_csv(zones, pair_count, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use zonemark_core::{Bounds, ColorKey, Direction, Label};

    #[test]
    fn test_summary_rows() {
        let mut zone = Zone::manual(3, Bounds::parse("B2:AA4").unwrap());
        let label = Label {
            row: 1,
            col: 2,
            value: "Total, net".to_string(),
            color: ColorKey::new(0, 0, 255),
            pair_id: 0,
            direction: Direction::ColHeader,
            distance: 1,
            for_cell: None,
        };
        zone.labels.push(label.clone());
        zone.labels.push(label);

        let csv = zone_summary_csv(&[zone], 1).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Zone ID,Min Row,Max Row,Min Col,Max Col,Cell Count,Label Count,Label Values",
                "3,2,4,B,AA,78,1,\"Total, net (v1)\"",
            ]
        );
    }
}
