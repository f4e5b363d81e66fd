//! Plain-text detection report

use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::document::label_slot;
use zonemark_core::{dedupe_labels, Palette, Zone};

/// Human-readable report of a palette and the zones found with it
pub fn zone_report(zones: &[Zone], palette: &Palette, generated_at: NaiveDateTime) -> String {
    let pair_count = palette.pairs.len();
    let mut out = String::new();

    // writing to a String cannot fail
    let _ = writeln!(out, "ZONE DETECTION REPORT");
    let _ = writeln!(out, "=====================");
    let _ = writeln!(out);
    let _ = writeln!(out, "Date: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out);
    let _ = writeln!(out, "COLOR PALETTE");
    let _ = writeln!(out, "-------------");
    let _ = writeln!(out, "- Data zones: {} (#{})", palette.zone_name, palette.zone_color);
    for (i, pair) in palette.pairs.iter().enumerate() {
        let _ = writeln!(
            out,
            "- Pair {}: {} (#{}) / {} (#{})",
            i + 1,
            pair.row_header_name,
            pair.row_header_color,
            pair.col_header_name,
            pair.col_header_color
        );
    }

    let total_cells: usize = zones.iter().map(|z| z.cell_count).sum();
    let consolidated: Vec<_> = zones.iter().map(|z| dedupe_labels(&z.labels)).collect();
    let total_labels: usize = consolidated.iter().map(Vec::len).sum();

    let _ = writeln!(out);
    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "-------");
    let _ = writeln!(out, "Total zones: {}", zones.len());
    let _ = writeln!(out, "Total cells: {}", total_cells);
    let _ = writeln!(out, "Total labels: {}", total_labels);
    let _ = writeln!(out);
    let _ = writeln!(out, "ZONES");
    let _ = writeln!(out, "-----");

    for (zone, labels) in zones.iter().zip(&consolidated) {
        let b = &zone.bounds;
        let _ = writeln!(out);
        let _ = writeln!(out, "Zone {}:", zone.id);
        let _ = writeln!(
            out,
            "  Position: rows {}-{}, columns {}-{} ({})",
            b.min_row,
            b.max_row,
            b.min_col_letter(),
            b.max_col_letter(),
            b
        );
        let _ = writeln!(out, "  Cells: {}", zone.cell_count);

        if labels.is_empty() {
            let _ = writeln!(out, "  Labels: none");
            continue;
        }

        let _ = writeln!(out, "  Labels ({}):", labels.len());
        for label in labels {
            let _ = writeln!(
                out,
                "    - {} ({}, {}, distance {})",
                label.value,
                label_slot(label.pair_id, label.direction, pair_count),
                label.address(),
                label.distance
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use zonemark_core::{Bounds, ColorKey, ColorPair};

    #[test]
    fn test_report_sections() {
        let palette = Palette::new(ColorKey::new(255, 0, 0), "Values")
            .with_pair(ColorPair::new(ColorKey::new(0, 255, 0), ColorKey::new(0, 0, 255)));
        let zones = vec![Zone::manual(1, Bounds::parse("C3:D4").unwrap())];
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();

        let report = zone_report(&zones, &palette, at);
        assert!(report.contains("Date: 2024-03-01 09:30:00"));
        assert!(report.contains("- Data zones: Values (#FF0000)"));
        assert!(report.contains("- Pair 1: Row header (#00FF00) / Column header (#0000FF)"));
        assert!(report.contains("Total cells: 4"));
        assert!(report.contains("Position: rows 3-4, columns C-D (C3:D4)"));
        assert!(report.contains("Labels: none"));
    }
}
