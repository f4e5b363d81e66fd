//! Text rendering for the CLI commands

use std::fmt::Write;

use anyhow::{Context, Result};
use zonemark::{
    data_points, zone_report, zone_summary_csv, ColorGroup, ColorSummary, DataPoint,
    ExportDocument, Session,
};

use crate::OutputFormat;

/// Rendered detection result in the requested format
pub fn render(session: &Session, format: OutputFormat) -> Result<String> {
    let pair_count = session.palette().map_or(0, |p| p.pairs.len());

    match format {
        OutputFormat::Json => {
            let mut json = ExportDocument::from_session(session)
                .to_json_string()
                .context("Failed to serialize zones")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => {
            zone_summary_csv(session.zones(), pair_count).context("Failed to write CSV")
        }
        OutputFormat::Report => {
            let now = chrono::Local::now().naive_local();
            let report = match session.palette() {
                Some(palette) => zone_report(session.zones(), palette, now),
                None => String::new(),
            };
            Ok(report)
        }
        OutputFormat::Points => {
            let points: Vec<DataPoint> = session.zones().iter().flat_map(data_points).collect();
            let mut json =
                serde_json::to_string_pretty(&points).context("Failed to serialize data points")?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn examples(addresses: &[zonemark::CellAddress]) -> String {
    addresses
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per color: hex, name, count, merged count and examples
pub fn color_table(summary: &[ColorSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<12} {:>7} {:>7}  {}",
        "Color", "Name", "Cells", "Merged", "Examples"
    );
    for entry in summary {
        let _ = writeln!(
            out,
            "{:<8} {:<12} {:>7} {:>7}  {}",
            format!("#{}", entry.color),
            entry.name.as_str(),
            entry.count,
            entry.merged_count,
            examples(&entry.examples)
        );
    }
    out
}

/// One line per group of similar colors
pub fn color_group_table(groups: &[ColorGroup]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:<12} {:>7}  {:<30} {}",
        "Color", "Name", "Cells", "Variations", "Examples"
    );
    for group in groups {
        let variations = group
            .variations
            .iter()
            .map(|c| format!("#{}", c))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "{:<8} {:<12} {:>7}  {:<30} {}",
            format!("#{}", group.color),
            group.name.as_str(),
            group.count,
            variations,
            examples(&group.examples)
        );
    }
    out
}
