//! # zonemark-export
//!
//! Exports of detected zones: a JSON document that can be read back, a
//! per-zone CSV summary, a plain-text report and per-cell data points.

mod document;
mod error;
mod points;
mod report;
mod summary;

pub use document::{
    label_slot, ExportBounds, ExportCell, ExportDocument, ExportLabel, ExportPair,
    ExportPalette, ExportZone, PaletteEntry,
};
pub use error::{ExportError, ExportResult};
pub use points::{data_points, DataPoint};
pub use report::zone_report;
pub use summary::{write_zone_summary_csv, zone_summary_csv};
