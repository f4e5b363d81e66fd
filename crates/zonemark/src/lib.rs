//! # zonemark
//!
//! Find the data blocks of a color-coded spreadsheet and the header cells
//! that describe them.
//!
//! A spreadsheet author paints data cells with one "zone" color and row and
//! column headers with header colors. zonemark reads the fills of an XLSX
//! sheet, clusters the zone-colored cells into rectangular-ish zones and
//! attaches to every zone cell the headers found to its left and above.
//!
//! ## Features
//!
//! - Read cell text and fill colors from XLSX / XLSM files
//! - Color inventory of a sheet, with grouping of near-identical shades
//! - Zone detection with any number of header color pairs
//! - Merging of nearby zones and manual zone/label edits
//! - JSON, CSV, text report and per-cell data point exports (`export` feature)
//!
//! ## Example
//!
//! ```rust,no_run
//! use zonemark::prelude::*;
//!
//! let workbook = Workbook::open("budget.xlsx").unwrap();
//! let mut session = Session::new(workbook.into_sheet(None).unwrap());
//!
//! let palette = Palette::new(ColorKey::parse("FFC000").unwrap(), "Amounts").with_pair(
//!     ColorPair::new(ColorKey::parse("00B050").unwrap(), ColorKey::parse("0070C0").unwrap()),
//! );
//! session.configure(palette).unwrap();
//! session.detect().unwrap();
//!
//! for zone in session.zones() {
//!     println!("zone {} at {}: {} labels", zone.id, zone.bounds, zone.labels.len());
//! }
//! ```

pub mod prelude;

// Re-export core types
pub use zonemark_core::{
    are_adjacent,
    build_zones,
    column_to_letters,
    dedupe_labels,
    group_similar_colors,
    letters_to_column,
    merge_zones,
    merge_zones_until_stable,
    resolve_labels,
    Bounds,
    Cell,
    CellAddress,
    Color,
    ColorGroup,
    ColorIndex,
    ColorKey,
    ColorName,
    ColorPair,
    ColorSummary,
    ConsolidatedLabel,
    DetectionOptions,
    Direction,
    // Error types
    Error,
    GridCell,
    HeaderRole,
    Label,
    LabelGroupStats,
    LabelPosition,
    LabelResolver,
    ManualLabel,
    Palette,
    Result,
    Session,
    Sheet,
    Statistics,
    Workbook,
    Zone,
    // Constants
    MAX_COLS,
    MAX_ROWS,
};

// Re-export I/O types
pub use zonemark_xlsx::{XlsxError, XlsxReader};

#[cfg(feature = "export")]
pub use zonemark_export::{
    data_points, label_slot, write_zone_summary_csv, zone_report, zone_summary_csv, DataPoint,
    ExportDocument, ExportError,
};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file, picking the reader from the extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            // no BIFF reader; point the user at a conversion
            Some("xls") => Err(Error::UnsupportedFormat(format!(
                "{} (legacy .xls, save it as .xlsx first)",
                path.display()
            ))),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Open `path` and start a session on one of its sheets
///
/// `sheet` selects a sheet by name; the first sheet is used when it is
/// `None`.
pub fn open_session<P: AsRef<Path>>(path: P, sheet: Option<&str>) -> Result<Session> {
    let workbook = Workbook::open(path)?;
    let sheet = workbook.into_sheet(sheet)?;
    log::info!(
        "opened sheet '{}' ({} cells)",
        sheet.name(),
        sheet.cell_count()
    );
    Ok(Session::new(sheet))
}
