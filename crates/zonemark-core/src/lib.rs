//! # zonemark-core
//!
//! Color-zone detection and header label resolution for spreadsheet grids.
//!
//! Cells painted with a "zone" color are clustered into 4-connected [`Zone`]s.
//! Cells painted with header colors become [`Label`]s of the zones they face,
//! found by walking left along each zone cell's row and up along its column.
//!
//! This crate provides:
//! - [`Sheet`] / [`Workbook`] - the colored grid read from a file
//! - [`ColorIndex`] - cells grouped by normalized [`ColorKey`]
//! - [`Palette`] - zone color plus one or more header [`ColorPair`]s
//! - [`build_zones`], [`LabelResolver`], [`merge_zones`] - the detection steps
//! - [`Session`] - sequencing of detection and manual edits
//!
//! ## Example
//!
//! ```rust
//! use zonemark_core::{ColorKey, ColorPair, Palette, Session, Sheet};
//!
//! let red = ColorKey::new(255, 0, 0);
//! let green = ColorKey::new(0, 255, 0);
//! let blue = ColorKey::new(0, 0, 255);
//!
//! let mut sheet = Sheet::new("Data");
//! sheet.set_cell(1, 2, "Q1", Some(blue));
//! sheet.set_cell(2, 1, "Sales", Some(green));
//! sheet.set_cell(2, 2, "42", Some(red));
//!
//! let mut session = Session::new(sheet);
//! session
//!     .configure(Palette::new(red, "data").with_pair(ColorPair::new(green, blue)))
//!     .unwrap();
//! assert_eq!(session.detect().unwrap(), 1);
//! assert_eq!(session.zones()[0].labels.len(), 2);
//! ```

pub mod address;
pub mod color;
pub mod error;
pub mod index;
pub mod label;
pub mod merge;
pub mod palette;
pub mod session;
pub mod sheet;
pub mod stats;
pub mod zone;

// Re-exports for convenience
pub use address::{column_to_letters, letters_to_column, CellAddress};
pub use color::{Color, ColorKey, ColorName};
pub use error::{Error, Result};
pub use index::{group_similar_colors, Cell, ColorGroup, ColorIndex, ColorSummary};
pub use label::{dedupe_labels, resolve_labels, ConsolidatedLabel, Direction, Label, LabelResolver};
pub use merge::{are_adjacent, merge_zones, merge_zones_until_stable};
pub use palette::{ColorPair, HeaderRole, Palette};
pub use session::{DetectionOptions, LabelPosition, ManualLabel, Session};
pub use sheet::{GridCell, Sheet, Workbook};
pub use stats::{LabelGroupStats, Statistics};
pub use zone::{build_zones, Bounds, Zone};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
