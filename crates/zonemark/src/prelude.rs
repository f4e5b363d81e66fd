//! Prelude module - common imports for zonemark users
//!
//! ```rust
//! use zonemark::prelude::*;
//! ```

pub use crate::{
    Bounds,
    CellAddress,
    ColorKey,
    ColorPair,
    DetectionOptions,
    Direction,
    // Error types
    Error,
    Label,
    LabelPosition,
    ManualLabel,
    Palette,
    Result,
    // Main types
    Session,
    Sheet,
    Workbook,
    // Extension traits
    WorkbookExt,
    Zone,
    // I/O types
    XlsxReader,
};

#[cfg(feature = "export")]
pub use crate::ExportDocument;
