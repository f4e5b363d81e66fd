//! # zonemark-xlsx
//!
//! XLSX (Office Open XML) reader for zonemark.
//!
//! Reads every worksheet of a workbook into a [`zonemark_core::Sheet`]: cell
//! display text plus the normalized fill color resolved through `styles.xml`.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
