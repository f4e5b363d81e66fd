//! Errors raised while reading a workbook

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The archive is not a spreadsheet package
    #[error("Not an XLSX workbook: {0}")]
    InvalidFormat(String),

    /// A part the workbook or its relationships point at is absent
    #[error("Missing part '{0}'")]
    MissingPart(String),

    /// `s` attribute of a cell beyond the stylesheet's `cellXfs`
    #[error("Cell format {index} not defined ({available} in stylesheet)")]
    StyleIndex { index: u32, available: usize },

    /// `t="s"` cell pointing past the shared string table
    #[error("Shared string {0} not defined")]
    SharedString(usize),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] zonemark_core::Error),
}
