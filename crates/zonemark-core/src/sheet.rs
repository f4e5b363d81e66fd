//! Raw grid read from a spreadsheet file

use crate::address::CellAddress;
use crate::color::ColorKey;
use crate::error::{Error, Result};
use crate::zone::Bounds;
use std::collections::BTreeMap;

/// Content and normalized fill color of one grid position
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridCell {
    /// Display text (empty for blank cells)
    pub value: String,
    /// Fill color, `None` when unfilled or unresolvable
    pub color: Option<ColorKey>,
}

/// A single worksheet grid
///
/// Cells are stored sparsely, keyed by 1-based `(row, col)`, so iteration is
/// row-major.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(u32, u32), GridCell>,
    merges: Vec<Bounds>,
    max_row: u32,
    max_col: u32,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set (or replace) the cell at `row`, `col`
    pub fn set_cell<S: Into<String>>(&mut self, row: u32, col: u32, value: S, color: Option<ColorKey>) {
        self.max_row = self.max_row.max(row);
        self.max_col = self.max_col.max(col);
        self.cells.insert(
            (row, col),
            GridCell {
                value: value.into(),
                color,
            },
        );
    }

    /// Set a cell by A1 address
    pub fn set_cell_a1<S: Into<String>>(&mut self, address: &str, value: S, color: Option<ColorKey>) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell(addr.row, addr.col, value, color);
        Ok(())
    }

    /// Get the cell at `row`, `col`
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&GridCell> {
        self.cells.get(&(row, col))
    }

    /// Iterate over stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellAddress, &GridCell)> {
        self.cells
            .iter()
            .map(|(&(row, col), cell)| (CellAddress::new(row, col), cell))
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check if the sheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Record a merged range
    pub fn add_merge(&mut self, range: Bounds) {
        self.merges.push(range);
    }

    /// Merged ranges in the order they were recorded
    pub fn merges(&self) -> &[Bounds] {
        &self.merges
    }

    /// Merged range covering `row`, `col`, if any
    pub fn merge_at(&self, row: u32, col: u32) -> Option<&Bounds> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    /// Largest row and column holding a cell, `(0, 0)` when empty
    pub fn dimensions(&self) -> (u32, u32) {
        (self.max_row, self.max_col)
    }
}

/// Sheets read from one file, in workbook order
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Check if the workbook has no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Get a sheet by index
    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Get a sheet by name
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name()).collect()
    }

    /// Iterate over all sheets
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Take one sheet out of the workbook, the first one when `name` is `None`
    pub fn into_sheet(self, name: Option<&str>) -> Result<Sheet> {
        match name {
            Some(name) => self
                .sheets
                .into_iter()
                .find(|s| s.name() == name)
                .ok_or_else(|| Error::SheetNotFound(name.to_string())),
            None => self
                .sheets
                .into_iter()
                .next()
                .ok_or_else(|| Error::SheetNotFound("<first sheet>".to_string())),
        }
    }
}

impl FromIterator<Sheet> for Workbook {
    fn from_iter<I: IntoIterator<Item = Sheet>>(iter: I) -> Self {
        Self {
            sheets: iter.into_iter().collect(),
        }
    }
}
