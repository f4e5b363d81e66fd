//! Zones - 4-connected groups of zone-colored cells

use crate::address::{column_to_letters, CellAddress};
use crate::error::{Error, Result};
use crate::index::Cell;
use crate::label::Label;
use ahash::AHashMap;
use log::debug;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Inclusive rectangle of 1-based rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

impl Bounds {
    /// Create bounds, rejecting zero coordinates and inverted ranges
    pub fn new(min_row: u32, max_row: u32, min_col: u32, max_col: u32) -> Result<Self> {
        if min_row == 0 || min_col == 0 {
            return Err(Error::InvalidBounds(
                "rows and columns start at 1".to_string(),
            ));
        }
        if min_row > max_row || min_col > max_col {
            return Err(Error::InvalidBounds(format!(
                "rows {}..{} / columns {}..{} are inverted",
                min_row, max_row, min_col, max_col
            )));
        }
        Ok(Self {
            min_row,
            max_row,
            min_col,
            max_col,
        })
    }

    /// Bounds covering a single address
    pub const fn single(addr: CellAddress) -> Self {
        Self {
            min_row: addr.row,
            max_row: addr.row,
            min_col: addr.col,
            max_col: addr.col,
        }
    }

    /// Tight bounds of a set of cells, `None` when empty
    pub fn from_cells(cells: &[Cell]) -> Option<Self> {
        let (first, rest) = cells.split_first()?;
        let start = Self::single(first.address());
        Some(rest.iter().fold(start, |b, c| b.union(&Self::single(c.address()))))
    }

    /// Parse "B2:D5" (or a single "B2"); corners may be given in any order
    pub fn parse(s: &str) -> Result<Self> {
        let (a, b) = match s.split_once(':') {
            Some((a, b)) => (CellAddress::parse(a)?, CellAddress::parse(b)?),
            None => {
                let a = CellAddress::parse(s)?;
                (a, a)
            }
        };
        Ok(Self::single(a).union(&Self::single(b)))
    }

    /// Smallest bounds containing both
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_col: self.min_col.min(other.min_col),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// Number of rows spanned
    pub fn height(&self) -> u32 {
        self.max_row.saturating_sub(self.min_row) + 1
    }

    /// Number of columns spanned
    pub fn width(&self) -> u32 {
        self.max_col.saturating_sub(self.min_col) + 1
    }

    /// Number of grid positions covered
    pub fn area(&self) -> usize {
        self.height() as usize * self.width() as usize
    }

    /// Check whether an address lies inside
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }

    /// Top-left corner
    pub fn top_left(&self) -> CellAddress {
        CellAddress::new(self.min_row, self.min_col)
    }

    /// Bottom-right corner
    pub fn bottom_right(&self) -> CellAddress {
        CellAddress::new(self.max_row, self.max_col)
    }

    pub fn min_col_letter(&self) -> String {
        column_to_letters(self.min_col)
    }

    pub fn max_col_letter(&self) -> String {
        column_to_letters(self.max_col)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.top_left(), self.bottom_right())
    }
}

impl FromStr for Bounds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A data zone and the header labels attached to it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    /// Positive id, unique within a session
    pub id: u32,
    /// Member cells, row-major; empty for manual zones
    pub cells: Vec<Cell>,
    pub bounds: Bounds,
    /// Cell count for detected zones, bounds area for manual or resized ones
    pub cell_count: usize,
    pub labels: Vec<Label>,
}

impl Zone {
    /// Zone made of the given cells; `None` when `cells` is empty
    pub fn from_cells(id: u32, cells: Vec<Cell>) -> Option<Self> {
        let bounds = Bounds::from_cells(&cells)?;
        Some(Self {
            id,
            cell_count: cells.len(),
            cells,
            bounds,
            labels: Vec::new(),
        })
    }

    /// Zone drawn by hand: no member cells, count is the bounds area
    pub fn manual(id: u32, bounds: Bounds) -> Self {
        Self {
            id,
            cells: Vec::new(),
            bounds,
            cell_count: bounds.area(),
            labels: Vec::new(),
        }
    }

    /// Replace the bounds; the count becomes the new area and cells are kept
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.cell_count = bounds.area();
    }

    /// Member cell at `row`, `col`
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    /// Check whether this zone has no member cells (manual zones)
    pub fn is_manual(&self) -> bool {
        self.cells.is_empty()
    }
}

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Partition cells into maximal 4-connected zones
///
/// Zones are numbered from 1 in the order their first cell appears in
/// `cells`. Each zone's cells are sorted row-major.
pub fn build_zones(cells: &[Cell]) -> Vec<Zone> {
    let position: AHashMap<(u32, u32), usize> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.row, c.col), i))
        .collect();

    let mut visited = vec![false; cells.len()];
    let mut zones = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..cells.len() {
        if visited[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);
        let mut members = Vec::new();

        while let Some(i) = queue.pop_front() {
            let cell = &cells[i];
            members.push(cell.clone());

            for (dr, dc) in NEIGHBOURS {
                let row = cell.row as i64 + dr;
                let col = cell.col as i64 + dc;
                if row < 1 || col < 1 {
                    continue;
                }
                if let Some(&j) = position.get(&(row as u32, col as u32)) {
                    if !visited[j] {
                        visited[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }

        members.sort_by_key(|c| (c.row, c.col));
        let id = zones.len() as u32 + 1;
        if let Some(zone) = Zone::from_cells(id, members) {
            zones.push(zone);
        }
    }

    debug!("built {} zones from {} cells", zones.len(), cells.len());
    zones
}
