//! Color index - colored cells of a sheet grouped by color
//!
//! The index is built in one row-major pass over a [`Sheet`]. Unfilled cells
//! and near-white fills are left out, so every [`Cell`] in the index carries a
//! meaningful color.

use crate::address::CellAddress;
use crate::color::{ColorKey, ColorName};
use crate::sheet::Sheet;
use ahash::AHashMap;
use log::debug;

/// Number of example addresses kept per summary entry
const SUMMARY_EXAMPLES: usize = 5;

/// Examples carried over from each color folded into a group
const GROUP_EXTRA_EXAMPLES: usize = 2;

/// A colored grid position
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// Row number (1-based)
    pub row: u32,
    /// Column number (1-based)
    pub col: u32,
    /// Display text
    pub value: String,
    /// Normalized fill color
    pub color: ColorKey,
}

impl Cell {
    pub fn new<S: Into<String>>(row: u32, col: u32, value: S, color: ColorKey) -> Self {
        Self {
            row,
            col,
            value: value.into(),
            color,
        }
    }

    /// Address of this cell
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

/// Colored cells of one sheet, grouped by color key
///
/// Groups are kept in the order their color was first seen, and cells inside
/// a group keep row-major scan order.
#[derive(Debug, Clone, Default)]
pub struct ColorIndex {
    groups: Vec<(ColorKey, Vec<Cell>)>,
    lookup: AHashMap<ColorKey, usize>,
}

impl ColorIndex {
    /// Scan a sheet and group its colored cells
    pub fn build(sheet: &Sheet) -> Self {
        let mut index = Self::default();
        let mut skipped_white = 0usize;

        for (addr, grid_cell) in sheet.iter_cells() {
            let Some(color) = grid_cell.color else {
                continue;
            };
            if color.is_near_white() {
                skipped_white += 1;
                continue;
            }
            index.push(Cell::new(addr.row, addr.col, grid_cell.value.clone(), color));
        }

        debug!(
            "color index for '{}': {} cells scanned, {} colored in {} colors, {} near-white skipped",
            sheet.name(),
            sheet.cell_count(),
            index.total_cells(),
            index.color_count(),
            skipped_white
        );

        index
    }

    fn push(&mut self, cell: Cell) {
        match self.lookup.get(&cell.color) {
            Some(&i) => self.groups[i].1.push(cell),
            None => {
                self.lookup.insert(cell.color, self.groups.len());
                self.groups.push((cell.color, vec![cell]));
            }
        }
    }

    /// Cells with the given color, empty if the color is absent
    pub fn cells(&self, color: &ColorKey) -> &[Cell] {
        self.lookup
            .get(color)
            .map(|&i| self.groups[i].1.as_slice())
            .unwrap_or(&[])
    }

    /// Check whether any cell has the given color
    pub fn contains(&self, color: &ColorKey) -> bool {
        self.lookup.contains_key(color)
    }

    /// Colors present, in first-seen order
    pub fn colors(&self) -> impl Iterator<Item = &ColorKey> {
        self.groups.iter().map(|(color, _)| color)
    }

    /// Number of distinct colors
    pub fn color_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of colored cells
    pub fn total_cells(&self) -> usize {
        self.groups.iter().map(|(_, cells)| cells.len()).sum()
    }

    /// Check if no colored cell was found
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Per-color diagnostic summary, most frequent color first
    ///
    /// `sheet` is the sheet the index was built from; it supplies merged
    /// ranges so merged cells can be counted.
    pub fn summary(&self, sheet: &Sheet) -> Vec<ColorSummary> {
        let mut summary: Vec<ColorSummary> = self
            .groups
            .iter()
            .map(|(color, cells)| ColorSummary {
                color: *color,
                name: color.name(),
                count: cells.len(),
                merged_count: cells
                    .iter()
                    .filter(|c| sheet.merge_at(c.row, c.col).is_some())
                    .count(),
                examples: cells
                    .iter()
                    .take(SUMMARY_EXAMPLES)
                    .map(Cell::address)
                    .collect(),
            })
            .collect();

        // stable: ties stay in first-seen order
        summary.sort_by(|a, b| b.count.cmp(&a.count));
        summary
    }
}

/// One line of [`ColorIndex::summary`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSummary {
    pub color: ColorKey,
    pub name: ColorName,
    pub count: usize,
    /// Cells of this color lying in a merged range
    pub merged_count: usize,
    /// Up to five addresses using the color
    pub examples: Vec<CellAddress>,
}

/// Summary entries folded together by [`group_similar_colors`]
#[derive(Debug, Clone, PartialEq)]
pub struct ColorGroup {
    /// Representative color (the earliest entry of the group)
    pub color: ColorKey,
    pub name: ColorName,
    /// Total count over all variations
    pub count: usize,
    pub examples: Vec<CellAddress>,
    /// Every color in the group, representative first
    pub variations: Vec<ColorKey>,
}

/// Fold near-identical colors of a summary into groups
///
/// Each entry absorbs every later, not yet grouped entry whose HSV components
/// all differ from it by less than `tolerance`.
pub fn group_similar_colors(summary: &[ColorSummary], tolerance: f64) -> Vec<ColorGroup> {
    let mut used = vec![false; summary.len()];
    let mut groups = Vec::new();

    for (i, entry) in summary.iter().enumerate() {
        if used[i] {
            continue;
        }

        let mut group = ColorGroup {
            color: entry.color,
            name: entry.name,
            count: entry.count,
            examples: entry.examples.clone(),
            variations: vec![entry.color],
        };

        for (j, other) in summary.iter().enumerate().skip(i + 1) {
            if !used[j] && entry.color.is_similar(&other.color, tolerance) {
                group.count += other.count;
                group
                    .examples
                    .extend(other.examples.iter().take(GROUP_EXTRA_EXAMPLES).copied());
                group.variations.push(other.color);
                used[j] = true;
            }
        }

        groups.push(group);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const RED: ColorKey = ColorKey::new(255, 0, 0);
    const BLUE: ColorKey = ColorKey::new(0, 0, 255);

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "a", Some(RED));
        sheet.set_cell(1, 2, "b", Some(BLUE));
        sheet.set_cell(2, 1, "c", Some(RED));
        sheet.set_cell(2, 2, "white", Some(ColorKey::new(255, 255, 255)));
        sheet.set_cell(2, 3, "offwhite", Some(ColorKey::new(252, 251, 254)));
        sheet.set_cell(3, 1, "plain", None);
        sheet.set_cell(3, 2, "d", Some(BLUE));
        sheet.set_cell(3, 3, "e", Some(BLUE));
        sheet
    }

    #[test]
    fn test_build_groups_and_filters() {
        let index = ColorIndex::build(&sample_sheet());

        assert_eq!(index.color_count(), 2);
        assert_eq!(index.total_cells(), 5);
        let colors: Vec<_> = index.colors().copied().collect();
        assert_eq!(colors, vec![RED, BLUE]);

        let reds: Vec<_> = index.cells(&RED).iter().map(|c| c.value.as_str()).collect();
        assert_eq!(reds, vec!["a", "c"]);
        assert!(index.cells(&ColorKey::new(1, 1, 1)).is_empty());
    }

    #[test]
    fn test_summary_ordering() {
        let summary = {
            let sheet = sample_sheet();
            ColorIndex::build(&sheet).summary(&sheet)
        };

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].color, BLUE);
        assert_eq!(summary[0].count, 3);
        assert_eq!(summary[0].name, ColorName::Blue);
        assert_eq!(
            summary[0].examples,
            vec![
                CellAddress::new(1, 2),
                CellAddress::new(3, 2),
                CellAddress::new(3, 3)
            ]
        );
        assert_eq!(summary[1].color, RED);
    }

    #[test]
    fn test_summary_examples_capped() {
        let mut sheet = Sheet::new("S");
        for col in 1..=8 {
            sheet.set_cell(1, col, "", Some(RED));
        }
        sheet.add_merge(crate::zone::Bounds::parse("A1:B1").unwrap());
        let summary = ColorIndex::build(&sheet).summary(&sheet);
        assert_eq!(summary[0].count, 8);
        assert_eq!(summary[0].merged_count, 2);
        assert_eq!(summary[0].examples.len(), 5);
    }

    #[test]
    fn test_group_similar_colors() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "", Some(RED));
        sheet.set_cell(1, 2, "", Some(RED));
        sheet.set_cell(2, 1, "", Some(ColorKey::new(250, 5, 5)));
        sheet.set_cell(3, 1, "", Some(BLUE));

        let summary = ColorIndex::build(&sheet).summary(&sheet);
        let groups = group_similar_colors(&summary, 0.1);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].color, RED);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].variations, vec![RED, ColorKey::new(250, 5, 5)]);
        assert_eq!(groups[0].examples.len(), 3);
        assert_eq!(groups[1].variations, vec![BLUE]);
    }
}
