//! Header label resolution
//!
//! For every cell of a zone two scans run: leftward along the row, collecting
//! row headers, and upward along the column, collecting column headers. The
//! first header met sets the current color (and therefore the pair) of the
//! scan, and further headers of that color are collected too. A header
//! carrying the *other* color of the current pair ends the scan.
//!
//! With one or two pairs, a same-role header of the other pair makes that
//! pair current and is collected, so outer levels of a multi-level header are
//! reached. With three or more pairs such headers are stepped over.

use crate::address::CellAddress;
use crate::color::ColorKey;
use crate::index::ColorIndex;
use crate::palette::{HeaderRole, Palette};
use crate::zone::Zone;
use ahash::AHashMap;
use log::debug;
use std::fmt;

/// Which scan produced a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Found scanning left along the row
    RowHeader,
    /// Found scanning up along the column
    ColHeader,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::RowHeader => "row_header",
            Direction::ColHeader => "col_header",
        }
    }

    /// The scan direction collecting the other color of a pair
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::RowHeader => Direction::ColHeader,
            Direction::ColHeader => Direction::RowHeader,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header cell attached to a zone
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label {
    pub row: u32,
    pub col: u32,
    pub value: String,
    pub color: ColorKey,
    /// Index of the palette pair the label belongs to
    pub pair_id: usize,
    pub direction: Direction,
    /// Grid steps from the zone cell along the scan axis
    pub distance: u32,
    /// Zone cell whose scan found the label; `None` for labels added by hand
    pub for_cell: Option<CellAddress>,
}

impl Label {
    /// Address of the header cell
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

/// A header cell of the palette, as indexed by [`LabelResolver`]
#[derive(Debug, Clone)]
struct HeaderCell {
    row: u32,
    col: u32,
    value: String,
    color: ColorKey,
    role: HeaderRole,
}

/// Resolves labels for the zones of one sheet
///
/// Header cells are looked up once per sheet and bucketed by row and by
/// column, so a scan only visits header cells and skips blank stretches.
#[derive(Debug, Clone)]
pub struct LabelResolver {
    headers: Vec<HeaderCell>,
    /// row -> header indices sorted by column
    by_row: AHashMap<u32, Vec<usize>>,
    /// column -> header indices sorted by row
    by_col: AHashMap<u32, Vec<usize>>,
    /// Whether a same-role header of another pair takes over the scan
    switch_pairs: bool,
}

impl LabelResolver {
    /// Index the header cells of `palette` found in `index`
    ///
    /// The palette is expected to be validated, so every header color has a
    /// single role.
    pub fn new(palette: &Palette, index: &ColorIndex) -> Self {
        let mut headers: Vec<HeaderCell> = palette
            .header_roles()
            .flat_map(|(color, role)| {
                index.cells(&color).iter().map(move |c| HeaderCell {
                    row: c.row,
                    col: c.col,
                    value: c.value.clone(),
                    color,
                    role,
                })
            })
            .collect();
        headers.sort_by_key(|h| (h.row, h.col));

        let mut by_row: AHashMap<u32, Vec<usize>> = AHashMap::new();
        let mut by_col: AHashMap<u32, Vec<usize>> = AHashMap::new();
        for (i, h) in headers.iter().enumerate() {
            by_row.entry(h.row).or_default().push(i);
            by_col.entry(h.col).or_default().push(i);
        }

        debug!(
            "label resolver: {} header cells over {} pairs",
            headers.len(),
            palette.pairs.len()
        );

        Self {
            headers,
            by_row,
            by_col,
            switch_pairs: palette.pairs.len() <= 2,
        }
    }

    /// Number of header cells known to the resolver
    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    /// Labels seen from every cell of `zone`, row headers first for each cell
    ///
    /// A header seen from several cells appears once per cell; use
    /// [`dedupe_labels`] for the consolidated view.
    pub fn resolve(&self, zone: &Zone) -> Vec<Label> {
        let mut labels = Vec::new();
        for cell in &zone.cells {
            let origin = cell.address();
            self.scan(origin, Direction::RowHeader, &mut labels);
            self.scan(origin, Direction::ColHeader, &mut labels);
        }
        labels
    }

    /// Walk from `origin` towards row/column 1, nearest header first
    fn scan(&self, origin: CellAddress, direction: Direction, out: &mut Vec<Label>) {
        let (line, limit) = match direction {
            Direction::RowHeader => (self.by_row.get(&origin.row), origin.col),
            Direction::ColHeader => (self.by_col.get(&origin.col), origin.row),
        };
        let Some(line) = line else {
            return;
        };

        let position = |h: &HeaderCell| match direction {
            Direction::RowHeader => h.col,
            Direction::ColHeader => h.row,
        };
        let before = line.partition_point(|&i| position(&self.headers[i]) < limit);

        let mut current: Option<(ColorKey, usize)> = None;
        for &i in line[..before].iter().rev() {
            let header = &self.headers[i];

            if header.role.direction == direction {
                match current {
                    None => current = Some((header.color, header.role.pair_id)),
                    Some((color, _)) if color == header.color => {}
                    Some(_) if self.switch_pairs => {
                        current = Some((header.color, header.role.pair_id));
                    }
                    Some(_) => continue,
                }
                out.push(Label {
                    row: header.row,
                    col: header.col,
                    value: header.value.clone(),
                    color: header.color,
                    pair_id: header.role.pair_id,
                    direction,
                    distance: limit - position(header),
                    for_cell: Some(origin),
                });
            } else if let Some((_, pair_id)) = current {
                if header.role.pair_id == pair_id {
                    break;
                }
            }
        }
    }
}

/// Resolve labels of one zone
///
/// Convenience wrapper building a [`LabelResolver`]; reuse a resolver when
/// resolving many zones of the same sheet.
pub fn resolve_labels(zone: &Zone, palette: &Palette, index: &ColorIndex) -> Vec<Label> {
    if palette.pairs.is_empty() {
        return Vec::new();
    }
    LabelResolver::new(palette, index).resolve(zone)
}

/// One physical header cell with every zone cell that sees it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsolidatedLabel {
    pub row: u32,
    pub col: u32,
    pub value: String,
    pub color: ColorKey,
    pub pair_id: usize,
    pub direction: Direction,
    /// Smallest distance over all sightings
    pub distance: u32,
    pub for_cells: Vec<CellAddress>,
}

impl ConsolidatedLabel {
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }
}

/// Collapse labels sharing `(row, col, direction, pair_id)`, first seen first
pub fn dedupe_labels(labels: &[Label]) -> Vec<ConsolidatedLabel> {
    let mut position: AHashMap<(u32, u32, Direction, usize), usize> = AHashMap::new();
    let mut out: Vec<ConsolidatedLabel> = Vec::new();

    for label in labels {
        let key = (label.row, label.col, label.direction, label.pair_id);
        let i = match position.get(&key).copied() {
            Some(i) => {
                out[i].distance = out[i].distance.min(label.distance);
                i
            }
            None => {
                position.insert(key, out.len());
                out.push(ConsolidatedLabel {
                    row: label.row,
                    col: label.col,
                    value: label.value.clone(),
                    color: label.color,
                    pair_id: label.pair_id,
                    direction: label.direction,
                    distance: label.distance,
                    for_cells: Vec::new(),
                });
                out.len() - 1
            }
        };

        let entry = &mut out[i];
        if let Some(cell) = label.for_cell {
            if !entry.for_cells.contains(&cell) {
                entry.for_cells.push(cell);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ColorIndex;
    use crate::palette::ColorPair;
    use crate::sheet::Sheet;
    use crate::zone::build_zones;
    use pretty_assertions::assert_eq;

    const ZONE: ColorKey = ColorKey::new(255, 0, 0);
    const ROW1: ColorKey = ColorKey::new(0, 255, 0);
    const COL1: ColorKey = ColorKey::new(0, 0, 255);
    const ROW2: ColorKey = ColorKey::new(255, 255, 0);
    const COL2: ColorKey = ColorKey::new(0, 255, 255);
    const ROW3: ColorKey = ColorKey::new(255, 0, 255);
    const COL3: ColorKey = ColorKey::new(128, 128, 128);

    fn one_pair() -> Palette {
        Palette::new(ZONE, "data").with_pair(ColorPair::new(ROW1, COL1))
    }

    fn two_pairs() -> Palette {
        one_pair().with_pair(ColorPair::new(ROW2, COL2))
    }

    fn three_pairs() -> Palette {
        two_pairs().with_pair(ColorPair::new(ROW3, COL3))
    }

    fn resolve_single_zone(sheet: &Sheet, palette: &Palette) -> Vec<Label> {
        let index = ColorIndex::build(sheet);
        let zones = build_zones(index.cells(&palette.zone_color));
        assert_eq!(zones.len(), 1);
        resolve_labels(&zones[0], palette, &index)
    }

    fn summary(labels: &[Label]) -> Vec<(String, String, u32)> {
        labels
            .iter()
            .map(|l| {
                (
                    l.for_cell.map(|a| a.to_string()).unwrap_or_default(),
                    l.value.clone(),
                    l.distance,
                )
            })
            .collect()
    }

    #[test]
    fn test_column_header_above_zone() {
        // [V, Z, Z] down column B
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 2, "V", Some(COL1));
        sheet.set_cell(2, 2, "z1", Some(ZONE));
        sheet.set_cell(3, 2, "z2", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        assert_eq!(
            summary(&labels),
            vec![
                ("B2".to_string(), "V".to_string(), 1),
                ("B3".to_string(), "V".to_string(), 2),
            ]
        );
        assert!(labels.iter().all(|l| l.direction == Direction::ColHeader));
    }

    #[test]
    fn test_row_then_col_per_cell() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 2, "Q1", Some(COL1));
        sheet.set_cell(2, 1, "Sales", Some(ROW1));
        sheet.set_cell(2, 2, "42", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].direction, Direction::RowHeader);
        assert_eq!(labels[0].value, "Sales");
        assert_eq!(labels[1].direction, Direction::ColHeader);
        assert_eq!(labels[1].value, "Q1");
    }

    #[test]
    fn test_same_color_headers_stack() {
        // Two row headers of the same color: both collected, nearest first
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "Region", Some(ROW1));
        sheet.set_cell(1, 2, "City", Some(ROW1));
        sheet.set_cell(1, 4, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        assert_eq!(
            summary(&labels),
            vec![
                ("D1".to_string(), "City".to_string(), 2),
                ("D1".to_string(), "Region".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_opposite_color_of_same_pair_stops() {
        // Row scan from D1: C1 row header, B1 col header of the same pair, A1 row header
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "far", Some(ROW1));
        sheet.set_cell(1, 2, "stop", Some(COL1));
        sheet.set_cell(1, 3, "near", Some(ROW1));
        sheet.set_cell(1, 4, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        let values: Vec<_> = labels.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["near"]);
    }

    #[test]
    fn test_opposite_color_before_first_header_ignored() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "h", Some(ROW1));
        sheet.set_cell(1, 2, "v", Some(COL1));
        sheet.set_cell(1, 3, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        let row_labels: Vec<_> = labels
            .iter()
            .filter(|l| l.direction == Direction::RowHeader)
            .map(|l| (l.value.as_str(), l.distance))
            .collect();
        assert_eq!(row_labels, vec![("h", 2)]);
    }

    #[test]
    fn test_pair_isolation() {
        // Row scan from E1: D1 pair 2 row header, C1 pair 2 col header (stops)
        // before pair 1's headers at B1 and A1
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "other-col", Some(COL1));
        sheet.set_cell(1, 2, "other-row", Some(ROW1));
        sheet.set_cell(1, 3, "stop2", Some(COL2));
        sheet.set_cell(1, 4, "mine", Some(ROW2));
        sheet.set_cell(1, 5, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &two_pairs());
        let row_labels: Vec<_> = labels
            .iter()
            .filter(|l| l.direction == Direction::RowHeader)
            .collect();
        assert_eq!(row_labels.len(), 1);
        assert_eq!(row_labels[0].value, "mine");
        assert_eq!(row_labels[0].pair_id, 1);
        assert!(labels.iter().all(|l| l.pair_id == 1));
    }

    #[test]
    fn test_header_row_of_two_pairs_above_zone_row() {
        // Row 1 [H1, H1, H2, H2] over zone row 2: row-header colors are never
        // collected by the upward scan
        let mut sheet = Sheet::new("S");
        for (col, color) in [(1, ROW1), (2, ROW1), (3, ROW2), (4, ROW2)] {
            sheet.set_cell(1, col, "h", Some(color));
            sheet.set_cell(2, col, "z", Some(ZONE));
        }
        assert!(resolve_single_zone(&sheet, &two_pairs()).is_empty());

        // Same layout with the column-header colors: each cell gets the header
        // right above it, tagged with that header's pair
        let mut sheet = Sheet::new("S");
        for (col, color) in [(1, COL1), (2, COL1), (3, COL2), (4, COL2)] {
            sheet.set_cell(1, col, format!("v{}", col), Some(color));
            sheet.set_cell(2, col, "z", Some(ZONE));
        }
        let labels = resolve_single_zone(&sheet, &two_pairs());
        let view: Vec<_> = labels
            .iter()
            .map(|l| {
                (
                    l.for_cell.map(|a| a.to_string()).unwrap_or_default(),
                    l.value.clone(),
                    l.pair_id,
                )
            })
            .collect();
        assert_eq!(
            view,
            vec![
                ("A2".to_string(), "v1".to_string(), 0),
                ("B2".to_string(), "v2".to_string(), 0),
                ("C2".to_string(), "v3".to_string(), 1),
                ("D2".to_string(), "v4".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_two_level_headers() {
        // Year/Quarter above C3, Region/City left of it
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 3, "2024", Some(COL1));
        sheet.set_cell(2, 3, "Q1", Some(COL2));
        sheet.set_cell(3, 1, "Region", Some(ROW1));
        sheet.set_cell(3, 2, "City", Some(ROW2));
        sheet.set_cell(3, 3, "5", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &two_pairs());
        let view: Vec<_> = labels
            .iter()
            .map(|l| (l.value.as_str(), l.direction, l.pair_id, l.distance))
            .collect();
        assert_eq!(
            view,
            vec![
                ("City", Direction::RowHeader, 1, 1),
                ("Region", Direction::RowHeader, 0, 2),
                ("Q1", Direction::ColHeader, 1, 1),
                ("2024", Direction::ColHeader, 0, 2),
            ]
        );
    }

    #[test]
    fn test_switched_pair_uses_its_own_stop() {
        // From E1: City (pair 2), Region (pair 1), then B1 closes pair 1
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "beyond", Some(ROW1));
        sheet.set_cell(1, 2, "stop1", Some(COL1));
        sheet.set_cell(1, 3, "Region", Some(ROW1));
        sheet.set_cell(1, 4, "City", Some(ROW2));
        sheet.set_cell(1, 5, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &two_pairs());
        let values: Vec<_> = labels.iter().map(|l| l.value.as_str()).collect();
        assert_eq!(values, vec!["City", "Region"]);
    }

    #[test]
    fn test_three_pairs_step_over_other_rows() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "Region", Some(ROW1));
        sheet.set_cell(1, 2, "City", Some(ROW2));
        sheet.set_cell(1, 3, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &three_pairs());
        let view: Vec<_> = labels.iter().map(|l| (l.value.as_str(), l.distance)).collect();
        assert_eq!(view, vec![("City", 1)]);
    }

    #[test]
    fn test_foreign_pair_does_not_stop() {
        // Pair 2's col header between two pair 1 row headers is stepped over
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "outer", Some(ROW1));
        sheet.set_cell(1, 2, "foreign", Some(COL2));
        sheet.set_cell(1, 3, "inner", Some(ROW1));
        sheet.set_cell(1, 4, "1", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &two_pairs());
        let values: Vec<_> = labels
            .iter()
            .filter(|l| l.direction == Direction::RowHeader)
            .map(|l| l.value.as_str())
            .collect();
        assert_eq!(values, vec!["inner", "outer"]);
    }

    #[test]
    fn test_zone_cells_are_transparent() {
        // Header at A1 is seen through the zone cell at B1 from C1
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 1, "h", Some(ROW1));
        sheet.set_cell(1, 2, "1", Some(ZONE));
        sheet.set_cell(1, 3, "2", Some(ZONE));

        let labels = resolve_single_zone(&sheet, &one_pair());
        assert_eq!(
            summary(&labels),
            vec![
                ("B1".to_string(), "h".to_string(), 1),
                ("C1".to_string(), "h".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_empty_pairs_and_no_headers() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(2, 2, "1", Some(ZONE));
        sheet.set_cell(2, 1, "h", Some(ROW1));

        let palette = Palette::new(ZONE, "data");
        assert!(resolve_single_zone(&sheet, &palette).is_empty());

        let mut lonely = Sheet::new("S");
        lonely.set_cell(2, 2, "1", Some(ZONE));
        assert!(resolve_single_zone(&lonely, &one_pair()).is_empty());
    }

    #[test]
    fn test_headers_right_or_below_not_seen() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(2, 2, "1", Some(ZONE));
        sheet.set_cell(2, 3, "right", Some(ROW1));
        sheet.set_cell(3, 2, "below", Some(COL1));
        assert!(resolve_single_zone(&sheet, &one_pair()).is_empty());
    }

    #[test]
    fn test_dedupe_labels() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(1, 2, "Q1", Some(COL1));
        sheet.set_cell(1, 3, "Q2", Some(COL1));
        sheet.set_cell(2, 1, "A", Some(ROW1));
        sheet.set_cell(3, 1, "B", Some(ROW1));
        for r in 2..=3 {
            for c in 2..=3 {
                sheet.set_cell(r, c, "x", Some(ZONE));
            }
        }

        let labels = resolve_single_zone(&sheet, &one_pair());
        assert_eq!(labels.len(), 8);

        let consolidated = dedupe_labels(&labels);
        let view: Vec<_> = consolidated
            .iter()
            .map(|l| (l.value.as_str(), l.distance, l.for_cells.len()))
            .collect();
        assert_eq!(view, vec![("A", 1, 2), ("Q1", 1, 2), ("Q2", 1, 2), ("B", 1, 2)]);
        assert_eq!(
            consolidated[0].for_cells,
            vec![CellAddress::new(2, 2), CellAddress::new(2, 3)]
        );
    }

    #[test]
    fn test_dedupe_keeps_min_distance() {
        let label = |distance, for_cell| Label {
            row: 1,
            col: 1,
            value: "h".to_string(),
            color: ROW1,
            pair_id: 0,
            direction: Direction::RowHeader,
            distance,
            for_cell,
        };
        let out = dedupe_labels(&[
            label(3, Some(CellAddress::new(1, 4))),
            label(1, Some(CellAddress::new(1, 2))),
            label(1, None),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].distance, 1);
        assert_eq!(out[0].for_cells.len(), 2);
    }
}
