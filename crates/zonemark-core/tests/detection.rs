//! End-to-end detection on small in-memory sheets

use pretty_assertions::assert_eq;
use zonemark_core::{
    dedupe_labels, Bounds, ColorKey, ColorPair, Direction, Palette, Session, Sheet,
};

const ZONE: ColorKey = ColorKey::new(0xFF, 0x00, 0x00);
const ROW_HEADER: ColorKey = ColorKey::new(0x00, 0xFF, 0x00);
const COL_HEADER: ColorKey = ColorKey::new(0x00, 0x00, 0xFF);

fn palette() -> Palette {
    Palette::new(ZONE, "values").with_pair(ColorPair::new(ROW_HEADER, COL_HEADER))
}

#[test]
fn test_two_by_two_scenario() {
    let mut sheet = Sheet::new("Sheet1");
    sheet.set_cell(1, 2, "Q1", Some(COL_HEADER));
    sheet.set_cell(1, 3, "Q2", Some(COL_HEADER));
    sheet.set_cell(2, 1, "North", Some(ROW_HEADER));
    sheet.set_cell(3, 1, "South", Some(ROW_HEADER));
    sheet.set_cell(2, 2, "10", Some(ZONE));
    sheet.set_cell(2, 3, "20", Some(ZONE));
    sheet.set_cell(3, 2, "30", Some(ZONE));
    sheet.set_cell(3, 3, "40", Some(ZONE));

    let mut session = Session::new(sheet);
    session.configure(palette()).unwrap();
    assert_eq!(session.detect().unwrap(), 1);

    let zone = &session.zones()[0];
    assert_eq!(zone.id, 1);
    assert_eq!(zone.bounds, Bounds::new(2, 3, 2, 3).unwrap());
    assert_eq!(zone.cell_count, 4);
    assert_eq!(zone.labels.len(), 8);

    for cell in &zone.cells {
        let seen: Vec<_> = zone
            .labels
            .iter()
            .filter(|l| l.for_cell == Some(cell.address()))
            .collect();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].direction, Direction::RowHeader);
        assert_eq!(seen[1].direction, Direction::ColHeader);
        // distance counts grid steps, zone cells in between included
        assert_eq!(seen[0].distance, cell.col - 1);
        assert_eq!(seen[1].distance, cell.row - 1);
    }

    let consolidated = dedupe_labels(&zone.labels);
    let values: Vec<_> = consolidated
        .iter()
        .map(|l| (l.value.as_str(), l.distance, l.for_cells.len()))
        .collect();
    assert_eq!(
        values,
        vec![("North", 1, 2), ("Q1", 1, 2), ("Q2", 1, 2), ("South", 1, 2)]
    );
}

#[test]
fn test_near_white_cells_are_ignored() {
    let mut sheet = Sheet::new("Sheet1");
    sheet.set_cell(1, 1, "", Some(ColorKey::new(0xFF, 0xFF, 0xFF)));
    sheet.set_cell(1, 2, "", Some(ColorKey::new(0xFB, 0xFB, 0xFB)));
    sheet.set_cell(2, 2, "x", Some(ZONE));

    let session = Session::new(sheet);
    assert_eq!(session.index().color_count(), 1);
    assert_eq!(session.index().total_cells(), 1);
}

#[test]
fn test_separate_zones_share_headers() {
    // Two zones under the same column headers, split by a blank row
    let mut sheet = Sheet::new("Sheet1");
    sheet.set_cell(1, 2, "Amount", Some(COL_HEADER));
    sheet.set_cell(2, 2, "1", Some(ZONE));
    sheet.set_cell(4, 2, "2", Some(ZONE));

    let mut session = Session::new(sheet);
    session.configure(palette()).unwrap();
    assert_eq!(session.detect().unwrap(), 2);

    let distances: Vec<_> = session
        .zones()
        .iter()
        .map(|z| (z.labels[0].value.clone(), z.labels[0].distance))
        .collect();
    assert_eq!(
        distances,
        vec![("Amount".to_string(), 1), ("Amount".to_string(), 3)]
    );
}

#[test]
fn test_detect_twice_is_stable() {
    let mut sheet = Sheet::new("Sheet1");
    for (row, col) in [(2, 2), (2, 3), (5, 5), (6, 5), (6, 6)] {
        sheet.set_cell(row, col, "v", Some(ZONE));
    }

    let mut session = Session::new(sheet);
    session.configure(palette()).unwrap();
    session.detect().unwrap();
    let first = session.zones().to_vec();
    session.detect().unwrap();
    assert_eq!(session.zones(), first.as_slice());
}
