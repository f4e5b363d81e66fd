//! Per-cell data points with their header context

use serde::{Deserialize, Serialize};

use zonemark_core::{Direction, Label, Zone};

/// A zone cell with the header values that describe it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub zone_id: u32,
    pub address: String,
    pub row: u32,
    pub col: u32,
    pub value: String,
    /// Row-header values, nearest first
    pub row_headers: Vec<String>,
    /// Column-header values, nearest first
    pub col_headers: Vec<String>,
}

/// One data point per member cell of `zone`
///
/// Labels resolved for a specific cell are listed by distance; labels with
/// no target cell (added by hand) apply to every cell and come last.
pub fn data_points(zone: &Zone) -> Vec<DataPoint> {
    let shared: Vec<&Label> = zone.labels.iter().filter(|l| l.for_cell.is_none()).collect();

    zone.cells
        .iter()
        .map(|cell| {
            let addr = cell.address();
            let mut own: Vec<&Label> = zone
                .labels
                .iter()
                .filter(|l| l.for_cell == Some(addr))
                .collect();
            // stable: equal distances keep resolution order
            own.sort_by_key(|l| l.distance);

            let headers = |direction: Direction| -> Vec<String> {
                own.iter()
                    .chain(shared.iter())
                    .filter(|l| l.direction == direction)
                    .map(|l| l.value.clone())
                    .collect()
            };

            DataPoint {
                zone_id: zone.id,
                address: addr.to_string(),
                row: cell.row,
                col: cell.col,
                value: cell.value.clone(),
                row_headers: headers(Direction::RowHeader),
                col_headers: headers(Direction::ColHeader),
            }
        })
        .collect()
}
