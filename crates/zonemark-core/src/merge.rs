//! Merging of nearby zones

use crate::zone::{Bounds, Zone};
use log::debug;

/// Check whether two bounding boxes are within `max_gap` of each other
///
/// Side by side: the row ranges overlap (allowing `max_gap`) and the facing
/// column edges are at most `max_gap` apart. Stacked: the same with rows and
/// columns swapped.
pub fn are_adjacent(a: &Bounds, b: &Bounds, max_gap: u32) -> bool {
    let gap = max_gap as i64;
    let (a_min_row, a_max_row) = (a.min_row as i64, a.max_row as i64);
    let (a_min_col, a_max_col) = (a.min_col as i64, a.max_col as i64);
    let (b_min_row, b_max_row) = (b.min_row as i64, b.max_row as i64);
    let (b_min_col, b_max_col) = (b.min_col as i64, b.max_col as i64);

    let rows_overlap = a_min_row <= b_max_row + gap && a_max_row >= b_min_row - gap;
    if rows_overlap && ((a_max_col - b_min_col).abs() <= gap || (b_max_col - a_min_col).abs() <= gap) {
        return true;
    }

    let cols_overlap = a_min_col <= b_max_col + gap && a_max_col >= b_min_col - gap;
    cols_overlap && ((a_max_row - b_min_row).abs() <= gap || (b_max_row - a_min_row).abs() <= gap)
}

/// One merge pass over `zones`
///
/// Each zone not yet absorbed takes in every later zone adjacent to its
/// original bounds. Cells and labels are appended, bounds grow to cover the
/// absorbed zone, the count becomes the number of cells and ids are
/// renumbered from 1. Fewer than two zones are returned untouched.
pub fn merge_zones(zones: Vec<Zone>, max_gap: u32) -> Vec<Zone> {
    if zones.len() <= 1 {
        return zones;
    }

    let original: Vec<Bounds> = zones.iter().map(|z| z.bounds).collect();
    let mut slots: Vec<Option<Zone>> = zones.into_iter().map(Some).collect();
    let mut merged = Vec::new();

    for i in 0..slots.len() {
        let Some(mut zone) = slots[i].take() else {
            continue;
        };

        for j in (i + 1)..slots.len() {
            if slots[j].is_none() || !are_adjacent(&original[i], &original[j], max_gap) {
                continue;
            }
            if let Some(other) = slots[j].take() {
                zone.bounds = zone.bounds.union(&other.bounds);
                zone.cells.extend(other.cells);
                zone.labels.extend(other.labels);
            }
        }

        zone.id = merged.len() as u32 + 1;
        zone.cell_count = zone.cells.len();
        merged.push(zone);
    }

    debug!("merge pass (gap {}): {} zones", max_gap, merged.len());
    merged
}

/// Repeat [`merge_zones`] until a pass no longer reduces the zone count
pub fn merge_zones_until_stable(zones: Vec<Zone>, max_gap: u32) -> Vec<Zone> {
    let mut zones = zones;
    loop {
        let before = zones.len();
        zones = merge_zones(zones, max_gap);
        if zones.len() == before {
            return zones;
        }
    }
}
