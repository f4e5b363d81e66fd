//! Zone and label statistics

use crate::label::Direction;
use crate::zone::Zone;
use std::collections::BTreeMap;

/// Label count for one (pair, direction) combination
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGroupStats {
    pub pair_id: usize,
    pub direction: Direction,
    /// Labels over all zones, duplicates included
    pub count: usize,
    /// Zones holding at least one such label, ascending
    pub zone_ids: Vec<u32>,
}

/// Totals over a set of zones
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub total_zones: usize,
    /// Sum of the zones' cell counts
    pub total_cells: usize,
    pub total_labels: usize,
    pub average_cells_per_zone: f64,
    /// Ordered by pair, row headers before column headers
    pub label_groups: Vec<LabelGroupStats>,
}

impl Statistics {
    /// Compute statistics for `zones`
    pub fn compute(zones: &[Zone]) -> Self {
        let total_zones = zones.len();
        let total_cells: usize = zones.iter().map(|z| z.cell_count).sum();
        let total_labels: usize = zones.iter().map(|z| z.labels.len()).sum();
        let average_cells_per_zone = if total_zones > 0 {
            total_cells as f64 / total_zones as f64
        } else {
            0.0
        };

        let mut groups: BTreeMap<(usize, Direction), (usize, Vec<u32>)> = BTreeMap::new();
        for zone in zones {
            for label in &zone.labels {
                let (count, ids) = groups.entry((label.pair_id, label.direction)).or_default();
                *count += 1;
                if !ids.contains(&zone.id) {
                    ids.push(zone.id);
                }
            }
        }

        let label_groups = groups
            .into_iter()
            .map(|((pair_id, direction), (count, mut zone_ids))| {
                zone_ids.sort_unstable();
                LabelGroupStats {
                    pair_id,
                    direction,
                    count,
                    zone_ids,
                }
            })
            .collect();

        Self {
            total_zones,
            total_cells,
            total_labels,
            average_cells_per_zone,
            label_groups,
        }
    }
}
