//! Detection session
//!
//! A [`Session`] owns one sheet together with its color index, the configured
//! palette and the current zones. Detection and every manual edit go through
//! it, one action at a time.

use crate::color::ColorKey;
use crate::error::{Error, Result};
use crate::index::{ColorIndex, ColorSummary};
use crate::label::{Direction, Label, LabelResolver};
use crate::merge::{merge_zones, merge_zones_until_stable};
use crate::palette::Palette;
use crate::sheet::Sheet;
use crate::stats::Statistics;
use crate::zone::{build_zones, Bounds, Zone};
use log::{debug, info};

/// Post-processing applied by [`Session::detect_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectionOptions {
    /// Merge zones whose bounds are within this many rows/columns
    pub merge_gap: Option<u32>,
    /// Repeat merging until the zone count is stable
    pub merge_until_stable: bool,
}

/// Where a hand-added label sits relative to its zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LabelPosition {
    /// Above the top-left cell
    Top,
    /// Left of the top-left cell
    Left,
    /// Below the bottom-left cell
    Bottom,
    /// Right of the top-right cell
    Right,
}

impl LabelPosition {
    /// Grid position for a zone with `bounds`; `None` when it falls off the sheet
    fn locate(&self, bounds: &Bounds) -> Option<(u32, u32)> {
        let (row, col) = match self {
            LabelPosition::Top => (bounds.min_row.checked_sub(1)?, bounds.min_col),
            LabelPosition::Left => (bounds.min_row, bounds.min_col.checked_sub(1)?),
            LabelPosition::Bottom => (bounds.max_row + 1, bounds.min_col),
            LabelPosition::Right => (bounds.min_row, bounds.max_col + 1),
        };
        (row >= 1 && col >= 1).then_some((row, col))
    }
}

/// A label entered by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualLabel {
    pub value: String,
    pub pair_id: usize,
    pub direction: Direction,
    pub position: LabelPosition,
}

/// One sheet under analysis
#[derive(Debug, Clone)]
pub struct Session {
    sheet: Sheet,
    index: ColorIndex,
    palette: Option<Palette>,
    zones: Vec<Zone>,
}

impl Session {
    /// Start a session on `sheet`, indexing its colors
    pub fn new(sheet: Sheet) -> Self {
        let index = ColorIndex::build(&sheet);
        Self {
            sheet,
            index,
            palette: None,
            zones: Vec::new(),
        }
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn index(&self) -> &ColorIndex {
        &self.index
    }

    /// Color summary of the sheet, most frequent color first
    pub fn color_summary(&self) -> Vec<ColorSummary> {
        self.index.summary(&self.sheet)
    }

    /// Configured palette, if any
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Current zones, in id order unless edited
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Get a zone by id
    pub fn zone(&self, id: u32) -> Result<&Zone> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or(Error::ZoneNotFound(id))
    }

    fn zone_mut(&mut self, id: u32) -> Result<&mut Zone> {
        self.zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or(Error::ZoneNotFound(id))
    }

    fn next_zone_id(&self) -> u32 {
        self.zones.iter().map(|z| z.id).max().unwrap_or(0) + 1
    }

    /// Validate and store a palette, dropping zones found with a previous one
    pub fn configure(&mut self, palette: Palette) -> Result<()> {
        palette.validate()?;

        if !self.index.contains(&palette.zone_color) {
            debug!("zone color #{} does not occur on '{}'", palette.zone_color, self.sheet.name());
        }

        self.palette = Some(palette);
        self.zones.clear();
        Ok(())
    }

    /// Build zones from the palette's zone color and resolve their labels
    ///
    /// Replaces any current zones. Returns the number of zones found.
    pub fn detect(&mut self) -> Result<usize> {
        let palette = self.palette.as_ref().ok_or(Error::NotConfigured)?;

        let mut zones = build_zones(self.index.cells(&palette.zone_color));
        let resolver = LabelResolver::new(palette, &self.index);
        for zone in &mut zones {
            zone.labels = resolver.resolve(zone);
        }

        info!(
            "detected {} zones with {} labels on '{}'",
            zones.len(),
            zones.iter().map(|z| z.labels.len()).sum::<usize>(),
            self.sheet.name()
        );

        self.zones = zones;
        Ok(self.zones.len())
    }

    /// [`detect`](Self::detect) followed by the merging asked for in `options`
    pub fn detect_with(&mut self, options: &DetectionOptions) -> Result<usize> {
        self.detect()?;
        if let Some(gap) = options.merge_gap {
            if options.merge_until_stable {
                self.merge_until_stable(gap);
            } else {
                self.merge_nearby(gap);
            }
        }
        Ok(self.zones.len())
    }

    /// One merge pass; returns the new zone count
    pub fn merge_nearby(&mut self, max_gap: u32) -> usize {
        let zones = std::mem::take(&mut self.zones);
        self.zones = merge_zones(zones, max_gap);
        self.zones.len()
    }

    /// Merge until stable; returns the new zone count
    pub fn merge_until_stable(&mut self, max_gap: u32) -> usize {
        let zones = std::mem::take(&mut self.zones);
        self.zones = merge_zones_until_stable(zones, max_gap);
        self.zones.len()
    }

    /// Add a zone drawn by hand; returns its id
    pub fn add_manual_zone(&mut self, bounds: Bounds) -> u32 {
        let id = self.next_zone_id();
        self.zones.push(Zone::manual(id, bounds));
        id
    }

    /// Change a zone's bounds; its cell count becomes the new area
    pub fn resize_zone(&mut self, id: u32, bounds: Bounds) -> Result<()> {
        self.zone_mut(id)?.resize(bounds);
        Ok(())
    }

    /// Copy a zone under a new id; returns the new id
    pub fn duplicate_zone(&mut self, id: u32) -> Result<u32> {
        let mut copy = self.zone(id)?.clone();
        copy.id = self.next_zone_id();
        let new_id = copy.id;
        self.zones.push(copy);
        Ok(new_id)
    }

    /// Remove a zone and return it
    pub fn delete_zone(&mut self, id: u32) -> Result<Zone> {
        let pos = self
            .zones
            .iter()
            .position(|z| z.id == id)
            .ok_or(Error::ZoneNotFound(id))?;
        Ok(self.zones.remove(pos))
    }

    /// Attach a hand-entered label next to a zone
    ///
    /// The label takes the color of its pair's header for `direction`.
    pub fn add_label(&mut self, zone_id: u32, label: ManualLabel) -> Result<()> {
        let palette = self.palette.as_ref().ok_or(Error::NotConfigured)?;
        let color: ColorKey = palette.pair(label.pair_id)?.color(label.direction);

        let zone = self.zone_mut(zone_id)?;
        let (row, col) = label.position.locate(&zone.bounds).ok_or_else(|| {
            Error::InvalidAddress(format!(
                "{:?} of {} is outside the sheet",
                label.position, zone.bounds
            ))
        })?;

        zone.labels.push(Label {
            row,
            col,
            value: label.value,
            color,
            pair_id: label.pair_id,
            direction: label.direction,
            distance: 1,
            for_cell: None,
        });
        Ok(())
    }

    /// Remove the label at `index` of a zone's label list and return it
    pub fn remove_label(&mut self, zone_id: u32, index: usize) -> Result<Label> {
        let zone = self.zone_mut(zone_id)?;
        if index >= zone.labels.len() {
            return Err(Error::LabelOutOfRange {
                zone: zone_id,
                index,
                count: zone.labels.len(),
            });
        }
        Ok(zone.labels.remove(index))
    }

    /// Totals over the current zones
    pub fn statistics(&self) -> Statistics {
        Statistics::compute(&self.zones)
    }

    /// Give the sheet back, dropping everything else
    pub fn into_sheet(self) -> Sheet {
        self.sheet
    }
}
