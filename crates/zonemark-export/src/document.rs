//! JSON export document

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ExportResult;
use zonemark_core::{
    dedupe_labels, Bounds, Cell, CellAddress, ColorKey, ColorPair, ConsolidatedLabel, Direction,
    Label, Palette, Session, Zone,
};

/// Timestamp format of `date_export`
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Largest palette whose labels are grouped by `h1`/`v1` style slots
const MAX_SLOTTED_PAIRS: usize = 2;

/// Group key of a label
///
/// With at most two pairs the key names the slot: `h1` for the row headers
/// of the first pair, `v2` for the column headers of the second. Larger
/// palettes group by direction only.
pub fn label_slot(pair_id: usize, direction: Direction, pair_count: usize) -> String {
    if pair_count <= MAX_SLOTTED_PAIRS {
        let prefix = match direction {
            Direction::RowHeader => 'h',
            Direction::ColHeader => 'v',
        };
        format!("{}{}", prefix, pair_id + 1)
    } else {
        direction.as_str().to_string()
    }
}

fn hex(color: &ColorKey) -> String {
    format!("#{}", color)
}

/// A color with its display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub color: String,
    pub name: String,
}

/// Header colors of one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPair {
    pub row_header: PaletteEntry,
    pub col_header: PaletteEntry,
}

/// Palette as written to the document, colors as `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPalette {
    pub zone_color: String,
    pub zone_name: String,
    #[serde(default)]
    pub label_pairs: Vec<ExportPair>,
}

impl ExportPalette {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            zone_color: hex(&palette.zone_color),
            zone_name: palette.zone_name.clone(),
            label_pairs: palette
                .pairs
                .iter()
                .map(|pair| ExportPair {
                    row_header: PaletteEntry {
                        color: hex(&pair.row_header_color),
                        name: pair.row_header_name.clone(),
                    },
                    col_header: PaletteEntry {
                        color: hex(&pair.col_header_color),
                        name: pair.col_header_name.clone(),
                    },
                })
                .collect(),
        }
    }

    /// Parse the colors back into a [`Palette`]
    pub fn to_palette(&self) -> ExportResult<Palette> {
        let mut palette = Palette::new(ColorKey::parse(&self.zone_color)?, self.zone_name.as_str());
        for pair in &self.label_pairs {
            palette = palette.with_pair(
                ColorPair::new(
                    ColorKey::parse(&pair.row_header.color)?,
                    ColorKey::parse(&pair.col_header.color)?,
                )
                .with_names(pair.row_header.name.as_str(), pair.col_header.name.as_str()),
            );
        }
        Ok(palette)
    }
}

/// Zone bounds with column letters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportBounds {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
    pub min_col_letter: String,
    pub max_col_letter: String,
}

impl From<&Bounds> for ExportBounds {
    fn from(b: &Bounds) -> Self {
        Self {
            min_row: b.min_row,
            max_row: b.max_row,
            min_col: b.min_col,
            max_col: b.max_col,
            min_col_letter: b.min_col_letter(),
            max_col_letter: b.max_col_letter(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCell {
    pub address: String,
    pub row: u32,
    pub col: u32,
    pub col_letter: String,
    pub value: String,
}

impl From<&Cell> for ExportCell {
    fn from(cell: &Cell) -> Self {
        let addr = cell.address();
        Self {
            address: addr.to_string(),
            row: cell.row,
            col: cell.col,
            col_letter: addr.col_letter(),
            value: cell.value.clone(),
        }
    }
}

/// A consolidated label with the zone cells that see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLabel {
    pub address: String,
    pub row: u32,
    pub col: u32,
    pub col_letter: String,
    pub value: String,
    /// Group key, see [`label_slot`]
    #[serde(rename = "type")]
    pub slot: String,
    pub pair_id: usize,
    pub direction: Direction,
    pub distance: u32,
    #[serde(default)]
    pub for_cells: Vec<String>,
}

impl ExportLabel {
    fn new(label: &ConsolidatedLabel, pair_count: usize) -> Self {
        let addr = label.address();
        Self {
            address: addr.to_string(),
            row: label.row,
            col: label.col,
            col_letter: addr.col_letter(),
            value: label.value.clone(),
            slot: label_slot(label.pair_id, label.direction, pair_count),
            pair_id: label.pair_id,
            direction: label.direction,
            distance: label.distance,
            for_cells: label.for_cells.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Expand back into one [`Label`] per sighting
    fn into_labels(self, palette: &Palette) -> ExportResult<Vec<Label>> {
        let color = palette.pair(self.pair_id)?.color(self.direction);
        let template = Label {
            row: self.row,
            col: self.col,
            value: self.value,
            color,
            pair_id: self.pair_id,
            direction: self.direction,
            distance: self.distance,
            for_cell: None,
        };

        if self.for_cells.is_empty() {
            return Ok(vec![template]);
        }

        self.for_cells
            .iter()
            .map(|a| -> ExportResult<Label> {
                Ok(Label {
                    for_cell: Some(CellAddress::parse(a)?),
                    ..template.clone()
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportZone {
    pub id: u32,
    pub bounds: ExportBounds,
    pub cell_count: usize,
    pub cells: Vec<ExportCell>,
    /// Consolidated labels keyed by slot or direction
    #[serde(default)]
    pub labels: BTreeMap<String, Vec<ExportLabel>>,
}

impl ExportZone {
    fn new(zone: &Zone, pair_count: usize) -> Self {
        let mut labels: BTreeMap<String, Vec<ExportLabel>> = BTreeMap::new();
        for label in dedupe_labels(&zone.labels) {
            let exported = ExportLabel::new(&label, pair_count);
            labels.entry(exported.slot.clone()).or_default().push(exported);
        }

        Self {
            id: zone.id,
            bounds: ExportBounds::from(&zone.bounds),
            cell_count: zone.cell_count,
            cells: zone.cells.iter().map(ExportCell::from).collect(),
            labels,
        }
    }

    fn into_zone(self, palette: &Palette) -> ExportResult<Zone> {
        let bounds = Bounds::new(
            self.bounds.min_row,
            self.bounds.max_row,
            self.bounds.min_col,
            self.bounds.max_col,
        )?;

        let cells = self
            .cells
            .into_iter()
            .map(|c| Cell::new(c.row, c.col, c.value, palette.zone_color))
            .collect();

        let mut labels = Vec::new();
        for label in self.labels.into_values().flatten() {
            labels.extend(label.into_labels(palette)?);
        }

        Ok(Zone {
            id: self.id,
            cells,
            bounds,
            cell_count: self.cell_count,
            labels,
        })
    }
}

/// Everything detected on one sheet, as written to JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub date_export: String,
    pub sheet_name: String,
    pub color_palette: ExportPalette,
    pub zones: Vec<ExportZone>,
}

impl ExportDocument {
    pub fn new(sheet_name: &str, palette: &Palette, zones: &[Zone], exported_at: NaiveDateTime) -> Self {
        let pair_count = palette.pairs.len();
        Self {
            date_export: exported_at.format(DATE_FORMAT).to_string(),
            sheet_name: sheet_name.to_string(),
            color_palette: ExportPalette::from_palette(palette),
            zones: zones.iter().map(|z| ExportZone::new(z, pair_count)).collect(),
        }
    }

    /// Snapshot of a session, stamped with the local time
    ///
    /// A session that was never configured exports its zones under an
    /// empty palette with a black zone color.
    pub fn from_session(session: &Session) -> Self {
        let fallback;
        let palette = match session.palette() {
            Some(p) => p,
            None => {
                fallback = Palette::new(ColorKey::new(0, 0, 0), "");
                &fallback
            }
        };
        Self::new(
            session.sheet().name(),
            palette,
            session.zones(),
            chrono::Local::now().naive_local(),
        )
    }

    /// Pretty JSON, two-space indent
    pub fn to_json_string(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> ExportResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Export timestamp, `None` if the field does not hold one
    pub fn exported_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date_export, DATE_FORMAT).ok()
    }

    pub fn palette(&self) -> ExportResult<Palette> {
        self.color_palette.to_palette()
    }

    /// Rebuild the zones, cell colors taken from the palette's zone color
    pub fn into_zones(self) -> ExportResult<Vec<Zone>> {
        let palette = self.palette()?;
        let zones = self
            .zones
            .into_iter()
            .map(|z| z.into_zone(&palette))
            .collect::<ExportResult<Vec<_>>>()?;
        log::debug!("re-imported {} zones from '{}'", zones.len(), self.sheet_name);
        Ok(zones)
    }
}
