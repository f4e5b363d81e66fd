//! Color palette: the zone color and the header color pairs

use crate::color::ColorKey;
use crate::error::{Error, Result};
use crate::label::Direction;
use ahash::AHashMap;

/// Row-header and column-header colors that belong together
///
/// Row headers are found by scanning left from a zone cell, column headers by
/// scanning up. Meeting the other color of the same pair ends a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorPair {
    pub row_header_color: ColorKey,
    pub col_header_color: ColorKey,
    #[cfg_attr(feature = "serde", serde(default = "default_row_header_name"))]
    pub row_header_name: String,
    #[cfg_attr(feature = "serde", serde(default = "default_col_header_name"))]
    pub col_header_name: String,
}

fn default_row_header_name() -> String {
    "Row header".to_string()
}

fn default_col_header_name() -> String {
    "Column header".to_string()
}

impl ColorPair {
    /// Create a pair with default header names
    pub fn new(row_header_color: ColorKey, col_header_color: ColorKey) -> Self {
        Self {
            row_header_color,
            col_header_color,
            row_header_name: default_row_header_name(),
            col_header_name: default_col_header_name(),
        }
    }

    /// Set the display names of both headers
    pub fn with_names<R: Into<String>, C: Into<String>>(mut self, row_header_name: R, col_header_name: C) -> Self {
        self.row_header_name = row_header_name.into();
        self.col_header_name = col_header_name.into();
        self
    }

    /// Header color for a scan direction
    pub fn color(&self, direction: Direction) -> ColorKey {
        match direction {
            Direction::RowHeader => self.row_header_color,
            Direction::ColHeader => self.col_header_color,
        }
    }

    /// Header name for a scan direction
    pub fn name(&self, direction: Direction) -> &str {
        match direction {
            Direction::RowHeader => &self.row_header_name,
            Direction::ColHeader => &self.col_header_name,
        }
    }
}

/// Role a header color plays in the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderRole {
    /// Index of the pair in [`Palette::pairs`]
    pub pair_id: usize,
    /// Which scan collects this color
    pub direction: Direction,
}

/// Zone color plus the ordered header pairs
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Palette {
    pub zone_color: ColorKey,
    #[cfg_attr(feature = "serde", serde(default = "default_zone_name"))]
    pub zone_name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pairs: Vec<ColorPair>,
}

#[cfg(feature = "serde")]
fn default_zone_name() -> String {
    "Data".to_string()
}

impl Palette {
    /// Create a palette without header pairs
    pub fn new<S: Into<String>>(zone_color: ColorKey, zone_name: S) -> Self {
        Self {
            zone_color,
            zone_name: zone_name.into(),
            pairs: Vec::new(),
        }
    }

    /// Append a header pair
    pub fn with_pair(mut self, pair: ColorPair) -> Self {
        self.pairs.push(pair);
        self
    }

    /// Get a pair by index
    pub fn pair(&self, pair_id: usize) -> Result<&ColorPair> {
        self.pairs
            .get(pair_id)
            .ok_or(Error::PairOutOfRange(pair_id, self.pairs.len()))
    }

    /// Role of a header color, `None` for the zone color and unknown colors
    pub fn role_of(&self, color: &ColorKey) -> Option<HeaderRole> {
        self.header_roles()
            .find(|(c, _)| c == color)
            .map(|(_, role)| role)
    }

    /// Every header color with its role, in pair order
    pub fn header_roles(&self) -> impl Iterator<Item = (ColorKey, HeaderRole)> + '_ {
        self.pairs.iter().enumerate().flat_map(|(pair_id, pair)| {
            [Direction::RowHeader, Direction::ColHeader]
                .into_iter()
                .map(move |direction| (pair.color(direction), HeaderRole { pair_id, direction }))
        })
    }

    /// Check that all colors are distinct
    ///
    /// A palette without pairs is valid; its zones simply get no labels.
    pub fn validate(&self) -> Result<()> {
        let mut seen: AHashMap<ColorKey, String> = AHashMap::new();
        seen.insert(self.zone_color, format!("zone '{}'", self.zone_name));

        for (pair_id, pair) in self.pairs.iter().enumerate() {
            for direction in [Direction::RowHeader, Direction::ColHeader] {
                let color = pair.color(direction);
                let owner = format!("pair {} {} '{}'", pair_id + 1, direction, pair.name(direction));
                if let Some(first) = seen.get(&color) {
                    return Err(Error::DuplicatePaletteColor {
                        color: color.to_hex(),
                        first: first.clone(),
                        second: owner,
                    });
                }
                seen.insert(color, owner);
            }
        }

        Ok(())
    }
}
