//! Color representation
//!
//! [`Color`] is a fill color as stored in a spreadsheet file (RGB, ARGB, theme
//! or legacy palette index). [`ColorKey`] is the normalized 6-hex-digit form
//! the rest of the crate groups cells by.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Channels above this value on all three components count as white
pub const WHITE_THRESHOLD: u8 = 250;

/// Raw fill color as found in a spreadsheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with tint (-100..=100 percent)
    Theme { index: u8, tint: i8 },

    /// Indexed color (legacy Excel palette)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "FFFF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Color::Rgb { r, g, b })
            }
            8 => {
                let a = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let r = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let g = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let b = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Color::Argb { a, r, g, b })
            }
            _ => None,
        }
    }

    /// Normalize to a [`ColorKey`]
    ///
    /// Alpha is dropped, except for the `00000000` sentinel which means "no
    /// color". Theme colors are not resolved and yield `None`, as do automatic
    /// colors and palette indices outside the legacy 56-color table.
    pub fn to_key(&self) -> Option<ColorKey> {
        match *self {
            Color::Auto => None,
            Color::Rgb { r, g, b } => Some(ColorKey::new(r, g, b)),
            Color::Argb { a: 0, r: 0, g: 0, b: 0 } => None,
            Color::Argb { r, g, b, .. } => Some(ColorKey::new(r, g, b)),
            Color::Theme { .. } => None,
            Color::Indexed(i) => Self::indexed_to_rgb(i).map(|(r, g, b)| ColorKey::new(r, g, b)),
        }
    }

    /// RGB for a legacy palette index, `None` for system colors (64, 65)
    fn indexed_to_rgb(index: u8) -> Option<(u8, u8, u8)> {
        // Standard Excel color palette (first 56 colors)
        const PALETTE: [(u8, u8, u8); 56] = [
            (0, 0, 0),       // 0: Black
            (255, 255, 255), // 1: White
            (255, 0, 0),     // 2: Red
            (0, 255, 0),     // 3: Bright Green
            (0, 0, 255),     // 4: Blue
            (255, 255, 0),   // 5: Yellow
            (255, 0, 255),   // 6: Pink
            (0, 255, 255),   // 7: Turquoise
            (0, 0, 0),       // 8: Black
            (255, 255, 255), // 9: White
            (255, 0, 0),     // 10: Red
            (0, 255, 0),     // 11: Bright Green
            (0, 0, 255),     // 12: Blue
            (255, 255, 0),   // 13: Yellow
            (255, 0, 255),   // 14: Pink
            (0, 255, 255),   // 15: Turquoise
            (128, 0, 0),     // 16: Dark Red
            (0, 128, 0),     // 17: Green
            (0, 0, 128),     // 18: Dark Blue
            (128, 128, 0),   // 19: Dark Yellow
            (128, 0, 128),   // 20: Violet
            (0, 128, 128),   // 21: Teal
            (192, 192, 192), // 22: 25% Gray
            (128, 128, 128), // 23: 50% Gray
            (153, 153, 255), // 24: Periwinkle
            (153, 51, 102),  // 25: Plum
            (255, 255, 204), // 26: Ivory
            (204, 255, 255), // 27: Light Turquoise
            (102, 0, 102),   // 28: Dark Purple
            (255, 128, 128), // 29: Coral
            (0, 102, 204),   // 30: Ocean Blue
            (204, 204, 255), // 31: Ice Blue
            (0, 0, 128),     // 32: Dark Blue
            (255, 0, 255),   // 33: Pink
            (255, 255, 0),   // 34: Yellow
            (0, 255, 255),   // 35: Turquoise
            (128, 0, 128),   // 36: Violet
            (128, 0, 0),     // 37: Dark Red
            (0, 128, 128),   // 38: Teal
            (0, 0, 255),     // 39: Blue
            (0, 204, 255),   // 40: Sky Blue
            (204, 255, 255), // 41: Light Turquoise
            (204, 255, 204), // 42: Light Green
            (255, 255, 153), // 43: Light Yellow
            (153, 204, 255), // 44: Pale Blue
            (255, 153, 204), // 45: Rose
            (204, 153, 255), // 46: Lavender
            (255, 204, 153), // 47: Tan
            (51, 102, 255),  // 48: Light Blue
            (51, 204, 204),  // 49: Aqua
            (153, 204, 0),   // 50: Lime
            (255, 204, 0),   // 51: Gold
            (255, 153, 0),   // 52: Light Orange
            (255, 102, 0),   // 53: Orange
            (102, 102, 153), // 54: Blue-Gray
            (150, 150, 150), // 55: 40% Gray
        ];

        PALETTE.get(index as usize).copied()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {}%)", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}

/// Normalized color key: six upper-case hex digits, no alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse "FF0000", "#ff0000" or an ARGB "FFFF0000" (alpha dropped)
    pub fn parse(s: &str) -> Result<Self> {
        Color::from_hex(s)
            .and_then(|c| match c {
                Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => Some(Self::new(r, g, b)),
                _ => None,
            })
            .ok_or_else(|| Error::InvalidColor(s.to_string()))
    }

    /// Hex form without `#`
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// True for white and the off-whites used as "no fill" backgrounds
    pub fn is_near_white(&self) -> bool {
        self.r > WHITE_THRESHOLD && self.g > WHITE_THRESHOLD && self.b > WHITE_THRESHOLD
    }

    /// Hue, saturation and value, each in `0.0..=1.0`
    pub fn to_hsv(&self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let v = max;
        if max == min {
            return (0.0, 0.0, v);
        }

        let delta = max - min;
        let s = delta / max;
        let rc = (max - r) / delta;
        let gc = (max - g) / delta;
        let bc = (max - b) / delta;

        let h = if r == max {
            bc - gc
        } else if g == max {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };

        ((h / 6.0).rem_euclid(1.0), s, v)
    }

    /// Human-readable family name from the HSV hue
    pub fn name(&self) -> ColorName {
        let (h, s, v) = self.to_hsv();

        if s < 0.1 {
            return if v < 0.3 {
                ColorName::Black
            } else if v > 0.7 {
                ColorName::White
            } else {
                ColorName::Gray
            };
        }

        let hue = h * 360.0;
        match hue {
            x if !(15.0..345.0).contains(&x) => ColorName::Red,
            x if x < 30.0 => ColorName::RedOrange,
            x if x < 45.0 => ColorName::Orange,
            x if x < 60.0 => ColorName::OrangeYellow,
            x if x < 75.0 => ColorName::Yellow,
            x if x < 120.0 => ColorName::YellowGreen,
            x if x < 150.0 => ColorName::Green,
            x if x < 180.0 => ColorName::GreenCyan,
            x if x < 210.0 => ColorName::Cyan,
            x if x < 240.0 => ColorName::CyanBlue,
            x if x < 270.0 => ColorName::Blue,
            x if x < 300.0 => ColorName::Violet,
            x if x < 330.0 => ColorName::Magenta,
            _ => ColorName::Pink,
        }
    }

    /// Whether two colors are within `tolerance` on each HSV component
    ///
    /// Hue distance wraps around the color wheel.
    pub fn is_similar(&self, other: &ColorKey, tolerance: f64) -> bool {
        let (h1, s1, v1) = self.to_hsv();
        let (h2, s2, v2) = other.to_hsv();

        let dh = (h1 - h2).abs();
        let dh = dh.min(1.0 - dh);

        dh < tolerance && (s1 - s2).abs() < tolerance && (v1 - v2).abs() < tolerance
    }
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for ColorKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ColorKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ColorKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ColorKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Color family buckets used in color summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorName {
    Black,
    White,
    Gray,
    Red,
    RedOrange,
    Orange,
    OrangeYellow,
    Yellow,
    YellowGreen,
    Green,
    GreenCyan,
    Cyan,
    CyanBlue,
    Blue,
    Violet,
    Magenta,
    Pink,
}

impl ColorName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorName::Black => "Black",
            ColorName::White => "White",
            ColorName::Gray => "Gray",
            ColorName::Red => "Red",
            ColorName::RedOrange => "Red-Orange",
            ColorName::Orange => "Orange",
            ColorName::OrangeYellow => "Orange-Yellow",
            ColorName::Yellow => "Yellow",
            ColorName::YellowGreen => "Yellow-Green",
            ColorName::Green => "Green",
            ColorName::GreenCyan => "Green-Cyan",
            ColorName::Cyan => "Cyan",
            ColorName::CyanBlue => "Cyan-Blue",
            ColorName::Blue => "Blue",
            ColorName::Violet => "Violet",
            ColorName::Magenta => "Magenta",
            ColorName::Pink => "Pink",
        }
    }
}

impl fmt::Display for ColorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
