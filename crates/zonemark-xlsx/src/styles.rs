//! Fill colors from `xl/styles.xml`
//!
//! Only the parts of the stylesheet that decide a cell's background are read:
//! the `<fills>` list and the `fillId` of every `<cellXfs>` entry.

use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use zonemark_core::Color;

/// Fill color per cell format, indexed like the `s` attribute of a cell
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedStyles {
    pub(crate) cell_fills: Vec<Option<Color>>,
}

impl ParsedStyles {
    /// Fill color of the cell format `style_idx`
    pub(crate) fn fill(&self, style_idx: u32) -> XlsxResult<Option<Color>> {
        self.cell_fills
            .get(style_idx as usize)
            .copied()
            .ok_or(XlsxError::StyleIndex {
                index: style_idx,
                available: self.cell_fills.len(),
            })
    }
}

/// A `<fill>` element as read, before it is reduced to a single color
#[derive(Debug, Clone, Default)]
struct PendingFill {
    pattern: Option<String>,
    fg: Option<Color>,
    bg: Option<Color>,
}

impl PendingFill {
    /// Background color shown for this fill
    ///
    /// `none` and `gray125` (the two fills every workbook starts with) and a
    /// missing pattern have no color; any other pattern shows its foreground.
    fn finalize(self) -> Option<Color> {
        match self.pattern.as_deref() {
            None | Some("none") | Some("gray125") => None,
            Some(_) => self.fg.or(self.bg.filter(|c| *c != Color::Indexed(64))),
        }
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<ParsedStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut fills: Vec<Option<Color>> = Vec::new();
    let mut xf_fill_ids: Vec<usize> = Vec::new();

    let mut current_fill: Option<PendingFill> = None;
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"fill" => current_fill = Some(PendingFill::default()),
                b"cellXfs" => in_cell_xfs = true,
                _ => read_fill_part(&e, &mut current_fill, &mut xf_fill_ids, in_cell_xfs),
            },

            Ok(Event::Empty(e)) => match e.name().as_ref() {
                // <fill/> carries no pattern at all
                b"fill" => fills.push(None),
                _ => read_fill_part(&e, &mut current_fill, &mut xf_fill_ids, in_cell_xfs),
            },

            Ok(Event::End(e)) => match e.name().as_ref() {
                b"fill" => {
                    if let Some(fill) = current_fill.take() {
                        fills.push(fill.finalize());
                    }
                }
                b"cellXfs" => in_cell_xfs = false,
                _ => {}
            },

            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    let mut cell_fills: Vec<Option<Color>> = xf_fill_ids
        .into_iter()
        .map(|id| fills.get(id).copied().flatten())
        .collect();
    if cell_fills.is_empty() {
        cell_fills.push(None);
    }

    log::debug!(
        "styles.xml: {} fills, {} cell formats",
        fills.len(),
        cell_fills.len()
    );

    Ok(ParsedStyles { cell_fills })
}

/// Handle an element that may appear either as a start tag or self-closed
fn read_fill_part(
    e: &BytesStart<'_>,
    current_fill: &mut Option<PendingFill>,
    xf_fill_ids: &mut Vec<usize>,
    in_cell_xfs: bool,
) {
    match e.name().as_ref() {
        b"patternFill" => {
            if let Some(fill) = current_fill.as_mut() {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"patternType" {
                        fill.pattern = attr.unescape_value().ok().map(|s| s.to_string());
                    }
                }
            }
        }
        b"fgColor" => {
            if let Some(fill) = current_fill.as_mut() {
                fill.fg = Some(parse_color_attrs(e));
            }
        }
        b"bgColor" => {
            if let Some(fill) = current_fill.as_mut() {
                fill.bg = Some(parse_color_attrs(e));
            }
        }
        b"xf" if in_cell_xfs => {
            let fill_id = e
                .attributes()
                .flatten()
                .find(|attr| attr.key.as_ref() == b"fillId")
                .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
                .unwrap_or(0);
            xf_fill_ids.push(fill_id);
        }
        _ => {}
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    let mut rgb: Option<String> = None;
    let mut theme: Option<u8> = None;
    let mut tint: Option<f64> = None;
    let mut indexed: Option<u8> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => {
                rgb = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"theme" => {
                theme = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            b"tint" => {
                tint = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok());
            }
            b"indexed" => {
                indexed = attr
                    .unescape_value()
                    .ok()
                    .and_then(|s| s.parse::<u8>().ok());
            }
            _ => {}
        }
    }

    if let Some(color) = rgb.as_deref().and_then(Color::from_hex) {
        return color;
    }

    if let Some(index) = theme {
        let tint = tint.map(|t| (t * 100.0).round() as i8).unwrap_or(0);
        return Color::Theme { index, tint };
    }

    if let Some(i) = indexed {
        return Color::Indexed(i);
    }

    Color::Auto
}
