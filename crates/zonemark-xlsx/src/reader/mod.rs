//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{read_styles_xml, ParsedStyles};
use zonemark_core::{Bounds, CellAddress, Sheet, Workbook};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(ch) => {
                result.push(ch);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Text shown for a numeric cell value
///
/// Whole numbers are written without a fractional part, so `3.0` reads as
/// `3`. Anything that does not parse as a number is kept verbatim.
fn format_number(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => (n as i64).to_string(),
        Ok(n) if n.is_finite() => n.to_string(),
        _ => raw.to_string(),
    }
}

/// Cell being assembled while its `<c>` element is open
#[derive(Debug, Default)]
struct PendingCell {
    reference: String,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    has_formula: bool,
}

impl PendingCell {
    fn from_attrs(e: &BytesStart<'_>) -> Self {
        let mut cell = Self::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    cell.reference = attr
                        .unescape_value()
                        .map(|s| s.to_string())
                        .unwrap_or_default();
                }
                b"t" => {
                    cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string());
                }
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
        cell
    }
}

/// XLSX file reader
///
/// Produces one [`Sheet`] per worksheet holding the display text and the
/// resolved fill color of every cell. Formulas contribute their cached
/// value; number formats are not applied.
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("reading {}", path.display());
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;

        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();

        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship '{}', skipped", name, r_id);
                continue;
            };

            let mut sheet = Sheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut sheet, &shared_strings, &styles)?;
            log::debug!(
                "sheet '{}': {} cells, {} merged ranges",
                name,
                sheet.cell_count(),
                sheet.merges().len()
            );
            workbook.add_sheet(sheet);
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        // no trimming: `<t xml:space="preserve">` runs keep their spaces
        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // phonetic runs repeat the text in kana
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        log::debug!("sharedStrings.xml: {} strings", strings.len());
        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<ParsedStyles> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => {
                return Ok(ParsedStyles {
                    cell_fills: vec![None],
                })
            }
        };
        read_styles_xml(file)
    }

    /// Read workbook.xml to get sheet names and rIds
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string())
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        sheet: &mut Sheet,
        shared_strings: &[String],
        styles: &ParsedStyles,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        // text is only taken inside <v> and <t>, so whitespace elsewhere is skipped
        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);

        let mut buf = Vec::new();

        let mut current: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"c" => current = Some(PendingCell::from_attrs(&e)),
                    b"v" if current.is_some() => in_value = true,
                    b"f" => {
                        if let Some(cell) = current.as_mut() {
                            cell.has_formula = true;
                        }
                    }
                    b"is" if current.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },

                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    // styled cell without content
                    b"c" => {
                        let cell = PendingCell::from_attrs(&e);
                        Self::process_cell(sheet, cell, shared_strings, styles)?;
                    }
                    b"f" => {
                        if let Some(cell) = current.as_mut() {
                            cell.has_formula = true;
                        }
                    }
                    b"mergeCell" => {
                        let reference = e
                            .attributes()
                            .flatten()
                            .find(|attr| attr.key.as_ref() == b"ref")
                            .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()));
                        if let Some(reference) = reference {
                            match Bounds::parse(&reference) {
                                Ok(range) => sheet.add_merge(range),
                                Err(err) => log::warn!(
                                    "{}: ignoring merged range '{}': {}",
                                    path,
                                    reference,
                                    err
                                ),
                            }
                        }
                    }
                    _ => {}
                },

                Ok(Event::Text(e)) => {
                    if in_value || in_inline_text {
                        if let Some(cell) = current.as_mut() {
                            let text = e.unescape()?;
                            cell.value.get_or_insert_with(String::new).push_str(&text);
                        }
                    }
                }

                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(cell) = current.take() {
                            Self::process_cell(sheet, cell, shared_strings, styles)?;
                        }
                        in_value = false;
                        in_inline_str = false;
                        in_inline_text = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },

                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Store one finished `<c>` element in the sheet
    fn process_cell(
        sheet: &mut Sheet,
        cell: PendingCell,
        shared_strings: &[String],
        styles: &ParsedStyles,
    ) -> XlsxResult<()> {
        let addr = CellAddress::parse(&cell.reference).map_err(|e| {
            XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell.reference, e))
        })?;

        let value = match cell.value.as_deref() {
            None => String::new(),
            Some(raw) => match cell.cell_type.as_deref() {
                // Shared string
                Some("s") => {
                    let idx: usize = raw.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                    })?;
                    shared_strings
                        .get(idx)
                        .cloned()
                        .ok_or(XlsxError::SharedString(idx))?
                }

                Some("b") => {
                    let raw = raw.trim();
                    if raw == "1" || raw.eq_ignore_ascii_case("true") {
                        "TRUE".to_string()
                    } else {
                        "FALSE".to_string()
                    }
                }

                // Error codes such as #DIV/0! are shown as they are
                Some("e") => raw.trim().to_string(),

                Some("str") | Some("inlineStr") => decode_excel_escapes(raw),

                None | Some("n") => format_number(raw),

                Some(_) => raw.to_string(),
            },
        };

        if cell.has_formula && cell.value.is_none() {
            log::trace!("{}: formula without cached value", cell.reference);
        }

        let color = match cell.style {
            Some(idx) => styles.fill(idx)?.and_then(|c| c.to_key()),
            None => None,
        };

        if value.is_empty() && color.is_none() {
            return Ok(());
        }

        sheet.set_cell(addr.row, addr.col, value, color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes_carriage_return() {
        assert_eq!(decode_excel_escapes("Hello_x000d_World"), "Hello\rWorld");
    }

    #[test]
    fn test_decode_excel_escapes_multiple() {
        assert_eq!(
            decode_excel_escapes("Line1_x000d__x000a_Line2_x0009_Tab"),
            "Line1\r\nLine2\tTab"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        assert_eq!(decode_excel_escapes("snake_x005f_case"), "snake_case");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("a_x00_b"), "a_x00_b");
        assert_eq!(decode_excel_escapes("trailing_x"), "trailing_x");
        assert_eq!(decode_excel_escapes("plain_name"), "plain_name");
    }

    #[test]
    fn test_decode_excel_escapes_uppercase() {
        assert_eq!(decode_excel_escapes("A_x000D_B"), "A\rB");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number("3"), "3");
        assert_eq!(format_number("3.0"), "3");
        assert_eq!(format_number("-12.5"), "-12.5");
        assert_eq!(format_number("1E3"), "1000");
        assert_eq!(format_number("n/a"), "n/a");
    }

    fn minimal_archive(sheet_xml: &str) -> Vec<u8> {
        archive_with_strings(sheet_xml, None)
    }

    fn archive_with_strings(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#).unwrap();

            zip.start_file("_rels/.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();

            if let Some(sst) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(sst.as_bytes()).unwrap();
            }

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_empty_xlsx() {
        let buf = minimal_archive(r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData></sheetData></worksheet>"#);
        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.name(), "Sheet1");
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_values_without_styles() {
        let buf = minimal_archive(r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1"><v>42</v></c><c r="B1" t="b"><v>1</v></c><c r="C1" t="inlineStr"><is><t>hi_x0009_there</t></is></c><c r="D1"><f>A1*2</f><v>84</v></c><c r="E1" t="e"><v>#DIV/0!</v></c></row></sheetData></worksheet>"#);
        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        let sheet = workbook.sheet(0).unwrap();

        let values: Vec<(String, String)> = sheet
            .iter_cells()
            .map(|(addr, cell)| (addr.to_string(), cell.value.clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("A1".to_string(), "42".to_string()),
                ("B1".to_string(), "TRUE".to_string()),
                ("C1".to_string(), "hi\tthere".to_string()),
                ("D1".to_string(), "84".to_string()),
                ("E1".to_string(), "#DIV/0!".to_string()),
            ]
        );
        assert!(sheet.iter_cells().all(|(_, c)| c.color.is_none()));
    }

    #[test]
    fn test_preserved_spaces_kept() {
        let sst = r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1"><si><r><t>A</t></r><r><rPr><b/></rPr><t xml:space="preserve"> B</t></r></si></sst>"#;
        let sheet_xml = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s">
        <v>0</v>
      </c>
      <c r="B1" t="inlineStr">
        <is><t xml:space="preserve">  padded </t></is>
      </c>
      <c r="C1" t="b"><v>1</v></c>
    </row>
  </sheetData>
</worksheet>"#;
        let workbook = XlsxReader::read(Cursor::new(archive_with_strings(sheet_xml, Some(sst)))).unwrap();
        let sheet = workbook.sheet(0).unwrap();

        let values: Vec<(String, String)> = sheet
            .iter_cells()
            .map(|(addr, cell)| (addr.to_string(), cell.value.clone()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("A1".to_string(), "A B".to_string()),
                ("B1".to_string(), "  padded ".to_string()),
                ("C1".to_string(), "TRUE".to_string()),
            ]
        );
    }

    #[test]
    fn test_style_index_without_stylesheet_is_rejected() {
        let buf = minimal_archive(r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" s="3"><v>1</v></c></row></sheetData></worksheet>"#);
        let err = XlsxReader::read(Cursor::new(buf)).unwrap_err();
        assert!(matches!(
            err,
            XlsxError::StyleIndex {
                index: 3,
                available: 1
            }
        ));
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("xl/workbook.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<workbook/>").unwrap();
            zip.finish().unwrap();
        }
        let err = XlsxReader::read(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
    }

    #[test]
    fn test_merge_cells_recorded() {
        let buf = minimal_archive(r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/><mergeCells count="2"><mergeCell ref="A1:C1"/><mergeCell ref="bogus"/></mergeCells></worksheet>"#);
        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.merges(), &[Bounds::parse("A1:C1").unwrap()]);
        assert!(sheet.is_empty());
    }
}
