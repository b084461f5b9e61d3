//! Minimal SpreadsheetML writer: one worksheet named `Sheet1`, inline strings,
//! packaged as an OPC zip archive.

use crate::core::cell::cell_text;
use crate::domain::model::{CellFormat, ColumnDefinition, Dataset, Record};
use crate::domain::ports::TableWriter;
use crate::utils::error::Result;
use serde_json::Value;
use std::fmt::Write as _;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

pub const SHEET_NAME: &str = "Sheet1";

const CONTENT_TYPES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
    r#"</Types>"#
);

const ROOT_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#
);

const WORKBOOK_RELS_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
    r#"</Relationships>"#
);

const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Clone, Default)]
pub struct XlsxTableWriter;

impl TableWriter for XlsxTableWriter {
    fn write_table(&self, dataset: &Dataset, columns: &[ColumnDefinition]) -> Result<Vec<u8>> {
        let sheet_xml = worksheet_xml(dataset, columns);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook_xml().as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(sheet_xml.as_bytes())?;

        // 完成並取回底層 Vec<u8>
        let bytes = zip.finish()?.into_inner();

        tracing::debug!(
            "XLSX export: {} rows, {} columns, {} bytes",
            dataset.len(),
            columns.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn workbook_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{}" xmlns:r="{}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        SPREADSHEET_NS,
        RELATIONSHIPS_NS,
        escape_xml(SHEET_NAME)
    )
}

/// Row 1 holds the headers, each record follows in column order.
pub fn worksheet_xml(dataset: &Dataset, columns: &[ColumnDefinition]) -> String {
    let mut xml = String::with_capacity(256 + dataset.len() * columns.len() * 32);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<worksheet xmlns="{}"><sheetData>"#, SPREADSHEET_NS);

    let _ = write!(xml, r#"<row r="1">"#);
    for (col, column) in columns.iter().enumerate() {
        push_string_cell(&mut xml, &cell_reference(col, 1), &column.header);
    }
    xml.push_str("</row>");

    for (index, record) in dataset.iter().enumerate() {
        let row = index + 2;
        let _ = write!(xml, r#"<row r="{}">"#, row);
        for (col, column) in columns.iter().enumerate() {
            let reference = cell_reference(col, row);
            match numeric_value(record, column) {
                Some(number) => {
                    let _ = write!(xml, r#"<c r="{}"><v>{}</v></c>"#, reference, number);
                }
                None => push_string_cell(&mut xml, &reference, &cell_text(record, column)),
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn numeric_value(record: &Record, column: &ColumnDefinition) -> Option<String> {
    if column.format != CellFormat::Text {
        return None;
    }
    match record.get(&column.field_key) {
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn push_string_cell(xml: &mut String, reference: &str, text: &str) {
    let space = if text.trim() != text {
        r#" xml:space="preserve""#
    } else {
        ""
    };
    let _ = write!(
        xml,
        r#"<c r="{}" t="inlineStr"><is><t{}>{}</t></is></c>"#,
        reference,
        space,
        escape_xml(text)
    );
}

/// Zero-based column index to spreadsheet letters: 0 -> A, 26 -> AA.
pub fn column_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn cell_reference(col: usize, row: usize) -> String {
    format!("{}{}", column_name(col), row)
}

/// Escapes markup characters and drops control characters XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            c if (c as u32) < 0x20 => {}
            c => escaped.push(c),
        }
    }
    escaped
}
