//! PDF table export using printpdf built-in fonts.

use crate::core::cell::{header_values, row_values};
use crate::domain::model::{ColumnDefinition, Dataset, DEFAULT_FILE_STEM};
use crate::domain::ports::TableWriter;
use crate::utils::error::{ExportError, Result};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;
use std::ops::Range;

const PT_TO_MM: f32 = 0.3528;
// Helvetica 平均字寬約 0.5em
const AVG_CHAR_WIDTH_EM: f32 = 0.5;
const ELLIPSIS: &str = "...";
// 寬表格縮小字級時，每格至少要放得下的字元數
const MIN_CELL_CHARS: usize = 4;
const MIN_FONT_SIZE: f32 = 3.0;

/// Page geometry for the table. Defaults to A4 landscape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub row_height_mm: f32,
    pub font_size: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width_mm: 297.0,
            page_height_mm: 210.0,
            margin_mm: 15.0,
            row_height_mm: 7.0,
            font_size: 9.0,
        }
    }
}

impl PageLayout {
    /// Body rows that fit below the header row on one page (at least one).
    pub fn rows_per_page(&self) -> usize {
        let usable = self.page_height_mm - 2.0 * self.margin_mm;
        let rows = (usable / self.row_height_mm).floor() as usize;
        rows.saturating_sub(1).max(1)
    }

    pub fn column_width_mm(&self, column_count: usize) -> f32 {
        (self.page_width_mm - 2.0 * self.margin_mm) / column_count.max(1) as f32
    }

    pub fn max_chars(&self, width_mm: f32, font_size: f32) -> usize {
        let char_width_mm = font_size * AVG_CHAR_WIDTH_EM * PT_TO_MM;
        // 保留一個字元的欄距
        ((width_mm / char_width_mm).floor() as usize).saturating_sub(1)
    }

    /// Largest font size, up to `font_size`, that leaves every column room
    /// for a few characters. Fails when that would drop below a legible size.
    pub fn fitted_font_size(&self, column_count: usize) -> Result<f32> {
        let width = self.column_width_mm(column_count);
        let needed_em = (MIN_CELL_CHARS + 1) as f32 * AVG_CHAR_WIDTH_EM * PT_TO_MM;
        let font_size = self.font_size.min(width / needed_em);

        if font_size < MIN_FONT_SIZE {
            return Err(ExportError::PdfError {
                message: format!(
                    "{} columns do not fit on a {}mm wide page",
                    column_count, self.page_width_mm
                ),
            });
        }
        Ok(font_size)
    }

    /// Splits `row_count` body rows into per-page ranges. An empty table
    /// still gets one page for its header.
    pub fn page_ranges(&self, row_count: usize) -> Vec<Range<usize>> {
        if row_count == 0 {
            return vec![0..0];
        }
        let per_page = self.rows_per_page();
        (0..row_count)
            .step_by(per_page)
            .map(|start| start..(start + per_page).min(row_count))
            .collect()
    }
}

/// Truncates `text` to `max_chars`, marking the cut with an ellipsis.
pub fn fit_text(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut fitted: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    fitted.push_str(ELLIPSIS);
    fitted
}

fn fit_row<S: AsRef<str>>(cells: &[S], max_chars: usize) -> Vec<String> {
    cells
        .iter()
        .map(|cell| fit_text(cell.as_ref(), max_chars))
        .collect()
}

#[derive(Debug, Clone)]
pub struct PdfTableWriter {
    layout: PageLayout,
    title: String,
}

impl Default for PdfTableWriter {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_STEM)
    }
}

impl PdfTableWriter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            layout: PageLayout::default(),
            title: title.into(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Fitted cell text per page. Each page starts with the header row.
    pub fn page_rows(
        &self,
        dataset: &Dataset,
        columns: &[ColumnDefinition],
    ) -> Result<Vec<Vec<Vec<String>>>> {
        let font_size = self.layout.fitted_font_size(columns.len())?;
        let max_chars = self
            .layout
            .max_chars(self.layout.column_width_mm(columns.len()), font_size);

        let header = fit_row(&header_values(columns), max_chars);
        let pages = self
            .layout
            .page_ranges(dataset.len())
            .into_iter()
            .map(|range| {
                std::iter::once(header.clone())
                    .chain(
                        dataset.records[range]
                            .iter()
                            .map(|record| fit_row(&row_values(record, columns), max_chars)),
                    )
                    .collect()
            })
            .collect();
        Ok(pages)
    }

    fn draw_row(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        font_size: f32,
        cells: &[String],
        y_pos: f32,
    ) {
        let width = self.layout.column_width_mm(cells.len());

        for (index, text) in cells.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let x_pos = self.layout.margin_mm + width * index as f32;
            layer.use_text(text.as_str(), font_size, Mm(x_pos), Mm(y_pos), font);
        }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::PdfError {
        message: e.to_string(),
    }
}

impl TableWriter for PdfTableWriter {
    fn write_table(&self, dataset: &Dataset, columns: &[ColumnDefinition]) -> Result<Vec<u8>> {
        let layout = &self.layout;
        let page_width = Mm(layout.page_width_mm);
        let page_height = Mm(layout.page_height_mm);

        let (doc, first_page, first_layer) =
            PdfDocument::new(self.title.as_str(), page_width, page_height, "Layer 1");

        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;

        let font_size = layout.fitted_font_size(columns.len())?;
        let pages = self.page_rows(dataset, columns)?;

        for (page_index, rows) in pages.iter().enumerate() {
            let layer = if page_index == 0 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (page, layer) = doc.add_page(page_width, page_height, "Layer 1");
                doc.get_page(page).get_layer(layer)
            };

            // 每頁第一列是粗體標題
            let mut y_pos = layout.page_height_mm - layout.margin_mm;
            for (row_index, cells) in rows.iter().enumerate() {
                let row_font = if row_index == 0 { &font_bold } else { &font };
                self.draw_row(&layer, row_font, font_size, cells, y_pos);
                y_pos -= layout.row_height_mm;
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf).map_err(pdf_error)?;
        let bytes = buf
            .into_inner()
            .map_err(|e| ExportError::IoError(e.into_error()))?;

        tracing::debug!(
            "PDF export: {} rows on {} page(s) at {:.1}pt, {} bytes",
            dataset.len(),
            pages.len(),
            font_size,
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Record;

    #[test]
    fn test_default_layout_rows_per_page() {
        // (210 - 30) / 7 = 25 rows, one of them the header
        assert_eq!(PageLayout::default().rows_per_page(), 24);
    }

    #[test]
    fn test_rows_per_page_never_zero() {
        let cramped = PageLayout {
            page_height_mm: 40.0,
            margin_mm: 15.0,
            row_height_mm: 9.0,
            ..PageLayout::default()
        };
        assert_eq!(cramped.rows_per_page(), 1);
    }

    #[test]
    fn test_page_ranges() {
        let layout = PageLayout::default();
        assert_eq!(layout.page_ranges(0), vec![0..0]);
        assert_eq!(layout.page_ranges(24), vec![0..24]);
        assert_eq!(layout.page_ranges(50), vec![0..24, 24..48, 48..50]);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("short", 10), "short");
        assert_eq!(fit_text("a longer value", 8), "a lon...");
        assert_eq!(fit_text("abcdef", 2), "ab");
        assert_eq!(fit_text("", 0), "");
    }

    #[test]
    fn test_column_width_splits_usable_width() {
        let layout = PageLayout::default();
        assert!((layout.column_width_mm(3) - 89.0).abs() < f32::EPSILON);
        assert!(layout.max_chars(layout.column_width_mm(6), layout.font_size) > 10);
    }

    #[test]
    fn test_pdf_document_bytes() {
        let dataset = Dataset::new(
            (1..=30)
                .map(|i| Record::new().with("id", i).with("name", format!("Person {}", i)))
                .collect(),
        );
        let columns = vec![
            ColumnDefinition::new("ID", "id"),
            ColumnDefinition::new("Name", "name"),
        ];

        let bytes = PdfTableWriter::default()
            .write_table(&dataset, &columns)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_pdf_empty_dataset_still_renders() {
        let columns = vec![ColumnDefinition::new("ID", "id")];
        let bytes = PdfTableWriter::new("empty")
            .write_table(&Dataset::default(), &columns)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
    fn wide_columns(count: usize) -> Vec<ColumnDefinition> {
        (1..=count)
            .map(|i| ColumnDefinition::new(format!("C{}", i), format!("c{}", i)))
            .collect()
    }

    #[test]
    fn test_page_rows_header_first_on_every_page() {
        let dataset = Dataset::new(
            (1..=50)
                .map(|i| Record::new().with("id", i).with("name", format!("Person {}", i)))
                .collect(),
        );
        let columns = vec![
            ColumnDefinition::new("ID", "id"),
            ColumnDefinition::new("Name", "name"),
        ];

        let pages = PdfTableWriter::default().page_rows(&dataset, &columns).unwrap();

        assert_eq!(pages.len(), 3);
        for page in &pages {
            assert_eq!(page[0], vec!["ID", "Name"]);
        }
        assert_eq!(pages[0].len(), 25);
        assert_eq!(pages[0][1], vec!["1", "Person 1"]);
        assert_eq!(pages[2].len(), 3);
        assert_eq!(pages[2][2], vec!["50", "Person 50"]);
    }

    #[test]
    fn test_page_rows_missing_field_is_blank() {
        let dataset = Dataset::new(vec![Record::new().with("name", "Only name")]);
        let columns = vec![
            ColumnDefinition::new("ID", "id"),
            ColumnDefinition::new("Name", "name"),
        ];

        let pages = PdfTableWriter::default().page_rows(&dataset, &columns).unwrap();
        assert_eq!(pages, vec![vec![vec!["ID", "Name"], vec!["", "Only name"]]]);
    }

    #[test]
    fn test_page_rows_empty_dataset_keeps_header() {
        let columns = vec![ColumnDefinition::new("ID", "id")];
        let pages = PdfTableWriter::default()
            .page_rows(&Dataset::default(), &columns)
            .unwrap();
        assert_eq!(pages, vec![vec![vec!["ID"]]]);
    }

    #[test]
    fn test_wide_table_shrinks_font_and_keeps_text() {
        let layout = PageLayout::default();
        assert_eq!(layout.fitted_font_size(6).unwrap(), layout.font_size);

        let font_size = layout.fitted_font_size(85).unwrap();
        assert!(font_size < layout.font_size);
        assert!(layout.max_chars(layout.column_width_mm(85), font_size) >= 3);

        let columns = wide_columns(85);
        let dataset = Dataset::new(vec![Record::new().with("c1", "x").with("c85", "y")]);
        let writer = PdfTableWriter::default();
        let pages = writer.page_rows(&dataset, &columns).unwrap();

        assert!(pages[0][0].iter().all(|header| !header.is_empty()));
        assert_eq!(pages[0][0][84], "C85");
        assert_eq!(pages[0][1][0], "x");
        assert!(writer.write_table(&dataset, &columns).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_too_many_columns_is_pdf_error() {
        let columns = wide_columns(200);
        let result = PdfTableWriter::default().write_table(&Dataset::default(), &columns);
        assert!(matches!(result, Err(ExportError::PdfError { .. })));
    }
}
