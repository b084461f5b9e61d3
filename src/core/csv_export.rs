use crate::core::cell::{header_values, row_values};
use crate::domain::model::{ColumnDefinition, CsvQuoting, Dataset};
use crate::domain::ports::TableWriter;
use crate::utils::error::{ExportError, Result};
use csv::{QuoteStyle, WriterBuilder};

/// Comma-joined, newline-separated rows with no trailing newline.
///
/// With [`CsvQuoting::Never`] values are written verbatim, so a value that
/// contains a comma or newline shifts the columns of its row.
#[derive(Debug, Clone, Default)]
pub struct CsvTableWriter {
    quoting: CsvQuoting,
}

impl CsvTableWriter {
    pub fn new(quoting: CsvQuoting) -> Self {
        Self { quoting }
    }

    fn quote_style(&self) -> QuoteStyle {
        match self.quoting {
            CsvQuoting::Never => QuoteStyle::Never,
            CsvQuoting::Rfc4180 => QuoteStyle::Necessary,
        }
    }

    /// Encodes one row without its line terminator.
    fn encode_line<S: AsRef<str>>(&self, fields: &[S]) -> Result<String> {
        // csv 會把只有一個空欄位的列寫成 `""`，空列直接以逗號組成
        if fields.iter().all(|field| field.as_ref().is_empty()) {
            return Ok(",".repeat(fields.len().saturating_sub(1)));
        }

        let mut writer = WriterBuilder::new()
            .quote_style(self.quote_style())
            .from_writer(vec![]);
        writer.write_record(fields.iter().map(|field| field.as_ref()))?;

        let mut bytes = writer
            .into_inner()
            .map_err(|e| ExportError::IoError(e.into_error()))?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }

        String::from_utf8(bytes).map_err(|e| ExportError::ProcessingError {
            message: format!("CSV row is not valid UTF-8: {}", e),
        })
    }
}

impl TableWriter for CsvTableWriter {
    fn write_table(&self, dataset: &Dataset, columns: &[ColumnDefinition]) -> Result<Vec<u8>> {
        let mut csv_lines = Vec::with_capacity(dataset.len() + 1);
        csv_lines.push(self.encode_line(&header_values(columns))?);
        for record in dataset.iter() {
            csv_lines.push(self.encode_line(&row_values(record, columns))?);
        }

        let bytes = csv_lines.join("\n").into_bytes();

        tracing::debug!(
            "CSV export: {} rows, {} columns, {} bytes",
            dataset.len(),
            columns.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}
