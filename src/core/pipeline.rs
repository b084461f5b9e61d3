use crate::core::csv_export::CsvTableWriter;
use crate::core::json_export::JsonTableWriter;
use crate::core::pdf_export::PdfTableWriter;
use crate::core::xlsx_export::XlsxTableWriter;
use crate::core::{ColumnDefinition, Dataset, ExportFormat, ExportOptions, ExportOutput, TableWriter};
use crate::utils::error::Result;

/// Converts a dataset into one of the supported download formats.
///
/// Always operates on the full dataset that is passed in; sorting, paging
/// and filtering belong to the caller.
#[derive(Debug, Clone, Default)]
pub struct ExportPipeline {
    options: ExportOptions,
}

impl ExportPipeline {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn writer_for(&self, format: ExportFormat) -> Box<dyn TableWriter> {
        match format {
            ExportFormat::Csv => Box::new(CsvTableWriter::new(self.options.csv_quoting)),
            ExportFormat::Xlsx => Box::new(XlsxTableWriter),
            ExportFormat::Json => Box::new(JsonTableWriter),
            ExportFormat::Pdf => Box::new(PdfTableWriter::new(self.options.file_stem.as_str())),
        }
    }

    pub fn export(
        &self,
        dataset: &Dataset,
        columns: &[ColumnDefinition],
        format: ExportFormat,
    ) -> Result<ExportOutput> {
        tracing::debug!(
            "Exporting {} records x {} columns as {}",
            dataset.len(),
            columns.len(),
            format
        );

        let bytes = self.writer_for(format).write_table(dataset, columns)?;

        Ok(ExportOutput {
            bytes,
            mime_type: format.mime_type(),
            file_name: self.options.file_name(format),
        })
    }

    /// Like [`export`](Self::export) but takes the format by name, failing
    /// with `UnsupportedFormat` for anything other than csv/xlsx/json/pdf.
    pub fn export_named(
        &self,
        dataset: &Dataset,
        columns: &[ColumnDefinition],
        format: &str,
    ) -> Result<ExportOutput> {
        self.export(dataset, columns, format.parse()?)
    }
}

/// Exports with default options (`table_data.<ext>`, unquoted CSV).
pub fn export(
    dataset: &Dataset,
    columns: &[ColumnDefinition],
    format: ExportFormat,
) -> Result<ExportOutput> {
    ExportPipeline::default().export(dataset, columns, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use crate::domain::model::CsvQuoting;
    use crate::utils::error::ExportError;

    fn scenario() -> (Dataset, Vec<ColumnDefinition>) {
        let dataset = Dataset::new(vec![
            Record::new().with("id", 1).with("name", "A"),
            Record::new().with("id", 2).with("name", "B"),
        ]);
        let columns = vec![
            ColumnDefinition::new("ID", "id"),
            ColumnDefinition::new("Name", "name"),
        ];
        (dataset, columns)
    }

    #[test]
    fn test_export_csv_output_metadata() {
        let (dataset, columns) = scenario();
        let output = export(&dataset, &columns, ExportFormat::Csv).unwrap();

        assert_eq!(output.file_name, "table_data.csv");
        assert_eq!(output.mime_type, "text/csv");
        assert_eq!(output.bytes, b"ID,Name\n1,A\n2,B");
    }

    #[test]
    fn test_every_format_produces_named_output() {
        let (dataset, columns) = scenario();
        for format in ExportFormat::ALL {
            let output = export(&dataset, &columns, format).unwrap();
            assert_eq!(output.file_name, format!("table_data.{}", format.extension()));
            assert_eq!(output.mime_type, format.mime_type());
            assert!(!output.bytes.is_empty());
        }
    }

    #[test]
    fn test_export_named_unsupported_format() {
        let (dataset, columns) = scenario();
        let pipeline = ExportPipeline::default();

        match pipeline.export_named(&dataset, &columns, "docx") {
            Err(ExportError::UnsupportedFormat { format }) => assert_eq!(format, "docx"),
            other => panic!("expected UnsupportedFormat, got {:?}", other.map(|o| o.file_name)),
        }
        assert!(pipeline.export_named(&dataset, &columns, "JSON").is_ok());
    }

    #[test]
    fn test_custom_options() {
        let (mut dataset, columns) = scenario();
        dataset.records[0].data.insert("name".to_string(), "A, Jr.".into());

        let pipeline = ExportPipeline::new(ExportOptions {
            file_stem: "people".to_string(),
            csv_quoting: CsvQuoting::Rfc4180,
        });
        let output = pipeline.export(&dataset, &columns, ExportFormat::Csv).unwrap();

        assert_eq!(output.file_name, "people.csv");
        assert_eq!(
            String::from_utf8(output.bytes).unwrap(),
            "ID,Name\n1,\"A, Jr.\"\n2,B"
        );
    }

    #[test]
    fn test_empty_dataset_never_errors() {
        let (_, columns) = scenario();
        let empty = Dataset::default();

        for format in ExportFormat::ALL {
            assert!(export(&empty, &columns, format).is_ok(), "{} failed", format);
        }
        let json = export(&empty, &columns, ExportFormat::Json).unwrap();
        assert_eq!(json.bytes, b"[]");
    }
}
