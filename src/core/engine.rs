use crate::core::pipeline::ExportPipeline;
use crate::core::{ColumnDefinition, Dataset, ExportFormat, ExportOptions, ExportOutput, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::{ExportPhase, SystemMonitor};

/// Runs an export and hands the bytes to a storage sink.
pub struct ExportEngine<S: Storage> {
    pipeline: ExportPipeline,
    storage: S,
    monitor: SystemMonitor,
}

impl<S: Storage> ExportEngine<S> {
    pub fn new(storage: S, options: ExportOptions) -> Self {
        Self::new_with_monitoring(storage, options, false)
    }

    pub fn new_with_monitoring(storage: S, options: ExportOptions, monitor_enabled: bool) -> Self {
        Self {
            pipeline: ExportPipeline::new(options),
            storage,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &ExportPipeline {
        &self.pipeline
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Serializes the dataset and writes it to the sink as `output.file_name`.
    pub async fn download(
        &self,
        dataset: &Dataset,
        columns: &[ColumnDefinition],
        format: ExportFormat,
    ) -> Result<ExportOutput> {
        tracing::info!(
            "Starting {} export of {} records ({} columns)",
            format,
            dataset.len(),
            columns.len()
        );
        self.monitor.log_stats(ExportPhase::Start {
            format,
            records: dataset.len(),
        });

        let output = self.pipeline.export(dataset, columns, format)?;
        self.monitor.log_stats(ExportPhase::Encoded {
            format,
            bytes: output.bytes.len(),
        });

        tracing::debug!(
            "Writing {} ({} bytes, {}) to storage",
            output.file_name,
            output.bytes.len(),
            output.mime_type
        );
        self.storage.write_file(&output.file_name, &output.bytes).await?;
        self.monitor.log_stats(ExportPhase::Written {
            file_name: &output.file_name,
        });

        tracing::info!("Export saved as {}", output.file_name);
        self.monitor.log_final_stats(&output);

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;
    use crate::core::Record;
    use crate::utils::error::ExportError;

    struct FailingStorage;

    impl Storage for FailingStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            Err(ExportError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )))
        }

        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Err(ExportError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only sink",
            )))
        }
    }

    fn sample() -> (Dataset, Vec<ColumnDefinition>) {
        (
            Dataset::new(vec![Record::new().with("id", 1).with("name", "A")]),
            vec![
                ColumnDefinition::new("ID", "id"),
                ColumnDefinition::new("Name", "name"),
            ],
        )
    }

    #[tokio::test]
    async fn test_download_writes_to_storage() {
        let (dataset, columns) = sample();
        let engine = ExportEngine::new(MemoryStorage::new(), ExportOptions::default());

        let output = engine
            .download(&dataset, &columns, ExportFormat::Csv)
            .await
            .unwrap();

        let stored = engine.storage().get_file("table_data.csv").await.unwrap();
        assert_eq!(stored, output.bytes);
        assert_eq!(stored, b"ID,Name\n1,A");
    }

    #[tokio::test]
    async fn test_download_propagates_storage_error() {
        let (dataset, columns) = sample();
        let engine = ExportEngine::new(FailingStorage, ExportOptions::default());

        let err = engine
            .download(&dataset, &columns, ExportFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::IoError(_)));
    }

    #[tokio::test]
    async fn test_download_with_monitoring_logs_every_phase() {
        let (dataset, columns) = sample();
        let engine =
            ExportEngine::new_with_monitoring(MemoryStorage::new(), ExportOptions::default(), true);

        let output = engine
            .download(&dataset, &columns, ExportFormat::Pdf)
            .await
            .unwrap();

        assert_eq!(output.file_name, "table_data.pdf");
        assert!(engine.storage().get_file("table_data.pdf").await.is_some());
    }
}
