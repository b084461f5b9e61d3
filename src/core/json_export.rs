use crate::domain::model::{ColumnDefinition, Dataset};
use crate::domain::ports::TableWriter;
use crate::utils::error::Result;

/// Writes the records in their original shape; columns are ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonTableWriter;

impl TableWriter for JsonTableWriter {
    fn write_table(&self, dataset: &Dataset, _columns: &[ColumnDefinition]) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(dataset)?;
        tracing::debug!("JSON export: {} records, {} bytes", dataset.len(), bytes.len());
        Ok(bytes)
    }
}
