use crate::domain::model::{ColumnDefinition, Dataset};
use crate::utils::error::Result;

/// Destination for exported bytes (directory, in-memory buffer, ...).
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Serializes a dataset, in column order, into one output format.
pub trait TableWriter {
    fn write_table(&self, dataset: &Dataset, columns: &[ColumnDefinition]) -> Result<Vec<u8>>;
}
