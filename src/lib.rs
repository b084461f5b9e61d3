pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::{LocalStorage, MemoryStorage};
pub use config::ExportConfig;
pub use crate::core::{engine::ExportEngine, pipeline::export, pipeline::ExportPipeline};
pub use domain::model::{
    CellFormat, ColumnConfig, ColumnDefinition, CsvQuoting, Dataset, ExportFormat, ExportOptions,
    ExportOutput, Record,
};
pub use utils::error::{ExportError, Result};
