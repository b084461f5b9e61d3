pub mod cell;
pub mod csv_export;
pub mod engine;
pub mod json_export;
pub mod pdf_export;
pub mod pipeline;
pub mod xlsx_export;

pub use crate::domain::model::{
    ColumnDefinition, Dataset, ExportFormat, ExportOptions, ExportOutput, Record,
};
pub use crate::domain::ports::{Storage, TableWriter};
pub use crate::utils::error::Result;
