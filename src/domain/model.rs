use crate::utils::error::{ExportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 單筆資料列，欄位順序與來源 JSON 相同
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, field_key: &str) -> Option<&Value> {
        self.data.get(field_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// The full in-memory collection of records behind the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// 從 JSON 陣列字串載入資料集，每個元素必須是物件
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;

        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(ExportError::ValidationError {
                    message: format!(
                        "Dataset must be a JSON array of objects, got {}",
                        json_kind(&other)
                    ),
                })
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(obj) => records.push(Record::from(obj)),
                other => {
                    return Err(ExportError::ValidationError {
                        message: format!(
                            "Dataset element {} must be an object, got {}",
                            index,
                            json_kind(&other)
                        ),
                    })
                }
            }
        }

        Ok(Self { records })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let dataset = Self::from_json_str(&content)?;
        tracing::debug!(
            "Loaded {} records from {}",
            dataset.len(),
            path.as_ref().display()
        );
        Ok(dataset)
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// How a cell value is rendered in CSV, XLSX and PDF output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFormat {
    #[default]
    Text,
    /// `Jan 5, 1990`
    DateMedium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub header: String,
    pub field_key: String,
    #[serde(default)]
    pub format: CellFormat,
}

impl ColumnDefinition {
    pub fn new(header: impl Into<String>, field_key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            field_key: field_key.into(),
            format: CellFormat::Text,
        }
    }

    pub fn with_format(mut self, format: CellFormat) -> Self {
        self.format = format;
        self
    }

    /// 以第一筆資料的欄位推導欄位定義（標題即欄位名稱）
    pub fn infer_from(dataset: &Dataset) -> Vec<ColumnDefinition> {
        dataset
            .records
            .first()
            .map(|record| {
                record
                    .keys()
                    .map(|key| ColumnDefinition::new(key.clone(), key.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A configured column: either a leaf bound to a field, or a header group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnConfig {
    Group {
        header: String,
        columns: Vec<ColumnConfig>,
    },
    Leaf(ColumnDefinition),
}

impl ColumnConfig {
    /// Flattens groups depth-first into the leaf columns that are exported.
    pub fn flatten(configs: &[ColumnConfig]) -> Vec<ColumnDefinition> {
        let mut leaves = Vec::new();
        for config in configs {
            config.collect_leaves(&mut leaves);
        }
        leaves
    }

    fn collect_leaves(&self, leaves: &mut Vec<ColumnDefinition>) {
        match self {
            ColumnConfig::Leaf(column) => leaves.push(column.clone()),
            ColumnConfig::Group { columns, .. } => {
                for child in columns {
                    child.collect_leaves(leaves);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Xlsx,
        ExportFormat::Json,
        ExportFormat::Pdf,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension() == name)
            .ok_or_else(|| ExportError::UnsupportedFormat {
                format: s.to_string(),
            })
    }
}

/// CSV field quoting. `Never` joins raw values with commas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsvQuoting {
    #[default]
    Never,
    Rfc4180,
}

impl FromStr for CsvQuoting {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(CsvQuoting::Never),
            "rfc4180" => Ok(CsvQuoting::Rfc4180),
            other => Err(ExportError::InvalidConfigValueError {
                field: "csv_quoting".to_string(),
                value: other.to_string(),
                reason: "Valid values: never, rfc4180".to_string(),
            }),
        }
    }
}

pub const DEFAULT_FILE_STEM: &str = "table_data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub file_stem: String,
    pub csv_quoting: CsvQuoting,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            file_stem: DEFAULT_FILE_STEM.to_string(),
            csv_quoting: CsvQuoting::Never,
        }
    }
}

impl ExportOptions {
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }
}

#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub file_name: String,
}
