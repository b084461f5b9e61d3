use crate::domain::model::{
    ColumnConfig, ColumnDefinition, CsvQuoting, Dataset, ExportFormat, ExportOptions,
    DEFAULT_FILE_STEM,
};
use crate::utils::error::{ExportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    #[serde(default)]
    pub csv_quoting: CsvQuoting,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            format: default_format(),
            output_path: default_output_path(),
            file_stem: default_file_stem(),
            csv_quoting: CsvQuoting::default(),
        }
    }
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_output_path() -> String {
    "./output".to_string()
}

fn default_file_stem() -> String {
    DEFAULT_FILE_STEM.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl ExportConfig {
    /// 以輸入檔路徑建立預設配置
    pub fn for_input(path: impl Into<String>) -> Self {
        Self {
            input: InputConfig { path: path.into() },
            export: ExportSection::default(),
            columns: Vec::new(),
            monitoring: None,
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ExportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ExportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定者保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn format(&self) -> Result<ExportFormat> {
        self.export.format.parse()
    }

    /// Leaf columns in export order, with groups flattened.
    pub fn leaf_columns(&self) -> Vec<ColumnDefinition> {
        ColumnConfig::flatten(&self.columns)
    }

    /// Configured columns, or columns inferred from the dataset when none are set.
    pub fn resolve_columns(&self, dataset: &Dataset) -> Vec<ColumnDefinition> {
        let columns = self.leaf_columns();
        if columns.is_empty() {
            tracing::debug!("No columns configured, inferring from first record");
            ColumnDefinition::infer_from(dataset)
        } else {
            columns
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            file_stem: self.export.file_stem.clone(),
            csv_quoting: self.export.csv_quoting,
        }
    }

    pub fn input_path(&self) -> &str {
        &self.input.path
    }

    pub fn output_path(&self) -> &str {
        &self.export.output_path
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &["json"])?;
        validation::validate_path("export.output_path", &self.export.output_path)?;
        validation::validate_file_stem("export.file_stem", &self.export.file_stem)?;
        validation::validate_columns("columns", &self.leaf_columns())?;

        self.format()?;
        Ok(())
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CellFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_CONFIG: &str = r#"
[input]
path = "mock_data.json"

[export]
format = "xlsx"
output_path = "./exports"
file_stem = "people"
csv_quoting = "rfc4180"

[monitoring]
enabled = true

[[columns]]
header = "ID"
field_key = "id"

[[columns]]
header = "Name"

[[columns.columns]]
header = "First"
field_key = "first_name"

[[columns.columns]]
header = "Last"
field_key = "last_name"

[[columns]]
header = "Date of birth"
field_key = "dob"
format = "date_medium"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = ExportConfig::from_toml_str(FULL_CONFIG).unwrap();

        assert_eq!(config.input_path(), "mock_data.json");
        assert_eq!(config.format().unwrap(), ExportFormat::Xlsx);
        assert_eq!(config.output_path(), "./exports");
        assert_eq!(config.export.csv_quoting, CsvQuoting::Rfc4180);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());

        let columns = config.leaf_columns();
        let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["ID", "First", "Last", "Date of birth"]);
        assert_eq!(columns[3].format, CellFormat::DateMedium);
        assert_eq!(columns[1].format, CellFormat::Text);

        let options = config.export_options();
        assert_eq!(options.file_name(ExportFormat::Xlsx), "people.xlsx");
    }

    #[test]
    fn test_defaults_for_minimal_config() {
        let config = ExportConfig::from_toml_str(
            r#"
[input]
path = "data.json"
"#,
        )
        .unwrap();

        assert_eq!(config.format().unwrap(), ExportFormat::Csv);
        assert_eq!(config.output_path(), "./output");
        assert_eq!(config.export.file_stem, "table_data");
        assert_eq!(config.export.csv_quoting, CsvQuoting::Never);
        assert!(!config.monitoring_enabled());
        assert!(config.leaf_columns().is_empty());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TABLE_EXPORT_TEST_OUTPUT", "/tmp/table-export");

        let config = ExportConfig::from_toml_str(
            r#"
[input]
path = "data.json"

[export]
output_path = "${TABLE_EXPORT_TEST_OUTPUT}"
file_stem = "${TABLE_EXPORT_TEST_UNSET_VAR}"
"#,
        )
        .unwrap();

        assert_eq!(config.output_path(), "/tmp/table-export");
        assert_eq!(config.export.file_stem, "${TABLE_EXPORT_TEST_UNSET_VAR}");

        std::env::remove_var("TABLE_EXPORT_TEST_OUTPUT");
    }

    #[test]
    fn test_unsupported_format_fails_validation() {
        let config = ExportConfig::from_toml_str(
            r#"
[input]
path = "data.json"

[export]
format = "docx"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_invalid_input_extension() {
        let config = ExportConfig::for_input("data.csv");
        assert!(matches!(
            config.validate(),
            Err(ExportError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let err = ExportConfig::from_toml_str("[input\npath = ").unwrap_err();
        assert!(matches!(err, ExportError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_resolve_columns_infers_when_unset() {
        let config = ExportConfig::for_input("data.json");
        let dataset = Dataset::from_json_str(r#"[{"id": 1, "email": "a@b.c"}]"#).unwrap();

        let headers: Vec<String> = config
            .resolve_columns(&dataset)
            .into_iter()
            .map(|c| c.header)
            .collect();
        assert_eq!(headers, vec!["id", "email"]);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_CONFIG.as_bytes()).unwrap();

        let config = ExportConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.export.file_stem, "people");
    }
}
